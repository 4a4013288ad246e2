// requests arrive as JSON, a condition is either a leaf or a nested group
use serde::{Deserialize, Serialize};

use crate::datatype::InstancePropertyValue;
use crate::error::QueryError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchCriteria {
    All,
    Any,
    None,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Like,
    IsNull,
    NotNull,
}

impl ComparisonOperator {
    /// The predicate function of an ordering or inequality comparison.
    pub fn predicate(&self) -> Option<&'static str> {
        match self {
            ComparisonOperator::Neq => Some("not="),
            ComparisonOperator::Lt => Some("<"),
            ComparisonOperator::Lte => Some("<="),
            ComparisonOperator::Gt => Some(">"),
            ComparisonOperator::Gte => Some(">="),
            _ => None,
        }
    }
}

// ------------- Property conditions -------------
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "ConditionWire", into = "ConditionWire")]
pub enum PropertyCondition {
    Leaf {
        property_name: String,
        operator: ComparisonOperator,
        value: Option<InstancePropertyValue>,
    },
    Nested(SearchProperties),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<ComparisonOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<InstancePropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_conditions: Option<SearchProperties>,
}

impl TryFrom<ConditionWire> for PropertyCondition {
    type Error = QueryError;
    fn try_from(wire: ConditionWire) -> Result<Self, QueryError> {
        match (wire.property, wire.operator, wire.nested_conditions) {
            (Some(property_name), Some(operator), None) => Ok(PropertyCondition::Leaf {
                property_name,
                operator,
                value: wire.value,
            }),
            (None, None, Some(nested)) if wire.value.is_none() => Ok(PropertyCondition::Nested(nested)),
            _ => Err(QueryError::InvalidCondition(String::from(
                "a property condition needs either a property and an operator, or nested conditions",
            ))),
        }
    }
}

impl From<PropertyCondition> for ConditionWire {
    fn from(condition: PropertyCondition) -> Self {
        match condition {
            PropertyCondition::Leaf {
                property_name,
                operator,
                value,
            } => ConditionWire {
                property: Some(property_name),
                operator: Some(operator),
                value,
                nested_conditions: None,
            },
            PropertyCondition::Nested(nested) => ConditionWire {
                property: None,
                operator: None,
                value: None,
                nested_conditions: Some(nested),
            },
        }
    }
}

impl PropertyCondition {
    pub fn leaf(property_name: &str, operator: ComparisonOperator, value: InstancePropertyValue) -> Self {
        PropertyCondition::Leaf {
            property_name: property_name.to_string(),
            operator,
            value: Some(value),
        }
    }
    /// A leaf that carries no value, as used by the null checks.
    pub fn check(property_name: &str, operator: ComparisonOperator) -> Self {
        PropertyCondition::Leaf {
            property_name: property_name.to_string(),
            operator,
            value: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProperties {
    pub match_criteria: MatchCriteria,
    #[serde(default)]
    pub conditions: Vec<PropertyCondition>,
}

impl SearchProperties {
    pub fn new(match_criteria: MatchCriteria, conditions: Vec<PropertyCondition>) -> Self {
        Self {
            match_criteria,
            conditions,
        }
    }
}

// ------------- Classification conditions -------------
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationCondition {
    pub name: String,
    #[serde(default)]
    pub match_properties: Option<SearchProperties>,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClassifications {
    #[serde(default = "all")]
    pub match_criteria: MatchCriteria,
    #[serde(default)]
    pub conditions: Vec<ClassificationCondition>,
}

fn all() -> MatchCriteria {
    MatchCriteria::All
}

impl SearchClassifications {
    pub fn new(match_criteria: MatchCriteria, conditions: Vec<ClassificationCondition>) -> Self {
        Self {
            match_criteria,
            conditions,
        }
    }
}

// ------------- Sequencing -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequencingOrder {
    Any,
    Guid,
    CreationDateRecent,
    CreationDateOldest,
    LastUpdateRecent,
    LastUpdateOldest,
    PropertyAscending,
    PropertyDescending,
}

// ------------- Status -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Unknown,
    Draft,
    Prepared,
    Proposed,
    Approved,
    Rejected,
    ApprovedConcept,
    UnderDevelopment,
    DevelopmentComplete,
    ApprovedForDeployment,
    Standby,
    Active,
    Failed,
    Disabled,
    Complete,
    Deprecated,
    Other,
    Deleted,
}

impl InstanceStatus {
    pub fn ordinal(&self) -> i64 {
        match self {
            InstanceStatus::Unknown => 0,
            InstanceStatus::Draft => 1,
            InstanceStatus::Prepared => 2,
            InstanceStatus::Proposed => 3,
            InstanceStatus::Approved => 4,
            InstanceStatus::Rejected => 5,
            InstanceStatus::ApprovedConcept => 6,
            InstanceStatus::UnderDevelopment => 7,
            InstanceStatus::DevelopmentComplete => 8,
            InstanceStatus::ApprovedForDeployment => 9,
            InstanceStatus::Standby => 10,
            InstanceStatus::Active => 15,
            InstanceStatus::Failed => 16,
            InstanceStatus::Disabled => 17,
            InstanceStatus::Complete => 18,
            InstanceStatus::Deprecated => 19,
            InstanceStatus::Other => 50,
            InstanceStatus::Deleted => 99,
        }
    }
}

// ------------- Type categories -------------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCategory {
    Unknown,
    Classification,
    Entity,
    Relationship,
}

impl TypeCategory {
    pub fn ordinal(&self) -> i64 {
        match self {
            TypeCategory::Unknown => 0,
            TypeCategory::Classification => 1,
            TypeCategory::Entity => 2,
            TypeCategory::Relationship => 3,
        }
    }
}
