use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::TypeCatalog;
use crate::construct::{Call, Condition, Keyword, Symbol, Term, VarScope, ELIDE};
use crate::datatype::InstancePropertyValue;
use crate::error::{QueryError, Result};
use crate::keyword::{resolve_attributes, Namespace, TYPE_CATEGORY};
use crate::pattern::{unqualified_literal, TextPattern};
use crate::search::{ComparisonOperator, MatchCriteria, PropertyCondition, SearchProperties};
use crate::text::{text_conditions, BuildOptions};

/// The type category ordinal no instance ever has.
pub const NO_MATCH_CATEGORY: i64 = -1;

/// A clause that is guaranteed to match nothing.
pub fn no_match(anchor: &Symbol) -> Condition {
    Condition::triple(anchor, TYPE_CATEGORY, NO_MATCH_CATEGORY)
}

pub fn not_join(anchor: &Symbol, body: Vec<Condition>) -> Condition {
    Condition::NotJoin {
        bindings: vec![anchor.clone()],
        body,
    }
}

/// Disjunction of branches. Branches that are single triples only share the
/// anchor and can use a plain `or`; anything else needs an explicit join on
/// the variables that occur in more than one branch.
pub fn any_of(anchor: &Symbol, branches: Vec<Vec<Condition>>) -> Condition {
    if branches.iter().all(|b| b.len() == 1 && b[0].is_triple()) {
        return Condition::Or(branches.into_iter().flatten().collect());
    }
    let grouped: Vec<Condition> = branches.into_iter().map(Condition::group).collect();
    let mut seen: BTreeSet<Symbol> = BTreeSet::new();
    let mut shared: BTreeSet<Symbol> = BTreeSet::new();
    for branch in &grouped {
        for variable in branch.variables() {
            if !seen.insert(variable.clone()) {
                shared.insert(variable);
            }
        }
    }
    shared.remove(anchor);
    let mut bindings = vec![anchor.clone()];
    bindings.extend(shared);
    Condition::OrJoin {
        bindings,
        branches: grouped,
    }
}

/// Combines the clause lists of sibling conditions per the match criteria.
/// An empty list, such as an empty nested group, takes no part.
pub fn combine(
    match_criteria: MatchCriteria,
    mut parts: Vec<Vec<Condition>>,
    wrap_in_group: bool,
    anchor: &Symbol,
) -> Vec<Condition> {
    parts.retain(|part| !part.is_empty());
    if parts.is_empty() {
        return Vec::new();
    }
    if parts.len() == 1 {
        let part = parts.remove(0);
        return match match_criteria {
            MatchCriteria::All | MatchCriteria::Any => part,
            MatchCriteria::None => vec![not_join(anchor, part)],
        };
    }
    match match_criteria {
        MatchCriteria::All if wrap_in_group => {
            vec![Condition::And(parts.into_iter().map(Condition::group).collect())]
        }
        MatchCriteria::All => parts.into_iter().flatten().collect(),
        MatchCriteria::Any => vec![any_of(anchor, parts)],
        MatchCriteria::None => vec![Condition::Not(vec![any_of(anchor, parts)])],
    }
}

fn invalid(property_name: &str, reason: &str) -> QueryError {
    QueryError::InvalidCondition(format!("{}: {}", property_name, reason))
}

// A string literal is used as written, unless it is a quoted regex.
fn literal_term(value: &InstancePropertyValue) -> Result<Term> {
    match value.as_str() {
        Some(s) => Ok(Term::Str(unqualified_literal(s).unwrap_or_else(|| s.to_string()))),
        None => value.to_term(),
    }
}

// ------------- ConditionBuilder -------------
pub struct ConditionBuilder<'c> {
    catalog: &'c dyn TypeCatalog,
    namespace: &'c Namespace,
    candidate_type_names: &'c [String],
    options: BuildOptions,
    anchor: Symbol,
}

impl<'c> ConditionBuilder<'c> {
    pub fn new(
        catalog: &'c dyn TypeCatalog,
        namespace: &'c Namespace,
        candidate_type_names: &'c [String],
        options: BuildOptions,
        anchor: &Symbol,
    ) -> Self {
        Self {
            catalog,
            namespace,
            candidate_type_names,
            options,
            anchor: anchor.clone(),
        }
    }

    /// No search properties means no filtering at all, which is different
    /// from a filter that matches nothing.
    pub fn property_conditions(
        &self,
        search_properties: Option<&SearchProperties>,
        wrap_in_group: bool,
        scope: &mut VarScope,
    ) -> Result<Option<Vec<Condition>>> {
        match search_properties {
            Some(search_properties) => Ok(Some(self.group_conditions(search_properties, wrap_in_group, scope)?)),
            None => Ok(None),
        }
    }

    fn group_conditions(
        &self,
        search_properties: &SearchProperties,
        wrap_in_group: bool,
        scope: &mut VarScope,
    ) -> Result<Vec<Condition>> {
        let mut parts = Vec::with_capacity(search_properties.conditions.len());
        for condition in &search_properties.conditions {
            parts.push(self.condition(condition, scope)?);
        }
        Ok(combine(search_properties.match_criteria, parts, wrap_in_group, &self.anchor))
    }

    fn condition(&self, condition: &PropertyCondition, scope: &mut VarScope) -> Result<Vec<Condition>> {
        match condition {
            PropertyCondition::Nested(nested) => self.group_conditions(nested, false, scope),
            PropertyCondition::Leaf {
                property_name,
                operator,
                value,
            } => self.leaf(property_name, *operator, value.as_ref(), scope),
        }
    }

    fn leaf(
        &self,
        property_name: &str,
        operator: ComparisonOperator,
        value: Option<&InstancePropertyValue>,
        scope: &mut VarScope,
    ) -> Result<Vec<Condition>> {
        let attributes = resolve_attributes(
            property_name,
            self.namespace,
            self.candidate_type_names,
            self.catalog,
            value,
        );
        if attributes.is_empty() {
            debug!(property = property_name, "no attribute can hold the property, matching nothing");
            return Ok(vec![no_match(&self.anchor)]);
        }
        let anchor = &self.anchor;
        match (operator, value) {
            (ComparisonOperator::IsNull, _) => {
                let present = self.fan_out(&attributes, |a, _| Ok(vec![Condition::triple(anchor, a.clone(), ELIDE)]), scope)?;
                Ok(vec![not_join(anchor, present)])
            }
            (ComparisonOperator::NotNull, _) => {
                self.fan_out(&attributes, |a, _| Ok(vec![Condition::triple(anchor, a.clone(), ELIDE)]), scope)
            }
            (_, None) => Err(invalid(property_name, "the operator needs a value")),
            (ComparisonOperator::Like, Some(value)) => match value.as_str() {
                Some(regex) => Ok(self.text(&attributes, property_name, regex, scope)),
                None => Err(invalid(property_name, "LIKE needs a string pattern")),
            },
            (ComparisonOperator::Eq, Some(value)) => {
                if let Some(regex) = value.as_str() {
                    return Ok(self.text(&attributes, property_name, regex, scope));
                }
                // every element of a multi-valued search has to be present
                let literals = match value {
                    InstancePropertyValue::Array(array) => array
                        .values()
                        .iter()
                        .map(literal_term)
                        .collect::<Result<Vec<Term>>>()?,
                    single => vec![single.to_term().map_err(|e| invalid(property_name, &e.to_string()))?],
                };
                self.fan_out(
                    &attributes,
                    |a, _| Ok(literals.iter().map(|l| Condition::triple(anchor, a.clone(), l.clone())).collect()),
                    scope,
                )
            }
            (ComparisonOperator::In, Some(InstancePropertyValue::Array(array))) => {
                let members = array
                    .values()
                    .iter()
                    .map(literal_term)
                    .collect::<Result<Vec<Term>>>()?;
                self.fan_out(
                    &attributes,
                    |a, scope| {
                        let captures = scope.captures(property_name);
                        Ok(vec![
                            Condition::triple(anchor, a.clone(), captures.value.clone()),
                            Condition::binding(Call::new("hash-set", members.clone()), &captures.set),
                            Condition::predicate(Call::new(
                                "contains?",
                                vec![Term::from(&captures.set), Term::from(&captures.value)],
                            )),
                        ])
                    },
                    scope,
                )
            }
            (ComparisonOperator::In, Some(_)) => Err(invalid(property_name, "IN needs an array of candidate values")),
            (comparison, Some(value)) => {
                let function = comparison
                    .predicate()
                    .ok_or_else(|| invalid(property_name, "unsupported operator"))?;
                let literal = match value {
                    InstancePropertyValue::Primitive(_) | InstancePropertyValue::Enum(_) => literal_term(value)?,
                    other => {
                        return Err(invalid(
                            property_name,
                            &format!("cannot compare against a {} value", other.data_type()),
                        ));
                    }
                };
                self.fan_out(
                    &attributes,
                    |a, scope| {
                        let captures = scope.captures(property_name);
                        Ok(vec![
                            Condition::triple(anchor, a.clone(), captures.value.clone()),
                            Condition::predicate(Call::new(function, vec![Term::from(&captures.value), literal.clone()])),
                        ])
                    },
                    scope,
                )
            }
        }
    }

    fn text(&self, attributes: &[Keyword], property_name: &str, regex: &str, scope: &mut VarScope) -> Vec<Condition> {
        let pattern = TextPattern::parse(regex);
        text_conditions(&self.anchor, attributes, property_name, &pattern, &self.options, scope)
    }

    // One branch per attribute, OR'd together when there is more than one.
    fn fan_out<F>(&self, attributes: &[Keyword], mut branch: F, scope: &mut VarScope) -> Result<Vec<Condition>>
    where
        F: FnMut(&Keyword, &mut VarScope) -> Result<Vec<Condition>>,
    {
        if let [attribute] = attributes {
            return branch(attribute, scope);
        }
        debug!(attributes = attributes.len(), "condition fans out over attributes");
        let mut branches = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            branches.push(branch(attribute, scope)?);
        }
        Ok(vec![any_of(&self.anchor, branches)])
    }
}

/// Builds the clauses for a set of search properties against the attributes
/// of the candidate types. `None` in, `None` out.
pub fn build_property_conditions(
    search_properties: Option<&SearchProperties>,
    namespace: &Namespace,
    wrap_in_group: bool,
    candidate_type_names: &[String],
    catalog: &dyn TypeCatalog,
    options: BuildOptions,
    anchor: &Symbol,
) -> Result<Option<Vec<Condition>>> {
    let mut scope = VarScope::new();
    ConditionBuilder::new(catalog, namespace, candidate_type_names, options, anchor)
        .property_conditions(search_properties, wrap_in_group, &mut scope)
}
