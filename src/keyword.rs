use tracing::trace;

use crate::catalog::TypeCatalog;
use crate::construct::Keyword;
use crate::datatype::InstancePropertyValue;

// ------------- Header attributes -------------
pub const TYPE_CATEGORY: Keyword = Keyword::from_static("type.category");
pub const TYPE_GUIDS: Keyword = Keyword::from_static("type.guids");
pub const CURRENT_STATUS: Keyword = Keyword::from_static("currentStatus");
pub const CREATE_TIME: Keyword = Keyword::from_static("createTime");
pub const UPDATE_TIME: Keyword = Keyword::from_static("updateTime");
pub const CLASSIFICATIONS: Keyword = Keyword::from_static("classifications");
pub const ENTITY_PROXY: Keyword = Keyword::from_static("entityProxy");
pub const ENTITY_PROXIES: Keyword = Keyword::from_static("entityProxies");

/// Audit header properties that are searchable like any other property.
pub const HEADER_PROPERTIES: [&str; 16] = [
    "createdBy",
    "updatedBy",
    "maintainedBy",
    "createTime",
    "updateTime",
    "version",
    "currentStatus",
    "statusOnDelete",
    "metadataCollectionId",
    "metadataCollectionName",
    "instanceProvenanceType",
    "instanceURL",
    "instanceLicense",
    "replicatedBy",
    "reIdentifiedFromGUID",
    "mappingProperties",
];

pub fn is_header_property(property_name: &str) -> bool {
    HEADER_PROPERTIES.contains(&property_name)
}

pub fn entity_reference(guid: &str) -> String {
    format!("e_{}", guid)
}

pub fn relationship_reference(guid: &str) -> String {
    format!("r_{}", guid)
}

// ------------- Namespace -------------
// Where the header and property attributes of an instance (or of one of its
// classifications) live.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Namespace {
    header: Option<String>,
    properties: String,
}

impl Namespace {
    pub fn entity() -> Self {
        Self {
            header: None,
            properties: String::from("entityProperties"),
        }
    }
    pub fn relationship() -> Self {
        Self {
            header: None,
            properties: String::from("relationshipProperties"),
        }
    }
    pub fn classification(classification_name: &str) -> Self {
        let header = format!("classifications.{}", classification_name);
        Self {
            properties: format!("{}.classificationProperties", header),
            header: Some(header),
        }
    }
    pub fn properties(&self) -> &str {
        &self.properties
    }
    pub fn header_keyword(&self, property_name: &str) -> Keyword {
        Keyword::new(self.header.as_deref(), property_name)
    }
    pub fn property_keyword(&self, declaring_type: &str, property_name: &str) -> Keyword {
        Keyword::new(
            Some(&self.properties),
            format!("{}.{}.value", declaring_type, property_name),
        )
    }
}

/// Resolves the attributes a property could be stored under across the
/// candidate types, in candidate order and without duplicates. Every declaring
/// attribute is returned even when a sample value is given, since an enum or a
/// number may still be matched by its text. An empty result means the property
/// cannot match anything.
pub fn resolve_attributes(
    property_name: &str,
    namespace: &Namespace,
    candidate_type_names: &[String],
    catalog: &dyn TypeCatalog,
    sample_value: Option<&InstancePropertyValue>,
) -> Vec<Keyword> {
    if is_header_property(property_name) {
        return vec![namespace.header_keyword(property_name)];
    }
    let mut attributes: Vec<Keyword> = Vec::new();
    for candidate in candidate_type_names {
        let declarer = catalog
            .ancestors(candidate)
            .into_iter()
            .find(|t| t.declares(property_name).is_some());
        if let Some(declarer) = declarer {
            let keyword = namespace.property_keyword(&declarer.name, property_name);
            if !attributes.contains(&keyword) {
                attributes.push(keyword);
            }
        }
    }
    trace!(
        property = property_name,
        sample = ?sample_value.map(|v| v.data_type()),
        resolved = attributes.len(),
        "resolved attributes"
    );
    attributes
}

/// Every string attribute of the candidate types: each type's own properties
/// first, then those it inherits, nearest ancestor first.
pub fn text_attributes(
    namespace: &Namespace,
    candidate_type_names: &[String],
    catalog: &dyn TypeCatalog,
) -> Vec<(Keyword, String)> {
    let mut attributes: Vec<(Keyword, String)> = Vec::new();
    for candidate in candidate_type_names {
        for type_def in catalog.ancestors(candidate) {
            for property in type_def.properties.iter().filter(|p| p.attribute_type.is_text()) {
                let keyword = namespace.property_keyword(&type_def.name, &property.name);
                if !attributes.iter().any(|(k, _)| *k == keyword) {
                    attributes.push((keyword, property.name.clone()));
                }
            }
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_qualify_keywords() {
        assert_eq!(
            Namespace::entity().property_keyword("Referenceable", "qualifiedName").to_string(),
            ":entityProperties/Referenceable.qualifiedName.value"
        );
        assert_eq!(Namespace::entity().header_keyword("createdBy").to_string(), ":createdBy");
        let ns = Namespace::classification("Confidentiality");
        assert_eq!(
            ns.property_keyword("Confidentiality", "level").to_string(),
            ":classifications.Confidentiality.classificationProperties/Confidentiality.level.value"
        );
        assert_eq!(ns.header_keyword("createdBy").to_string(), ":classifications.Confidentiality/createdBy");
    }
}
