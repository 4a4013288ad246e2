// the type catalog is shared by every request
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TypeCatalog;
use crate::error::Result;
use crate::query::{GraphQuery, SearchKind, XtdbQuery};
use crate::search::{InstanceStatus, SearchClassifications, SearchProperties, SequencingOrder, TypeCategory};
use crate::settings::Settings;
use crate::text::BuildOptions;

// ------------- Requests -------------
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    pub from_element: usize,
    pub page_size: usize,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sequencing {
    pub order: Option<SequencingOrder>,
    pub property: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntitySearch {
    pub entity_type_guid: Option<String>,
    pub match_properties: Option<SearchProperties>,
    pub match_classifications: Option<SearchClassifications>,
    pub limit_results_by_status: Option<Vec<InstanceStatus>>,
    pub sequencing: Sequencing,
    pub paging: Paging,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationshipSearch {
    pub relationship_type_guid: Option<String>,
    /// Only relationships with this entity at one of their ends.
    pub entity_guid: Option<String>,
    pub match_properties: Option<SearchProperties>,
    pub limit_results_by_status: Option<Vec<InstanceStatus>>,
    pub sequencing: Sequencing,
    pub paging: Paging,
}

/// A regex matched against any string property.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSearch {
    pub type_guid: Option<String>,
    pub relationships: bool,
    pub search_criteria: String,
    pub match_classifications: Option<SearchClassifications>,
    pub limit_results_by_status: Option<Vec<InstanceStatus>>,
    pub sequencing: Sequencing,
    pub paging: Paging,
}

#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSearch {
    pub entity_guid: String,
    pub relationship_type_guids: Vec<String>,
    pub entity_type_guids: Vec<String>,
    pub classification_names: Vec<String>,
    pub limit_relationships_by_status: Option<Vec<InstanceStatus>>,
    pub limit_entities_by_status: Option<Vec<InstanceStatus>>,
}

/// The types a search may return: their names, for resolving properties, and
/// the GUIDs of the type and its subtypes, for limiting by type.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Candidates {
    pub type_names: Vec<String>,
    pub type_guids: Vec<String>,
}

// ------------- Translator -------------
#[derive(Clone)]
pub struct Translator {
    catalog: Arc<dyn TypeCatalog>,
    options: BuildOptions,
    max_page_size: usize,
}

impl Translator {
    pub fn new(catalog: Arc<dyn TypeCatalog>, options: BuildOptions, max_page_size: usize) -> Self {
        Self {
            catalog,
            options,
            max_page_size,
        }
    }
    pub fn from_settings(catalog: Arc<dyn TypeCatalog>, settings: &Settings) -> Self {
        Self::new(catalog, settings.build_options(), settings.max_page_size)
    }
    pub fn catalog(&self) -> &dyn TypeCatalog {
        self.catalog.as_ref()
    }

    /// The type with the given GUID and everything inheriting from it, or
    /// every type of the category when there is no GUID. An unknown GUID has
    /// no candidates at all.
    pub fn candidates(&self, category: TypeCategory, type_guid: Option<&str>) -> Candidates {
        let type_defs = match type_guid {
            Some(guid) => match self.catalog.type_name(guid) {
                Some(name) => self.catalog.subtypes(name),
                None => {
                    debug!(guid, "unknown type GUID, no candidate types");
                    Vec::new()
                }
            },
            None => self.catalog.types_of_category(category),
        };
        Candidates {
            type_names: type_defs.iter().map(|t| t.name.clone()).collect(),
            type_guids: type_defs.iter().map(|t| t.guid.clone()).collect(),
        }
    }

    // a type without subtypes is limited by its GUID alone
    fn add_type(&self, query: &mut XtdbQuery, type_guid: Option<&str>, candidates: &Candidates) {
        let subtype_guids: &[String] = if candidates.type_guids.len() > 1 {
            &candidates.type_guids
        } else {
            &[]
        };
        query.add_type_condition(type_guid, subtype_guids);
    }

    fn add_ordering(&self, query: &mut XtdbQuery, sequencing: &Sequencing, paging: &Paging, candidates: &Candidates) {
        query.add_sequencing(
            sequencing.order,
            sequencing.property.as_deref(),
            &candidates.type_names,
            self.catalog(),
        );
        query.add_paging(paging.from_element, self.page_size(paging.page_size));
    }

    /// Requested page sizes are capped, and no page size means the largest allowed.
    pub fn page_size(&self, requested: usize) -> usize {
        match (requested, self.max_page_size) {
            (requested, 0) => requested,
            (0, max) => max,
            (requested, max) => requested.min(max),
        }
    }

    pub fn entities(&self, search: &EntitySearch) -> Result<XtdbQuery> {
        let type_guid = search.entity_type_guid.as_deref();
        let candidates = self.candidates(TypeCategory::Entity, type_guid);
        let mut query = XtdbQuery::new(SearchKind::Entity, self.options);
        self.add_type(&mut query, type_guid, &candidates);
        query.add_property_conditions(search.match_properties.as_ref(), &candidates.type_names, self.catalog())?;
        query.add_classification_conditions(search.match_classifications.as_ref(), self.catalog())?;
        query.add_status_limiters(search.limit_results_by_status.as_deref());
        self.add_ordering(&mut query, &search.sequencing, &search.paging, &candidates);
        Ok(query)
    }

    pub fn relationships(&self, search: &RelationshipSearch) -> Result<XtdbQuery> {
        let type_guid = search.relationship_type_guid.as_deref();
        let candidates = self.candidates(TypeCategory::Relationship, type_guid);
        let mut query = XtdbQuery::new(SearchKind::Relationship, self.options);
        if let Some(entity_guid) = &search.entity_guid {
            query.add_relationship_endpoint_condition(entity_guid);
        }
        self.add_type(&mut query, type_guid, &candidates);
        query.add_property_conditions(search.match_properties.as_ref(), &candidates.type_names, self.catalog())?;
        query.add_status_limiters(search.limit_results_by_status.as_deref());
        self.add_ordering(&mut query, &search.sequencing, &search.paging, &candidates);
        Ok(query)
    }

    pub fn text(&self, search: &TextSearch) -> Result<XtdbQuery> {
        let kind = if search.relationships {
            SearchKind::Relationship
        } else {
            SearchKind::Entity
        };
        let type_guid = search.type_guid.as_deref();
        let candidates = self.candidates(kind.category(), type_guid);
        let mut query = XtdbQuery::new(kind, self.options);
        self.add_type(&mut query, type_guid, &candidates);
        query.add_text_condition(&search.search_criteria, &candidates.type_names, self.catalog());
        if kind == SearchKind::Entity {
            query.add_classification_conditions(search.match_classifications.as_ref(), self.catalog())?;
        }
        query.add_status_limiters(search.limit_results_by_status.as_deref());
        self.add_ordering(&mut query, &search.sequencing, &search.paging, &candidates);
        Ok(query)
    }

    pub fn graph(&self, search: &GraphSearch) -> GraphQuery {
        let mut query = GraphQuery::new();
        query.add_relationship_limiters(
            &search.entity_guid,
            &search.relationship_type_guids,
            search.limit_relationships_by_status.as_deref(),
        );
        query.add_entity_limiters(
            &search.entity_guid,
            &search.entity_type_guids,
            &search.classification_names,
            search.limit_entities_by_status.as_deref(),
        );
        query
    }
}
