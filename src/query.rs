use std::fmt;

use tracing::trace;

use crate::catalog::TypeCatalog;
use crate::condition::ConditionBuilder;
use crate::construct::{join, Call, Condition, Symbol, Term, VarScope, DOC_ID, RELATIONSHIP};
use crate::error::Result;
use crate::keyword::{entity_reference, Namespace, ENTITY_PROXIES};
use crate::limiter::{
    classification_conditions, classification_name_conditions, status_conditions, type_conditions,
};
use crate::search::{InstanceStatus, SearchClassifications, SearchProperties, SequencingOrder, TypeCategory};
use crate::sequencing::{sequence, Direction};
use crate::text::{text_across_properties, BuildOptions};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchKind {
    Entity,
    Relationship,
}

impl SearchKind {
    pub fn category(&self) -> TypeCategory {
        match self {
            SearchKind::Entity => TypeCategory::Entity,
            SearchKind::Relationship => TypeCategory::Relationship,
        }
    }
    pub fn namespace(&self) -> Namespace {
        match self {
            SearchKind::Entity => Namespace::entity(),
            SearchKind::Relationship => Namespace::relationship(),
        }
    }
}

fn render(
    f: &mut fmt::Formatter,
    find: &[Symbol],
    conditions: &[Condition],
    order_by: &[(Symbol, Direction)],
    limit: Option<usize>,
    offset: Option<usize>,
) -> fmt::Result {
    write!(f, "{{:find [{}] :where [{}]", join(find), join(conditions))?;
    if !order_by.is_empty() {
        let order_by: Vec<String> = order_by.iter().map(|(v, d)| format!("[{} {}]", v, d)).collect();
        write!(f, " :order-by [{}]", order_by.join(" "))?;
    }
    if let Some(limit) = limit {
        write!(f, " :limit {}", limit)?;
    }
    if let Some(offset) = offset {
        write!(f, " :offset {}", offset)?;
    }
    write!(f, "}}")
}

// ------------- XtdbQuery -------------
#[derive(Clone, Debug)]
pub struct XtdbQuery {
    kind: SearchKind,
    namespace: Namespace,
    options: BuildOptions,
    find: Vec<Symbol>,
    conditions: Vec<Condition>,
    order_by: Vec<(Symbol, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
    scope: VarScope,
}

impl XtdbQuery {
    pub fn new(kind: SearchKind, options: BuildOptions) -> Self {
        Self {
            kind,
            namespace: kind.namespace(),
            options,
            find: vec![DOC_ID],
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            scope: VarScope::new(),
        }
    }
    pub fn entities(options: BuildOptions) -> Self {
        Self::new(SearchKind::Entity, options)
    }
    pub fn relationships(options: BuildOptions) -> Self {
        Self::new(SearchKind::Relationship, options)
    }
    pub fn kind(&self) -> SearchKind {
        self.kind
    }
    pub fn find(&self) -> &[Symbol] {
        &self.find
    }
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
    pub fn order_by(&self) -> &[(Symbol, Direction)] {
        &self.order_by
    }
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn add_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        self.conditions.extend(conditions);
    }

    /// Only relationships that have the given entity at one of their ends.
    pub fn add_relationship_endpoint_condition(&mut self, entity_guid: &str) {
        self.conditions.push(Condition::triple(
            &DOC_ID,
            ENTITY_PROXIES,
            entity_reference(entity_guid),
        ));
    }

    pub fn add_type_condition(&mut self, type_guid: Option<&str>, subtype_guids: &[String]) {
        let proxy_marker = self.kind == SearchKind::Entity;
        self.conditions.extend(type_conditions(
            &DOC_ID,
            self.kind.category(),
            type_guid,
            subtype_guids,
            proxy_marker,
        ));
    }

    pub fn add_property_conditions(
        &mut self,
        search_properties: Option<&SearchProperties>,
        candidate_type_names: &[String],
        catalog: &dyn TypeCatalog,
    ) -> Result<()> {
        let built = ConditionBuilder::new(catalog, &self.namespace, candidate_type_names, self.options, &DOC_ID)
            .property_conditions(search_properties, false, &mut self.scope)?;
        if let Some(conditions) = built {
            self.conditions.extend(conditions);
        }
        Ok(())
    }

    pub fn add_classification_conditions(
        &mut self,
        search_classifications: Option<&SearchClassifications>,
        catalog: &dyn TypeCatalog,
    ) -> Result<()> {
        let built = classification_conditions(search_classifications, &DOC_ID, catalog, self.options, &mut self.scope)?;
        if let Some(conditions) = built {
            self.conditions.extend(conditions);
        }
        Ok(())
    }

    /// A regex matched against every string property of the candidate types.
    pub fn add_text_condition(&mut self, regex: &str, candidate_type_names: &[String], catalog: &dyn TypeCatalog) {
        let conditions = text_across_properties(
            &DOC_ID,
            regex,
            &self.namespace,
            candidate_type_names,
            catalog,
            &self.options,
            &mut self.scope,
        );
        self.conditions.extend(conditions);
    }

    pub fn add_status_limiters(&mut self, statuses: Option<&[InstanceStatus]>) {
        self.conditions.extend(status_conditions(&DOC_ID, statuses));
    }

    pub fn add_sequencing(
        &mut self,
        order: Option<SequencingOrder>,
        property_name: Option<&str>,
        candidate_type_names: &[String],
        catalog: &dyn TypeCatalog,
    ) {
        let sequence = sequence(&DOC_ID, order, property_name, &self.namespace, candidate_type_names, catalog);
        if let Some(sequence) = sequence {
            if let Some(clause) = sequence.clause {
                self.conditions.push(clause);
            }
            if !self.find.contains(&sequence.variable) {
                self.find.push(sequence.variable.clone());
            }
            self.order_by.push((sequence.variable, sequence.direction));
        }
    }

    /// A page size of zero leaves the number of results unlimited.
    pub fn add_paging(&mut self, from_element: usize, page_size: usize) {
        self.offset = if from_element > 0 { Some(from_element) } else { None };
        self.limit = if page_size > 0 { Some(page_size) } else { None };
    }

    pub fn to_edn(&self) -> String {
        let edn = self.to_string();
        trace!(query = %edn, "built query");
        edn
    }
}

impl fmt::Display for XtdbQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        render(f, &self.find, &self.conditions, &self.order_by, self.limit, self.offset)
    }
}

// ------------- GraphQuery -------------
// Relationships around a start entity, optionally together with the entities
// at their other ends.
#[derive(Clone, Debug)]
pub struct GraphQuery {
    find: Vec<Symbol>,
    conditions: Vec<Condition>,
}

impl Default for GraphQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphQuery {
    pub fn new() -> Self {
        Self {
            find: vec![RELATIONSHIP],
            conditions: Vec::new(),
        }
    }
    pub fn find(&self) -> &[Symbol] {
        &self.find
    }
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn add_relationship_limiters(
        &mut self,
        entity_guid: &str,
        relationship_type_guids: &[String],
        statuses: Option<&[InstanceStatus]>,
    ) {
        self.conditions.push(Condition::triple(
            &RELATIONSHIP,
            ENTITY_PROXIES,
            entity_reference(entity_guid),
        ));
        self.conditions.extend(limit_types(&RELATIONSHIP, TypeCategory::Relationship, relationship_type_guids));
        self.conditions.extend(status_conditions(&RELATIONSHIP, statuses));
    }

    pub fn add_entity_limiters(
        &mut self,
        entity_guid: &str,
        entity_type_guids: &[String],
        classification_names: &[String],
        statuses: Option<&[InstanceStatus]>,
    ) {
        self.conditions.push(Condition::triple(&RELATIONSHIP, ENTITY_PROXIES, DOC_ID));
        self.conditions.push(Condition::predicate(Call::new(
            "not=",
            vec![Term::from(&DOC_ID), Term::Str(entity_reference(entity_guid))],
        )));
        self.conditions.extend(limit_types(&DOC_ID, TypeCategory::Entity, entity_type_guids));
        self.conditions.extend(classification_name_conditions(&DOC_ID, classification_names));
        self.conditions.extend(status_conditions(&DOC_ID, statuses));
        if !self.find.contains(&DOC_ID) {
            self.find.push(DOC_ID);
        }
    }

    pub fn to_edn(&self) -> String {
        let edn = self.to_string();
        trace!(query = %edn, "built graph query");
        edn
    }
}

// no type GUIDs means any type
fn limit_types(anchor: &Symbol, category: TypeCategory, type_guids: &[String]) -> Vec<Condition> {
    match type_guids {
        [] => Vec::new(),
        [guid] => type_conditions(anchor, category, Some(guid.as_str()), &[], false),
        [first, ..] => type_conditions(anchor, category, Some(first.as_str()), type_guids, false),
    }
}

impl fmt::Display for GraphQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        render(f, &self.find, &self.conditions, &[], None, None)
    }
}
