//! xtdb-query – turns metadata repository searches into Datalog queries.
//!
//! A search request describes *what* to find in a type-polymorphic instance
//! model: entities or relationships of some type (and its subtypes), with
//! properties matching a tree of conditions, carrying certain
//! classifications, in certain statuses, in some order. This crate produces
//! the equivalent query document for a bitemporal document store speaking
//! Datalog:
//!
//! ```text
//! {:find [e] :where [[e :type.category 2] [e :entityProxy false] ...]}
//! ```
//!
//! ## Attributes
//! Instances are stored as documents whose property values live under
//! attributes qualified by the type that declares the property, e.g.
//! `:entityProperties/Referenceable.qualifiedName.value`. A property name in a
//! search may therefore stand for several attributes when the candidate types
//! declare it independently; [`keyword::resolve_attributes`] works out which,
//! and every builder fans out over the result. A property that resolves to
//! nothing yields a clause that matches nothing, never an error.
//!
//! ## Modules
//! * [`construct`] – Symbols, keywords, terms and clauses, with their EDN form.
//! * [`datatype`] – Instance property values.
//! * [`search`] – The search request model: conditions, match criteria, operators.
//! * [`catalog`] – The type model consulted while building, and an in-memory keeper for it.
//! * [`pattern`] – Recognition of the canonical exact / starts / ends / contains regexes.
//! * [`keyword`] – Attribute naming and property resolution.
//! * [`text`] – Clauses for string matching, with or without a full-text index.
//! * [`condition`] – Clauses for property conditions and their combination.
//! * [`limiter`] – Clauses limiting by classification, type and status.
//! * [`sequencing`] – Ordering of results.
//! * [`query`] – The query documents themselves.
//! * [`translate`] – Whole search requests to query documents.
//! * [`settings`] – Layered configuration.
//! * [`server`] – A small HTTP service around [`translate`].
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use xtdb_query::catalog::TypeKeeper;
//! use xtdb_query::datatype::InstancePropertyValue;
//! use xtdb_query::search::{ComparisonOperator, MatchCriteria, PropertyCondition, SearchProperties};
//! use xtdb_query::text::BuildOptions;
//! use xtdb_query::translate::{EntitySearch, Translator};
//!
//! let types = r#"[{"guid": "a1", "name": "Asset", "category": "ENTITY",
//!                  "properties": [{"name": "name", "attributeType": "string"}]}]"#;
//! let catalog = TypeKeeper::from_json(types).unwrap();
//! let translator = Translator::new(Arc::new(catalog), BuildOptions::default(), 0);
//! let search = EntitySearch {
//!     entity_type_guid: Some("a1".into()),
//!     match_properties: Some(SearchProperties::new(
//!         MatchCriteria::All,
//!         vec![PropertyCondition::leaf("name", ComparisonOperator::Eq, InstancePropertyValue::string("Sales"))],
//!     )),
//!     ..Default::default()
//! };
//! let query = translator.entities(&search).unwrap();
//! assert!(query.to_edn().contains("[e :entityProperties/Asset.name.value \"Sales\"]"));
//! ```
//!
//! ## Concurrency
//! Building is pure and synchronous. The catalog is only ever read, and every
//! query owns the scope its variable names come from, so independent requests
//! can be translated from any number of threads.

pub mod error;
pub mod construct;
pub mod datatype;
pub mod search;
pub mod catalog;
pub mod pattern;
pub mod keyword;
pub mod text;
pub mod condition;
pub mod limiter;
pub mod sequencing;
pub mod query;
pub mod translate;
pub mod settings;
pub mod server;
