use tracing::debug;

use crate::catalog::TypeCatalog;
use crate::condition::{any_of, no_match};
use crate::construct::{Bind, Call, Condition, Keyword, Symbol, Term, VarScope, ELIDE};
use crate::keyword::{text_attributes, Namespace};
use crate::pattern::{Shape, TextPattern};

/// Knobs shared by all condition builders.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BuildOptions {
    /// Answer canonical text shapes from the full-text index.
    pub optimize_for_index: bool,
    /// Match strings case-sensitively unless the pattern itself says otherwise.
    pub case_sensitive: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            optimize_for_index: false,
            case_sensitive: true,
        }
    }
}

fn indexed(anchor: &Symbol, function: &'static str, mut args: Vec<Term>, query: String) -> Condition {
    args.push(Term::Str(query));
    Condition::Binding {
        call: Call::new(function, args),
        bind: Bind::Relation(vec![anchor.clone(), ELIDE, ELIDE, ELIDE]),
    }
}

/// The clauses matching one attribute against a text pattern.
pub fn attribute_conditions(
    anchor: &Symbol,
    attribute: &Keyword,
    property_name: &str,
    pattern: &TextPattern,
    options: &BuildOptions,
    scope: &mut VarScope,
) -> Vec<Condition> {
    if options.optimize_for_index {
        if let Some(query) = pattern.lucene_query() {
            return vec![indexed(
                anchor,
                "wildcard-text-search-with-attribute",
                vec![Term::Keyword(attribute.clone())],
                query,
            )];
        }
    }
    let insensitive = pattern.case_insensitive() || !options.case_sensitive;
    if pattern.shape() == Shape::Exact && !insensitive {
        return vec![Condition::triple(anchor, attribute.clone(), pattern.literal())];
    }
    let captures = scope.captures(property_name);
    let predicate = match (pattern.shape(), insensitive) {
        (Shape::StartsWith, false) => Call::new("starts-with?", vec![Term::from(&captures.text), Term::from(pattern.literal())]),
        (Shape::EndsWith, false) => Call::new("ends-with?", vec![Term::from(&captures.text), Term::from(pattern.literal())]),
        (Shape::Contains, false) => Call::new("includes?", vec![Term::from(&captures.text), Term::from(pattern.literal())]),
        _ => Call::new(
            "re-matches",
            vec![Term::Pattern(pattern.regex(insensitive)), Term::from(&captures.text)],
        ),
    };
    vec![
        Condition::triple(anchor, attribute.clone(), captures.value.clone()),
        Condition::binding(Call::new("str", vec![Term::from(&captures.value)]), &captures.text),
        Condition::predicate(predicate),
    ]
}

/// The clauses matching a property, possibly stored under several attributes,
/// against a text pattern. Several attributes become one disjunction.
pub fn text_conditions(
    anchor: &Symbol,
    attributes: &[Keyword],
    property_name: &str,
    pattern: &TextPattern,
    options: &BuildOptions,
    scope: &mut VarScope,
) -> Vec<Condition> {
    match attributes {
        [] => vec![no_match(anchor)],
        [attribute] => attribute_conditions(anchor, attribute, property_name, pattern, options, scope),
        _ => {
            debug!(property = property_name, attributes = attributes.len(), "text search fans out over attributes");
            let branches = attributes
                .iter()
                .map(|a| attribute_conditions(anchor, a, property_name, pattern, options, scope))
                .collect();
            vec![any_of(anchor, branches)]
        }
    }
}

/// A text search across every string property of the candidate types.
pub fn text_across_properties(
    anchor: &Symbol,
    regex: &str,
    namespace: &Namespace,
    candidate_type_names: &[String],
    catalog: &dyn TypeCatalog,
    options: &BuildOptions,
    scope: &mut VarScope,
) -> Vec<Condition> {
    let pattern = TextPattern::parse(regex);
    if options.optimize_for_index {
        if let Some(query) = pattern.lucene_query() {
            return vec![indexed(anchor, "wildcard-text-search", Vec::new(), query)];
        }
    }
    let attributes = text_attributes(namespace, candidate_type_names, catalog);
    let mut branches: Vec<Vec<Condition>> = attributes
        .iter()
        .map(|(attribute, property)| attribute_conditions(anchor, attribute, property, &pattern, options, scope))
        .collect();
    match branches.len() {
        0 => vec![no_match(anchor)],
        1 => branches.remove(0),
        _ => vec![any_of(anchor, branches)],
    }
}
