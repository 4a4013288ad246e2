use crate::catalog::TypeCatalog;
use crate::condition::{combine, ConditionBuilder};
use crate::construct::{Call, Condition, Keyword, Symbol, Term, VarScope};
use crate::error::Result;
use crate::keyword::{Namespace, CLASSIFICATIONS, CURRENT_STATUS, ENTITY_PROXY, TYPE_CATEGORY, TYPE_GUIDS};
use crate::search::{InstanceStatus, SearchClassifications, TypeCategory};
use crate::text::BuildOptions;

/// Variables named after the anchor, so that limiters on different anchors
/// of one query never collide.
fn anchored(anchor: &Symbol, suffix: &str) -> Symbol {
    Symbol::new(format!("{}_{}", anchor, suffix))
}

// bind, build the set, test membership
fn membership(anchor: &Symbol, attribute: Keyword, members: Vec<Term>, value: &str, set: &str) -> Vec<Condition> {
    let value = anchored(anchor, value);
    let set = anchored(anchor, set);
    vec![
        Condition::triple(anchor, attribute, value.clone()),
        Condition::binding(Call::new("hash-set", members), &set),
        Condition::predicate(Call::new("contains?", vec![Term::from(&set), Term::from(&value)])),
    ]
}

/// Each named classification must be present, and its own properties must
/// match where given. The names combine like the conditions of a property
/// search. The result is spliced into the top level of a query, so nothing
/// is wrapped in `and`.
pub fn classification_conditions(
    search_classifications: Option<&SearchClassifications>,
    anchor: &Symbol,
    catalog: &dyn TypeCatalog,
    options: BuildOptions,
    scope: &mut VarScope,
) -> Result<Option<Vec<Condition>>> {
    let search_classifications = match search_classifications {
        Some(s) => s,
        None => return Ok(None),
    };
    let mut parts = Vec::with_capacity(search_classifications.conditions.len());
    for condition in &search_classifications.conditions {
        let mut part = vec![Condition::triple(anchor, CLASSIFICATIONS, condition.name.as_str())];
        let namespace = Namespace::classification(&condition.name);
        let candidates = [condition.name.clone()];
        let properties = ConditionBuilder::new(catalog, &namespace, &candidates, options, anchor)
            .property_conditions(condition.match_properties.as_ref(), false, scope)?;
        if let Some(properties) = properties {
            part.extend(properties);
        }
        parts.push(part);
    }
    Ok(Some(combine(search_classifications.match_criteria, parts, false, anchor)))
}

/// Requires at least one of the named classifications, without looking at
/// their properties.
pub fn classification_name_conditions(anchor: &Symbol, classification_names: &[String]) -> Vec<Condition> {
    match classification_names {
        [] => Vec::new(),
        [name] => vec![Condition::triple(anchor, CLASSIFICATIONS, name.as_str())],
        names => {
            let members = names.iter().map(|n| Term::from(n.as_str())).collect();
            membership(anchor, CLASSIFICATIONS, members, "classification", "classifications")
        }
    }
}

/// Limits by type: the category alone, one exact type, or a type and its
/// subtypes. Entities are additionally required not to be proxies.
pub fn type_conditions(
    anchor: &Symbol,
    category: TypeCategory,
    type_guid: Option<&str>,
    subtype_guids: &[String],
    include_proxy_marker: bool,
) -> Vec<Condition> {
    let mut conditions = match type_guid {
        None => vec![Condition::triple(anchor, TYPE_CATEGORY, category.ordinal())],
        Some(guid) if subtype_guids.is_empty() => vec![Condition::triple(anchor, TYPE_GUIDS, guid)],
        Some(_) => {
            let members = subtype_guids.iter().map(|g| Term::from(g.as_str())).collect();
            membership(anchor, TYPE_GUIDS, members, "type", "types")
        }
    };
    if include_proxy_marker {
        conditions.push(Condition::triple(anchor, ENTITY_PROXY, false));
    }
    conditions
}

/// Limits by current status. Without an explicit list everything but deleted
/// instances is returned.
pub fn status_conditions(anchor: &Symbol, statuses: Option<&[InstanceStatus]>) -> Vec<Condition> {
    match statuses {
        Some(statuses) if !statuses.is_empty() => {
            let members = statuses.iter().map(|s| Term::Long(s.ordinal())).collect();
            membership(anchor, CURRENT_STATUS, members, "status", "statuses")
        }
        _ => {
            let status = anchored(anchor, "status");
            vec![
                Condition::triple(anchor, CURRENT_STATUS, status.clone()),
                Condition::predicate(Call::new(
                    "not=",
                    vec![Term::from(&status), Term::Long(InstanceStatus::Deleted.ordinal())],
                )),
            ]
        }
    }
}
