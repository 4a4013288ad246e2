use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::TypeCatalog;
use crate::construct::{Condition, Keyword, Symbol};
use crate::keyword::{resolve_attributes, Namespace, CREATE_TIME, UPDATE_TIME};
use crate::search::SequencingOrder;

pub const CREATE_TIME_VAR: Symbol = Symbol::from_static("ct");
pub const UPDATE_TIME_VAR: Symbol = Symbol::from_static("ut");
pub const SORT_PROPERTY_VAR: Symbol = Symbol::from_static("sp");

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, ":asc"),
            Direction::Desc => write!(f, ":desc"),
        }
    }
}

/// What a query needs to be put in order: possibly a clause binding the sort
/// value, the variable to sort by (which must also be found) and a direction.
#[derive(Clone, PartialEq, Debug)]
pub struct Sequence {
    pub clause: Option<Condition>,
    pub variable: Symbol,
    pub direction: Direction,
}

impl Sequence {
    fn bound(anchor: &Symbol, attribute: Keyword, variable: Symbol, direction: Direction) -> Self {
        Self {
            clause: Some(Condition::triple(anchor, attribute, variable.clone())),
            variable,
            direction,
        }
    }
}

/// Works out how to sequence results. `None` means results stay unordered,
/// either because no order was asked for or because the sort property cannot
/// be found on any candidate type.
pub fn sequence(
    anchor: &Symbol,
    order: Option<SequencingOrder>,
    property_name: Option<&str>,
    namespace: &Namespace,
    candidate_type_names: &[String],
    catalog: &dyn TypeCatalog,
) -> Option<Sequence> {
    let direction = match order? {
        SequencingOrder::Any => return None,
        SequencingOrder::Guid => {
            return Some(Sequence {
                clause: None,
                variable: anchor.clone(),
                direction: Direction::Asc,
            });
        }
        SequencingOrder::CreationDateRecent => {
            return Some(Sequence::bound(anchor, CREATE_TIME, CREATE_TIME_VAR, Direction::Desc));
        }
        SequencingOrder::CreationDateOldest => {
            return Some(Sequence::bound(anchor, CREATE_TIME, CREATE_TIME_VAR, Direction::Asc));
        }
        SequencingOrder::LastUpdateRecent => {
            return Some(Sequence::bound(anchor, UPDATE_TIME, UPDATE_TIME_VAR, Direction::Desc));
        }
        SequencingOrder::LastUpdateOldest => {
            return Some(Sequence::bound(anchor, UPDATE_TIME, UPDATE_TIME_VAR, Direction::Asc));
        }
        SequencingOrder::PropertyAscending => Direction::Asc,
        SequencingOrder::PropertyDescending => Direction::Desc,
    };
    let property_name = match property_name {
        Some(p) => p,
        None => {
            warn!("property sequencing requested without a property, results stay unordered");
            return None;
        }
    };
    // an ambiguous property sorts by the first attribute it resolves to
    match resolve_attributes(property_name, namespace, candidate_type_names, catalog, None)
        .into_iter()
        .next()
    {
        Some(attribute) => Some(Sequence::bound(anchor, attribute, SORT_PROPERTY_VAR, direction)),
        None => {
            warn!(property = property_name, "cannot sequence by an unknown property, results stay unordered");
            None
        }
    }
}
