// used to keep the one-to-one mapping between type names and their GUIDs
use bimap::BiMap;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::construct::OtherHasher;
use crate::error::{QueryError, Result};
use crate::search::TypeCategory;

// ------------- Attribute types -------------
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    String,
    Date,
    Enum,
    Array(Box<AttributeType>),
    Map,
    Struct,
}

impl AttributeType {
    pub fn is_text(&self) -> bool {
        matches!(self, AttributeType::String)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub name: String,
    pub attribute_type: AttributeType,
}

// ------------- Type definitions -------------
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub guid: String,
    pub name: String,
    pub category: TypeCategory,
    #[serde(default)]
    pub super_type: Option<String>,
    #[serde(default)]
    pub properties: Vec<AttributeDef>,
}

impl TypeDef {
    pub fn declares(&self, property_name: &str) -> Option<&AttributeDef> {
        self.properties.iter().find(|p| p.name == property_name)
    }
}

/// Read-only view of the type model that query construction consults.
pub trait TypeCatalog: Send + Sync {
    fn type_def(&self, name: &str) -> Option<&TypeDef>;
    fn type_name(&self, guid: &str) -> Option<&str>;
    /// All known types, in the order they were kept.
    fn type_defs(&self) -> Vec<&TypeDef>;

    fn types_of_category(&self, category: TypeCategory) -> Vec<&TypeDef> {
        self.type_defs().into_iter().filter(|t| t.category == category).collect()
    }
    /// The type itself followed by its supertypes, most specific first.
    fn ancestors(&self, name: &str) -> Vec<&TypeDef> {
        let mut lineage: Vec<&TypeDef> = Vec::new();
        let mut next = self.type_def(name);
        while let Some(type_def) = next {
            // a malformed model could loop back on itself
            if lineage.iter().any(|t| t.name == type_def.name) {
                break;
            }
            lineage.push(type_def);
            next = type_def.super_type.as_deref().and_then(|s| self.type_def(s));
        }
        lineage
    }
    /// The type itself followed by every type that inherits from it.
    fn subtypes(&self, name: &str) -> Vec<&TypeDef> {
        self.type_defs()
            .into_iter()
            .filter(|t| self.ancestors(&t.name).iter().any(|a| a.name == name))
            .collect()
    }
    fn declaring_types(&self, property_name: &str) -> Vec<&TypeDef> {
        self.type_defs()
            .into_iter()
            .filter(|t| t.declares(property_name).is_some())
            .collect()
    }
}

// ------------- TypeKeeper -------------
#[derive(Debug, Default)]
pub struct TypeKeeper {
    kept: Vec<TypeDef>,
    lookup: HashMap<String, usize, OtherHasher>,
    guids: BiMap<String, String>, // name <-> guid
}

impl TypeKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_defs(type_defs: Vec<TypeDef>) -> Result<Self> {
        let mut keeper = Self::new();
        for type_def in type_defs {
            keeper.keep(type_def)?;
        }
        Ok(keeper)
    }
    pub fn from_json(json: &str) -> Result<Self> {
        let type_defs: Vec<TypeDef> = serde_json::from_str(json)?;
        Self::from_defs(type_defs)
    }
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
    /// Keeps a type definition, reporting whether an identical one was already kept.
    /// A name or GUID that is reused for a different definition is an error.
    pub fn keep(&mut self, type_def: TypeDef) -> Result<bool> {
        if let Some(index) = self.lookup.get(&type_def.name) {
            if self.kept[*index] == type_def {
                return Ok(true);
            }
            return Err(QueryError::Catalog(format!("type {} is already defined differently", type_def.name)));
        }
        if self
            .guids
            .insert_no_overwrite(type_def.name.clone(), type_def.guid.clone())
            .is_err()
        {
            return Err(QueryError::Catalog(format!("type GUID {} is already in use", type_def.guid)));
        }
        self.lookup.insert(type_def.name.clone(), self.kept.len());
        self.kept.push(type_def);
        Ok(false)
    }
    pub fn type_guid(&self, name: &str) -> Option<&str> {
        self.guids.get_by_left(name).map(|g| g.as_str())
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl TypeCatalog for TypeKeeper {
    fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.lookup.get(name).map(|i| &self.kept[*i])
    }
    fn type_name(&self, guid: &str) -> Option<&str> {
        self.guids.get_by_right(guid).map(|n| n.as_str())
    }
    fn type_defs(&self) -> Vec<&TypeDef> {
        self.kept.iter().collect()
    }
}
