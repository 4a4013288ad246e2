// used for timestamps in instance properties
use chrono::{DateTime, SecondsFormat, Utc};
// used for decimal numbers
use bigdecimal::BigDecimal;

// used for (de)serializing search requests
use serde::{Deserialize, Serialize};

// maps and structs keep their keys ordered so that rendering is deterministic
use std::collections::BTreeMap;
// used to print out the canonical text form of a value
use std::fmt;

use crate::construct::Term;
use crate::error::{QueryError, Result};

// ------------- Primitive values --------------
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(i128),
    BigDecimal(BigDecimal),
    String(String),
    Date(DateTime<Utc>),
}

impl PrimitiveValue {
    pub fn data_type(&self) -> &'static str {
        match self {
            PrimitiveValue::Boolean(_) => "boolean",
            PrimitiveValue::Byte(_) => "byte",
            PrimitiveValue::Char(_) => "char",
            PrimitiveValue::Short(_) => "short",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Long(_) => "long",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::Double(_) => "double",
            PrimitiveValue::BigInteger(_) => "biginteger",
            PrimitiveValue::BigDecimal(_) => "bigdecimal",
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::Date(_) => "date",
        }
    }
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            PrimitiveValue::Boolean(_)
                | PrimitiveValue::Char(_)
                | PrimitiveValue::String(_)
                | PrimitiveValue::Date(_)
        )
    }
    pub fn to_term(&self) -> Term {
        match self {
            PrimitiveValue::Boolean(b) => Term::Bool(*b),
            PrimitiveValue::Byte(i) => Term::Long(*i as i64),
            PrimitiveValue::Char(c) => Term::Char(*c),
            PrimitiveValue::Short(i) => Term::Long(*i as i64),
            PrimitiveValue::Int(i) => Term::Long(*i as i64),
            PrimitiveValue::Long(i) => Term::Long(*i),
            PrimitiveValue::Float(d) => Term::Double(*d as f64),
            PrimitiveValue::Double(d) => Term::Double(*d),
            PrimitiveValue::BigInteger(i) => Term::BigInt(*i),
            PrimitiveValue::BigDecimal(d) => Term::BigDec(d.clone()),
            PrimitiveValue::String(s) => Term::Str(s.clone()),
            PrimitiveValue::Date(t) => Term::Inst(*t),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(b) => write!(f, "{}", b),
            PrimitiveValue::Byte(i) => write!(f, "{}", i),
            PrimitiveValue::Char(c) => write!(f, "{}", c),
            PrimitiveValue::Short(i) => write!(f, "{}", i),
            PrimitiveValue::Int(i) => write!(f, "{}", i),
            PrimitiveValue::Long(i) => write!(f, "{}", i),
            PrimitiveValue::Float(d) => write!(f, "{}", d),
            PrimitiveValue::Double(d) => write!(f, "{}", d),
            PrimitiveValue::BigInteger(i) => write!(f, "{}", i),
            PrimitiveValue::BigDecimal(d) => write!(f, "{}", d),
            PrimitiveValue::String(s) => write!(f, "{}", s),
            PrimitiveValue::Date(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

// ------------- Enum values --------------
// Enumerations are stored by ordinal, the symbolic name is only for display.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub ordinal: i32,
    pub symbolic_name: String,
}

// ------------- Array values --------------
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ArrayWire")]
pub struct ArrayValue {
    array_count: usize,
    array_values: Vec<InstancePropertyValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrayWire {
    array_count: Option<usize>,
    #[serde(default)]
    array_values: Vec<InstancePropertyValue>,
}

impl TryFrom<ArrayWire> for ArrayValue {
    type Error = QueryError;
    fn try_from(wire: ArrayWire) -> Result<Self> {
        match wire.array_count {
            Some(count) => Self::with_count(count, wire.array_values),
            None => Ok(Self::new(wire.array_values)),
        }
    }
}

impl ArrayValue {
    pub fn new(array_values: Vec<InstancePropertyValue>) -> Self {
        Self {
            array_count: array_values.len(),
            array_values,
        }
    }
    // The declared count must match the elements that are actually there.
    pub fn with_count(array_count: usize, array_values: Vec<InstancePropertyValue>) -> Result<Self> {
        if array_count != array_values.len() {
            return Err(QueryError::InvalidValue(format!(
                "array declares {} elements but carries {}",
                array_count,
                array_values.len()
            )));
        }
        Ok(Self::new(array_values))
    }
    pub fn count(&self) -> usize {
        self.array_count
    }
    pub fn values(&self) -> &[InstancePropertyValue] {
        &self.array_values
    }
}

// ------------- Instance property values --------------
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstancePropertyValue {
    Primitive(PrimitiveValue),
    Enum(EnumValue),
    Array(ArrayValue),
    Map(BTreeMap<String, InstancePropertyValue>),
    Struct(BTreeMap<String, InstancePropertyValue>),
}

impl InstancePropertyValue {
    pub fn string(s: impl Into<String>) -> Self {
        InstancePropertyValue::Primitive(PrimitiveValue::String(s.into()))
    }
    pub fn int(i: i32) -> Self {
        InstancePropertyValue::Primitive(PrimitiveValue::Int(i))
    }
    pub fn long(i: i64) -> Self {
        InstancePropertyValue::Primitive(PrimitiveValue::Long(i))
    }
    pub fn boolean(b: bool) -> Self {
        InstancePropertyValue::Primitive(PrimitiveValue::Boolean(b))
    }
    pub fn date(t: DateTime<Utc>) -> Self {
        InstancePropertyValue::Primitive(PrimitiveValue::Date(t))
    }
    pub fn array(values: Vec<InstancePropertyValue>) -> Self {
        InstancePropertyValue::Array(ArrayValue::new(values))
    }
    pub fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::array(values.into_iter().map(Self::string).collect())
    }
    pub fn data_type(&self) -> &'static str {
        match self {
            InstancePropertyValue::Primitive(p) => p.data_type(),
            InstancePropertyValue::Enum(_) => "enum",
            InstancePropertyValue::Array(_) => "array",
            InstancePropertyValue::Map(_) => "map",
            InstancePropertyValue::Struct(_) => "struct",
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InstancePropertyValue::Primitive(PrimitiveValue::String(s)) => Some(s),
            _ => None,
        }
    }
    /// A single literal for the value, when it has one. Collections do not.
    pub fn to_term(&self) -> Result<Term> {
        match self {
            InstancePropertyValue::Primitive(p) => Ok(p.to_term()),
            InstancePropertyValue::Enum(e) => Ok(Term::Long(e.ordinal as i64)),
            other => Err(QueryError::InvalidValue(format!(
                "a {} value cannot be used as a single literal",
                other.data_type()
            ))),
        }
    }
}

fn write_entries(f: &mut fmt::Formatter, entries: &BTreeMap<String, InstancePropertyValue>) -> fmt::Result {
    let rendered: Vec<String> = entries.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    write!(f, "{{{}}}", rendered.join(", "))
}

impl fmt::Display for InstancePropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstancePropertyValue::Primitive(p) => write!(f, "{}", p),
            InstancePropertyValue::Enum(e) => write!(f, "{}", e.symbolic_name),
            InstancePropertyValue::Array(a) => {
                let rendered: Vec<String> = a.values().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            InstancePropertyValue::Map(entries) | InstancePropertyValue::Struct(entries) => {
                write_entries(f, entries)
            }
        }
    }
}
