// used for hashing the variable stems handed out by a scope
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{BTreeSet, HashMap};

// used for the borrowed/owned duality of symbols and keywords
use std::borrow::Cow;

// used to print out the EDN form of a construct
use std::fmt;

// value types that may appear as literals in a clause
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Symbol -------------
// A logic variable or a function name in a clause. Equality is structural,
// so there is no need for an intern table.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(Cow<'static, str>);

/// The document variable every search query projects.
pub const DOC_ID: Symbol = Symbol::from_static("e");
/// The relationship variable of a graph traversal.
pub const RELATIONSHIP: Symbol = Symbol::from_static("r");
/// Elide marker, binds nothing.
pub const ELIDE: Symbol = Symbol::from_static("_");

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
    pub fn name(&self) -> &str {
        &self.0
    }
    pub fn is_elided(&self) -> bool {
        self.0 == "_"
    }
}
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------- Keyword -------------
// An attribute under which a value is physically stored: an optional
// namespace plus a name, rendered :namespace/name or :name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Keyword {
    namespace: Option<Cow<'static, str>>,
    name: Cow<'static, str>,
}

impl Keyword {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|ns| Cow::Owned(ns.to_string())),
            name: Cow::Owned(name.into()),
        }
    }
    pub const fn from_static(name: &'static str) -> Self {
        Self {
            namespace: None,
            name: Cow::Borrowed(name),
        }
    }
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, ":{}/{}", namespace, self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

// ------------- Term -------------
#[derive(Clone, PartialEq, Debug)]
pub enum Term {
    Symbol(Symbol),
    Keyword(Keyword),
    Str(String),
    Long(i64),
    Double(f64),
    Bool(bool),
    BigInt(i128),
    BigDec(BigDecimal),
    Char(char),
    Inst(DateTime<Utc>),
    Pattern(String),
    Nil,
}

impl From<Symbol> for Term {
    fn from(symbol: Symbol) -> Self {
        Term::Symbol(symbol)
    }
}
impl From<&Symbol> for Term {
    fn from(symbol: &Symbol) -> Self {
        Term::Symbol(symbol.clone())
    }
}
impl From<Keyword> for Term {
    fn from(keyword: Keyword) -> Self {
        Term::Keyword(keyword)
    }
}
impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Str(s.to_string())
    }
}
impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Str(s)
    }
}
impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Long(i)
    }
}
impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Bool(b)
    }
}

fn write_escaped(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            _ => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Symbol(s) => write!(f, "{}", s),
            Term::Keyword(k) => write!(f, "{}", k),
            Term::Str(s) => write_escaped(f, s),
            Term::Long(i) => write!(f, "{}", i),
            Term::Double(d) if d.is_nan() => write!(f, "##NaN"),
            Term::Double(d) if d.is_infinite() => {
                write!(f, "{}", if *d > 0. { "##Inf" } else { "##-Inf" })
            }
            Term::Double(d) if d.fract() == 0. => write!(f, "{:.1}", d),
            Term::Double(d) => write!(f, "{}", d),
            Term::Bool(b) => write!(f, "{}", b),
            Term::BigInt(i) => write!(f, "{}N", i),
            Term::BigDec(d) => write!(f, "{}M", d),
            Term::Char(c) => match c {
                '\n' => write!(f, "\\newline"),
                ' ' => write!(f, "\\space"),
                '\t' => write!(f, "\\tab"),
                '\r' => write!(f, "\\return"),
                _ => write!(f, "\\{}", c),
            },
            Term::Inst(t) => write!(f, "#inst \"{}\"", t.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            // regular expressions are passed through untouched, except for quotes
            Term::Pattern(p) => write!(f, "#\"{}\"", p.replace('"', "\\\"")),
            Term::Nil => write!(f, "nil"),
        }
    }
}

// ------------- Call -------------
// A function application (f arg ...) used inside binding and predicate clauses.
#[derive(Clone, PartialEq, Debug)]
pub struct Call {
    function: Symbol,
    args: Vec<Term>,
}
impl Call {
    pub fn new(function: &'static str, args: Vec<Term>) -> Self {
        Self {
            function: Symbol::from_static(function),
            args,
        }
    }
    pub fn function(&self) -> &Symbol {
        &self.function
    }
    pub fn args(&self) -> &[Term] {
        &self.args
    }
}
impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.function)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}

// ------------- Bind -------------
// Right hand side of a binding clause: a scalar variable or a destructured relation.
#[derive(Clone, PartialEq, Debug)]
pub enum Bind {
    Scalar(Symbol),
    Relation(Vec<Symbol>),
}
impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bind::Scalar(s) => write!(f, "{}", s),
            Bind::Relation(columns) => write!(f, "[[{}]]", join(columns)),
        }
    }
}

pub(crate) fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ------------- Condition -------------
#[derive(Clone, PartialEq, Debug)]
pub enum Condition {
    Triple {
        entity: Symbol,
        attribute: Keyword,
        value: Term,
    },
    Binding {
        call: Call,
        bind: Bind,
    },
    Predicate(Call),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    OrJoin {
        bindings: Vec<Symbol>,
        branches: Vec<Condition>,
    },
    Not(Vec<Condition>),
    NotJoin {
        bindings: Vec<Symbol>,
        body: Vec<Condition>,
    },
}

impl Condition {
    pub fn triple(entity: &Symbol, attribute: Keyword, value: impl Into<Term>) -> Self {
        Condition::Triple {
            entity: entity.clone(),
            attribute,
            value: value.into(),
        }
    }
    pub fn binding(call: Call, variable: &Symbol) -> Self {
        Condition::Binding {
            call,
            bind: Bind::Scalar(variable.clone()),
        }
    }
    pub fn predicate(call: Call) -> Self {
        Condition::Predicate(call)
    }
    pub fn is_triple(&self) -> bool {
        matches!(self, Condition::Triple { .. })
    }
    /// Collapses a list of conditions into one, wrapping in `and` when needed.
    pub fn group(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::And(conditions)
        }
    }
    /// The logic variables this clause exposes to its surroundings. Variables
    /// local to a join form are hidden behind its binding vector.
    pub fn variables(&self) -> BTreeSet<Symbol> {
        let mut variables = BTreeSet::new();
        self.collect_variables(&mut variables);
        variables
    }
    fn collect_variables(&self, into: &mut BTreeSet<Symbol>) {
        let mut add = |s: &Symbol| {
            if !s.is_elided() {
                into.insert(s.clone());
            }
        };
        match self {
            Condition::Triple { entity, value, .. } => {
                add(entity);
                if let Term::Symbol(s) = value {
                    add(s);
                }
            }
            Condition::Binding { call, bind } => {
                call.args().iter().for_each(|a| {
                    if let Term::Symbol(s) = a {
                        add(s)
                    }
                });
                match bind {
                    Bind::Scalar(s) => add(s),
                    Bind::Relation(columns) => columns.iter().for_each(&mut add),
                }
            }
            Condition::Predicate(call) => call.args().iter().for_each(|a| {
                if let Term::Symbol(s) = a {
                    add(s)
                }
            }),
            Condition::OrJoin { bindings, .. } | Condition::NotJoin { bindings, .. } => {
                bindings.iter().for_each(add)
            }
            Condition::And(nested) | Condition::Or(nested) | Condition::Not(nested) => {
                for condition in nested {
                    condition.collect_variables(into);
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::Triple {
                entity,
                attribute,
                value,
            } => write!(f, "[{} {} {}]", entity, attribute, value),
            Condition::Binding { call, bind } => write!(f, "[{} {}]", call, bind),
            Condition::Predicate(call) => write!(f, "[{}]", call),
            Condition::And(nested) => write!(f, "(and {})", join(nested)),
            Condition::Or(nested) => write!(f, "(or {})", join(nested)),
            Condition::OrJoin { bindings, branches } => {
                write!(f, "(or-join [{}] {})", join(bindings), join(branches))
            }
            Condition::Not(nested) => write!(f, "(not {})", join(nested)),
            Condition::NotJoin { bindings, body } => {
                write!(f, "(not-join [{}] {})", join(bindings), join(body))
            }
        }
    }
}

// ------------- VarScope -------------
// Hands out capture variables derived from a property name. The first use of
// a property yields v_name, later uses within the same scope get a numeric
// suffix, so equal input always produces equal variable names.
#[derive(Clone, Debug, Default)]
pub struct VarScope {
    used: HashMap<String, usize, OtherHasher>,
}

/// The variables a single leaf condition may capture into.
#[derive(Clone, PartialEq, Debug)]
pub struct Captures {
    pub value: Symbol,
    pub text: Symbol,
    pub set: Symbol,
}

impl VarScope {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn captures(&mut self, property: &str) -> Captures {
        let stem = sanitize(property);
        let count = self.used.entry(stem.clone()).or_insert(0);
        *count += 1;
        let suffix = if *count == 1 {
            String::new()
        } else {
            format!("_{}", count)
        };
        Captures {
            value: Symbol::new(format!("v_{}{}", stem, suffix)),
            text: Symbol::new(format!("s_{}{}", stem, suffix)),
            set: Symbol::new(format!("set_{}{}", stem, suffix)),
        }
    }
}

lazy_static::lazy_static! {
    // anything that would not survive as part of a symbol name
    static ref NON_SYMBOL: regex::Regex = regex::Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

fn sanitize(property: &str) -> String {
    let stem = NON_SYMBOL.replace_all(property, "_").to_string();
    if stem.is_empty() { String::from("property") } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_clauses_as_edn() {
        let triple = Condition::triple(&DOC_ID, Keyword::new(Some("entityProperties"), "Referenceable.qualifiedName.value"), "a \"quoted\" name");
        assert_eq!(
            triple.to_string(),
            "[e :entityProperties/Referenceable.qualifiedName.value \"a \\\"quoted\\\" name\"]"
        );
        let not_join = Condition::NotJoin {
            bindings: vec![DOC_ID],
            body: vec![Condition::predicate(Call::new("not=", vec![Term::from(&DOC_ID), Term::Nil]))],
        };
        assert_eq!(not_join.to_string(), "(not-join [e] [(not= e nil)])");
        let search = Condition::Binding {
            call: Call::new("wildcard-text-search", vec![Term::from("*x*")]),
            bind: Bind::Relation(vec![DOC_ID, ELIDE, ELIDE, ELIDE]),
        };
        assert_eq!(search.to_string(), "[(wildcard-text-search \"*x*\") [[e _ _ _]]]");
    }

    #[test]
    fn renders_literals() {
        assert_eq!(Term::Double(2.0).to_string(), "2.0");
        assert_eq!(Term::Double(2.5).to_string(), "2.5");
        assert_eq!(Term::BigInt(12).to_string(), "12N");
        assert_eq!(Term::Char(' ').to_string(), "\\space");
        assert_eq!(Term::Pattern(String::from("(?i)\\Qa\\E")).to_string(), "#\"(?i)\\Qa\\E\"");
        let t = DateTime::parse_from_rfc3339("2021-03-04T05:06:07Z").unwrap().with_timezone(&Utc);
        assert_eq!(Term::Inst(t).to_string(), "#inst \"2021-03-04T05:06:07.000Z\"");
    }

    #[test]
    fn scope_suffixes_repeated_properties() {
        let mut scope = VarScope::new();
        assert_eq!(scope.captures("qualifiedName").value.name(), "v_qualifiedName");
        let second = scope.captures("qualifiedName");
        assert_eq!(second.value.name(), "v_qualifiedName_2");
        assert_eq!(second.text.name(), "s_qualifiedName_2");
        assert_eq!(scope.captures("my.odd-name").set.name(), "set_my_odd_name");
    }

    #[test]
    fn join_forms_hide_local_variables() {
        let body = vec![
            Condition::triple(&DOC_ID, Keyword::from_static("currentStatus"), Symbol::new("v_x")),
        ];
        let not_join = Condition::NotJoin { bindings: vec![DOC_ID], body: body.clone() };
        assert_eq!(not_join.variables().into_iter().collect::<Vec<_>>(), vec![DOC_ID]);
        assert_eq!(Condition::And(body).variables().len(), 2);
    }
}
