// canonical regex shapes are recognized so cheaper clauses can stand in for re-matches
use regex::Regex;

const CASE_INSENSITIVE: &str = "(?i)";
const QUOTE_START: &str = "\\Q";
const QUOTE_END: &str = "\\E";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    Exact,
    StartsWith,
    EndsWith,
    Contains,
    Regex,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TextPattern {
    shape: Shape,
    literal: String,
    case_insensitive: bool,
    raw: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Token {
    Literal(char),
    Meta(char),
}

fn is_metachar(c: char) -> bool {
    matches!(c, '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\')
}

// Splits a regex into literal characters and everything else. Escaped
// metacharacters and quoted sections are literal, escapes like \d are not.
fn tokenize(regex: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = regex;
    while let Some(c) = rest.chars().next() {
        if let Some(quoted) = rest.strip_prefix(QUOTE_START) {
            let (literal, remainder) = match quoted.find(QUOTE_END) {
                Some(end) => (&quoted[..end], &quoted[end + QUOTE_END.len()..]),
                None => (quoted, ""),
            };
            tokens.extend(literal.chars().map(Token::Literal));
            rest = remainder;
            continue;
        }
        if c == '\\' {
            let mut chars = rest[1..].chars();
            match chars.next() {
                Some(escaped) if is_metachar(escaped) || !escaped.is_alphanumeric() => {
                    tokens.push(Token::Literal(escaped));
                }
                Some(escaped) => {
                    tokens.push(Token::Meta('\\'));
                    tokens.push(Token::Meta(escaped));
                }
                None => tokens.push(Token::Meta('\\')),
            }
            rest = chars.as_str();
            continue;
        }
        tokens.push(if is_metachar(c) { Token::Meta(c) } else { Token::Literal(c) });
        rest = &rest[c.len_utf8()..];
    }
    tokens
}

fn literal_of(tokens: &[Token]) -> Option<String> {
    tokens
        .iter()
        .map(|t| match t {
            Token::Literal(c) => Some(*c),
            Token::Meta(_) => None,
        })
        .collect()
}

const WILDCARD: [Token; 2] = [Token::Meta('.'), Token::Meta('*')];

impl TextPattern {
    pub fn parse(regex: &str) -> Self {
        let (case_insensitive, body) = match regex.strip_prefix(CASE_INSENSITIVE) {
            Some(body) => (true, body),
            None => (false, regex),
        };
        let tokens = tokenize(body);
        let leading = tokens.starts_with(&WILDCARD);
        // the trailing wildcard may not reuse the characters of the leading one
        let minimum = if leading { 4 } else { 2 };
        let trailing = tokens.ends_with(&WILDCARD) && tokens.len() >= minimum;
        let start = if leading { 2 } else { 0 };
        let end = if trailing { tokens.len() - 2 } else { tokens.len() };
        let (shape, literal) = match literal_of(&tokens[start..end.max(start)]) {
            Some(literal) if !(leading || trailing) || !literal.is_empty() => {
                let shape = match (leading, trailing) {
                    (false, false) => Shape::Exact,
                    (false, true) => Shape::StartsWith,
                    (true, false) => Shape::EndsWith,
                    (true, true) => Shape::Contains,
                };
                (shape, literal)
            }
            _ => (Shape::Regex, String::new()),
        };
        Self {
            shape,
            literal,
            case_insensitive,
            raw: regex.to_string(),
        }
    }
    pub fn exact(literal: &str) -> Self {
        Self::parse(&exact_match_regex(literal, false))
    }
    pub fn shape(&self) -> Shape {
        self.shape
    }
    /// The unescaped literal of a canonical shape, empty for free-form regexes.
    pub fn literal(&self) -> &str {
        &self.literal
    }
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }
    pub fn raw(&self) -> &str {
        &self.raw
    }
    /// The regex to hand to a generic pattern match, with the case flag inlined.
    pub fn regex(&self, case_insensitive: bool) -> String {
        let insensitive = case_insensitive || self.case_insensitive;
        match self.shape {
            Shape::Exact => exact_match_regex(&self.literal, insensitive),
            Shape::StartsWith => starts_with_regex(&self.literal, insensitive),
            Shape::EndsWith => ends_with_regex(&self.literal, insensitive),
            Shape::Contains => contains_regex(&self.literal, insensitive),
            Shape::Regex if insensitive && !self.raw.starts_with(CASE_INSENSITIVE) => {
                format!("{}{}", CASE_INSENSITIVE, self.raw)
            }
            Shape::Regex => self.raw.clone(),
        }
    }
    /// The wildcard query for a full-text index, if the shape can be answered by one.
    pub fn lucene_query(&self) -> Option<String> {
        let escaped = escape_lucene(&self.literal);
        match self.shape {
            Shape::Exact => Some(escaped),
            Shape::StartsWith => Some(format!("{}*", escaped)),
            Shape::EndsWith => Some(format!("*{}", escaped)),
            Shape::Contains => Some(format!("*{}*", escaped)),
            Shape::Regex => None,
        }
    }
}

// ------------- Regex constructors -------------
fn quote(literal: &str) -> String {
    // a literal \E has to be closed, emitted escaped, and reopened
    format!(
        "{}{}{}",
        QUOTE_START,
        literal.replace(QUOTE_END, "\\E\\\\E\\Q"),
        QUOTE_END
    )
}

fn flag(case_insensitive: bool) -> &'static str {
    if case_insensitive { CASE_INSENSITIVE } else { "" }
}

pub fn exact_match_regex(literal: &str, case_insensitive: bool) -> String {
    format!("{}{}", flag(case_insensitive), quote(literal))
}
pub fn starts_with_regex(literal: &str, case_insensitive: bool) -> String {
    format!("{}{}.*", flag(case_insensitive), quote(literal))
}
pub fn ends_with_regex(literal: &str, case_insensitive: bool) -> String {
    format!("{}.*{}", flag(case_insensitive), quote(literal))
}
pub fn contains_regex(literal: &str, case_insensitive: bool) -> String {
    format!("{}.*{}.*", flag(case_insensitive), quote(literal))
}

/// The plain string a regex stands for, if it contains nothing but literal characters.
pub fn unqualified_literal(regex: &str) -> Option<String> {
    literal_of(&tokenize(regex))
}

lazy_static::lazy_static! {
    // characters with a meaning in the Lucene query syntax
    static ref LUCENE_SPECIAL: Regex = Regex::new(r#"[+\-&|!(){}\[\]^"~*?:\\/]"#).unwrap();
}

pub fn escape_lucene(literal: &str) -> String {
    LUCENE_SPECIAL.replace_all(literal, "\\$0").to_string()
}
