use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Config error: {0}")] 
    Config(String),
    #[error("Invalid condition: {0}")] 
    InvalidCondition(String),
    #[error("Invalid value: {0}")] 
    InvalidValue(String),
    #[error("Catalog error: {0}")] 
    Catalog(String),
    #[error("I/O error: {0}")] 
    Io(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;

// Helper conversions
impl From<config::ConfigError> for QueryError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self { Self::Catalog(e.to_string()) }
}
impl From<std::io::Error> for QueryError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
