use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),

    #[error("environment variable `{0}` is not valid unicode")]
    NotUnicode(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
