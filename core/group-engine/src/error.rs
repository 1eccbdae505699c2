//! FILENAME: core/group-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("Field '{path}' cannot be resolved on {type_name}")]
    FieldResolution { type_name: &'static str, path: String },

    #[error("Cannot convert {value} to {target}")]
    Conversion { value: String, target: &'static str },

    #[error("Unsupported group interval: {0}")]
    UnsupportedInterval(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type GroupResult<T> = Result<T, GroupError>;
