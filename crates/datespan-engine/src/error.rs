//! Error types for datespan-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid dates")]
    InvalidDates,

    #[error("Second date should be after first")]
    SecondDateBeforeFirst,

    #[error("Invalid day filter: {0}")]
    InvalidDayFilter(String),

    #[error("Invalid duration unit: {0}")]
    InvalidUnit(String),

    #[error("Invalid date input: {0}")]
    InvalidSlot(String),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
