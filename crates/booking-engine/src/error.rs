//! Error types for booking-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid rule definition: {0}")]
    InvalidRuleDefinition(String),

    #[error("Invalid slot definition: {0}")]
    InvalidSlotDefinition(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
