//! Error types for the simulation core

use thiserror::Error;

use crate::sim::BodyHandle;

/// Simulation errors
///
/// None of these are transient: the core has no I/O boundary, so every
/// variant means the run cannot continue safely.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A physical parameter reached the core outside its valid range
    #[error("Invalid physical parameter `{name}`: {value}")]
    InvalidPhysicalParameter { name: &'static str, value: f64 },

    /// Body is already registered in the world
    #[error("Body already registered: {0:?}")]
    DuplicateRegistration(BodyHandle),

    /// Body is not registered in the world
    #[error("Unknown body: {0:?}")]
    UnknownEntity(BodyHandle),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>) -> Self {
        SimError::InvalidPhysicalParameter {
            name,
            value: value.into(),
        }
    }
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
