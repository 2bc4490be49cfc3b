pub mod tour;
pub mod rider;
pub mod repository;
pub mod payment;
pub mod notify;

pub use tour::{Team, Tour, TourDetail, TourId};
pub use rider::{Contact, Gender, Rider};

/// Error type every collaborator adapter reports through.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
