//! Core types for the travel service.

pub mod travel;

pub use travel::{FieldUpdate, Travel, TravelId, TravelIdError};
