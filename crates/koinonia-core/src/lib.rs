//! Koinonia Core Library
//!
//! Domain models and business logic for the cell-church management system:
//! consolidation (new-convert follow-up), cells and meetings, and the
//! supervision health pipeline.

pub mod cell;
pub mod consolidation;
pub mod error;
pub mod person;
pub mod supervision;
pub mod time;

pub use error::{KoinoniaError, KoinoniaResult};
