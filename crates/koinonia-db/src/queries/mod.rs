//! Database query implementations.

pub mod alerts;
pub mod cells;
pub mod converts;
pub mod events;
pub mod meetings;
pub mod people;
pub mod supervisions;
