//! Core data models for deck meta analytics.

mod aggregate;
mod decklist;
mod ids;
mod price;

pub use aggregate::*;
pub use decklist::*;
pub use ids::*;
pub use price::*;
