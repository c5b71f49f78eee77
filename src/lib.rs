//! # Deck Meta
//!
//! Decklist analytics for trading card game tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (decklist entries, aggregates, prices)
//! - **calculate**: Aggregation, representative decklists and similarity scoring
//! - **storage**: JSONL data lake standing in for the warehouse
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
