//! bankdesk-core: synthetic banking dataset generation and analytics.
//!
//! The generator builds a seeded, referentially consistent dataset; the
//! analytics and algorithms read it; the View Model owns session state and
//! runs long work on the task runner. Nothing here draws to a screen.

pub mod algorithms;
pub mod analytics;
pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod generator;
pub mod invariants;
pub mod name_generator;
pub mod report;
pub mod results;
pub mod rng;
pub mod task;
pub mod types;
pub mod view_model;

pub use error::{BankError, BankResult};
