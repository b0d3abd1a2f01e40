//! Pilot-to-flight assignment for squadron mission planning.
//!
//! The [`assignment`] module holds the pure core: channel allocation, qualification ranking,
//! the slot model, policy validation, the assignment engine and mission commander selection.
//! [`parser`], [`display`] and [`web`] wrap it for CSV rosters, the terminal and HTTP.

pub mod assignment;
pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod web;

pub use error::{Error, Result};
