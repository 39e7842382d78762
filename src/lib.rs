//! Sovereign credit rating model: builds a country/year panel from a local
//! series file and the World Bank API, scores the latest cross-section on a
//! 22-step ladder, and derives outlooks, comments and comparison reports.
pub mod comment;
pub mod config;
pub mod countries;
pub mod error;
pub mod indicators;
pub mod interpolate;
pub mod loader;
pub mod logging;
pub mod outlook;
pub mod output;
pub mod panel;
pub mod pipeline;
pub mod provider;
pub mod reports;
pub mod scoring;
pub mod stats;
pub mod trend;
pub mod types;
pub mod util;

pub use error::{RatingError, Result};
