//! Normalize wide weekly financial summary exports into tidy weekly
//! metrics, then summarize them.
//!
//! Flow: [`loader`] reads each export into a [`types::RawTable`], [`melt`]
//! reshapes it into [`types::TidyRecord`]s (using [`util`] for headers and
//! amounts and [`channel`] for metric labels), [`scope`] trims the time
//! window, and [`reports`] aggregates the result. [`pipeline::run`] does
//! all of it and persists the outputs through [`output`].
pub mod channel;
pub mod config;
pub mod error;
pub mod loader;
pub mod melt;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod scope;
pub mod types;
pub mod util;

pub use error::{EtlError, Result};
