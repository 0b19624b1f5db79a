//! Parameter collection and job dispatch for large-deviation simulations of
//! Erdős–Rényi and stochastic block model random graphs.
//!
//! A session yields a list of [`params::Job`]s, either from prompts
//! ([`collect`]) or from a TOML plan ([`plan`]). The [`dispatch`] module feeds
//! each job's argument string to the simulation binary, or hands the jobs to
//! [`analysis`] to write the `settings.R` script for the R analysis.

pub mod error;
pub mod multiplier;
pub mod params;
pub mod collect;
pub mod plan;
pub mod analysis;
pub mod dispatch;

pub use error::{Error, Result};
