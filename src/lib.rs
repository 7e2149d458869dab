//! Searchlight — automated confidence scoring for UK local-authority
//! property search cases.
//!
//! The crate takes a matter's LLC1/CON29 documents plus property
//! identifiers, fuses pattern extraction, spatial overlay checks, and
//! historical accuracy statistics into calibrated per-field confidences,
//! and decides how much of the result can be machine-certified versus
//! routed to human review.
//!
//! Entry point: [`pipeline::CaseProcessor::process_case`].

pub mod config;
pub mod models;
pub mod pipeline;
pub mod stats;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the engine. Library users
/// that install their own subscriber should skip this.
pub fn init_telemetry() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("searchlight=info")),
        )
        .init();

    tracing::info!("Searchlight starting v{}", config::APP_VERSION);
}
