//! Free-text address resolution.
//!
//! [`AddressResolver`] sits between keystrokes and the autocomplete
//! collaborator: it debounces input, skips queries below the minimum
//! length, cancels superseded lookups, and goes quiet after a selection
//! until the text is edited again.

mod client;
mod resolver;

pub use client::HttpGeocoder;
pub use resolver::AddressResolver;

use async_trait::async_trait;
use thiserror::Error;

use crate::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("autocomplete request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("autocomplete service returned status {0}")]
    Status(u16),
    #[error("autocomplete response rejected: {0}")]
    Malformed(String),
}

/// Collaborator seam for autocomplete lookups.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Search candidate points for a settled query text.
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<GeoPoint>, GeocodeError>;
}
