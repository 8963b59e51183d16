//! Series Sources
//!
//! The updater fetches indicator data through [`SeriesSource`]. A fetch
//! never fails loudly: anything other than a decoded JSON body comes back
//! as `None` ("no data") and the indicator keeps its previous visuals.
//!
//! - [`HttpSource`]: reqwest client against the local series API

mod client;

pub use client::{FetchError, HttpSource, HttpSourceConfig};

use async_trait::async_trait;
use serde_json::Value;

/// Something that can serve indicator responses
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Fetch the JSON body for a request path such as `/selic?n=720`.
    ///
    /// Returns `None` on timeout, transport error, non-success status or an
    /// undecodable body.
    async fn fetch(&self, path_and_query: &str) -> Option<Value>;
}
