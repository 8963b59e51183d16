//! # Painel
//!
//! Economic indicator dashboard. Polls a local series API for the policy
//! rate (SELIC), inflation expectations (Focus), the IPCA index (SIDRA), an
//! IPEA sample series and GDP (World Bank), and keeps a line chart, preview
//! tables and a CSV download link current for each of them.
//!
//! ## Modules
//!
//! - [`indicators`]: the fixed indicator table
//! - [`series`]: JSON coercion into aligned labels/values
//! - [`source`]: series source trait and the reqwest-backed HTTP client
//! - [`page`]: page elements, charts, preview tables, HTML rendering
//! - [`export`]: CSV text and data URIs
//! - [`seed`]: fallback series rendered before the first cycle
//! - [`updater`]: the poll/update/render cycle
//! - [`api`]: dashboard HTTP server
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use painel::{HttpSource, HttpSourceConfig, Updater, UpdaterConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(HttpSource::new(HttpSourceConfig::default())?);
//!     let updater = Updater::new(source, UpdaterConfig::default());
//!
//!     let report = updater.update().await;
//!     println!("updated: {:?}, skipped: {:?}", report.updated, report.skipped);
//!
//!     println!("{}", updater.html().await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod indicators;
pub mod page;
pub mod seed;
pub mod series;
pub mod source;
pub mod updater;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    generate_default_config, Config, ConfigError, LoggingConfig, OutputConfig, PollerConfig,
    ServerConfig,
};

pub use export::{csv_data_uri, csv_text, ExportError};

pub use indicators::{IndicatorSpec, INDICATORS, LAST_UPDATED_ID};

pub use page::{Chart, ChartRegistry, Element, Page, PreviewTable};

pub use seed::{SeedData, SeedError};

pub use series::{Row, Series};

pub use source::{FetchError, HttpSource, HttpSourceConfig, SeriesSource};

pub use updater::{CycleReport, Updater, UpdaterConfig, UpdaterStatus};
