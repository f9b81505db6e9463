//! `dealmap-recon` : deal/company entity resolution and pipeline metrics.
//!
//! Pure engine crate: receives pre-loaded records, returns derived
//! collections. No CLI or file IO dependencies.

pub mod brand;
pub mod checks;
pub mod combine;
pub mod config;
pub mod direct;
pub mod domain;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod revenue;
pub mod stats;

pub use config::{Attribution, ReconConfig, RevenueKey, RunOptions};
pub use engine::{load_csv_records, load_json_records, reconcile, run};
pub use error::ReconError;
pub use model::{RawRecord, ReconInput, ReconResult};
