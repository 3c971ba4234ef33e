pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod service;

pub use config::{AppConfig, MatchingConfig};
pub use error::RecoError;
pub use models::{MatchLabel, RawTable, ReconciliationResult, Statistics};
pub use service::{reconcile, Reconciler};
