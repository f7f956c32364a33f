//! `parcours-recon`: merges formation enrollment statistics with establishment
//! details.
//!
//! Pure engine crate: loads two CSV sources, joins them on a normalized
//! establishment name and hands back the merged catalog plus the list of
//! establishments that matched nothing. No CLI dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod output;
pub mod query;

pub use config::MergeConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{MergeOutcome, MergedRecord, PrimaryRecord, SupplementaryRecord};
pub use normalize::{normalize, NormalizedKey};
