//! Client side of the `/api/get-models-stations` lookup service.

mod cache;
mod client;
mod models;

pub use cache::CachedLookup;
pub use client::{LookupClient, MODELS_STATIONS_PATH};
pub use models::{LookupCounts, LookupQuery, LookupResult};

use futures::future::BoxFuture;

use crate::error::LookupError;

/// Anything that can answer a models/stations lookup.
///
/// The synchronizer never calls this directly; the filter session spawns
/// one call per issued request.
pub trait LookupService: Send + Sync {
    fn lookup<'a>(&'a self, query: &'a LookupQuery)
    -> BoxFuture<'a, Result<LookupResult, LookupError>>;
}
