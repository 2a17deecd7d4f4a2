//! Time-bounded, process-wide cache of the two full catalogs.
//!
//! Each kind moves through `Empty -> Ready(ts) -> Stale(ts) -> Ready(ts') -> ...`.
//! Staleness is purely time based ([`CatalogEntry::is_stale`]); there is no
//! invalidation API. The cache is an ordinary value: construct one, wrap it in
//! an `Arc` and hand it to whoever needs catalogs. Tests inject a fake
//! [`CatalogSource`] and a manual [`Clock`].
//!
//! Two callers that miss at the same time will both fetch. The second result
//! simply overwrites the first; readers only ever see complete catalogs.

use crate::api::RawPackage;
use crate::error::{BrewError, Result};
use crate::normalize::{NormalizedRecord, PackageKind, normalize};
use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The upstream API: whole catalogs and single records.
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(
        &self,
        kind: PackageKind,
    ) -> impl Future<Output = Result<Vec<RawPackage>>> + Send;

    /// One record by token. Unknown tokens are [`BrewError::NotFound`].
    fn fetch_package(
        &self,
        kind: PackageKind,
        token: &str,
    ) -> impl Future<Output = Result<RawPackage>> + Send;
}

/// Wall clock, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fully normalized catalog and when it was fetched.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub records: Arc<[NormalizedRecord]>,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.fetched_at) >= ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Ready { fetched_at: DateTime<Utc> },
    Stale { fetched_at: DateTime<Utc> },
}

pub struct CatalogCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: TimeDelta,
    entries: RwLock<HashMap<PackageKind, CatalogEntry>>,
}

impl<S: CatalogSource> CatalogCache<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, SystemClock, ttl)
    }
}

impl<S: CatalogSource, C: Clock> CatalogCache<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Return the catalog for `kind`, fetching it if missing or stale.
    ///
    /// On failure the previous entry stays where it was (it is not served) and
    /// the error is returned to the caller.
    pub async fn get_catalog(&self, kind: PackageKind) -> Result<Arc<[NormalizedRecord]>> {
        if let Some(records) = self.fresh(kind) {
            debug!(%kind, count = records.len(), "catalog served from cache");
            return Ok(records);
        }

        let raw = match self.source.fetch_catalog(kind).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%kind, error = %e, "catalog fetch failed");
                return Err(e);
            }
        };

        let records = normalize_all(raw).await?;
        let fetched_at = self.clock.now();
        info!(%kind, count = records.len(), "catalog refreshed");

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                kind,
                CatalogEntry {
                    records: Arc::clone(&records),
                    fetched_at,
                },
            );

        Ok(records)
    }

    pub fn state(&self, kind: PackageKind) -> CacheState {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&kind) {
            None => CacheState::Empty,
            Some(entry) if entry.is_stale(self.clock.now(), self.ttl) => CacheState::Stale {
                fetched_at: entry.fetched_at,
            },
            Some(entry) => CacheState::Ready {
                fetched_at: entry.fetched_at,
            },
        }
    }

    fn fresh(&self, kind: PackageKind) -> Option<Arc<[NormalizedRecord]>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&kind)
            .filter(|entry| !entry.is_stale(self.clock.now(), self.ttl))
            .map(|entry| Arc::clone(&entry.records))
    }
}

/// Normalize a whole catalog off the async executor, preserving order.
async fn normalize_all(raw: Vec<RawPackage>) -> Result<Arc<[NormalizedRecord]>> {
    tokio::task::spawn_blocking(move || {
        let records: Vec<NormalizedRecord> = raw.into_par_iter().map(normalize).collect();
        Arc::<[NormalizedRecord]>::from(records)
    })
    .await
    .map_err(|e| BrewError::Other(e.into()))
}
