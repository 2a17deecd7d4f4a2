// Test helpers shared by the integration test files
// Fixture builders, an in-memory catalog source and a manual clock

#![allow(dead_code)]

use brewlens::api::{RawCask, RawFormula, RawPackage, Versions};
use brewlens::error::{BrewError, Result};
use brewlens::{CatalogSource, Clock, NormalizedRecord, PackageKind, normalize};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A formula with a name, description and stable version
pub fn formula(name: &str, desc: &str) -> RawFormula {
    RawFormula {
        name: name.to_string(),
        full_name: name.to_string(),
        desc: Some(desc.to_string()),
        versions: Versions {
            stable: Some("1.0.0".to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A cask with one display name and a description
pub fn cask(token: &str, display_name: &str, desc: &str) -> RawCask {
    RawCask {
        token: token.to_string(),
        full_token: token.to_string(),
        name: vec![display_name.to_string()],
        desc: Some(desc.to_string()),
        version: Some("2.0".to_string()),
        ..Default::default()
    }
}

/// `count` formulae named `pkg-000`, `pkg-001`, ... in order
pub fn numbered_formulae(count: usize) -> Vec<RawPackage> {
    (0..count)
        .map(|i| formula(&format!("pkg-{:03}", i), &format!("Package number {}", i)).into())
        .collect()
}

pub fn records(raw: Vec<RawPackage>) -> Vec<NormalizedRecord> {
    raw.into_iter().map(normalize).collect()
}

/// Catalog source backed by fixed vectors, counting every call
#[derive(Default)]
pub struct FakeSource {
    pub formulae: Mutex<Vec<RawPackage>>,
    pub casks: Mutex<Vec<RawPackage>>,
    pub catalog_fetches: AtomicUsize,
    pub package_fetches: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeSource {
    pub fn new(formulae: Vec<RawPackage>, casks: Vec<RawPackage>) -> Self {
        Self {
            formulae: Mutex::new(formulae),
            casks: Mutex::new(casks),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_formulae(&self, formulae: Vec<RawPackage>) {
        *self.formulae.lock().unwrap() = formulae;
    }

    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    fn catalog(&self, kind: PackageKind) -> Vec<RawPackage> {
        match kind {
            PackageKind::Formula => self.formulae.lock().unwrap().clone(),
            PackageKind::Cask => self.casks.lock().unwrap().clone(),
        }
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BrewError::Other(anyhow::anyhow!("upstream unavailable")));
        }
        Ok(())
    }
}

impl CatalogSource for FakeSource {
    async fn fetch_catalog(&self, kind: PackageKind) -> Result<Vec<RawPackage>> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.catalog(kind))
    }

    async fn fetch_package(&self, kind: PackageKind, token: &str) -> Result<RawPackage> {
        self.package_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        self.catalog(kind)
            .into_iter()
            .find(|raw| {
                let record = normalize(raw.clone());
                record.id() == token || record.token() == token
            })
            .ok_or_else(|| BrewError::NotFound {
                kind,
                token: token.to_string(),
            })
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
