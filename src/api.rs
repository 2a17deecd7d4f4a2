//! Homebrew JSON API types and client.
//!
//! This module owns everything that touches the upstream, read-only JSON API:
//!
//! - the raw record shapes ([`RawFormula`], [`RawCask`], [`RawPackage`])
//! - the [`BrewApi`] HTTP client that downloads whole catalogs and single records
//!
//! Raw types are forgiving. Every field is defaulted and `null` is
//! accepted wherever a list or flag is expected, so a partial upstream object
//! still parses and the normalizer's fallbacks take over. Fields this crate
//! doesn't model are kept in `extra` and serialized back out untouched.
//!
//! # Examples
//!
//! ```no_run
//! use brewlens::BrewApi;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = BrewApi::new()?;
//!
//!     let formula = api.fetch_formula("ripgrep").await?;
//!     println!("Latest version: {}", formula.versions.stable.unwrap_or_default());
//!
//!     let casks = api.fetch_all_casks().await?;
//!     println!("{} casks available", casks.len());
//!
//!     Ok(())
//! }
//! ```

use crate::cache::CatalogSource;
use crate::config::Config;
use crate::error::{BrewError, Result};
use crate::normalize::{NormalizedRecord, PackageKind, normalize};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use serde::Serializer;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Accept `null` where a list, flag or string is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Versions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bottle: bool,
}

/// One entry of a formula's `urls` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable: Option<SourceUrl>,
    /// VCS checkout used by `brew install --HEAD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<SourceUrl>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Homebrew formula as published by the JSON API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFormula {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub versions: Versions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub build_dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub keg_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<FormulaUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The object exactly as the API sent it, when parsed from upstream JSON.
    #[serde(skip)]
    pub upstream: Option<Arc<Value>>,
}

impl RawFormula {
    /// Parse an upstream object, keeping it for pass-through serialization.
    pub fn from_upstream(value: Value) -> serde_json::Result<Self> {
        let mut formula = Self::deserialize(&value)?;
        formula.upstream = Some(Arc::new(value));
        Ok(formula)
    }

    /// URL of the HEAD (VCS) source, if the formula has one.
    pub fn head_url(&self) -> Option<&str> {
        self.urls
            .as_ref()
            .and_then(|urls| urls.head.as_ref())
            .and_then(|head| head.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    /// URL of the stable source archive.
    pub fn stable_url(&self) -> Option<&str> {
        self.urls
            .as_ref()
            .and_then(|urls| urls.stable.as_ref())
            .and_then(|stable| stable.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchRequirement {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaskDependsOn {
    /// Either a string like `">= :big_sur"` or an object like `{">=": ["11"]}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macos: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Vec<ArchRequirement>>,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub formula: Vec<String>,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub cask: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Homebrew cask as published by the JSON API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCask {
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub artifacts: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<CaskDependsOn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_date: Option<String>,
    /// Extra URL metadata, e.g. `{"verified": "github.com/owner/repo/"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_specs: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The object exactly as the API sent it, when parsed from upstream JSON.
    #[serde(skip)]
    pub upstream: Option<Arc<Value>>,
}

impl RawCask {
    /// Parse an upstream object, keeping it for pass-through serialization.
    pub fn from_upstream(value: Value) -> serde_json::Result<Self> {
        let mut cask = Self::deserialize(&value)?;
        cask.upstream = Some(Arc::new(value));
        Ok(cask)
    }
}

/// An upstream record of either kind.
///
/// Serializes as the bare upstream object, without a tag. Records parsed from
/// upstream JSON serialize back as the value received, nulls included.
/// Records built in code serialize from their typed fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPackage {
    Formula(RawFormula),
    Cask(RawCask),
}

impl RawPackage {
    /// Parse an upstream JSON object as the given kind.
    pub fn from_value(kind: PackageKind, value: Value) -> Result<Self> {
        Ok(match kind {
            PackageKind::Formula => RawPackage::Formula(RawFormula::from_upstream(value)?),
            PackageKind::Cask => RawPackage::Cask(RawCask::from_upstream(value)?),
        })
    }

    pub fn kind(&self) -> PackageKind {
        match self {
            RawPackage::Formula(_) => PackageKind::Formula,
            RawPackage::Cask(_) => PackageKind::Cask,
        }
    }

    pub fn homepage(&self) -> Option<&str> {
        match self {
            RawPackage::Formula(f) => f.homepage.as_deref(),
            RawPackage::Cask(c) => c.homepage.as_deref(),
        }
    }

    pub fn analytics(&self) -> Option<&Value> {
        match self {
            RawPackage::Formula(f) => f.analytics.as_ref(),
            RawPackage::Cask(c) => c.analytics.as_ref(),
        }
    }
}

impl Serialize for RawPackage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RawPackage::Formula(formula) => match &formula.upstream {
                Some(value) => value.serialize(serializer),
                None => formula.serialize(serializer),
            },
            RawPackage::Cask(cask) => match &cask.upstream {
                Some(value) => value.serialize(serializer),
                None => cask.serialize(serializer),
            },
        }
    }
}

impl From<RawFormula> for RawPackage {
    fn from(formula: RawFormula) -> Self {
        RawPackage::Formula(formula)
    }
}

impl From<RawCask> for RawPackage {
    fn from(cask: RawCask) -> Self {
        RawPackage::Cask(cask)
    }
}

/// Public JSON URL of a single record, as linked from detail views.
pub fn json_url(api_base: &str, kind: PackageKind, token: &str) -> String {
    format!("{}/{}/{}.json", api_base, kind.as_str(), token)
}

fn lookup_cache<V>(capacity: u64, ttl: Duration) -> moka::future::Cache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    moka::future::Cache::builder()
        .max_capacity(capacity)
        .time_to_live(ttl)
        .build()
}

/// Parse every catalog entry on its own, dropping the ones that don't fit.
///
/// A single malformed record must not cost the rest of the catalog.
fn decode_entries<T>(
    kind: PackageKind,
    values: Vec<Value>,
    parse: impl Fn(Value) -> serde_json::Result<T>,
) -> Vec<T> {
    let total = values.len();
    let mut first_error = None;
    let mut skipped = 0usize;

    let entries: Vec<T> = values
        .into_iter()
        .filter_map(|value| match parse(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                skipped += 1;
                first_error.get_or_insert_with(|| e.to_string());
                None
            }
        })
        .collect();

    if let Some(error) = first_error {
        warn!(%kind, skipped, total, first_error = %error, "dropped malformed catalog entries");
    }
    entries
}

/// Homebrew API client with in-memory caching of single-record lookups
#[derive(Clone)]
pub struct BrewApi {
    client: reqwest::Client,
    base_url: String,
    formula_cache: moka::future::Cache<String, RawFormula>,
    cask_cache: moka::future::Cache<String, RawCask>,
}

impl BrewApi {
    /// Create a client against the public Homebrew API with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Create a client using the base URL and timeout from `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(format!("brewlens/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Detail lookups repeat a lot while paging through a list; entries
        // expire with the catalogs so a long-running server sees updates
        let formula_cache = lookup_cache(1000, config.catalog_ttl);
        let cask_cache = lookup_cache(500, config.catalog_ttl);

        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            formula_cache,
            cask_cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Download the complete formula catalog.
    ///
    /// This is a large download (tens of MB); callers should go through
    /// [`CatalogCache`](crate::cache::CatalogCache) instead of calling it directly.
    pub async fn fetch_all_formulae(&self) -> Result<Vec<RawFormula>> {
        let url = format!("{}/formula.json", self.base_url);
        info!(url = %url, "fetching formula catalog");
        let values: Vec<Value> = self.get_json(&url, None).await?;
        Ok(decode_entries(PackageKind::Formula, values, RawFormula::from_upstream))
    }

    /// Download the complete cask catalog.
    pub async fn fetch_all_casks(&self) -> Result<Vec<RawCask>> {
        let url = format!("{}/cask.json", self.base_url);
        info!(url = %url, "fetching cask catalog");
        let values: Vec<Value> = self.get_json(&url, None).await?;
        Ok(decode_entries(PackageKind::Cask, values, RawCask::from_upstream))
    }

    /// Fetch a single formula by name.
    ///
    /// # Errors
    ///
    /// Returns [`BrewError::NotFound`] if the formula doesn't exist upstream.
    pub async fn fetch_formula(&self, name: &str) -> Result<RawFormula> {
        if let Some(cached) = self.formula_cache.get(name).await {
            debug!(name, "formula lookup served from memory");
            return Ok(cached);
        }

        let url = json_url(&self.base_url, PackageKind::Formula, name);
        let value: Value = self
            .get_json(&url, Some((PackageKind::Formula, name)))
            .await?;
        let formula = RawFormula::from_upstream(value)?;

        self.formula_cache
            .insert(name.to_string(), formula.clone())
            .await;

        Ok(formula)
    }

    /// Fetch a single cask by token.
    pub async fn fetch_cask(&self, token: &str) -> Result<RawCask> {
        if let Some(cached) = self.cask_cache.get(token).await {
            debug!(token, "cask lookup served from memory");
            return Ok(cached);
        }

        let url = json_url(&self.base_url, PackageKind::Cask, token);
        let value: Value = self.get_json(&url, Some((PackageKind::Cask, token))).await?;
        let cask = RawCask::from_upstream(value)?;

        self.cask_cache.insert(token.to_string(), cask.clone()).await;

        Ok(cask)
    }

    /// Fetch and normalize a single record for a detail view.
    pub async fn lookup(&self, kind: PackageKind, token: &str) -> Result<NormalizedRecord> {
        let raw = self.fetch_package(kind, token).await?;
        Ok(normalize(raw))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        lookup: Option<(PackageKind, &str)>,
    ) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND
            && let Some((kind, token)) = lookup
        {
            return Err(BrewError::NotFound {
                kind,
                token: token.to_string(),
            });
        }

        if !status.is_success() {
            return Err(BrewError::Upstream {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

impl CatalogSource for BrewApi {
    async fn fetch_catalog(&self, kind: PackageKind) -> Result<Vec<RawPackage>> {
        Ok(match kind {
            PackageKind::Formula => self
                .fetch_all_formulae()
                .await?
                .into_iter()
                .map(RawPackage::Formula)
                .collect(),
            PackageKind::Cask => self
                .fetch_all_casks()
                .await?
                .into_iter()
                .map(RawPackage::Cask)
                .collect(),
        })
    }

    async fn fetch_package(&self, kind: PackageKind, token: &str) -> Result<RawPackage> {
        Ok(match kind {
            PackageKind::Formula => self.fetch_formula(token).await?.into(),
            PackageKind::Cask => self.fetch_cask(token).await?.into(),
        })
    }
}
