//! What a detail page shows for one package.
//!
//! [`DetailView`] flattens a [`NormalizedRecord`] plus the raw fields that never
//! made it into the normalized shape (dependencies, artifacts, checksums...)
//! into display-ready values with the fallbacks already applied.

use crate::api::{RawCask, RawFormula, RawPackage, json_url};
use crate::normalize::{NormalizedRecord, PackageKind};
use crate::provenance::{ProvenanceStatus, classify};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_TAP: &str = "homebrew/core";
pub const DEFAULT_MACOS_REQUIREMENT: &str = ">= 10.15";
pub const NOT_AVAILABLE: &str = "Not available";

/// Whether a package can still be installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStatus {
    pub installable: bool,
    /// "Deprecated" or "Disabled"; deprecation wins when both are set.
    pub reason: Option<&'static str>,
    pub since: Option<String>,
}

impl PackageStatus {
    pub fn of(record: &NormalizedRecord) -> Self {
        let (deprecation_date, disable_date) = match record.raw() {
            RawPackage::Formula(f) => (f.deprecation_date.clone(), f.disable_date.clone()),
            RawPackage::Cask(c) => (c.deprecation_date.clone(), c.disable_date.clone()),
        };

        if record.deprecated().unwrap_or(false) {
            Self {
                installable: false,
                reason: Some("Deprecated"),
                since: deprecation_date,
            }
        } else if record.disabled().unwrap_or(false) {
            Self {
                installable: false,
                reason: Some("Disabled"),
                since: disable_date,
            }
        } else {
            Self {
                installable: true,
                reason: None,
                since: None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaDetails {
    pub tap: String,
    pub license: String,
    pub has_bottle: bool,
    pub revision: u32,
    pub keg_only: bool,
    pub runtime_dependencies: Vec<String>,
    pub build_dependencies: Vec<String>,
}

/// One row of a cask's artifact list, e.g. `("app", "Firefox.app")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSummary {
    pub kind: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaskDetails {
    pub artifacts: Vec<ArtifactSummary>,
    pub download_url: String,
    pub sha256: String,
    pub macos_requirement: String,
    pub formula_dependencies: Vec<String>,
    pub cask_dependencies: Vec<String>,
    pub architectures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KindDetails {
    Formula(FormulaDetails),
    Cask(CaskDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub kind: PackageKind,
    pub display_name: String,
    pub token: String,
    pub description: String,
    pub version: String,
    pub homepage: Option<String>,
    pub install_command: String,
    pub json_url: String,
    pub status: PackageStatus,
    pub provenance: ProvenanceStatus,
    pub installs_30d: Option<u64>,
    pub details: KindDetails,
}

impl DetailView {
    pub fn from_record(record: &NormalizedRecord, api_base: &str) -> Self {
        let details = match record.raw() {
            RawPackage::Formula(formula) => KindDetails::Formula(formula_details(formula)),
            RawPackage::Cask(cask) => KindDetails::Cask(cask_details(cask)),
        };

        Self {
            kind: record.kind(),
            display_name: record.display_name().to_string(),
            token: record.token().to_string(),
            description: record.description().to_string(),
            version: record.version().to_string(),
            homepage: record.homepage().map(str::to_string),
            install_command: record.install_command().to_string(),
            json_url: json_url(api_base, record.kind(), record.id()),
            status: PackageStatus::of(record),
            provenance: classify(record),
            installs_30d: record.raw().analytics().and_then(installs_30d),
            details,
        }
    }
}

fn formula_details(formula: &RawFormula) -> FormulaDetails {
    FormulaDetails {
        tap: formula
            .tap
            .clone()
            .filter(|tap| !tap.is_empty())
            .unwrap_or_else(|| DEFAULT_TAP.to_string()),
        license: formula
            .license
            .clone()
            .filter(|license| !license.is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        has_bottle: formula.bottle.as_ref().is_some_and(|bottle| !bottle.is_null())
            || formula.versions.bottle,
        revision: formula.revision.unwrap_or(0),
        keg_only: formula.keg_only,
        runtime_dependencies: formula.dependencies.clone(),
        build_dependencies: formula.build_dependencies.clone(),
    }
}

fn cask_details(cask: &RawCask) -> CaskDetails {
    let depends_on = cask.depends_on.clone().unwrap_or_default();

    CaskDetails {
        artifacts: cask.artifacts.iter().map(summarize_artifact).collect(),
        download_url: cask
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        sha256: cask
            .sha256
            .clone()
            .filter(|sha| !sha.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        macos_requirement: macos_requirement(depends_on.macos.as_ref()),
        formula_dependencies: depends_on.formula,
        cask_dependencies: depends_on.cask,
        architectures: depends_on
            .arch
            .unwrap_or_default()
            .into_iter()
            .map(|arch| match arch.bits {
                Some(bits) => format!("{} ({}-bit)", arch.kind, bits),
                None => arch.kind,
            })
            .collect(),
    }
}

/// `{"app": ["Firefox.app"]}` -> `("app", "Firefox.app")`; a bare string is a `file`.
pub fn summarize_artifact(artifact: &Value) -> ArtifactSummary {
    match artifact {
        Value::Object(map) => match map.iter().next() {
            Some((kind, value)) => ArtifactSummary {
                kind: kind.clone(),
                label: format_artifact_value(value),
            },
            None => ArtifactSummary {
                kind: "file".to_string(),
                label: String::new(),
            },
        },
        other => ArtifactSummary {
            kind: "file".to_string(),
            label: format_artifact_value(other),
        },
    }
}

/// Render an artifact value without dumping raw JSON where avoidable.
///
/// Arrays are joined with `, ` and objects show their first value.
pub fn format_artifact_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(format_artifact_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => match map.values().next() {
            Some(first) => format_artifact_value(first),
            None => "{}".to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `{">=": ["11"]}` -> `>= 11`, `">= :big_sur"` as-is, absent -> `>= 10.15`.
pub fn macos_requirement(macos: Option<&Value>) -> String {
    match macos {
        Some(Value::Object(map)) => match map.iter().next() {
            Some((op, version)) => format!("{} {}", op, format_artifact_value(version)),
            None => DEFAULT_MACOS_REQUIREMENT.to_string(),
        },
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => DEFAULT_MACOS_REQUIREMENT.to_string(),
    }
}

/// Sum of `analytics.install["30d"]` counts.
pub fn installs_30d(analytics: &Value) -> Option<u64> {
    let counts = analytics.get("install")?.get("30d")?.as_object()?;
    Some(counts.values().filter_map(Value::as_u64).sum())
}
