//! Conversion of raw upstream records into the uniform display model.
//!
//! A [`NormalizedRecord`] is what list pages, detail views, the query engine and
//! the pass-through endpoint all work with. It is built once by [`normalize`]
//! and never mutated afterwards, so its precomputed search key can't drift from
//! the fields it was derived from.

use crate::api::{RawCask, RawFormula, RawPackage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shown when a record has no description.
pub const NO_DESCRIPTION: &str = "No description available.";

/// Shown when a formula has no stable version.
pub const UNKNOWN_VERSION: &str = "N/A";

/// Which catalog a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Formula,
    Cask,
}

impl PackageKind {
    pub const ALL: [PackageKind; 2] = [PackageKind::Formula, PackageKind::Cask];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageKind::Formula => "formula",
            PackageKind::Cask => "cask",
        }
    }

    pub fn install_prefix(self) -> &'static str {
        match self {
            PackageKind::Formula => "brew install",
            PackageKind::Cask => "brew install --cask",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "formula" | "formulae" => Ok(PackageKind::Formula),
            "cask" | "casks" => Ok(PackageKind::Cask),
            other => Err(format!("unknown package type '{other}'")),
        }
    }
}

/// Uniform, immutable view of one formula or cask.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    id: String,
    kind: PackageKind,
    display_name: String,
    token: String,
    description: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprecated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disabled: Option<bool>,
    install_command: String,
    raw: RawPackage,
    #[serde(skip)]
    search_key: String,
}

impl NormalizedRecord {
    /// Cask `full_token` or formula `name`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Cask `full_token` or formula `full_name`.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn deprecated(&self) -> Option<bool> {
        self.deprecated
    }

    pub fn disabled(&self) -> Option<bool> {
        self.disabled
    }

    pub fn install_command(&self) -> &str {
        &self.install_command
    }

    pub fn raw(&self) -> &RawPackage {
        &self.raw
    }

    /// Lowercased `id`, display name and upstream description, space separated.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }
}

/// Normalize one upstream record.
///
/// Total: any record that deserialized produces a record. Missing names fall
/// back to the id, a missing description to [`NO_DESCRIPTION`] and a missing
/// version to [`UNKNOWN_VERSION`].
pub fn normalize(raw: RawPackage) -> NormalizedRecord {
    let fields = match &raw {
        RawPackage::Formula(formula) => formula_fields(formula),
        RawPackage::Cask(cask) => cask_fields(cask),
    };
    let kind = raw.kind();

    let search_key = format!(
        "{} {} {}",
        fields.id,
        fields.display_name,
        fields.desc.as_deref().unwrap_or("")
    )
    .to_lowercase();

    NormalizedRecord {
        install_command: format!("{} {}", kind.install_prefix(), fields.id),
        description: fields
            .desc
            .filter(|desc| !desc.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        id: fields.id,
        kind,
        display_name: fields.display_name,
        token: fields.token,
        version: fields.version,
        homepage: fields.homepage,
        deprecated: fields.deprecated,
        disabled: fields.disabled,
        raw,
        search_key,
    }
}

struct Fields {
    id: String,
    display_name: String,
    token: String,
    desc: Option<String>,
    version: String,
    homepage: Option<String>,
    deprecated: Option<bool>,
    disabled: Option<bool>,
}

fn formula_fields(formula: &RawFormula) -> Fields {
    let id = formula.name.clone();
    let token = non_empty(&formula.full_name).unwrap_or(&id).to_string();

    Fields {
        display_name: id.clone(),
        token,
        desc: formula.desc.clone(),
        version: formula
            .versions
            .stable
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(UNKNOWN_VERSION)
            .to_string(),
        homepage: formula.homepage.clone(),
        deprecated: formula.deprecated,
        disabled: formula.disabled,
        id,
    }
}

fn cask_fields(cask: &RawCask) -> Fields {
    let id = non_empty(&cask.full_token)
        .unwrap_or(&cask.token)
        .to_string();
    let display_name = cask
        .name
        .first()
        .map(String::as_str)
        .and_then(non_empty)
        .unwrap_or(&id)
        .to_string();

    Fields {
        display_name,
        token: id.clone(),
        desc: cask.desc.clone(),
        version: cask
            .version
            .as_deref()
            .and_then(non_empty)
            .unwrap_or(UNKNOWN_VERSION)
            .to_string(),
        homepage: cask.homepage.clone(),
        deprecated: cask.deprecated,
        disabled: cask.disabled,
        id,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}
