//! Open-source provenance of a record.
//!
//! [`classify`] looks at every URL a record carries and decides whether the
//! package is hosted on a public code forge and where its source lives. It is a
//! pure function of the record and is recomputed on every render.
//!
//! The forge check is a substring scan over all candidate URLs joined together.
//! A homepage that merely mentions `github.com` in a query string will count as
//! open source. That heuristic is kept on purpose for compatibility with the
//! web explorer this mirrors.

use crate::api::{RawCask, RawFormula, RawPackage};
use crate::normalize::NormalizedRecord;
use serde::Serialize;
use serde_json::Value;

/// Hosts whose presence marks a package as open source.
pub const FORGE_DOMAINS: [&str; 4] = ["github.com", "gitlab.com", "bitbucket.org", "codeberg.org"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceStatus {
    pub verified: bool,
    pub is_open_source: bool,
    pub source_url: Option<String>,
}

/// Derive the provenance of a normalized record.
pub fn classify(record: &NormalizedRecord) -> ProvenanceStatus {
    match record.raw() {
        RawPackage::Formula(formula) => classify_formula(formula, record.homepage()),
        RawPackage::Cask(cask) => classify_cask(cask, record.homepage()),
    }
}

fn classify_formula(formula: &RawFormula, homepage: Option<&str>) -> ProvenanceStatus {
    let head = formula.head_url();
    let candidates: Vec<&str> = [homepage, formula.stable_url(), head]
        .into_iter()
        .flatten()
        .filter(|url| !url.trim().is_empty())
        .collect();

    ProvenanceStatus {
        verified: head.is_some(),
        is_open_source: mentions_forge(&candidates),
        source_url: head.map(str::to_string),
    }
}

fn classify_cask(cask: &RawCask, homepage: Option<&str>) -> ProvenanceStatus {
    let mut candidates = Vec::new();
    if let Some(specs) = &cask.url_specs {
        for value in specs.values() {
            collect_strings(value, &mut candidates);
        }
    }
    candidates.extend(homepage);
    candidates.retain(|url| !url.trim().is_empty());

    let Some(first) = candidates.first() else {
        return ProvenanceStatus {
            verified: false,
            is_open_source: false,
            source_url: None,
        };
    };

    ProvenanceStatus {
        verified: true,
        is_open_source: mentions_forge(&candidates),
        source_url: Some(with_scheme(first)),
    }
}

/// Every string leaf of a JSON value, depth first.
fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

fn mentions_forge(candidates: &[&str]) -> bool {
    let haystack = candidates.join(" ").to_lowercase();
    FORGE_DOMAINS.iter().any(|domain| haystack.contains(domain))
}

/// `github.com/foo/bar` -> `http://github.com/foo/bar`; URLs with a scheme are kept.
pub fn with_scheme(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
