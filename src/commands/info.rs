use crate::cache::{CatalogCache, CatalogSource, Clock};
use crate::detail::{DetailView, KindDetails};
use crate::error::Result;
use crate::normalize::{PackageKind, normalize};
use crate::output::{self, field};
use crate::query;
use colored::Colorize;
use tracing::debug;

/// Show the detail view of one package.
///
/// Without an explicit kind the formula catalog is tried first, then casks.
/// A package that exists in neither prints a "no data" message with close
/// matches rather than failing; transport errors still fail.
pub async fn info<S, C>(
    cache: &CatalogCache<S, C>,
    api_base: &str,
    token: &str,
    kind: Option<PackageKind>,
    json: bool,
) -> Result<()>
where
    S: CatalogSource,
    C: Clock,
{
    let kinds: &[PackageKind] = match kind {
        Some(PackageKind::Formula) => &[PackageKind::Formula],
        Some(PackageKind::Cask) => &[PackageKind::Cask],
        None => &PackageKind::ALL,
    };

    let spinner = if json {
        indicatif::ProgressBar::hidden()
    } else {
        output::spinner(format!("Fetching info for {}...", token))
    };

    for &kind in kinds {
        match cache.source().fetch_package(kind, token).await {
            Ok(raw) => {
                spinner.finish_and_clear();
                let record = normalize(raw);
                let view = DetailView::from_record(&record, api_base);
                if json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    render_detail(&view);
                }
                return Ok(());
            }
            Err(e) if e.is_not_found() => {
                debug!(%kind, token, "not found, trying next kind");
            }
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        }
    }

    spinner.finish_and_clear();
    let suggestions = suggestions(cache, kinds, token).await;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "error": format!("No formula or cask found for '{}'", token),
                "suggestions": suggestions,
            })
        );
        return Ok(());
    }

    println!("{} No formula or cask found for '{}'", "✗".red(), token);
    if !suggestions.is_empty() {
        println!("Did you mean: {}", suggestions.join(", ").bold());
    }
    Ok(())
}

/// Close matches from whichever catalogs can be loaded; failures just mean no hints.
async fn suggestions<S, C>(cache: &CatalogCache<S, C>, kinds: &[PackageKind], token: &str) -> Vec<String>
where
    S: CatalogSource,
    C: Clock,
{
    let mut found = Vec::new();
    for &kind in kinds {
        match cache.get_catalog(kind).await {
            Ok(records) => found.extend(
                query::suggest(&records, token, 3)
                    .into_iter()
                    .map(str::to_string),
            ),
            Err(e) => debug!(%kind, error = %e, "no suggestions"),
        }
    }
    found.truncate(3);
    found
}

fn render_detail(view: &DetailView) {
    let heading = format!("==> {} {}", view.display_name, view.version);
    match view.kind {
        PackageKind::Formula => println!("{}", heading.bold().green()),
        PackageKind::Cask => println!("{}", heading.bold().cyan()),
    }
    println!("{}", view.description);

    if let Some(reason) = view.status.reason {
        let since = view
            .status
            .since
            .as_deref()
            .map(|date| format!(" since {}", date))
            .unwrap_or_default();
        println!("{}", format!("{}{}", reason, since).red().bold());
    }

    field("Token", &view.token);
    field("Install", view.install_command.cyan());
    if let Some(homepage) = &view.homepage {
        field("Homepage", homepage);
    }
    field("JSON", &view.json_url);

    let open_source = if view.provenance.is_open_source {
        "yes".green()
    } else {
        "no".dimmed()
    };
    field("Open source", open_source);
    if let Some(source) = &view.provenance.source_url {
        field("Source", source);
    }
    if let Some(installs) = view.installs_30d {
        field("Installs (30 days)", installs);
    }

    match &view.details {
        KindDetails::Formula(formula) => {
            field("Tap", formula.tap.to_uppercase());
            field("License", &formula.license);
            field("Bottle", yes_no(formula.has_bottle));
            field("Revision", formula.revision);
            field("Keg-only", yes_no(formula.keg_only));
            field("Dependencies", list_or_none(&formula.runtime_dependencies));
            field(
                "Build dependencies",
                list_or_none(&formula.build_dependencies),
            );
        }
        KindDetails::Cask(cask) => {
            field("macOS", &cask.macos_requirement);
            if !cask.architectures.is_empty() {
                field("Architecture", cask.architectures.join(", "));
            }
            if !cask.formula_dependencies.is_empty() {
                field("Formula dependencies", cask.formula_dependencies.join(", "));
            }
            if !cask.cask_dependencies.is_empty() {
                field("Cask dependencies", cask.cask_dependencies.join(", "));
            }
            field("Download", &cask.download_url);
            field("SHA256", &cask.sha256);
            if !cask.artifacts.is_empty() {
                println!("{}:", "Artifacts".bold());
                for artifact in &cask.artifacts {
                    println!("  {} {}", artifact.kind.dimmed(), artifact.label);
                }
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

