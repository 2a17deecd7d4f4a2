use crate::cache::{CatalogCache, CatalogSource, Clock};
use crate::error::Result;
use crate::normalize::{NormalizedRecord, PackageKind};
use crate::output::{self, page_strip, page_summary, status_badge, truncate};
use crate::pagination::{PageStore, Paginator};
use crate::query::{self, IndexJump};
use colored::Colorize;

const DESCRIPTION_WIDTH: usize = 72;

pub struct BrowseOptions {
    pub kind: PackageKind,
    pub query: Option<String>,
    pub page: Option<usize>,
    pub per_page: usize,
    pub jump: Option<IndexJump>,
}

/// Print one page of a catalog, optionally filtered or jumped to a letter.
///
/// Unfiltered browsing remembers its page per kind; searches always start on
/// page 1 unless `--page` says otherwise.
pub async fn browse<S, C>(
    cache: &CatalogCache<S, C>,
    store: &dyn PageStore,
    options: &BrowseOptions,
) -> Result<()>
where
    S: CatalogSource,
    C: Clock,
{
    let kind = options.kind;
    let spinner = output::spinner(format!("Loading {} catalog...", kind));
    let records = cache.get_catalog(kind).await;
    spinner.finish_and_clear();
    let records = records?;

    let query = options.query.as_deref().unwrap_or("").trim();
    let visible = query::filter(&records, query);

    let mut paginator = if query.is_empty() {
        Paginator::restore(format!("browse:{}", kind), store, visible.len(), options.per_page)
    } else {
        Paginator::new(visible.len(), options.per_page)
    };

    if let Some(jump) = options.jump {
        match query::resolve_jump(&records, jump, options.per_page) {
            Some(page) => {
                paginator.set_page(page);
            }
            None => {
                if let IndexJump::Letter(letter) = jump {
                    println!(
                        "{} No {} starts with '{}', staying on page {}",
                        "✗".yellow(),
                        kind,
                        letter,
                        paginator.current_page()
                    );
                }
            }
        }
    } else if let Some(page) = options.page {
        paginator.set_page(page);
    }

    paginator.persist(store);

    if visible.is_empty() {
        if query.is_empty() {
            println!("{} The {} catalog is empty", "✗".red(), kind);
        } else {
            println!("{} No {} found matching '{}'", "✗".red(), kind, query);
        }
        return Ok(());
    }

    render_page(kind, paginator.slice(&visible), &paginator);
    Ok(())
}

fn render_page(kind: PackageKind, page: &[&NormalizedRecord], paginator: &Paginator) {
    let heading = match kind {
        PackageKind::Formula => "==> Formulae".bold().green(),
        PackageKind::Cask => "==> Casks".bold().cyan(),
    };
    println!("{}", heading);

    for record in page {
        let id = match kind {
            PackageKind::Formula => record.id().bold().green(),
            PackageKind::Cask => record.id().bold().cyan(),
        };
        print!("{} {}", id, record.version().dimmed());
        if record.display_name() != record.id() {
            print!(" {}", format!("({})", record.display_name()).dimmed());
        }
        let badge = status_badge(crate::detail::PackageStatus::of(record).reason);
        if !badge.is_empty() {
            print!(" {}", badge);
        }
        println!();
        println!("    {}", truncate(record.description(), DESCRIPTION_WIDTH));
    }

    println!();
    if paginator.total_pages() > 1 {
        println!("{}", page_strip(paginator, 2));
    }
    println!("{}", page_summary(paginator).dimmed());
}
