use crate::cache::{CatalogCache, CatalogSource, Clock};
use crate::error::Result;
use crate::normalize::PackageKind;
use crate::server::{self, AppState};
use std::sync::Arc;
use tracing::warn;

/// Run the pass-through API until the process is stopped.
///
/// With `warm`, both catalogs are fetched before the listener opens so the
/// first request doesn't pay for the download.
pub async fn serve<S, C>(
    cache: Arc<CatalogCache<S, C>>,
    api_base: &str,
    host: &str,
    port: u16,
    warm: bool,
) -> Result<()>
where
    S: CatalogSource + 'static,
    C: Clock + 'static,
{
    if warm {
        let (formulae, casks) = tokio::join!(
            cache.get_catalog(PackageKind::Formula),
            cache.get_catalog(PackageKind::Cask)
        );
        for (kind, result) in [(PackageKind::Formula, formulae), (PackageKind::Cask, casks)] {
            if let Err(e) = result {
                warn!(%kind, error = %e, "could not warm catalog, will retry on first request");
            }
        }
    }

    server::serve(AppState::new(cache, api_base), host, port).await
}
