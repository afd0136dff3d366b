//! Paginated media search factory
//!
//! One generic factory covers movies, TV and people; the media kind is a
//! key discriminator, so each kind keeps its own cache entries and
//! invalidation scope.

use crate::backend::Backend;
use crate::cache::QueryClass;
use crate::error::PreconditionError;
use crate::key::search_key;
use crate::queries::QueryOptions;
use crate::types::{Locale, MediaKind, MediaSummary, SearchFilters};
use futures::FutureExt;
use std::sync::Arc;

/// Descriptor for a localized, filtered media search
///
/// Disabled while the query string is blank; the fetch function also
/// rejects a blank query with a precondition error in case it is invoked
/// anyway.
pub fn search_query(
    backend: Arc<dyn Backend>,
    locale: Locale,
    kind: MediaKind,
    query: String,
    filters: SearchFilters,
) -> QueryOptions<MediaSummary> {
    let key = search_key(&locale, kind, &query, &filters);
    let enabled = !query.trim().is_empty();

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let locale = locale.clone();
        let query = query.clone();
        let filters = filters.clone();
        async move {
            if query.trim().is_empty() {
                return Err(PreconditionError::EmptyQuery.into());
            }
            backend.search(&locale, kind, &query, &filters, page).await
        }
        .boxed()
    });

    QueryOptions {
        key,
        enabled,
        class: QueryClass::Interactive,
        fetch,
    }
}
