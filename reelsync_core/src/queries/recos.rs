//! Recommendation query and mutation factories

use crate::backend::Backend;
use crate::cache::QueryClass;
use crate::error::Result;
use crate::key::{reco_targets_key, recos_key, QueryKey};
use crate::mutation::{MutationOutcome, MutationRunner, MutationSpec};
use crate::queries::QueryOptions;
use crate::types::{MediaId, Reco, RecoTarget, UserId};
use futures::FutureExt;
use std::sync::Arc;

/// Descriptor for the recommendations a user has received
pub fn recos_query(backend: Arc<dyn Backend>, user: UserId) -> QueryOptions<Reco> {
    let key = recos_key(&user);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.recos(&user, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Descriptor for the friends a media can be recommended to
///
/// Carries the `already_sent`/`as_watched` flags per target.
pub fn reco_targets_query(
    backend: Arc<dyn Backend>,
    user: UserId,
    media: MediaId,
) -> QueryOptions<RecoTarget> {
    let key = reco_targets_key(&user, media);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.reco_targets(&user, media, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Key prefixes sending a reco can affect
///
/// The targets list carries `already_sent` flags that flip after a send.
pub fn send_reco_invalidates(from: &UserId, media: MediaId) -> Vec<QueryKey> {
    vec![reco_targets_key(from, media)]
}

/// Send a recommendation to the selected friends
///
/// No-ops when the selection is empty.
pub async fn send_reco(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    from: &UserId,
    to: Vec<UserId>,
    media: MediaId,
    as_watched: bool,
) -> Result<MutationOutcome<()>> {
    let spec = if to.is_empty() {
        None
    } else {
        Some(MutationSpec {
            success_key: "recos.sent",
            invalidates: send_reco_invalidates(from, media),
        })
    };

    let from = from.clone();
    runner
        .run(spec, async move {
            backend.send_reco(&from, &to, media, as_watched).await
        })
        .await
}
