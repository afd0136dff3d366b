//! Profile and follow-graph query and mutation factories

use crate::backend::Backend;
use crate::cache::QueryClass;
use crate::error::Result;
use crate::key::{following_key, profile_key, QueryKey};
use crate::mutation::{MutationOutcome, MutationRunner, MutationSpec};
use crate::queries::{FlatQueryOptions, QueryOptions};
use crate::types::{Profile, UserId};
use futures::FutureExt;
use std::sync::Arc;

/// Descriptor for a public profile
pub fn profile_query(backend: Arc<dyn Backend>, user: UserId) -> FlatQueryOptions<Profile> {
    let key = profile_key(&user);
    let enabled = !user.as_str().is_empty();

    let fetch = Arc::new(move || {
        let backend = backend.clone();
        let user = user.clone();
        async move {
            if user.as_str().is_empty() {
                return Err(crate::error::PreconditionError::missing("user_id").into());
            }
            backend.profile(&user).await
        }
        .boxed()
    });

    FlatQueryOptions {
        key,
        enabled,
        class: QueryClass::Interactive,
        fetch,
    }
}

/// Descriptor for the users a user follows
pub fn following_query(backend: Arc<dyn Backend>, user: UserId) -> QueryOptions<Profile> {
    let key = following_key(&user);

    let fetch = Arc::new(move |page: u32| {
        let backend = backend.clone();
        let user = user.clone();
        async move { backend.following(&user, page).await }.boxed()
    });

    QueryOptions {
        key,
        enabled: true,
        class: QueryClass::Background,
        fetch,
    }
}

/// Key prefixes a follow-graph write can affect
pub fn follow_invalidates(user: &UserId, target: &UserId) -> Vec<QueryKey> {
    vec![following_key(user), profile_key(target)]
}

/// Follow another user
///
/// No-ops on an empty target or a self-follow.
pub async fn follow(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    target: Option<UserId>,
) -> Result<MutationOutcome<()>> {
    let spec = target
        .as_ref()
        .filter(|target| !target.as_str().is_empty() && *target != user)
        .map(|target| MutationSpec {
            success_key: "profile.followed",
            invalidates: follow_invalidates(user, target),
        });

    let user = user.clone();
    runner
        .run(spec, async move {
            match target {
                Some(target) => backend.follow(&user, &target).await,
                None => Ok(()),
            }
        })
        .await
}

/// Unfollow a user
pub async fn unfollow(
    runner: &MutationRunner,
    backend: Arc<dyn Backend>,
    user: &UserId,
    target: Option<UserId>,
) -> Result<MutationOutcome<()>> {
    let spec = target
        .as_ref()
        .filter(|target| !target.as_str().is_empty())
        .map(|target| MutationSpec {
            success_key: "profile.unfollowed",
            invalidates: follow_invalidates(user, target),
        });

    let user = user.clone();
    runner
        .run(spec, async move {
            match target {
                Some(target) => backend.unfollow(&user, &target).await,
                None => Ok(()),
            }
        })
        .await
}
