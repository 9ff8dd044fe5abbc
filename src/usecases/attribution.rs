use std::collections::HashMap;

use super::contracts::{DirectoryClient, DirectoryError};

const IDENTITY_CACHE_REFRESHED: &str = "IDENTITY_CACHE_REFRESHED";

/// Id to display-name cache fed by full directory snapshots.
///
/// A hit answers locally. A miss replaces the cache with a fresh snapshot and
/// looks again, so an unknown id costs one `list_users` round trip per lookup.
#[derive(Debug)]
pub struct IdentityCache<D> {
    directory: D,
    names: HashMap<i64, String>,
}

impl<D> IdentityCache<D>
where
    D: DirectoryClient,
{
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            names: HashMap::new(),
        }
    }

    /// Returns `Ok(None)` when the id is absent from a fresh snapshot.
    pub async fn display_name(&mut self, id: i64) -> Result<Option<String>, DirectoryError> {
        if let Some(name) = self.names.get(&id) {
            return Ok(Some(name.clone()));
        }

        self.refresh().await?;
        Ok(self.names.get(&id).cloned())
    }

    async fn refresh(&mut self) -> Result<(), DirectoryError> {
        let users = self.directory.list_users().await?;

        let mut names = HashMap::with_capacity(users.len());
        for user in users {
            names.entry(user.id).or_insert(user.display_name);
        }

        tracing::debug!(
            code = IDENTITY_CACHE_REFRESHED,
            entries = names.len(),
            "identity cache refreshed from directory snapshot"
        );
        self.names = names;
        Ok(())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn cached_entries(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubDirectory;

    #[tokio::test]
    async fn miss_refreshes_then_hits_stay_local() {
        let directory = StubDirectory::default()
            .with_user(1, "alice")
            .with_user(2, "bob");
        let mut cache = IdentityCache::new(&directory);

        assert_eq!(cache.display_name(2).await, Ok(Some("bob".to_owned())));
        assert_eq!(cache.display_name(1).await, Ok(Some("alice".to_owned())));
        assert_eq!(cache.display_name(2).await, Ok(Some("bob".to_owned())));

        assert_eq!(directory.list_calls(), 1);
        assert_eq!(cache.cached_entries(), 2);
    }

    #[tokio::test]
    async fn unknown_id_yields_none_after_refresh() {
        let directory = StubDirectory::default().with_user(1, "alice");
        let mut cache = IdentityCache::new(&directory);

        assert_eq!(cache.display_name(42).await, Ok(None));
        assert_eq!(cache.display_name(42).await, Ok(None));

        assert_eq!(directory.list_calls(), 2);
    }

    #[tokio::test]
    async fn first_entry_wins_for_duplicate_ids() {
        let directory = StubDirectory::default()
            .with_user(7, "first")
            .with_user(7, "second");
        let mut cache = IdentityCache::new(&directory);

        assert_eq!(cache.display_name(7).await, Ok(Some("first".to_owned())));
    }

    #[tokio::test]
    async fn directory_failure_propagates() {
        let directory = StubDirectory::default().failing("down");
        let mut cache = IdentityCache::new(&directory);

        assert_eq!(
            cache.display_name(1).await,
            Err(DirectoryError::lookup_failed("down"))
        );
    }
}
