//! In-Memory Profile Store Implementation
//!
//! 进程内存储，用于测试和 `registry.backend = "memory"`

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{ProfileStoreError, ProfileStorePort};
use crate::domain::voiceprint::{UserId, VoiceProfile};

/// 内存档案存储
pub struct InMemoryProfileStore {
    profiles: DashMap<UserId, VoiceProfile>,
    /// 小写用户名 -> user_id
    names: DashMap<String, UserId>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
            names: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStorePort for InMemoryProfileStore {
    async fn create(&self, profile: &VoiceProfile) -> Result<(), ProfileStoreError> {
        let user_id = *profile.user_id();

        // 名字占位在分片锁内完成
        match self.names.entry(profile.user_name().uniqueness_key()) {
            Entry::Occupied(_) => {
                return Err(ProfileStoreError::DuplicateName(
                    profile.user_name().to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(user_id);
            }
        }

        self.profiles.insert(user_id, profile.clone());
        tracing::debug!(user_id = %user_id, "Voice profile stored in memory");
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<VoiceProfile, ProfileStoreError> {
        self.profiles
            .get(user_id)
            .map(|p| p.clone())
            .ok_or(ProfileStoreError::NotFound(*user_id))
    }

    async fn list_all(&self) -> Result<Vec<VoiceProfile>, ProfileStoreError> {
        Ok(self.profiles.iter().map(|p| p.value().clone()).collect())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileStoreError> {
        let key = self
            .profiles
            .get(user_id)
            .map(|p| p.user_name().uniqueness_key())
            .ok_or(ProfileStoreError::NotFound(*user_id))?;

        // 先释放名字再移除档案；只释放仍属于该 user_id 的名字
        self.names.remove_if(&key, |_, owner| owner == user_id);
        self.profiles
            .remove(user_id)
            .ok_or(ProfileStoreError::NotFound(*user_id))?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, ProfileStoreError> {
        Ok(self.profiles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voiceprint::{EnrollmentPolicy, UserName};

    fn profile(name: &str) -> VoiceProfile {
        EnrollmentPolicy::default()
            .build_profile(
                UserName::new(name).unwrap(),
                vec![vec![1.0, 0.0, 0.0]; 5],
                &[0, 1, 2, 3, 4],
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_list() {
        let store = InMemoryProfileStore::new();
        let p = profile("Alice");
        store.create(&p).await.unwrap();

        assert_eq!(store.get(p.user_id()).await.unwrap(), p);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_case_insensitive() {
        let store = InMemoryProfileStore::new();
        store.create(&profile("Alice")).await.unwrap();

        let result = store.create(&profile("  alice ")).await;
        assert!(matches!(result, Err(ProfileStoreError::DuplicateName(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_releases_name() {
        let store = InMemoryProfileStore::new();
        let p = profile("Bob");
        store.create(&p).await.unwrap();
        store.delete(p.user_id()).await.unwrap();

        assert!(matches!(
            store.get(p.user_id()).await,
            Err(ProfileStoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(p.user_id()).await,
            Err(ProfileStoreError::NotFound(_))
        ));
        store.create(&profile("bob")).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_single_winner() {
        let store = Arc::new(InMemoryProfileStore::new());
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let p = profile("Carol");
                tokio::spawn(async move { store.create(&p).await.is_ok() })
            })
            .collect();

        let mut wins = 0;
        for t in tasks {
            if t.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_and_recreate_race_keeps_maps_consistent() {
        let store = Arc::new(InMemoryProfileStore::new());

        for round in 0..50 {
            let old = profile("Frank");
            store.create(&old).await.unwrap();

            let deleter = {
                let store = store.clone();
                let id = *old.user_id();
                tokio::spawn(async move { store.delete(&id).await })
            };
            let creator = {
                let store = store.clone();
                let p = profile("FRANK");
                tokio::spawn(async move { store.create(&p).await.map(|_| *p.user_id()) })
            };

            deleter.await.unwrap().unwrap();
            let created = creator.await.unwrap();

            // 名字表与档案表一一对应
            assert_eq!(store.names.len(), store.profiles.len(), "round {round}");
            for entry in store.names.iter() {
                assert!(store.profiles.contains_key(entry.value()), "round {round}");
            }

            match created {
                Ok(id) => store.delete(&id).await.unwrap(),
                Err(ProfileStoreError::DuplicateName(_)) => {
                    // 创建先于删除完成，删除之后名字必须可用
                    let retry = profile("frank");
                    store.create(&retry).await.unwrap();
                    store.delete(retry.user_id()).await.unwrap();
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }
}
