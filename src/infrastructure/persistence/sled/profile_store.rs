//! Sled-based Profile Store Implementation
//!
//! 两棵树:
//! - `profiles`: user_id (16 字节) -> bincode(VoiceProfile)
//! - `names`: 小写用户名 -> user_id
//!
//! create / delete 以跨树事务执行，用户名占位即原子的 create-if-absent

use async_trait::async_trait;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use sled::{Db, Transactional, Tree};
use std::path::Path;

use crate::application::ports::{ProfileStoreError, ProfileStorePort};
use crate::domain::voiceprint::{UserId, VoiceProfile};

const PROFILES_TREE: &str = "profiles";
const NAMES_TREE: &str = "names";

/// Sled 档案存储
pub struct SledProfileStore {
    db: Db,
    profiles: Tree,
    names: Tree,
}

impl SledProfileStore {
    /// 打开（或创建）数据库
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProfileStoreError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
        let profiles = db
            .open_tree(PROFILES_TREE)
            .map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
        let names = db
            .open_tree(NAMES_TREE)
            .map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %path.as_ref().display(),
            profiles = profiles.len(),
            "SledProfileStore initialized"
        );

        Ok(Self {
            db,
            profiles,
            names,
        })
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<VoiceProfile, ProfileStoreError> {
        let key_str = uuid::Uuid::from_slice(key)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{:?}", key));

        let profile: VoiceProfile =
            bincode::deserialize(value).map_err(|e| ProfileStoreError::Corrupted {
                key: key_str.clone(),
                reason: e.to_string(),
            })?;

        profile
            .check_integrity()
            .map_err(|reason| ProfileStoreError::Corrupted {
                key: key_str,
                reason,
            })?;

        Ok(profile)
    }

    /// 删除指向 user_id 的用户名占位（记录损坏、无法读出用户名时使用）
    fn remove_name_entries_for(&self, user_id: &UserId) -> Result<(), ProfileStoreError> {
        let id_bytes = user_id.as_uuid().as_bytes();
        for item in self.names.iter() {
            let (name, id) = item.map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
            if id.as_ref() == id_bytes.as_slice() {
                self.names
                    .remove(name)
                    .map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), ProfileStoreError> {
        self.db
            .flush_async()
            .await
            .map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

fn transaction_error(err: TransactionError<ProfileStoreError>) -> ProfileStoreError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => ProfileStoreError::DatabaseError(e.to_string()),
    }
}

#[async_trait]
impl ProfileStorePort for SledProfileStore {
    async fn create(&self, profile: &VoiceProfile) -> Result<(), ProfileStoreError> {
        let bytes = bincode::serialize(profile)
            .map_err(|e| ProfileStoreError::SerializationError(e.to_string()))?;
        let id_key = profile.user_id().as_uuid().as_bytes().to_vec();
        let name_key = profile.user_name().uniqueness_key();

        let result: TransactionResult<(), ProfileStoreError> =
            (&self.profiles, &self.names).transaction(|(profiles, names)| {
                if names.get(name_key.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(
                        ProfileStoreError::DuplicateName(profile.user_name().to_string()),
                    ));
                }
                if profiles.get(id_key.as_slice())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(
                        ProfileStoreError::DatabaseError(format!(
                            "profile {} already exists",
                            profile.user_id()
                        )),
                    ));
                }
                profiles.insert(id_key.as_slice(), bytes.as_slice())?;
                names.insert(name_key.as_bytes(), id_key.as_slice())?;
                Ok(())
            });

        result.map_err(transaction_error)?;

        self.flush().await?;

        tracing::debug!(
            user_id = %profile.user_id(),
            size_bytes = bytes.len(),
            "Voice profile stored"
        );

        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<VoiceProfile, ProfileStoreError> {
        let key = user_id.as_uuid().as_bytes();
        match self.profiles.get(key) {
            Ok(Some(value)) => Self::decode(key, &value),
            Ok(None) => Err(ProfileStoreError::NotFound(*user_id)),
            Err(e) => Err(ProfileStoreError::DatabaseError(e.to_string())),
        }
    }

    async fn list_all(&self) -> Result<Vec<VoiceProfile>, ProfileStoreError> {
        let mut profiles = Vec::new();
        for item in self.profiles.iter() {
            let (key, value) = item.map_err(|e| ProfileStoreError::DatabaseError(e.to_string()))?;
            match Self::decode(&key, &value) {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable profile"),
            }
        }
        Ok(profiles)
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileStoreError> {
        let id_key = user_id.as_uuid().as_bytes().to_vec();

        // 返回值表示记录是否可以解码
        let result: TransactionResult<bool, ProfileStoreError> =
            (&self.profiles, &self.names).transaction(|(profiles, names)| {
                let value = match profiles.remove(id_key.as_slice())? {
                    Some(value) => value,
                    None => {
                        return Err(ConflictableTransactionError::Abort(
                            ProfileStoreError::NotFound(*user_id),
                        ))
                    }
                };
                match bincode::deserialize::<VoiceProfile>(&value) {
                    Ok(profile) => {
                        names.remove(profile.user_name().uniqueness_key().as_bytes())?;
                        Ok(true)
                    }
                    Err(_) => Ok(false),
                }
            });

        let decodable = result.map_err(transaction_error)?;

        if !decodable {
            tracing::warn!(user_id = %user_id, "Deleted corrupted profile record");
            self.remove_name_entries_for(user_id)?;
        }

        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voiceprint::{EnrollmentPolicy, UserName};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn profile(name: &str) -> VoiceProfile {
        EnrollmentPolicy::default()
            .build_profile(
                UserName::new(name).unwrap(),
                vec![vec![0.9, -0.1, 0.33, 0.123456789]; 5],
                &[5, 6, 7, 8, 9],
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = SledProfileStore::open(dir.path().join("profiles.sled")).unwrap();

        let original = profile("Alice");
        store.create(&original).await.unwrap();

        let restored = store.get(original.user_id()).await.unwrap();
        assert_eq!(restored, original);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_delete_frees_name() {
        let dir = tempdir().unwrap();
        let store = SledProfileStore::open(dir.path().join("profiles.sled")).unwrap();

        let first = profile("Alice");
        store.create(&first).await.unwrap();
        assert!(matches!(
            store.create(&profile("alice")).await,
            Err(ProfileStoreError::DuplicateName(_))
        ));

        store.delete(first.user_id()).await.unwrap();
        assert!(matches!(
            store.delete(first.user_id()).await,
            Err(ProfileStoreError::NotFound(_))
        ));

        // 删除后用户名可以重新注册
        store.create(&profile("ALICE")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_with_colliding_names() {
        let dir = tempdir().unwrap();
        let store = Arc::new(SledProfileStore::open(dir.path().join("profiles.sled")).unwrap());

        let tasks: Vec<_> = ["eve", "Eve", "EVE", "eVe"]
            .iter()
            .map(|name| {
                let store = store.clone();
                let p = profile(name);
                tokio::spawn(async move { store.create(&p).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_corrupted_record_skipped_and_deletable() {
        let dir = tempdir().unwrap();
        let store = SledProfileStore::open(dir.path().join("profiles.sled")).unwrap();
        store.create(&profile("Bob")).await.unwrap();

        let broken = UserId::new();
        store
            .profiles
            .insert(broken.as_uuid().as_bytes(), b"garbage".as_slice())
            .unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 1);
        assert!(matches!(
            store.get(&broken).await,
            Err(ProfileStoreError::Corrupted { .. })
        ));
        store.delete(&broken).await.unwrap();
    }
}
