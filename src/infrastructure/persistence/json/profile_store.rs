//! JSON File Profile Store - 目录 + 单文件档案存储
//!
//! 实现 ProfileStorePort trait
//!
//! 布局: `<base_dir>/<user_id>.json`
//! 写入先落到同目录下的隐藏临时文件，fsync 后 rename 到位，
//! 读者只会看到完整的旧文件或完整的新文件。

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::application::ports::{ProfileStoreError, ProfileStorePort};
use crate::domain::voiceprint::{UserId, VoiceProfile};

const PROFILE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// 唯一性检查只需要用户名，完整性校验失败的记录仍然占用名字
#[derive(Deserialize)]
struct RecordName {
    user_name: String,
}

/// JSON 文件档案存储
pub struct JsonFileProfileStore {
    /// 存储根目录
    base_dir: PathBuf,
    /// 串行化 create / delete，保证"检查用户名 + 写入"的原子性
    write_lock: Mutex<()>,
}

impl JsonFileProfileStore {
    /// 打开存储目录（不存在则创建），并清理中断写入留下的临时文件
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, ProfileStoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?;

        let store = Self {
            base_dir,
            write_lock: Mutex::new(()),
        };
        let removed = store.remove_stale_temp_files().await?;

        tracing::info!(
            base_dir = %store.base_dir.display(),
            stale_temp_files = removed,
            "JsonFileProfileStore initialized"
        );

        Ok(store)
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn profile_path(&self, user_id: &UserId) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", user_id, PROFILE_EXTENSION))
    }

    fn temp_path(&self, user_id: &UserId) -> PathBuf {
        self.base_dir
            .join(format!(".{}.{}.{}", user_id, PROFILE_EXTENSION, TEMP_EXTENSION))
    }

    async fn remove_stale_temp_files(&self) -> Result<u64, ProfileStoreError> {
        let mut removed = 0u64;
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == TEMP_EXTENSION) {
                if let Err(e) = fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
                } else {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    /// 读取并校验单个档案文件
    async fn read_profile(path: &Path) -> Result<VoiceProfile, ProfileStoreError> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let data = fs::read(path)
            .await
            .map_err(|e| ProfileStoreError::IoError(format!("{}: {}", key, e)))?;

        let profile: VoiceProfile =
            serde_json::from_slice(&data).map_err(|e| ProfileStoreError::Corrupted {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        profile
            .check_integrity()
            .map_err(|reason| ProfileStoreError::Corrupted {
                key: key.clone(),
                reason,
            })?;

        let user_id = profile.user_id().to_string();
        if path.file_stem().and_then(|s| s.to_str()) != Some(user_id.as_str()) {
            return Err(ProfileStoreError::Corrupted {
                key,
                reason: format!("file name does not match user_id {}", profile.user_id()),
            });
        }

        Ok(profile)
    }

    /// 扫描目录读取所有档案，损坏的条目跳过并记录警告
    async fn load_all(&self) -> Result<Vec<VoiceProfile>, ProfileStoreError> {
        let mut profiles = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if !path.extension().map_or(false, |ext| ext == PROFILE_EXTENSION) {
                continue;
            }

            match Self::read_profile(&path).await {
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable profile");
                }
            }
        }

        Ok(profiles)
    }

    /// 收集所有记录占用的用户名（小写），包括完整性校验失败的记录
    async fn reserved_names(&self) -> Result<HashSet<String>, ProfileStoreError> {
        let mut names = HashSet::new();
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if !path.extension().map_or(false, |ext| ext == PROFILE_EXTENSION) {
                continue;
            }

            let data = fs::read(&path)
                .await
                .map_err(|e| ProfileStoreError::IoError(format!("{}: {}", path.display(), e)))?;
            match serde_json::from_slice::<RecordName>(&data) {
                Ok(record) => {
                    names.insert(record.user_name.trim().to_lowercase());
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Profile record has no readable user_name");
                }
            }
        }

        Ok(names)
    }

    async fn write_atomic(&self, profile: &VoiceProfile) -> Result<(), ProfileStoreError> {
        let data = serde_json::to_vec_pretty(profile)
            .map_err(|e| ProfileStoreError::SerializationError(e.to_string()))?;

        let temp_path = self.temp_path(profile.user_id());
        let final_path = self.profile_path(profile.user_id());

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &final_path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(ProfileStoreError::IoError(e.to_string()));
        }

        tracing::debug!(
            path = %final_path.display(),
            size = data.len(),
            "Saved voice profile"
        );

        Ok(())
    }
}

#[async_trait]
impl ProfileStorePort for JsonFileProfileStore {
    async fn create(&self, profile: &VoiceProfile) -> Result<(), ProfileStoreError> {
        let _guard = self.write_lock.lock().await;

        let reserved = self.reserved_names().await?;
        if reserved.contains(&profile.user_name().uniqueness_key()) {
            return Err(ProfileStoreError::DuplicateName(
                profile.user_name().to_string(),
            ));
        }

        if fs::try_exists(self.profile_path(profile.user_id()))
            .await
            .map_err(|e| ProfileStoreError::IoError(e.to_string()))?
        {
            return Err(ProfileStoreError::IoError(format!(
                "profile file for {} already exists",
                profile.user_id()
            )));
        }

        self.write_atomic(profile).await
    }

    async fn get(&self, user_id: &UserId) -> Result<VoiceProfile, ProfileStoreError> {
        let path = self.profile_path(user_id);

        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProfileStoreError::NotFound(*user_id))
            }
            Err(e) => return Err(ProfileStoreError::IoError(e.to_string())),
        }

        Self::read_profile(&path).await
    }

    async fn list_all(&self) -> Result<Vec<VoiceProfile>, ProfileStoreError> {
        self.load_all().await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileStoreError> {
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(self.profile_path(user_id)).await {
            Ok(()) => {
                tracing::debug!(user_id = %user_id, "Deleted voice profile file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ProfileStoreError::NotFound(*user_id)),
            Err(e) => Err(ProfileStoreError::IoError(e.to_string())),
        }
    }
}
