//! Voiceprint Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::similarity::l2_normalize;
use super::VoiceprintError;

/// 用户唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 用户名
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 唯一性按大小写不敏感比较（见 `uniqueness_key`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Result<Self, VoiceprintError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(VoiceprintError::InvalidName("用户名不能为空".to_string()));
        }
        if name.chars().count() > 100 {
            return Err(VoiceprintError::InvalidName(
                "用户名长度不能超过100字符".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 大小写不敏感的唯一性比较键
    pub fn uniqueness_key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn same_as(&self, other: &UserName) -> bool {
        self.uniqueness_key() == other.uniqueness_key()
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 声纹向量
///
/// 不变量: 非空，所有分量为有限数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, VoiceprintError> {
        if values.is_empty() {
            return Err(VoiceprintError::EmptyVector);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(VoiceprintError::NonFiniteValue);
        }
        Ok(Self(values))
    }

    /// 返回 L2 归一化后的向量
    pub fn normalized(mut self) -> Result<Self, VoiceprintError> {
        if !l2_normalize(&mut self.0) {
            return Err(VoiceprintError::ZeroVector);
        }
        Ok(self)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f32 {
        self.0
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt() as f32
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_trims_and_rejects_empty() {
        assert_eq!(UserName::new("  Alice ").unwrap().as_str(), "Alice");
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new("x".repeat(101)).is_err());
    }

    #[test]
    fn test_user_name_case_insensitive() {
        let a = UserName::new("Alice").unwrap();
        let b = UserName::new("alice").unwrap();
        assert!(a.same_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_embedding_rejects_invalid_values() {
        assert_eq!(Embedding::new(vec![]), Err(VoiceprintError::EmptyVector));
        assert_eq!(
            Embedding::new(vec![1.0, f32::NAN]),
            Err(VoiceprintError::NonFiniteValue)
        );
        assert_eq!(
            Embedding::new(vec![0.0, 0.0]).unwrap().normalized(),
            Err(VoiceprintError::ZeroVector)
        );
    }

    #[test]
    fn test_embedding_normalized_has_unit_norm() {
        let e = Embedding::new(vec![3.0, 4.0]).unwrap().normalized().unwrap();
        assert!((e.norm() - 1.0).abs() < 1e-6);
        assert!((e.as_slice()[0] - 0.6).abs() < 1e-6);
    }
}
