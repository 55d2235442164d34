//! Profile Queries

use uuid::Uuid;

/// 获取声纹档案详情查询
#[derive(Debug, Clone)]
pub struct GetProfile {
    pub user_id: Uuid,
}

/// 列出所有声纹档案查询
#[derive(Debug, Clone)]
pub struct ListProfiles;

/// 注册表统计查询
#[derive(Debug, Clone)]
pub struct GetRegistryStats;

/// 注册短语查询
#[derive(Debug, Clone)]
pub struct GetEnrollmentPhrases;
