//! Enrollment Commands

use uuid::Uuid;

/// 使用已提取的声纹向量注册
#[derive(Debug, Clone)]
pub struct EnrollVoice {
    pub user_name: String,
    pub embeddings: Vec<Vec<f32>>,
    pub phrase_indices: Vec<i64>,
}

/// 使用原始音频注册，每段音频对应一个短语索引
#[derive(Debug, Clone)]
pub struct EnrollVoiceFromAudio {
    pub user_name: String,
    pub audios: Vec<Vec<u8>>,
    pub phrase_indices: Vec<i64>,
}

/// 删除声纹档案命令
#[derive(Debug, Clone)]
pub struct DeleteProfile {
    pub user_id: Uuid,
}
