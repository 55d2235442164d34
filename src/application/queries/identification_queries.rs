//! Identification Queries
//!
//! 识别只读取档案快照，不产生写操作，因此归入查询侧

/// 使用已提取的探针向量识别说话人
#[derive(Debug, Clone)]
pub struct IdentifySpeaker {
    pub probe: Vec<f32>,
}

/// 使用原始音频识别说话人
#[derive(Debug, Clone)]
pub struct IdentifySpeakerFromAudio {
    pub audio: Vec<u8>,
}
