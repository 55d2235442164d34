//! Voiceprint Context - 声纹限界上下文
//!
//! 职责:
//! - 向量相似度计算
//! - 注册样本一致性校验与质心计算
//! - VoiceProfile 聚合根
//! - 说话人识别匹配

mod aggregate;
mod consistency;
mod enrollment;
mod errors;
mod matcher;
mod phrases;
mod similarity;
mod value_objects;

pub use aggregate::VoiceProfile;
pub use consistency::{ConsistencyReport, ConsistencyValidator, DEFAULT_CONSISTENCY_THRESHOLD};
pub use enrollment::{EnrollmentPolicy, DEFAULT_REQUIRED_PHRASES};
pub use errors::VoiceprintError;
pub use matcher::{
    Identification, IdentificationMatcher, ProfileScore, DEFAULT_IDENTIFICATION_THRESHOLD,
    IDENTIFIED_RANKING_LIMIT, REJECTED_RANKING_LIMIT,
};
pub use phrases::{PhraseCatalog, DEFAULT_ENROLLMENT_PHRASES};
pub use similarity::{cosine_similarity, l2_normalize, mean_vector, UNIT_NORM_TOLERANCE};
pub use value_objects::{Embedding, UserId, UserName};
