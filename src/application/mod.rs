//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ProfileStore、EmbeddingExtractor）
//! - commands: CQRS 命令及处理器（注册、删除）
//! - queries: CQRS 查询及处理器（识别、档案、统计）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Enrollment commands
    DeleteProfile,
    EnrollVoice,
    EnrollVoiceFromAudio,
    // Handlers
    handlers::{
        DeleteProfileHandler, DeleteProfileResponse, EnrollVoiceHandler, EnrollVoiceResponse,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Embedding extractor
    EmbeddingError,
    EmbeddingExtractorPort,
    // Profile store
    ProfileStoreError,
    ProfileStorePort,
};

pub use queries::{
    // Identification queries
    IdentifySpeaker,
    IdentifySpeakerFromAudio,
    // Profile queries
    GetEnrollmentPhrases,
    GetProfile,
    GetRegistryStats,
    ListProfiles,
    // Handlers
    handlers::{
        EnrollmentPhrasesResponse, GetEnrollmentPhrasesHandler, GetProfileHandler,
        GetRegistryStatsHandler, IdentifySpeakerHandler, IdentifySpeakerResponse,
        ListProfilesHandler, ProfileSummary, RegistryStats,
    },
};
