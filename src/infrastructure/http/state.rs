//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteProfileHandler, EnrollVoiceHandler,
    // Query handlers
    GetEnrollmentPhrasesHandler, GetProfileHandler, GetRegistryStatsHandler,
    IdentifySpeakerHandler, ListProfilesHandler,
    // Ports
    EmbeddingExtractorPort, ProfileStorePort,
};
use crate::domain::voiceprint::{EnrollmentPolicy, IdentificationMatcher};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub profile_store: Arc<dyn ProfileStorePort>,
    pub extractor: Arc<dyn EmbeddingExtractorPort>,
    pub identification_threshold: f32,

    // ========== Command Handlers ==========
    pub enroll_handler: EnrollVoiceHandler,
    pub delete_profile_handler: DeleteProfileHandler,

    // ========== Query Handlers ==========
    pub identify_handler: IdentifySpeakerHandler,
    pub get_profile_handler: GetProfileHandler,
    pub list_profiles_handler: ListProfilesHandler,
    pub registry_stats_handler: GetRegistryStatsHandler,
    pub enrollment_phrases_handler: GetEnrollmentPhrasesHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        profile_store: Arc<dyn ProfileStorePort>,
        extractor: Arc<dyn EmbeddingExtractorPort>,
        policy: EnrollmentPolicy,
        matcher: IdentificationMatcher,
    ) -> Self {
        let policy = Arc::new(policy);
        let catalog = policy.catalog().clone();
        let threshold = matcher.threshold();

        Self {
            // Ports
            profile_store: profile_store.clone(),
            extractor: extractor.clone(),
            identification_threshold: threshold,

            // Command handlers
            enroll_handler: EnrollVoiceHandler::new(
                profile_store.clone(),
                extractor.clone(),
                policy.clone(),
            ),
            delete_profile_handler: DeleteProfileHandler::new(profile_store.clone()),

            // Query handlers
            identify_handler: IdentifySpeakerHandler::new(
                profile_store.clone(),
                extractor.clone(),
                matcher,
            ),
            get_profile_handler: GetProfileHandler::new(profile_store.clone(), catalog.clone()),
            list_profiles_handler: ListProfilesHandler::new(profile_store.clone(), catalog),
            registry_stats_handler: GetRegistryStatsHandler::new(
                profile_store,
                extractor,
                threshold,
            ),
            enrollment_phrases_handler: GetEnrollmentPhrasesHandler::new(policy),
        }
    }
}
