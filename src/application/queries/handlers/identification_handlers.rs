//! Identification Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{EmbeddingExtractorPort, ProfileStorePort};
use crate::application::queries::{IdentifySpeaker, IdentifySpeakerFromAudio};
use crate::domain::voiceprint::{Embedding, Identification, IdentificationMatcher, ProfileScore};

/// 识别结果
#[derive(Debug, Clone)]
pub enum IdentifySpeakerResponse {
    Identified {
        user_id: Uuid,
        user_name: String,
        confidence_score: f32,
        enrollment_date: DateTime<Utc>,
        threshold: f32,
        /// 前 5 名
        ranking: Vec<ProfileScore>,
    },
    NotIdentified {
        best_score: f32,
        threshold: f32,
        /// 前 3 名
        ranking: Vec<ProfileScore>,
    },
    NoProfiles {
        threshold: f32,
    },
}

/// IdentifySpeaker Handler
pub struct IdentifySpeakerHandler {
    profile_store: Arc<dyn ProfileStorePort>,
    extractor: Arc<dyn EmbeddingExtractorPort>,
    matcher: IdentificationMatcher,
}

impl IdentifySpeakerHandler {
    pub fn new(
        profile_store: Arc<dyn ProfileStorePort>,
        extractor: Arc<dyn EmbeddingExtractorPort>,
        matcher: IdentificationMatcher,
    ) -> Self {
        Self {
            profile_store,
            extractor,
            matcher,
        }
    }

    pub async fn handle(&self, query: IdentifySpeaker) -> Result<IdentifySpeakerResponse, ApplicationError> {
        let probe = Embedding::new(query.probe)?.normalized()?;
        let profiles = self.profile_store.list_all().await?;
        let threshold = self.matcher.threshold();

        let identification = self.matcher.identify(&probe, profiles).map_err(|e| {
            tracing::warn!(probe_dim = probe.dim(), error = %e, "Probe rejected during identification");
            ApplicationError::from(e)
        })?;

        let response = match identification {
            Identification::Identified {
                profile,
                score,
                ranking,
            } => {
                tracing::info!(
                    user_id = %profile.user_id(),
                    user_name = %profile.user_name(),
                    score = score,
                    "Speaker identified"
                );
                IdentifySpeakerResponse::Identified {
                    user_id: *profile.user_id().as_uuid(),
                    user_name: profile.user_name().to_string(),
                    confidence_score: score,
                    enrollment_date: profile.enrollment_timestamp(),
                    threshold,
                    ranking,
                }
            }
            Identification::NotIdentified {
                best_score,
                ranking,
            } => {
                tracing::info!(best_score = best_score, threshold = threshold, "Speaker not recognized");
                IdentifySpeakerResponse::NotIdentified {
                    best_score,
                    threshold,
                    ranking,
                }
            }
            Identification::NoProfiles => {
                tracing::info!("Identification requested on empty registry");
                IdentifySpeakerResponse::NoProfiles { threshold }
            }
        };

        Ok(response)
    }

    pub async fn handle_audio(
        &self,
        query: IdentifySpeakerFromAudio,
    ) -> Result<IdentifySpeakerResponse, ApplicationError> {
        let probe = self.extractor.embed(&query.audio).await.map_err(|e| {
            tracing::error!(error = %e, "Embedding extraction failed during identification");
            ApplicationError::from(e)
        })?;

        self.handle(IdentifySpeaker { probe }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::EnrollVoiceHandler;
    use crate::application::commands::EnrollVoiceFromAudio;
    use crate::domain::voiceprint::EnrollmentPolicy;
    use crate::infrastructure::adapters::FakeEmbeddingExtractor;
    use crate::infrastructure::memory::InMemoryProfileStore;

    struct Fixture {
        enroll: EnrollVoiceHandler,
        identify: IdentifySpeakerHandler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryProfileStore::new());
        let extractor = Arc::new(FakeEmbeddingExtractor::new(64));
        Fixture {
            enroll: EnrollVoiceHandler::new(
                store.clone(),
                extractor.clone(),
                Arc::new(EnrollmentPolicy::default()),
            ),
            identify: IdentifySpeakerHandler::new(store, extractor, IdentificationMatcher::default()),
        }
    }

    async fn enroll(fixture: &Fixture, name: &str, audio: &[u8]) -> Uuid {
        fixture
            .enroll
            .handle_audio(EnrollVoiceFromAudio {
                user_name: name.to_string(),
                audios: vec![audio.to_vec(); 5],
                phrase_indices: vec![0, 1, 2, 3, 4],
            })
            .await
            .unwrap()
            .user_id
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let fixture = fixture();
        let response = fixture
            .identify
            .handle(IdentifySpeaker {
                probe: vec![1.0; 64],
            })
            .await
            .unwrap();
        assert!(matches!(response, IdentifySpeakerResponse::NoProfiles { .. }));
    }

    #[tokio::test]
    async fn test_identify_enrolled_speaker_from_audio() {
        let fixture = fixture();
        let alice = enroll(&fixture, "Alice", b"alice voice").await;
        enroll(&fixture, "Bob", b"bob voice").await;

        let response = fixture
            .identify
            .handle_audio(IdentifySpeakerFromAudio {
                audio: b"alice voice".to_vec(),
            })
            .await
            .unwrap();

        match response {
            IdentifySpeakerResponse::Identified {
                user_id,
                confidence_score,
                ranking,
                ..
            } => {
                assert_eq!(user_id, alice);
                assert!((confidence_score - 1.0).abs() < 1e-5);
                assert_eq!(ranking.len(), 2);
                assert_eq!(ranking[0].user_name, "Alice");
            }
            other => panic!("expected identified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_speaker_not_identified() {
        let fixture = fixture();
        enroll(&fixture, "Alice", b"alice voice").await;

        let response = fixture
            .identify
            .handle_audio(IdentifySpeakerFromAudio {
                audio: b"someone else entirely".to_vec(),
            })
            .await
            .unwrap();

        assert!(matches!(
            response,
            IdentifySpeakerResponse::NotIdentified { best_score, .. } if best_score < 0.82
        ));
    }

    #[tokio::test]
    async fn test_invalid_probe_rejected() {
        let fixture = fixture();
        let err = fixture
            .identify
            .handle(IdentifySpeaker { probe: vec![0.0; 64] })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_probe_of_wrong_dimension_rejected() {
        let fixture = fixture();
        enroll(&fixture, "Alice", b"alice voice").await;

        let err = fixture
            .identify
            .handle(IdentifySpeaker {
                probe: vec![1.0, 0.0],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
