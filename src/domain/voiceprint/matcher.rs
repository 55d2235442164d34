//! Identification Matcher - 说话人识别
//!
//! 对探针向量与所有档案打分并排序。纯计算，不修改任何状态。

use serde::Serialize;

use super::similarity::cosine_similarity;
use super::{Embedding, UserId, VoiceProfile, VoiceprintError};

/// 识别接受阈值
pub const DEFAULT_IDENTIFICATION_THRESHOLD: f32 = 0.82;

/// 识别成功时返回的排名条数
pub const IDENTIFIED_RANKING_LIMIT: usize = 5;

/// 识别失败时返回的排名条数
pub const REJECTED_RANKING_LIMIT: usize = 3;

/// 单个档案的得分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileScore {
    pub user_id: UserId,
    pub user_name: String,
    /// max(centroid_similarity, max_phrase_similarity)
    pub score: f32,
    pub centroid_similarity: f32,
    pub max_phrase_similarity: f32,
}

/// 识别结果
#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    /// 最高分达到阈值
    Identified {
        profile: VoiceProfile,
        score: f32,
        ranking: Vec<ProfileScore>,
    },
    /// 最高分低于阈值
    NotIdentified {
        best_score: f32,
        ranking: Vec<ProfileScore>,
    },
    /// 注册表为空
    NoProfiles,
}

#[derive(Debug, Clone, Copy)]
pub struct IdentificationMatcher {
    threshold: f32,
}

impl Default for IdentificationMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFICATION_THRESHOLD)
    }
}

impl IdentificationMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 计算探针与单个档案的得分
    pub fn score(
        &self,
        probe: &Embedding,
        profile: &VoiceProfile,
    ) -> Result<ProfileScore, VoiceprintError> {
        let centroid_similarity =
            cosine_similarity(probe.as_slice(), profile.centroid_embedding().as_slice())?;

        let mut max_phrase_similarity = f32::NEG_INFINITY;
        for phrase in profile.phrase_embeddings() {
            let sim = cosine_similarity(probe.as_slice(), phrase.as_slice())?;
            max_phrase_similarity = max_phrase_similarity.max(sim);
        }

        Ok(ProfileScore {
            user_id: *profile.user_id(),
            user_name: profile.user_name().to_string(),
            score: centroid_similarity.max(max_phrase_similarity),
            centroid_similarity,
            max_phrase_similarity,
        })
    }

    /// 按得分降序排列全部档案，同分按 user_id 升序
    ///
    /// 维度与探针不一致的档案被跳过
    pub fn rank(&self, probe: &Embedding, profiles: &[VoiceProfile]) -> Vec<ProfileScore> {
        let mut ranking: Vec<ProfileScore> = profiles
            .iter()
            .filter_map(|profile| match self.score(probe, profile) {
                Ok(score) => Some(score),
                Err(e) => {
                    tracing::warn!(
                        user_id = %profile.user_id(),
                        error = %e,
                        "Skipping profile during identification"
                    );
                    None
                }
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        ranking
    }

    /// 识别探针对应的说话人
    ///
    /// 注册表非空但没有任何档案与探针维度一致时返回 `DimensionMismatch`
    pub fn identify(
        &self,
        probe: &Embedding,
        profiles: Vec<VoiceProfile>,
    ) -> Result<Identification, VoiceprintError> {
        let Some(first) = profiles.first() else {
            return Ok(Identification::NoProfiles);
        };
        let stored_dim = first.embedding_dim();

        let mut ranking = self.rank(probe, &profiles);

        let Some((best_id, best_score)) = ranking.first().map(|best| (best.user_id, best.score))
        else {
            return Err(VoiceprintError::DimensionMismatch {
                expected: stored_dim,
                actual: probe.dim(),
            });
        };

        if best_score < self.threshold {
            ranking.truncate(REJECTED_RANKING_LIMIT);
            return Ok(Identification::NotIdentified {
                best_score,
                ranking,
            });
        }

        let identification = match profiles.into_iter().find(|p| p.user_id() == &best_id) {
            Some(profile) => {
                ranking.truncate(IDENTIFIED_RANKING_LIMIT);
                Identification::Identified {
                    profile,
                    score: best_score,
                    ranking,
                }
            }
            // ranking 中的条目都来自 profiles，不会走到这里
            None => Identification::NotIdentified {
                best_score,
                ranking,
            },
        };
        Ok(identification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voiceprint::{EnrollmentPolicy, UserName};

    fn enroll(name: &str, base: Vec<f32>) -> VoiceProfile {
        EnrollmentPolicy::default()
            .build_profile(UserName::new(name).unwrap(), vec![base; 5], &[0, 1, 2, 3, 4])
            .unwrap()
    }

    fn unit(values: Vec<f32>) -> Embedding {
        Embedding::new(values).unwrap().normalized().unwrap()
    }

    /// 构造与 e0 夹角余弦为 `cos` 的二维平面单位向量（嵌入四维空间）
    fn at_cosine(cos: f32) -> Vec<f32> {
        vec![cos, (1.0 - cos * cos).sqrt(), 0.0, 0.0]
    }

    #[test]
    fn test_empty_registry() {
        let probe = unit(vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            IdentificationMatcher::default().identify(&probe, vec![]).unwrap(),
            Identification::NoProfiles
        );
    }

    #[test]
    fn test_probe_equal_to_phrase_embedding() {
        let profile = enroll("Alice", vec![0.2, 0.4, 0.1, 0.3]);
        let probe = profile.phrase_embeddings()[2].clone();

        match IdentificationMatcher::default().identify(&probe, vec![profile.clone()]).unwrap() {
            Identification::Identified { profile: p, score, ranking } => {
                assert_eq!(p.user_id(), profile.user_id());
                assert!((score - 1.0).abs() < 1e-6);
                assert_eq!(ranking.len(), 1);
            }
            other => panic!("expected identified, got {other:?}"),
        }
    }

    #[test]
    fn test_orthogonal_probe_not_identified() {
        let profile = enroll("Alice", vec![1.0, 0.0, 0.0, 0.0]);
        let probe = unit(vec![0.0, 0.0, 1.0, 0.0]);

        match IdentificationMatcher::default().identify(&probe, vec![profile]).unwrap() {
            Identification::NotIdentified { best_score, ranking } => {
                assert!(best_score.abs() < 1e-6);
                assert_eq!(ranking.len(), 1);
            }
            other => panic!("expected not identified, got {other:?}"),
        }
    }

    #[test]
    fn test_ranking_order() {
        let profiles = vec![
            enroll("low", at_cosine(0.3)),
            enroll("high", at_cosine(0.9)),
            enroll("mid", at_cosine(0.5)),
        ];
        let probe = unit(vec![1.0, 0.0, 0.0, 0.0]);

        let ranking = IdentificationMatcher::default().rank(&probe, &profiles);
        let names: Vec<&str> = ranking.iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        for (entry, expected) in ranking.iter().zip([0.9, 0.5, 0.3]) {
            assert!((entry.score - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ranking_limits() {
        let probe = unit(vec![1.0, 0.0, 0.0, 0.0]);
        let matcher = IdentificationMatcher::default();

        let strong: Vec<VoiceProfile> = (0..7)
            .map(|i| enroll(&format!("user{i}"), at_cosine(0.99 - i as f32 * 0.01)))
            .collect();
        match matcher.identify(&probe, strong).unwrap() {
            Identification::Identified { ranking, .. } => {
                assert_eq!(ranking.len(), IDENTIFIED_RANKING_LIMIT)
            }
            other => panic!("expected identified, got {other:?}"),
        }

        let weak: Vec<VoiceProfile> = (0..7)
            .map(|i| enroll(&format!("user{i}"), at_cosine(0.5 - i as f32 * 0.01)))
            .collect();
        match matcher.identify(&probe, weak).unwrap() {
            Identification::NotIdentified { best_score, ranking } => {
                assert_eq!(ranking.len(), REJECTED_RANKING_LIMIT);
                assert!((best_score - 0.5).abs() < 1e-5);
            }
            other => panic!("expected not identified, got {other:?}"),
        }
    }

    #[test]
    fn test_ties_broken_by_user_id() {
        let probe = unit(vec![1.0, 0.0, 0.0, 0.0]);
        let profiles = vec![
            enroll("a", at_cosine(0.6)),
            enroll("b", at_cosine(0.6)),
            enroll("c", at_cosine(0.6)),
        ];

        let ranking = IdentificationMatcher::default().rank(&probe, &profiles);
        let ids: Vec<UserId> = ranking.iter().map(|s| s.user_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_mismatched_dimension_skipped() {
        let probe = unit(vec![1.0, 0.0, 0.0, 0.0]);
        let profiles = vec![
            enroll("four", vec![1.0, 0.0, 0.0, 0.0]),
            enroll("two", vec![1.0, 0.0]),
        ];

        let ranking = IdentificationMatcher::default().rank(&probe, &profiles);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].user_name, "four");
    }

    #[test]
    fn test_probe_matching_no_stored_dimension_fails() {
        let probe = unit(vec![1.0, 0.0]);
        let profiles = vec![enroll("four", vec![1.0, 0.0, 0.0, 0.0])];

        let result = IdentificationMatcher::default().identify(&probe, profiles);
        assert!(matches!(
            result,
            Err(VoiceprintError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }
}
