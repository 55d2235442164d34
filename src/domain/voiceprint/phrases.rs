//! 注册短语表

use serde::Serialize;

/// 默认注册短语
pub const DEFAULT_ENROLLMENT_PHRASES: &[&str] = &[
    "The quick brown fox jumps over the lazy dog",
    "She sells seashells by the seashore",
    "How much wood would a woodchuck chuck if a woodchuck could chuck wood",
    "Peter Piper picked a peck of pickled peppers",
    "Red leather yellow leather",
    "The five boxing wizards jump quickly",
    "Pack my box with five dozen liquor jugs",
    "Sphinx of black quartz judge my vow",
    "How vexingly quick daft zebras jump",
    "Waltz bad nymph for quick jigs vex",
    "Please call Stella and ask her to bring these things with her from the store",
    "The birch canoe slid on the smooth planks",
    "Say the words below to complete voice setup",
    "My voice is stronger than passwords",
    "Ready to learn my voice",
];

/// 固定顺序的注册短语表，`phrase_indices` 引用其下标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseCatalog {
    phrases: Vec<String>,
}

impl PhraseCatalog {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// 按索引取短语文本，越界的索引被忽略并记录告警
    pub fn resolve(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| {
                let phrase = self.get(i);
                if phrase.is_none() {
                    tracing::warn!(
                        index = i,
                        catalog_size = self.len(),
                        "Phrase index no longer present in catalog"
                    );
                }
                phrase.map(str::to_string)
            })
            .collect()
    }
}

impl Default for PhraseCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENROLLMENT_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        )
    }
}
