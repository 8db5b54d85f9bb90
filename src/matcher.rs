use crate::catalog::{normalize, PhraseCatalog};
use crate::config::MatchingConfig;
use crate::cooldown::CooldownState;
use crate::similarity;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 命中的是哪一层
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// 精确或别名命中
    Alias,
    Substring,
    Fuzzy { score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatch<'a> {
    pub phrase: &'a str,
    pub kind: MatchKind,
}

/// 分层咒语匹配器：别名 → 子串 → 模糊相似度
pub struct PhraseMatcher {
    catalog: Arc<PhraseCatalog>,
    substring_ratio: f64,
    exclusion: Duration,
}

impl PhraseMatcher {
    pub fn new(catalog: Arc<PhraseCatalog>, settings: &MatchingConfig) -> Self {
        Self {
            catalog,
            substring_ratio: settings.substring_ratio,
            exclusion: settings.match_exclusion(),
        }
    }

    pub fn catalog(&self) -> &PhraseCatalog {
        &self.catalog
    }

    /// 为文本寻找最可能的咒语
    ///
    /// 别名层忽略 `threshold`；模糊层只接受 `>= threshold` 的最高分，并跳过
    /// `cooldown` 中刚施放过的咒语。
    pub fn find(
        &self,
        text: &str,
        threshold: f64,
        cooldown: &CooldownState,
        now: Instant,
    ) -> Option<PhraseMatch<'_>> {
        let text = normalize(text);

        if let Some(phrase) = self.catalog.aliases().resolve(&text) {
            return Some(PhraseMatch {
                phrase,
                kind: MatchKind::Alias,
            });
        }

        if let Some(phrase) = self.substring_match(&text) {
            return Some(PhraseMatch {
                phrase,
                kind: MatchKind::Substring,
            });
        }

        self.fuzzy_match(&text, threshold, cooldown, now)
    }

    fn substring_match(&self, text: &str) -> Option<&str> {
        let text_len = text.chars().count() as f64;
        self.catalog.phrases().find(|phrase| {
            (text.contains(phrase) || phrase.contains(text))
                && text_len >= phrase.chars().count() as f64 * self.substring_ratio
        })
    }

    fn fuzzy_match(
        &self,
        text: &str,
        threshold: f64,
        cooldown: &CooldownState,
        now: Instant,
    ) -> Option<PhraseMatch<'_>> {
        let mut best: Option<PhraseMatch<'_>> = None;
        let mut best_score = 0.0;

        for phrase in self.catalog.phrases() {
            if cooldown.within(phrase, self.exclusion, now) {
                continue;
            }
            let score = similarity::ratio(text, phrase);
            if score > best_score && score >= threshold {
                best_score = score;
                best = Some(PhraseMatch {
                    phrase,
                    kind: MatchKind::Fuzzy { score },
                });
            }
        }

        best
    }
}
