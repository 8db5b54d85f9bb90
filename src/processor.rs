use crate::arbiter::{ActionSink, CastArbiter, CastOutcome};
use crate::catalog::{normalize, PhraseCatalog};
use crate::config::MatchingConfig;
use crate::cooldown::{Clock, SystemClock};
use crate::matcher::PhraseMatcher;
use std::sync::Arc;

/// 转写处理器：把一条转写交给匹配器，命中后交给仲裁器施放
pub struct TranscriptProcessor<S, C = SystemClock> {
    matcher: PhraseMatcher,
    arbiter: CastArbiter<S>,
    clock: C,
    settings: MatchingConfig,
}

impl<S: ActionSink> TranscriptProcessor<S, SystemClock> {
    pub fn new(catalog: Arc<PhraseCatalog>, sink: S, settings: MatchingConfig) -> Self {
        Self::with_clock(catalog, sink, settings, SystemClock)
    }
}

impl<S: ActionSink, C: Clock> TranscriptProcessor<S, C> {
    pub fn with_clock(
        catalog: Arc<PhraseCatalog>,
        sink: S,
        settings: MatchingConfig,
        clock: C,
    ) -> Self {
        Self {
            matcher: PhraseMatcher::new(catalog.clone(), &settings),
            arbiter: CastArbiter::new(catalog, sink, settings.fire_debounce()),
            clock,
            settings,
        }
    }

    pub fn arbiter(&self) -> &CastArbiter<S> {
        &self.arbiter
    }

    pub fn catalog(&self) -> &PhraseCatalog {
        self.matcher.catalog()
    }

    /// 处理一条转写，识别到咒语返回 true（即使因冷却没有真正施放）
    pub fn process(&mut self, transcript: &str, is_partial: bool) -> bool {
        let transcript = normalize(transcript);
        if transcript.chars().count() < self.settings.min_transcript_chars {
            return false;
        }

        let threshold = self.settings.effective_threshold(is_partial);

        if self.try_cast(&transcript, threshold).is_some() {
            return true;
        }

        // 识别器常在前面多出几个词，退回只看最后一个词
        let words: Vec<&str> = transcript.split_whitespace().collect();
        if let [_, .., last] = words.as_slice() {
            if last.chars().count() >= self.settings.min_tail_word_chars
                && self.try_cast(last, threshold).is_some()
            {
                return true;
            }
        }

        false
    }

    fn try_cast(&mut self, text: &str, threshold: f64) -> Option<CastOutcome> {
        let now = self.clock.now();
        let phrase = self
            .matcher
            .find(text, threshold, self.arbiter.cooldown(), now)
            .map(|hit| {
                log::debug!("{text:?} 命中 {} ({:?})", hit.phrase, hit.kind);
                hit.phrase.to_string()
            })?;
        Some(self.arbiter.fire(&phrase, now))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::action::{ActionCommand, Key};
    use crate::arbiter::tests::RecordingSink;
    use crate::config::default_spells;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    /// 手动推进的时钟
    #[derive(Clone)]
    pub(crate) struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self(Rc::new(Cell::new(Instant::now())))
        }

        pub(crate) fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    fn processor_for(
        pairs: &[(&str, &str)],
    ) -> (TranscriptProcessor<RecordingSink, ManualClock>, ManualClock) {
        let catalog = PhraseCatalog::new(pairs.iter().copied()).unwrap();
        let clock = ManualClock::new();
        let p = TranscriptProcessor::with_clock(
            Arc::new(catalog),
            RecordingSink::default(),
            MatchingConfig::default(),
            clock.clone(),
        );
        (p, clock)
    }

    fn default_processor() -> (TranscriptProcessor<RecordingSink, ManualClock>, ManualClock) {
        let spells = default_spells();
        let pairs: Vec<(&str, &str)> = spells
            .iter()
            .map(|s| (s.phrase.as_str(), s.keys.as_str()))
            .collect();
        processor_for(&pairs)
    }

    fn triggered(p: &TranscriptProcessor<RecordingSink, ManualClock>) -> &[ActionCommand] {
        &p.arbiter().sink().triggered
    }

    #[test]
    fn short_transcript_is_ignored() {
        let (mut p, _) = default_processor();
        assert!(!p.process("lu", false));
        assert!(!p.process("  ox  ", false));
        assert!(triggered(&p).is_empty());
    }

    #[test]
    fn exact_phrase_casts() {
        let (mut p, _) = default_processor();
        assert!(p.process("Lumos", false));
        assert_eq!(triggered(&p), &[ActionCommand::new(Key::F(1), [Key::Char('1')])]);
    }

    #[test]
    fn partial_needs_higher_similarity() {
        let (mut p, _) = processor_for(&[("protego", "q")]);
        // 约 0.71：高于 0.6，低于 0.8
        assert!(!p.process("protaxo", true));
        assert!(p.process("protaxo", false));
        assert_eq!(triggered(&p).len(), 1);
    }

    #[test]
    fn falls_back_to_last_word() {
        let (mut p, _) = processor_for(&[("patronum", "F4+3"), ("lumos", "F1+1")]);
        // 整句得分约 0.57，末词 "patron" 是别名
        assert!(p.process("uh the patron", false));
        assert_eq!(triggered(&p), &["F4+3".parse::<ActionCommand>().unwrap()]);
    }

    #[test]
    fn last_word_too_short_is_not_retried() {
        let (mut p, _) = processor_for(&[("oxo", "q")]);
        assert!(!p.process("say ox", false));
        assert!(triggered(&p).is_empty());
    }

    #[test]
    fn debounced_match_still_counts_as_recognized() {
        let (mut p, clock) = default_processor();
        assert!(p.process("lumos", false));
        clock.advance(Duration::from_millis(200));
        assert!(p.process("lumos", true));
        assert_eq!(triggered(&p).len(), 1);

        clock.advance(Duration::from_millis(400));
        assert!(p.process("lumos", false));
        assert_eq!(triggered(&p).len(), 2);
    }

    #[test]
    fn recently_cast_phrase_is_not_fuzzy_matched() {
        let (mut p, clock) = processor_for(&[("protego", "q")]);
        assert!(p.process("protego", false));

        clock.advance(Duration::from_millis(700));
        assert!(!p.process("protaxo", false));

        clock.advance(Duration::from_millis(400));
        assert!(p.process("protaxo", false));
        assert_eq!(triggered(&p).len(), 2);
    }
}
