use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 时间来源，测试中可替换为手动时钟
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 每条咒语最近一次施放的时间
///
/// 只由施法仲裁器写入；匹配器只读，用于在模糊匹配中跳过刚施放过的咒语。
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_fired: HashMap<String, Instant>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired(&self, phrase: &str) -> Option<Instant> {
        self.last_fired.get(phrase).copied()
    }

    /// 距上次施放经过的时间；从未施放返回 None
    pub fn elapsed(&self, phrase: &str, now: Instant) -> Option<Duration> {
        self.last_fired(phrase).map(|at| now.saturating_duration_since(at))
    }

    /// 是否在 `window` 时间内施放过
    pub fn within(&self, phrase: &str, window: Duration, now: Instant) -> bool {
        self.elapsed(phrase, now).is_some_and(|elapsed| elapsed < window)
    }

    pub fn record(&mut self, phrase: &str, at: Instant) {
        self.last_fired.insert(phrase.to_string(), at);
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}
