use crate::action::ActionCommand;
use crate::catalog::PhraseCatalog;
use crate::cooldown::CooldownState;
use crate::error::InjectError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 按键输出端：按下并释放一组按键
pub trait ActionSink {
    fn trigger(&mut self, action: &ActionCommand) -> Result<(), InjectError>;
}

impl<S: ActionSink + ?Sized> ActionSink for Box<S> {
    fn trigger(&mut self, action: &ActionCommand) -> Result<(), InjectError> {
        (**self).trigger(action)
    }
}

/// 一次施法请求的结果
#[derive(Debug)]
pub enum CastOutcome {
    Cast,
    /// 已计入冷却，但模拟按键失败
    InjectionFailed(InjectError),
    /// 距上次施放太近，被忽略
    Debounced,
    UnknownPhrase,
}

impl CastOutcome {
    /// 是否计作一次施放（按键失败也算）
    pub fn fired(&self) -> bool {
        matches!(self, CastOutcome::Cast | CastOutcome::InjectionFailed(_))
    }
}

/// 施法仲裁器，冷却状态的唯一写入者
pub struct CastArbiter<S> {
    catalog: Arc<PhraseCatalog>,
    sink: S,
    cooldown: CooldownState,
    debounce: Duration,
}

impl<S: ActionSink> CastArbiter<S> {
    pub fn new(catalog: Arc<PhraseCatalog>, sink: S, debounce: Duration) -> Self {
        Self {
            catalog,
            sink,
            cooldown: CooldownState::new(),
            debounce,
        }
    }

    pub fn cooldown(&self) -> &CooldownState {
        &self.cooldown
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 尝试施放咒语
    ///
    /// 先记录施放时间再触发按键，所以按键失败不会换来一次免冷却的重试。
    pub fn fire(&mut self, phrase: &str, now: Instant) -> CastOutcome {
        if self.cooldown.within(phrase, self.debounce, now) {
            log::debug!("忽略重复施法: {phrase}");
            return CastOutcome::Debounced;
        }

        let Some(action) = self.catalog.action(phrase) else {
            log::warn!("咒语表中没有: {phrase}");
            return CastOutcome::UnknownPhrase;
        };

        log::info!("施放 {phrase} → {action}");
        self.cooldown.record(phrase, now);

        match self.sink.trigger(action) {
            Ok(()) => CastOutcome::Cast,
            Err(e) => {
                log::error!("施放 {phrase} 失败: {e}");
                CastOutcome::InjectionFailed(e)
            }
        }
    }
}
