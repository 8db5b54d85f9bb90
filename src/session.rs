use crate::arbiter::ActionSink;
use crate::config::SessionConfig;
use crate::cooldown::Clock;
use crate::error::EventError;
use crate::processor::TranscriptProcessor;
use serde::{Deserialize, Serialize};

/// 流式转写服务推来的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Begin {
        id: String,
    },
    Turn {
        transcript: String,
        #[serde(default)]
        end_of_turn: bool,
    },
    Termination {
        #[serde(default)]
        audio_duration_seconds: f64,
    },
    Error {
        message: String,
    },
}

/// 单条转写
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

impl StreamEvent {
    pub fn transcript(&self) -> Option<TranscriptEvent> {
        match self {
            StreamEvent::Turn {
                transcript,
                end_of_turn,
            } => Some(TranscriptEvent {
                text: transcript.clone(),
                is_final: *end_of_turn,
            }),
            _ => None,
        }
    }
}

/// 解析一行输入：JSON 事件，或纯文本视为一条完整转写
pub fn decode_line(line: &str) -> Result<Option<StreamEvent>, EventError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return Ok(Some(serde_json::from_str(line)?));
    }
    Ok(Some(StreamEvent::Turn {
        transcript: line.to_string(),
        end_of_turn: true,
    }))
}

/// 事件处理后是否继续
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub partials: usize,
    pub finals: usize,
    pub recognized: usize,
}

/// 施法会话：逐条处理流式事件
pub struct SpellSession<S, C> {
    processor: TranscriptProcessor<S, C>,
    min_partial_chars: usize,
    stats: SessionStats,
}

impl<S: ActionSink, C: Clock> SpellSession<S, C> {
    pub fn new(processor: TranscriptProcessor<S, C>, settings: &SessionConfig) -> Self {
        Self {
            processor,
            min_partial_chars: settings.min_partial_chars,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn processor(&self) -> &TranscriptProcessor<S, C> {
        &self.processor
    }

    pub fn handle(&mut self, event: StreamEvent) -> Flow {
        if let Some(turn) = event.transcript() {
            self.on_turn(&turn);
            return Flow::Continue;
        }
        match event {
            StreamEvent::Begin { id } => {
                log::info!("施法会话开始: {id}");
                Flow::Continue
            }
            // 已经由 transcript() 处理
            StreamEvent::Turn { .. } => Flow::Continue,
            StreamEvent::Termination {
                audio_duration_seconds,
            } => {
                let stats = self.stats;
                log::info!(
                    "施法会话结束: {audio_duration_seconds:.2} 秒，中间结果 {}，完整结果 {}，识别 {}",
                    stats.partials,
                    stats.finals,
                    stats.recognized
                );
                Flow::Stop
            }
            StreamEvent::Error { message } => {
                log::error!("转写服务错误: {message}");
                Flow::Continue
            }
        }
    }

    fn on_turn(&mut self, event: &TranscriptEvent) {
        let text = event.text.as_str();
        if !event.is_final {
            // 太短的中间结果变化太快，不值得匹配
            if text.trim().chars().count() < self.min_partial_chars {
                return;
            }
            self.stats.partials += 1;
            log::debug!("中间结果: {text}");
            if self.processor.process(text, true) {
                self.stats.recognized += 1;
                log::info!("由中间结果施法: {text}");
            }
        } else {
            self.stats.finals += 1;
            log::info!("完整结果: {text}");
            if self.processor.process(text, false) {
                self.stats.recognized += 1;
            } else {
                log::info!("未识别到咒语: {text}");
            }
        }
    }
}
