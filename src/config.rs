use crate::catalog::PhraseCatalog;
use crate::error::{CatalogError, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "SPELLCAST_CONFIG";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// 咒语 → 快捷键，按定义顺序匹配，如 phrase = "lumos", keys = "F1+1"
    #[serde(default = "default_spells")]
    pub spells: Vec<SpellBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellBinding {
    pub phrase: String,
    pub keys: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 完整转写的最低相似度
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// 中间结果额外要求的相似度
    #[serde(default = "default_partial_penalty")]
    pub partial_penalty: f64,
    /// 少于该字符数的转写直接忽略
    #[serde(default = "default_min_chars")]
    pub min_transcript_chars: usize,
    /// 末词重试要求的最短字符数
    #[serde(default = "default_min_chars")]
    pub min_tail_word_chars: usize,
    /// 子串匹配要求文本至少达到咒语长度的比例
    #[serde(default = "default_substring_ratio")]
    pub substring_ratio: f64,
    /// 同一咒语两次施放的最小间隔（毫秒）
    #[serde(default = "default_fire_debounce_ms")]
    pub fire_debounce_ms: u64,
    /// 刚施放的咒语在多长时间内不参与模糊匹配（毫秒）
    #[serde(default = "default_match_exclusion_ms")]
    pub match_exclusion_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// 只记录日志，不真正模拟按键
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 中间结果至少多少字符才处理
    #[serde(default = "default_min_partial_chars")]
    pub min_partial_chars: usize,
}

fn default_confidence_threshold() -> f64 {
    0.6
}
fn default_partial_penalty() -> f64 {
    0.2
}
fn default_min_chars() -> usize {
    3
}
fn default_substring_ratio() -> f64 {
    0.7
}
fn default_fire_debounce_ms() -> u64 {
    500
}
fn default_match_exclusion_ms() -> u64 {
    1000
}
fn default_min_partial_chars() -> usize {
    4
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            partial_penalty: default_partial_penalty(),
            min_transcript_chars: default_min_chars(),
            min_tail_word_chars: default_min_chars(),
            substring_ratio: default_substring_ratio(),
            fire_debounce_ms: default_fire_debounce_ms(),
            match_exclusion_ms: default_match_exclusion_ms(),
        }
    }
}

impl MatchingConfig {
    pub fn fire_debounce(&self) -> Duration {
        Duration::from_millis(self.fire_debounce_ms)
    }

    pub fn match_exclusion(&self) -> Duration {
        Duration::from_millis(self.match_exclusion_ms)
    }

    /// 中间结果与完整结果各自的实际阈值
    pub fn effective_threshold(&self, is_partial: bool) -> f64 {
        if is_partial {
            self.confidence_threshold + self.partial_penalty
        } else {
            self.confidence_threshold
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("partial_penalty", self.partial_penalty),
            ("substring_ratio", self.substring_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "matching.{name} 必须在 0.0 到 1.0 之间，当前为 {value}"
                )));
            }
        }
        // 中间结果的阈值不能超过 1.0，否则永远无法施法
        let partial = self.confidence_threshold + self.partial_penalty;
        if partial > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "matching.confidence_threshold + matching.partial_penalty 不能超过 1.0，当前为 {partial}"
            )));
        }
        Ok(())
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { dry_run: false }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_partial_chars: default_min_partial_chars(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            matching: MatchingConfig::default(),
            input: InputConfig::default(),
            session: SessionConfig::default(),
            spells: default_spells(),
        }
    }
}

impl AppConfig {
    /// 由咒语配置构建只读咒语表
    pub fn catalog(&self) -> Result<PhraseCatalog, CatalogError> {
        PhraseCatalog::new(
            self.spells
                .iter()
                .map(|s| (s.phrase.as_str(), s.keys.as_str())),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate()?;
        self.catalog()?;
        Ok(())
    }
}

/// 获取配置文件路径，环境变量优先
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spellcast-voice");
    config_dir.join("config.toml")
}

/// 加载配置，文件不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<AppConfig>(&content)?
    } else {
        let config = AppConfig::default();
        save_config_to(&config, path)?;
        log::info!("已创建默认配置: {}", path.display());
        config
    };
    config.validate()?;
    Ok(config)
}

/// 保存配置到文件
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// 默认咒语表
pub fn default_spells() -> Vec<SpellBinding> {
    [
        ("lumos", "F1+1"),
        ("levitate", "F1+2"),
        ("levi os o", "F1+2"),
        ("levioso", "F1+2"),
        ("wingardium leviosa", "F1+2"),
        ("incendio", "F1+3"),
        ("summon", "F1+4"),
        ("axio", "F1+4"),
        ("exhale", "F1+4"),
        ("protego", "Q"),
        ("revelio", "R"),
        ("repair", "F2+3"),
        ("reparo", "F2+3"),
        ("disarm", "F1+3"),
        ("stun", "F2+1"),
        ("stupefy", "F2+1"),
        ("ward", "F2+2"),
        ("bind", "F2+4"),
        ("petrificus", "F2+4"),
        ("ignite", "F3+1"),
        ("freeze", "F3+2"),
        ("glacius", "F3+2"),
        ("arrest", "F3+3"),
        ("momentum", "F3+3"),
        ("blast", "F3+4"),
        ("confringo", "F3+4"),
        ("banish", "F4+1"),
        ("depulso", "F4+1"),
        ("shatter", "F4+2"),
        ("reducto", "F4+2"),
        ("patronum", "F4+3"),
        ("mend", "F4+4"),
    ]
    .into_iter()
    .map(|(phrase, keys)| SpellBinding {
        phrase: phrase.to_string(),
        keys: keys.to_string(),
    })
    .collect()
}
