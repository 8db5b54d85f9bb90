use std::path::PathBuf;

/// 按键组合解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("按键组合为空")]
    Empty,
    #[error("按键组合 {0:?} 中含有空按键")]
    EmptySegment(String),
    #[error("未知按键: {0}")]
    UnknownKey(String),
}

/// 咒语表构建错误，启动时即失败
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("咒语表为空")]
    Empty,
    #[error("第 {index} 条咒语短语为空")]
    EmptyPhrase { index: usize },
    #[error("咒语重复: {0}")]
    DuplicatePhrase(String),
    #[error("咒语 {phrase} 的按键无效: {source}")]
    InvalidAction {
        phrase: String,
        #[source]
        source: ActionParseError,
    },
}

/// 模拟按键失败，不会中断处理循环
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("初始化 enigo 失败: {0}")]
    Init(String),
    #[error("不支持的按键: {0}")]
    UnsupportedKey(String),
    #[error("按下 {key} 失败: {message}")]
    Press { key: String, message: String },
    #[error("释放 {key} 失败: {message}")]
    Release { key: String, message: String },
}

/// 配置加载/保存错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置失败 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("写入配置失败 {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置失败: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("序列化配置失败: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// 转写事件解码错误
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("解析转写事件失败: {0}")]
    Json(#[from] serde_json::Error),
}
