use crate::action::ActionCommand;
use crate::error::CatalogError;
use std::collections::HashMap;

/// 统一大小写与首尾空白
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 咒语表中的一条：规范短语 → 按键组合
#[derive(Debug, Clone, PartialEq, Eq)]
struct PhraseEntry {
    phrase: String,
    action: ActionCommand,
}

/// 别名索引：变体 → 规范短语
///
/// 每个短语注册自身、去掉 "um"/"us" 后缀的形式，以及长度超过 4 时的前 4、前 5 个字符。
/// 变体之间发生冲突时，按咒语表顺序后注册者覆盖先注册者；变体不会覆盖任何短语本身。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasIndex {
    map: HashMap<String, String>,
}

impl AliasIndex {
    pub fn build<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        let phrases: Vec<&str> = phrases.into_iter().collect();
        let mut map = HashMap::new();

        for &phrase in &phrases {
            for variant in variants(phrase) {
                if !variant.is_empty() {
                    map.insert(variant, phrase.to_string());
                }
            }
        }
        // 短语本身最后写入，保证精确匹配永远命中自己
        for &phrase in &phrases {
            map.insert(phrase.to_string(), phrase.to_string());
        }

        Self { map }
    }

    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

}

fn variants(phrase: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(3);
    if let Some(stem) = phrase
        .strip_suffix("um")
        .or_else(|| phrase.strip_suffix("us"))
    {
        out.push(stem.to_string());
    }
    if phrase.chars().count() > 4 {
        out.push(phrase.chars().take(4).collect());
        out.push(phrase.chars().take(5).collect());
    }
    out
}

/// 咒语表，启动时构建，之后只读
#[derive(Debug, Clone)]
pub struct PhraseCatalog {
    entries: Vec<PhraseEntry>,
    positions: HashMap<String, usize>,
    aliases: AliasIndex,
}

impl PhraseCatalog {
    /// 按给定顺序构建咒语表；短语为空、重复或按键无效时立即失败
    pub fn new<I, P, A>(bindings: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (P, A)>,
        P: AsRef<str>,
        A: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut positions = HashMap::new();

        for (index, (phrase, keys)) in bindings.into_iter().enumerate() {
            let phrase = normalize(phrase.as_ref());
            if phrase.is_empty() {
                return Err(CatalogError::EmptyPhrase { index });
            }
            if positions.contains_key(&phrase) {
                return Err(CatalogError::DuplicatePhrase(phrase));
            }
            let action = keys
                .as_ref()
                .parse::<ActionCommand>()
                .map_err(|source| CatalogError::InvalidAction {
                    phrase: phrase.clone(),
                    source,
                })?;
            positions.insert(phrase.clone(), entries.len());
            entries.push(PhraseEntry { phrase, action });
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let aliases = AliasIndex::build(entries.iter().map(|e| e.phrase.as_str()));
        Ok(Self {
            entries,
            positions,
            aliases,
        })
    }

    /// 按定义顺序遍历规范短语
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.phrase.as_str())
    }

    pub fn action(&self, phrase: &str) -> Option<&ActionCommand> {
        self.positions.get(phrase).map(|&i| &self.entries[i].action)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.positions.contains_key(phrase)
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
