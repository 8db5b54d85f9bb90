use crate::error::ActionParseError;
use std::fmt;
use std::str::FromStr;

/// 可模拟的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Control,
    Alt,
    Shift,
    Meta,
    Tab,
    Return,
    Escape,
    Space,
    Backspace,
    Delete,
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,
    Home,
    End,
    PageUp,
    PageDown,
    /// 功能键 F1..=F12
    F(u8),
    /// 单个字符键，统一小写
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Control => "CTRL",
            Key::Alt => "ALT",
            Key::Shift => "SHIFT",
            Key::Meta => "META",
            Key::Tab => "TAB",
            Key::Return => "ENTER",
            Key::Escape => "ESC",
            Key::Space => "SPACE",
            Key::Backspace => "BACKSPACE",
            Key::Delete => "DELETE",
            Key::UpArrow => "UP",
            Key::DownArrow => "DOWN",
            Key::LeftArrow => "LEFT",
            Key::RightArrow => "RIGHT",
            Key::Home => "HOME",
            Key::End => "END",
            Key::PageUp => "PAGEUP",
            Key::PageDown => "PAGEDOWN",
            Key::F(n) => return write!(f, "F{n}"),
            Key::Char(c) => return write!(f, "{}", c.to_ascii_uppercase()),
        };
        f.write_str(name)
    }
}

impl FromStr for Key {
    type Err = ActionParseError;

    /// 解析单个按键名称
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let upper = name.trim().to_uppercase();
        let key = match upper.as_str() {
            "CTRL" | "CONTROL" => Key::Control,
            "ALT" => Key::Alt,
            "SHIFT" => Key::Shift,
            "META" | "WIN" | "SUPER" => Key::Meta,
            "TAB" => Key::Tab,
            "ENTER" | "RETURN" => Key::Return,
            "ESCAPE" | "ESC" => Key::Escape,
            "SPACE" => Key::Space,
            "BACKSPACE" => Key::Backspace,
            "DELETE" | "DEL" => Key::Delete,
            "UP" => Key::UpArrow,
            "DOWN" => Key::DownArrow,
            "LEFT" => Key::LeftArrow,
            "RIGHT" => Key::RightArrow,
            "HOME" => Key::Home,
            "END" => Key::End,
            "PAGEUP" => Key::PageUp,
            "PAGEDOWN" => Key::PageDown,
            s => {
                if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        return Ok(Key::F(n));
                    }
                }
                let mut chars = name.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_lowercase().next().unwrap_or(c)),
                    _ => return Err(ActionParseError::UnknownKey(name.trim().to_string())),
                }
            }
        };
        Ok(key)
    }
}

/// 一次施法要同时按下的按键组合：第一个为主键，其余为修饰键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionCommand {
    keys: Vec<Key>,
}

impl ActionCommand {
    pub fn new(primary: Key, modifiers: impl IntoIterator<Item = Key>) -> Self {
        let mut keys = vec![primary];
        keys.extend(modifiers);
        Self { keys }
    }

    pub fn primary(&self) -> Key {
        self.keys[0]
    }

    pub fn modifiers(&self) -> &[Key] {
        &self.keys[1..]
    }

    /// 按书写顺序的全部按键
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

impl FromStr for ActionCommand {
    type Err = ActionParseError;

    /// 解析 "F1+1"、"CTRL+SHIFT+S"、"q" 这样的组合
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.trim().is_empty() {
            return Err(ActionParseError::Empty);
        }
        let keys = spec
            .split('+')
            .map(|part| {
                if part.trim().is_empty() {
                    Err(ActionParseError::EmptySegment(spec.to_string()))
                } else {
                    part.parse::<Key>()
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_key_with_digit() {
        let action: ActionCommand = "f1+1".parse().unwrap();
        assert_eq!(action.primary(), Key::F(1));
        assert_eq!(action.modifiers(), &[Key::Char('1')]);
        assert_eq!(action.to_string(), "F1+1");
    }

    #[test]
    fn parses_single_key() {
        let action: ActionCommand = "Q".parse().unwrap();
        assert_eq!(action.keys(), &[Key::Char('q')]);
        assert!(action.modifiers().is_empty());
    }

    #[test]
    fn parses_named_modifiers() {
        let action: ActionCommand = "ctrl + shift + s".parse().unwrap();
        assert_eq!(action.keys(), &[Key::Control, Key::Shift, Key::Char('s')]);
    }

    #[test]
    fn rejects_bad_specs() {
        assert_eq!("".parse::<ActionCommand>(), Err(ActionParseError::Empty));
        assert!(matches!(
            "F1+".parse::<ActionCommand>(),
            Err(ActionParseError::EmptySegment(_))
        ));
        assert_eq!(
            "F13".parse::<ActionCommand>(),
            Err(ActionParseError::UnknownKey("F13".to_string()))
        );
        assert!("hyper+x".parse::<ActionCommand>().is_err());
    }

    #[test]
    fn constructor_matches_parser() {
        let built = ActionCommand::new(Key::F(2), [Key::Char('3')]);
        assert_eq!(built, "F2+3".parse::<ActionCommand>().unwrap());
    }
}
