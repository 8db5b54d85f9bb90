use crate::action::{ActionCommand, Key};
use crate::arbiter::ActionSink;
use crate::error::InjectError;
use enigo::{Direction, Enigo, Keyboard, Settings};

/// 单个按键的按下/释放
trait KeyDriver {
    fn key(&mut self, key: enigo::Key, direction: Direction) -> Result<(), String>;
}

impl KeyDriver for Enigo {
    fn key(&mut self, key: enigo::Key, direction: Direction) -> Result<(), String> {
        Keyboard::key(self, key, direction).map_err(|e| e.to_string())
    }
}

/// 通过 enigo 模拟组合键
#[derive(Debug, Default)]
pub struct EnigoKeyboard;

impl EnigoKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl ActionSink for EnigoKeyboard {
    fn trigger(&mut self, action: &ActionCommand) -> Result<(), InjectError> {
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| InjectError::Init(e.to_string()))?;
        send_combo(&mut enigo, action.keys())
    }
}

/// 按书写顺序按下所有键，再逆序释放
///
/// 任何一步失败都会释放已按下的键，返回第一个错误。
fn send_combo<D: KeyDriver>(driver: &mut D, keys: &[Key]) -> Result<(), InjectError> {
    let mapped = keys
        .iter()
        .map(|&key| to_enigo(key).map(|native| (key, native)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut first_err = None;
    let mut pressed = Vec::with_capacity(mapped.len());
    for &(key, native) in &mapped {
        match driver.key(native, Direction::Press) {
            Ok(()) => pressed.push((key, native)),
            Err(message) => {
                first_err = Some(InjectError::Press {
                    key: key.to_string(),
                    message,
                });
                break;
            }
        }
    }

    for &(key, native) in pressed.iter().rev() {
        if let Err(message) = driver.key(native, Direction::Release) {
            log::warn!("释放 {key} 失败: {message}");
            first_err.get_or_insert(InjectError::Release {
                key: key.to_string(),
                message,
            });
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// 只打日志，不真正按键
#[derive(Debug, Default)]
pub struct DryRunSink;

impl ActionSink for DryRunSink {
    fn trigger(&mut self, action: &ActionCommand) -> Result<(), InjectError> {
        log::info!("[dry-run] 模拟按键 {action}");
        Ok(())
    }
}

fn to_enigo(key: Key) -> Result<enigo::Key, InjectError> {
    let native = match key {
        Key::Control => enigo::Key::Control,
        Key::Alt => enigo::Key::Alt,
        Key::Shift => enigo::Key::Shift,
        Key::Meta => enigo::Key::Meta,
        Key::Tab => enigo::Key::Tab,
        Key::Return => enigo::Key::Return,
        Key::Escape => enigo::Key::Escape,
        Key::Space => enigo::Key::Space,
        Key::Backspace => enigo::Key::Backspace,
        Key::Delete => enigo::Key::Delete,
        Key::UpArrow => enigo::Key::UpArrow,
        Key::DownArrow => enigo::Key::DownArrow,
        Key::LeftArrow => enigo::Key::LeftArrow,
        Key::RightArrow => enigo::Key::RightArrow,
        Key::Home => enigo::Key::Home,
        Key::End => enigo::Key::End,
        Key::PageUp => enigo::Key::PageUp,
        Key::PageDown => enigo::Key::PageDown,
        Key::F(1) => enigo::Key::F1,
        Key::F(2) => enigo::Key::F2,
        Key::F(3) => enigo::Key::F3,
        Key::F(4) => enigo::Key::F4,
        Key::F(5) => enigo::Key::F5,
        Key::F(6) => enigo::Key::F6,
        Key::F(7) => enigo::Key::F7,
        Key::F(8) => enigo::Key::F8,
        Key::F(9) => enigo::Key::F9,
        Key::F(10) => enigo::Key::F10,
        Key::F(11) => enigo::Key::F11,
        Key::F(12) => enigo::Key::F12,
        Key::F(_) => return Err(InjectError::UnsupportedKey(key.to_string())),
        Key::Char(c) => enigo::Key::Unicode(c),
    };
    Ok(native)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 记录每次按键，在指定的第 n 次调用时失败
    #[derive(Default)]
    struct FakeDriver {
        calls: Vec<(enigo::Key, bool)>,
        fail_at: Vec<usize>,
    }

    impl FakeDriver {
        fn failing_at(calls: &[usize]) -> Self {
            Self {
                fail_at: calls.to_vec(),
                ..Default::default()
            }
        }

        fn held(&self) -> Vec<enigo::Key> {
            let mut held = Vec::new();
            for (i, &(key, press)) in self.calls.iter().enumerate() {
                if self.fail_at.contains(&i) {
                    continue;
                }
                if press {
                    held.push(key);
                } else {
                    held.retain(|k| *k != key);
                }
            }
            held
        }
    }

    impl KeyDriver for FakeDriver {
        fn key(&mut self, key: enigo::Key, direction: Direction) -> Result<(), String> {
            let index = self.calls.len();
            self.calls.push((key, matches!(direction, Direction::Press)));
            if self.fail_at.contains(&index) {
                return Err("device busy".to_string());
            }
            Ok(())
        }
    }

    fn keys(spec: &str) -> Vec<Key> {
        spec.parse::<ActionCommand>().unwrap().keys().to_vec()
    }

    #[test]
    fn presses_in_order_and_releases_reversed() {
        let mut driver = FakeDriver::default();
        send_combo(&mut driver, &keys("F1+1")).unwrap();
        assert_eq!(
            driver.calls,
            vec![
                (enigo::Key::F1, true),
                (enigo::Key::Unicode('1'), true),
                (enigo::Key::Unicode('1'), false),
                (enigo::Key::F1, false),
            ]
        );
    }

    #[test]
    fn failed_press_releases_already_pressed_keys() {
        // 第二个键按下失败
        let mut driver = FakeDriver::failing_at(&[1]);
        let err = send_combo(&mut driver, &keys("F1+1")).unwrap_err();

        assert!(matches!(err, InjectError::Press { ref key, .. } if key == "1"));
        assert_eq!(driver.calls.last(), Some(&(enigo::Key::F1, false)));
        assert!(driver.held().is_empty());
    }

    #[test]
    fn failed_release_keeps_releasing_and_reports_first_error() {
        // 按下 CTRL、SHIFT、S 后，释放 S 失败
        let mut driver = FakeDriver::failing_at(&[3]);
        let err = send_combo(&mut driver, &keys("ctrl+shift+s")).unwrap_err();

        assert!(matches!(err, InjectError::Release { ref key, .. } if key == "S"));
        assert_eq!(driver.calls.len(), 6);
        assert_eq!(driver.calls[4], (enigo::Key::Shift, false));
        assert_eq!(driver.calls[5], (enigo::Key::Control, false));
    }

    #[test]
    fn out_of_range_function_key_is_rejected_before_pressing() {
        let mut driver = FakeDriver::default();
        let err = send_combo(&mut driver, &[Key::F(1), Key::F(13)]).unwrap_err();
        assert!(matches!(err, InjectError::UnsupportedKey(ref k) if k == "F13"));
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn maps_function_and_character_keys() {
        assert_eq!(to_enigo(Key::F(1)).unwrap(), enigo::Key::F1);
        assert_eq!(to_enigo(Key::F(12)).unwrap(), enigo::Key::F12);
        assert_eq!(to_enigo(Key::Char('1')).unwrap(), enigo::Key::Unicode('1'));
        assert_eq!(to_enigo(Key::Control).unwrap(), enigo::Key::Control);
        assert!(to_enigo(Key::F(0)).is_err());
    }

    #[test]
    fn dry_run_never_fails() {
        let action: ActionCommand = "F2+3".parse().unwrap();
        assert!(DryRunSink.trigger(&action).is_ok());
    }
}
