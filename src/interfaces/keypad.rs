use crate::config::DEFAULT_MAX_AMOUNT;
use rust_decimal::Decimal;
use std::str::FromStr;

const MAX_DECIMALS: usize = 2;
const MAX_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Backspace,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => c.to_digit(10).map(|d| Key::Digit(d as u8)),
            '.' => Some(Key::Point),
            '\u{8}' | '⌫' => Some(Key::Backspace),
            _ => None,
        }
    }
}

/// Amount typed on the terminal keypad, one key at a time.
///
/// Keys that would make the buffer invalid are refused and leave it as is.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountEntry {
    buffer: String,
    ceiling: Decimal,
}

impl Default for AmountEntry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AMOUNT)
    }
}

impl AmountEntry {
    pub fn new(ceiling: Decimal) -> Self {
        Self {
            buffer: String::new(),
            ceiling,
        }
    }

    /// Applies a key press. Returns whether the buffer accepted it.
    pub fn press(&mut self, key: Key) -> bool {
        match key {
            Key::Backspace => self.buffer.pop().is_some(),
            Key::Point => {
                if self.buffer.is_empty() || self.buffer.contains('.') {
                    return false;
                }
                self.buffer.push('.');
                true
            }
            Key::Digit(d) if d <= 9 => {
                if let Some((_, decimals)) = self.buffer.split_once('.')
                    && decimals.len() >= MAX_DECIMALS
                {
                    return false;
                }
                if self.buffer.len() >= MAX_CHARS {
                    return false;
                }
                let candidate = format!("{}{}", self.buffer, d);
                match Decimal::from_str(&candidate) {
                    Ok(value) if value <= self.ceiling => {
                        self.buffer = candidate;
                        true
                    }
                    _ => false,
                }
            }
            Key::Digit(_) => false,
        }
    }

    /// Types every recognised character of `input`, returning how many were accepted.
    pub fn type_str(&mut self, input: &str) -> usize {
        input
            .chars()
            .filter_map(Key::from_char)
            .filter(|key| self.press(*key))
            .count()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from_str(self.buffer.trim_end_matches('.')).ok()
    }

    /// Whether the amount can be submitted: `0 < amount <= ceiling`.
    pub fn is_valid(&self) -> bool {
        self.amount()
            .is_some_and(|value| value > Decimal::ZERO && value <= self.ceiling)
    }

    /// The amount as shown on screen, always with two decimals.
    pub fn display(&self) -> String {
        match self.amount() {
            Some(value) => format!("{:.2}", value),
            None => "0.00".to_string(),
        }
    }
}
