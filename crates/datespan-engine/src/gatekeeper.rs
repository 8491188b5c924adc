//! Keystroke filtering for the two date inputs.

/// Characters at which a field stops accepting input.
pub const MAX_INPUT_LEN: usize = 10;

/// Length at which typing triggers validation.
pub const MIN_VALIDATE_LEN: usize = 8;

/// Decides which keystrokes reach a date input and when to validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gatekeeper {
    pub separator: char,
    pub max_len: usize,
    pub min_validate_len: usize,
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::new('.')
    }
}

impl Gatekeeper {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            max_len: MAX_INPUT_LEN,
            min_validate_len: MIN_VALIDATE_LEN,
        }
    }

    /// Whether a keystroke `key` may land in a field currently holding
    /// `value_len` characters with `selection_len` of them selected.
    ///
    /// Only a single digit or the separator passes. A full field admits
    /// a keystroke only when it replaces a selection.
    pub fn admits(&self, key: &str, value_len: usize, selection_len: usize) -> bool {
        let mut chars = key.chars();
        let allowed = match (chars.next(), chars.next()) {
            (Some(c), None) => c.is_ascii_digit() || c == self.separator,
            _ => false,
        };
        allowed && (value_len < self.max_len || selection_len > 0)
    }

    /// Whether typing has produced enough text to try parsing it.
    pub fn should_validate(&self, value_len: usize) -> bool {
        value_len >= self.min_validate_len
    }
}
