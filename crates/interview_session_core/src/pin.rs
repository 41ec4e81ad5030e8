//! crates/interview_session_core/src/pin.rs
//!
//! The PIN-entry state machine: six ordered digit cells with auto-advance,
//! backspace navigation and paste handling. Pure transitions; the runtime
//! decides when to call the verification collaborator.

use crate::domain::PIN_LEN;

/// Outcome of a single input transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinAction {
    /// Nothing to do beyond re-rendering the cells.
    None,
    /// All six digits are present; verification should be attempted now.
    Complete(String),
}

/// The candidate's in-progress PIN input.
///
/// Created when the PIN screen is shown; cleared wholesale on a failed
/// verification attempt.
#[derive(Debug, Clone, Default)]
pub struct PinEntry {
    cells: [Option<char>; PIN_LEN],
    focus: usize,
}

impl PinEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Option<char>; PIN_LEN] {
        &self.cells
    }

    /// Index of the cell that currently holds focus.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Handles a single typed character at the focused cell.
    ///
    /// Non-digit input is ignored. Typing into the last cell triggers
    /// auto-verification; there is no explicit submit action.
    pub fn press_digit(&mut self, ch: char) -> PinAction {
        if !ch.is_ascii_digit() {
            return PinAction::None;
        }
        self.cells[self.focus] = Some(ch);
        if self.focus + 1 < PIN_LEN {
            self.focus += 1;
            PinAction::None
        } else {
            self.complete_if_full()
        }
    }

    /// Handles backspace. On a filled cell the digit is erased in place;
    /// on an empty cell focus moves to the previous cell and clears it.
    pub fn backspace(&mut self) {
        if self.cells[self.focus].is_some() {
            self.cells[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.cells[self.focus] = None;
        }
    }

    /// Distributes a pasted string across the cells starting at index 0.
    ///
    /// Non-digit characters are discarded and at most six digits are taken.
    /// Focus lands on the last filled cell; a full six-digit paste triggers
    /// verification immediately.
    pub fn paste(&mut self, text: &str) -> PinAction {
        let digits: Vec<char> = text.chars().filter(|c| c.is_ascii_digit()).take(PIN_LEN).collect();
        if digits.is_empty() {
            return PinAction::None;
        }
        for (i, ch) in digits.iter().enumerate() {
            self.cells[i] = Some(*ch);
        }
        self.focus = digits.len().min(PIN_LEN) - 1;
        if digits.len() == PIN_LEN {
            self.complete_if_full()
        } else {
            PinAction::None
        }
    }

    /// Empties every cell and returns focus to the first one. Used after a
    /// failed verification attempt.
    pub fn clear(&mut self) {
        self.cells = [None; PIN_LEN];
        self.focus = 0;
    }

    fn complete_if_full(&self) -> PinAction {
        let pin: String = self.cells.iter().flatten().collect();
        if pin.len() == PIN_LEN {
            PinAction::Complete(pin)
        } else {
            PinAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_advances_and_completes_on_sixth_digit() {
        let mut entry = PinEntry::new();
        for (i, ch) in "12345".chars().enumerate() {
            assert_eq!(entry.press_digit(ch), PinAction::None);
            assert_eq!(entry.focus(), i + 1);
        }
        assert_eq!(entry.press_digit('6'), PinAction::Complete("123456".into()));
        assert_eq!(entry.focus(), PIN_LEN - 1);
    }

    #[test]
    fn non_digits_are_ignored() {
        let mut entry = PinEntry::new();
        assert_eq!(entry.press_digit('x'), PinAction::None);
        assert_eq!(entry.focus(), 0);
        assert!(entry.cells().iter().all(Option::is_none));
    }

    #[test]
    fn backspace_on_empty_cell_clears_previous() {
        let mut entry = PinEntry::new();
        entry.press_digit('1');
        entry.press_digit('2');
        // Focus sits on the empty third cell.
        entry.backspace();
        assert_eq!(entry.focus(), 1);
        assert_eq!(entry.cells()[1], None);
        assert_eq!(entry.cells()[0], Some('1'));
    }

    #[test]
    fn paste_strips_non_digits_and_auto_verifies() {
        let mut entry = PinEntry::new();
        let action = entry.paste("12ab3456");
        assert_eq!(action, PinAction::Complete("123456".into()));
        let cells: Vec<char> = entry.cells().iter().flatten().copied().collect();
        assert_eq!(cells, vec!['1', '2', '3', '4', '5', '6']);
        assert_eq!(entry.focus(), 5);
    }

    #[test]
    fn partial_paste_focuses_last_filled_cell() {
        let mut entry = PinEntry::new();
        assert_eq!(entry.paste("12"), PinAction::None);
        assert_eq!(entry.focus(), 1);
        assert_eq!(entry.cells()[0], Some('1'));
        assert_eq!(entry.cells()[1], Some('2'));
        assert_eq!(entry.cells()[2], None);
    }

    #[test]
    fn overlong_paste_takes_first_six_digits() {
        let mut entry = PinEntry::new();
        assert_eq!(entry.paste("9876543210"), PinAction::Complete("987654".into()));
    }

    #[test]
    fn clear_resets_everything() {
        let mut entry = PinEntry::new();
        entry.paste("123456");
        entry.clear();
        assert_eq!(entry.focus(), 0);
        assert!(entry.cells().iter().all(Option::is_none));
    }
}
