//! Key handling for the confirm panel

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dialog::ConfirmDialog;
use crate::trace_debug;

/// What a key press did to the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// An answer control was clicked
    Answered(bool),
    /// The pending request was dismissed
    Dismissed,
    /// Nothing happened
    Ignored,
}

/// Map a key press onto the dialog's controls
pub fn handle_key(dialog: &ConfirmDialog, key: KeyEvent) -> KeyOutcome {
    let ids = dialog.ids();
    let outcome = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => dismiss(dialog),
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => click(dialog, &ids.affirmative, true),
        KeyCode::Char('n' | 'N') => click(dialog, &ids.negative, false),
        KeyCode::Esc => dismiss(dialog),
        _ => KeyOutcome::Ignored,
    };
    trace_debug!(code = ?key.code, outcome = ?outcome, "confirm key handled");
    outcome
}

fn click(dialog: &ConfirmDialog, control: &str, answer: bool) -> KeyOutcome {
    if dialog.page().click(control) {
        KeyOutcome::Answered(answer)
    } else {
        KeyOutcome::Ignored
    }
}

fn dismiss(dialog: &ConfirmDialog) -> KeyOutcome {
    if dialog.dismiss() {
        KeyOutcome::Dismissed
    } else {
        KeyOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementIds;
    use crate::page::Page;

    fn dialog() -> ConfirmDialog {
        ConfirmDialog::new(Page::with_dialog(&ElementIds::default()))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_yes_keys_click_affirmative() {
        for code in [KeyCode::Char('y'), KeyCode::Char('Y'), KeyCode::Enter] {
            let dialog = dialog();
            let mut confirmation = dialog.confirm("Sure?").expect("confirm");

            assert_eq!(handle_key(&dialog, press(code)), KeyOutcome::Answered(true));
            assert_eq!(confirmation.try_outcome(), Some(Ok(true)));
        }
    }

    #[test]
    fn test_no_key_clicks_negative() {
        let dialog = dialog();
        let mut confirmation = dialog.confirm("Sure?").expect("confirm");

        assert_eq!(
            handle_key(&dialog, press(KeyCode::Char('n'))),
            KeyOutcome::Answered(false)
        );
        assert_eq!(confirmation.try_outcome(), Some(Ok(false)));
    }

    #[test]
    fn test_escape_and_ctrl_c_dismiss() {
        let dialog = dialog();
        let mut confirmation = dialog.confirm("Sure?").expect("confirm");
        assert_eq!(handle_key(&dialog, press(KeyCode::Esc)), KeyOutcome::Dismissed);
        assert_eq!(confirmation.try_outcome(), Some(Ok(false)));

        let mut confirmation = dialog.confirm("Again?").expect("confirm");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&dialog, ctrl_c), KeyOutcome::Dismissed);
        assert_eq!(confirmation.try_outcome(), Some(Ok(false)));
    }

    #[test]
    fn test_keys_after_answer_are_ignored() {
        let dialog = dialog();
        let mut confirmation = dialog.confirm("Sure?").expect("confirm");
        handle_key(&dialog, press(KeyCode::Char('y')));

        assert_eq!(
            handle_key(&dialog, press(KeyCode::Char('n'))),
            KeyOutcome::Ignored
        );
        assert_eq!(handle_key(&dialog, press(KeyCode::Esc)), KeyOutcome::Ignored);
        assert_eq!(confirmation.try_outcome(), Some(Ok(true)));
    }

    #[test]
    fn test_other_keys_ignored() {
        let dialog = dialog();
        let _confirmation = dialog.confirm("Sure?").expect("confirm");
        assert_eq!(
            handle_key(&dialog, press(KeyCode::Char('x'))),
            KeyOutcome::Ignored
        );
        assert!(dialog.is_pending());
    }
}
