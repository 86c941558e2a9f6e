//! Event loop for a single confirmation in the terminal

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};

use super::keys::handle_key;
use super::render::render_dialog;
use crate::dialog::{Confirmation, ConfirmDialog, Outcome};
use crate::{log_debug, log_warn};

/// Raw mode and the alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on the guard owns the cleanup, even if entering the
        // alternate screen fails
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log_warn!("Failed to leave raw mode: {}", e);
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show) {
            log_warn!("Failed to restore the terminal: {}", e);
        }
    }
}

/// Show `prompt` in the terminal and wait for the answer.
///
/// With a `timeout`, the request is expired once it elapses and the outcome
/// is [`DialogError::TimedOut`](crate::DialogError::TimedOut). The terminal is
/// restored on every exit path, and a request left open by a failure is
/// expired so the panel does not stay shown.
pub fn run_confirm(
    dialog: &ConfirmDialog,
    prompt: &str,
    timeout: Option<Duration>,
) -> Result<Outcome> {
    let mut confirmation = dialog.confirm(prompt)?;
    let deadline = timeout.map(|limit| Instant::now() + limit);

    let result = show(dialog, &mut confirmation, deadline);
    release_on_error(dialog, &confirmation, result)
}

fn show(
    dialog: &ConfirmDialog,
    confirmation: &mut Confirmation,
    deadline: Option<Instant>,
) -> Result<Outcome> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    event_loop(&mut terminal, dialog, confirmation, deadline, read_event)
}

fn read_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn release_on_error(
    dialog: &ConfirmDialog,
    confirmation: &Confirmation,
    result: Result<Outcome>,
) -> Result<Outcome> {
    if result.is_err() && dialog.expire(confirmation.request_id()) {
        log_debug!(
            "Confirmation #{} expired after a terminal error",
            confirmation.request_id()
        );
    }
    result
}

/// Draw and dispatch keys until the confirmation settles. `next_event` waits
/// up to the given time for input.
fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    dialog: &ConfirmDialog,
    confirmation: &mut Confirmation,
    deadline: Option<Instant>,
    mut next_event: impl FnMut(Duration) -> io::Result<Option<Event>>,
) -> Result<Outcome> {
    loop {
        if let Some(outcome) = confirmation.try_outcome() {
            return Ok(outcome);
        }

        terminal.draw(|frame| render_dialog(frame, dialog.page(), dialog.ids()))?;

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            log_debug!("Confirmation #{} timed out", confirmation.request_id());
            dialog.expire(confirmation.request_id());
            continue;
        }

        if let Some(Event::Key(key)) = next_event(Duration::from_millis(50))?
            && key.kind == KeyEventKind::Press
        {
            handle_key(dialog, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DialogError;
    use crate::config::ElementIds;
    use crate::page::Page;
    use crossterm::event::{KeyCode, KeyEvent};
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;

    fn setup() -> (ConfirmDialog, Terminal<TestBackend>) {
        let dialog = ConfirmDialog::new(Page::with_dialog(&ElementIds::default()));
        let terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        (dialog, terminal)
    }

    fn key(c: char) -> io::Result<Option<Event>> {
        Ok(Some(Event::Key(KeyEvent::from(KeyCode::Char(c)))))
    }

    #[test]
    fn test_loop_returns_answer_from_keys() {
        let (dialog, mut terminal) = setup();
        let mut confirmation = dialog.confirm("Proceed?").expect("confirm");
        let mut events = VecDeque::from([Ok(None), key('x'), key('y')]);

        let outcome = event_loop(&mut terminal, &dialog, &mut confirmation, None, |_| {
            events.pop_front().unwrap_or(Ok(None))
        })
        .expect("loop");

        assert_eq!(outcome, Ok(true));
        assert!(events.is_empty());
        assert_eq!(dialog.page().is_hidden("confirm-modal"), Some(true));
    }

    #[test]
    fn test_loop_expires_at_deadline() {
        let (dialog, mut terminal) = setup();
        let mut confirmation = dialog.confirm("Proceed?").expect("confirm");

        let outcome = event_loop(
            &mut terminal,
            &dialog,
            &mut confirmation,
            Some(Instant::now()),
            |_| Ok(None),
        )
        .expect("loop");

        assert_eq!(outcome, Err(DialogError::TimedOut));
        assert!(!dialog.is_pending());
    }

    #[test]
    fn test_input_error_is_reported_and_request_released() {
        let (dialog, mut terminal) = setup();
        let mut confirmation = dialog.confirm("Proceed?").expect("confirm");

        let result = event_loop(&mut terminal, &dialog, &mut confirmation, None, |_| {
            Err(io::Error::other("input closed"))
        });
        let result = release_on_error(&dialog, &confirmation, result);

        let err = result.expect_err("input error is kept");
        assert!(err.to_string().contains("input closed"));
        assert!(!dialog.is_pending());
        assert_eq!(dialog.page().is_hidden("confirm-modal"), Some(true));
        assert_eq!(confirmation.try_outcome(), Some(Err(DialogError::TimedOut)));
    }
}
