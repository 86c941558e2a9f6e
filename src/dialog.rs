//! Yes/no confirmation dialog
//!
//! [`ConfirmDialog`] shows a prompt on a page's panel and hands back a
//! [`Confirmation`] that settles once the user clicks one of the two answer
//! controls. The page keeps one request slot per panel, shared by every dialog
//! that drives that panel; [`OverlapPolicy`] decides what a new request does
//! to one that is still waiting.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::{DialogConfig, ElementIds};
use crate::error::DialogError;
use crate::page::{ClickHandler, Document, ElementKind, Page};
use crate::{log_debug, log_warn};

/// Result delivered to a waiting caller
pub type Outcome = Result<bool, DialogError>;

/// What `confirm` does when a previous request is still waiting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Refuse the new request with [`DialogError::Busy`]
    Reject,
    /// Settle the old request with [`DialogError::Superseded`] and show the new one
    #[default]
    Replace,
    /// Rebind the controls and leave the old request pending forever.
    ///
    /// This is how the dialog historically behaved; it logs a warning every
    /// time a request is orphaned. Each orphaned request keeps its sender in
    /// the panel's slot, so the slot grows by one entry per overlap with no
    /// upper bound. The entries are only released when the panel element is
    /// removed from the page or the page itself is dropped, at which point
    /// the orphaned futures yield [`DialogError::Abandoned`].
    Overwrite,
}

/// Observable state of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Idle,
    Shown { request_id: u64 },
}

#[derive(Debug)]
struct PendingRequest {
    id: u64,
    resolve: oneshot::Sender<Outcome>,
}

/// Outstanding request of one panel. Lives in the [`Document`] so every
/// dialog over the same panel sees the same slot.
#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    next_id: u64,
    pending: Option<PendingRequest>,
    /// Requests dropped by `OverlapPolicy::Overwrite`. Their senders stay alive
    /// so the callers keep waiting instead of seeing `Abandoned`.
    orphaned: Vec<PendingRequest>,
}

impl RequestSlot {
    fn take_if(&mut self, request_id: u64) -> Option<PendingRequest> {
        if self.pending.as_ref().is_some_and(|p| p.id == request_id) {
            self.pending.take()
        } else {
            None
        }
    }

    fn pending_id(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.id)
    }

    #[cfg(test)]
    pub(crate) fn orphaned_len(&self) -> usize {
        self.orphaned.len()
    }

    /// Reserve the next request id, applying `policy` to whatever is still
    /// pending.
    fn claim(&mut self, policy: OverlapPolicy) -> Result<u64, DialogError> {
        if let Some(previous) = self.pending.take() {
            match policy {
                OverlapPolicy::Reject => {
                    let request_id = previous.id;
                    self.pending = Some(previous);
                    log_debug!("Rejecting confirmation, #{} still pending", request_id);
                    return Err(DialogError::Busy { request_id });
                }
                OverlapPolicy::Replace => {
                    log_debug!("Confirmation #{} superseded", previous.id);
                    let _ = previous.resolve.send(Err(DialogError::Superseded {
                        request_id: previous.id,
                    }));
                }
                OverlapPolicy::Overwrite => {
                    log_warn!(
                        "Confirmation #{} overwritten while pending; it will never settle ({} orphaned)",
                        previous.id,
                        self.orphaned.len() + 1
                    );
                    self.orphaned.push(previous);
                }
            }
        }
        self.next_id += 1;
        Ok(self.next_id)
    }
}

/// A confirmation dialog bound to one panel on a page.
///
/// The dialog itself holds no request state. Several dialogs, or calls to
/// [`confirm_dialog`], over the same panel share the page's slot for it.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    page: Page,
    ids: ElementIds,
    policy: OverlapPolicy,
}

impl ConfirmDialog {
    /// Dialog using the conventional element ids and the default policy
    pub fn new(page: Page) -> Self {
        Self::with_ids(page, ElementIds::default())
    }

    pub fn with_ids(page: Page, ids: ElementIds) -> Self {
        Self {
            page,
            ids,
            policy: OverlapPolicy::default(),
        }
    }

    pub fn from_config(page: Page, config: &DialogConfig) -> Self {
        Self::with_ids(page, config.elements.clone()).with_policy(config.overlap)
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// State of the panel's request slot, whichever dialog filled it
    pub fn state(&self) -> DialogState {
        self.page.update(|doc| {
            doc.request_slot_ref(&self.ids.panel)
                .and_then(RequestSlot::pending_id)
                .map_or(DialogState::Idle, |request_id| DialogState::Shown {
                    request_id,
                })
        })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state(), DialogState::Shown { .. })
    }

    /// Show `prompt` and return a handle that settles with the user's answer.
    ///
    /// The prompt is written to the text region verbatim. All four elements
    /// are looked up before anything on the page changes; a missing one fails
    /// with [`DialogError::MissingElement`] and one of the wrong kind with
    /// [`DialogError::WrongElementKind`].
    pub fn confirm(&self, prompt: &str) -> Result<Confirmation, DialogError> {
        self.page.update(|doc| {
            check_elements(doc, &self.ids)?;

            let slot = doc.request_slot(&self.ids.panel);
            let request_id = slot.claim(self.policy)?;
            let (resolve, rx) = oneshot::channel();
            slot.pending = Some(PendingRequest {
                id: request_id,
                resolve,
            });

            doc.set_text(&self.ids.text, prompt);
            doc.set_hidden(&self.ids.panel, false);
            doc.bind(&self.ids.affirmative, self.answer_handler(request_id, true));
            doc.bind(&self.ids.negative, self.answer_handler(request_id, false));

            log_debug!(
                "Confirmation #{} shown on '{}' ({} bytes)",
                request_id,
                self.ids.panel,
                prompt.len()
            );
            Ok(Confirmation::new(request_id, rx))
        })
    }

    /// Like [`confirm`](Self::confirm), but expire the request when no answer
    /// arrives within `limit`.
    pub async fn confirm_within(&self, prompt: &str, limit: Duration) -> Outcome {
        let mut confirmation = self.confirm(prompt)?;
        let request_id = confirmation.request_id();

        if let Ok(outcome) = tokio::time::timeout(limit, &mut confirmation).await {
            return outcome;
        }
        if self.expire(request_id) {
            return Err(DialogError::TimedOut);
        }
        // The answer landed between the deadline and the expiry
        confirmation
            .try_outcome()
            .unwrap_or(Err(DialogError::TimedOut))
    }

    /// Answer the panel's outstanding request with "no" and hide the panel.
    ///
    /// Returns whether a request was outstanding.
    pub fn dismiss(&self) -> bool {
        self.settle(None, Ok(false))
    }

    /// Settle request `request_id` with [`DialogError::TimedOut`] if it is
    /// still the outstanding one.
    pub fn expire(&self, request_id: u64) -> bool {
        self.settle(Some(request_id), Err(DialogError::TimedOut))
    }

    fn answer_handler(&self, request_id: u64, answer: bool) -> ClickHandler {
        let ids = self.ids.clone();
        Box::new(move |doc: &mut Document| {
            let Some(request) = doc.request_slot(&ids.panel).take_if(request_id) else {
                return;
            };
            close_panel(doc, &ids);
            log_debug!("Confirmation #{} answered: {}", request_id, answer);
            let _ = request.resolve.send(Ok(answer));
        })
    }

    fn settle(&self, request_id: Option<u64>, outcome: Outcome) -> bool {
        self.page.update(|doc| {
            let slot = doc.request_slot(&self.ids.panel);
            let request = match request_id {
                Some(id) => slot.take_if(id),
                None => slot.pending.take(),
            };
            let Some(request) = request else {
                return false;
            };
            close_panel(doc, &self.ids);
            log_debug!("Confirmation #{} settled: {:?}", request.id, outcome);
            let _ = request.resolve.send(outcome);
            true
        })
    }
}

/// Every dialog element must exist and play its role. Checked in lookup
/// order, so the first offending id is the one reported.
fn check_elements(doc: &Document, ids: &ElementIds) -> Result<(), DialogError> {
    let expected = [
        (&ids.panel, ElementKind::Panel),
        (&ids.text, ElementKind::Text),
        (&ids.affirmative, ElementKind::Control),
        (&ids.negative, ElementKind::Control),
    ];
    if let Some((id, _)) = expected.iter().find(|(id, _)| !doc.contains(id)) {
        return Err(DialogError::missing(id));
    }
    for (id, kind) in expected {
        if let Some(found) = doc.kind(id)
            && found != kind
        {
            return Err(DialogError::WrongElementKind {
                id: id.clone(),
                expected: kind,
                found,
            });
        }
    }
    Ok(())
}

/// Hide the panel and drop both answer bindings
fn close_panel(doc: &mut Document, ids: &ElementIds) {
    doc.set_hidden(&ids.panel, true);
    doc.unbind(&ids.affirmative);
    doc.unbind(&ids.negative);
}

/// Show `prompt` on the page's conventional dialog elements with the default
/// policy.
///
/// The request goes into the same slot as any [`ConfirmDialog`] over the
/// conventional panel, so a call made while another request is waiting
/// supersedes it.
pub fn confirm_dialog(page: &Page, prompt: &str) -> Result<Confirmation, DialogError> {
    ConfirmDialog::new(page.clone()).confirm(prompt)
}

/// Pending answer to one confirmation request.
///
/// Await it, or poll it without blocking through [`try_outcome`](Self::try_outcome).
/// Once settled it always reports the same outcome.
#[derive(Debug)]
#[must_use = "a confirmation does nothing unless it is awaited or polled"]
pub struct Confirmation {
    request_id: u64,
    rx: oneshot::Receiver<Outcome>,
    outcome: Option<Outcome>,
}

impl Confirmation {
    fn new(request_id: u64, rx: oneshot::Receiver<Outcome>) -> Self {
        Self {
            request_id,
            rx,
            outcome: None,
        }
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// The outcome if the request has settled, without waiting
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(Err(DialogError::Abandoned)),
            };
        }
        self.outcome.clone()
    }
}

impl Future for Confirmation {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = &this.outcome {
            return Poll::Ready(outcome.clone());
        }
        let outcome =
            ready!(Pin::new(&mut this.rx).poll(cx)).unwrap_or(Err(DialogError::Abandoned));
        this.outcome = Some(outcome.clone());
        Poll::Ready(outcome)
    }
}
