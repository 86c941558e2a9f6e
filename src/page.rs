//! The page hosting the dialog
//!
//! A small element registry addressed by stable string ids. Elements carry a
//! hidden flag, a text value and at most one click binding. Assigning a
//! binding replaces the previous one, the way an `onclick` property does.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ElementIds;
use crate::dialog::RequestSlot;
use crate::log_debug;

/// Callback run when a control is clicked. It gets exclusive access to the
/// document so it can change other elements.
pub type ClickHandler = Box<dyn FnMut(&mut Document) + Send>;

/// What role an element plays on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Container that can be shown or hidden
    Panel,
    /// Region holding a text message
    Text,
    /// Something the user can click
    Control,
}

struct Element {
    kind: ElementKind,
    hidden: bool,
    text: String,
    binding: Option<ClickHandler>,
    /// Bumped on every bind/unbind so `click` can tell whether the running
    /// handler replaced or removed itself.
    generation: u64,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            hidden: false,
            text: String::new(),
            binding: None,
            generation: 0,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("hidden", &self.hidden)
            .field("text", &self.text)
            .field("bound", &self.binding.is_some())
            .finish_non_exhaustive()
    }
}

/// All elements of a page
#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
    /// Outstanding confirmation requests, keyed by panel id
    requests: HashMap<String, RequestSlot>,
}

impl Document {
    /// Add an element, replacing any element that already used `id`
    pub fn insert(&mut self, id: impl Into<String>, kind: ElementKind) {
        self.elements.insert(id.into(), Element::new(kind));
    }

    /// Remove an element. Removing a panel also drops its request slot, so
    /// any confirmation still waiting on it yields `Abandoned`.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.requests.remove(id).is_some() {
            log_debug!("Dropped request slot of removed panel '{}'", id);
        }
        self.elements.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn kind(&self, id: &str) -> Option<ElementKind> {
        self.elements.get(id).map(|e| e.kind)
    }

    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.elements.get(id).map(|e| e.hidden)
    }

    /// Returns false when the element does not exist
    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }

    /// Set the element's text verbatim. Returns false when the element does not exist.
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Install `handler` as the element's click binding, dropping the old one
    pub fn bind(&mut self, id: &str, handler: ClickHandler) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.binding = Some(handler);
                element.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn unbind(&mut self, id: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.binding = None;
                element.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn has_binding(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.binding.is_some())
    }

    pub(crate) fn request_slot(&mut self, panel: &str) -> &mut RequestSlot {
        self.requests.entry(panel.to_string()).or_default()
    }

    pub(crate) fn request_slot_ref(&self, panel: &str) -> Option<&RequestSlot> {
        self.requests.get(panel)
    }

    /// Run the element's click binding. Returns whether a binding ran.
    ///
    /// A binding that neither replaces nor removes itself stays bound.
    pub fn click(&mut self, id: &str) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            log_debug!("Click on unknown element '{}'", id);
            return false;
        };
        let Some(mut handler) = element.binding.take() else {
            return false;
        };
        let generation = element.generation;

        handler(self);

        if let Some(element) = self.elements.get_mut(id)
            && element.generation == generation
            && element.binding.is_none()
        {
            element.binding = Some(handler);
        }
        true
    }
}

/// Shared handle to a document
#[derive(Debug, Clone, Default)]
pub struct Page {
    document: Arc<Mutex<Document>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the structure a confirmation dialog expects: a hidden panel,
    /// a text region and the two answer controls.
    pub fn with_dialog(ids: &ElementIds) -> Self {
        let page = Self::new();
        page.update(|doc| {
            doc.insert(&ids.panel, ElementKind::Panel);
            doc.set_hidden(&ids.panel, true);
            doc.insert(&ids.text, ElementKind::Text);
            doc.insert(&ids.affirmative, ElementKind::Control);
            doc.insert(&ids.negative, ElementKind::Control);
        });
        page
    }

    /// Run `f` with exclusive access to the document.
    ///
    /// Click bindings run under the same lock, so `f` must not call back into
    /// this page.
    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.document.lock())
    }

    pub fn insert(&self, id: impl Into<String>, kind: ElementKind) {
        self.update(|doc| doc.insert(id, kind));
    }

    pub fn remove(&self, id: &str) -> bool {
        self.update(|doc| doc.remove(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.update(|doc| doc.contains(id))
    }

    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.update(|doc| doc.is_hidden(id))
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.update(|doc| doc.text(id).map(str::to_string))
    }

    pub fn has_binding(&self, id: &str) -> bool {
        self.update(|doc| doc.has_binding(id))
    }

    /// Simulate the user activating a control
    pub fn click(&self, id: &str) -> bool {
        self.update(|doc| doc.click(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_with_dialog_starts_hidden() {
        let ids = ElementIds::default();
        let page = Page::with_dialog(&ids);

        assert_eq!(page.is_hidden(&ids.panel), Some(true));
        assert_eq!(page.text(&ids.text).as_deref(), Some(""));
        assert!(page.contains(&ids.affirmative));
        assert!(page.contains(&ids.negative));
        assert!(!page.has_binding(&ids.affirmative));
    }

    #[test]
    fn test_click_without_binding_is_noop() {
        let page = Page::new();
        page.insert("ok", ElementKind::Control);

        assert!(!page.click("ok"));
        assert!(!page.click("missing"));
    }

    #[test]
    fn test_binding_persists_across_clicks() {
        let page = Page::new();
        page.insert("ok", ElementKind::Control);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        page.update(|doc| {
            doc.bind(
                "ok",
                Box::new(move |_: &mut Document| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
        });

        assert!(page.click("ok"));
        assert!(page.click("ok"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(page.has_binding("ok"));
    }

    #[test]
    fn test_binding_can_unbind_itself() {
        let page = Page::new();
        page.insert("ok", ElementKind::Control);
        page.insert("panel", ElementKind::Panel);
        page.update(|doc| {
            doc.bind(
                "ok",
                Box::new(|doc: &mut Document| {
                    doc.set_hidden("panel", true);
                    doc.unbind("ok");
                }),
            )
        });

        assert!(page.click("ok"));
        assert_eq!(page.is_hidden("panel"), Some(true));
        assert!(!page.has_binding("ok"));
        assert!(!page.click("ok"));
    }

    #[test]
    fn test_rebinding_replaces_previous_handler() {
        let page = Page::new();
        page.insert("ok", ElementKind::Control);
        page.insert("out", ElementKind::Text);
        page.update(|doc| {
            doc.bind("ok", Box::new(|doc: &mut Document| {
                doc.set_text("out", "first");
            }));
            doc.bind("ok", Box::new(|doc: &mut Document| {
                doc.set_text("out", "second");
            }));
        });

        page.click("ok");
        assert_eq!(page.text("out").as_deref(), Some("second"));
    }

    #[test]
    fn test_mutators_report_missing_elements() {
        let page = Page::new();
        page.update(|doc| {
            assert!(!doc.set_hidden("nope", false));
            assert!(!doc.set_text("nope", "x"));
            assert!(!doc.bind("nope", Box::new(|_: &mut Document| {})));
            assert!(!doc.unbind("nope"));
            assert_eq!(doc.kind("nope"), None);
        });
    }
}
