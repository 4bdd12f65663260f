//! In-memory host page for tests and the demo harness.
//!
//! [`FakePage`] is a cloneable handle to shared page state: every clone sees
//! the same elements, panels, and recorded traffic, so a test can hold one
//! clone while the assistant owns another. It reproduces the two host
//! behaviors the core's state machine depends on:
//!
//! - synthetic `Input` notifications loop back into the page event stream,
//!   the way a dispatched event bubbles back to a document-level listener
//!   (this is what makes the force-clear suppression flag observable), and
//! - text-mutating edit commands raise their own input notifications, the
//!   way host `insertText`/`delete` commands do.
//!
//! Knobs exist for the degraded paths: a page without native setters and a
//! page that rejects edit commands.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::{
    Control, EditCommand, ElementHandle, ElementKind, HostPage, Notice, PageEvent, PanelId,
    PanelSpec, Rect,
};

#[derive(Debug)]
struct FakeElement {
    kind: ElementKind,
    text: String,
    rect: Rect,
    attached: bool,
}

#[derive(Debug, Default)]
struct Inner {
    location: String,
    next_element: u64,
    elements: HashMap<ElementHandle, FakeElement>,
    focused: Option<ElementHandle>,
    selection: Option<ElementHandle>,
    panels: BTreeMap<PanelId, PanelSpec>,
    next_panel: u64,
    notices: Vec<(ElementHandle, Notice)>,
    native_setters: bool,
    edit_commands: bool,
    events: Option<mpsc::UnboundedSender<PageEvent>>,
}

/// Shared-state page double. See the module docs.
#[derive(Debug, Clone)]
pub struct FakePage {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new("https://example.com/")
    }
}

impl FakePage {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                location: location.into(),
                native_setters: true,
                edit_commands: true,
                ..Inner::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake page state poisoned")
    }

    /// Open the page event stream. The returned receiver observes looped-back
    /// synthetic notifications as well as events injected by the test
    /// ([`type_text`](Self::type_text), [`click`](Self::click)).
    pub fn events(&self) -> mpsc::UnboundedReceiver<PageEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().events = Some(tx);
        rx
    }

    fn emit(inner: &Inner, event: PageEvent) {
        if let Some(tx) = &inner.events {
            let _ = tx.send(event);
        }
    }

    // ------------------------------------------------------------------
    // Page construction knobs
    // ------------------------------------------------------------------

    pub fn add_element(&self, kind: ElementKind, rect: Rect) -> ElementHandle {
        let mut inner = self.lock();
        let handle = ElementHandle::from_raw(inner.next_element);
        inner.next_element += 1;
        inner.elements.insert(
            handle,
            FakeElement {
                kind,
                text: String::new(),
                rect,
                attached: true,
            },
        );
        handle
    }

    /// Remove the element from the document. The handle stays known to the
    /// test but every boundary operation on it becomes a no-op.
    pub fn detach(&self, element: ElementHandle) {
        if let Some(el) = self.lock().elements.get_mut(&element) {
            el.attached = false;
        }
    }

    /// A page whose frameworks patched the value accessors away.
    pub fn without_native_setters(self) -> Self {
        self.lock().native_setters = false;
        self
    }

    /// A page that rejects host edit commands.
    pub fn without_edit_commands(self) -> Self {
        self.lock().edit_commands = false;
        self
    }

    // ------------------------------------------------------------------
    // User simulation
    // ------------------------------------------------------------------

    /// Simulate the user typing: replaces the element's text and raises the
    /// bubbling input notification the document listener would see.
    pub fn type_text(&self, element: ElementHandle, text: impl Into<String>) {
        let mut inner = self.lock();
        if let Some(el) = inner.elements.get_mut(&element)
            && el.attached
        {
            el.text = text.into();
            Self::emit(&inner, PageEvent::Input { element });
        }
    }

    /// Simulate a click on one of a panel's controls.
    pub fn click(&self, panel: PanelId, control: Control) {
        let inner = self.lock();
        Self::emit(&inner, PageEvent::PanelControl { panel, control });
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn text_of(&self, element: ElementHandle) -> String {
        self.lock()
            .elements
            .get(&element)
            .map(|el| el.text.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn focused(&self) -> Option<ElementHandle> {
        self.lock().focused
    }

    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.lock().panels.len()
    }

    #[must_use]
    pub fn panels(&self) -> Vec<(PanelId, PanelSpec)> {
        self.lock()
            .panels
            .iter()
            .map(|(id, spec)| (*id, spec.clone()))
            .collect()
    }

    /// Drain the recorded synthetic notifications.
    pub fn take_notices(&self) -> Vec<(ElementHandle, Notice)> {
        std::mem::take(&mut self.lock().notices)
    }
}

impl HostPage for FakePage {
    fn location(&self) -> String {
        self.lock().location.clone()
    }

    fn element_kind(&self, element: ElementHandle) -> Option<ElementKind> {
        let inner = self.lock();
        let el = inner.elements.get(&element)?;
        el.attached.then_some(el.kind)
    }

    fn field_value(&self, element: ElementHandle) -> Option<String> {
        let inner = self.lock();
        let el = inner.elements.get(&element)?;
        (el.attached && el.kind.is_form_field()).then(|| el.text.clone())
    }

    fn rendered_text(&self, element: ElementHandle) -> Option<String> {
        let inner = self.lock();
        let el = inner.elements.get(&element)?;
        el.attached.then(|| el.text.clone())
    }

    fn write_field_value_native(&mut self, element: ElementHandle, text: &str) -> bool {
        let mut inner = self.lock();
        if !inner.native_setters {
            return false;
        }
        match inner.elements.get_mut(&element) {
            Some(el) if el.attached => {
                el.text = text.to_owned();
                true
            }
            // Detached: the write is a no-op, but the setter "existed".
            _ => true,
        }
    }

    fn write_field_value_direct(&mut self, element: ElementHandle, text: &str) {
        let mut inner = self.lock();
        if let Some(el) = inner.elements.get_mut(&element)
            && el.attached
        {
            el.text = text.to_owned();
        }
    }

    fn write_rendered_text(&mut self, element: ElementHandle, text: &str) {
        let mut inner = self.lock();
        if let Some(el) = inner.elements.get_mut(&element)
            && el.attached
        {
            el.text = text.to_owned();
        }
    }

    fn focus(&mut self, element: ElementHandle) {
        let mut inner = self.lock();
        if inner.elements.get(&element).is_some_and(|el| el.attached) {
            inner.focused = Some(element);
        }
    }

    fn exec_edit_command(&mut self, command: &EditCommand) -> bool {
        let mut inner = self.lock();
        if !inner.edit_commands {
            return false;
        }
        let Some(focused) = inner.focused else {
            return false;
        };
        if !inner
            .elements
            .get(&focused)
            .is_some_and(|el| el.attached)
        {
            return false;
        }
        match command {
            EditCommand::SelectAll => {
                inner.selection = Some(focused);
            }
            EditCommand::Delete => {
                if inner.selection.take() == Some(focused)
                    && let Some(el) = inner.elements.get_mut(&focused)
                {
                    el.text.clear();
                }
                inner.notices.push((focused, Notice::Input));
                Self::emit(&inner, PageEvent::Input { element: focused });
            }
            EditCommand::InsertText(text) => {
                let replace_all = inner.selection.take() == Some(focused);
                if let Some(el) = inner.elements.get_mut(&focused) {
                    if replace_all {
                        el.text = text.clone();
                    } else {
                        el.text.push_str(text);
                    }
                }
                inner.notices.push((focused, Notice::Input));
                Self::emit(&inner, PageEvent::Input { element: focused });
            }
        }
        true
    }

    fn notify(&mut self, element: ElementHandle, notice: Notice) {
        let mut inner = self.lock();
        if !inner.elements.get(&element).is_some_and(|el| el.attached) {
            return;
        }
        inner.notices.push((element, notice));
        // Only input notifications bubble back to the document listener.
        if notice == Notice::Input {
            Self::emit(&inner, PageEvent::Input { element });
        }
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect> {
        let inner = self.lock();
        let el = inner.elements.get(&element)?;
        el.attached.then_some(el.rect)
    }

    fn mount_panel(&mut self, spec: PanelSpec) -> PanelId {
        let mut inner = self.lock();
        let id = PanelId::from_raw(inner.next_panel);
        inner.next_panel += 1;
        inner.panels.insert(id, spec);
        id
    }

    fn remove_panel(&mut self, panel: PanelId) {
        self.lock().panels.remove(&panel);
    }
}
