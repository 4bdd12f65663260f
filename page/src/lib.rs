//! Host page boundary for Civil.
//!
//! The assistant never touches a real DOM. Everything it needs from the host
//! page goes through the [`HostPage`] trait: element kind and geometry
//! queries, text reads, the three write paths (native setter, direct
//! assignment, rendered text), host edit commands, synthetic notifications,
//! and advisory panel mount/remove. The embedding environment (a browser
//! bridge in production, [`fake::FakePage`] in tests and the demo harness)
//! implements this trait and feeds [`PageEvent`]s into the assistant's
//! channel.
//!
//! Detached elements are not errors anywhere on this boundary: queries on
//! them return `None` and mutations are no-ops. The page owns element
//! lifetime; the core only holds opaque handles.

use civil_types::Tier;

pub mod fake;

// ============================================================================
// Elements
// ============================================================================

/// Opaque handle to an editable surface on the host page.
///
/// Identity, not content: an advisory panel anchors to the element this
/// handle names, and a classifier verdict is applied back to it. The core
/// never assumes the handle is still attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// What kind of editable surface an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Single-line form field.
    TextInput,
    /// Multi-line form field.
    TextArea,
    /// Content-editable region.
    RichText,
}

impl ElementKind {
    /// Form fields carry their text in a value accessor; rich text regions
    /// carry it as rendered content.
    #[must_use]
    pub const fn is_form_field(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// An element's bounding rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn top_left(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

// ============================================================================
// Commands & Notifications
// ============================================================================

/// A text-editing command executed by the host environment against the
/// focused element.
///
/// Some applications ignore synthetic value writes and only keep their
/// internal document model consistent when edits arrive through this path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    SelectAll,
    Delete,
    InsertText(String),
}

/// A synthetic notification dispatched after a write so the host page's own
/// scripts (validation, counters, framework bindings) observe the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Input,
    Change,
}

// ============================================================================
// Advisory Panels
// ============================================================================

/// Handle to a mounted advisory panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// Everything the host needs to render one advisory panel.
///
/// Styling is the host's problem; this only fixes the anchor, the severity
/// tier, the body lines, and which controls exist. A dismiss control is
/// always rendered; the accept-rewrite control only when `offer_rewrite`
/// is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub anchor: Point,
    pub tier: Tier,
    pub lines: Vec<String>,
    pub offer_rewrite: bool,
}

/// The two user actions an advisory panel exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    AcceptRewrite,
    Dismiss,
}

// ============================================================================
// Page Events
// ============================================================================

/// An event bubbling up from the host page into the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// An input-change notification originating at `element`. Captured at
    /// the document level; the adapter's capture scope decides whether it
    /// qualifies.
    Input { element: ElementHandle },
    /// The user activated a control on a mounted advisory panel.
    PanelControl { panel: PanelId, control: Control },
}

// ============================================================================
// The Boundary Trait
// ============================================================================

/// Capability set the host page exposes to the assistant.
///
/// Every operation is infallible by contract: a write that cannot be
/// honored (detached element, missing native setter, unsupported command)
/// degrades or no-ops, it never errors. The only fallible-looking methods
/// return `Option`/`bool` so adapters can pick a fallback path.
pub trait HostPage: Send {
    /// Current page URL, used once at startup for adapter selection.
    fn location(&self) -> String;

    /// The element's kind, or `None` when it is unknown or detached.
    fn element_kind(&self, element: ElementHandle) -> Option<ElementKind>;

    /// Value of a form field.
    fn field_value(&self, element: ElementHandle) -> Option<String>;

    /// Rendered text of an editable region.
    fn rendered_text(&self, element: ElementHandle) -> Option<String>;

    /// Write a form field through the native value setter, bypassing any
    /// accessor the page's framework patched over it. Returns `false` when
    /// no native setter is available; the caller falls back to
    /// [`write_field_value_direct`](Self::write_field_value_direct).
    ///
    /// Does not notify; callers follow up with [`notify`](Self::notify).
    fn write_field_value_native(&mut self, element: ElementHandle, text: &str) -> bool;

    /// Plain property assignment on a form field.
    fn write_field_value_direct(&mut self, element: ElementHandle, text: &str);

    /// Replace the rendered text of an editable region.
    fn write_rendered_text(&mut self, element: ElementHandle, text: &str);

    /// Move focus to the element.
    fn focus(&mut self, element: ElementHandle);

    /// Execute a host edit command against the focused element. Returns
    /// `false` when the host does not support the command; text-mutating
    /// commands raise their own input notifications when they succeed.
    fn exec_edit_command(&mut self, command: &EditCommand) -> bool;

    /// Dispatch a synthetic notification from the element.
    fn notify(&mut self, element: ElementHandle, notice: Notice);

    /// The element's bounding rectangle, or `None` when detached.
    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect>;

    /// Mount an advisory panel and return its handle.
    fn mount_panel(&mut self, spec: PanelSpec) -> PanelId;

    /// Remove a mounted panel. Removing an already-removed panel is a no-op.
    fn remove_panel(&mut self, panel: PanelId);
}
