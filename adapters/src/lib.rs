//! Site adapters for Civil.
//!
//! An adapter encapsulates how one host page exposes editable text and what
//! a mutation has to look like before the page's own scripts will honor it.
//! Adapters are stateless strategy objects: the [`AdapterRegistry`] selects
//! exactly one per page load (most specific first, with a catch-all
//! fallback) and it is never replaced afterwards.
//!
//! Two behavioral profiles ship here:
//!
//! - [`DefaultAdapter`] treats standard form fields and generically editable
//!   regions uniformly, writing through the native value setter where one
//!   exists so framework-patched accessors are bypassed, and following every
//!   write with synthetic notifications.
//! - [`WhatsAppAdapter`] targets a messaging surface whose editable region
//!   ignores synthetic value writes; it mutates text through host edit
//!   commands so the application's internal document model stays in sync.
//!
//! Write failures are not errors on this boundary. There is no verification
//! channel, so a missing native setter or an unsupported host command
//! degrades to best-effort direct assignment.

mod registry;
mod whatsapp;

pub use registry::{AdapterRegistry, RegistryError};
pub use whatsapp::WhatsAppAdapter;

use civil_page::{ElementHandle, ElementKind, HostPage, Notice, Point};

/// Vertical gap between the target element and the advisory panel, so the
/// panel sits above the field instead of overlapping it.
pub const ADVISORY_GAP: f32 = 15.0;

/// Capability set a site adapter implements.
///
/// Adapters carry no mutable state; every operation is bound to a target
/// element on the page passed in. Writes must leave the host page's own
/// logic (validation, counters, framework state) consistent with the new
/// text, whatever that takes on the page in question.
pub trait SiteAdapter: Send + Sync {
    /// Stable identifier, used for registry validation and logging.
    fn name(&self) -> &'static str;

    /// Whether this adapter handles the given page URL.
    fn matches(&self, url: &str) -> bool;

    /// Capture scope: which editable surfaces this adapter observes.
    fn captures(&self, kind: ElementKind) -> bool;

    /// Read the element's current text.
    fn read_text(&self, page: &dyn HostPage, element: ElementHandle) -> String;

    /// Replace the element's text, with whatever notification side effects
    /// the page needs to observe the change.
    fn write_text(&self, page: &mut dyn HostPage, element: ElementHandle, text: &str);

    /// Where an advisory panel for this element should be anchored: the
    /// element's rectangle, offset upward by [`ADVISORY_GAP`]. `None` when
    /// the element is detached and has no position.
    fn advisory_anchor(&self, page: &dyn HostPage, element: ElementHandle) -> Option<Point> {
        let rect = page.bounding_rect(element)?;
        Some(Point {
            x: rect.x,
            y: rect.y - ADVISORY_GAP,
        })
    }
}

/// Catch-all adapter for pages without a dedicated profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAdapter;

impl SiteAdapter for DefaultAdapter {
    fn name(&self) -> &'static str {
        "default"
    }

    fn matches(&self, _url: &str) -> bool {
        true
    }

    fn captures(&self, _kind: ElementKind) -> bool {
        true
    }

    fn read_text(&self, page: &dyn HostPage, element: ElementHandle) -> String {
        let text = match page.element_kind(element) {
            Some(kind) if kind.is_form_field() => page.field_value(element),
            Some(_) => page.rendered_text(element),
            None => None,
        };
        text.unwrap_or_default()
    }

    fn write_text(&self, page: &mut dyn HostPage, element: ElementHandle, text: &str) {
        match page.element_kind(element) {
            Some(kind) if kind.is_form_field() => {
                // Frameworks patch the value accessor; a plain assignment is
                // silently ignored by their bindings. Prefer the native
                // setter and fall back to direct assignment without one.
                if !page.write_field_value_native(element, text) {
                    tracing::debug!(element = element.as_raw(), "no native setter, writing direct");
                    page.write_field_value_direct(element, text);
                }
                page.notify(element, Notice::Input);
                page.notify(element, Notice::Change);
            }
            Some(_) => {
                page.focus(element);
                page.write_rendered_text(element, text);
                page.notify(element, Notice::Input);
            }
            // Detached: mutation is a no-op by contract.
            None => {}
        }
    }
}
