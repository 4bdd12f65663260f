//! Adapter for the WhatsApp web client.
//!
//! The composer there is a content-editable region backed by an internal
//! document model; synthetic value writes update the DOM but leave that
//! model stale, so the message that actually gets sent would not match what
//! is on screen. Mutations have to go through the host's text-editing
//! commands instead.

use civil_page::{EditCommand, ElementHandle, ElementKind, HostPage, Notice};

use crate::SiteAdapter;

#[derive(Debug, Default, Clone, Copy)]
pub struct WhatsAppAdapter;

impl SiteAdapter for WhatsAppAdapter {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    fn matches(&self, url: &str) -> bool {
        url.contains("web.whatsapp.com") || url.contains("whatsapp.com")
    }

    /// The observed flow has no plain form fields; only the content-editable
    /// composer is worth watching.
    fn captures(&self, kind: ElementKind) -> bool {
        kind == ElementKind::RichText
    }

    fn read_text(&self, page: &dyn HostPage, element: ElementHandle) -> String {
        page.rendered_text(element).unwrap_or_default()
    }

    fn write_text(&self, page: &mut dyn HostPage, element: ElementHandle, text: &str) {
        page.focus(element);

        let command = if text.is_empty() {
            EditCommand::Delete
        } else {
            EditCommand::InsertText(text.to_owned())
        };

        if page.exec_edit_command(&EditCommand::SelectAll) && page.exec_edit_command(&command) {
            // Successful edit commands raise their own input notifications.
            return;
        }

        // No verification channel exists; degrade to a direct write rather
        // than fail. The internal document model may lag the DOM here.
        tracing::debug!(element = element.as_raw(), "edit commands unsupported, writing direct");
        page.write_rendered_text(element, text);
        page.notify(element, Notice::Input);
    }
}

#[cfg(test)]
mod tests {
    use super::WhatsAppAdapter;
    use crate::SiteAdapter;
    use civil_page::{ElementKind, HostPage, Notice, Rect, fake::FakePage};

    fn rect() -> Rect {
        Rect {
            x: 0.0,
            y: 900.0,
            width: 800.0,
            height: 48.0,
        }
    }

    #[test]
    fn matches_whatsapp_hosts_only() {
        let adapter = WhatsAppAdapter;
        assert!(adapter.matches("https://web.whatsapp.com/"));
        assert!(adapter.matches("https://whatsapp.com/download"));
        assert!(!adapter.matches("https://example.com/chat"));
    }

    #[test]
    fn captures_rich_text_regions_only() {
        let adapter = WhatsAppAdapter;
        assert!(adapter.captures(ElementKind::RichText));
        assert!(!adapter.captures(ElementKind::TextInput));
        assert!(!adapter.captures(ElementKind::TextArea));
    }

    #[test]
    fn write_goes_through_edit_commands() {
        let mut page = FakePage::new("https://web.whatsapp.com/");
        let composer = page.add_element(ElementKind::RichText, rect());
        page.type_text(composer, "rude");

        WhatsAppAdapter.write_text(&mut page, composer, "polite");

        assert_eq!(page.text_of(composer), "polite");
        assert_eq!(page.focused(), Some(composer));
        // The command path raised the notification itself.
        assert_eq!(page.take_notices(), vec![(composer, Notice::Input)]);
    }

    #[test]
    fn empty_write_selects_all_and_deletes() {
        let mut page = FakePage::new("https://web.whatsapp.com/");
        let composer = page.add_element(ElementKind::RichText, rect());
        page.type_text(composer, "about to be blocked");

        WhatsAppAdapter.write_text(&mut page, composer, "");

        assert_eq!(page.text_of(composer), "");
    }

    #[test]
    fn unsupported_commands_degrade_to_direct_write() {
        let mut page = FakePage::new("https://web.whatsapp.com/").without_edit_commands();
        let composer = page.add_element(ElementKind::RichText, rect());
        page.type_text(composer, "rude");

        WhatsAppAdapter.write_text(&mut page, composer, "polite");

        assert_eq!(page.text_of(composer), "polite");
        assert_eq!(page.take_notices(), vec![(composer, Notice::Input)]);
    }
}
