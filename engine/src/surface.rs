//! The advisory surface.
//!
//! At most one advisory panel exists per page at any time. `show` destroys
//! the current panel before mounting its replacement, `remove` is
//! idempotent, and a control can be activated at most once per shown
//! instance - a click that names any other panel (a stale handle from an
//! instance already torn down) is ignored.

use civil_page::{Control, ElementHandle, HostPage, PanelId, PanelSpec, Point};
use civil_types::{Decision, Tier};

/// What a control activation asks the owning loop to do. The panel itself
/// is already gone by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Write the offered rewrite back into the target element.
    AcceptRewrite {
        element: ElementHandle,
        rewrite: String,
    },
    /// Nothing beyond the teardown.
    Dismissed,
}

#[derive(Debug)]
struct Live {
    panel: PanelId,
    element: ElementHandle,
    rewrite: Option<String>,
}

/// Owner of the single advisory panel.
#[derive(Debug, Default)]
pub struct AdvisorySurface {
    live: Option<Live>,
}

impl AdvisorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.live.is_some()
    }

    /// Mount a panel for `decision` anchored at `anchor`, destroying any
    /// panel currently shown first.
    pub fn show(
        &mut self,
        page: &mut dyn HostPage,
        element: ElementHandle,
        anchor: Point,
        decision: &Decision,
        tier: Tier,
    ) {
        self.remove(page);

        let rewrite = decision.offered_rewrite().map(ToOwned::to_owned);
        let spec = PanelSpec {
            anchor,
            tier,
            lines: panel_lines(decision, tier),
            offer_rewrite: rewrite.is_some(),
        };
        let panel = page.mount_panel(spec);
        self.live = Some(Live {
            panel,
            element,
            rewrite,
        });
    }

    /// Destroy the current panel, if any.
    pub fn remove(&mut self, page: &mut dyn HostPage) {
        if let Some(live) = self.live.take() {
            page.remove_panel(live.panel);
        }
    }

    /// Handle a control click. Returns `None` for clicks on anything other
    /// than the currently shown panel; otherwise tears the panel down and
    /// says what to do next.
    pub fn activate(
        &mut self,
        page: &mut dyn HostPage,
        panel: PanelId,
        control: Control,
    ) -> Option<Activation> {
        if self.live.as_ref().is_none_or(|live| live.panel != panel) {
            return None;
        }
        let live = self.live.take()?;
        page.remove_panel(live.panel);

        match control {
            Control::AcceptRewrite => match live.rewrite {
                Some(rewrite) => Some(Activation::AcceptRewrite {
                    element: live.element,
                    rewrite,
                }),
                // No rewrite was offered; treat the click as a dismissal.
                None => Some(Activation::Dismissed),
            },
            Control::Dismiss => Some(Activation::Dismissed),
        }
    }
}

/// Body copy of the panel: the verdict's reason, the scoring metadata when
/// present, what happened to the message, and the quoted suggestion.
fn panel_lines(decision: &Decision, tier: Tier) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);

    if decision.reason.is_empty() {
        lines.push("This message was flagged.".to_owned());
    } else {
        lines.push(decision.reason.clone());
    }

    if let Some(label) = decision.analysis.label.as_deref() {
        let line = match decision.analysis.score {
            Some(score) => format!(
                "{label} (score {score:.2}, severity {:.0})",
                decision.analysis.severity
            ),
            None => format!("{label} (severity {:.0})", decision.analysis.severity),
        };
        lines.push(line);
    }

    if tier != Tier::Advisory {
        lines.push("Message cleared and blocked.".to_owned());
    }

    if let Some(rewrite) = decision.offered_rewrite() {
        lines.push(format!("Suggestion: \"{rewrite}\""));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::{Activation, AdvisorySurface};
    use civil_page::{Control, ElementHandle, ElementKind, PanelId, Point, Rect, fake::FakePage};
    use civil_types::{Decision, Tier};

    fn decision(json: serde_json::Value) -> Decision {
        serde_json::from_value(json).unwrap()
    }

    fn page_with_element() -> (FakePage, ElementHandle) {
        let page = FakePage::default();
        let element = page.add_element(ElementKind::TextInput, Rect::default());
        (page, element)
    }

    fn anchor() -> Point {
        Point { x: 5.0, y: 100.0 }
    }

    #[test]
    fn show_replaces_any_existing_panel() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let alert = decision(serde_json::json!({"action": "alert", "reason": "mild"}));

        surface.show(&mut page, element, anchor(), &alert, Tier::Advisory);
        surface.show(&mut page, element, anchor(), &alert, Tier::Advisory);

        assert_eq!(page.panel_count(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let alert = decision(serde_json::json!({"action": "alert", "reason": "mild"}));

        surface.show(&mut page, element, anchor(), &alert, Tier::Advisory);
        surface.remove(&mut page);
        surface.remove(&mut page);

        assert_eq!(page.panel_count(), 0);
        assert!(!surface.is_shown());
    }

    #[test]
    fn accept_rewrite_yields_the_offered_string_and_tears_down() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let verdict = decision(serde_json::json!({
            "action": "block_and_rewrite",
            "reason": "Contains insult",
            "rewrite": "You are not being helpful",
        }));

        surface.show(
            &mut page,
            element,
            anchor(),
            &verdict,
            Tier::BlockedWithSuggestion,
        );
        let (panel, spec) = page.panels().pop().unwrap();
        assert!(spec.offer_rewrite);

        let activation = surface.activate(&mut page, panel, Control::AcceptRewrite);
        assert_eq!(
            activation,
            Some(Activation::AcceptRewrite {
                element,
                rewrite: "You are not being helpful".to_owned()
            })
        );
        assert_eq!(page.panel_count(), 0);

        // One activation per shown instance.
        assert_eq!(surface.activate(&mut page, panel, Control::Dismiss), None);
    }

    #[test]
    fn stale_panel_clicks_are_ignored() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let alert = decision(serde_json::json!({"action": "alert", "reason": "mild"}));

        surface.show(&mut page, element, anchor(), &alert, Tier::Advisory);
        let stale = PanelId::from_raw(999);

        assert_eq!(surface.activate(&mut page, stale, Control::Dismiss), None);
        assert_eq!(page.panel_count(), 1);
    }

    #[test]
    fn accept_without_an_offer_is_a_dismissal() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let verdict = decision(serde_json::json!({"action": "block_and_alert", "reason": "severe"}));

        surface.show(&mut page, element, anchor(), &verdict, Tier::Blocked);
        let (panel, spec) = page.panels().pop().unwrap();
        assert!(!spec.offer_rewrite);

        let activation = surface.activate(&mut page, panel, Control::AcceptRewrite);
        assert_eq!(activation, Some(Activation::Dismissed));
    }

    #[test]
    fn panel_copy_reflects_the_verdict() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let verdict = decision(serde_json::json!({
            "action": "block_and_rewrite",
            "reason": "Contains insult",
            "rewrite": "Could you rephrase?",
            "analysis": {"severity": 55, "label": "insult", "score": 0.91},
        }));

        surface.show(
            &mut page,
            element,
            anchor(),
            &verdict,
            Tier::BlockedWithSuggestion,
        );

        let (_, spec) = page.panels().pop().unwrap();
        assert_eq!(spec.tier, Tier::BlockedWithSuggestion);
        assert_eq!(
            spec.lines,
            vec![
                "Contains insult".to_owned(),
                "insult (score 0.91, severity 55)".to_owned(),
                "Message cleared and blocked.".to_owned(),
                "Suggestion: \"Could you rephrase?\"".to_owned(),
            ]
        );
    }

    #[test]
    fn panel_copy_without_a_score_omits_it() {
        let (mut page, element) = page_with_element();
        let mut surface = AdvisorySurface::new();
        let verdict = decision(serde_json::json!({
            "action": "alert",
            "reason": "Mild toxicity detected.",
            "analysis": {"severity": 25, "label": "mild"},
        }));

        surface.show(&mut page, element, anchor(), &verdict, Tier::Advisory);

        let (_, spec) = page.panels().pop().unwrap();
        assert_eq!(
            spec.lines,
            vec![
                "Mild toxicity detected.".to_owned(),
                "mild (severity 25)".to_owned(),
            ]
        );
    }
}
