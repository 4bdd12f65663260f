//! The analysis session state machine.
//!
//! [`Session`] is the only mutable state in the core, consolidated into one
//! value and kept free of DOM and network concerns: `on_capture` /
//! `on_verdict` / `on_failure` return directives and the owning loop carries
//! them out. That split is what makes the transition table testable in
//! isolation.
//!
//! The awkward piece of state is `suppress_next_empty_clear`. Force-clearing
//! a field after a blocking verdict raises a fresh input notification
//! (writes must notify the host page), which comes back through debounced
//! capture looking exactly like "the user emptied the field" — and would
//! tear down the advisory that the block just rendered. The flag marks the
//! next empty capture as self-induced and is consumed exactly once per
//! force-clear; a second consecutive clear is treated as the user's.

use civil_types::{Action, Tier};

/// Externally observable phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

/// What a debounced capture requires of the owning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    /// Self-induced clear; consume it and do nothing else.
    Swallow,
    /// The user emptied the field; tear down any advisory.
    DropAdvisory,
    /// Same text as the last issued request; no new request.
    Unchanged,
    /// New text; issue a classifier request.
    Analyze,
}

/// What a completed verdict requires of the owning loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStep {
    /// Allowed; tear down any advisory.
    DropAdvisory,
    /// Render an advisory of the given tier; the text stays.
    Advise(Tier),
    /// Force-clear the field through the adapter, then render a blocking
    /// advisory of the given tier. The suppression flag is already set.
    ForceClearAndAdvise(Tier),
}

#[derive(Debug, Default)]
pub struct Session {
    last_analysed: String,
    suppress_next_empty_clear: bool,
    in_flight: usize,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `AwaitingResponse` while any classifier request is outstanding. A
    /// hung request keeps the session here indefinitely; that only
    /// suppresses re-analysis of unchanged text, never of new text.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.in_flight > 0 {
            Phase::AwaitingResponse
        } else {
            Phase::Idle
        }
    }

    /// Feed one debounced capture of the target's current text.
    pub fn on_capture(&mut self, text: &str) -> CaptureStep {
        if text.trim().is_empty() {
            if self.suppress_next_empty_clear {
                self.suppress_next_empty_clear = false;
                self.last_analysed.clear();
                return CaptureStep::Swallow;
            }
            return CaptureStep::DropAdvisory;
        }

        if text == self.last_analysed {
            return CaptureStep::Unchanged;
        }

        self.last_analysed.clear();
        self.last_analysed.push_str(text);
        self.in_flight += 1;
        CaptureStep::Analyze
    }

    /// Feed one completed verdict. Stale responses are authoritative at
    /// arrival time; the caller applies whatever this returns, last one
    /// wins.
    pub fn on_verdict(&mut self, action: Action) -> VerdictStep {
        self.in_flight = self.in_flight.saturating_sub(1);
        match action.tier() {
            None => VerdictStep::DropAdvisory,
            Some(tier) if action.blocks() => {
                // Set before the force-clear happens so the notification it
                // raises is already marked self-induced.
                self.suppress_next_empty_clear = true;
                VerdictStep::ForceClearAndAdvise(tier)
            }
            Some(tier) => VerdictStep::Advise(tier),
        }
    }

    /// Feed one failed request. No advisory, no mutation; the failed text
    /// stays recorded so it is not re-sent until it changes.
    pub fn on_failure(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureStep, Phase, Session, VerdictStep};
    use civil_types::{Action, Tier};

    #[test]
    fn empty_capture_with_no_history_drops_advisory() {
        let mut session = Session::new();
        assert_eq!(session.on_capture(""), CaptureStep::DropAdvisory);
        assert_eq!(session.on_capture("   "), CaptureStep::DropAdvisory);
    }

    #[test]
    fn new_text_is_analysed_and_repeats_are_not() {
        let mut session = Session::new();
        assert_eq!(session.on_capture("hello"), CaptureStep::Analyze);
        assert_eq!(session.on_capture("hello"), CaptureStep::Unchanged);
        assert_eq!(session.on_capture("hello there"), CaptureStep::Analyze);
    }

    #[test]
    fn phase_tracks_outstanding_requests() {
        let mut session = Session::new();
        assert_eq!(session.phase(), Phase::Idle);

        session.on_capture("first");
        assert_eq!(session.phase(), Phase::AwaitingResponse);

        // A second distinct capture while awaiting is not locked out.
        assert_eq!(session.on_capture("second"), CaptureStep::Analyze);
        assert_eq!(session.phase(), Phase::AwaitingResponse);

        session.on_verdict(Action::Allow);
        assert_eq!(session.phase(), Phase::AwaitingResponse);
        session.on_verdict(Action::Allow);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn allow_drops_advisory() {
        let mut session = Session::new();
        session.on_capture("fine text");
        assert_eq!(session.on_verdict(Action::Allow), VerdictStep::DropAdvisory);
    }

    #[test]
    fn alert_advises_without_clearing() {
        let mut session = Session::new();
        session.on_capture("mildly rude");
        assert_eq!(
            session.on_verdict(Action::Alert),
            VerdictStep::Advise(Tier::Advisory)
        );
        // No suppression armed: the next empty capture is the user's.
        assert_eq!(session.on_capture(""), CaptureStep::DropAdvisory);
    }

    #[test]
    fn block_arms_suppression_consumed_exactly_once() {
        let mut session = Session::new();
        session.on_capture("you are stupid");
        assert_eq!(
            session.on_verdict(Action::BlockAndRewrite),
            VerdictStep::ForceClearAndAdvise(Tier::BlockedWithSuggestion)
        );

        // The self-induced clear is swallowed and resets the analysed text.
        assert_eq!(session.on_capture(""), CaptureStep::Swallow);
        // A second consecutive clear is user-initiated.
        assert_eq!(session.on_capture(""), CaptureStep::DropAdvisory);
    }

    #[test]
    fn swallowed_clear_resets_last_analysed() {
        let mut session = Session::new();
        session.on_capture("you are stupid");
        session.on_verdict(Action::BlockAndAlert);
        session.on_capture("");

        // Re-typing the blocked text analyses again.
        assert_eq!(session.on_capture("you are stupid"), CaptureStep::Analyze);
    }

    #[test]
    fn user_clear_does_not_reset_last_analysed() {
        let mut session = Session::new();
        session.on_capture("hello");
        session.on_verdict(Action::Allow);

        assert_eq!(session.on_capture(""), CaptureStep::DropAdvisory);
        // Unchanged text after a manual clear is still a repeat.
        assert_eq!(session.on_capture("hello"), CaptureStep::Unchanged);
    }

    #[test]
    fn failure_returns_to_idle_without_forgetting_text() {
        let mut session = Session::new();
        session.on_capture("hello");
        session.on_failure();

        assert_eq!(session.phase(), Phase::Idle);
        // The failed text is not re-sent until it changes.
        assert_eq!(session.on_capture("hello"), CaptureStep::Unchanged);
        assert_eq!(session.on_capture("hello again"), CaptureStep::Analyze);
    }

    #[test]
    fn last_arriving_verdict_wins() {
        let mut session = Session::new();
        session.on_capture("first");
        session.on_capture("second");

        assert_eq!(session.on_verdict(Action::Allow), VerdictStep::DropAdvisory);
        assert_eq!(
            session.on_verdict(Action::BlockAndAlert),
            VerdictStep::ForceClearAndAdvise(Tier::Blocked)
        );
        assert_eq!(session.phase(), Phase::Idle);
    }
}
