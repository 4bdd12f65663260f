//! The assistant event loop.
//!
//! One cooperative loop owns everything mutable: the page handle, the
//! selected adapter, the debounce timer, the session state machine, and the
//! advisory surface. `tokio::select!` interleaves three sources - page
//! events, the debounce deadline, and completed classifier calls - so
//! "concurrency" here is interleaving on one task, never parallel mutation.
//!
//! Classifier calls are the only suspension points. Each one is spawned off
//! with a clone of the client and completes through an unbounded channel
//! back into this loop; in-flight calls are never cancelled, and a stale
//! response is applied as authoritative when it arrives (last one wins).
//! The advisory surface's destroy-before-show discipline keeps that safe.

use std::sync::Arc;
use std::time::Duration;

use civil_adapters::{AdapterRegistry, SiteAdapter};
use civil_classifier::{ClassifierClient, ClassifyError};
use civil_page::{Control, ElementHandle, HostPage, PageEvent, PanelId};
use civil_types::{Decision, Tier};
use tokio::sync::mpsc;

use crate::debounce::Debouncer;
use crate::session::{CaptureStep, Session, VerdictStep};
use crate::surface::{Activation, AdvisorySurface};

#[derive(Debug)]
struct Verdict {
    element: ElementHandle,
    result: Result<Decision, ClassifyError>,
}

/// The in-page moderation assistant, bound to one page for its lifetime.
pub struct Assistant<P: HostPage> {
    page: P,
    adapter: Arc<dyn SiteAdapter>,
    classifier: Arc<ClassifierClient>,
    events: mpsc::UnboundedReceiver<PageEvent>,
    debouncer: Debouncer,
    session: Session,
    surface: AdvisorySurface,
    verdicts_tx: mpsc::UnboundedSender<Verdict>,
    verdicts_rx: mpsc::UnboundedReceiver<Verdict>,
}

impl<P: HostPage> Assistant<P> {
    /// Bind to a page: the adapter is selected once from the page's current
    /// location and never replaced.
    pub fn new(
        page: P,
        registry: &AdapterRegistry,
        classifier: ClassifierClient,
        events: mpsc::UnboundedReceiver<PageEvent>,
    ) -> Self {
        let adapter = registry.select(&page.location());
        let (verdicts_tx, verdicts_rx) = mpsc::unbounded_channel();
        Self {
            page,
            adapter,
            classifier: Arc::new(classifier),
            events,
            debouncer: Debouncer::default(),
            session: Session::new(),
            surface: AdvisorySurface::new(),
            verdicts_tx,
            verdicts_rx,
        }
    }

    /// Override the debounce quiet period (tests, harnesses).
    #[must_use]
    pub fn with_quiet_period(mut self, quiet: Duration) -> Self {
        self.debouncer = Debouncer::new(quiet);
        self
    }

    #[must_use]
    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Run until the page event stream closes.
    pub async fn run(mut self) -> P {
        loop {
            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.handle_page_event(event),
                        None => break,
                    }
                }
                () = self.debouncer.quiet_elapsed(), if self.debouncer.is_armed() => {
                    if let Some(element) = self.debouncer.take() {
                        self.capture(element);
                    }
                }
                Some(verdict) = self.verdicts_rx.recv() => {
                    self.apply_verdict(verdict);
                }
            }
        }
        self.page
    }

    fn handle_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Input { element } => {
                let qualifies = self
                    .page
                    .element_kind(element)
                    .is_some_and(|kind| self.adapter.captures(kind));
                if qualifies {
                    self.debouncer.record(element);
                }
            }
            PageEvent::PanelControl { panel, control } => self.handle_control(panel, control),
        }
    }

    fn handle_control(&mut self, panel: PanelId, control: Control) {
        match self.surface.activate(&mut self.page, panel, control) {
            Some(Activation::AcceptRewrite { element, rewrite }) => {
                tracing::debug!(element = element.as_raw(), "rewrite accepted");
                self.adapter.write_text(&mut self.page, element, &rewrite);
            }
            Some(Activation::Dismissed) => {
                tracing::debug!("advisory dismissed");
            }
            None => {}
        }
    }

    /// A debounced capture came due: read the element's text and let the
    /// session decide what it means.
    fn capture(&mut self, element: ElementHandle) {
        let text = self.adapter.read_text(&self.page, element);
        match self.session.on_capture(&text) {
            CaptureStep::Swallow => {
                tracing::debug!(element = element.as_raw(), "self-induced clear swallowed");
            }
            CaptureStep::DropAdvisory => self.surface.remove(&mut self.page),
            CaptureStep::Unchanged => {}
            CaptureStep::Analyze => {
                tracing::debug!(
                    element = element.as_raw(),
                    chars = text.chars().count(),
                    "analyzing"
                );
                let classifier = Arc::clone(&self.classifier);
                let verdicts = self.verdicts_tx.clone();
                tokio::spawn(async move {
                    let result = classifier.analyze(&text).await;
                    let _ = verdicts.send(Verdict { element, result });
                });
            }
        }
    }

    fn apply_verdict(&mut self, verdict: Verdict) {
        let Verdict { element, result } = verdict;
        let decision = match result {
            Ok(decision) => decision,
            Err(error) => {
                self.session.on_failure();
                tracing::warn!(%error, "classification failed; no advisory for this burst");
                return;
            }
        };

        match self.session.on_verdict(decision.action) {
            VerdictStep::DropAdvisory => self.surface.remove(&mut self.page),
            VerdictStep::Advise(tier) => self.present(element, &decision, tier),
            VerdictStep::ForceClearAndAdvise(tier) => {
                self.adapter.write_text(&mut self.page, element, "");
                self.present(element, &decision, tier);
            }
        }
    }

    fn present(&mut self, element: ElementHandle, decision: &Decision, tier: Tier) {
        match self.adapter.advisory_anchor(&self.page, element) {
            Some(anchor) => {
                self.surface
                    .show(&mut self.page, element, anchor, decision, tier);
            }
            None => {
                // Detached target: nothing to anchor to, but a stale
                // advisory still comes down.
                tracing::debug!(element = element.as_raw(), "target detached, advisory skipped");
                self.surface.remove(&mut self.page);
            }
        }
    }
}
