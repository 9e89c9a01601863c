use shared::domain::{RequestConfig, ViewState};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::fetcher::{Fetcher, HttpFetcher, Outcome};

/// Applies one fetch outcome to the current view state.
///
/// Terminal states never change. A transport failure leaves `Loading` as is,
/// so the view keeps showing the placeholder and the failure only exists in
/// the log.
pub fn transition(current: &ViewState, outcome: Outcome) -> ViewState {
    match (current, outcome) {
        (ViewState::Loading, Outcome::Ok(picture)) => ViewState::Loaded {
            media_url: picture.url,
            title: picture.title,
            explanation: picture.explanation,
        },
        (ViewState::Loading, Outcome::ApiFailure(err)) => ViewState::Error {
            message: err.message,
        },
        (ViewState::Loading, Outcome::TransportFailure(_)) => ViewState::Loading,
        (terminal, _) => terminal.clone(),
    }
}

/// Owns the view state and drives the single fetch for one activation.
pub struct StateController<F: Fetcher> {
    config: RequestConfig,
    fetcher: F,
    state: watch::Sender<ViewState>,
    activated: bool,
}

impl StateController<HttpFetcher> {
    pub fn http(config: RequestConfig) -> Self {
        Self::new(config, HttpFetcher::new())
    }
}

impl<F: Fetcher> StateController<F> {
    pub fn new(config: RequestConfig, fetcher: F) -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        Self {
            config,
            fetcher,
            state,
            activated: false,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Runs the fetch and applies its outcome. Only the first call does any
    /// work; later calls return the current state without a request.
    pub async fn activate(&mut self) -> ViewState {
        if self.activated {
            let current = self.state();
            warn!(state = current.name(), "view already activated; ignoring");
            return current;
        }
        self.activated = true;

        let outcome = self.fetcher.fetch(&self.config).await;
        let outcome_kind = outcome.kind();
        let current = self.state();
        let next = transition(&current, outcome);

        if next == current {
            warn!(
                outcome = outcome_kind,
                state = current.name(),
                "fetch outcome left view state unchanged"
            );
            return current;
        }

        info!(
            outcome = outcome_kind,
            from = current.name(),
            to = next.name(),
            "view state transition"
        );
        self.state.send_replace(next.clone());
        next
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
