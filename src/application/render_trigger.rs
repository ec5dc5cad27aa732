// Render trigger - the tick loop feeding windows to the renderer
use crate::application::router::SampleRouter;
use crate::application::sample_source::{SampleBatch, SampleStream};
use crate::application::window_store::WindowStore;
use crate::domain::controls::{Controls, SourceKey};
use crate::domain::sample::Sample;
use crate::domain::session::Session;
use futures::StreamExt;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::watch;
use tokio::time::Instant;

/// Rendering collaborator
pub trait Renderer: Send {
    /// Draw the window of `plant`, oldest sample first
    fn render(&mut self, plant: &str, window: &VecDeque<Sample>);

    /// Surface a lifecycle change to the UI
    fn report(&mut self, state: &TriggerState);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum TriggerState {
    Idle,
    Streaming,
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit {
    /// The source ended or failed; holds `Ended` or `Error`
    Finished(TriggerState),
    /// The user picked another source or asked to reconnect
    Reopen,
}

pub struct RenderTrigger<R> {
    session: Session,
    store: WindowStore,
    renderer: R,
    state: TriggerState,
}

impl<R: Renderer> RenderTrigger<R> {
    pub fn new(renderer: R, max_points: usize) -> Self {
        Self {
            session: Session::default(),
            store: WindowStore::new(max_points),
            renderer,
            state: TriggerState::Idle,
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    #[cfg(test)]
    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Start over with a freshly loaded session; windows of removed plants are dropped
    pub fn reset(&mut self, session: Session) {
        self.store.retain_plants(session.plants());
        self.session = session;
        self.transition(TriggerState::Idle);
    }

    /// Record a failure that happened before the source could be pulled
    pub fn fail(&mut self, message: String) {
        self.transition(TriggerState::Error(message));
    }

    /// Route and buffer one batch. Returns true when the selected plant was redrawn.
    pub fn tick(&mut self, batch: SampleBatch, controls: &Controls) -> bool {
        self.store.set_max_points(controls.max_points());

        let router = SampleRouter::new(&self.session);
        let selected = self
            .session
            .resolve_selection(controls.selected_plant.as_deref());

        let mut selected_touched = false;
        for raw in batch {
            match router.route(raw) {
                Some((plant, sample)) => {
                    selected_touched |= selected == Some(plant.as_str());
                    self.store.append(&plant, sample);
                }
                None => tracing::debug!("discarding sample without a known plant"),
            }
        }

        if !selected_touched {
            return false;
        }

        match selected.and_then(|plant| self.store.window(plant).map(|w| (plant, w))) {
            Some((plant, window)) => {
                self.renderer.render(plant, window);
                true
            }
            None => false,
        }
    }

    /// Drive `source`, opened for `key`, until it ends, fails, or the controls
    /// name a different source
    pub async fn run(
        &mut self,
        mut source: SampleStream,
        key: &SourceKey,
        controls: &mut watch::Receiver<Controls>,
    ) -> RunExit {
        self.transition(TriggerState::Streaming);

        loop {
            let tick_start = Instant::now();

            let pulled = tokio::select! {
                item = source.next() => Some(item),
                _ = reopen_requested(controls, key) => None,
            };

            let batch = match pulled {
                None => return self.reopen(),
                Some(None) => {
                    tracing::info!("sample source exhausted");
                    self.transition(TriggerState::Ended);
                    return RunExit::Finished(TriggerState::Ended);
                }
                Some(Some(Err(e))) => {
                    tracing::warn!(error = %e, "sample source failed");
                    let state = TriggerState::Error(e.to_string());
                    self.transition(state.clone());
                    return RunExit::Finished(state);
                }
                Some(Some(Ok(batch))) => batch,
            };

            let current = controls.borrow().clone();
            self.tick(batch, &current);

            let deadline = tick_start + current.refresh_interval();
            let reopen = tokio::select! {
                _ = tokio::time::sleep_until(deadline) => false,
                _ = reopen_requested(controls, key) => true,
            };
            if reopen {
                return self.reopen();
            }
        }
    }

    fn reopen(&mut self) -> RunExit {
        tracing::info!("source selection changed, closing current source");
        self.transition(TriggerState::Idle);
        RunExit::Reopen
    }

    fn transition(&mut self, next: TriggerState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "render trigger state change");
            self.state = next;
            self.renderer.report(&self.state);
        }
    }
}

/// Resolves once the controls name a different source than `key`.
/// Never resolves after the controls sender is gone.
pub async fn reopen_requested(controls: &mut watch::Receiver<Controls>, key: &SourceKey) {
    loop {
        if controls.borrow_and_update().source_key() != *key {
            return;
        }
        if controls.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
