// Monitor service - opens sources for the selected mode and supervises the render loop
use crate::application::render_trigger::{RenderTrigger, Renderer, RunExit, TriggerState};
use crate::application::sample_source::SourceFactory;
use crate::application::session_store::SessionStore;
use crate::domain::controls::{Controls, SourceKey};
use std::sync::Arc;
use tokio::sync::watch;

pub struct MonitorService<R> {
    sessions: Arc<dyn SessionStore>,
    sources: Arc<dyn SourceFactory>,
    trigger: RenderTrigger<R>,
    controls: watch::Receiver<Controls>,
}

impl<R: Renderer> MonitorService<R> {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        sources: Arc<dyn SourceFactory>,
        renderer: R,
        controls: watch::Receiver<Controls>,
    ) -> Self {
        let max_points = controls.borrow().max_points();
        Self {
            sessions,
            sources,
            trigger: RenderTrigger::new(renderer, max_points),
            controls,
        }
    }

    /// Runs until the controls sender goes away. A source that ends or fails
    /// is not reopened until the user reselects it or asks to reconnect.
    pub async fn run(mut self) -> TriggerState {
        loop {
            let loaded = self.sessions.load_session().await;

            // Controls may have moved on while the document was loading
            let controls = self.controls.borrow_and_update().clone();
            let key = controls.source_key();

            match loaded {
                Ok(session) => {
                    tracing::info!(
                        mode = ?controls.mode,
                        plants = session.plants().len(),
                        sensors = session.sensors().len(),
                        refresh_secs = controls.refresh_interval_secs(),
                        max_points = controls.max_points(),
                        "opening sample source"
                    );
                    let source = self
                        .sources
                        .open(controls.mode, &controls.stream_url, &session);
                    self.trigger.reset(session);

                    match self.trigger.run(source, &key, &mut self.controls).await {
                        RunExit::Reopen => continue,
                        RunExit::Finished(state) => {
                            tracing::info!(?state, "render loop halted, waiting for source reselection");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to load greenhouse configuration");
                    self.trigger.fail(format!("{:#}", e));
                }
            }

            if !wait_for_reselection(&mut self.controls, &key).await {
                tracing::debug!("controls closed, stopping monitor");
                return self.trigger.state().clone();
            }
        }
    }
}

/// True once a different source is selected, false when the controls are gone
async fn wait_for_reselection(controls: &mut watch::Receiver<Controls>, key: &SourceKey) -> bool {
    loop {
        if controls.borrow_and_update().source_key() != *key {
            return true;
        }
        if controls.changed().await.is_err() {
            return false;
        }
    }
}
