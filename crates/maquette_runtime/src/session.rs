//! # Viewer Session
//!
//! Glue for the viewing mode: load the settings (with default
//! fallback), load the named scene record, run the import pipeline to a
//! terminal state. The caller constructs and owns every collaborator;
//! nothing here is globally reachable.
//!
//! The session's event pump is the one place that blocks: it sits on
//! the completion channel and feeds events to the pipeline until the
//! run ends. Pipeline methods themselves never block.

use std::path::Path;

use crossbeam_channel::Receiver;
use thiserror::Error;

use maquette_shared::SettingsRecord;
use maquette_store::{SceneStore, SettingsStore, StoreError};

use crate::pipeline::{
    CompletionSignal, ImportPipeline, PipelineError, PipelineEvent, PipelineState,
};
use crate::sink::{ColliderBuilder, SceneSink, SinkTargets};
use crate::source::AssetSource;

/// Errors that end a viewing session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The scene record could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The reconstruction run halted.
    #[error("scene reconstruction failed: {0}")]
    Pipeline(PipelineError),

    /// The asset source dropped its event channel mid-run.
    #[error("asset source disconnected mid-run")]
    Disconnected,
}

/// One viewing session: stores, pipeline and the completion channel.
pub struct ViewerSession<S: AssetSource, C: ColliderBuilder> {
    scenes: SceneStore,
    settings: SettingsStore,
    pipeline: ImportPipeline<S, C>,
    events: Receiver<PipelineEvent>,
}

impl<S: AssetSource, C: ColliderBuilder> ViewerSession<S, C> {
    /// Creates a session over an application data root.
    ///
    /// `events` is the receiving end of the channel the asset source
    /// delivers its completion events on.
    #[must_use]
    pub fn new(
        data_root: impl AsRef<Path>,
        source: S,
        colliders: C,
        events: Receiver<PipelineEvent>,
    ) -> Self {
        Self {
            scenes: SceneStore::at_data_root(&data_root),
            settings: SettingsStore::at_data_root(&data_root),
            pipeline: ImportPipeline::new(source, colliders),
            events,
        }
    }

    /// Returns the scene store, for listing available scene names.
    #[must_use]
    pub fn scenes(&self) -> &SceneStore {
        &self.scenes
    }

    /// Loads the scene saved under `name` and reconstructs it into
    /// `sink`, pumping completion events until the run ends.
    ///
    /// On success returns the session settings that were applied (the
    /// caller wires `main_hand` into its controls). A missing or
    /// corrupt settings file falls back to defaults; a missing or
    /// corrupt scene record is an error.
    pub fn load_and_run<K: SceneSink>(
        &mut self,
        name: &str,
        sink: &mut K,
        targets: SinkTargets,
    ) -> Result<SettingsRecord, SessionError> {
        let settings = self.settings.load_or_default()?;
        let record = self.scenes.load(name)?;
        tracing::info!("Loaded scene {} ({} models)", name, record.models.len());

        let (completion, _done) = CompletionSignal::new();
        self.pipeline
            .start(record, sink, targets, completion, settings.user_size);

        while !self.pipeline.is_terminal() {
            match self.events.recv() {
                Ok(event) => self.pipeline.handle(event, sink),
                Err(_) => return Err(SessionError::Disconnected),
            }
        }

        match self.pipeline.state() {
            PipelineState::Done => Ok(settings),
            PipelineState::Failed(error) => Err(SessionError::Pipeline(error.clone())),
            // is_terminal() only admits Done and Failed.
            _ => Err(SessionError::Disconnected),
        }
    }
}
