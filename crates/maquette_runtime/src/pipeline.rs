//! # Import Pipeline
//!
//! The reconstruction state machine. One run consumes one
//! [`SceneRecord`]: every model is fetched, imported and placed in
//! record order, then the avatar is spawned and the completion signal
//! fires.
//!
//! ## States
//!
//! ```text
//! Idle ──start()──> FetchingModel(0) ──> ImportingModel(0) ──> PlacingModel(0)
//!   │                     ▲                                        │
//!   │ (empty scene)       └──────────── next model ────────────────┤
//!   │                                                              │ (last model)
//!   └────────────────────────> SpawningPlayer <────────────────────┘
//!                                    │
//!                                    ▼
//!                                  Done          (any fetch/import error: Failed)
//! ```
//!
//! ## Sequencing
//!
//! Exactly one fetch or import request is outstanding at any time.
//! The next fetch is issued only after the current model's placement
//! completes. This is a deliberate single-in-flight design: placements
//! happen in strictly increasing index order no matter how fast the
//! source could answer.
//!
//! A fetch or import failure at index k halts the run permanently.
//! Nothing is retried or skipped; entities placed for indices below k
//! stay in the sink. There is no cancellation: once started, a run ends
//! in `Done` or `Failed`.

use crossbeam_channel::{bounded, Receiver};
use thiserror::Error;

use maquette_shared::{ModelRecord, SceneRecord, Transform, Vec3};

use crate::sink::{AvatarSpawn, ColliderBuilder, SceneSink, SinkTargets};
use crate::source::{
    AssetSource, FetchError, ImportError, ImportOptions, ImportedEntity, RawAsset,
};

/// Errors that permanently halt a pipeline run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The asset source failed to fetch a model.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The asset source failed to import a fetched model.
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
}

/// State of the reconstruction machine. `Idle` is initial; `Done` and
/// `Failed` are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineState {
    /// No run active.
    Idle,
    /// Waiting for the fetch result of model `i`.
    FetchingModel(usize),
    /// Waiting for the import result of model `i`.
    ImportingModel(usize),
    /// Placing the imported entity for model `i`.
    PlacingModel(usize),
    /// All models placed; spawning the avatar.
    SpawningPlayer,
    /// Run completed; the completion signal has fired.
    Done,
    /// Run halted permanently.
    Failed(PipelineError),
}

impl PipelineState {
    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Completion event delivered by the asset source.
///
/// The source sends exactly one event per request on its completion
/// channel; the driver pumps them into [`ImportPipeline::handle`].
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineEvent {
    /// Result of the outstanding fetch request.
    FetchCompleted(Result<RawAsset, FetchError>),
    /// Result of the outstanding import request.
    ImportCompleted(Result<ImportedEntity, ImportError>),
}

/// One-shot success signal for a pipeline run.
///
/// `fire` consumes the signal, so firing twice is a compile error, not
/// a silent overwrite. The signal fires only on the
/// `SpawningPlayer -> Done` transition; a failed run drops it unfired.
pub struct CompletionSignal {
    tx: crossbeam_channel::Sender<()>,
}

impl CompletionSignal {
    /// Creates a signal and the receiver that observes it.
    #[must_use]
    pub fn new() -> (Self, Receiver<()>) {
        let (tx, rx) = bounded(1);
        (Self { tx }, rx)
    }

    /// Fires the signal. Consumes `self`.
    pub fn fire(self) {
        if self.tx.send(()).is_err() {
            tracing::warn!("Completion signal fired but nobody was listening");
        }
    }
}

/// Per-run data, dropped when the run reaches a terminal state.
struct ActiveRun {
    record: SceneRecord,
    targets: SinkTargets,
    completion: CompletionSignal,
    /// Session size ratio, captured once at `start()`.
    size_ratio: f32,
}

/// The reconstruction state machine.
///
/// The caller owns the pipeline and its collaborators and drives it by
/// pumping completion events into [`handle`](Self::handle). No method
/// blocks.
pub struct ImportPipeline<S: AssetSource, C: ColliderBuilder> {
    source: S,
    colliders: C,
    options: ImportOptions,
    state: PipelineState,
    run: Option<ActiveRun>,
}

impl<S: AssetSource, C: ColliderBuilder> ImportPipeline<S, C> {
    /// Creates an idle pipeline with default import options.
    #[must_use]
    pub fn new(source: S, colliders: C) -> Self {
        Self {
            source,
            colliders,
            options: ImportOptions::default(),
            state: PipelineState::Idle,
            run: None,
        }
    }

    /// Overrides the import options used for every model of a run.
    #[must_use]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Returns true once the run has reached `Done` or `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Begins a run over `record`.
    ///
    /// The record is consumed; the pipeline keeps a private read-only
    /// copy for the duration of the run. `size_ratio` is the session's
    /// user size, captured here and never re-read. Calling `start`
    /// while the machine is not `Idle` is a no-op.
    pub fn start<K: SceneSink>(
        &mut self,
        record: SceneRecord,
        sink: &mut K,
        targets: SinkTargets,
        completion: CompletionSignal,
        size_ratio: f32,
    ) {
        if self.state != PipelineState::Idle {
            tracing::warn!("start() ignored: pipeline is not idle ({:?})", self.state);
            return;
        }

        let count = record.models.len();
        let first_key = record.models.first().map(|m| m.key.clone());
        tracing::info!(
            "Starting scene reconstruction: {} models, size ratio {}",
            count,
            size_ratio
        );

        self.run = Some(ActiveRun {
            record,
            targets,
            completion,
            size_ratio,
        });

        match first_key {
            Some(key) => {
                self.state = PipelineState::FetchingModel(0);
                self.source.request_fetch(&key);
            }
            None => self.spawn_player(sink),
        }
    }

    /// Advances the machine with a completion event from the source.
    ///
    /// Events arriving in a state that did not request them (including
    /// anything after a terminal state) are ignored.
    pub fn handle<K: SceneSink>(&mut self, event: PipelineEvent, sink: &mut K) {
        match (self.state.clone(), event) {
            (PipelineState::FetchingModel(index), PipelineEvent::FetchCompleted(Ok(asset))) => {
                self.state = PipelineState::ImportingModel(index);
                self.source.request_import(asset, self.options);
            }
            (PipelineState::FetchingModel(index), PipelineEvent::FetchCompleted(Err(e))) => {
                tracing::warn!("Fetch failed at index {}: {}", index, e);
                self.fail(PipelineError::Fetch(e));
            }
            (PipelineState::ImportingModel(index), PipelineEvent::ImportCompleted(Ok(entity))) => {
                self.place(index, entity, sink);
            }
            (PipelineState::ImportingModel(index), PipelineEvent::ImportCompleted(Err(e))) => {
                tracing::warn!("Import failed at index {}: {}", index, e);
                self.fail(PipelineError::Import(e));
            }
            (state, event) => {
                tracing::warn!("Ignoring {:?} in state {:?}", event, state);
            }
        }
    }

    /// Places the imported entity for model `index`, then either
    /// requests the next fetch or moves on to the avatar.
    fn place<K: SceneSink>(&mut self, index: usize, mut entity: ImportedEntity, sink: &mut K) {
        let Some(run) = self.run.as_ref() else {
            tracing::warn!("No active run while placing index {}", index);
            return;
        };

        self.state = PipelineState::PlacingModel(index);
        self.colliders.build_collider(&entity, true);

        let model = &run.record.models[index];
        entity.transform = placement_transform(model, run.record.player_scale.x, run.size_ratio);
        sink.attach_model(run.targets.models_parent, entity);
        tracing::debug!("Placed model {} ({})", index, model.key);

        let next = index + 1;
        if next < run.record.models.len() {
            let key = run.record.models[next].key.clone();
            self.state = PipelineState::FetchingModel(next);
            self.source.request_fetch(&key);
        } else {
            self.spawn_player(sink);
        }
    }

    /// Spawns the avatar, fires the completion signal and finishes the
    /// run. The run data is dropped here: the record is consumed.
    fn spawn_player<K: SceneSink>(&mut self, sink: &mut K) {
        let Some(run) = self.run.take() else {
            tracing::warn!("No active run while spawning the avatar");
            return;
        };

        self.state = PipelineState::SpawningPlayer;
        let avatar = AvatarSpawn {
            position: run.record.player_position,
            euler_rotation: Vec3::new(0.0, run.record.player_euler_rotation.y, 0.0),
        };
        sink.spawn_avatar(run.targets.avatar_parent, avatar);

        run.completion.fire();
        self.state = PipelineState::Done;
        tracing::info!(
            "Scene reconstruction complete ({} models)",
            run.record.models.len()
        );
    }

    /// Halts the run permanently. The unfired completion signal drops
    /// with the run data; already-placed entities stay in the sink.
    fn fail(&mut self, error: PipelineError) {
        self.run = None;
        self.state = PipelineState::Failed(error);
    }
}

/// Final world transform for a reconstructed model.
///
/// Position and rotation are applied verbatim, in world space: the
/// record stores absolute coordinates, and the load-time world origin
/// is assumed to coincide with the save-time one. Scale is not applied
/// verbatim. It is re-normalized against the current session's avatar
/// size, so a model authored relative to one avatar scale reads as the
/// same relative size under a different one:
///
/// ```text
/// local_scale = saved_scale / (saved_player_scale.x * size_ratio)
/// ```
fn placement_transform(model: &ModelRecord, player_scale_x: f32, size_ratio: f32) -> Transform {
    Transform::new(
        model.position,
        model.euler_rotation,
        model.scale / (player_scale_x * size_ratio),
    )
}
