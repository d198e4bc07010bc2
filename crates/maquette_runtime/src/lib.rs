//! # MAQUETTE Runtime
//!
//! Scene reconstruction and authoring on top of the record store.
//!
//! ## Architecture
//!
//! ```text
//! Authoring mode                       Viewing mode
//! ──────────────                       ────────────
//! Stage ──snapshot──> SceneRecord      SceneRecord ──start──> ImportPipeline
//!                         │                 ▲                      │
//!                         ▼                 │                 fetch/import
//!                    RecordStore ──────load─┘                 (one in flight)
//!                                                                  │
//!                                                                  ▼
//!                                                       Stage + avatar + done
//! ```
//!
//! The pipeline is an event-driven state machine: it issues one
//! asynchronous fetch or import request, returns, and resumes when the
//! asset source delivers the matching completion event. No pipeline
//! method blocks, nothing is polled, and two requests are never in
//! flight at once.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod source;

pub use builder::{save_scene, snapshot_scene};
pub use pipeline::{
    CompletionSignal, ImportPipeline, PipelineError, PipelineEvent, PipelineState,
};
pub use session::{SessionError, ViewerSession};
pub use sink::{AvatarSpawn, ColliderBuilder, ContainerId, SceneSink, SinkTargets, Stage};
pub use source::{AssetSource, FetchError, ImportError, ImportOptions, ImportedEntity, RawAsset};
