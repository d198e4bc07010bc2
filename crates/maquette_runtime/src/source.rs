//! # Asset Source Contract
//!
//! The external service the pipeline fetches models from. Requests are
//! fire-and-return: an implementation accepts the request, returns
//! immediately, and later delivers the result as a
//! [`PipelineEvent`](crate::pipeline::PipelineEvent) on the completion
//! channel it was constructed with. The pipeline never sees the channel;
//! it only sees the events the driver pumps back into it.

use maquette_shared::Transform;
use thiserror::Error;

/// A fetched, not-yet-imported asset payload.
///
/// The payload bytes are opaque to the pipeline; only the source's
/// importer interprets them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawAsset {
    /// Key the asset was fetched under.
    pub key: String,
    /// Opaque payload as delivered by the source.
    pub bytes: Vec<u8>,
}

/// Options applied when importing a fetched asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportOptions {
    /// Rescale the imported model so its largest dimension fits this size.
    pub rescale_to_unit_size: f32,
    /// Recenter the imported model on its bounding-box center.
    pub recenter: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            rescale_to_unit_size: 1.0,
            recenter: true,
        }
    }
}

/// A model imported from a raw asset, ready for placement.
///
/// Fresh imports carry the identity transform; the pipeline overwrites
/// it during placement and hands the entity off to the scene sink,
/// which owns it from then on.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedEntity {
    /// Key the model was imported from.
    pub key: String,
    /// Current world transform.
    pub transform: Transform,
}

impl ImportedEntity {
    /// Creates an imported entity at the identity transform.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            transform: Transform::IDENTITY,
        }
    }
}

/// Errors the asset source can report for a fetch request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The source has no asset under the requested key.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The source could not be reached.
    #[error("asset source unreachable: {0}")]
    Unreachable(String),
}

/// Errors the asset source can report for an import request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The payload was not a model format the importer understands.
    #[error("unsupported asset payload for key {0}")]
    UnsupportedPayload(String),

    /// The payload was recognized but conversion failed.
    #[error("asset conversion failed for key {key}: {reason}")]
    ConversionFailed {
        /// Key of the failing asset.
        key: String,
        /// Importer-supplied failure description.
        reason: String,
    },
}

/// External source of models, addressed by opaque string keys.
///
/// Both methods must return without blocking. Results arrive as
/// completion events on the implementation's channel: exactly one event
/// per request, fetch results for fetch requests, import results for
/// import requests. The pipeline guarantees it never has more than one
/// request outstanding.
pub trait AssetSource {
    /// Requests the raw asset stored under `key`.
    fn request_fetch(&mut self, key: &str);

    /// Requests conversion of a fetched asset into a placeable entity.
    fn request_import(&mut self, asset: RawAsset, options: ImportOptions);
}
