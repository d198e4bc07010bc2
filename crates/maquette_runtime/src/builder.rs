//! # Scene Builder
//!
//! The authoring-side inverse of the import pipeline: a pure,
//! synchronous snapshot of the live stage into a [`SceneRecord`].
//! No I/O and no fetches happen here; persistence is a separate,
//! explicit `save_scene` call through the record store.

use maquette_shared::{ModelRecord, SceneRecord};
use maquette_store::{SceneStore, StoreResult};

use crate::sink::{ContainerId, Stage};

/// Snapshots every model entity under `models_parent` plus the live
/// avatar transform into an immutable scene record.
///
/// Entities are captured in container order, which becomes the record's
/// placement order. Each entity's current world transform is captured
/// as-is; keys are copied verbatim, duplicates included.
#[must_use]
pub fn snapshot_scene(stage: &Stage, models_parent: ContainerId) -> SceneRecord {
    let models = stage
        .entities(models_parent)
        .iter()
        .map(|entity| ModelRecord::from_transform(entity.key.clone(), &entity.transform))
        .collect();
    SceneRecord::new(models, stage.avatar_transform())
}

/// Snapshots the stage and saves it under `name`, overwriting any
/// existing record of that name.
pub fn save_scene(
    store: &SceneStore,
    name: &str,
    stage: &Stage,
    models_parent: ContainerId,
) -> StoreResult<()> {
    let record = snapshot_scene(stage, models_parent);
    tracing::info!("Saving scene {} ({} models)", name, record.models.len());
    store.save(name, &record)
}
