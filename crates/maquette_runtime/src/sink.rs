//! # Scene Sink & Stage
//!
//! Where reconstructed entities end up. The pipeline is handed two
//! target containers at `start()` - one for models, one for the avatar -
//! and parents everything it places under them. Entities belong to the
//! sink once attached; the pipeline keeps nothing.
//!
//! [`Stage`] is the in-memory sink used by the authoring mode and by
//! tests. On the authoring side it is the live scene the scene builder
//! snapshots.

use std::collections::HashMap;

use maquette_shared::{Transform, Vec3};

use crate::source::ImportedEntity;

/// Identifier of a container inside a scene sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(pub u32);

/// The two containers a pipeline run places into.
#[derive(Clone, Copy, Debug)]
pub struct SinkTargets {
    /// Parent container for every placed model.
    pub models_parent: ContainerId,
    /// Parent container for the spawned avatar.
    pub avatar_parent: ContainerId,
}

/// The avatar entity spawned at the end of a successful run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarSpawn {
    /// World position.
    pub position: Vec3,
    /// World rotation as Euler angles. Only the yaw component is
    /// carried over from the record; pitch and roll spawn level.
    pub euler_rotation: Vec3,
}

/// Receiver of placed entities. Implementations own entities after
/// attachment.
pub trait SceneSink {
    /// Parents a placed model under `parent`.
    fn attach_model(&mut self, parent: ContainerId, entity: ImportedEntity);

    /// Spawns the avatar under `parent`.
    fn spawn_avatar(&mut self, parent: ContainerId, avatar: AvatarSpawn);
}

/// Builds collision volumes for placed entities.
///
/// Fire-and-forget: the pipeline requests a build and moves on without
/// waiting for the volume to exist.
pub trait ColliderBuilder {
    /// Requests a collision volume for `entity`.
    fn build_collider(&mut self, entity: &ImportedEntity, immediate: bool);
}

/// In-memory scene: containers of entities plus an avatar slot.
///
/// Serves both modes. Viewing parents reconstructed entities here
/// through the [`SceneSink`] impl; authoring places entities directly
/// and tracks the live avatar transform for the scene builder.
#[derive(Default)]
pub struct Stage {
    next_container: u32,
    containers: HashMap<ContainerId, Vec<ImportedEntity>>,
    avatar: Option<AvatarSpawn>,
    avatar_transform: Transform,
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh, empty container.
    pub fn add_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        self.containers.insert(id, Vec::new());
        id
    }

    /// Returns the entities of `container` in placement order.
    #[must_use]
    pub fn entities(&self, container: ContainerId) -> &[ImportedEntity] {
        self.containers.get(&container).map_or(&[], Vec::as_slice)
    }

    /// Returns the spawned avatar, if a run reached `SpawningPlayer`.
    #[must_use]
    pub fn avatar(&self) -> Option<&AvatarSpawn> {
        self.avatar.as_ref()
    }

    /// Sets the live avatar transform (authoring side).
    pub fn set_avatar_transform(&mut self, transform: Transform) {
        self.avatar_transform = transform;
    }

    /// Returns the live avatar transform (authoring side).
    #[must_use]
    pub fn avatar_transform(&self) -> &Transform {
        &self.avatar_transform
    }
}

impl SceneSink for Stage {
    fn attach_model(&mut self, parent: ContainerId, entity: ImportedEntity) {
        self.containers.entry(parent).or_default().push(entity);
    }

    fn spawn_avatar(&mut self, _parent: ContainerId, avatar: AvatarSpawn) {
        self.avatar = Some(avatar);
    }
}
