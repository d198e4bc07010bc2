//! Persisted record types.
//!
//! Records are immutable data aggregates: the store owns their durable
//! byte form, the runtime consumes in-memory copies. No record type here
//! performs I/O or validation beyond the settings size clamp.

use serde::{Deserialize, Serialize};

use crate::math::{Transform, Vec3};

/// One persisted model placement.
///
/// `key` identifies the model in the external asset source. It is opaque:
/// not validated, not deduplicated. Two records may carry the same key and
/// are fetched independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Asset-source key for re-importing the model.
    pub key: String,
    /// World position at save time.
    pub position: Vec3,
    /// World rotation at save time, as Euler angles.
    pub euler_rotation: Vec3,
    /// World scale at save time.
    pub scale: Vec3,
}

impl ModelRecord {
    /// Captures a model record from a key and a live world transform.
    #[must_use]
    pub fn from_transform(key: impl Into<String>, transform: &Transform) -> Self {
        Self {
            key: key.into(),
            position: transform.position,
            euler_rotation: transform.euler_rotation,
            scale: transform.scale,
        }
    }
}

/// A complete persisted scene: model placements plus the avatar transform.
///
/// `models` order is the placement order. It determines the fetch/import
/// sequence during reconstruction and must survive persistence exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Model placements, in placement order.
    pub models: Vec<ModelRecord>,
    /// World position of the avatar at save time.
    pub player_position: Vec3,
    /// World rotation of the avatar at save time, as Euler angles.
    pub player_euler_rotation: Vec3,
    /// World scale of the avatar at save time.
    pub player_scale: Vec3,
}

impl SceneRecord {
    /// Creates a scene record from its parts.
    #[must_use]
    pub fn new(models: Vec<ModelRecord>, player: &Transform) -> Self {
        Self {
            models,
            player_position: player.position,
            player_euler_rotation: player.euler_rotation,
            player_scale: player.scale,
        }
    }

    /// Returns an empty scene with the avatar at the identity transform.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), &Transform::IDENTITY)
    }
}

/// Main hand selection for the viewing session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MainHand {
    /// Dominant hand (default).
    #[default]
    Primary = 1,
    /// Off hand.
    Secondary = 2,
}

impl MainHand {
    /// Converts from the persisted tag byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Primary),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Smallest user size the authoring UI offers.
pub const MIN_USER_SIZE: f32 = 0.1;

/// Largest user size the authoring UI offers.
pub const MAX_USER_SIZE: f32 = 5.0;

/// Viewing-session settings. Singleton record at the data root.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Main hand selection.
    pub main_hand: MainHand,
    /// User size ratio; scales every reconstructed model relative to the
    /// avatar. Captured once per pipeline run.
    pub user_size: f32,
}

impl SettingsRecord {
    /// Creates settings from raw values, clamping the size to the
    /// authoring range.
    #[must_use]
    pub fn new(main_hand: MainHand, user_size: f32) -> Self {
        Self {
            main_hand,
            user_size: user_size.clamp(MIN_USER_SIZE, MAX_USER_SIZE),
        }
    }

    /// Sets the user size, clamped to the authoring range.
    pub fn set_user_size(&mut self, user_size: f32) {
        self.user_size = user_size.clamp(MIN_USER_SIZE, MAX_USER_SIZE);
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            main_hand: MainHand::Primary,
            user_size: 2.0,
        }
    }
}
