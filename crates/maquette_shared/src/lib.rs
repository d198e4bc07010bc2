//! # MAQUETTE Shared
//!
//! Common types used by both the authoring side and the viewing side.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - the file system
//! - channels or threads
//! - any asset-source client
//!
//! If you need behavior, put it in `maquette_store` or `maquette_runtime`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod records;

pub use constants::{RECORD_EXT, SCENES_DIR, SETTINGS_NAME};
pub use math::{Transform, Vec3};
pub use records::{MainHand, ModelRecord, SceneRecord, SettingsRecord};
