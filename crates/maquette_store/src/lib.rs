//! # MAQUETTE Store
//!
//! Durable, named, flat-namespace persistence for scene and settings
//! records.
//!
//! ## Design Principles
//!
//! 1. **Specified bytes** - The record format is an explicit layout
//!    (`codec`), never a reflection dump
//! 2. **Explicit results** - Every operation returns a typed error;
//!    the only fallback is the settings default
//! 3. **No hidden directories** - The store writes only where it was
//!    rooted and never creates the root itself
//! 4. **Caller-serialized** - No file locking; one active session per
//!    store at a time
//!
//! ## Example
//!
//! ```rust,ignore
//! use maquette_store::{RecordStore, SceneStore};
//!
//! let store = SceneStore::at_data_root("/app/data");
//! store.create("harbor")?;
//! store.save("harbor", &record)?;
//! let loaded = store.load("harbor")?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod settings;
pub mod store;

pub use codec::{DecodeError, RecordCodec};
pub use error::{StoreError, StoreResult};
pub use settings::SettingsStore;
pub use store::{RecordStore, SceneStore};
