//! # Record Store
//!
//! Flat-namespace, one-file-per-name persistence for a single record kind.
//!
//! ## Layout
//!
//! ```text
//! {root}/{name}.{ext}
//! ```
//!
//! Scene stores root at `{app_data_root}/Scenes`; the settings store roots
//! at the data root itself. The store never creates its root directory:
//! a missing root surfaces as an I/O error on `create`/`save`, matching
//! the behavior the rest of the system expects.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use maquette_shared::{SceneRecord, RECORD_EXT, SCENES_DIR};

use crate::codec::RecordCodec;
use crate::error::{StoreError, StoreResult};

/// Durable named-record persistence for one record kind.
///
/// Operations are unsynchronized: concurrent `save`/`load` of the same
/// name from two callers must be serialized by the caller.
pub struct RecordStore<R: RecordCodec> {
    /// Directory holding every record file of this store.
    root: PathBuf,
    /// File extension, without the leading dot.
    ext: &'static str,
    _kind: PhantomData<R>,
}

/// Store for named scene records under the `Scenes` subdirectory.
pub type SceneStore = RecordStore<SceneRecord>;

impl SceneStore {
    /// Opens the scene store for an application data root.
    ///
    /// The `Scenes` subdirectory must already exist; the store will not
    /// create it.
    #[must_use]
    pub fn at_data_root(data_root: impl AsRef<Path>) -> Self {
        Self::new(data_root.as_ref().join(SCENES_DIR), RECORD_EXT)
    }
}

impl<R: RecordCodec> RecordStore<R> {
    /// Creates a store rooted at `root` with the given extension.
    #[must_use]
    pub fn new(root: PathBuf, ext: &'static str) -> Self {
        Self {
            root,
            ext,
            _kind: PhantomData,
        }
    }

    /// Returns the store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{ext}", ext = self.ext))
    }

    /// Creates an empty placeholder file for `name`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if a record file for the
    /// name exists. The placeholder holds no content; a subsequent `save`
    /// is required to populate it, and loading it before then reports the
    /// record as corrupt.
    pub fn create(&self, name: &str) -> StoreResult<()> {
        let path = self.file_path(name);
        if path.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        fs::File::create(&path)?;
        tracing::debug!("Created {} record placeholder: {}", R::KIND, name);
        Ok(())
    }

    /// Encodes `record` and writes it for `name`, overwriting any
    /// existing file unconditionally.
    pub fn save(&self, name: &str, record: &R) -> StoreResult<()> {
        let bytes = record.encode();
        fs::write(self.file_path(name), &bytes)?;
        tracing::debug!("Saved {} record {} ({} bytes)", R::KIND, name, bytes.len());
        Ok(())
    }

    /// Loads and decodes the record for `name`.
    ///
    /// Returns a fresh copy, never an alias of the stored bytes. A
    /// zero-length file decodes as corrupt, which also covers a
    /// placeholder that was created but never saved.
    pub fn load(&self, name: &str) -> StoreResult<R> {
        let path = self.file_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        R::decode(&bytes).map_err(|source| {
            tracing::warn!("Corrupt {} record {}: {}", R::KIND, name, source);
            StoreError::Corrupt {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Lists the names of every record of this store's kind.
    ///
    /// A file belongs to the store when the content after its first `.`
    /// ends with the store extension; the returned name is the substring
    /// before that first `.`. Names containing additional dots are
    /// therefore truncated (`a.b.dat` lists as `a`) - a documented quirk
    /// of the namespace, not a feature.
    pub fn list(&self) -> StoreResult<HashSet<String>> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some((name, rest)) = file_name.split_once('.') else {
                continue;
            };
            if rest == self.ext || rest.ends_with(&format!(".{ext}", ext = self.ext)) {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }
}
