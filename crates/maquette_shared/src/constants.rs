//! Namespace constants shared by every store instance.

/// Subdirectory of the application data root holding named scene records.
pub const SCENES_DIR: &str = "Scenes";

/// File extension for every record kind, without the leading dot.
pub const RECORD_EXT: &str = "dat";

/// Singleton record name for the settings file at the data root.
pub const SETTINGS_NAME: &str = "settings";
