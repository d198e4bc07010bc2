//! End-to-end flow: author a scene on a stage, persist it, then
//! reconstruct it through a viewer session with a scripted asset
//! source.

use std::fs;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tempfile::TempDir;

use maquette_runtime::{
    save_scene, AssetSource, ColliderBuilder, FetchError, ImportOptions, ImportedEntity,
    PipelineError, PipelineEvent, RawAsset, SessionError, Stage, SinkTargets, ViewerSession,
};
use maquette_shared::{MainHand, SettingsRecord, Transform, Vec3, SCENES_DIR};
use maquette_store::{SceneStore, SettingsStore, StoreError};

/// Asset source double that answers every request immediately on its
/// completion channel. Keys listed in `missing` fail their fetch.
struct ScriptedSource {
    events: Sender<PipelineEvent>,
    missing: Vec<String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    fn new(missing: &[&str]) -> (Self, Receiver<PipelineEvent>, Arc<Mutex<Vec<String>>>) {
        let (tx, rx) = unbounded();
        let fetched = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: tx,
                missing: missing.iter().map(ToString::to_string).collect(),
                fetched: fetched.clone(),
            },
            rx,
            fetched,
        )
    }
}

impl AssetSource for ScriptedSource {
    fn request_fetch(&mut self, key: &str) {
        self.fetched.lock().push(key.to_string());
        let result = if self.missing.iter().any(|k| k == key) {
            Err(FetchError::NotFound(key.to_string()))
        } else {
            Ok(RawAsset {
                key: key.to_string(),
                bytes: vec![0xAB],
            })
        };
        self.events.send(PipelineEvent::FetchCompleted(result)).unwrap();
    }

    fn request_import(&mut self, asset: RawAsset, _options: ImportOptions) {
        self.events
            .send(PipelineEvent::ImportCompleted(Ok(ImportedEntity::new(
                asset.key,
            ))))
            .unwrap();
    }
}

struct NoopColliders;

impl ColliderBuilder for NoopColliders {
    fn build_collider(&mut self, _entity: &ImportedEntity, _immediate: bool) {}
}

fn data_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(SCENES_DIR)).unwrap();
    dir
}

fn authored_entity(key: &str, position: Vec3, scale: Vec3) -> ImportedEntity {
    let mut entity = ImportedEntity::new(key);
    entity.transform = Transform::new(position, Vec3::ZERO, scale);
    entity
}

fn author_scene(root: &TempDir, name: &str, keys_positions: &[(&str, Vec3)]) {
    use maquette_runtime::SceneSink as _;

    let mut stage = Stage::new();
    let models = stage.add_container();
    for (key, position) in keys_positions {
        stage.attach_model(models, authored_entity(key, *position, Vec3::ONE));
    }
    stage.set_avatar_transform(Transform::IDENTITY);

    let store = SceneStore::at_data_root(root.path());
    save_scene(&store, name, &stage, models).unwrap();
}

fn viewer_targets(stage: &mut Stage) -> SinkTargets {
    SinkTargets {
        models_parent: stage.add_container(),
        avatar_parent: stage.add_container(),
    }
}

#[test]
fn test_author_save_list_load_reconstruct() {
    let root = data_root();
    author_scene(
        &root,
        "harbor",
        &[
            ("crane", Vec3::new(1.0, 0.0, 0.0)),
            ("boat", Vec3::new(-4.0, 0.0, 2.0)),
        ],
    );
    SettingsStore::at_data_root(root.path())
        .save(&SettingsRecord::new(MainHand::Secondary, 2.0))
        .unwrap();

    let (source, events, fetched) = ScriptedSource::new(&[]);
    let mut session = ViewerSession::new(root.path(), source, NoopColliders, events);

    assert!(session.scenes().list().unwrap().contains("harbor"));

    let mut stage = Stage::new();
    let targets = viewer_targets(&mut stage);
    let settings = session.load_and_run("harbor", &mut stage, targets).unwrap();

    assert_eq!(settings.main_hand, MainHand::Secondary);
    assert_eq!(*fetched.lock(), vec!["crane".to_string(), "boat".to_string()]);

    let placed = stage.entities(targets.models_parent);
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].key, "crane");
    assert_eq!(placed[0].transform.position, Vec3::new(1.0, 0.0, 0.0));
    // Authored at player scale 1 with user size 2: re-normalized to half.
    assert_eq!(placed[0].transform.scale, Vec3::new(0.5, 0.5, 0.5));
    assert_eq!(placed[1].key, "boat");
    assert_eq!(placed[1].transform.position, Vec3::new(-4.0, 0.0, 2.0));

    let avatar = stage.avatar().unwrap();
    assert_eq!(avatar.position, Vec3::ZERO);
}

#[test]
fn test_missing_settings_still_reconstructs() {
    let root = data_root();
    author_scene(&root, "plaza", &[("statue", Vec3::ZERO)]);

    let (source, events, _fetched) = ScriptedSource::new(&[]);
    let mut session = ViewerSession::new(root.path(), source, NoopColliders, events);

    let mut stage = Stage::new();
    let targets = viewer_targets(&mut stage);
    let settings = session.load_and_run("plaza", &mut stage, targets).unwrap();

    // Default settings applied.
    assert_eq!(settings, SettingsRecord::default());
    assert_eq!(stage.entities(targets.models_parent).len(), 1);
}

#[test]
fn test_fetch_failure_leaves_partial_scene() {
    let root = data_root();
    author_scene(
        &root,
        "ruin",
        &[
            ("arch", Vec3::new(0.0, 0.0, 1.0)),
            ("gone", Vec3::new(0.0, 0.0, 2.0)),
            ("tower", Vec3::new(0.0, 0.0, 3.0)),
        ],
    );

    let (source, events, fetched) = ScriptedSource::new(&["gone"]);
    let mut session = ViewerSession::new(root.path(), source, NoopColliders, events);

    let mut stage = Stage::new();
    let targets = viewer_targets(&mut stage);
    let result = session.load_and_run("ruin", &mut stage, targets);

    match result {
        Err(SessionError::Pipeline(PipelineError::Fetch(FetchError::NotFound(key)))) => {
            assert_eq!(key, "gone");
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }

    // Index 0 was placed before the halt; nothing after it was tried.
    assert_eq!(*fetched.lock(), vec!["arch".to_string(), "gone".to_string()]);
    let placed = stage.entities(targets.models_parent);
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].key, "arch");
    assert!(stage.avatar().is_none());
}

#[test]
fn test_unknown_scene_name_is_store_error() {
    let root = data_root();
    let (source, events, _fetched) = ScriptedSource::new(&[]);
    let mut session = ViewerSession::new(root.path(), source, NoopColliders, events);

    let mut stage = Stage::new();
    let targets = viewer_targets(&mut stage);
    match session.load_and_run("nowhere", &mut stage, targets) {
        Err(SessionError::Store(StoreError::NotFound(name))) => assert_eq!(name, "nowhere"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
