use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vidpaths::{store, App, Config, VideoPaths};

fn config_in(temp_dir: &TempDir) -> Config {
    Config::new().with_config_path(temp_dir.path().join("backend/config/video_paths.json"))
}

fn make_dirs(temp_dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let dir = temp_dir.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            dir
        })
        .collect()
}

fn read_paths(file: &Path) -> Vec<String> {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
    json["paths"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_save_then_load_yields_same_set() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(&temp_dir);
    let dirs = make_dirs(&temp_dir, &["movies", "shows/2023", "clips"]);

    let mut app = App::new(config.clone());
    for dir in &dirs {
        assert!(app.add_path(dir));
    }
    app.toggle_include_subfolders();
    let saved = app.record.clone();

    let reloaded = App::new(config);
    assert_eq!(reloaded.record, saved);
    assert!(reloaded.dialogs.is_empty());
}

#[test]
fn test_vanished_paths_dropped_on_next_start() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(&temp_dir);
    let dirs = make_dirs(&temp_dir, &["keep", "remove-me"]);

    let mut app = App::new(config.clone());
    app.add_path(&dirs[0]);
    app.add_path(&dirs[1]);
    fs::remove_dir(&dirs[1]).unwrap();

    let reloaded = App::new(config.clone());
    assert_eq!(reloaded.rows, vec![dirs[0].clone()]);
    assert_eq!(reloaded.dialogs.len(), 1);
    assert_eq!(
        read_paths(&config.config_path),
        vec![store::to_disk_form(&dirs[0])]
    );
}

#[test]
fn test_duplicate_additions_are_noops() {
    let temp_dir = TempDir::new().unwrap();
    let dirs = make_dirs(&temp_dir, &["clips"]);
    let mut app = App::new(config_in(&temp_dir));

    assert!(app.add_path(&dirs[0]));
    assert!(!app.add_path(&dirs[0]));
    assert!(!app.add_path(&dirs[0].join("../clips")));
    assert_eq!(read_paths(app.config_path()).len(), 1);
}

#[test]
fn test_deleting_everything_persists_empty_array() {
    let temp_dir = TempDir::new().unwrap();
    let dirs = make_dirs(&temp_dir, &["a", "b", "c"]);
    let mut app = App::new(config_in(&temp_dir));
    for dir in &dirs {
        app.add_path(dir);
    }

    app.toggle_mark_all();
    assert_eq!(app.delete_selected(), 3);
    assert!(read_paths(app.config_path()).is_empty());
}

#[test]
fn test_persisted_paths_sorted_with_forward_slashes() {
    let temp_dir = TempDir::new().unwrap();
    let dirs = make_dirs(&temp_dir, &["zz", "aa/inner", "mm"]);
    let mut app = App::new(config_in(&temp_dir));
    for dir in &dirs {
        app.add_path(dir);
    }

    let paths = read_paths(app.config_path());
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    assert!(paths.iter().all(|p| !p.contains('\\')));
}

#[test]
fn test_save_failure_keeps_memory_state() {
    let temp_dir = TempDir::new().unwrap();
    // A regular file where the config directory should be makes every save fail
    let blocker = temp_dir.path().join("blocked");
    fs::write(&blocker, "").unwrap();
    let config = Config::new().with_config_path(blocker.join("video_paths.json"));
    let dirs = make_dirs(&temp_dir, &["movies"]);

    let mut app = App::new(config);
    assert!(app.active_dialog().unwrap().message.starts_with("Failed to save paths"));
    app.dialogs.clear();

    assert!(app.add_path(&dirs[0]));
    assert_eq!(app.rows, dirs);
    assert_eq!(app.dialogs.len(), 1);
}

#[test]
fn test_library_round_trip_without_app() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("video_paths.json");
    let dirs = make_dirs(&temp_dir, &["one", "two"]);
    let mut record = VideoPaths::new();
    for dir in &dirs {
        record.insert(dir);
    }

    store::save(&file, &record).unwrap();
    let report = store::load(&file).unwrap();
    assert_eq!(report.record, record);
    assert!(report.pruned.is_empty());
    assert!(report.existed);
}
