use super::*;
use crate::{GlyphSample, Point, Stroke};

fn sample_lib(user: &str) -> GlyphLibrary {
    let mut lib = GlyphLibrary::new(user);
    let s = Stroke::new([Point::new(0.0, 0.0), Point::new(10.0, 100.0)]).unwrap();
    lib.insert(GlyphSample::new('l', vec![s]).unwrap());
    lib
}

fn temp_root(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("store_tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn memory_store_returns_shared_library() {
    let store = MemoryGlyphStore::new().with(sample_lib("ada"));
    let a = store.load("ada").unwrap();
    let b = store.load("ada").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn missing_user_is_library_not_found() {
    let store = MemoryGlyphStore::new();
    assert!(matches!(
        store.load("nobody"),
        Err(PenwrightError::LibraryNotFound { .. })
    ));

    let fs = FsGlyphStore::new(temp_root("missing"));
    assert!(matches!(
        fs.load("nobody"),
        Err(PenwrightError::LibraryNotFound { .. })
    ));
}

#[test]
fn fs_store_save_then_load() {
    let fs = FsGlyphStore::new(temp_root("save_load"));
    let lib = sample_lib("grace");
    let path = fs.save(&lib).unwrap();
    assert!(path.ends_with("grace.json"));
    let loaded = fs.load("grace").unwrap();
    assert_eq!(*loaded, lib);
}

#[test]
fn fs_store_rejects_path_like_user_ids() {
    let fs = FsGlyphStore::new(temp_root("ids"));
    assert!(matches!(
        fs.load("../etc"),
        Err(PenwrightError::InvalidConfiguration(_))
    ));
    assert!(validate_user_id("").is_err());
    assert!(validate_user_id("a\\b").is_err());
    assert!(validate_user_id("ada.l").is_ok());
}

#[test]
fn fs_store_rejects_foreign_library_file() {
    let root = temp_root("foreign");
    let fs = FsGlyphStore::new(&root);
    fs.save(&sample_lib("ada")).unwrap();
    std::fs::copy(root.join("ada.json"), root.join("eve.json")).unwrap();
    assert!(matches!(fs.load("eve"), Err(PenwrightError::Serde(_))));
}
