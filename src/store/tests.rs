use super::*;
use std::fs;

fn store() -> (tempfile::TempDir, UserStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::new(dir.path().join("userfiles"));
    (dir, store)
}

#[test]
fn push_recent_moves_duplicate_to_front() {
    let mut list = vec!["B by X".to_string(), "A by X".to_string()];
    push_recent(&mut list, "A by X", RECENTS_CAP);
    assert_eq!(list, vec!["A by X", "B by X"]);
}

#[test]
fn recents_missing_file_is_empty() {
    let (_dir, store) = store();
    assert!(store.recents().unwrap().is_empty());
}

#[test]
fn add_recent_twice_keeps_one_entry_at_front() {
    let (_dir, store) = store();
    store.add_recent("Hello by Adele").unwrap();
    store.add_recent("Other by Someone").unwrap();
    let list = store.add_recent("Hello by Adele").unwrap();
    assert_eq!(list, vec!["Hello by Adele", "Other by Someone"]);
    assert_eq!(store.recents().unwrap(), list);
}

#[test]
fn add_recent_caps_at_ten_most_recent_first() {
    let (_dir, store) = store();
    for i in 0..11 {
        store.add_recent(&format!("Song {i} by Artist")).unwrap();
    }
    let list = store.recents().unwrap();
    assert_eq!(list.len(), 10);
    assert_eq!(list[0], "Song 10 by Artist");
    assert_eq!(list[9], "Song 1 by Artist");
    assert!(!list.contains(&"Song 0 by Artist".to_string()));

    let on_disk = fs::read_to_string(store.recents_path()).unwrap();
    assert_eq!(on_disk.lines().count(), 10);
}

#[test]
fn add_to_playlist_inserts_at_front_and_strips_ordinal() {
    let (_dir, store) = store();
    assert_eq!(store.add_to_playlist("road", "1. First by A").unwrap(), 1);
    assert_eq!(store.add_to_playlist("road", "Second by B, C").unwrap(), 2);

    let entries = store.playlist("road").unwrap();
    assert_eq!(
        entries,
        vec![
            PlaylistEntry {
                name: "Second".into(),
                artist: "B, C".into()
            },
            PlaylistEntry {
                name: "First".into(),
                artist: "A".into()
            },
        ]
    );
    assert_eq!(entries[1].descriptor(), "First by A");
}

#[test]
fn playlist_file_uses_name_artist_objects() {
    let (_dir, store) = store();
    store.add_to_playlist("mix", "Song by Artist").unwrap();
    let raw = fs::read_to_string(store.playlists_dir().join("mix.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!([{"name": "Song", "artist": "Artist"}]));
}

#[test]
fn playlist_keeps_titles_that_contain_the_separator() {
    let (_dir, store) = store();
    store
        .add_to_playlist("mix", "1. Stand by Me by Ben E. King")
        .unwrap();
    let entries = store.playlist("mix").unwrap();
    assert_eq!(entries[0].name, "Stand by Me");
    assert_eq!(entries[0].artist, "Ben E. King");
    assert_eq!(entries[0].descriptor(), "Stand by Me by Ben E. King");
}

#[test]
fn missing_playlist_is_empty_and_malformed_is_an_error() {
    let (_dir, store) = store();
    assert!(store.playlist("nope").unwrap().is_empty());

    fs::create_dir_all(store.playlists_dir()).unwrap();
    fs::write(store.playlists_dir().join("broken.json"), "{not json").unwrap();
    assert!(matches!(
        store.playlist("broken"),
        Err(StoreError::Json { .. })
    ));
}

#[test]
fn playlists_lists_json_stems_sorted() {
    let (_dir, store) = store();
    assert!(store.playlists().unwrap().is_empty());

    store.add_to_playlist("zeta", "A by B").unwrap();
    store.add_to_playlist("Alpha", "A by B").unwrap();
    fs::write(store.playlists_dir().join("notes.txt"), "x").unwrap();

    assert_eq!(store.playlists().unwrap(), vec!["Alpha", "zeta"]);
}

#[test]
fn rejects_path_like_playlist_names_and_bad_descriptors() {
    let (_dir, store) = store();
    assert!(matches!(
        store.add_to_playlist("../escape", "A by B"),
        Err(StoreError::InvalidName(_))
    ));
    assert!(matches!(
        store.add_to_playlist(".hidden", "A by B"),
        Err(StoreError::InvalidName(_))
    ));
    assert!(matches!(
        store.add_to_playlist("ok", "no artist"),
        Err(StoreError::BadDescriptor(_))
    ));
}
