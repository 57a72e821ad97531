use std::{fs, path::PathBuf, time::Duration};

use mediafiler_core::{
    Clock, IndexError, IndexSettings, IntentKind, ManualClock, MediaIndex, ReconcileError,
    identity::path_digest,
};

mod support;
use support::{Fixture, minutes};

#[test]
fn list_returns_oldest_first_with_distinct_ids() {
    let fx = Fixture::new();
    let older = fx.file("movie1.mp4", Duration::from_secs(3600), b"a");
    let newer = fx.file("movie2.mp4", Duration::from_secs(60), b"b");
    fx.file("readme.txt", Duration::from_secs(10), b"c");
    let index = fx.open(fx.settings());

    let files = index.list().unwrap();

    let paths: Vec<&PathBuf> = files.iter().map(|f| &f.path).collect();
    assert_eq!(paths, vec![&older, &newer]);
    assert!(!files[0].id.is_empty());
    assert!(!files[1].id.is_empty());
    assert_ne!(files[0].id, files[1].id);
    assert_eq!(files[0].title(), "movie1");
}

#[test]
fn resolve_id_uses_the_latest_listing() {
    let fx = Fixture::new();
    let path = fx.file("a.mkv", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());

    assert!(matches!(index.resolve_id("a"), Err(IndexError::UnknownId(_))));

    let files = index.list().unwrap();
    assert_eq!(index.resolve_id(&files[0].id).unwrap(), path);
    assert!(matches!(index.resolve_id("zzzz"), Err(IndexError::UnknownId(_))));
}

#[test]
fn delete_then_undo_restores_the_original() {
    let fx = Fixture::new();
    let path = fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();

    let marker = index.request_delete(&id, false).unwrap();
    assert_eq!(marker, IntentKind::Delete.marker_for(&path));
    assert!(marker.exists());
    assert!(!path.exists());
    assert_eq!(index.pending_intents().len(), 1);

    let restored = index.request_delete(&id, true).unwrap();
    assert_eq!(restored, path);
    assert!(path.exists());
    assert!(!marker.exists());
    assert!(index.pending_intents().is_empty());
}

#[test]
fn undo_still_works_after_a_rescan() {
    let fx = Fixture::new();
    let path = fx.file("movie.mp4", Duration::from_secs(5), b"a");
    fx.file("other.mp4", Duration::from_secs(50), b"b");
    let index = fx.open(fx.settings());
    let id = index
        .list()
        .unwrap()
        .into_iter()
        .find(|f| f.path == path)
        .unwrap()
        .id;

    index.request_delete(&id, false).unwrap();
    let relisted = index.list().unwrap();
    assert!(relisted.iter().all(|f| f.path != path));

    index.request_delete(&id, true).unwrap();
    assert!(path.exists());
}

#[test]
fn unknown_ids_are_rejected_without_side_effects() {
    let fx = Fixture::new();
    let path = fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    index.list().unwrap();

    let err = index.request_delete("zzzzzz", false).unwrap_err();
    assert!(matches!(err, IndexError::UnknownId(_)));
    assert!(err.is_client_error());
    assert!(path.exists());
    assert!(index.pending_intents().is_empty());
}

#[test]
fn undo_without_pending_intent_is_invalid_target() {
    let fx = Fixture::new();
    fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();

    let err = index.request_delete(&id, true).unwrap_err();
    assert!(matches!(err, IndexError::InvalidTarget(_)));
}

#[test]
fn marking_twice_is_a_client_error() {
    let fx = Fixture::new();
    fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();

    index.request_delete(&id, false).unwrap();
    let err = index.request_delete(&id, false).unwrap_err();

    assert!(matches!(err, IndexError::Rename { .. }));
    assert!(err.is_client_error());
    assert_eq!(index.pending_intents().len(), 1);
}

#[test]
fn archive_request_with_archiving_disabled_touches_nothing() {
    let fx = Fixture::new();
    let path = fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();

    let err = index.request_archive(&id, false).unwrap_err();

    assert!(matches!(err, IndexError::ArchiveDisabled));
    assert!(err.is_client_error());
    assert!(path.exists());
    assert!(!IntentKind::Archive.marker_for(&path).exists());
    assert!(index.pending_intents().is_empty());
}

#[test]
fn sweep_respects_the_retention_window() {
    let fx = Fixture::new();
    let path = fx.file("movie.mp4", Duration::from_secs(5), b"a");
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();
    let marker = index.request_delete(&id, false).unwrap();
    let requested_at = index.now();

    let report = index.sweep(requested_at + minutes(11));
    assert!(report.is_empty());
    assert!(marker.exists());

    let report = index.sweep(requested_at + minutes(11) + chrono::TimeDelta::seconds(1));
    assert_eq!(report.deleted, vec![marker.clone()]);
    assert!(!marker.exists());
    assert!(!path.exists());
    assert!(index.pending_intents().is_empty());
}

#[test]
fn committed_delete_disappears_from_listing() {
    let fx = Fixture::new();
    fx.file("keep.mp4", Duration::from_secs(50), b"k");
    fx.file("drop.mp4", Duration::from_secs(5), b"d");
    let index = fx.open(fx.settings());
    let listing = index.list().unwrap();
    let drop_id = listing[1].id.clone();

    index.request_delete(&drop_id, false).unwrap();
    fx.clock.advance(minutes(12));
    index.sweep_now();

    let listing = index.list().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].title(), "keep");
    assert!(listing.iter().all(|f| !f.path.ends_with("drop.mp4")));
    assert!(fs::read_dir(fx.root()).unwrap().count() == 1);
}

#[test]
fn archive_moves_file_after_window() {
    let fx = Fixture::new();
    let path = fx.file("movie.mkv", Duration::from_secs(5), b"payload");
    let index = fx.open(fx.archive_settings());
    let id = index.list().unwrap()[0].id.clone();

    let marker = index.request_archive(&id, false).unwrap();
    assert_eq!(marker, IntentKind::Archive.marker_for(&path));

    fx.clock.advance(minutes(12));
    let report = index.sweep_now();

    let destination = fx.archive.path().join("movie.mkv");
    assert_eq!(report.archived, vec![(marker.clone(), destination.clone())]);
    assert!(!marker.exists());
    assert_eq!(fs::read(destination).unwrap(), b"payload");
}

#[test]
fn archive_recovers_idempotently_or_reports_conflict() {
    let fx = Fixture::new();
    fx.file("same.mp4", Duration::from_secs(50), b"12345");
    fx.file("clash.mp4", Duration::from_secs(5), b"12345");
    fs::write(fx.archive.path().join("same.mp4"), b"abcde").unwrap();
    fs::write(fx.archive.path().join("clash.mp4"), b"abc").unwrap();
    let index = fx.open(fx.archive_settings());
    for entry in index.list().unwrap() {
        index.request_archive(&entry.id, false).unwrap();
    }

    fx.clock.advance(minutes(12));
    let report = index.sweep_now();

    let same_marker = fx.root().join("same.mp4.archive");
    let clash_marker = fx.root().join("clash.mp4.archive");
    assert_eq!(report.already_archived, vec![same_marker.clone()]);
    assert!(!same_marker.exists());
    assert_eq!(fs::read_dir(fx.archive.path()).unwrap().count(), 2);

    assert!(matches!(
        report.failures.as_slice(),
        [ReconcileError::Conflict { .. }]
    ));
    assert!(clash_marker.exists());
    assert_eq!(fs::read(fx.archive.path().join("clash.mp4")).unwrap(), b"abc");

    // The conflicting marker is no longer pending; later sweeps leave it alone.
    fx.clock.advance(minutes(30));
    assert!(index.sweep_now().is_empty());
    assert!(clash_marker.exists());
}

#[test]
fn restart_recovers_markers_with_a_fresh_window() {
    let fx = Fixture::new();
    let deleted = fx.file("gone.mp4.delete", Duration::from_secs(86_400), b"a");
    let archived = fx.file("nested/kept.mkv.archive", Duration::from_secs(86_400), b"b");
    fx.file("visible.mp4", Duration::from_secs(5), b"c");

    let index = fx.open(fx.archive_settings());

    let pending = index.pending_intents();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|intent| intent.requested_at == fx.clock.utc_now()));

    // Nothing is committed before a full window elapses.
    fx.clock.advance(minutes(10));
    assert!(index.sweep_now().is_empty());

    let original = IntentKind::Delete.original_of(&deleted).unwrap();
    let id = path_digest(&original);
    let restored = index.request_delete(&id[..8], true).unwrap();
    assert_eq!(restored, original);
    assert!(original.exists());

    fx.clock.advance(minutes(2));
    let report = index.sweep_now();
    assert_eq!(report.archived.len(), 1);
    assert!(!archived.exists());
    assert!(fx.archive.path().join("kept.mkv").exists());
}

#[test]
fn archive_markers_are_not_recovered_when_archiving_is_disabled() {
    let fx = Fixture::new();
    let marker = fx.file("movie.mp4.archive", Duration::from_secs(5), b"a");
    fx.file("other.mp4.delete", Duration::from_secs(5), b"b");

    let index = fx.open(fx.settings());

    let pending = index.pending_intents();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, IntentKind::Delete);

    fx.clock.advance(minutes(12));
    index.sweep_now();
    assert!(marker.exists());
}

#[cfg(unix)]
#[test]
fn non_utf8_file_names_can_be_marked_recovered_and_undone() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let fx = Fixture::new();
    let path = fx.root().join(OsStr::from_bytes(b"caf\xff.mp4"));
    fs::write(&path, b"a").unwrap();
    let index = fx.open(fx.settings());
    let id = index.list().unwrap()[0].id.clone();

    let marker = index.request_delete(&id, false).unwrap();
    assert!(marker.exists());

    // A restart picks the marker up again and undo restores the exact name.
    let reopened = fx.open(fx.settings());
    let pending = reopened.pending_intents();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].marker, marker);

    let restored = reopened.request_delete(&id, true).unwrap();
    assert_eq!(restored, path);
    assert!(path.exists());
    assert!(!marker.exists());
}

#[test]
fn concurrent_list_mark_undo_and_sweep_keep_store_and_disk_in_step() {
    let fx = Fixture::new();
    for n in 0..24 {
        fx.file(&format!("movie{n:02}.mp4"), Duration::from_secs(100 + n), b"x");
    }
    let index = fx.open(fx.settings());
    let ids: Vec<String> = index.list().unwrap().into_iter().map(|f| f.id).collect();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..40 {
                index.list().unwrap();
            }
        });
        for chunk in ids.chunks(ids.len() / 3) {
            let index = &index;
            scope.spawn(move || {
                for (n, id) in chunk.iter().enumerate() {
                    // Stale ids after a concurrent rescan are expected to fail.
                    if index.request_delete(id, false).is_ok() && n % 2 == 0 {
                        let _ = index.request_delete(id, true);
                    }
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..30 {
                fx.clock.advance(minutes(1));
                index.sweep_now();
            }
        });
    });

    let pending = index.pending_intents();
    let mut on_disk: Vec<PathBuf> = fs::read_dir(fx.root())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| IntentKind::of_marker(path).is_some())
        .collect();
    on_disk.sort();
    let recorded: Vec<PathBuf> = pending.iter().map(|i| i.marker.clone()).collect();
    assert_eq!(recorded, on_disk);
    for intent in &pending {
        assert!(!intent.original().exists());
    }

    fx.clock.advance(minutes(12));
    index.sweep_now();
    assert!(index.pending_intents().is_empty());
    assert!(
        fs::read_dir(fx.root())
            .unwrap()
            .all(|entry| IntentKind::of_marker(&entry.unwrap().path()).is_none())
    );
}

#[test]
fn open_rejects_missing_roots() {
    let clock = std::sync::Arc::new(ManualClock::default());

    let err = MediaIndex::open(IndexSettings::new(Vec::<PathBuf>::new(), &[".mp4"]), clock.clone())
        .unwrap_err();
    assert!(matches!(err, IndexError::Config(_)));

    let fx = Fixture::new();
    let err = MediaIndex::open(
        IndexSettings::new([fx.root().join("absent")], &[".mp4"]),
        clock,
    )
    .unwrap_err();
    assert!(matches!(err, IndexError::Scan { .. }));
}
