use std::sync::Arc;

use dir_manager::backend::MemoryBackend;
use dir_manager::{CancelToken, EntryKind, Event, PasteItem, PasteMode, PasteRequest};

mod common;

fn seed_tree(backend: &MemoryBackend) {
    common::put(backend, "/src/data/a.txt", b"alpha");
    common::put(backend, "/src/data/sub/b.txt", b"beta");
    common::mkdir(backend, "/src/data/empty");
    common::mkdir(backend, "/dst");
}

fn paste_request(items: Vec<(&str, EntryKind)>, destination: &str) -> PasteRequest {
    PasteRequest {
        items: items
            .into_iter()
            .map(|(path, kind)| PasteItem {
                path: path.to_string(),
                kind,
            })
            .collect(),
        destination: destination.to_string(),
        cancel: None,
    }
}

#[test]
fn copying_a_file_keeps_the_source_and_upcounts_on_collision() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/src/a.txt", b"alpha");
    common::put(&backend, "/dst/a.txt", b"other");
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(vec![("/src/a.txt", EntryKind::File)], "/dst"))
        .expect("copy");

    assert!(response.failed.is_empty());
    assert_eq!(response.completed[0].as_str(), "/dst/a (1).txt");
    assert_eq!(common::read(&backend, "/src/a.txt"), b"alpha");
    assert_eq!(common::read(&backend, "/dst/a (1).txt"), b"alpha");
    assert_eq!(common::read(&backend, "/dst/a.txt"), b"other");

    match &response.events[0] {
        Event::Paste {
            operation,
            from,
            to,
            kind,
            ..
        } => {
            assert_eq!(*operation, PasteMode::Copy);
            assert_eq!(from.as_str(), "/src/a.txt");
            assert_eq!(to.as_str(), "/dst/a (1).txt");
            assert_eq!(*kind, EntryKind::File);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn moving_a_file_uses_the_rename_primitive() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/src/a.txt", b"alpha");
    common::mkdir(&backend, "/dst");
    let ctx = common::context(backend.clone());

    let response = ctx
        .move_items(paste_request(vec![("/src/a.txt", EntryKind::File)], "/dst"))
        .expect("move");

    assert!(!common::has(&backend, "/src/a.txt"));
    assert_eq!(common::read(&backend, "/dst/a.txt"), b"alpha");
    assert_eq!(response.operation, PasteMode::Move);
}

#[test]
fn copy_mode_replicates_the_subtree_and_leaves_the_source_unchanged() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(vec![("/src/data", EntryKind::Dir)], "/dst"))
        .expect("copy");

    assert!(response.failed.is_empty());
    assert_eq!(response.completed[0].as_str(), "/dst/data");
    // Source unchanged.
    assert_eq!(common::read(&backend, "/src/data/a.txt"), b"alpha");
    assert_eq!(common::read(&backend, "/src/data/sub/b.txt"), b"beta");
    // Every relative sub-path exists under the destination.
    assert_eq!(common::read(&backend, "/dst/data/a.txt"), b"alpha");
    assert_eq!(common::read(&backend, "/dst/data/sub/b.txt"), b"beta");
    assert!(common::has(&backend, "/dst/data/empty"));
    // dirs (sub, empty) + files (a.txt, b.txt)
    assert_eq!(response.entries_processed, 4);
}

#[test]
fn move_mode_deletes_the_original_subtree_only_after_the_copies() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    let ctx = common::context(backend.clone());

    let response = ctx
        .move_items(paste_request(vec![("/src/data", EntryKind::Dir)], "/dst"))
        .expect("move");

    assert!(response.failed.is_empty());
    assert!(!common::has(&backend, "/src/data"));
    assert!(!common::has(&backend, "/src/data/a.txt"));
    assert!(!common::has(&backend, "/src/data/sub/b.txt"));
    assert_eq!(common::read(&backend, "/dst/data/a.txt"), b"alpha");
    assert_eq!(common::read(&backend, "/dst/data/sub/b.txt"), b"beta");
}

#[test]
fn native_recursive_backend_takes_the_fast_path() {
    let backend = Arc::new(MemoryBackend::with_native_recursive());
    seed_tree(&backend);
    let ctx = common::context(backend.clone());

    let calls_before = backend.list_calls();
    let response = ctx
        .move_items(paste_request(vec![("/src/data", EntryKind::Dir)], "/dst"))
        .expect("move");

    assert!(response.failed.is_empty());
    assert!(!common::has(&backend, "/src/data"));
    assert_eq!(common::read(&backend, "/dst/data/sub/b.txt"), b"beta");
    // No source enumeration: only the destination collision probe listed.
    assert_eq!(backend.list_calls(), calls_before + 1);
}

#[test]
fn copying_an_empty_directory_creates_the_destination_directory() {
    let backend = Arc::new(MemoryBackend::new());
    common::mkdir(&backend, "/src/hollow");
    common::mkdir(&backend, "/dst");
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(vec![("/src/hollow", EntryKind::Dir)], "/dst"))
        .expect("copy");

    assert!(response.failed.is_empty());
    assert!(common::has(&backend, "/dst/hollow"));
    assert_eq!(response.entries_processed, 0);
}

#[test]
fn colliding_directory_destination_upcounts() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    common::put(&backend, "/dst/data/existing.txt", b"keep");
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(vec![("/src/data", EntryKind::Dir)], "/dst"))
        .expect("copy");

    assert_eq!(response.completed[0].as_str(), "/dst/data (1)");
    assert_eq!(common::read(&backend, "/dst/data (1)/a.txt"), b"alpha");
    assert_eq!(common::read(&backend, "/dst/data/existing.txt"), b"keep");
}

#[test]
fn pasting_a_directory_into_its_own_subtree_fails_per_item() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(
            vec![("/src/data", EntryKind::Dir)],
            "/src/data/sub",
        ))
        .expect("paste");

    assert!(response.completed.is_empty());
    assert_eq!(response.failed.len(), 1);
    // Source untouched by the refused transfer.
    assert_eq!(common::read(&backend, "/src/data/a.txt"), b"alpha");
}

#[test]
fn mixed_batches_continue_past_failing_items() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/src/good.txt", b"ok");
    common::mkdir(&backend, "/dst");
    let ctx = common::context(backend.clone());

    let response = ctx
        .copy_items(paste_request(
            vec![
                ("/src/missing.txt", EntryKind::File),
                ("/src/good.txt", EntryKind::File),
            ],
            "/dst",
        ))
        .expect("copy");

    assert_eq!(response.failed.len(), 1);
    assert_eq!(response.failed[0].path.as_str(), "/src/missing.txt");
    assert_eq!(response.completed[0].as_str(), "/dst/good.txt");
}

#[test]
fn a_cancelled_token_stops_the_batch_before_any_mutation() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    let ctx = common::context(backend.clone());

    let cancel = CancelToken::new();
    cancel.cancel();
    let mut request = paste_request(vec![("/src/data", EntryKind::Dir)], "/dst");
    request.cancel = Some(cancel);

    let response = ctx.move_items(request).expect("move");
    assert!(response.cancelled);
    assert!(response.completed.is_empty());
    assert_eq!(response.entries_processed, 0);
    assert_eq!(common::read(&backend, "/src/data/a.txt"), b"alpha");
    assert!(!common::has(&backend, "/dst/data"));
}

#[test]
fn copy_refreshes_both_source_parent_and_destination_caches() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/src/a.txt", b"alpha");
    common::mkdir(&backend, "/dst");
    let ctx = common::cached_context(backend.clone());

    ctx.copy_items(paste_request(vec![("/src/a.txt", EntryKind::File)], "/dst"))
        .expect("copy");
    let calls_after = backend.list_calls();

    // Both affected listings were eagerly rebuilt; these reads are cache hits.
    ctx.browse(dir_manager::BrowseRequest {
        path: "/src".to_string(),
        use_cache: true,
    })
    .expect("browse src");
    let dst = ctx
        .browse(dir_manager::BrowseRequest {
            path: "/dst".to_string(),
            use_cache: true,
        })
        .expect("browse dst");
    assert_eq!(backend.list_calls(), calls_after);
    assert_eq!(dst.entries[1].name, "a.txt");
}

#[test]
fn file_and_directory_transfers_dispatch_by_kind() {
    let backend = Arc::new(MemoryBackend::new());
    seed_tree(&backend);
    common::put(&backend, "/src/top.txt", b"top");
    let ctx = common::context(backend.clone());

    let response = ctx
        .move_items(paste_request(
            vec![
                ("/src/top.txt", EntryKind::File),
                ("/src/data", EntryKind::Dir),
            ],
            "/dst",
        ))
        .expect("move");

    assert!(response.failed.is_empty());
    assert_eq!(response.completed.len(), 2);
    assert_eq!(common::read(&backend, "/dst/top.txt"), b"top");
    assert_eq!(common::read(&backend, "/dst/data/a.txt"), b"alpha");
    assert!(!common::has(&backend, "/src/top.txt"));
    assert!(!common::has(&backend, "/src/data"));
}
