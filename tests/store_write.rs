use std::io::Read;
use std::sync::Arc;

use dir_manager::backend::MemoryBackend;
use dir_manager::{
    BrowseRequest, DownloadRequest, Event, ReadRequest, StoreRequest, WriteRequest,
};

mod common;

fn store_request(dir: &str, name: &str, content: &[u8], overwrite: bool) -> StoreRequest {
    StoreRequest {
        path: dir.to_string(),
        name: name.to_string(),
        content: content.to_vec(),
        overwrite,
    }
}

#[test]
fn stored_uploads_replace_spaces_with_underscores() {
    let backend = Arc::new(MemoryBackend::new());
    common::mkdir(&backend, "/up");
    let ctx = common::context(backend.clone());

    let response = ctx
        .store(store_request("/up", "my report.pdf", b"pdf", false))
        .expect("store");

    assert_eq!(response.path.as_str(), "/up/my_report.pdf");
    assert_eq!(common::read(&backend, "/up/my_report.pdf"), b"pdf");
    assert!(matches!(response.events[0], Event::FilesUploaded { .. }));
}

#[test]
fn duplicate_uploads_upcount_by_default() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/up/file.bin", b"v1");
    let ctx = common::context(backend.clone());

    let response = ctx
        .store(store_request("/up", "file.bin", b"v2", false))
        .expect("store");

    assert_eq!(response.path.as_str(), "/up/file (1).bin");
    assert!(!response.overwritten);
    assert_eq!(common::read(&backend, "/up/file.bin"), b"v1");
    assert_eq!(common::read(&backend, "/up/file (1).bin"), b"v2");
}

#[test]
fn explicit_overwrite_replaces_in_place() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/up/file.bin", b"v1");
    let ctx = common::context(backend.clone());

    let response = ctx
        .store(store_request("/up", "file.bin", b"v2", true))
        .expect("store");

    assert_eq!(response.path.as_str(), "/up/file.bin");
    assert!(response.overwritten);
    assert_eq!(common::read(&backend, "/up/file.bin"), b"v2");
}

#[test]
fn store_refreshes_the_directory_listing_cache() {
    let backend = Arc::new(MemoryBackend::new());
    common::mkdir(&backend, "/up");
    let ctx = common::cached_context(backend.clone());

    ctx.browse(BrowseRequest {
        path: "/up".to_string(),
        use_cache: true,
    })
    .expect("warm");

    ctx.store(store_request("/up", "file.bin", b"v1", false))
        .expect("store");
    let calls_after = backend.list_calls();

    let fresh = ctx
        .browse(BrowseRequest {
            path: "/up".to_string(),
            use_cache: true,
        })
        .expect("browse");
    assert_eq!(backend.list_calls(), calls_after);
    assert_eq!(fresh.entries[1].name, "file.bin");
}

#[test]
fn content_writes_leave_the_listing_cache_untouched() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/docs/a.txt", b"v1");
    let ctx = common::cached_context(backend.clone());

    let warm = ctx
        .browse(BrowseRequest {
            path: "/docs".to_string(),
            use_cache: true,
        })
        .expect("warm");
    assert_eq!(warm.entries[1].size, Some(2));
    let calls_after_warm = backend.list_calls();

    ctx.write_file(WriteRequest {
        path: "/docs/a.txt".to_string(),
        content: b"longer content".to_vec(),
    })
    .expect("write");

    // The listing cache is metadata-only; the stale size is accepted.
    let stale = ctx
        .browse(BrowseRequest {
            path: "/docs".to_string(),
            use_cache: true,
        })
        .expect("browse");
    assert_eq!(backend.list_calls(), calls_after_warm);
    assert_eq!(stale.entries[1].size, Some(2));

    // The content itself is current.
    let content = ctx
        .read_file(ReadRequest {
            path: "/docs/a.txt".to_string(),
        })
        .expect("read");
    assert_eq!(content.content, b"longer content");
}

#[test]
fn download_streams_content_and_size() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/docs/report.txt", b"stream me");
    let ctx = common::context(backend);

    let mut download = ctx
        .download(DownloadRequest {
            path: "/docs/report.txt".to_string(),
        })
        .expect("download");

    assert_eq!(download.file_name, "report.txt");
    assert_eq!(download.ascii_file_name, None);
    assert_eq!(download.size, 9);

    let mut bytes = Vec::new();
    download.reader.read_to_end(&mut bytes).expect("read");
    assert_eq!(bytes, b"stream me");
}

#[test]
fn non_ascii_names_get_a_transliteration_suggestion() {
    let backend = Arc::new(MemoryBackend::new());
    common::put(&backend, "/docs/résumé.pdf", b"cv");
    let ctx = common::context(backend);

    let download = ctx
        .download(DownloadRequest {
            path: "/docs/résumé.pdf".to_string(),
        })
        .expect("download");

    assert_eq!(download.file_name, "résumé.pdf");
    assert_eq!(download.ascii_file_name.as_deref(), Some("resume.pdf"));
}

#[test]
fn directories_cannot_be_streamed() {
    let backend = Arc::new(MemoryBackend::new());
    common::mkdir(&backend, "/docs");
    let ctx = common::context(backend);

    let err = ctx
        .download(DownloadRequest {
            path: "/docs".to_string(),
        })
        .expect_err("dir");
    assert_eq!(err.status().code, 422);

    let err = ctx
        .download(DownloadRequest {
            path: "/missing.txt".to_string(),
        })
        .expect_err("missing");
    assert_eq!(err.status().code, 404);
}
