//! Integration tests driving the batch pipeline end to end, in process.

mod common;

use common::{make_jpeg, TestHarness};
use imagecask::images::ImageInput;
use imagecask_common::SizeClass;
use imagecask_db::queries::{image_data, image_files};

#[tokio::test]
async fn file_pipeline_commits_batch() {
    let h = TestHarness::new();

    let inputs = (0..4)
        .map(|i| ImageInput::from_bytes(format!("p{i}.jpg"), "image/jpeg", make_jpeg(800, 600)))
        .collect();

    let summary = h.ctx.file_processor.process(inputs).await;
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 0);

    let conn = h.conn();
    let records = image_files::list_image_files(&conn).unwrap();
    assert_eq!(records.len(), 4);

    // Every rendition of every image landed in the shard directory.
    let shard_dir = h.data_dir.path().join("images").join("0");
    for record in &records {
        for size in SizeClass::all() {
            let path = shard_dir.join(format!("{}_{}.jpg", size.prefix(), record.id));
            assert!(path.exists());
        }
    }
}

#[tokio::test]
async fn blob_pipeline_scales_down_and_keeps_aspect() {
    let h = TestHarness::new();

    let inputs = vec![ImageInput::from_bytes(
        "wide.jpg",
        "image/jpeg",
        make_jpeg(3000, 1000),
    )];
    let summary = h.ctx.blob_processor.process(inputs).await;
    assert_eq!(summary.succeeded, 1);

    let conn = h.conn();
    let ids = image_data::list_image_ids(&conn).unwrap();
    let fullscreen = image_data::get_rendition(&conn, ids[0], SizeClass::Fullscreen)
        .unwrap()
        .unwrap();
    let img = image::load_from_memory(&fullscreen).unwrap();
    assert_eq!(img.width(), 1000);
    assert_eq!(img.height(), 333);

    let thumbnail = image_data::get_rendition(&conn, ids[0], SizeClass::Thumbnail)
        .unwrap()
        .unwrap();
    let img = image::load_from_memory(&thumbnail).unwrap();
    assert_eq!(img.width(), 300);
    assert_eq!(img.height(), 100);
}

#[tokio::test]
async fn blob_pipeline_never_upscales() {
    let h = TestHarness::new();

    let inputs = vec![ImageInput::from_bytes(
        "tiny.jpg",
        "image/jpeg",
        make_jpeg(150, 90),
    )];
    h.ctx.blob_processor.process(inputs).await;

    let conn = h.conn();
    let ids = image_data::list_image_ids(&conn).unwrap();
    for size in SizeClass::all() {
        let bytes = image_data::get_rendition(&conn, ids[0], size)
            .unwrap()
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 150);
        assert_eq!(img.height(), 90);
    }
}

#[tokio::test]
async fn mixed_batch_drops_only_corrupt_items() {
    let h = TestHarness::new();

    let inputs = vec![
        ImageInput::from_bytes("ok1.jpg", "image/jpeg", make_jpeg(400, 300)),
        ImageInput::from_bytes("broken.jpg", "image/jpeg", vec![0u8; 64]),
        ImageInput::from_bytes("ok2.jpg", "image/jpeg", make_jpeg(400, 300)),
    ];

    let summary = h.ctx.file_processor.process(inputs).await;
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let conn = h.conn();
    assert_eq!(image_files::list_image_files(&conn).unwrap().len(), 2);
}

#[tokio::test]
async fn consecutive_batches_share_pool_and_advance_shards() {
    let h = TestHarness::new();

    for _ in 0..3 {
        let inputs = vec![ImageInput::from_bytes(
            "x.jpg",
            "image/jpeg",
            make_jpeg(100, 100),
        )];
        let summary = h.ctx.file_processor.process(inputs).await;
        assert_eq!(summary.succeeded, 1);
    }

    let conn = h.conn();
    let records = image_files::list_image_files(&conn).unwrap();
    assert_eq!(records.len(), 3);

    // Each batch recomputed its shard from the running count.
    let mut folders: Vec<_> = records.iter().map(|r| r.folder.clone()).collect();
    folders.sort();
    assert_eq!(folders, vec!["/images/0", "/images/1", "/images/2"]);
}
