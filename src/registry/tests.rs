use super::*;
use crate::test_support::png_bytes;

fn image_file(name: &str, width: u32) -> SourceFile {
    SourceFile::new(name, "image/png", png_bytes(width, 10, [200, 100, 50]))
}

#[tokio::test]
async fn test_upload_appends_and_activates_first() {
    let mut registry = ImageRegistry::default();
    let report = registry
        .upload(vec![image_file("a.png", 10), image_file("b.png", 20)])
        .await;

    assert_eq!(report.added.len(), 2);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.active_id(), Some(report.added[0]));
    assert_eq!(registry.active().unwrap().name(), "a.png");
    assert_eq!(
        registry.active().unwrap().dimensions(),
        Some(crate::placement::Dimensions::new(10, 10))
    );
}

#[tokio::test]
async fn test_upload_over_capacity_keeps_batch_order() {
    let mut registry = ImageRegistry::new(DEFAULT_MAX_FILES);

    // Decreasing sizes so later files decode faster than earlier ones
    let files: Vec<SourceFile> = (0..DEFAULT_MAX_FILES + 2)
        .map(|i| image_file(&format!("img{}.png", i), 400 - (i as u32) * 50))
        .collect();

    let report = registry.upload(files).await;

    assert_eq!(registry.len(), DEFAULT_MAX_FILES);
    assert_eq!(report.dropped_over_capacity, 2);
    let names: Vec<&str> = registry.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["img0.png", "img1.png", "img2.png", "img3.png", "img4.png"]);
    assert_eq!(registry.remaining_capacity(), 0);
}

#[tokio::test]
async fn test_upload_skips_non_images() {
    let mut registry = ImageRegistry::default();
    let files = vec![
        image_file("one.png", 10),
        image_file("two.png", 10),
        SourceFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        image_file("three.png", 10),
        image_file("four.png", 10),
    ];

    let report = registry.upload(files).await;

    assert_eq!(registry.len(), 4);
    assert_eq!(report.skipped_non_image, 1);
    assert!(registry.entries().iter().all(|e| e.name() != "notes.txt"));
}

#[tokio::test]
async fn test_upload_respects_existing_entries() {
    let mut registry = ImageRegistry::new(3);
    registry.upload(vec![image_file("first.png", 10)]).await;
    let first = registry.active_id();

    let report = registry
        .upload(vec![
            image_file("second.png", 10),
            image_file("third.png", 10),
            image_file("fourth.png", 10),
        ])
        .await;

    assert_eq!(registry.len(), 3);
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.dropped_over_capacity, 1);
    // A later batch never steals the active image
    assert_eq!(registry.active_id(), first);

    let full = registry.upload(vec![image_file("fifth.png", 10)]).await;
    assert!(full.added.is_empty());
    assert_eq!(full.dropped_over_capacity, 1);
}

#[tokio::test]
async fn test_decode_failure_is_kept_as_failed_entry() {
    let mut registry = ImageRegistry::default();
    let report = registry
        .upload(vec![
            SourceFile::new("broken.png", "image/png", b"not a png".to_vec()),
            image_file("good.png", 10),
        ])
        .await;

    assert_eq!(registry.len(), 2);
    assert_eq!(report.failed, 1);

    let broken = &registry.entries()[0];
    assert!(!broken.is_ready());
    assert!(broken.failure().is_some());
    assert!(broken.dimensions().is_none());

    // The failed entry is never auto-activated
    assert_eq!(registry.active().unwrap().name(), "good.png");
}

fn crashing_decoder(bytes: &[u8]) -> image::ImageResult<image::DynamicImage> {
    if bytes == b"crash" {
        panic!("decoder crashed");
    }
    image::load_from_memory(bytes)
}

#[tokio::test]
async fn test_crashed_decode_keeps_failed_entry_in_place() {
    let mut registry = ImageRegistry::default();
    let files = vec![
        image_file("first.png", 10),
        SourceFile::new("crash.png", "image/png", b"crash".to_vec()),
        image_file("last.png", 10),
    ];

    let report = registry.upload_with(files, crashing_decoder).await;

    assert_eq!(report.added.len(), 3);
    assert_eq!(report.failed, 1);
    let names: Vec<&str> = registry.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["first.png", "crash.png", "last.png"]);

    let crashed = registry.get(report.added[1]).unwrap();
    assert!(!crashed.is_ready());
    assert_eq!(crashed.source.mime_type, "image/png");
    assert!(crashed.failure().unwrap().contains("panicked"));
    assert_eq!(registry.active().unwrap().name(), "first.png");
}

#[tokio::test]
async fn test_clear_all_then_reupload_reactivates() {
    let mut registry = ImageRegistry::default();
    registry
        .upload(vec![image_file("a.png", 10), image_file("b.png", 10)])
        .await;
    registry.clear_all();

    assert!(registry.is_empty());
    assert_eq!(registry.active_id(), None);
    assert!(registry.active().is_none());

    let report = registry.upload(vec![image_file("c.png", 10)]).await;
    assert_eq!(registry.active_id(), Some(report.added[0]));
}

#[tokio::test]
async fn test_select_unknown_id_is_rejected() {
    let mut registry = ImageRegistry::default();
    let report = registry
        .upload(vec![image_file("a.png", 10), image_file("b.png", 10)])
        .await;

    registry.select(report.added[1]).unwrap();
    assert_eq!(registry.active().unwrap().name(), "b.png");

    let result = registry.select(ImageId::new());
    assert!(matches!(result, Err(RegistryError::NotFound(_))));
    assert_eq!(registry.active().unwrap().name(), "b.png");
}

#[tokio::test]
async fn test_source_file_from_path_guesses_mime() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let png = temp_dir.path().join("photo.png");
    std::fs::write(&png, png_bytes(4, 4, [0, 0, 0])).unwrap();
    let txt = temp_dir.path().join("readme.txt");
    std::fs::write(&txt, b"text").unwrap();

    let png = SourceFile::from_path(&png).await.unwrap();
    assert_eq!(png.name, "photo.png");
    assert_eq!(png.mime_type, "image/png");
    assert!(png.is_image());

    let txt = SourceFile::from_path(&txt).await.unwrap();
    assert!(!txt.is_image());

    let missing = SourceFile::from_path(&temp_dir.path().join("nope.png")).await;
    assert!(matches!(missing, Err(RegistryError::IoError(_))));
}
