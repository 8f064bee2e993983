//! End-to-end batch coordinator tests
//!
//! These run the real coordinator and pipeline against temporary directory
//! trees, substituting the background-removal capability with fakes so no
//! model is needed.

use image::RgbaImage;
use product_bgbatch::{
    run_batch, BackgroundRemover, BatchConfig, BatchSummary, BgBatchError, DiskCodec, FileOutcome,
    NoOpProgressReporter, ProgressReporter, Result,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Pass-through remover that counts invocations
#[derive(Default)]
struct CountingRemover {
    calls: AtomicU32,
}

impl BackgroundRemover for CountingRemover {
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(image.clone())
    }
}

/// Remover that fails for sources whose file name contains "fail"
struct SelectiveRemover;

impl BackgroundRemover for SelectiveRemover {
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        // Dimensions carry the failure signal: fixtures named "fail" are 3x3
        if image.dimensions() == (3, 3) {
            return Err(BgBatchError::processing("injected failure"));
        }
        Ok(image.clone())
    }
}

/// Remover that panics for sources whose fixture is 3x3
struct PanickingRemover;

impl BackgroundRemover for PanickingRemover {
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        assert!(image.dimensions() != (3, 3), "model crashed mid-inference");
        Ok(image.clone())
    }
}

/// Reporter that records outcomes as they complete
#[derive(Default)]
struct CollectingReporter {
    outcomes: Mutex<Vec<FileOutcome>>,
    totals: Mutex<Vec<usize>>,
}

impl ProgressReporter for CollectingReporter {
    fn batch_started(&self, total: usize) {
        self.totals.lock().unwrap().push(total);
    }

    fn file_completed(&self, outcome: &FileOutcome) {
        self.outcomes.lock().unwrap().push(outcome.clone());
    }

    fn batch_completed(&self, _summary: &BatchSummary) {}
}

fn write_image(path: &Path, side: u32) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    let image = RgbaImage::from_pixel(side, side, image::Rgba([10, 20, 30, 255]));
    match path.extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save(path)
            .expect("save jpeg"),
        _ => image.save(path).expect("save"),
    }
}

fn seed_tree(input_root: &Path) -> Vec<PathBuf> {
    let files = vec![
        input_root.join("a.png"),
        input_root.join("shoes/b.jpg"),
        input_root.join("shoes/summer/c.jpeg"),
        input_root.join("bags/d.webp"),
    ];
    for file in &files {
        write_image(file, 2);
    }
    // Not a qualifying extension, must be ignored
    std::fs::write(input_root.join("catalog.txt"), b"notes").expect("write");
    files
}

fn config_for(dir: &TempDir) -> BatchConfig {
    BatchConfig::builder()
        .input_root(dir.path().join("in"))
        .output_root(dir.path().join("out"))
        .retry_delay_ms(0)
        .build()
        .expect("config")
}

#[tokio::test]
async fn outcome_set_matches_discovered_set() {
    let dir = TempDir::new().expect("temp dir");
    let input_root = dir.path().join("in");
    let sources = seed_tree(&input_root);
    let config = config_for(&dir);

    let reporter = CollectingReporter::default();
    let summary = run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(CountingRemover::default()),
        &reporter,
    )
    .await
    .expect("batch");

    assert_eq!(summary.total, sources.len());
    assert_eq!(summary.succeeded, sources.len());
    assert_eq!(summary.failed, 0);

    // No file is dropped or duplicated, independent of completion order
    let expected: BTreeSet<PathBuf> = sources
        .iter()
        .map(|p| std::path::absolute(p).expect("absolute"))
        .collect();
    let observed: BTreeSet<PathBuf> = summary.outcomes.iter().map(|o| o.source.clone()).collect();
    assert_eq!(observed, expected);
    assert_eq!(summary.outcomes.len(), expected.len());

    // Reporter saw the same outcomes, in the same completion order
    let reported = reporter.outcomes.lock().unwrap();
    assert_eq!(reported.len(), summary.outcomes.len());
    assert_eq!(*reporter.totals.lock().unwrap(), vec![sources.len()]);
}

#[tokio::test]
async fn output_tree_mirrors_input_tree_with_png_extensions() {
    let dir = TempDir::new().expect("temp dir");
    let input_root = dir.path().join("in");
    seed_tree(&input_root);
    let config = config_for(&dir);

    run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(CountingRemover::default()),
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("batch");

    let out = dir.path().join("out");
    assert!(out.join("a.png").exists());
    assert!(out.join("shoes/b.png").exists());
    assert!(out.join("shoes/summer/c.png").exists());
    assert!(out.join("bags/d.png").exists());
    assert!(!out.join("catalog.txt").exists());
}

#[tokio::test]
async fn rerun_skips_every_existing_output_without_invoking_the_model() {
    let dir = TempDir::new().expect("temp dir");
    let input_root = dir.path().join("in");
    let sources = seed_tree(&input_root);
    let config = config_for(&dir);
    let codec = Arc::new(DiskCodec::new());

    let first = Arc::new(CountingRemover::default());
    run_batch(
        &config,
        Arc::clone(&codec) as Arc<dyn product_bgbatch::ImageCodec>,
        Arc::clone(&first) as Arc<dyn BackgroundRemover>,
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("first run");
    assert_eq!(first.calls.load(Ordering::SeqCst) as usize, sources.len());

    let second = Arc::new(CountingRemover::default());
    let summary = run_batch(
        &config,
        codec,
        Arc::clone(&second) as Arc<dyn BackgroundRemover>,
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("second run");

    assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.succeeded, sources.len());
    assert!(summary
        .outcomes
        .iter()
        .all(|o| o.message.starts_with("skip (exists)")));
}

#[tokio::test]
async fn missing_input_root_aborts_before_any_work() {
    let dir = TempDir::new().expect("temp dir");
    let config = config_for(&dir); // "in" never created

    let result = run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(CountingRemover::default()),
        &NoOpProgressReporter::new(),
    )
    .await;

    assert!(matches!(result, Err(BgBatchError::RootNotFound(_))));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn empty_input_root_completes_cleanly_without_creating_output() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("in")).expect("mkdir");
    let config = config_for(&dir);

    let summary = run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(CountingRemover::default()),
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("batch");

    assert_eq!(summary.total, 0);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn per_file_failures_are_tallied_without_aborting_the_run() {
    let dir = TempDir::new().expect("temp dir");
    let input_root = dir.path().join("in");
    seed_tree(&input_root);
    // 3x3 fixtures trigger SelectiveRemover failures
    write_image(&input_root.join("fail_one.png"), 3);
    write_image(&input_root.join("shoes/fail_two.jpg"), 3);
    let config = config_for(&dir);

    let summary = run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(SelectiveRemover),
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("batch");

    assert_eq!(summary.total, 6);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 2);
    assert!(!dir.path().join("out").join("fail_one.png").exists());
}

#[tokio::test]
async fn panicking_work_item_is_tallied_without_aborting_the_run() {
    let dir = TempDir::new().expect("temp dir");
    let input_root = dir.path().join("in");
    seed_tree(&input_root);
    // 3x3 fixture makes PanickingRemover panic inside the worker
    write_image(&input_root.join("poison.png"), 3);
    let config = config_for(&dir);

    let summary = run_batch(
        &config,
        Arc::new(DiskCodec::new()),
        Arc::new(PanickingRemover),
        &NoOpProgressReporter::new(),
    )
    .await
    .expect("batch survives a panicking worker");

    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);

    let poisoned = summary
        .outcomes
        .iter()
        .find(|o| o.source.ends_with("poison.png"))
        .expect("outcome for panicking file");
    assert!(!poisoned.success);
    assert!(
        poisoned.message.contains("panicked"),
        "unexpected message: {}",
        poisoned.message
    );
    assert!(!dir.path().join("out").join("poison.png").exists());
}

#[tokio::test]
async fn parallel_and_sequential_runs_agree_on_aggregate_counts() {
    let mut tallies = Vec::new();
    for workers in [1, 4] {
        let dir = TempDir::new().expect("temp dir");
        let input_root = dir.path().join("in");
        seed_tree(&input_root);
        write_image(&input_root.join("fail_one.png"), 3);
        let config = BatchConfig::builder()
            .input_root(dir.path().join("in"))
            .output_root(dir.path().join("out"))
            .max_workers(workers)
            .retry_delay_ms(0)
            .build()
            .expect("config");

        let summary = run_batch(
            &config,
            Arc::new(DiskCodec::new()),
            Arc::new(SelectiveRemover),
            &NoOpProgressReporter::new(),
        )
        .await
        .expect("batch");
        tallies.push((summary.succeeded, summary.failed));
    }

    assert_eq!(tallies[0], tallies[1]);
    assert_eq!(tallies[0], (4, 1));
}
