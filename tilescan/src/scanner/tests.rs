use super::*;
use crate::codec;
use crate::coord::{to_tile_coords, GeoBoundingBox};
use crate::fetch::{png_tile, FetcherConfig, MockResponse, MockTileServer, TileUrlTemplate};
use crate::log::{LogLevel, NoOpLogger, RecordingLogger};
use crate::manifest::{Manifest, MANIFEST_FILE};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const TILE_SIZE: u32 = 16;

/// Covers exactly one tile at zoom 4.
fn single_tile_area() -> GeoBoundingBox {
    GeoBoundingBox::new(51.50, -0.13, 51.51, -0.12)
}

/// Covers tiles (0..=1, 0..=1) at zoom 1.
fn two_by_two_area() -> GeoBoundingBox {
    GeoBoundingBox::new(-10.0, -10.0, 10.0, 10.0)
}

fn tile_server() -> MockTileServer {
    let server = MockTileServer::new();
    server.set_fallback(MockResponse::png(png_tile(TILE_SIZE, [40, 80, 120, 255])));
    server
}

fn scanner(
    server: &MockTileServer,
    config: ScannerConfig,
    logger: Arc<dyn Logger>,
) -> Scanner<MockTileServer> {
    let fetcher_config =
        FetcherConfig::new(TileUrlTemplate::new("http://tiles.test/{z}/{x}/{y}.png").unwrap())
            .with_tile_size(TILE_SIZE)
            .with_max_concurrent(2);
    let fetcher = TileFetcher::start(
        fetcher_config,
        server.clone(),
        Arc::clone(&logger),
        CancellationToken::new(),
    );
    Scanner::new(config, fetcher, logger).unwrap()
}

fn read_manifest(dir: &Path) -> Manifest {
    serde_json::from_slice(&std::fs::read(dir.join(MANIFEST_FILE)).unwrap()).unwrap()
}

#[tokio::test]
async fn test_single_tile_batch() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let config = ScannerConfig::new(single_tile_area(), 4, out.path()).with_stitch(true);
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    let report = scanner.run_once().await.unwrap();

    let tile = to_tile_coords(51.50, -0.13, 4).unwrap();
    assert_eq!(report.tile_count, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.files_written, 1);
    assert_eq!(server.call_count(), 1);

    let file = report
        .directory
        .join(tile.x.to_string())
        .join(format!("{}.png", tile.y));
    assert!(file.is_file());

    let manifest = read_manifest(&report.directory);
    assert_eq!(manifest.tile_count, 1);
    assert_eq!(manifest.tiles.len(), 1);
    assert_eq!(manifest.tiles[0].filename, format!("{}/{}.png", tile.x, tile.y));
    assert_eq!(manifest.timestamp, report.timestamp);

    let stitched = report.stitched_path.expect("stitched image");
    let image = codec::decode(&std::fs::read(stitched).unwrap()).unwrap();
    assert_eq!(image.dimensions(), (TILE_SIZE, TILE_SIZE));
}

#[tokio::test]
async fn test_failed_tile_is_written_as_placeholder_and_recorded() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    server.respond("http://tiles.test/1/1/1.png", MockResponse::status(404));
    let config = ScannerConfig::new(two_by_two_area(), 1, out.path()).with_stitch(true);
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    let report = scanner.run_once().await.unwrap();

    assert_eq!(report.tile_count, 4);
    assert_eq!(report.fetched, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.files_written, 4);
    assert_eq!(server.call_count(), report.tile_count);

    let manifest = read_manifest(&report.directory);
    assert_eq!(manifest.tiles.len(), report.tile_count);
    let failed = manifest
        .tiles
        .iter()
        .find(|t| t.filename == "1/1.png")
        .unwrap();
    assert_eq!(failed.http_status_code, 404);
    assert_eq!(failed.last_modified, chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);

    let placeholder = codec::decode(&std::fs::read(report.directory.join("1/1.png")).unwrap()).unwrap();
    assert_eq!(placeholder.get_pixel(0, 0).0, [0, 0, 0, 0]);

    let stitched =
        codec::decode(&std::fs::read(report.stitched_path.unwrap()).unwrap()).unwrap();
    assert_eq!(stitched.dimensions(), (2 * TILE_SIZE, 2 * TILE_SIZE));
    assert_eq!(stitched.get_pixel(0, 0).0, [40, 80, 120, 255]);
    assert_eq!(stitched.get_pixel(TILE_SIZE, 0).0, [40, 80, 120, 255]);
    assert_eq!(stitched.get_pixel(TILE_SIZE, TILE_SIZE).0, [0, 0, 0, 0]);
}

#[tokio::test]
async fn test_batch_without_stitching() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let config = ScannerConfig::new(two_by_two_area(), 1, out.path());
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    let report = scanner.run_once().await.unwrap();

    assert!(report.stitched_path.is_none());
    assert!(!report.directory.join(STITCHED_FILE).exists());
    assert_eq!(report.manifest_path, Some(report.directory.join(MANIFEST_FILE)));
}

#[tokio::test]
async fn test_batch_directory_is_named_after_timestamp() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let config = ScannerConfig::new(single_tile_area(), 4, out.path());
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    let report = scanner.run_once().await.unwrap();

    assert_eq!(
        report.directory,
        out.path().join(batch_dir_name(report.timestamp))
    );
}

#[tokio::test]
async fn test_unusable_output_directory_is_fatal() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let server = tile_server();
    let config = ScannerConfig::new(single_tile_area(), 4, &blocker);
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    let err = scanner.run_once().await.unwrap_err();
    assert!(matches!(err, ScanError::OutputDir { .. }));
    assert_eq!(server.call_count(), 0);

    let err = scanner.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ScanError::OutputDir { .. }));
}

#[tokio::test]
async fn test_invalid_area_rejected_at_construction() {
    let server = tile_server();
    let fetcher = TileFetcher::start(
        FetcherConfig::new(TileUrlTemplate::new("http://t/{x}/{y}").unwrap()),
        server,
        Arc::new(NoOpLogger),
        CancellationToken::new(),
    );
    let config = ScannerConfig::new(GeoBoundingBox::new(89.0, 0.0, 10.0, 1.0), 3, "unused");

    let result = Scanner::new(config, fetcher, Arc::new(NoOpLogger));
    assert!(matches!(result, Err(ScanError::InvalidArea(_))));
}

#[test]
fn test_sub_second_interval_rejected() {
    let config = ScannerConfig::new(single_tile_area(), 4, "unused");

    let too_short = config.clone().with_interval(Duration::from_millis(500));
    assert!(matches!(too_short.validate(), Err(ScanError::InvalidInterval)));

    let zero = config.clone().with_interval(Duration::ZERO);
    assert!(matches!(zero.validate(), Err(ScanError::InvalidInterval)));

    assert!(config.with_interval(MIN_INTERVAL).validate().is_ok());
}

#[tokio::test]
async fn test_run_executes_first_batch_immediately_and_stops() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let config = ScannerConfig::new(single_tile_area(), 4, out.path())
        .with_interval(Duration::from_secs(3600));
    let scanner = Arc::new(scanner(&server, config, Arc::new(NoOpLogger)));
    let shutdown = CancellationToken::new();

    let handle = {
        let scanner = Arc::clone(&scanner);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scanner.run(shutdown).await })
    };

    for _ in 0..400 {
        if server.call_count() == 1 && std::fs::read_dir(out.path()).unwrap().count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(server.call_count(), 1);

    shutdown.cancel();
    handle.await.unwrap().unwrap();

    assert_eq!(server.call_count(), 1);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_batch_logs_summary() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let logger = Arc::new(RecordingLogger::new());
    let config = ScannerConfig::new(two_by_two_area(), 1, out.path());
    let scanner = scanner(&server, config, logger.clone());

    scanner.run_once().await.unwrap();

    let summary = logger.with_message("Batch complete");
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].level, LogLevel::Info);
    assert_eq!(summary[0].field("tiles"), Some("4"));
    assert_eq!(summary[0].field("fetched"), Some("4"));
    assert_eq!(summary[0].field("failed"), Some("0"));

    assert_eq!(logger.with_message("Fetching tile").len(), 4);
    assert!(logger.at_level(LogLevel::Error).is_empty());
}

#[tokio::test]
async fn test_consecutive_batches_reuse_the_fetcher() {
    let out_a = TempDir::new().unwrap();
    let out_b = TempDir::new().unwrap();
    let server = tile_server();
    let scanner_a = scanner(
        &server,
        ScannerConfig::new(two_by_two_area(), 1, out_a.path()),
        Arc::new(NoOpLogger),
    );

    scanner_a.run_once().await.unwrap();
    let second = Scanner::new(
        ScannerConfig::new(two_by_two_area(), 1, out_b.path()),
        scanner_a.fetcher.clone(),
        Arc::new(NoOpLogger),
    )
    .unwrap();
    let report = second.run_once().await.unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(server.call_count(), 8);
    assert_eq!(scanner_a.fetcher.stats().completed, 8);
}

#[tokio::test]
async fn test_stopping_mid_batch_finishes_the_batch() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    server.set_latency(Duration::from_millis(100));
    let config = ScannerConfig::new(two_by_two_area(), 1, out.path())
        .with_interval(Duration::from_secs(3600));
    let scanner = Arc::new(scanner(&server, config, Arc::new(NoOpLogger)));
    let shutdown = CancellationToken::new();

    let handle = {
        let scanner = Arc::clone(&scanner);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scanner.run(shutdown).await })
    };

    // Cancel while the first tiles are still in flight
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let batches: Vec<_> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(batches.len(), 1);

    let manifest = read_manifest(&batches[0]);
    assert_eq!(manifest.tiles.len(), 4);
    assert!(manifest.tiles.iter().all(|t| t.http_status_code == 200));
    assert_eq!(server.call_count(), 4);
}

#[tokio::test]
async fn test_unwritable_column_skips_file_but_keeps_record() {
    let out = TempDir::new().unwrap();
    let server = tile_server();
    let config = ScannerConfig::new(two_by_two_area(), 1, out.path()).with_stitch(true);
    let scanner = scanner(&server, config, Arc::new(NoOpLogger));

    // A plain file where column 0's directory belongs
    let timestamp = chrono::Utc::now().trunc_subsecs(0);
    let directory = out.path().join(batch_dir_name(timestamp));
    std::fs::create_dir_all(&directory).unwrap();
    std::fs::write(directory.join("0"), b"not a directory").unwrap();

    let report = batch::execute(
        &scanner.fetcher,
        &scanner.logger,
        scanner.bounds().unwrap(),
        out.path(),
        timestamp,
        true,
    )
    .await;

    assert_eq!(report.tile_count, 4);
    assert_eq!(report.fetched, 4);
    assert_eq!(report.files_written, 2);
    assert!(directory.join("1").join("0.png").is_file());
    assert!(directory.join("1").join("1.png").is_file());

    let manifest = read_manifest(&directory);
    assert_eq!(manifest.tiles.len(), 4);
    assert!(manifest.tiles.iter().any(|t| t.filename == "0/0.png"));
    assert!(manifest.tiles.iter().any(|t| t.filename == "0/1.png"));

    // The map still holds every tile, so stitching succeeds
    assert!(report.stitched_path.is_some());
}
