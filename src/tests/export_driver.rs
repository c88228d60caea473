use std::fs;

use tempfile::tempdir;

use crate::export::Exporter;
use crate::tests::common::{json, test_config, CapturedLogs, FakeFitnessApi, TEST_END_NS};

#[tokio::test]
async fn exports_listing_and_survives_failing_source() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let api = FakeFitnessApi::new(json!({"dataSource": ["src-A", "src-B"]}))
        .with_dataset("src-A", json!({"point": []}));

    let (logs, _guard) = CapturedLogs::install();
    let report = Exporter::new(&config, &api).run().await.unwrap();

    let exports = &config.paths.exports_dir;
    assert_eq!(
        fs::read_to_string(exports.join("datasources.json")).unwrap(),
        "{\n    \"dataSource\": [\n        \"src-A\",\n        \"src-B\"\n    ]\n}"
    );
    assert_eq!(
        fs::read_to_string(exports.join("dataset0.json")).unwrap(),
        "{\n    \"point\": []\n}"
    );
    assert!(!exports.join("dataset1.json").exists());

    assert_eq!(report.datasets, vec![exports.join("dataset0.json")]);
    assert_eq!(report.failed, vec!["src-B".to_owned()]);

    let errors = logs.errors();
    assert_eq!(errors.len(), 1, "unexpected errors: {:?}", errors);
    assert!(errors[0].contains("src-B"));
}

#[tokio::test]
async fn one_failing_fetch_does_not_stop_the_others() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let api = FakeFitnessApi::new(json!({"dataSource": ["s0", "s1", "s2", "s3"]}))
        .with_dataset("s0", json!({"point": [0]}))
        .with_dataset("s1", json!({"point": [1]}))
        .with_dataset("s3", json!({"point": [3]}));

    let report = Exporter::new(&config, &api).run().await.unwrap();

    let exports = &config.paths.exports_dir;
    for index in [0, 1, 3] {
        assert!(exports.join(format!("dataset{}.json", index)).exists());
    }
    assert!(!exports.join("dataset2.json").exists());
    assert_eq!(report.datasets.len(), 3);
    assert_eq!(report.failed, vec!["s2".to_owned()]);

    let fetched: Vec<String> = api.requested().into_iter().map(|(id, _)| id).collect();
    assert_eq!(fetched, vec!["s0", "s1", "s2", "s3"]);
}

#[tokio::test]
async fn every_fetch_uses_the_startup_window() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let api = FakeFitnessApi::new(json!({"dataSource": ["a", "b", "c"]}))
        .with_dataset("a", json!({}))
        .with_dataset("b", json!({}))
        .with_dataset("c", json!({}));

    Exporter::new(&config, &api).run().await.unwrap();

    let windows: Vec<_> = api.requested().into_iter().map(|(_, window)| window).collect();
    assert_eq!(windows.len(), 3);
    assert!(windows.iter().all(|w| w.start_ns == 0 && w.end_ns == TEST_END_NS));
}

#[tokio::test]
async fn listing_failure_aborts_the_run() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let api = FakeFitnessApi::failing_listing();

    let err = Exporter::new(&config, &api).run().await.unwrap_err();

    assert!(format!("{:#}", err).contains("listing data sources failed"));
    assert!(!config.paths.exports_dir.join("datasources.json").exists());
    assert!(api.requested().is_empty());
}

#[tokio::test]
async fn data_source_objects_are_identified_by_stream_id() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let listing = json!({"dataSource": [
        {"dataStreamId": "derived:com.google.weight:merged", "type": "derived"},
        {"type": "raw"},
        {"dataStreamId": "raw:com.google.weight:scale", "type": "raw"},
    ]});
    let api = FakeFitnessApi::new(listing)
        .with_dataset("derived:com.google.weight:merged", json!({"point": [{"value": [{"fpVal": 70.5}]}]}))
        .with_dataset("raw:com.google.weight:scale", json!({"point": []}));

    let report = Exporter::new(&config, &api).run().await.unwrap();

    let exports = &config.paths.exports_dir;
    assert!(exports.join("dataset0.json").exists());
    assert!(!exports.join("dataset1.json").exists());
    assert!(exports.join("dataset2.json").exists());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].contains("raw"));
}

#[tokio::test]
async fn listing_without_sources_writes_only_the_listing() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let api = FakeFitnessApi::new(json!({}));

    let report = Exporter::new(&config, &api).run().await.unwrap();

    assert_eq!(report.listing, Some(config.paths.exports_dir.join("datasources.json")));
    assert!(report.datasets.is_empty());
    assert!(report.failed.is_empty());
    let entries = fs::read_dir(&config.paths.exports_dir).unwrap().count();
    assert_eq!(entries, 1);
}
