use std::cell::RefCell;

use chrono::NaiveDate;
use serde_json::Value;
use swisscom_heatmaps::api::grids::{AreaIdentifier, GridKind};
use swisscom_heatmaps::api::HourlyWindow;
use swisscom_heatmaps::config::{GridDump, RunConfig};
use swisscom_heatmaps::{pipeline, ApiClient, ApiException, HeatmapsError};

const GRID: &str = r#"{"tiles":[{"tileId":1},{"tileId":2}]}"#;
const DENSITY: &str = r#"{"tiles":[{"score":1},{"score":1}]}"#;

/// Canned replies; the density endpoint fails from call `fail_at` on.
struct StubApi {
    fail_at: Option<usize>,
    density_calls: RefCell<usize>,
    requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl StubApi {
    fn new() -> Self {
        StubApi {
            fail_at: None,
            density_calls: RefCell::new(0),
            requests: RefCell::new(vec![]),
        }
    }

    fn failing_at(call: usize) -> Self {
        StubApi {
            fail_at: Some(call),
            ..StubApi::new()
        }
    }
}

impl ApiClient for StubApi {
    fn http_get(
        &self,
        path: &str,
        query_string: &[(String, String)],
    ) -> Result<String, anyhow::Error> {
        self.requests
            .borrow_mut()
            .push((path.to_string(), query_string.to_vec()));

        if path.starts_with("/grids/") {
            return Ok(GRID.to_string());
        }

        let call = {
            let mut calls = self.density_calls.borrow_mut();
            *calls += 1;
            *calls - 1
        };
        if self.fail_at.is_some_and(|n| call >= n) {
            return Err(HeatmapsError::Http {
                status: 500,
                kind: ApiException::UnknownError,
                body: "boom".to_string(),
            }
            .into());
        }
        Ok(DENSITY.to_string())
    }
}

fn day() -> RunConfig {
    let start = NaiveDate::from_ymd_opt(2020, 1, 27)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    RunConfig {
        area: AreaIdentifier::municipality(351),
        window: HourlyWindow::new(start, 24),
        max_tiles: 100,
        dumps: vec![],
    }
}

#[test]
fn full_day_sums_every_hour() {
    let api = StubApi::new();
    let output = pipeline::run(&api, &day()).unwrap();

    assert_eq!(output.tile_ids, vec![1, 2]);
    assert_eq!(output.scores.len(), 24);
    assert!(output.scores.iter().all(|(_, score)| score.as_i64() == Some(2)));

    let keys: Vec<&String> = output.scores.iter().map(|(k, _)| k).collect();
    assert_eq!(keys[0], "2020-01-27T00:00:00");
    assert_eq!(keys[23], "2020-01-27T23:00:00");
}

#[test]
fn requests_are_sequential_with_repeated_tiles() {
    let api = StubApi::new();
    pipeline::run(&api, &day()).unwrap();

    let requests = api.requests.borrow();
    assert_eq!(requests.len(), 25);
    assert_eq!(requests[0].0, "/grids/municipalities/351");
    assert!(requests[0].1.is_empty());

    assert_eq!(
        requests[1].0,
        "/heatmaps/dwell-density/hourly/2020-01-27T00:00:00"
    );
    assert_eq!(
        requests[1].1,
        vec![
            ("tiles".to_string(), "1".to_string()),
            ("tiles".to_string(), "2".to_string()),
        ]
    );
    assert_eq!(
        requests[24].0,
        "/heatmaps/dwell-density/hourly/2020-01-27T23:00:00"
    );
}

#[test]
fn max_tiles_limits_the_query() {
    let api = StubApi::new();
    let config = RunConfig {
        max_tiles: 1,
        window: HourlyWindow::new(day().window.start, 2),
        ..day()
    };
    let output = pipeline::run(&api, &config).unwrap();

    assert_eq!(output.tile_ids, vec![1]);
    assert_eq!(api.requests.borrow()[1].1.len(), 1);
    assert_eq!(output.scores.len(), 2);
}

#[test]
fn failure_on_hour_five_aborts_the_run() {
    let api = StubApi::failing_at(5);
    let err = pipeline::run(&api, &day()).unwrap_err();

    match err.downcast_ref::<HeatmapsError>() {
        Some(HeatmapsError::Http { status, .. }) => assert_eq!(*status, 500),
        other => panic!("unexpected error: {:?}", other),
    }
    // grid + hours 0..=5, nothing after the failing hour
    assert_eq!(api.requests.borrow().len(), 7);
    assert_eq!(*api.density_calls.borrow(), 6);
}

#[test]
fn grid_dumps_are_written_before_density_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid_3066.json");
    let config = RunConfig {
        dumps: vec![GridDump {
            kind: GridKind::PostalCodeArea,
            id: 3066,
            path: path.clone(),
        }],
        ..day()
    };

    let api = StubApi::failing_at(0);
    assert!(pipeline::run(&api, &config).is_err());

    // the dump survives the failed run
    let text = std::fs::read_to_string(&path).unwrap();
    let dumped: Value = serde_json::from_str(&text).unwrap();
    let expected: Value = serde_json::from_str(GRID).unwrap();
    assert_eq!(dumped, expected);
    assert_eq!(api.requests.borrow()[0].0, "/grids/postal-code-areas/3066");
}

#[test]
fn dump_into_missing_directory_aborts_before_density() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        dumps: vec![GridDump {
            kind: GridKind::Municipality,
            id: 6611,
            path: dir.path().join("missing").join("chansy_grid.json"),
        }],
        ..day()
    };

    let api = StubApi::new();
    assert!(pipeline::run(&api, &config).is_err());
    assert_eq!(*api.density_calls.borrow(), 0);
}
