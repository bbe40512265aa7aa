use std::{fs, time::Duration};

use serde_json::{json, Value};
use tally::{
    event::Run,
    failure::Cause,
    writer::{out::WritableString, Format, Json, Reporter},
    Config, Event, Failure, TestResult, Writer as _,
};

fn events() -> Vec<Run> {
    let pass = TestResult::new("passes")
        .within(["suite"])
        .in_file("tests/a.rs")
        .took(Duration::from_millis(50));
    let pending = TestResult::new("waits").within(["suite"]);
    let fail = TestResult::new("fails")
        .within(["suite"])
        .took(Duration::from_millis(3));

    let slot = Cause::pending();
    let failure = Failure::new("broken").linked_to(slot.clone());
    slot.resolve(failure.clone()).unwrap();

    vec![
        Run::Started { total: 3 },
        Run::test_started(pass.clone()),
        Run::test_passed(pass.clone()),
        Run::test_finished(pass),
        Run::test_started(pending.clone()),
        Run::test_pending(pending.clone()),
        Run::test_finished(pending),
        Run::test_started(fail.clone()),
        Run::test_failed(fail.clone(), failure),
        Run::test_finished(fail),
        Run::Finished,
    ]
}

#[tokio::test]
async fn writes_report_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports/run.json");
    let config = Config {
        output: Some(path.clone()),
        ..Config::default()
    };

    let mut writer = Json::new(WritableString::default(), &config).unwrap();
    for ev in events() {
        writer.handle_event(Event::new(ev)).await;
    }
    assert!(writer.into_output().is_empty());

    let report: Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(report["stats"]["tests"], 3);
    assert_eq!(report["stats"]["passes"], 1);
    assert_eq!(report["stats"]["pending"], 1);
    assert_eq!(report["stats"]["failures"], 1);
    assert!(report["stats"]["start"].as_str().unwrap().ends_with('Z'));

    assert_eq!(
        report["passes"][0],
        json!({
            "title": "passes",
            "fullTitle": "suite passes",
            "file": "tests/a.rs",
            "duration": 50,
            "currentRetry": 0,
            "speed": "medium",
            "err": {},
        }),
    );
    assert_eq!(report["pending"][0]["title"], "waits");
    assert_eq!(
        report["failures"][0]["err"],
        json!({"message": "broken", "cause": "[Circular]"}),
    );
    assert_eq!(report["tests"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn reporter_writes_json_to_console() {
    let config = Config {
        format: Format::Json,
        ..Config::default()
    };
    let mut reporter =
        Reporter::new(WritableString::default(), &config).unwrap();
    for ev in events() {
        reporter.handle_event(Event::new(ev)).await;
    }

    let report: Value =
        serde_json::from_str(&reporter.into_output().0).unwrap();
    assert_eq!(report["failures"][0]["fullTitle"], "suite fails");
}
