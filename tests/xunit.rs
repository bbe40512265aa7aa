use std::{fs, time::Duration};

use tally::{
    event::Run,
    writer::{out::WritableString, Xunit},
    Config, Event, Failure, TestResult, Writer as _,
};

fn events() -> Vec<Run> {
    let pass = TestResult::new("adds")
        .within(["Calc", "math"])
        .in_file("tests/calc.rs")
        .took(Duration::from_millis(5));
    let pending = TestResult::new("divides").within(["Calc", "math"]);
    let fail = TestResult::new("compares <strings>")
        .within(["Calc"])
        .took(Duration::from_millis(1500));

    vec![
        Run::Started { total: 3 },
        Run::test_started(pass.clone()),
        Run::test_passed(pass.clone()),
        Run::test_finished(pass),
        Run::test_started(pending.clone()),
        Run::test_pending(pending.clone()),
        Run::test_finished(pending),
        Run::test_started(fail.clone()),
        Run::test_failed(
            fail.clone(),
            Failure::new("\"foo\" != \"bar\"").with_values("foo", "bar"),
        ),
        Run::test_finished(fail),
        Run::Finished,
    ]
}

#[tokio::test]
async fn writes_testsuite() {
    let config = Config {
        suite_name: "Calc & Co".into(),
        use_colors: true,
        ..Config::default()
    };
    let mut writer = Xunit::new(WritableString::default(), &config).unwrap();
    for ev in events() {
        writer.handle_event(Event::new(ev)).await;
    }
    let xml = writer.into_output().0;

    assert!(
        xml.starts_with(
            "<testsuite name=\"Calc &amp; Co\" tests=\"3\" failures=\"0\" \
             errors=\"1\" skipped=\"1\" timestamp=\"",
        ),
        "{xml}",
    );
    assert!(xml.ends_with("</testsuite>\n"), "{xml}");
    assert!(xml.contains(
        "<testcase classname=\"Calc math\" name=\"adds\" \
         file=\"tests/calc.rs\" time=\"0.005\"/>\n",
    ));
    assert!(xml.contains(
        "<testcase classname=\"Calc math\" name=\"divides\" file=\"\" \
         time=\"0\"><skipped/></testcase>\n",
    ));
    assert!(xml.contains(
        "<testcase classname=\"Calc\" name=\"compares &lt;strings&gt;\" \
         file=\"\" time=\"1.5\"><failure>&quot;foo&quot; != &quot;bar&quot;",
    ));
    assert!(xml.contains("      -foo\n      +bar"), "{xml}");
    assert!(!xml.contains('\u{1b}'), "diff must not be colored: {xml:?}");
}

#[tokio::test]
async fn writes_to_file_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/xunit.xml");
    let config = Config {
        output: Some(path.clone()),
        ..Config::default()
    };
    let mut writer = Xunit::new(WritableString::default(), &config).unwrap();
    for ev in events() {
        writer.handle_event(Event::new(ev)).await;
    }

    assert!(writer.into_output().is_empty());
    let xml = fs::read_to_string(path).unwrap();
    assert!(xml.starts_with("<testsuite name=\"Tally Tests\""), "{xml}");
}
