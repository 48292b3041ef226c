use std::io::Write;

use tempfile::NamedTempFile;

use resource_monitor::{
    CollectingReporter, FeedCapability, MonitorConfig, MonitorSession, SessionState,
    file_capability,
};

fn write_entry(file: &mut NamedTempFile, url: &str, initiator_type: &str) {
    writeln!(
        file,
        r#"{{"name":"{url}","entryType":"resource","initiatorType":"{initiator_type}","duration":3.2}}"#
    )
    .unwrap();
    file.flush().unwrap();
}

#[test]
fn file_session_reports_snapshot_and_tailed_duplicates() {
    let mut file = NamedTempFile::new().unwrap();
    write_entry(&mut file, "https://cdn/app.js?v=1", "script");
    write_entry(&mut file, "https://cdn/app.js?v=2", "script");
    write_entry(&mut file, "https://cdn/site.css", "link");

    let reporter = CollectingReporter::default();
    let capability = file_capability(file.path());
    let mut session =
        MonitorSession::start(MonitorConfig::default(), move || capability, reporter.clone());
    assert_eq!(session.state(), SessionState::Active);
    assert!(session.has_live_subscription());
    assert_eq!(
        reporter.messages(),
        vec!["A script resource was loaded multiple times: https://cdn/app.js"]
    );

    write_entry(&mut file, "https://cdn/site.css", "link");
    write_entry(&mut file, "https://cdn/app.js?v=3", "script");
    assert_eq!(session.pump(), 1);
    assert_eq!(
        reporter.messages().last().map(String::as_str),
        Some("A link resource was loaded multiple times: https://cdn/site.css")
    );
    assert_eq!(session.aggregator().unwrap().history_len(), 5);

    session.stop();
    write_entry(&mut file, "https://cdn/late.js", "script");
    write_entry(&mut file, "https://cdn/late.js", "script");
    assert_eq!(session.pump(), 0);
    assert_eq!(reporter.len(), 2);
}

#[test]
fn missing_capture_leaves_session_idle() {
    let dir = tempfile::tempdir().unwrap();
    let capability = file_capability(dir.path().join("absent.jsonl"));
    assert!(matches!(capability, FeedCapability::Unavailable { .. }));
    let reporter = CollectingReporter::default();
    let session = MonitorSession::start(MonitorConfig::default(), move || capability, reporter);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.aggregator().is_none());
}
