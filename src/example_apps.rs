use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::MonitorConfig;
use crate::constants::transport::DEFAULT_POLL_INTERVAL_MS;
use crate::errors::MonitorError;
use crate::feed::FeedCapability;
use crate::reporter::{ConsoleReporter, Reporter, TracingReporter};
use crate::session::{MonitorSession, SessionState};
use crate::transport::file_capability;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReporterArg {
    Console,
    Tracing,
}

#[derive(Debug, Parser)]
#[command(
    name = "scan_demo",
    disable_help_subcommand = true,
    about = "Report resources loaded more than once",
    long_about = "Scan a JSON-lines capture of resource-timing entries and report every resource that was loaded multiple times.",
    after_help = "Each line is one entry such as {\"name\":\"https://cdn/app.js\",\"initiatorType\":\"script\"}. With --follow-polls the capture is tailed for appended lines."
)]
/// CLI for `scan_demo`.
///
/// Common usage:
/// - Scan a finished capture: `scan_demo capture.jsonl --summary`
/// - Track images too: `--initiator-type script --initiator-type img`
/// - Keep cache-busting queries distinct: `--keep-query`
struct ScanDemoCli {
    #[arg(value_name = "PATH", help = "JSON-lines resource capture to scan")]
    capture: PathBuf,
    #[arg(
        long = "config",
        value_name = "CONFIG_JSON",
        help = "Optional JSON config file ({\"initiatorTypes\":[...],\"ignoreQuery\":bool,\"disabled\":bool})"
    )]
    config: Option<PathBuf>,
    #[arg(
        long = "initiator-type",
        value_name = "TYPE",
        help = "Initiator type to track, repeat as needed (replaces the configured set)"
    )]
    initiator_types: Vec<String>,
    #[arg(long = "keep-query", help = "Treat URLs that differ only by query as distinct")]
    keep_query: bool,
    #[arg(
        long = "follow-polls",
        default_value_t = 0,
        help = "Number of times to poll the capture for appended lines"
    )]
    follow_polls: usize,
    #[arg(
        long = "poll-interval-ms",
        default_value_t = DEFAULT_POLL_INTERVAL_MS,
        help = "Delay between polls when following"
    )]
    poll_interval_ms: u64,
    #[arg(long, value_enum, default_value = "console", help = "Where warnings are written")]
    reporter: ReporterArg,
    #[arg(long, help = "Print every duplicated resource with its load count at the end")]
    summary: bool,
}

/// Scan a resource capture for duplicate loads.
///
/// `args_iter` excludes the program name.
pub fn run_scan_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<ScanDemoCli, _>(std::iter::once("scan_demo".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = resolve_config(&cli)?;
    let capability = match file_capability(&cli.capture) {
        FeedCapability::Unavailable { reason } => {
            return Err(MonitorError::FeedUnavailable { reason }.into());
        }
        available => available,
    };
    let sink = cli.reporter;
    let reporter = move |message: &str| match sink {
        ReporterArg::Console => ConsoleReporter.report(message),
        ReporterArg::Tracing => TracingReporter.report(message),
    };

    let mut session = MonitorSession::start(config, move || capability, reporter);
    if session.state() == SessionState::Idle {
        println!("resource monitor is disabled; nothing scanned");
        return Ok(());
    }
    for _ in 0..cli.follow_polls {
        thread::sleep(Duration::from_millis(cli.poll_interval_ms));
        session.pump();
    }

    if let Some(aggregator) = session.aggregator() {
        let groups = aggregator.duplicate_groups();
        println!(
            "scanned {} records, {} duplicated resources",
            aggregator.history_len(),
            groups.len()
        );
        if cli.summary {
            for group in &groups {
                println!(
                    "  {:>4}x [{}] {}",
                    group.occurrences, group.initiator_type, group.identity_key
                );
            }
        }
    }
    session.stop();
    Ok(())
}

fn resolve_config(cli: &ScanDemoCli) -> Result<MonitorConfig, MonitorError> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => MonitorConfig::default(),
    };
    if !cli.initiator_types.is_empty() {
        config = config.with_initiator_types(cli.initiator_types.iter().cloned());
    }
    if cli.keep_query {
        config = config.with_ignore_query(false);
    }
    Ok(config)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn help_exits_cleanly() {
        assert!(run_scan_demo(args(&["--help"])).is_ok());
    }

    #[test]
    fn missing_capture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("capture.jsonl");
        let err = run_scan_demo(args(&[missing.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn scans_capture_with_summary() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name":"https://cdn/a.js?v=1","initiatorType":"script"}}"#).unwrap();
        writeln!(file, r#"{{"name":"https://cdn/a.js?v=2","initiatorType":"script"}}"#).unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let result = run_scan_demo(args(&[
            path.as_str(),
            "--summary",
            "--follow-polls",
            "1",
            "--poll-interval-ms",
            "1",
        ]));
        assert!(result.is_ok());
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = ScanDemoCli::try_parse_from([
            "scan_demo",
            "capture.jsonl",
            "--initiator-type",
            "img",
            "--keep-query",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert!(config.tracks("img"));
        assert!(!config.tracks("script"));
        assert!(!config.ignore_query);
    }

    #[test]
    fn config_file_is_applied() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"disabled": true}}"#).unwrap();
        file.flush().unwrap();
        let cli = ScanDemoCli::try_parse_from([
            "scan_demo",
            "capture.jsonl",
            "--config",
            file.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(resolve_config(&cli).unwrap().disabled);
    }
}
