//! wsflood CLI
//!
//! Command-line front-end for the wsflood load generator. Opens many
//! concurrent WebSocket sessions against an echo endpoint, each sending
//! periodic randomized messages until its randomized lifetime (plus a
//! fixed grace) elapses, then prints the check report and run summary.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wsflood_core::{DrawRange, RunConfig, Runner, StdoutEventSink};

/// wsflood - concurrent WebSocket echo-session load generator
#[derive(Parser, Debug)]
#[command(name = "wsflood")]
#[command(version, about, long_about = None)]
struct Args {
    /// Target WebSocket endpoint
    #[arg(
        short,
        long,
        env = "WSFLOOD_URL",
        default_value = "ws://127.0.0.1:9010/echo"
    )]
    url: String,

    /// Number of concurrently running simulated users
    #[arg(long, default_value_t = 700)]
    vus: u32,

    /// Total number of session executions
    #[arg(long, default_value_t = 700)]
    iterations: u32,

    /// Lower bound of the session lifetime draw, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    session_min_ms: u64,

    /// Upper bound (exclusive) of the session lifetime draw, in milliseconds
    #[arg(long, default_value_t = 60_000)]
    session_max_ms: u64,

    /// Lower bound of the send-interval draw, in milliseconds
    #[arg(long, default_value_t = 2)]
    interval_min_ms: u64,

    /// Upper bound (exclusive) of the send-interval draw, in milliseconds
    #[arg(long, default_value_t = 20)]
    interval_max_ms: u64,

    /// Grace added to the session lifetime before the forceful close
    #[arg(long, default_value_t = 3_000)]
    grace_ms: u64,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Session metadata tag as key=value (repeatable)
    #[arg(short, long = "tag", value_name = "KEY=VALUE")]
    tags: Vec<String>,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Split a `key=value` tag argument
fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid tag '{raw}', expected key=value")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = RunConfig {
        url: args.url,
        vus: args.vus,
        iterations: args.iterations,
        session_duration_ms: DrawRange::new(args.session_min_ms, args.session_max_ms),
        send_interval_ms: DrawRange::new(args.interval_min_ms, args.interval_max_ms),
        close_grace_ms: args.grace_ms,
        ..Default::default()
    };
    for raw in &args.tags {
        match parse_tag(raw) {
            Ok((key, value)) => {
                config.tags.insert(key, value);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let json_output = matches!(args.format, OutputFormat::Json);
    let sink = Arc::new(StdoutEventSink::new(json_output));

    let runner = match Runner::new(config, sink) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let summary = runner.run().await;
    let report = runner.checks().report();

    if json_output {
        let out = serde_json::json!({
            "checks": report,
            "summary": summary,
        });
        println!("{out}");
    } else {
        for (name, stats) in &report {
            let mark = if stats.all_passed() { "✓" } else { "✗" };
            println!("{mark} {name}: {} passed, {} failed", stats.passes, stats.fails);
        }
        println!(
            "sessions={} connected={} failed={} sent={} received={} elapsed={}ms",
            summary.sessions,
            summary.connected,
            summary.failed,
            summary.sent,
            summary.received,
            summary.elapsed_ms
        );
    }

    // Check failures are reporting, not control flow; only a bad
    // configuration exits nonzero.
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag("my_tag=my ws session"),
            Ok(("my_tag".to_string(), "my ws session".to_string()))
        );
        assert_eq!(
            parse_tag("empty="),
            Ok(("empty".to_string(), String::new()))
        );
        assert!(parse_tag("no-separator").is_err());
        assert!(parse_tag("=value").is_err());
    }

    #[test]
    fn test_args_defaults() {
        use clap::CommandFactory;
        Args::command().debug_assert();

        let args = Args::parse_from(["wsflood"]);
        assert_eq!(args.vus, 700);
        assert_eq!(args.iterations, 700);
        assert_eq!(args.session_min_ms, 10_000);
        assert_eq!(args.session_max_ms, 60_000);
        assert_eq!(args.interval_min_ms, 2);
        assert_eq!(args.interval_max_ms, 20);
        assert_eq!(args.grace_ms, 3_000);
        assert_eq!(args.url, "ws://127.0.0.1:9010/echo");
    }
}
