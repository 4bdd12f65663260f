//! Civil demo harness.
//!
//! Simulates a page with a single composer field and runs the full pipeline
//! against a live classifier endpoint: each line typed here goes through
//! debounced capture, classification, and the advisory surface exactly as
//! it would in an embedding, and panels are rendered as plain text. The
//! endpoint comes from `CIVIL_ANALYZE_URL`, then `~/.civil/config.toml`,
//! then the built-in default.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use civil_engine::{
    AdapterRegistry, Assistant, CivilConfig, ClassifierClient, QUIET_PERIOD, analyze_url,
};
use civil_page::{Control, ElementKind, Rect, fake::FakePage};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_civil_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, prefer "no logs" over interleaving them with the
    // interactive output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_civil_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = civil_log_file_candidates();
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn civil_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(config_path) = CivilConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("civil.log"));
    }

    // Fallback for constrained environments.
    candidates.push(PathBuf::from(".civil").join("logs").join("civil.log"));

    candidates
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = CivilConfig::load().unwrap_or_else(|e| {
        eprintln!("Ignoring config: {e}");
        None
    });
    let endpoint = analyze_url(config.as_ref());
    let client = ClassifierClient::new(&endpoint)?;

    let page = FakePage::new("https://example.com/demo");
    let composer = page.add_element(
        ElementKind::TextArea,
        Rect {
            x: 0.0,
            y: 24.0,
            width: 80.0,
            height: 3.0,
        },
    );
    let events = page.events();
    let assistant = Assistant::new(
        page.clone(),
        &AdapterRegistry::with_defaults(),
        client,
        events,
    );
    let worker = tokio::spawn(assistant.run());

    println!("civil demo harness - classifier at {endpoint}");
    println!("Type a message and press enter; Ctrl-D quits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        page.type_text(composer, message);

        // One debounce window plus a round trip to the classifier.
        tokio::time::sleep(QUIET_PERIOD + Duration::from_millis(700)).await;

        let Some((panel, spec)) = page.panels().pop() else {
            println!("  allowed: \"{}\"", page.text_of(composer));
            continue;
        };

        for line in &spec.lines {
            println!("  | {line}");
        }

        if spec.offer_rewrite {
            println!("  Accept the rewrite? [y/N]");
            let answer = lines.next_line().await?.unwrap_or_default();
            if answer.trim().eq_ignore_ascii_case("y") {
                page.click(panel, Control::AcceptRewrite);
            } else {
                page.click(panel, Control::Dismiss);
            }
        } else {
            page.click(panel, Control::Dismiss);
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("  composer now: \"{}\"", page.text_of(composer));
    }

    worker.abort();
    Ok(())
}
