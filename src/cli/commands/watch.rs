//! `watch`: poll until interrupted.

use anyhow::Result;
use console::style;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::commands::connect;
use crate::cli::output::unit_line;
use crate::cli::types::ScopeArgs;
use crate::domain::models::{Config, UnitReport};
use crate::services::{PollEvent, PollLoop};

const EVENT_BUFFER: usize = 64;

/// Poll until Ctrl-C, printing each reported unit as it arrives.
pub async fn execute(
    mut config: Config,
    scope: &ScopeArgs,
    interval: Option<u64>,
    json: bool,
) -> Result<()> {
    scope.apply(&mut config);
    if let Some(secs) = interval {
        config.monitor.interval_secs = secs.max(1);
    }
    let (cluster, agent) = connect(&config)?;

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let handle = PollLoop::new(cluster, agent, &config.monitor)
        .with_events(tx)
        .spawn();

    if !json {
        let scope = if config.monitor.namespaces.is_empty() {
            "all namespaces".to_string()
        } else {
            config.monitor.namespaces.join(", ")
        };
        println!(
            "Watching {} every {}s (Ctrl-C to stop)",
            style(scope).bold(),
            config.monitor.interval_secs
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => print_event(&event, json),
                None => break,
            },
            _ = &mut shutdown => {
                info!("interrupt received, stopping after the current tick");
                handle.stop();
                break;
            }
        }
    }
    drop(rx);
    handle.join().await;
    Ok(())
}

fn print_event(event: &PollEvent, json: bool) {
    match event {
        PollEvent::UnitReported {
            tick,
            unit,
            diagnosis,
        } => {
            let Some(row) = UnitReport::from_diagnosis(unit, diagnosis) else {
                return;
            };
            if json {
                println!("{}", json!({ "event": "unit_reported", "tick": tick, "report": row }));
            } else {
                println!("{}", unit_line(&row));
            }
        }
        PollEvent::UnitFailed { tick, unit, error } => {
            if json {
                println!(
                    "{}",
                    json!({ "event": "unit_failed", "tick": tick, "unit": unit.key(), "error": error })
                );
            } else {
                println!("{} {unit}: {error}", style("!").yellow().bold());
            }
        }
        PollEvent::TickCompleted { tick, report } => {
            if json {
                println!(
                    "{}",
                    json!({
                        "event": "tick_completed",
                        "tick": tick,
                        "units_checked": report.units_checked,
                        "units_reported": report.reports.len(),
                        "units_clean": report.units_clean,
                        "units_errored": report.units_errored,
                    })
                );
            } else {
                println!(
                    "{}",
                    style(format!(
                        "tick {tick}: {} checked, {} with failures, {} errored",
                        report.units_checked,
                        report.reports.len(),
                        report.units_errored
                    ))
                    .dim()
                );
            }
        }
        PollEvent::TickStarted { .. } => {}
    }
}
