//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `civitas_core` linkage with deterministic output.
//! - Optionally load a JSON snapshot and print one summary line per project.

use civitas_core::{open_backend, ProjectStore, SnapshotConfig, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("civitas_core ping={}", civitas_core::ping());
    println!("civitas_core version={}", civitas_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let config = StoreConfig {
        snapshot: SnapshotConfig::JsonFile { path: path.clone().into() },
        ..StoreConfig::default()
    };
    let opened = open_backend(&config.snapshot)
        .map_err(Into::into)
        .and_then(|backend| ProjectStore::open(config, backend));
    let store = match opened {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open snapshot `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("snapshot={path} projects={}", store.projects().len());
    for summary in store.summaries() {
        println!(
            "project={} progress={:.2}% claimable={:.2} remaining_budget={:.2} tasks_open={} claims={}",
            summary.project_id,
            summary.overall_progress,
            summary.total_claimable,
            summary.remaining_budget,
            summary.task_counts.pending + summary.task_counts.in_progress,
            summary.claim_count
        );
    }
    ExitCode::SUCCESS
}
