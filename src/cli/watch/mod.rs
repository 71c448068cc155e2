//! `watch`: rerun the pass whenever the input tree settles after a change.
//!
//! ```text
//! notify ──► Debouncer (300ms quiet) ──► run_pass (same plugin, same cache)
//!                ▲
//! Ctrl+C ────────┴── stops the loop between passes
//! ```

mod debouncer;

use anyhow::{Context, Result, ensure};
use crossbeam::channel::{never, select, unbounded};
use notify::{RecursiveMode, Watcher};

use super::PassArgs;
use super::build::{pass_paths, run_pass, setup};
use crate::config::PrependOptions;
use crate::core::{is_shutdown, register_shutdown};
use crate::logger::{status_error, status_success};
use crate::utils::path::overlaps;
use debouncer::{ChangeKind, Debouncer};

pub fn watch(options: PrependOptions, args: &PassArgs) -> Result<()> {
    let (input, output) = pass_paths(args);
    ensure!(
        !overlaps(input.path(), &output),
        "output `{}` must not be inside input `{}` (or the other way round)",
        output.display(),
        input.path().display()
    );

    let shutdown_rx = register_shutdown().unwrap_or_else(never);

    // Watcher first, so changes made during the initial pass are not lost
    let (notify_tx, notify_rx) = unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = notify_tx.send(res);
    })
    .context("failed to create file watcher")?;
    watcher
        .watch(input.path(), RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch `{}`", input.path().display()))?;

    let mut plugin = setup(options, args, output.clone());
    report(run_pass(&mut plugin, &input, &output));
    crate::log!("watch"; "watching {} for changes", input.path().display());

    let mut debouncer = Debouncer::new();
    while !is_shutdown() {
        select! {
            recv(notify_rx) -> msg => match msg {
                Ok(Ok(event)) => debouncer.add_event(&event),
                Ok(Err(e)) => crate::log!("watch"; "watcher error: {}", e),
                Err(_) => break,
            },
            recv(shutdown_rx) -> _ => break,
            default(debouncer.sleep_duration()) => {}
        }

        if let Some(changes) = debouncer.take_if_ready() {
            let removed = changes
                .values()
                .filter(|kind| **kind == ChangeKind::Removed)
                .count();
            crate::debug!("watch"; "{} changed, {} removed",
                changes.len() - removed, removed);
            report(run_pass(&mut plugin, &input, &output));
        }
    }

    Ok(())
}

fn report(result: Result<String>) {
    match result {
        Ok(summary) => status_success(&summary),
        Err(e) => status_error("pass failed", &format!("{e:#}")),
    }
}
