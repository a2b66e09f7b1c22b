// src/commands/sync.rs
//! Sync command: copy packages into the repository and regenerate metadata

use crate::cli::Cli;
use anyhow::{Context, Result};
use reposync::packages::rpm::RpmExtractor;
use reposync::progress::IndexSide;
use reposync::repository::ScanErrorPolicy;
use reposync::{
    ChangeKind, LogObserver, ProcessRunner, RegenerationTrigger, SyncConfig, SyncEvent,
    SyncObserver, SyncReport, Synchronizer, UpdatePolicy,
};
use std::time::Duration;
use tracing::info;

/// Narrates a run on stdout for `--verbose`
struct ConsoleObserver<'a> {
    config: &'a SyncConfig,
}

impl SyncObserver for ConsoleObserver<'_> {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            // An empty source ends the run before anything is narrated
            SyncEvent::Indexed {
                side: IndexSide::Source,
                names,
                ..
            } if !names.is_empty() => {
                println!("=== reposync");
                println!("== Copying packages to repository");
                println!("=  From: {}", self.config.source.display());
                println!("=  To: {}", self.config.destination.display());
                println!("=  Found packages to copy: {:?}", names);
            }
            SyncEvent::Indexed {
                side: IndexSide::Destination,
                names,
                ..
            } => println!("=  Found existing packages: {:?}", names),
            SyncEvent::Indexed { .. } => {}
            SyncEvent::Skipped { side, failure } => println!(
                "=  Skipped unreadable {} file: {} ({})",
                side,
                failure.path.display(),
                failure.reason
            ),
            SyncEvent::Planned { .. } => {}
            SyncEvent::Placing { name, .. } => println!("   -package: {}", name),
            SyncEvent::Placed(placement) => match placement.kind {
                ChangeKind::Update if self.config.update_policy == UpdatePolicy::Backup => {
                    println!("    -backed up and moved")
                }
                _ => println!("    -moved"),
            },
            SyncEvent::Regenerating { .. } => {
                if let Some(trigger) = &self.config.regenerate {
                    println!(
                        "== Running {} in directory {}",
                        trigger.program(),
                        self.config.destination.display()
                    );
                }
            }
            SyncEvent::Regenerated => {}
        }
    }
}

/// Translate command-line flags into a sync configuration
pub fn build_config(cli: &Cli) -> SyncConfig {
    let regenerate = if cli.no_regenerate || cli.execute.is_empty() {
        None
    } else {
        Some(
            RegenerationTrigger::new(cli.execute.clone())
                .verbose(cli.verbose)
                .with_timeout(cli.timeout.map(Duration::from_secs)),
        )
    };

    SyncConfig::new(&cli.source, &cli.destination)
        .recursive(cli.recursive)
        .purge(cli.purge)
        .duplicates(cli.on_duplicate.into())
        .scan_errors(if cli.strict {
            ScanErrorPolicy::Abort
        } else {
            ScanErrorPolicy::Skip
        })
        .regenerate(regenerate)
        .dry_run(cli.dry_run)
}

/// Run a sync as described by the command line
pub fn cmd_sync(cli: &Cli) -> Result<SyncReport> {
    let config = build_config(cli);
    info!(
        "Syncing {} into {}",
        config.source.display(),
        config.destination.display()
    );

    let console = ConsoleObserver { config: &config };
    let observer: &dyn SyncObserver = if cli.verbose { &console } else { &LogObserver };

    let report = Synchronizer::new(&config, &RpmExtractor, &ProcessRunner)
        .with_observer(observer)
        .run()
        .with_context(|| {
            format!(
                "Sync of {} into {} failed",
                config.source.display(),
                config.destination.display()
            )
        })?;

    if report.dry_run {
        print_plan(&config, &report);
    }

    Ok(report)
}

fn print_plan(config: &SyncConfig, report: &SyncReport) {
    let plan = &report.reconciliation;
    if plan.is_empty() {
        println!("[DRY-RUN] Nothing to do");
        return;
    }

    for name in &plan.to_add {
        println!("[DRY-RUN] Would add {}", name);
    }
    for name in &plan.to_update {
        let verb = match config.update_policy {
            UpdatePolicy::Backup => "back up and replace",
            UpdatePolicy::Purge => "purge and replace",
        };
        println!("[DRY-RUN] Would {} {}", verb, name);
    }
    if let Some(trigger) = &config.regenerate {
        println!("[DRY-RUN] Would run {}", trigger.program());
    }
}
