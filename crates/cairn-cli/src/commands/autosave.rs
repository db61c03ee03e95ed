use anyhow::Result;
use cairn_application::{AutoSaveReport, AutoSaveScheduler, SaveOptions, SaveOutcome};

use super::Context;

pub async fn run(ctx: &Context, session_id: &str, interval_ms: Option<u64>) -> Result<()> {
    ctx.open_session(session_id).await?;

    let mut scheduler = AutoSaveScheduler::new();
    let mut reports = scheduler.subscribe();
    let configured = ctx
        .config
        .auto_save
        .enabled
        .then_some(ctx.config.auto_save.interval_ms);
    match interval_ms.or(configured) {
        Some(interval) => scheduler.start(ctx.store.clone(), interval)?,
        None => scheduler.start_from_store(ctx.store.clone())?,
    }

    if !scheduler.is_running() {
        println!("Auto-save is disabled; nothing to do");
        return Ok(());
    }
    println!("Auto-saving session {} (Ctrl-C to stop)", session_id);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(report) = reports.borrow_and_update().clone() {
                    print_report(&report);
                }
            }
        }
    }

    scheduler.shutdown().await;
    if !ctx.store.save_session(SaveOptions::default()).await {
        tracing::warn!("[AutoSave] Final save of {} failed", session_id);
    }
    println!("Stopped");
    Ok(())
}

fn print_report(report: &AutoSaveReport) {
    let at = report.at.format("%H:%M:%S");
    match &report.outcome {
        SaveOutcome::Saved => println!("[{}] saved", at),
        SaveOutcome::Clean => println!("[{}] no changes", at),
        SaveOutcome::NoActiveSession => println!("[{}] no active session", at),
        SaveOutcome::InProgress => println!("[{}] previous save still running", at),
        SaveOutcome::Failed(message) => println!(
            "[{}] save failed ({} in a row): {}",
            at, report.consecutive_failures, message
        ),
    }
}
