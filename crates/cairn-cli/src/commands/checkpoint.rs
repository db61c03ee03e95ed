use anyhow::Result;
use cairn_core::checkpoint::{
    CheckpointFilterPatch, CreateCheckpointOptions, FieldPatch, RestoreCheckpointOptions, SortField, SortOrder,
    checkpoint_summary, filter_checkpoints, format_checkpoint_age, is_checkpoint_expired,
};
use chrono::{Duration, Utc};

use super::Context;

/// Command-line overrides for a checkpoint listing.
pub struct ListQuery {
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

pub async fn list(ctx: &Context, session_id: &str, query: ListQuery) -> Result<()> {
    let tags = (!query.tags.is_empty()).then_some(query.tags);
    let patch = CheckpointFilterPatch {
        limit: Some(query.limit.unwrap_or(ctx.config.checkpoints.default_limit)),
        sort_by: query.sort_by,
        sort_order: query.order,
        tags: FieldPatch::from_option(tags.clone()),
        search: FieldPatch::from_option(query.search.clone()),
        // flags not given on this run drop whatever an earlier run stored
        ..CheckpointFilterPatch::for_session(session_id).clear_narrowing()
    };
    let loaded = ctx.store.load_checkpoints(patch).await?;

    let checkpoints = filter_checkpoints(
        &loaded,
        query.search.as_deref(),
        tags.as_deref().unwrap_or_default(),
    );
    if checkpoints.is_empty() {
        println!("No checkpoints for session {}", session_id);
        return Ok(());
    }

    let now = Utc::now();
    let max_age = Duration::days(ctx.config.checkpoints.max_age_days);
    for checkpoint in &checkpoints {
        let expired = if is_checkpoint_expired(checkpoint, max_age, now) {
            " (expired)"
        } else {
            ""
        };
        println!(
            "{}  {}  {}{}",
            checkpoint.id,
            checkpoint_summary(checkpoint),
            format_checkpoint_age(checkpoint.created_at, now),
            expired
        );
    }
    Ok(())
}

pub async fn create(
    ctx: &Context,
    session_id: &str,
    name: &str,
    options: CreateCheckpointOptions,
) -> Result<()> {
    ctx.open_session(session_id).await?;
    let checkpoint_id = ctx.store.create_checkpoint(name, options).await?;
    println!("✅ Created checkpoint {}", checkpoint_id);
    Ok(())
}

pub async fn restore(
    ctx: &Context,
    checkpoint_id: &str,
    backup: bool,
    backup_name: Option<String>,
) -> Result<()> {
    let options = if backup {
        RestoreCheckpointOptions::with_backup(backup_name)
    } else {
        RestoreCheckpointOptions::default()
    };
    ctx.store.restore_checkpoint(checkpoint_id, options).await?;

    let session_id = ctx
        .store
        .current_session()
        .map(|s| s.id)
        .unwrap_or_default();
    println!("✅ Restored checkpoint {} into session {}", checkpoint_id, session_id);
    Ok(())
}

pub async fn delete(ctx: &Context, checkpoint_id: &str) -> Result<()> {
    if let Err(e) = ctx.store.delete_checkpoint(checkpoint_id).await {
        if e.is_not_found() {
            anyhow::bail!("Checkpoint {} does not exist", checkpoint_id);
        }
        return Err(e.into());
    }
    println!("🗑️  Deleted checkpoint {}", checkpoint_id);
    Ok(())
}
