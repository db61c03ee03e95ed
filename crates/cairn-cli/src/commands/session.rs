use anyhow::{Context as _, Result};
use cairn_core::session::{NewSessionConfig, WorkspaceState};
use std::path::Path;

use super::Context;

pub async fn create(
    ctx: &Context,
    user: String,
    workspace: String,
    name: String,
    state: Option<&Path>,
) -> Result<()> {
    let mut config = NewSessionConfig::new(user, workspace, name);
    if let Some(path) = state {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let workspace_state: WorkspaceState = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON object", path.display()))?;
        config = config.with_workspace_state(workspace_state);
    }

    let session_id = ctx.store.create_new_session(config).await?;
    println!("✅ Created session {}", session_id);
    Ok(())
}

pub async fn show(ctx: &Context, session_id: &str) -> Result<()> {
    ctx.open_session(session_id).await?;

    let state = ctx.store.snapshot();
    let session = state
        .current_session
        .context("Session disappeared after restore")?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    if let Some(workspace) = &state.workspace_state {
        println!("Workspace keys: {}", workspace.len());
    }
    println!("Checkpoints: {}", state.checkpoints.len());
    Ok(())
}
