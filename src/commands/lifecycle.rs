use anyhow::{Context as _, Result};

use super::Context;

/// Start the containers, then wait long enough for the UI to come up.
pub(super) fn start(ctx: &Context) -> Result<()> {
    ctx.orchestrator
        .run(&["start"])
        .context("failed to start containers")?;
    super::web::open_ui(ctx, ctx.config.start_timeout())
}

pub(super) fn stop(ctx: &Context) -> Result<()> {
    ctx.orchestrator
        .run(&["stop"])
        .context("failed to stop containers")
}
