use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use super::Context;
use crate::web::{HttpClient, SystemBrowser, UiOpener};

pub(super) fn run(ctx: &Context) -> Result<()> {
    open_ui(ctx, ctx.config.web_timeout())
}

/// Open the UI with the production browser launcher and HTTP probe.
pub(super) fn open_ui(ctx: &Context, timeout: Duration) -> Result<()> {
    let http = HttpClient::new().context("failed to build the HTTP client")?;
    let opener = UiOpener::new(
        Arc::clone(&ctx.orchestrator),
        Arc::new(SystemBrowser),
        Arc::new(http),
        ctx.config.ui_settings(),
    );
    opener.open_ui(timeout)?;
    Ok(())
}
