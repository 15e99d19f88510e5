use anyhow::{Context as _, Result};

use super::Context;

/// `down --volumes`, plus `--rmi all` when images should go too.
pub fn prune_args(images: bool) -> Vec<&'static str> {
    let mut args = vec!["down", "--volumes"];
    if images {
        args.extend(["--rmi", "all"]);
    }
    args
}

pub(super) fn run(ctx: &Context, images: bool) -> Result<()> {
    ctx.orchestrator
        .run(&prune_args(images))
        .context("failed to prune containers and resources")
}
