// CLI surface: argument parsing and dispatch to docker-compose.

mod lifecycle;
mod prune;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::compose::Orchestrator;
use crate::config::Config;

pub use prune::prune_args;

#[derive(Debug, Parser)]
#[command(name = "sourced", version, about = "Run source{d} CE on top of docker-compose")]
pub struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of <home>/config.yml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory to use instead of the active one.
    #[arg(long, global = true, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the web interface in your browser.
    #[command(
        long_about = "Open the web interface in your browser, by default at: http://127.0.0.1:8088 user:admin pass:admin"
    )]
    Web,

    /// Stop and remove containers and resources.
    #[command(
        long_about = "Stops containers and removes containers, networks, and volumes.\nImages are not deleted unless you specify the --images flag."
    )]
    Prune(PruneArgs),

    /// Start stopped containers and open the web interface.
    Start,

    /// Stop running containers without removing them.
    Stop,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct PruneArgs {
    /// Remove docker images.
    #[arg(long)]
    pub images: bool,
}

/// What every command runs against.
pub struct Context {
    pub config: Config,
    pub orchestrator: Arc<dyn Orchestrator>,
}

pub fn execute(command: &Command, ctx: &Context) -> Result<()> {
    tracing::debug!(?command, "executing");
    match command {
        Command::Web => web::run(ctx),
        Command::Prune(args) => prune::run(ctx, args.images),
        Command::Start => lifecycle::start(ctx),
        Command::Stop => lifecycle::stop(ctx),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::Mutex;

    use crate::compose::{ComposeError, Orchestrator};

    /// Records every `run` invocation; `run_with_io` always fails fast.
    #[derive(Default)]
    pub struct RecordingCompose {
        pub runs: Mutex<Vec<Vec<String>>>,
    }

    impl Orchestrator for RecordingCompose {
        fn run(&self, args: &[&str]) -> Result<(), ComposeError> {
            self.runs
                .lock()
                .unwrap()
                .push(args.iter().map(|a| a.to_string()).collect());
            Ok(())
        }

        fn run_with_io(&self, _stdout: &mut dyn Write, _args: &[&str]) -> Result<(), ComposeError> {
            Err(ComposeError::DirNotValid("/not-a-workdir".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_web() {
        let cli = Cli::try_parse_from(["sourced", "web"]).unwrap();
        assert!(matches!(cli.command, Command::Web));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_prune_with_images() {
        let cli = Cli::try_parse_from(["sourced", "prune", "--images"]).unwrap();
        match cli.command {
            Command::Prune(args) => assert!(args.images),
            other => panic!("expected prune, got: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["sourced", "stop", "-vv", "--workdir", "/tmp/wd"]).unwrap();
        assert!(matches!(cli.command, Command::Stop));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.workdir, Some(PathBuf::from("/tmp/wd")));
    }

    #[test]
    fn web_takes_no_flags() {
        assert!(Cli::try_parse_from(["sourced", "web", "--images"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["sourced"]).is_err());
    }
}
