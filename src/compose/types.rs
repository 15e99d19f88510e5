use std::io::Write;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

/// Errors from locating the working directory or running docker-compose.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("working directory {path} is malformed: {reason}")]
    WorkdirMalformed { path: PathBuf, reason: String },

    #[error("directory {0} does not exist")]
    DirNotExist(PathBuf),

    #[error("{0} is not a valid directory")]
    DirNotValid(PathBuf),

    #[error("invalid compose command {command:?}: {reason}")]
    BadCommand { command: String, reason: String },

    #[error("failed to invoke `{program}`, is it installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("docker-compose {args} failed ({status}){}", stderr_suffix(.stderr))]
    Failed {
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("i/o error while running docker-compose")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ComposeError {
    /// Environment errors that no amount of retrying will fix.
    pub fn is_fail_fast(&self) -> bool {
        matches!(
            self,
            Self::WorkdirMalformed { .. } | Self::DirNotExist(_) | Self::DirNotValid(_)
        )
    }
}

/// The external orchestration tool, as seen by the commands.
///
/// `args` follow docker-compose's own subcommand vocabulary
/// (`port <service> <port>`, `down --volumes`, ...).
pub trait Orchestrator: Send + Sync {
    /// Run with the terminal attached.
    fn run(&self, args: &[&str]) -> Result<(), ComposeError>;

    /// Run with stdout copied into `stdout`. Stderr is captured and only
    /// reported on failure.
    fn run_with_io(&self, stdout: &mut dyn Write, args: &[&str]) -> Result<(), ComposeError>;
}

const PENDING: u8 = 0;
const CLAIMED: u8 = 1;
const CANCELLED: u8 = 2;

/// One-shot race between finishing background work and abandoning it.
///
/// The worker calls [`claim`](Self::claim) right before its side effect; the
/// waiter calls [`cancel`](Self::cancel) when it gives up. Exactly one of
/// them wins.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicU8>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel unless the work was already claimed. Returns whether the
    /// token is cancelled afterwards.
    pub fn cancel(&self) -> bool {
        match self
            .0
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(state) => state == CANCELLED,
        }
    }

    /// Commit to finishing the work. Fails once cancelled.
    pub fn claim(&self) -> bool {
        match self
            .0
            .compare_exchange(PENDING, CLAIMED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(state) => state == CLAIMED,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire) == CANCELLED
    }
}
