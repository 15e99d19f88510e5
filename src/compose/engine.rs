use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{ComposeError, Orchestrator};

/// Runs docker-compose inside a resolved working directory.
#[derive(Debug, Clone)]
pub struct Compose {
    program: String,
    prefix: Vec<String>,
    workdir: WorkdirSource,
}

#[derive(Debug, Clone)]
enum WorkdirSource {
    /// Resolved on every call, so environment errors surface per invocation.
    Lookup {
        home: PathBuf,
        explicit: Option<PathBuf>,
    },
    Fixed(PathBuf),
}

impl Compose {
    /// Build a runner from a shell-style command line such as `docker compose`.
    pub fn new(command: &str, home: PathBuf, explicit: Option<PathBuf>) -> Result<Self, ComposeError> {
        let (program, prefix) = split_command(command)?;
        Ok(Self {
            program,
            prefix,
            workdir: WorkdirSource::Lookup { home, explicit },
        })
    }

    /// A runner pinned to `dir`, skipping working directory validation.
    pub fn in_dir(command: &str, dir: impl Into<PathBuf>) -> Result<Self, ComposeError> {
        let (program, prefix) = split_command(command)?;
        Ok(Self {
            program,
            prefix,
            workdir: WorkdirSource::Fixed(dir.into()),
        })
    }

    fn workdir(&self) -> Result<PathBuf, ComposeError> {
        match &self.workdir {
            WorkdirSource::Lookup { home, explicit } => {
                super::workdir::resolve(home, explicit.as_deref())
            }
            WorkdirSource::Fixed(dir) => Ok(dir.clone()),
        }
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix).args(args).current_dir(dir);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ComposeError {
        ComposeError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Orchestrator for Compose {
    fn run(&self, args: &[&str]) -> Result<(), ComposeError> {
        let dir = self.workdir()?;
        tracing::info!(workdir = %dir.display(), ?args, "running docker-compose");

        let status = self
            .command(&dir, args)
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(ComposeError::Failed {
                args: args.join(" "),
                status,
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn run_with_io(&self, stdout: &mut dyn Write, args: &[&str]) -> Result<(), ComposeError> {
        let dir = self.workdir()?;
        tracing::debug!(workdir = %dir.display(), ?args, "running docker-compose");

        let mut child = self
            .command(&dir, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drained separately; a full stderr pipe would stall the child.
        let stderr_handle = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        if let Some(mut out) = child.stdout.take()
            && let Err(e) = std::io::copy(&mut out, stdout)
        {
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = stderr_handle {
                let _ = handle.join();
            }
            return Err(e.into());
        }

        let status = child.wait()?;
        let stderr = stderr_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(ComposeError::Failed {
                args: args.join(" "),
                status,
                stderr,
            });
        }
        Ok(())
    }
}

/// Split a compose command line into the program and its leading arguments.
fn split_command(command: &str) -> Result<(String, Vec<String>), ComposeError> {
    let bad = |reason: String| ComposeError::BadCommand {
        command: command.to_string(),
        reason,
    };
    let mut words = shell_words::split(command).map_err(|e| bad(e.to_string()))?;
    if words.is_empty() {
        return Err(bad("command is empty".to_string()));
    }
    let program = words.remove(0);
    Ok((program, words))
}
