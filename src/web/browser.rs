use std::io;
use std::process::{Command, Stdio};

/// Opens a URL in the user's browser.
pub trait BrowserLauncher: Send + Sync {
    fn open_url(&self, url: &str) -> io::Result<()>;
}

/// Launches the platform's default browser through its opener command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl SystemBrowser {
    /// Candidate commands, tried in order until one can be spawned.
    fn candidates(url: &str) -> Vec<Vec<String>> {
        let url = url.to_string();
        if cfg!(target_os = "macos") {
            vec![vec!["open".into(), url]]
        } else if cfg!(windows) {
            vec![vec![
                "rundll32".into(),
                "url.dll,FileProtocolHandler".into(),
                url,
            ]]
        } else {
            ["xdg-open", "x-www-browser", "www-browser"]
                .into_iter()
                .map(|program| vec![program.to_string(), url.clone()])
                .collect()
        }
    }
}

impl BrowserLauncher for SystemBrowser {
    fn open_url(&self, url: &str) -> io::Result<()> {
        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no browser opener available");

        for argv in Self::candidates(url) {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            tracing::debug!(%program, %url, "launching browser");

            let status = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();

            match status {
                Ok(s) if s.success() => return Ok(()),
                Ok(s) => {
                    return Err(io::Error::other(format!("{program} exited with {s}")));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => last_err = e,
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }
}
