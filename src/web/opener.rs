use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::compose::{CancelToken, ComposeError, Orchestrator};
use crate::config::UiSettings;

use super::{BrowserLauncher, HttpProbe, ServiceAddress, Spinner, SpinnerStyle};

/// Shared sink for the banner and spinner frames.
pub type Output = Arc<Mutex<dyn Write + Send>>;

const SPINNER_MESSAGE: &str = "Initializing source{d}...";

#[derive(Debug, Error)]
pub enum UiError {
    /// The working directory is unusable; reported as-is.
    #[error(transparent)]
    Environment(ComposeError),

    #[error("could not find the public port of {0}")]
    PortNotFound(String),

    #[error("could not open the browser at {url}")]
    Browser {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error opening the UI, the container is not running after {0:?}")]
    Timeout(Duration),

    #[error("the UI readiness task stopped unexpectedly")]
    TaskLost,
}

/// Outcome of asking docker-compose for the UI's published port.
#[derive(Debug)]
pub enum Readiness {
    /// Retrying can't help.
    FailFast(ComposeError),
    /// Raw `port` output, not yet trimmed.
    Ready(String),
    NotReady(ComposeError),
}

/// Waits for the UI service to publish its port and opens it in a browser.
pub struct UiOpener {
    orchestrator: Arc<dyn Orchestrator>,
    browser: Arc<dyn BrowserLauncher>,
    http: Arc<dyn HttpProbe>,
    settings: UiSettings,
    output: Output,
    style: SpinnerStyle,
}

impl UiOpener {
    pub fn new(
        orchestrator: Arc<dyn Orchestrator>,
        browser: Arc<dyn BrowserLauncher>,
        http: Arc<dyn HttpProbe>,
        settings: UiSettings,
    ) -> Self {
        Self {
            orchestrator,
            browser,
            http,
            settings,
            output: Arc::new(Mutex::new(std::io::stdout())),
            style: SpinnerStyle::detect(),
        }
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn with_spinner_style(mut self, style: SpinnerStyle) -> Self {
        self.style = style;
        self
    }

    /// Open the UI, giving the service up to `timeout` to come up.
    ///
    /// Environment errors abort before anything is printed. Otherwise the
    /// banner is shown, a spinner runs for long timeouts, and the first of
    /// completion or timeout decides the result. A reported timeout means
    /// the browser is never opened; a launch already under way when the
    /// timer fires is waited for instead.
    pub fn open_ui(&self, timeout: Duration) -> Result<(), UiError> {
        let ready = match self.check() {
            Readiness::FailFast(err) => return Err(UiError::Environment(err)),
            Readiness::Ready(raw) => Some(raw),
            Readiness::NotReady(err) => {
                tracing::debug!(error = %err, "UI not ready yet, polling");
                None
            }
        };

        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let task = PollTask {
            orchestrator: Arc::clone(&self.orchestrator),
            browser: Arc::clone(&self.browser),
            http: Arc::clone(&self.http),
            settings: self.settings.clone(),
            cancel: cancel.clone(),
        };
        std::thread::spawn(move || task.run(ready, tx));

        self.print_banner();

        let spinner = (timeout > self.settings.spinner_threshold)
            .then(|| Spinner::start(SPINNER_MESSAGE, self.style, Arc::clone(&self.output)));

        let result = match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                if cancel.cancel() {
                    Err(UiError::Timeout(timeout))
                } else {
                    // The task had already committed to launching the browser.
                    rx.recv().unwrap_or(Err(UiError::TaskLost))
                }
            }
            Err(RecvTimeoutError::Disconnected) => Err(UiError::TaskLost),
        };

        if let Some(spinner) = spinner {
            spinner.stop();
        }
        result
    }

    fn check(&self) -> Readiness {
        check_port(self.orchestrator.as_ref(), &self.settings)
    }

    fn print_banner(&self) {
        let s = &self.settings;
        let banner = format!(
            "\nOnce source{{d}} is fully initialized, the UI will be available, by default at:\n  \
             http://127.0.0.1:{}\n  user:{}\n  pass:{}\n",
            s.port, s.user, s.password
        );
        match self.output.lock() {
            Ok(mut w) => {
                if let Err(e) = writeln!(w, "{banner}").and_then(|_| w.flush()) {
                    tracing::warn!(error = %e, "failed to print UI banner");
                }
            }
            Err(_) => tracing::warn!("output lock poisoned, skipping UI banner"),
        }
    }
}

fn check_port(orchestrator: &dyn Orchestrator, settings: &UiSettings) -> Readiness {
    let mut stdout = Vec::new();
    let port = settings.port.to_string();
    match orchestrator.run_with_io(&mut stdout, &["port", &settings.service, &port]) {
        Ok(()) => Readiness::Ready(String::from_utf8_lossy(&stdout).into_owned()),
        Err(err) if err.is_fail_fast() => Readiness::FailFast(err),
        Err(err) => Readiness::NotReady(err),
    }
}

/// The background half of `open_ui`: poll, resolve, wait for HTTP, launch.
struct PollTask {
    orchestrator: Arc<dyn Orchestrator>,
    browser: Arc<dyn BrowserLauncher>,
    http: Arc<dyn HttpProbe>,
    settings: UiSettings,
    cancel: CancelToken,
}

impl PollTask {
    fn run(self, ready: Option<String>, tx: Sender<Result<(), UiError>>) {
        if let Some(outcome) = self.resolve_and_open(ready) {
            // The receiver is gone once open_ui has returned.
            let _ = tx.send(outcome);
        }
    }

    /// `None` means the task was cancelled and has nothing to report.
    fn resolve_and_open(&self, ready: Option<String>) -> Option<Result<(), UiError>> {
        let raw = match ready {
            Some(raw) => raw,
            None => self.wait_for_port()?,
        };

        let Some(address) = ServiceAddress::parse(&raw) else {
            return Some(Err(UiError::PortNotFound(self.settings.service.clone())));
        };
        let url = address.url();
        tracing::info!(%address, %url, "UI port published");

        if !self.wait_for_http(&url) || !self.cancel.claim() {
            return None;
        }

        Some(
            self.browser
                .open_url(&url)
                .map_err(|source| UiError::Browser { url, source }),
        )
    }

    fn wait_for_port(&self) -> Option<String> {
        loop {
            std::thread::sleep(self.settings.poll_interval);
            if self.cancel.is_cancelled() {
                return None;
            }
            match check_port(self.orchestrator.as_ref(), &self.settings) {
                Readiness::Ready(raw) => return Some(raw),
                Readiness::FailFast(err) | Readiness::NotReady(err) => {
                    tracing::debug!(error = %err, "UI port not published yet");
                }
            }
        }
    }

    /// Returns false if cancelled before the URL answered.
    fn wait_for_http(&self, url: &str) -> bool {
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            if self.http.is_reachable(url) {
                return true;
            }
            std::thread::sleep(self.settings.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Published(&'static str),
        NotRunning,
        NoWorkdir,
    }

    /// Replays scripted `port` results, repeating the last one forever.
    struct ScriptedCompose {
        script: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedCompose {
        fn new(script: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Orchestrator for ScriptedCompose {
        fn run(&self, _args: &[&str]) -> Result<(), ComposeError> {
            Ok(())
        }

        fn run_with_io(&self, stdout: &mut dyn Write, args: &[&str]) -> Result<(), ComposeError> {
            assert_eq!(args, ["port", "sourced-ui", "8088"]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let step = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                *script.front().unwrap()
            };
            match step {
                Step::Published(out) => {
                    stdout.write_all(out.as_bytes())?;
                    Ok(())
                }
                Step::NotRunning => Err(ComposeError::Io(std::io::Error::other(
                    "no container found",
                ))),
                Step::NoWorkdir => Err(ComposeError::DirNotExist("/nowhere".into())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingBrowser {
        opened: Mutex<Vec<String>>,
    }

    impl BrowserLauncher for RecordingBrowser {
        fn open_url(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    struct AlwaysUp;

    impl HttpProbe for AlwaysUp {
        fn is_reachable(&self, _url: &str) -> bool {
            true
        }
    }

    fn fast_settings() -> UiSettings {
        UiSettings {
            poll_interval: Duration::from_millis(10),
            ..UiSettings::default()
        }
    }

    fn opener(
        compose: Arc<ScriptedCompose>,
        browser: Arc<RecordingBrowser>,
        settings: UiSettings,
    ) -> (UiOpener, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let out: Output = buf.clone();
        let opener = UiOpener::new(compose, browser, Arc::new(AlwaysUp), settings)
            .with_output(out)
            .with_spinner_style(SpinnerStyle::ASCII);
        (opener, buf)
    }

    fn text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buf.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn ready_service_opens_loopback_url() {
        let compose = ScriptedCompose::new(vec![Step::Published("0.0.0.0:8088\n")]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, buf) = opener(compose.clone(), browser.clone(), fast_settings());

        opener.open_ui(Duration::from_secs(2)).unwrap();

        assert_eq!(*browser.opened.lock().unwrap(), vec!["http://127.0.0.1:8088"]);
        assert_eq!(compose.calls(), 1);
        assert!(text(&buf).contains("http://127.0.0.1:8088\n  user:admin\n  pass:admin"));
    }

    #[test]
    fn polls_until_port_is_published() {
        let compose = ScriptedCompose::new(vec![
            Step::NotRunning,
            Step::NotRunning,
            Step::Published("0.0.0.0:8088"),
        ]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, _buf) = opener(compose.clone(), browser.clone(), fast_settings());

        opener.open_ui(Duration::from_secs(2)).unwrap();

        assert_eq!(compose.calls(), 3);
        assert_eq!(browser.opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn fail_fast_returns_immediately_without_spinner() {
        let compose = ScriptedCompose::new(vec![Step::NoWorkdir]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, buf) = opener(compose.clone(), browser.clone(), fast_settings());

        let err = opener.open_ui(Duration::from_secs(10)).unwrap_err();

        assert!(matches!(err, UiError::Environment(ComposeError::DirNotExist(_))));
        assert_eq!(err.to_string(), "directory /nowhere does not exist");
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(compose.calls(), 1);
        assert!(text(&buf).is_empty());
        assert!(browser.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn blank_port_output_is_an_error() {
        let compose = ScriptedCompose::new(vec![Step::Published("  \n")]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, _buf) = opener(compose, browser.clone(), fast_settings());

        let err = opener.open_ui(Duration::from_secs(2)).unwrap_err();

        assert_eq!(err.to_string(), "could not find the public port of sourced-ui");
        assert!(browser.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn timeout_is_bounded_and_cancels_the_task() {
        let compose = ScriptedCompose::new(vec![Step::NotRunning]);
        let browser = Arc::new(RecordingBrowser::default());
        let settings = UiSettings {
            poll_interval: Duration::from_millis(50),
            ..UiSettings::default()
        };
        let (opener, _buf) = opener(compose.clone(), browser, settings);

        let timeout = Duration::from_millis(150);
        let started = Instant::now();
        let err = opener.open_ui(timeout).unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, UiError::Timeout(d) if d == timeout));
        assert_eq!(
            err.to_string(),
            "error opening the UI, the container is not running after 150ms"
        );
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(50) + Duration::from_millis(100));

        // The poll task notices the cancellation within one interval.
        std::thread::sleep(Duration::from_millis(120));
        let settled = compose.calls();
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(compose.calls(), settled);
    }

    #[test]
    fn short_timeout_shows_no_spinner() {
        let compose = ScriptedCompose::new(vec![Step::Published("0.0.0.0:8088")]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, buf) = opener(compose, browser, fast_settings());

        opener.open_ui(Duration::from_secs(2)).unwrap();

        assert!(!text(&buf).contains(SPINNER_MESSAGE));
    }

    #[test]
    fn long_timeout_spinner_is_stopped_on_success() {
        let compose = ScriptedCompose::new(vec![Step::NotRunning, Step::Published("0.0.0.0:8088")]);
        let browser = Arc::new(RecordingBrowser::default());
        let (opener, buf) = opener(compose, browser, fast_settings());

        opener.open_ui(Duration::from_secs(10)).unwrap();

        let out = text(&buf);
        assert!(out.ends_with(&format!("{SPINNER_MESSAGE}\n")));
        assert_eq!(out.matches(&format!("{SPINNER_MESSAGE}\n")).count(), 1);
    }
}
