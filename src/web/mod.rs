// Opening the web UI: readiness polling, browser launch, terminal spinner.

pub mod address;
pub mod browser;
pub mod opener;
pub mod probe;
pub mod spinner;

pub use address::ServiceAddress;
pub use browser::{BrowserLauncher, SystemBrowser};
pub use opener::{Output, Readiness, UiError, UiOpener};
pub use probe::{HttpClient, HttpProbe};
pub use spinner::{Spinner, SpinnerStyle};
