use std::time::Duration;

/// Answers whether something is serving HTTP at a URL.
pub trait HttpProbe: Send + Sync {
    fn is_reachable(&self, url: &str) -> bool;
}

/// Blocking HTTP client that treats any response, whatever its status, as reachable.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

impl HttpProbe for HttpClient {
    fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).send() {
            Ok(resp) => {
                tracing::debug!(%url, status = %resp.status(), "UI answered");
                true
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "UI not answering yet");
                false
            }
        }
    }
}
