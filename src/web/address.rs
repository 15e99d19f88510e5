use std::fmt;

/// Host used in place of a wildcard bind address.
pub const LOOPBACK: &str = "127.0.0.1";

const WILDCARDS: [&str; 3] = ["0.0.0.0", "::", "[::]"];

/// A `host:port` pair as reported by `docker-compose port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    host: String,
    port: Option<String>,
}

impl ServiceAddress {
    /// Parse the first non-blank line of `raw`. `None` if there is nothing to parse.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
        let (host, port) = match line.rsplit_once(':') {
            Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
                (host.to_string(), Some(port.to_string()))
            }
            _ => (line.to_string(), None),
        };
        Some(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// The bind address is fine for listening but not for connecting;
    /// wildcard hosts become the loopback address.
    pub fn connect_address(&self) -> Self {
        let host = if WILDCARDS.contains(&self.host.as_str()) {
            LOOPBACK.to_string()
        } else {
            self.host.clone()
        };
        Self {
            host,
            port: self.port.clone(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.connect_address())
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}
