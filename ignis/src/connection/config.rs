//! Connection configuration.
use std::{borrow::Cow, env::var, fmt, time::Duration};

use crate::protocol::ProtocolVersion;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 10800;
const DEFAULT_PAGE_SIZE: i32 = 1024;

/// Thin client connection config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) version: ProtocolVersion,
    pub(crate) page_size: i32,
    pub(crate) timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            version: ProtocolVersion::default(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl Config {
    /// Retrieve configuration from environment variable.
    ///
    /// It reads `IGNITE_URL` first, then each of the following overrides its
    /// value:
    /// - `IGNITE_HOST`
    /// - `IGNITE_PORT`
    /// - `IGNITE_PAGE_SIZE`
    ///
    /// Missing or invalid values fallback to default.
    pub fn from_env() -> Config {
        let mut config = var("IGNITE_URL")
            .ok()
            .and_then(|url| Config::parse(&url).ok())
            .unwrap_or_default();

        if let Ok(host) = var("IGNITE_HOST") {
            config.host = host;
        }
        if let Some(port) = var("IGNITE_PORT").ok().and_then(|e| e.parse().ok()) {
            config.port = port;
        }
        if let Some(size) = var("IGNITE_PAGE_SIZE").ok().and_then(|e| e.parse().ok()) {
            config.page_size = size;
        }

        config
    }

    /// Parse config from url.
    ///
    /// ```text
    /// ignite://host[:port][?version=1.1.0&page_size=1024&timeout_ms=500]
    /// ```
    pub fn parse(url: &str) -> Result<Config, ParseError> {
        let mut read = url;

        macro_rules! eat {
            ($delim:literal, $id:literal) => {{
                let Some(idx) = read.find($delim) else {
                    return Err(ParseError { reason: concat!($id, " missing").into() });
                };
                let capture = &read[..idx];
                read = &read[idx + $delim.len()..];
                capture
            }};
        }

        let scheme = eat!("://", "scheme");
        if scheme != "ignite" {
            return Err(ParseError { reason: format!("unknown scheme {scheme:?}").into() });
        }

        let (authority, query) = match read.split_once('?') {
            Some((authority, query)) => (authority, Some(query)),
            None => (read, None),
        };
        let authority = authority.trim_end_matches('/');

        let mut config = Config::default();

        match authority.rsplit_once(':') {
            Some((host, port)) => {
                let Ok(port) = port.parse() else {
                    return Err(ParseError { reason: "invalid port".into() });
                };
                config.host = host.into();
                config.port = port;
            }
            None => config.host = authority.into(),
        }

        if config.host.is_empty() {
            return Err(ParseError { reason: "host missing".into() });
        }

        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|e| !e.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "version" => {
                    let Ok(version) = value.parse() else {
                        return Err(ParseError { reason: "invalid version".into() });
                    };
                    config.version = version;
                }
                "page_size" => match value.parse() {
                    Ok(size) if size > 0 => config.page_size = size,
                    _ => return Err(ParseError { reason: "invalid page_size".into() }),
                },
                "timeout_ms" => {
                    let Ok(ms) = value.parse() else {
                        return Err(ParseError { reason: "invalid timeout_ms".into() });
                    };
                    config.timeout = Some(Duration::from_millis(ms));
                }
                key => {
                    return Err(ParseError { reason: format!("unknown parameter {key:?}").into() });
                }
            }
        }

        Ok(config)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set protocol version sent on handshake.
    pub fn version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Set default number of rows per cursor page.
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set deadline of each round trip.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_host(&self) -> &str {
        &self.host
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn get_page_size(&self) -> i32 {
        self.page_size
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl std::str::FromStr for Config {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error when parsing url.
pub struct ParseError {
    pub(crate) reason: Cow<'static, str>,
}

impl std::error::Error for ParseError { }

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f.write_str(&self.reason);
        }
        write!(f, "failed to parse url: {}", self.reason)
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_full() {
        let config = Config::parse("ignite://node1:10801?version=1.2.0&page_size=64&timeout_ms=500")
            .unwrap();
        assert_eq!(config.host, "node1");
        assert_eq!(config.port, 10801);
        assert_eq!(config.version, ProtocolVersion::new(1, 2, 0));
        assert_eq!(config.page_size, 64);
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn parse_defaults() {
        let config: Config = "ignite://localhost".parse().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 10800);
        assert_eq!(config.page_size, 1024);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn parse_errors() {
        assert!(Config::parse("localhost:10800").is_err());
        assert!(Config::parse("postgres://localhost").is_err());
        assert!(Config::parse("ignite://localhost:port").is_err());
        assert!(Config::parse("ignite://localhost?page_size=0").is_err());
        assert!(Config::parse("ignite://localhost?color=red").is_err());
        assert_eq!(
            format!("{:#}", Config::parse("ignite://:1").unwrap_err()),
            "host missing"
        );
    }
}
