use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{PublishError, Result};

/// Port the Fusion API listens on when the host string does not name one.
pub const DEFAULT_PORT: u16 = 8764;

/// Parsed Fusion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionHost {
    pub host: String,
    pub port: u16,
}

impl FusionHost {
    /// HTTP origin for this endpoint, e.g. `http://fusion:8764`.
    pub fn origin_url(&self) -> Result<Url> {
        let origin = format!("http://{}:{}", self.host, self.port);
        Url::parse(&origin)
            .map_err(|e| PublishError::Config(format!("invalid Fusion endpoint {}: {}", origin, e)))
    }
}

impl FromStr for FusionHost {
    type Err = PublishError;

    /// Accepts `hostname` or `hostname:port`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [host] if !host.is_empty() => Ok(FusionHost {
                host: host.to_string(),
                port: DEFAULT_PORT,
            }),
            [host, port] if !host.is_empty() => {
                let port = port.parse::<u16>().map_err(|_| {
                    PublishError::Config(format!("invalid port {:?} in host {:?}", port, s))
                })?;
                Ok(FusionHost {
                    host: host.to_string(),
                    port,
                })
            }
            _ => Err(PublishError::Config(format!("invalid host {:?}", s))),
        }
    }
}

impl fmt::Display for FusionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
