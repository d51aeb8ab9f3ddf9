use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::blocking::{Body, Client, Response};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Transport-level failures, surfaced unchanged to the publisher.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Session error: {0}")]
    Session(String),
}

/// Credentials for the Fusion session API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Authentication realm; Fusion ships with "native".
    pub realm: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: "native".to_string(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

/// A fully-constructed upload awaiting delivery.
///
/// The body is referenced by path rather than held as a stream so that an
/// authentication retry can reopen the file and stream it again.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: Url,
    pub content_type: &'static str,
    pub body_path: PathBuf,
}

/// Authenticated delivery capability.
///
/// Implementations own credential attachment and any retry on session
/// expiry. A returned error is final; callers do not retry.
pub trait Transport {
    fn send(&self, request: &UploadRequest) -> Result<(), TransportError>;
}

// Uploads of large models can legitimately take a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

const SESSION_PATH: &str = "/api/session";

/// Cookie-session transport for the Fusion API.
///
/// Logs in through the session endpoint at construction and replays a
/// request once if the session has expired by the time it is sent.
pub struct SessionClient {
    client: Client,
    session_url: Url,
    credentials: Credentials,
}

impl SessionClient {
    /// Connect to the API at `api_origin` (e.g. `http://fusion:8764`) and
    /// establish a session for `credentials`.
    pub fn new(api_origin: &Url, credentials: Credentials) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let mut session_url = api_origin
            .join(SESSION_PATH)
            .map_err(|e| TransportError::Session(e.to_string()))?;
        session_url
            .query_pairs_mut()
            .append_pair("realmName", &credentials.realm);

        let transport = Self {
            client,
            session_url,
            credentials,
        };
        transport.establish_session()?;
        Ok(transport)
    }

    fn establish_session(&self) -> Result<(), TransportError> {
        info!(
            "Establishing session for {} at {}",
            self.credentials.username, self.session_url
        );
        let response = self
            .client
            .post(self.session_url.clone())
            .json(&serde_json::json!({
                "username": self.credentials.username,
                "password": self.credentials.password,
            }))
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransportError::Auth(format!(
                "session rejected for user {}",
                self.credentials.username
            ))),
            status => Err(TransportError::Session(format!(
                "session endpoint returned {}",
                status
            ))),
        }
    }

    fn put_once(&self, request: &UploadRequest) -> Result<Response, TransportError> {
        let file = File::open(&request.body_path).map_err(|e| {
            TransportError::Network(format!(
                "cannot open upload body {}: {}",
                request.body_path.display(),
                e
            ))
        })?;
        self.client
            .put(request.url.clone())
            .header(reqwest::header::CONTENT_TYPE, request.content_type)
            .body(Body::new(file))
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

impl Transport for SessionClient {
    fn send(&self, request: &UploadRequest) -> Result<(), TransportError> {
        let mut response = self.put_once(request)?;

        // An expired session comes back as 401; log in again and replay once.
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(
                "Session expired during upload to {}, re-authenticating",
                request.url
            );
            self.establish_session()?;
            response = self.put_once(request)?;
        }

        let status = response.status();
        if status.is_success() {
            debug!("Upload to {} returned {}", request.url, status);
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(TransportError::Http(status.as_u16(), body))
        }
    }
}
