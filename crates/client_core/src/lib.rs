use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RouteSet,
    protocol::{PathsRequest, PathsResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod error;

pub use error::ClientError;

const PATHS_ENDPOINT: &str = "api/paths";
const USER_AGENT: &str = concat!("path-finder/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait RoutingClient: Send + Sync {
    async fn find_paths(&self, request: &PathsRequest) -> Result<RouteSet, ClientError>;
}

/// Talks to the routing service's `POST /api/paths` endpoint.
pub struct HttpRoutingClient {
    http: Client,
    paths_url: Url,
}

impl HttpRoutingClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            paths_url: paths_url(base_url)?,
        })
    }

    pub fn paths_url(&self) -> &Url {
        &self.paths_url
    }
}

#[async_trait]
impl RoutingClient for HttpRoutingClient {
    async fn find_paths(&self, request: &PathsRequest) -> Result<RouteSet, ClientError> {
        debug!(
            url = %self.paths_url,
            origin = %request.origin,
            destination = %request.destination,
            "requesting paths"
        );

        let response = self
            .http
            .post(self.paths_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, url = %self.paths_url, "routing service rejected path query");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: self.paths_url.to_string(),
                body,
            });
        }

        let decoded: PathsResponse = serde_json::from_str(&body)?;
        debug!(paths = decoded.paths.len(), "routing service answered");
        Ok(decoded.paths)
    }
}

/// Resolves the paths endpoint against a base URL, keeping any path prefix
/// the base already carries.
fn paths_url(base_url: &str) -> Result<Url, ClientError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash)
        .and_then(|base| base.join(PATHS_ENDPOINT))
        .map_err(|source| ClientError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
