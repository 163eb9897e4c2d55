//! Transport for running the client outside the browser.

use hyper::client::HttpConnector;
use hyper::{Body, Client, Request};
use hyper_tls::HttpsConnector;

use crate::client::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;

pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>>,
    cookie: Option<String>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let https = HttpsConnector::new();
        Self {
            client: Client::builder().build::<_, Body>(https),
            cookie: None,
        }
    }

    /// Sends `cookie` with every request, standing in for the browser's
    /// session credentials.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header("Cookie", cookie.as_str());
        }
        let body = request.body.map(Body::from).unwrap_or_else(Body::empty);
        let req = builder
            .body(body)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = hyper::body::to_bytes(resp.into_body())
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(ApiResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
