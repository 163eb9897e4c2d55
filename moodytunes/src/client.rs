//! Client for the MoodyTunes backend API.
//!
//! Every operation builds one request, sends it through a [`Transport`] and
//! either parses the JSON body or returns an [`ApiError`] describing why the
//! request failed. The page decides what to show for a failure; the client
//! never retries.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::PageConfig;
use crate::csrf::{resolve_csrf_token, CSRF_HEADER};
use crate::error::ApiError;
use crate::model::{
    Analytics, BrowsePlaylist, DeleteVote, LastPlaylist, Options, Paginated, Vote, VoteInfo,
    VoteRecord,
};
use crate::params::{build_request_url, strip_null_params, Params};

pub const OPTIONS_ENDPOINT: &str = "/tunes/options/";
pub const BROWSE_ENDPOINT: &str = "/tunes/browse/";
pub const LAST_BROWSE_ENDPOINT: &str = "/tunes/browse/last/";
pub const PLAYLIST_ENDPOINT: &str = "/tunes/playlist/";
pub const VOTE_ENDPOINT: &str = "/tunes/vote/";
pub const VOTE_INFO_ENDPOINT: &str = "/tunes/vote/info/";
pub const ANALYTICS_ENDPOINT: &str = "/accounts/analytics/";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Method::Get)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request and hands back whatever the server answered.
///
/// Implementations only report failures to reach the server; status codes
/// are interpreted by [`MoodyTunesClient`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BrowseQuery {
    pub emotion: String,
    pub jitter: Option<f64>,
    pub limit: Option<u32>,
    pub genre: Option<String>,
    pub context: Option<String>,
    pub description: Option<String>,
    pub artist: Option<String>,
}

impl BrowseQuery {
    pub fn params(&self) -> Params {
        Params::new()
            .with("emotion", Some(&self.emotion))
            .with("jitter", self.jitter)
            .with("limit", self.limit)
            .with("genre", self.genre.as_ref())
            .with("context", self.context.as_ref())
            .with("description", self.description.as_ref())
            .with("artist", self.artist.as_ref())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PlaylistQuery {
    pub emotion: String,
    pub genre: Option<String>,
    pub context: Option<String>,
    pub artist: Option<String>,
}

impl PlaylistQuery {
    pub fn params(&self) -> Params {
        Params::new()
            .with("emotion", Some(&self.emotion))
            .with("genre", self.genre.as_ref())
            .with("context", self.context.as_ref())
            .with("artist", self.artist.as_ref())
    }
}

// The analytics endpoint filters on the same fields as the playlist.
pub type AnalyticsQuery = PlaylistQuery;

pub struct MoodyTunesClient<T> {
    transport: T,
    origin: Url,
    csrf_token: Option<String>,
    cookies: Option<Box<dyn Fn() -> String>>,
}

impl<T: Transport> MoodyTunesClient<T> {
    pub fn new(transport: T, origin: Url, csrf_token: Option<String>) -> Self {
        Self {
            transport,
            origin,
            csrf_token,
            cookies: None,
        }
    }

    /// Reads the `csrftoken` cookie on every unsafe request when the page
    /// config carries no token, so a rotated cookie is picked up.
    pub fn with_cookies(mut self, cookies: impl Fn() -> String + 'static) -> Self {
        self.cookies = Some(Box::new(cookies));
        self
    }

    pub fn from_config(transport: T, config: &PageConfig) -> Self {
        Self::new(transport, config.origin.clone(), config.csrf_token.clone())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn csrf_token(&self) -> Option<String> {
        let cookies = self.cookies.as_ref().map(|read| read()).unwrap_or_default();
        resolve_csrf_token(self.csrf_token.as_deref(), &cookies)
    }

    pub async fn request<B, R>(
        &self,
        method: Method,
        endpoint: &str,
        params: Params,
        data: Option<&B>,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = build_request_url(&self.origin, endpoint, &strip_null_params(params))?;
        let response = self.send(method, url, data).await?;
        serde_json::from_str(&response.body).map_err(ApiError::Decode)
    }

    async fn send<B>(&self, method: Method, url: Url, data: Option<&B>) -> Result<ApiResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = vec![("Content-Type", "application/json".to_owned())];
        let mut body = None;
        if !method.is_safe() {
            body = match data {
                Some(data) => Some(serde_json::to_string(data).map_err(ApiError::Encode)?),
                None => Some("{}".to_owned()),
            };
            match self.csrf_token() {
                Some(token) => headers.push((CSRF_HEADER, token)),
                None => warn!("sending {} {} without a CSRF token", method.as_str(), url),
            }
        }
        debug!("{} {}", method.as_str(), url);
        let response = self
            .transport
            .send(ApiRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await?;
        if !response.ok() {
            warn!("{} {} returned {}", method.as_str(), url, response.status);
            return Err(ApiError::from_response(response.status, &response.body));
        }
        Ok(response)
    }

    /// Emotions and genres the site knows about.
    pub async fn get_options(&self) -> Result<Options, ApiError> {
        self.request::<(), _>(Method::Get, OPTIONS_ENDPOINT, Params::new(), None)
            .await
    }

    pub async fn get_user_analytics(&self, query: &AnalyticsQuery) -> Result<Analytics, ApiError> {
        self.request::<(), _>(Method::Get, ANALYTICS_ENDPOINT, query.params(), None)
            .await
    }

    /// Songs for the user to listen to and vote on.
    pub async fn get_browse_playlist(&self, query: &BrowseQuery) -> Result<BrowsePlaylist, ApiError> {
        self.request::<(), _>(Method::Get, BROWSE_ENDPOINT, query.params(), None)
            .await
    }

    /// The last browse playlist the backend generated for this user.
    pub async fn get_cached_browse_playlist(&self) -> Result<LastPlaylist, ApiError> {
        self.request::<(), _>(Method::Get, LAST_BROWSE_ENDPOINT, Params::new(), None)
            .await
    }

    /// Songs the user has voted as making them feel the emotion.
    pub async fn get_emotion_playlist(
        &self,
        query: &PlaylistQuery,
    ) -> Result<Paginated<VoteRecord>, ApiError> {
        self.request::<(), _>(Method::Get, PLAYLIST_ENDPOINT, query.params(), None)
            .await
    }

    /// Follows a `next`/`previous` link of a paginated playlist.
    pub async fn get_playlist_page(&self, link: &str) -> Result<Paginated<VoteRecord>, ApiError> {
        let url = self.origin.join(link)?;
        let response = self.send::<()>(Method::Get, url, None).await?;
        serde_json::from_str(&response.body).map_err(ApiError::Decode)
    }

    pub async fn get_vote_info(&self, song_code: &str, emotion: &str) -> Result<VoteInfo, ApiError> {
        let params = Params::new()
            .with("song_code", Some(song_code))
            .with("emotion", Some(emotion));
        self.request::<(), _>(Method::Get, VOTE_INFO_ENDPOINT, params, None)
            .await
    }

    pub async fn post_vote(&self, vote: &Vote) -> Result<(), ApiError> {
        let url = build_request_url(&self.origin, VOTE_ENDPOINT, &Params::new())?;
        self.send(Method::Post, url, Some(vote)).await.map(drop)
    }

    /// "Unvote" a song previously reported for an emotion.
    pub async fn delete_vote(&self, vote: &DeleteVote) -> Result<(), ApiError> {
        let url = build_request_url(&self.origin, VOTE_ENDPOINT, &Params::new())?;
        self.send(Method::Delete, url, Some(vote)).await.map(drop)
    }
}
