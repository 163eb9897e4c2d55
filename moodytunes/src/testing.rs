use std::cell::RefCell;
use std::collections::VecDeque;
use std::task::Poll;

use futures::future::poll_fn;

use url::Url;

use crate::client::{ApiRequest, ApiResponse, MoodyTunesClient, Transport};
use crate::error::ApiError;

/// Replays queued responses in order and records every request it is given.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, String>>>,
    requests: RefCell<Vec<ApiRequest>>,
    deferred: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(status, body);
        self
    }

    pub fn fail(self, error: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(error.to_owned()));
        self
    }

    /// Each response is taken when the request is sent but only handed back
    /// after the caller has yielded once, so concurrent calls interleave.
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn push(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.to_owned(),
        }));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no response queued".to_owned()));
        if self.deferred {
            yield_once().await;
        }
        response.map_err(ApiError::Transport)
    }
}

pub fn client(transport: MockTransport) -> MoodyTunesClient<MockTransport> {
    MoodyTunesClient::new(
        transport,
        Url::parse("https://moodytunes.test").unwrap(),
        Some("token".to_owned()),
    )
}

async fn yield_once() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}
