use moodytunes::client::{ApiRequest, ApiResponse, Transport};
use moodytunes::ApiError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, RequestMode, Response};

/// Sends API requests with `window.fetch`, including the session cookies.
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let window = web_sys::window()
            .ok_or_else(|| ApiError::Transport("no global `window` exists".to_owned()))?;
        let request = query(&request).map_err(js_error)?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;
        let body = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(ApiResponse {
            status: resp.status(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}

fn query(request: &ApiRequest) -> Result<Request, JsValue> {
    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::SameOrigin);
    opts.set_credentials(RequestCredentials::Include);
    if let Some(body) = &request.body {
        opts.set_body(&JsValue::from_str(body));
    }
    let req = Request::new_with_str_and_init(request.url.as_str(), &opts)?;
    for (name, value) in &request.headers {
        req.headers().set(name, value)?;
    }
    Ok(req)
}

fn js_error(value: JsValue) -> ApiError {
    ApiError::Transport(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}
