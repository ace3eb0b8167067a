//! `fetch` based client for the route generation endpoint.

use async_trait::async_trait;
use route_planner_shared::{
    model::request_headers, BearerToken, RouteApi, RouteRequest, TransportError,
};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response, Window};

fn request_err(e: JsValue) -> TransportError {
    TransportError::Request(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

pub struct FetchRouteApi {
    window: Window,
    endpoint: String,
}

impl FetchRouteApi {
    pub fn new(window: Window, endpoint: impl Into<String>) -> Self {
        FetchRouteApi {
            window,
            endpoint: endpoint.into(),
        }
    }

    fn build_request(
        &self,
        request: &RouteRequest,
        token: &BearerToken,
    ) -> Result<Request, TransportError> {
        let body = serde_json::to_string(request)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let headers = Headers::new().map_err(request_err)?;
        for (name, value) in request_headers(token) {
            headers.set(name, &value).map_err(request_err)?;
        }

        // JSON can only go in the body of a POST.
        let mut opts = RequestInit::new();
        opts.method("POST");
        opts.mode(RequestMode::SameOrigin);
        opts.headers(&headers);
        opts.body(Some(&JsValue::from_str(&body)));

        Request::new_with_str_and_init(&self.endpoint, &opts).map_err(request_err)
    }
}

#[async_trait(?Send)]
impl RouteApi for FetchRouteApi {
    async fn generate_route(
        &self,
        request: &RouteRequest,
        token: &BearerToken,
    ) -> Result<Value, TransportError> {
        let req = self.build_request(request, token)?;

        let resp_value = JsFuture::from(self.window.fetch_with_request(&req))
            .await
            .map_err(request_err)?;
        let resp: Response = resp_value.dyn_into().map_err(request_err)?;

        // Error shapes come back with 4xx statuses, so the body is read either way.
        log::info!("Route endpoint answered with status {}", resp.status());
        let text = JsFuture::from(resp.text().map_err(request_err)?)
            .await
            .map_err(request_err)?
            .as_string()
            .ok_or_else(|| TransportError::Decode("response body is not text".to_string()))?;

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
