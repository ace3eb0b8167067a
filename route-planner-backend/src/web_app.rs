//! Web routes of the development server: the form page, the route generation endpoint the frontend
//! posts to and the page it redirects to afterwards.

use std::path::PathBuf;

use actix_web::{
    get,
    http::{header, StatusCode},
    post, web, HttpRequest, HttpResponse, Responder,
};
use log::{error, info, warn};
use route_planner_shared::{BearerToken, ErrorDetails, RouteRequest, RouteResponse};

use crate::{
    planner::{PlanError, RoutePlanner},
    tokens::TokenLedger,
};

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const REUSED_TOKEN: &str =
    "The server refused your request for security reasons. Please refresh your page and try again.";
const UNPARSEABLE_BODY: &str = "Could not parse JSON address data from request.";

/// Stands in for the bearer token in the built `index.html`.
pub const TOKEN_PLACEHOLDER: &str = "{{ route_token }}";

pub struct AppState {
    pub planner: Box<dyn RoutePlanner>,
    pub tokens: TokenLedger,
    /// The built form page, read on every request so a rebuild shows up without a restart.
    pub form_page: PathBuf,
}

impl AppState {
    pub fn new(planner: Box<dyn RoutePlanner>, form_page: impl Into<PathBuf>) -> Self {
        AppState {
            planner,
            tokens: TokenLedger::default(),
            form_page: form_page.into(),
        }
    }
}

pub fn route_url(route_key: &str) -> String {
    format!("/route/{}/", route_key)
}

fn reply(status: StatusCode, body: RouteResponse) -> HttpResponse {
    HttpResponse::build(status).json(body)
}

fn errors(message: &str) -> RouteResponse {
    RouteResponse::Error(ErrorDetails::from_messages([message]))
}

/// Serves the form with a token of its own, so every load of the page gets one attempt.
pub async fn form_page(state: web::Data<AppState>) -> impl Responder {
    let template = match tokio::fs::read_to_string(&state.form_page).await {
        Ok(t) => t,
        Err(e) => {
            error!("Can't read form page {}: {}", state.form_page.display(), e);
            return HttpResponse::NotFound().body("Form page not built");
        }
    };

    let token = state.tokens.issue();
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(template.replace(TOKEN_PLACEHOLDER, token.as_str()))
}

/// Endpoint the frontend submits route forms to
#[post("/api/generate_route/")]
pub async fn generate_route(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> impl Responder {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(BearerToken::from_authorization_header);
    let Some(token) = token else {
        warn!("Route request without a bearer token");
        return reply(StatusCode::FORBIDDEN, errors(MISSING_CREDENTIALS));
    };

    if !state.tokens.claim(&token) {
        warn!("Route request with an already used token");
        return reply(StatusCode::FORBIDDEN, errors(REUSED_TOKEN));
    }

    let request: RouteRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Unparseable route request: {}", e);
            return reply(StatusCode::BAD_REQUEST, errors(UNPARSEABLE_BODY));
        }
    };

    info!(
        "Planning route with {} intermediate stops",
        request.intermediate_addresses.len()
    );
    match state.planner.plan(&request).await {
        Ok(route_key) => {
            info!("Planned route {}", route_key);
            reply(
                StatusCode::OK,
                RouteResponse::Success {
                    route_url: route_url(&route_key),
                    route_key: Some(route_key),
                },
            )
        }
        Err(PlanError::NotRoutable) => {
            // Let the user change their addresses and resubmit without reloading.
            state.tokens.release(&token);
            reply(StatusCode::BAD_REQUEST, RouteResponse::NotRoutable)
        }
        Err(PlanError::Invalid(message)) => {
            warn!("Rejected route request: {}", message);
            reply(StatusCode::BAD_REQUEST, errors(&message))
        }
    }
}

#[get("/route/{route_key}/")]
pub async fn show_route(route_key: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().body(format!("Route {}", route_key.into_inner()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(vec!["/", "/index.html"]).route(web::get().to(form_page)))
        .service(generate_route)
        .service(show_route);
}
