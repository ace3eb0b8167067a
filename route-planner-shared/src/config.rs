/// Route generation endpoint, overridable at build time through `ROUTE_ENDPOINT`.
pub const ROUTE_ENDPOINT: &str = match option_env!("ROUTE_ENDPOINT") {
    Some(url) => url,
    None => "/api/generate_route/",
};

/// Where the client sends requests and which page elements it reads and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub form_selector: String,
    /// Element whose `value` attribute carries the bearer token.
    pub token_selector: String,
    pub start_card_selector: String,
    pub intermediate_card_selector: String,
    pub end_card_selector: String,
    pub start_equals_end_selector: String,
    /// Everything locked while a request is in flight.
    pub control_selector: String,
    pub modal_root_selector: String,
    pub dismiss_selector: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: ROUTE_ENDPOINT.to_string(),
            form_selector: "#routing_form".to_string(),
            token_selector: "#jwt".to_string(),
            start_card_selector: "#form_places_start .place-card".to_string(),
            intermediate_card_selector: "#intermediate_stops .place-card".to_string(),
            end_card_selector: "#form_places_end .place-card".to_string(),
            start_equals_end_selector: "#checkbox_start_is_stop".to_string(),
            control_selector: "input, button".to_string(),
            modal_root_selector: "#alert_modal_root".to_string(),
            dismiss_selector: "#alert_modal .modal-footer .btn".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
