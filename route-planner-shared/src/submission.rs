//! The route submission flow.
//!
//! [`submit_route`] locks the page, reads the form, posts it, and acts on the answer: show the not
//! routable notice, reload so the server can render its validation errors, or move to the new
//! route. The page is unlocked again whatever happens. Everything the flow touches goes through
//! three seams so it can run outside a browser:
//!
//! * [`FormSource`] reads the place cards, the "start equals end" flag and the token,
//! * [`RouteApi`] sends the request and hands back the JSON body,
//! * [`Page`] locks controls, shows notifications, reloads and navigates.

use async_trait::async_trait;
use log::{error, info, warn};
use serde_json::Value;

use crate::{
    error::{FormError, PageError, SubmitError, TransportError},
    model::{BearerToken, PlaceCard, RouteRequest},
    notification::Notification,
    response::RouteResponse,
};

pub trait FormSource {
    fn start_card(&self) -> Result<PlaceCard, FormError>;
    fn intermediate_cards(&self) -> Result<Vec<PlaceCard>, FormError>;
    fn end_card(&self) -> Result<PlaceCard, FormError>;
    fn start_equals_end(&self) -> Result<bool, FormError>;
    fn bearer_token(&self) -> Result<BearerToken, FormError>;
}

#[async_trait(?Send)]
pub trait RouteApi {
    /// Posts the request and returns the decoded JSON body, whatever the HTTP status.
    async fn generate_route(
        &self,
        request: &RouteRequest,
        token: &BearerToken,
    ) -> Result<Value, TransportError>;
}

pub trait Page {
    fn set_controls_enabled(&self, enabled: bool) -> Result<(), PageError>;
    fn notify(&self, notification: Notification) -> Result<(), PageError>;
    /// Unlocks the modal's dismiss control, which the control lock also catches.
    fn enable_dismiss(&self) -> Result<(), PageError>;
    fn reload(&self) -> Result<(), PageError>;
    fn navigate(&self, url: &str) -> Result<(), PageError>;
    fn alert(&self, message: &str);
    /// Re-applies the "end address mirrors start" rule to the end card.
    fn mirror_start_into_end(&self) -> Result<(), PageError>;
}

/// Form contents already in hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteForm {
    pub start: PlaceCard,
    pub intermediates: Vec<PlaceCard>,
    pub end: PlaceCard,
    pub start_equals_end: bool,
    pub token: BearerToken,
}

impl FormSource for RouteForm {
    fn start_card(&self) -> Result<PlaceCard, FormError> {
        Ok(self.start.clone())
    }

    fn intermediate_cards(&self) -> Result<Vec<PlaceCard>, FormError> {
        Ok(self.intermediates.clone())
    }

    fn end_card(&self) -> Result<PlaceCard, FormError> {
        Ok(self.end.clone())
    }

    fn start_equals_end(&self) -> Result<bool, FormError> {
        Ok(self.start_equals_end)
    }

    fn bearer_token(&self) -> Result<BearerToken, FormError> {
        Ok(self.token.clone())
    }
}

impl RouteRequest {
    /// Builds the request body from the form. With "start equals end" checked the end card is never
    /// read and the end address is a copy of the start.
    pub fn from_form<F: FormSource + ?Sized>(form: &F) -> Result<RouteRequest, FormError> {
        let start_address = form.start_card()?;
        let intermediate_addresses = form.intermediate_cards()?;
        let end_address = if form.start_equals_end()? {
            start_address.clone()
        } else {
            form.end_card()?
        };

        Ok(RouteRequest {
            start_address,
            intermediate_addresses,
            end_address,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    NotRoutable,
    Reloaded,
    Navigated(String),
    Failed(SubmitError),
}

pub async fn submit_route<F, A, P>(form: &F, api: &A, page: &P) -> SubmissionOutcome
where
    F: FormSource + ?Sized,
    A: RouteApi + ?Sized,
    P: Page + ?Sized,
{
    if let Err(e) = page.set_controls_enabled(false) {
        warn!("Could not lock the form controls: {}", e);
    }

    let outcome = match send_and_dispatch(form, api, page).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Route submission failed: {}", e);
            if let Err(e) = page.notify(Notification::Idle) {
                warn!("Could not hide the status modal: {}", e);
            }
            page.alert(&e.to_string());
            SubmissionOutcome::Failed(e)
        }
    };

    if let Err(e) = page.set_controls_enabled(true) {
        error!("Could not unlock the form controls: {}", e);
    }
    if let Err(e) = page.mirror_start_into_end() {
        error!("Could not restore the end address inputs: {}", e);
    }

    outcome
}

async fn send_and_dispatch<F, A, P>(
    form: &F,
    api: &A,
    page: &P,
) -> Result<SubmissionOutcome, SubmitError>
where
    F: FormSource + ?Sized,
    A: RouteApi + ?Sized,
    P: Page + ?Sized,
{
    let token = form.bearer_token()?;
    let request = RouteRequest::from_form(form)?;

    page.notify(Notification::Processing)?;
    page.enable_dismiss()?;

    info!(
        "Submitting route with {} intermediate stops",
        request.intermediate_addresses.len()
    );
    let body = api.generate_route(&request, &token).await?;

    match RouteResponse::from_value(&body)? {
        RouteResponse::NotRoutable => {
            warn!("Server could not route the submitted addresses");
            page.notify(Notification::NotRoutable)?;
            page.enable_dismiss()?;
            Ok(SubmissionOutcome::NotRoutable)
        }
        RouteResponse::Error(details) => {
            warn!("Server rejected the route: {:?}", details.messages());
            page.notify(Notification::Done)?;
            page.reload()?;
            Ok(SubmissionOutcome::Reloaded)
        }
        RouteResponse::Success {
            route_url,
            route_key,
        } => {
            info!("Route {:?} ready at {}", route_key, route_url);
            page.notify(Notification::Done)?;
            page.navigate(&route_url)?;
            Ok(SubmissionOutcome::Navigated(route_url))
        }
    }
}

#[cfg(test)]
mod submission_tests {
    use std::cell::{Cell, RefCell};

    use serde_json::json;

    use super::*;
    use crate::error::ResponseError;

    #[derive(Debug, Clone, PartialEq)]
    enum PageEvent {
        Controls(bool),
        Notify(Notification),
        EnableDismiss,
        Reload,
        Navigate(String),
        Alert(String),
        Mirror,
    }

    #[derive(Default)]
    struct RecordingPage {
        events: RefCell<Vec<PageEvent>>,
    }

    impl RecordingPage {
        fn events(&self) -> Vec<PageEvent> {
            self.events.borrow().clone()
        }

        fn count(&self, event: &PageEvent) -> usize {
            self.events.borrow().iter().filter(|e| *e == event).count()
        }

        fn push(&self, event: PageEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    impl Page for RecordingPage {
        fn set_controls_enabled(&self, enabled: bool) -> Result<(), PageError> {
            self.push(PageEvent::Controls(enabled));
            Ok(())
        }

        fn notify(&self, notification: Notification) -> Result<(), PageError> {
            self.push(PageEvent::Notify(notification));
            Ok(())
        }

        fn enable_dismiss(&self) -> Result<(), PageError> {
            self.push(PageEvent::EnableDismiss);
            Ok(())
        }

        fn reload(&self) -> Result<(), PageError> {
            self.push(PageEvent::Reload);
            Ok(())
        }

        fn navigate(&self, url: &str) -> Result<(), PageError> {
            self.push(PageEvent::Navigate(url.to_string()));
            Ok(())
        }

        fn alert(&self, message: &str) {
            self.push(PageEvent::Alert(message.to_string()));
        }

        fn mirror_start_into_end(&self) -> Result<(), PageError> {
            self.push(PageEvent::Mirror);
            Ok(())
        }
    }

    struct CannedApi {
        reply: Result<Value, TransportError>,
        sent: RefCell<Vec<(RouteRequest, BearerToken)>>,
    }

    impl CannedApi {
        fn replying(body: Value) -> Self {
            CannedApi {
                reply: Ok(body),
                sent: RefCell::new(vec![]),
            }
        }

        fn failing(e: TransportError) -> Self {
            CannedApi {
                reply: Err(e),
                sent: RefCell::new(vec![]),
            }
        }

        fn last_request(&self) -> RouteRequest {
            self.sent.borrow().last().unwrap().0.clone()
        }
    }

    #[async_trait(?Send)]
    impl RouteApi for CannedApi {
        async fn generate_route(
            &self,
            request: &RouteRequest,
            token: &BearerToken,
        ) -> Result<Value, TransportError> {
            self.sent
                .borrow_mut()
                .push((request.clone(), token.clone()));
            self.reply.clone()
        }
    }

    /// Counts reads of the end card.
    struct WatchedForm {
        inner: RouteForm,
        end_reads: Cell<usize>,
    }

    impl WatchedForm {
        fn new(inner: RouteForm) -> Self {
            WatchedForm {
                inner,
                end_reads: Cell::new(0),
            }
        }
    }

    impl FormSource for WatchedForm {
        fn start_card(&self) -> Result<PlaceCard, FormError> {
            self.inner.start_card()
        }

        fn intermediate_cards(&self) -> Result<Vec<PlaceCard>, FormError> {
            self.inner.intermediate_cards()
        }

        fn end_card(&self) -> Result<PlaceCard, FormError> {
            self.end_reads.set(self.end_reads.get() + 1);
            self.inner.end_card()
        }

        fn start_equals_end(&self) -> Result<bool, FormError> {
            self.inner.start_equals_end()
        }

        fn bearer_token(&self) -> Result<BearerToken, FormError> {
            self.inner.bearer_token()
        }
    }

    struct BrokenForm;

    impl FormSource for BrokenForm {
        fn start_card(&self) -> Result<PlaceCard, FormError> {
            Err(FormError::MissingElement(
                "#form_places_start .place-card".to_string(),
            ))
        }

        fn intermediate_cards(&self) -> Result<Vec<PlaceCard>, FormError> {
            Ok(vec![])
        }

        fn end_card(&self) -> Result<PlaceCard, FormError> {
            Ok(PlaceCard::new())
        }

        fn start_equals_end(&self) -> Result<bool, FormError> {
            Ok(false)
        }

        fn bearer_token(&self) -> Result<BearerToken, FormError> {
            Ok(BearerToken::new("token"))
        }
    }

    fn card(pairs: &[(&str, &str)]) -> PlaceCard {
        pairs.iter().copied().collect()
    }

    fn sample_form() -> RouteForm {
        RouteForm {
            start: card(&[("street", "1 Capitol Ave"), ("city", "Little Rock")]),
            intermediates: vec![],
            end: card(&[("street", "500 President Clinton Ave"), ("city", "Little Rock")]),
            start_equals_end: false,
            token: BearerToken::new("abc.def.ghi"),
        }
    }

    fn assert_unlocked_once(page: &RecordingPage) {
        assert_eq!(page.count(&PageEvent::Controls(false)), 1);
        assert_eq!(page.count(&PageEvent::Controls(true)), 1);
        let events = page.events();
        assert_eq!(events.first(), Some(&PageEvent::Controls(false)));
        assert_eq!(
            &events[events.len() - 2..],
            &[PageEvent::Controls(true), PageEvent::Mirror]
        );
    }

    #[tokio::test]
    async fn test_success_navigates_to_route() {
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        let outcome = submit_route(&sample_form(), &api, &page).await;

        assert_eq!(outcome, SubmissionOutcome::Navigated("/routes/42".to_string()));
        assert_eq!(page.count(&PageEvent::Navigate("/routes/42".to_string())), 1);
        assert_eq!(page.count(&PageEvent::Reload), 0);
        assert_unlocked_once(&page);
    }

    #[tokio::test]
    async fn test_processing_shown_before_request_with_dismiss_unlocked() {
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        submit_route(&sample_form(), &api, &page).await;

        let events = page.events();
        assert_eq!(
            &events[..3],
            &[
                PageEvent::Controls(false),
                PageEvent::Notify(Notification::Processing),
                PageEvent::EnableDismiss,
            ]
        );
        assert_eq!(api.sent.borrow()[0].1, BearerToken::new("abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_not_routable_stays_on_page() {
        let api = CannedApi::replying(json!({ "notRoutableException": true }));
        let page = RecordingPage::default();

        let outcome = submit_route(&sample_form(), &api, &page).await;

        assert_eq!(outcome, SubmissionOutcome::NotRoutable);
        assert_eq!(page.count(&PageEvent::Notify(Notification::NotRoutable)), 1);
        assert_eq!(page.count(&PageEvent::EnableDismiss), 2);
        assert!(!page
            .events()
            .iter()
            .any(|e| matches!(e, PageEvent::Reload | PageEvent::Navigate(_))));
        assert_unlocked_once(&page);
    }

    #[tokio::test]
    async fn test_errors_reload_without_navigating() {
        for body in [
            json!({ "error": "bad input" }),
            json!({ "errors": ["Value for 'city' is empty."] }),
            json!({ "errors": [], "route_url": "/routes/1" }),
        ] {
            let api = CannedApi::replying(body);
            let page = RecordingPage::default();

            let outcome = submit_route(&sample_form(), &api, &page).await;

            assert_eq!(outcome, SubmissionOutcome::Reloaded);
            assert_eq!(page.count(&PageEvent::Reload), 1);
            assert!(!page
                .events()
                .iter()
                .any(|e| matches!(e, PageEvent::Navigate(_))));
            assert_unlocked_once(&page);
        }
    }

    #[tokio::test]
    async fn test_start_equals_end_copies_start_and_skips_end_card() {
        let form = WatchedForm::new(RouteForm {
            start_equals_end: true,
            ..sample_form()
        });
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        submit_route(&form, &api, &page).await;

        let sent = api.last_request();
        assert_eq!(sent.end_address, sent.start_address);
        assert_eq!(form.end_reads.get(), 0);
    }

    #[tokio::test]
    async fn test_end_card_read_when_flag_unset() {
        let form = WatchedForm::new(sample_form());
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        submit_route(&form, &api, &page).await;

        let sent = api.last_request();
        assert_eq!(sent.end_address, sample_form().end);
        assert_ne!(sent.end_address, sent.start_address);
        assert_eq!(form.end_reads.get(), 1);
    }

    #[tokio::test]
    async fn test_intermediate_stops_keep_order() {
        let form = RouteForm {
            intermediates: vec![card(&[("addr", "A")]), card(&[("addr", "B")])],
            ..sample_form()
        };
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        submit_route(&form, &api, &page).await;

        let body = serde_json::to_value(api.last_request()).unwrap();
        assert_eq!(
            body["intermediate_addresses"],
            json!([{ "addr": "A" }, { "addr": "B" }])
        );
    }

    #[tokio::test]
    async fn test_transport_failure_alerts_without_reload() {
        let api = CannedApi::failing(TransportError::Request("connection refused".to_string()));
        let page = RecordingPage::default();

        let outcome = submit_route(&sample_form(), &api, &page).await;

        let SubmissionOutcome::Failed(SubmitError::Transport(_)) = outcome else {
            panic!("expected a transport failure, got {:?}", outcome);
        };
        let alerts: Vec<_> = page
            .events()
            .into_iter()
            .filter(|e| matches!(e, PageEvent::Alert(_)))
            .collect();
        assert_eq!(
            alerts,
            vec![PageEvent::Alert(
                "Could not reach the server: connection refused".to_string()
            )]
        );
        assert_eq!(page.count(&PageEvent::Notify(Notification::Idle)), 1);
        assert_eq!(page.count(&PageEvent::Reload), 0);
        assert_unlocked_once(&page);
    }

    #[tokio::test]
    async fn test_missing_route_url_alerts() {
        let api = CannedApi::replying(json!({ "route_key": "abc" }));
        let page = RecordingPage::default();

        let outcome = submit_route(&sample_form(), &api, &page).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed(SubmitError::Response(ResponseError::MissingRouteUrl))
        );
        assert!(!page
            .events()
            .iter()
            .any(|e| matches!(e, PageEvent::Navigate(_))));
        assert_unlocked_once(&page);
    }

    #[tokio::test]
    async fn test_form_failure_never_sends_and_unlocks() {
        let api = CannedApi::replying(json!({ "route_url": "/routes/42" }));
        let page = RecordingPage::default();

        let outcome = submit_route(&BrokenForm, &api, &page).await;

        assert!(matches!(
            outcome,
            SubmissionOutcome::Failed(SubmitError::Form(FormError::MissingElement(_)))
        ));
        assert!(api.sent.borrow().is_empty());
        assert_eq!(page.count(&PageEvent::Notify(Notification::Processing)), 0);
        assert_unlocked_once(&page);
    }
}
