//! Frontend for the route planner.
//!
//! The routing form itself is server rendered. This crate hooks its submit event, runs the route
//! submission against the DOM and `fetch`, and renders the status modal with yew.

mod dom;
mod fetch;

use std::rc::Rc;

use log::{error, info, warn};
use route_planner_shared::{submit_route, ClientConfig, Notification};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Event};
use yew::prelude::*;

use crate::{
    dom::{apply_end_mirror, DomForm, DomPage},
    fetch::FetchRouteApi,
};

#[derive(Properties, PartialEq)]
struct AlertModalProps {
    notification: Notification,
    on_dismiss: Callback<()>,
}

#[function_component(AlertModal)]
fn alert_modal(
    AlertModalProps {
        notification,
        on_dismiss,
    }: &AlertModalProps,
) -> Html {
    let on_click = {
        let on_dismiss = on_dismiss.clone();
        Callback::from(move |_| on_dismiss.emit(()))
    };

    // Always in the DOM so the dismiss button can be unlocked by selector.
    let (class, style) = if notification.is_visible() {
        ("modal fade show", "display: block;")
    } else {
        ("modal fade", "display: none;")
    };

    let paragraphs = notification.paragraphs().iter().map(|p| {
        html! {
            <p class="lead fw-normal">{ *p }</p>
        }
    });

    let footnote = notification.footnote().map(|f| {
        html! {
            <p class="lead fw-normal">
                { f.before }
                <a href={ f.href } target="_blank" rel="noopener noreferrer">{ f.link_text }</a>
                { f.after }
            </p>
        }
    });

    html! {
      <div id="alert_modal" class={ class } style={ style } tabindex="-1" data-bs-backdrop="static" data-bs-keyboard="false">
        <div class="modal-dialog">
          <div class="modal-content">
            <div class="modal-header">
              <h5 class="modal-title">{ notification.title() }</h5>
            </div>
            <div class="modal-body">
              { for paragraphs }
              { for footnote }
              if notification.shows_spinner() {
                <div class="mt-3 row justify-content-center">
                  <div class="col-auto">
                    <div class="spinner-border text-success" role="status">
                      <span class="visually-hidden">{ "Loading..." }</span>
                    </div>
                  </div>
                </div>
              }
            </div>
            <div class="modal-footer">
              <button type="button" class="btn btn-secondary" onclick={ on_click }>{ "Close" }</button>
            </div>
          </div>
        </div>
      </div>
    }
}

struct RouteSubmitter {
    config: Rc<ClientConfig>,
    notification: Notification,
    in_flight: bool,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

enum RouteSubmitterMessage {
    Submit,
    Notify(Notification),
    Finished,
    Dismiss,
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

impl RouteSubmitter {
    fn listen(
        document: &Document,
        selector: &str,
        event: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Closure<dyn FnMut(Event)>> {
        let target = match document.query_selector(selector) {
            Ok(Some(target)) => target,
            _ => {
                warn!("No '{}' on the page, not listening for {}", selector, event);
                return None;
            }
        };

        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => Some(closure),
            Err(e) => {
                error!("Could not listen for {} on '{}': {:?}", event, selector, e);
                None
            }
        }
    }
}

impl Component for RouteSubmitter {
    type Properties = ();
    type Message = RouteSubmitterMessage;

    fn create(ctx: &Context<Self>) -> Self {
        let config = Rc::new(ClientConfig::default());
        let mut listeners = vec![];

        if let Some(document) = document() {
            let submit = ctx.link().callback(|_: ()| RouteSubmitterMessage::Submit);
            listeners.extend(Self::listen(
                &document,
                &config.form_selector,
                "submit",
                move |e: Event| {
                    // The form is sent piece by piece, never by the browser.
                    e.prevent_default();
                    submit.emit(());
                },
            ));

            let mirror_doc = document.clone();
            let mirror_config = config.clone();
            listeners.extend(Self::listen(
                &document,
                &config.start_equals_end_selector,
                "change",
                move |_| {
                    if let Err(e) = apply_end_mirror(&mirror_doc, &mirror_config) {
                        error!("{}", e);
                    }
                },
            ));

            if let Err(e) = apply_end_mirror(&document, &config) {
                warn!("{}", e);
            }
        }

        Self {
            config,
            notification: Notification::Idle,
            in_flight: false,
            _listeners: listeners,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            RouteSubmitterMessage::Submit => {
                if self.in_flight {
                    warn!("Route submission already in flight, ignoring submit");
                    return false;
                }
                let Some(window) = web_sys::window() else {
                    error!("Can't find window");
                    return false;
                };
                let Some(document) = window.document() else {
                    error!("Can't find document in window");
                    return false;
                };
                self.in_flight = true;

                let form = DomForm::new(document.clone(), self.config.clone());
                let api = FetchRouteApi::new(window.clone(), self.config.endpoint.clone());
                let page = DomPage::new(
                    window,
                    document,
                    self.config.clone(),
                    ctx.link().callback(RouteSubmitterMessage::Notify),
                );
                let finished = ctx.link().callback(|_: ()| RouteSubmitterMessage::Finished);

                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = submit_route(&form, &api, &page).await;
                    info!("Route submission finished: {:?}", outcome);
                    finished.emit(());
                });

                false
            }
            RouteSubmitterMessage::Notify(notification) => {
                self.notification = notification;
                true
            }
            RouteSubmitterMessage::Finished => {
                self.in_flight = false;
                false
            }
            RouteSubmitterMessage::Dismiss => {
                self.notification = Notification::Idle;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <AlertModal
                notification={ self.notification }
                on_dismiss={ ctx.link().callback(|_: ()| RouteSubmitterMessage::Dismiss) }
            />
        }
    }
}

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let config = ClientConfig::default();
    let document = document().expect("Can't find document in window");
    let modal_root = document
        .query_selector(&config.modal_root_selector)
        .ok()
        .flatten()
        .expect("Can't find the alert modal root");

    info!("Route planner frontend starting");
    yew::Renderer::<RouteSubmitter>::with_root(modal_root).render();
}
