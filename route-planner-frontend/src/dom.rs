//! Reads the route form out of the page and applies the submission's effects back to it.

use std::rc::Rc;

use route_planner_shared::{
    BearerToken, ClientConfig, FormError, FormSource, Notification, Page, PageError, PlaceCard,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlInputElement, NodeList, Window};
use yew::Callback;

fn js_message(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn elements(list: NodeList) -> impl Iterator<Item = Element> {
    (0..list.length()).filter_map(move |i| list.get(i).and_then(|n| n.dyn_into::<Element>().ok()))
}

fn inputs_of(card: &Element) -> Result<Vec<HtmlInputElement>, JsValue> {
    Ok(elements(card.query_selector_all("input")?)
        .filter_map(|e| e.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

/// Every named input in the card. Unnamed inputs carry nothing the server can use and are skipped.
fn parse_place_card(card: &Element) -> Result<PlaceCard, FormError> {
    let inputs = inputs_of(card).map_err(|e| FormError::Dom(js_message(e)))?;

    Ok(inputs
        .iter()
        .filter(|input| !input.name().is_empty())
        .map(|input| (input.name(), input.value()))
        .collect())
}

fn find(document: &Document, selector: &str) -> Result<Element, FormError> {
    document
        .query_selector(selector)
        .map_err(|e| FormError::Dom(js_message(e)))?
        .ok_or_else(|| FormError::MissingElement(selector.to_string()))
}

fn find_checkbox(document: &Document, selector: &str) -> Result<HtmlInputElement, FormError> {
    find(document, selector)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| FormError::Dom(format!("'{}' is not an input", selector)))
}

/// Locks the end card while "start equals end" is checked and keeps its inputs showing the start
/// address, unlocks it otherwise.
pub fn apply_end_mirror(document: &Document, config: &ClientConfig) -> Result<(), FormError> {
    let mirrored = find_checkbox(document, &config.start_equals_end_selector)?.checked();
    let start = parse_place_card(&find(document, &config.start_card_selector)?)?;
    let end_card = find(document, &config.end_card_selector)?;

    for input in inputs_of(&end_card).map_err(|e| FormError::Dom(js_message(e)))? {
        input.set_disabled(mirrored);
        if mirrored {
            if let Some(value) = start.get(&input.name()) {
                input.set_value(value);
            }
        }
    }

    Ok(())
}

/// The route form as it currently stands in the document.
pub struct DomForm {
    document: Document,
    config: Rc<ClientConfig>,
}

impl DomForm {
    pub fn new(document: Document, config: Rc<ClientConfig>) -> Self {
        DomForm { document, config }
    }
}

impl FormSource for DomForm {
    fn start_card(&self) -> Result<PlaceCard, FormError> {
        parse_place_card(&find(&self.document, &self.config.start_card_selector)?)
    }

    fn intermediate_cards(&self) -> Result<Vec<PlaceCard>, FormError> {
        let cards = self
            .document
            .query_selector_all(&self.config.intermediate_card_selector)
            .map_err(|e| FormError::Dom(js_message(e)))?;

        elements(cards).map(|card| parse_place_card(&card)).collect()
    }

    fn end_card(&self) -> Result<PlaceCard, FormError> {
        parse_place_card(&find(&self.document, &self.config.end_card_selector)?)
    }

    fn start_equals_end(&self) -> Result<bool, FormError> {
        Ok(find_checkbox(&self.document, &self.config.start_equals_end_selector)?.checked())
    }

    fn bearer_token(&self) -> Result<BearerToken, FormError> {
        let selector = &self.config.token_selector;
        let element = match find(&self.document, selector) {
            Ok(element) => element,
            Err(FormError::MissingElement(_)) => {
                return Err(FormError::MissingToken(selector.to_string()))
            }
            Err(e) => return Err(e),
        };

        element
            .get_attribute("value")
            .filter(|token| !token.is_empty())
            .map(BearerToken::new)
            .ok_or_else(|| FormError::MissingToken(selector.to_string()))
    }
}

/// Browser side of the submission: controls, the status modal, location and alerts.
pub struct DomPage {
    window: Window,
    document: Document,
    config: Rc<ClientConfig>,
    on_notify: Callback<Notification>,
}

impl DomPage {
    pub fn new(
        window: Window,
        document: Document,
        config: Rc<ClientConfig>,
        on_notify: Callback<Notification>,
    ) -> Self {
        DomPage {
            window,
            document,
            config,
            on_notify,
        }
    }

    fn set_disabled(&self, selector: &str, disabled: bool) -> Result<(), PageError> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|e| PageError::Dom(js_message(e)))?;

        for element in elements(nodes) {
            let element = match element.dyn_into::<HtmlInputElement>() {
                Ok(input) => {
                    input.set_disabled(disabled);
                    continue;
                }
                Err(element) => element,
            };
            if let Ok(button) = element.dyn_into::<HtmlButtonElement>() {
                button.set_disabled(disabled);
            }
        }

        Ok(())
    }
}

impl Page for DomPage {
    fn set_controls_enabled(&self, enabled: bool) -> Result<(), PageError> {
        self.set_disabled(&self.config.control_selector, !enabled)
    }

    fn notify(&self, notification: Notification) -> Result<(), PageError> {
        self.on_notify.emit(notification);
        Ok(())
    }

    fn enable_dismiss(&self) -> Result<(), PageError> {
        self.set_disabled(&self.config.dismiss_selector, false)
    }

    fn reload(&self) -> Result<(), PageError> {
        self.window
            .location()
            .reload()
            .map_err(|e| PageError::Dom(js_message(e)))
    }

    fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.window
            .location()
            .set_href(url)
            .map_err(|e| PageError::Dom(js_message(e)))
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::error!("Could not show alert: {}", js_message(e));
        }
    }

    fn mirror_start_into_end(&self) -> Result<(), PageError> {
        apply_end_mirror(&self.document, &self.config).map_err(|e| PageError::Dom(e.to_string()))
    }
}
