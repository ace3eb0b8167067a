//! Shared crate for the route planner.
//!
//! Holds everything about a route submission that does not need a browser: the wire types sent to
//! and received from the route generation endpoint, the notification states shown to the user, and
//! the submission flow itself, written against small traits so the frontend can plug in the DOM and
//! `fetch` while tests plug in fakes.

pub mod config;
pub mod error;
pub mod model;
pub mod notification;
pub mod response;
pub mod submission;

pub use config::ClientConfig;
pub use error::{FormError, PageError, ResponseError, SubmitError, TransportError};
pub use model::{BearerToken, PlaceCard, RouteRequest};
pub use notification::Notification;
pub use response::{ErrorDetails, RouteResponse};
pub use submission::{submit_route, FormSource, Page, RouteApi, RouteForm, SubmissionOutcome};
