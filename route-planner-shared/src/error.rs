use thiserror::Error;

/// Reading the route form off the page failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Could not find the form element '{0}' on the page.")]
    MissingElement(String),
    #[error("Could not find the access token '{0}' on the page. Please refresh the page and try again.")]
    MissingToken(String),
    #[error("Could not read the form: {0}")]
    Dom(String),
}

/// The route request never produced a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Could not reach the server: {0}")]
    Request(String),
    #[error("The server sent a response that could not be read: {0}")]
    Decode(String),
}

/// The JSON body does not match any of the known response shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("The server response was not a JSON object.")]
    NotAnObject,
    #[error("The server response did not include a route to show.")]
    MissingRouteUrl,
}

/// Updating the page itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Could not update the page: {0}")]
    Dom(String),
}

/// Anything that stops a route submission, shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Page(#[from] PageError),
}
