//! What the status modal shows during a submission.

pub const CONTACT_PAGE_URL: &str = "/contact/";

/// Link embedded at the end of a notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footnote {
    pub before: &'static str,
    pub link_text: &'static str,
    pub href: &'static str,
    pub after: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notification {
    /// Modal hidden.
    #[default]
    Idle,
    /// The request is with the server.
    Processing,
    /// The server could not connect the addresses.
    NotRoutable,
    /// The page is about to reload or move to the route.
    Done,
}

impl Notification {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Notification::Idle)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notification::Idle => "",
            Notification::Processing => "Planning Route",
            Notification::NotRoutable => "Unable to Route Addresses",
            Notification::Done => "Route Ready",
        }
    }

    pub fn paragraphs(&self) -> &'static [&'static str] {
        match self {
            Notification::Idle => &[],
            Notification::Processing => &[
                "Your request has been sent to the server for processing. When finished, you should automatically be redirected to see the results.",
                "This may take up to a few minutes.",
            ],
            Notification::NotRoutable => &[
                "Unfortunately, we were unable to route the addresses you provided.",
                "This might be because they cannot be connected via roads. If your addresses are located in multiple countries, this may be the issue.",
            ],
            Notification::Done => &["Taking you to the next page."],
        }
    }

    pub fn footnote(&self) -> Option<Footnote> {
        match self {
            Notification::NotRoutable => Some(Footnote {
                before: "If you believe this is not the problem and continue to experience this error, please feel free to let us know using our ",
                link_text: "contact page",
                href: CONTACT_PAGE_URL,
                after: " and try again later.",
            }),
            _ => None,
        }
    }

    pub fn shows_spinner(&self) -> bool {
        matches!(self, Notification::Processing | Notification::Done)
    }
}
