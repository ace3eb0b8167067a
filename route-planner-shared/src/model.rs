use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
};

/// Field names the route generation endpoint expects in every place card.
pub const ADDRESS_FIELDS: [&str; 5] = ["street", "city", "state", "postal_code", "country"];

/// One address as typed into a group of named inputs, field name to current value.
///
/// Serializes as a flat JSON object. Inserting a name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceCard(BTreeMap<String, String>);

impl PlaceCard {
    pub fn new() -> Self {
        PlaceCard(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PlaceCard
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut card = PlaceCard::new();
        for (name, value) in iter {
            card.insert(name, value);
        }
        card
    }
}

/// Body of a route generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_address: PlaceCard,
    #[serde(default)]
    pub intermediate_addresses: Vec<PlaceCard>,
    pub end_address: PlaceCard,
}

impl RouteRequest {
    /// Every stop in travel order, start first and end last.
    pub fn stops(&self) -> impl Iterator<Item = &PlaceCard> {
        std::iter::once(&self.start_address)
            .chain(self.intermediate_addresses.iter())
            .chain(std::iter::once(&self.end_address))
    }
}

/// Credential embedded in the page and attached to every route request.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Pulls the token back out of an `Authorization` header value.
    pub fn from_authorization_header(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }

        Some(BearerToken::new(token))
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Headers sent with a route generation request.
pub fn request_headers(token: &BearerToken) -> [(&'static str, String); 3] {
    [
        ("Accept", "application/json".to_string()),
        ("Content-Type", "application/json".to_string()),
        ("Authorization", token.authorization_header()),
    ]
}
