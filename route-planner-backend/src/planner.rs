//! Route planners behind the development server's route endpoint.
//!
//! No routing engine lives here. [`ValidatingPlanner`] checks a request the way the production
//! endpoint does, treats stops in more than one country as unroutable, and hands out route keys.

use route_planner_shared::{model::ADDRESS_FIELDS, PlaceCard, RouteRequest};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;

pub const MAX_INTERMEDIATE_ADDRESSES: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("The addresses could not be connected by a route.")]
    NotRoutable,
    #[error("{0}")]
    Invalid(String),
}

#[async_trait::async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Plans the route and returns the key it can be looked up by.
    async fn plan(&self, request: &RouteRequest) -> Result<String, PlanError>;
}

#[derive(Default)]
pub struct ValidatingPlanner {
    issued: AtomicU64,
}

/// Upper case, trimmed, single spaced.
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn normalized_address(card: &PlaceCard) -> BTreeMap<&'static str, String> {
    ADDRESS_FIELDS
        .iter()
        .map(|field| (*field, normalize(card.get(field).unwrap_or_default())))
        .collect()
}

fn validate_card(label: &str, card: &PlaceCard) -> Result<(), PlanError> {
    for field in ADDRESS_FIELDS {
        match card.get(field) {
            None => {
                return Err(PlanError::Invalid(format!(
                    "Required key '{}' is missing from '{}'.",
                    field, label
                )))
            }
            Some(value) if value.trim().is_empty() => {
                return Err(PlanError::Invalid(format!(
                    "Value for '{}' in '{}' is empty.",
                    field, label
                )))
            }
            Some(_) => {}
        }
    }

    Ok(())
}

impl ValidatingPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(request: &RouteRequest) -> Result<(), PlanError> {
        validate_card("start_address", &request.start_address)?;
        validate_card("end_address", &request.end_address)?;
        for card in &request.intermediate_addresses {
            validate_card("intermediate_addresses", card)?;
        }

        let stops = request.intermediate_addresses.len();
        if stops > MAX_INTERMEDIATE_ADDRESSES {
            return Err(PlanError::Invalid(format!(
                "The server cannot process more than {} intermediate addresses at once.",
                MAX_INTERMEDIATE_ADDRESSES
            )));
        }
        if stops == 0
            && normalized_address(&request.start_address)
                == normalized_address(&request.end_address)
        {
            return Err(PlanError::Invalid(
                "The start and end addresses are the same, but there are no intermediate addresses."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl RoutePlanner for ValidatingPlanner {
    async fn plan(&self, request: &RouteRequest) -> Result<String, PlanError> {
        Self::validate(request)?;

        let countries: BTreeSet<String> = request
            .stops()
            .filter_map(|card| card.get("country"))
            .map(normalize)
            .collect();
        if countries.len() > 1 {
            log::warn!("Route spans several countries: {:?}", countries);
            return Err(PlanError::NotRoutable);
        }

        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("{:016x}", n))
    }
}
