//! GraphQL operation documents and JSON envelopes.
//!
//! The schema is owned by the hosted backend; this module only mirrors the
//! three operations the client uses and the envelope shapes needed to
//! encode requests and decode responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tableside_shared::{Restaurant, TransportError};

/// Query returning every restaurant record.
pub const LIST_RESTAURANTS: &str = "\
query ListRestaurants {
  listRestaurants {
    items {
      name
      description
      city
      clientId
    }
  }
}";

/// Mutation creating a single restaurant record.
pub const CREATE_RESTAURANT: &str = "\
mutation CreateRestaurant($input: CreateRestaurantInput!) {
  createRestaurant(input: $input) {
    name
    description
    city
    clientId
  }
}";

/// Subscription firing once per created restaurant, from any client.
pub const ON_CREATE_RESTAURANT: &str = "\
subscription OnCreateRestaurant {
  onCreateRestaurant {
    name
    description
    city
    clientId
  }
}";

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl<'a> GraphQlRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            variables: None,
        }
    }

    pub fn with_variables(query: &'a str, variables: Value) -> Self {
        Self {
            query,
            variables: Some(variables),
        }
    }
}

/// Incoming response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of a response `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Unwrap the envelope. A non-empty `errors` array is a failure even
    /// when the HTTP status was a success.
    pub fn into_data(self) -> Result<T, TransportError> {
        if let Some(err) = self.errors.first() {
            return Err(TransportError::Api(err.message.clone()));
        }
        self.data.ok_or_else(|| {
            TransportError::Decode("response carried neither data nor errors".to_string())
        })
    }
}

/// `data` shape of the list query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub list_restaurants: RestaurantPage,
}

/// Connection wrapper around the item list.
#[derive(Debug, Deserialize)]
pub struct RestaurantPage {
    pub items: Vec<Restaurant>,
}

/// `data` shape of the create mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateData {
    pub create_restaurant: Restaurant,
}

/// `data` shape of one subscription event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub on_create_restaurant: Restaurant,
}

/// Decode one subscription frame payload into the created record.
///
/// A payload that does not carry the expected event shape is rejected with
/// an error rather than dropped; the caller decides how to surface it.
pub fn decode_created_event(payload: &str) -> Result<Restaurant, TransportError> {
    let envelope: GraphQlResponse<SubscriptionData> = serde_json::from_str(payload)
        .map_err(|e| TransportError::Decode(format!("subscription frame: {e}")))?;
    Ok(envelope.into_data()?.on_create_restaurant)
}
