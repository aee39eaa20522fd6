use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one running client installation.
///
/// Generated once per session and attached to every record this instance
/// creates, so the subscription bridge can tell its own writes apart from
/// other clients' writes. Opaque on the wire; never shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Generate a fresh identifier for this running instance.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One restaurant record as exchanged with the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    pub description: String,
    pub city: String,
    /// Installation that created the record. Only consulted for echo
    /// suppression on the subscription feed.
    pub client_id: ClientId,
}

/// In-progress form fields for a record that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantDraft {
    pub name: String,
    pub description: String,
    pub city: String,
}

impl RestaurantDraft {
    /// Turn the draft into a full record tagged with the creating client.
    pub fn into_record(self, client_id: ClientId) -> Restaurant {
        Restaurant {
            name: self.name,
            description: self.description,
            city: self.city,
            client_id,
        }
    }
}
