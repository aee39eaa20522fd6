//! The restaurant list store.
//!
//! State only changes through [`ListState::apply`], a synchronous, total
//! transition over one [`Action`] at a time. The session loop owns the
//! state exclusively and applies transitions in the order they are
//! dispatched; nothing else may mutate it.

use tableside_shared::{ClientId, Restaurant, RestaurantDraft};

/// Which draft field an [`Action::Edit`] replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    City,
}

/// One store transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the whole list with the initial fetch result.
    Replace(Vec<Restaurant>),
    /// Optimistically append a draft as a record of this client.
    AppendLocal(RestaurantDraft),
    /// Append a record announced on the subscription feed, unless it is
    /// this client's own echo.
    AppendRemote(Restaurant),
    /// Replace a single draft field.
    Edit(DraftField, String),
    /// Latch the error flag.
    MarkError,
}

/// Screen state for the restaurant list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    /// Known records, in the order they became known to this instance:
    /// fetch order first, append order afterwards. Never re-sorted.
    pub restaurants: Vec<Restaurant>,
    /// In-progress form fields.
    pub draft: RestaurantDraft,
    /// Latched on the first transport failure; never cleared.
    pub error: bool,
}

impl ListState {
    /// Apply one transition.
    ///
    /// `local_id` identifies this running instance: [`Action::AppendLocal`]
    /// tags the new record with it, and [`Action::AppendRemote`] drops
    /// records carrying it, so a record created here appears exactly once
    /// no matter how many clients are connected. Suppression is purely by
    /// identity; there is no content dedup and no reconciliation against
    /// server-assigned ids.
    pub fn apply(&mut self, action: Action, local_id: &ClientId) {
        match action {
            Action::Replace(restaurants) => {
                self.restaurants = restaurants;
            }
            Action::AppendLocal(draft) => {
                self.restaurants.push(draft.into_record(local_id.clone()));
            }
            Action::AppendRemote(restaurant) => {
                if restaurant.client_id == *local_id {
                    // Server echo of our own optimistic append.
                    return;
                }
                self.restaurants.push(restaurant);
            }
            Action::Edit(field, value) => match field {
                DraftField::Name => self.draft.name = value,
                DraftField::Description => self.draft.description = value,
                DraftField::City => self.draft.city = value,
            },
            Action::MarkError => {
                self.error = true;
            }
        }
    }
}
