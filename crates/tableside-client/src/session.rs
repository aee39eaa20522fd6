//! Presentation-facing session handle.
//!
//! A [`Session`] owns one screen's worth of live list state: the
//! subscription feed, the store loop, and the initial fetch. The
//! presentation layer observes snapshots and calls the intent methods;
//! everything else happens behind the handle.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use tableside_api::{spawn_feed, ApiClient, ApiConfig, FeedHandle};
use tableside_shared::constants::COMMAND_CHANNEL_CAPACITY;
use tableside_shared::ClientId;

use crate::bridge::{SessionCommand, StoreLoop};
use crate::state::{Action, DraftField, ListState};

/// One live restaurant-list screen.
///
/// Dropping the session releases the subscription stream and stops the
/// store loop; [`Session::shutdown`] does the same gracefully.
pub struct Session {
    client_id: ClientId,
    cmd_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<ListState>,
    feed: Option<FeedHandle>,
    store_task: JoinHandle<()>,
}

impl Session {
    /// Start a session: open the subscription feed, start the store loop,
    /// and kick off the initial list fetch.
    ///
    /// The fetch and the feed race; a record that arrives on the feed
    /// before the fetch resolves is discarded by the fetch's replace
    /// unless the fetch result already contains it.
    pub async fn start(config: ApiConfig) -> anyhow::Result<Self> {
        let client_id = ClientId::generate();
        let api = ApiClient::new(config.clone())?;

        info!(client = %client_id, endpoint = %config.endpoint, "Starting session");

        let (feed, feed_rx) = spawn_feed(&config);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (action_tx, action_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ListState::default());

        let store_task = tokio::spawn(
            StoreLoop {
                state: ListState::default(),
                client_id: client_id.clone(),
                api: api.clone(),
                cmd_rx,
                action_rx,
                action_tx: action_tx.clone(),
                feed_rx,
                state_tx,
            }
            .run(),
        );

        // The initial fetch resolves into exactly one transition.
        tokio::spawn(async move {
            match api.list_restaurants().await {
                Ok(restaurants) => {
                    let _ = action_tx.send(Action::Replace(restaurants)).await;
                }
                Err(e) => {
                    error!(error = %e, "Initial fetch failed");
                    let _ = action_tx.send(Action::MarkError).await;
                }
            }
        });

        Ok(Self {
            client_id,
            cmd_tx,
            state_rx,
            feed: Some(feed),
            store_task,
        })
    }

    /// Identifier this instance tags its own records with.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Clone of the latest published snapshot.
    pub fn snapshot(&self) -> ListState {
        self.state_rx.borrow().clone()
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state_rx.clone()
    }

    /// Replace the draft name.
    pub async fn set_name(&self, value: impl Into<String>) {
        self.edit(DraftField::Name, value.into()).await;
    }

    /// Replace the draft description.
    pub async fn set_description(&self, value: impl Into<String>) {
        self.edit(DraftField::Description, value.into()).await;
    }

    /// Replace the draft city.
    pub async fn set_city(&self, value: impl Into<String>) {
        self.edit(DraftField::City, value.into()).await;
    }

    /// Append the draft to the list immediately and create it remotely.
    ///
    /// The remote result is not reconciled: a failure latches the error
    /// flag and the optimistic entry stays in the list.
    pub async fn submit(&self) {
        if self.cmd_tx.send(SessionCommand::Submit).await.is_err() {
            warn!("Store loop gone, submit dropped");
        }
    }

    /// Orderly teardown: closes the subscription and stops the store loop.
    pub async fn shutdown(mut self) {
        if let Some(feed) = self.feed.take() {
            feed.shutdown().await;
        }
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
        let _ = (&mut self.store_task).await;
    }

    async fn edit(&self, field: DraftField, value: String) {
        if self
            .cmd_tx
            .send(SessionCommand::Edit(field, value))
            .await
            .is_err()
        {
            warn!("Store loop gone, edit dropped");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The feed handle aborts its own task when dropped.
        self.store_task.abort();
    }
}
