//! Store event loop.
//!
//! One task owns [`ListState`] exclusively; intents and feed notifications
//! arrive on channels and are applied one transition at a time, in dispatch
//! order. Every applied transition publishes a fresh snapshot on the watch
//! channel.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use tableside_api::{ApiClient, FeedEvent};
use tableside_shared::ClientId;

use crate::state::{Action, DraftField, ListState};

/// Intents sent into the store loop by the session handle.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    /// Replace one draft field.
    Edit(DraftField, String),
    /// Apply the draft optimistically and create it remotely.
    Submit,
    /// Stop the loop.
    Shutdown,
}

pub(crate) struct StoreLoop {
    pub state: ListState,
    pub client_id: ClientId,
    pub api: ApiClient,
    pub cmd_rx: mpsc::Receiver<SessionCommand>,
    /// Transitions dispatched by effect tasks (initial fetch, failed
    /// creates). The loop holds a sender too, for the creates it spawns.
    pub action_rx: mpsc::Receiver<Action>,
    pub action_tx: mpsc::Sender<Action>,
    pub feed_rx: mpsc::Receiver<FeedEvent>,
    pub state_tx: watch::Sender<ListState>,
}

impl StoreLoop {
    pub async fn run(mut self) {
        info!(client = %self.client_id, "Store loop started");
        let mut feed_open = true;

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Edit(field, value)) => {
                            self.dispatch(Action::Edit(field, value));
                        }
                        Some(SessionCommand::Submit) => self.submit(),
                        Some(SessionCommand::Shutdown) => {
                            info!("Session shutdown requested");
                            break;
                        }
                        None => {
                            // Handle dropped without an explicit shutdown.
                            break;
                        }
                    }
                }
                action = self.action_rx.recv() => {
                    match action {
                        Some(action) => self.dispatch(action),
                        None => break,
                    }
                }
                event = self.feed_rx.recv(), if feed_open => {
                    match event {
                        Some(FeedEvent::Created(restaurant)) => {
                            self.dispatch(Action::AppendRemote(restaurant));
                        }
                        Some(FeedEvent::Lost(e)) => {
                            error!(error = %e, "Subscription feed lost");
                            self.dispatch(Action::MarkError);
                        }
                        None => {
                            warn!("Feed channel closed");
                            feed_open = false;
                        }
                    }
                }
            }
        }

        info!("Store loop terminated");
    }

    /// Apply one transition and publish the new snapshot.
    fn dispatch(&mut self, action: Action) {
        debug!(action = ?action, "Applying transition");
        self.state.apply(action, &self.client_id);
        self.state_tx.send_replace(self.state.clone());
    }

    /// Optimistic create: the draft lands in the list immediately; the
    /// remote call runs in the background. A failed call latches the error
    /// flag and the optimistic entry stays.
    fn submit(&mut self) {
        let draft = self.state.draft.clone();
        let record = draft.clone().into_record(self.client_id.clone());
        self.dispatch(Action::AppendLocal(draft));

        let api = self.api.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = api.create_restaurant(&record).await {
                error!(error = %e, name = %record.name, "Create failed");
                let _ = action_tx.send(Action::MarkError).await;
            }
        });
    }
}
