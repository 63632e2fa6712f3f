use std::sync::Arc;

use cidian_types::{AppEvent, ResultUpdate};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{event_loop, forward_updates};
use crate::io::watcher_io;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Incremental pushes from running lookups
    pub updates: (AsyncSender<ResultUpdate>, AsyncReceiver<ResultUpdate>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256),
            ui_to_app: kanal::bounded_async(64),
            updates: kanal::bounded_async(256),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.channels.updates.0.clone(),
        ));

        tasks.spawn(forward_updates(
            self.channels.updates.1.clone(),
            self.channels.app_to_ui.0.clone(),
        ));

        tasks.spawn(ui_loop(self.channels.app_to_ui.1.clone()));

        // The reader cancels the token itself on `:q` or end of input
        tasks.spawn(watcher_io(
            self.cancel_token.clone(),
            self.channels.ui_to_app.0.clone(),
        ));

        tasks
    }

    /// Resolves once the user asked to quit
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await;
    }

    pub fn shutdown(&self) {
        self.state.session.cancel();
        self.cancel_token.cancel();
    }
}
