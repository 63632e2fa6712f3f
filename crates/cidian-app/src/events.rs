use std::sync::Arc;

use cidian_types::{AppEvent, ResultUpdate};
use kanal::{AsyncReceiver, AsyncSender};

use crate::state::AppState;

pub mod query;
pub mod select;

use query::handle_text_input;
use select::handle_select;

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    updates_tx: AsyncSender<ResultUpdate>,
) -> anyhow::Result<()> {
    tracing::info!("Event loop started");
    loop {
        let event = ui_to_app_rx.recv().await?;
        tracing::debug!("Event received: {:?}", std::mem::discriminant(&event));

        handle_events(&state, &app_to_ui_tx, &updates_tx, event).await?;
    }
}

async fn handle_events(
    state: &Arc<AppState>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    updates_tx: &AsyncSender<ResultUpdate>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::TextInput(text) => {
            // Lookups run detached so the next query can cancel this one
            handle_text_input(state.session.clone(), text, updates_tx.clone());
        }
        AppEvent::Select(index) => {
            handle_select(&state.session, index, app_to_ui_tx, updates_tx).await?;
        }
        AppEvent::ResultsUpdated(_)
        | AppEvent::ShowResults(_)
        | AppEvent::StatusUpdate(_)
        | AppEvent::OpenUrl(_) => {
            // UI-only events, ignore in backend
        }
    }

    Ok(())
}

/// Relay lookup results to the UI in the order lookups produced them
pub async fn forward_updates(
    updates_rx: AsyncReceiver<ResultUpdate>,
    app_to_ui_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        let update = updates_rx.recv().await?;
        let event = if update.done {
            AppEvent::ShowResults(update)
        } else {
            AppEvent::ResultsUpdated(update)
        };
        app_to_ui_tx.send(event).await?;
    }
}
