use std::sync::Arc;

use cidian_types::ResultUpdate;
use kanal::AsyncSender;
use tokio::task::JoinHandle;

use crate::session::Session;

/// Run a query in the background.
///
/// Partial and final lists travel over the same `updates` channel so the UI
/// never sees a partial after the final list of its query.
pub fn handle_text_input(
    session: Arc<Session>,
    text: String,
    updates_tx: AsyncSender<ResultUpdate>,
) -> JoinHandle<()> {
    tracing::debug!("Query: '{}'", text);

    tokio::spawn(async move {
        let Some(update) = session.submit(&text, &updates_tx).await else {
            return;
        };

        tracing::debug!("{} results for '{}'", update.items.len(), update.query);
        if let Err(e) = updates_tx.send(update).await {
            tracing::error!("Failed to send results to UI: {}", e);
        }
    })
}
