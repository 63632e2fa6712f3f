use std::sync::Arc;

use cidian_types::{AppEvent, ItemAction, ResultUpdate};
use kanal::AsyncSender;

use crate::session::Session;

use super::query::handle_text_input;

/// Run the action of the n-th item of the last result list
pub async fn handle_select(
    session: &Arc<Session>,
    index: usize,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    updates_tx: &AsyncSender<ResultUpdate>,
) -> anyhow::Result<()> {
    let Some(action) = session.select(index) else {
        app_to_ui_tx
            .send(AppEvent::StatusUpdate(format!("No item {index}")))
            .await?;
        return Ok(());
    };

    tracing::debug!("Item {} selected: {:?}", index, action);
    match action {
        ItemAction::None => {}
        ItemAction::ChangeQuery(text) => {
            app_to_ui_tx
                .send(AppEvent::StatusUpdate(format!("> {text}")))
                .await?;
            let text = session.pivot_query(&text).to_string();
            handle_text_input(session.clone(), text, updates_tx.clone());
        }
        ItemAction::OpenUrl(url) => {
            app_to_ui_tx.send(AppEvent::OpenUrl(url)).await?;
        }
        ItemAction::StartDownload => {
            if session.bootstrap().begin_download() {
                tracing::info!("Dictionary download started");
            }
            rerun_last(session, updates_tx);
        }
        ItemAction::RefreshProgress => {
            rerun_last(session, updates_tx);
        }
    }

    Ok(())
}

fn rerun_last(session: &Arc<Session>, updates_tx: &AsyncSender<ResultUpdate>) {
    handle_text_input(session.clone(), session.last_query(), updates_tx.clone());
}
