use cidian_types::AppEvent;
use kanal::AsyncSender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// One line typed on stdin
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Query(String),
    /// `:N` selects the n-th item of the last list
    Select(usize),
    /// `:q`
    Quit,
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed.strip_prefix(':') {
        Some("q" | "quit") => Input::Quit,
        Some(rest) => match rest.parse::<usize>() {
            Ok(index) => Input::Select(index),
            Err(_) => Input::Query(trimmed.to_string()),
        },
        None => Input::Query(trimmed.to_string()),
    }
}

/// Stdin reader, forwards queries and selections to the app
pub async fn watcher_io(cancel: CancellationToken, event_tx: AsyncSender<AppEvent>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Input reader stopping");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("Input closed");
            cancel.cancel();
            return Ok(());
        };

        let event = match parse_line(&line) {
            Input::Quit => {
                cancel.cancel();
                return Ok(());
            }
            Input::Select(index) => AppEvent::Select(index),
            Input::Query(text) => AppEvent::TextInput(text),
        };

        event_tx.send(event).await?;
    }
}
