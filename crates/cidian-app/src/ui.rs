use std::fmt::Write as _;
use std::io::Write as _;

use cidian_types::{AppEvent, ResultUpdate};
use kanal::AsyncReceiver;

/// Plain-text renderer. Drops pushes from queries older than the newest seen
/// and partials of a query whose final list is already shown.
#[derive(Debug, Default)]
pub struct Renderer {
    latest: u64,
    finalized: u64,
}

impl Renderer {
    pub fn render(&mut self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::ResultsUpdated(update) => self.results(update, false),
            AppEvent::ShowResults(update) => self.results(update, true),
            AppEvent::StatusUpdate(status) => Some(format!("-- {status}")),
            AppEvent::OpenUrl(url) => Some(format!("Open: {url}")),
            AppEvent::TextInput(_) | AppEvent::Select(_) => None,
        }
    }

    fn results(&mut self, update: &ResultUpdate, done: bool) -> Option<String> {
        if update.query_id < self.latest || (!done && update.query_id <= self.finalized) {
            return None;
        }
        self.latest = update.query_id;
        if done {
            self.finalized = update.query_id;
        }

        let mut out = if done {
            format!("[{}]\n", update.query)
        } else {
            format!("[{}] ...\n", update.query)
        };
        for (idx, item) in update.items.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {}", idx + 1, item.title);
            if !item.subtitle.is_empty() {
                let _ = writeln!(out, "     {}", item.subtitle);
            }
        }
        Some(out)
    }
}

pub async fn ui_loop(app_to_ui_rx: AsyncReceiver<AppEvent>) -> anyhow::Result<()> {
    let mut renderer = Renderer::default();

    loop {
        let event = app_to_ui_rx.recv().await?;
        if let Some(text) = renderer.render(&event) {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
            stdout.flush()?;
        }
    }
}
