use std::sync::Arc;
use std::time::Duration;

use cidian_config::Config;
use cidian_core::LookupOptions;
use cidian_types::{AppEvent, ItemAction, ResultUpdate};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::timeout;

use super::*;
use crate::events::{event_loop, forward_updates};
use crate::state::AppState;
use crate::ui::Renderer;

struct Harness {
    ui_to_app: AsyncSender<AppEvent>,
    app_to_ui: AsyncReceiver<AppEvent>,
}

impl Harness {
    fn start(session: Arc<Session>) -> Self {
        let state = Arc::new(AppState {
            config: Config::default(),
            session,
        });
        let (ui_tx, ui_rx) = kanal::unbounded_async::<AppEvent>();
        let (app_tx, app_rx) = kanal::unbounded_async::<AppEvent>();
        let (updates_tx, updates_rx) = kanal::unbounded_async::<ResultUpdate>();

        tokio::spawn(event_loop(state, ui_rx, app_tx.clone(), updates_tx));
        tokio::spawn(forward_updates(updates_rx, app_tx));

        Self {
            ui_to_app: ui_tx,
            app_to_ui: app_rx,
        }
    }

    async fn recv(&self) -> AppEvent {
        timeout(Duration::from_secs(5), self.app_to_ui.recv())
            .await
            .expect("event never arrived")
            .unwrap()
    }

    async fn send(&self, event: AppEvent) {
        self.ui_to_app.send(event).await.unwrap();
    }

    /// Next UI event accepted by `pick`, skipping the rest
    async fn next<T>(&self, pick: impl Fn(AppEvent) -> Option<T>) -> T {
        let wait = async {
            loop {
                let event = self.app_to_ui.recv().await.unwrap();
                if let Some(found) = pick(event) {
                    return found;
                }
            }
        };
        timeout(Duration::from_secs(5), wait)
            .await
            .expect("event never arrived")
    }

    async fn results(&self) -> ResultUpdate {
        self.next(|event| match event {
            AppEvent::ShowResults(update) => Some(update),
            _ => None,
        })
        .await
    }

    async fn status(&self) -> String {
        self.next(|event| match event {
            AppEvent::StatusUpdate(status) => Some(status),
            _ => None,
        })
        .await
    }
}

#[tokio::test]
async fn text_input_shows_results() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "", LookupOptions::default()));

    harness.send(AppEvent::TextInput("banana".to_string())).await;
    let update = harness.results().await;

    assert_eq!(update.query, "banana");
    assert_eq!(update.items[0].title, "banana");
}

#[tokio::test]
async fn lookups_push_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "", LookupOptions::default()));

    harness.send(AppEvent::TextInput("apple".to_string())).await;
    let partial = harness
        .next(|event| match event {
            AppEvent::ResultsUpdated(update) => Some(update),
            _ => None,
        })
        .await;

    assert_eq!(partial.query, "apple");
    assert_eq!(partial.items[0].title, "apple");
}

#[tokio::test]
async fn selecting_a_word_opens_its_details() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "", LookupOptions::default()));

    harness.send(AppEvent::TextInput("apple".to_string())).await;
    harness.results().await;

    harness.send(AppEvent::Select(1)).await;
    assert_eq!(harness.status().await, "> apple!");

    let details = harness.results().await;
    assert_eq!(details.query, "apple!");
    assert_eq!(details.items[1].title, "Translation");
}

#[tokio::test]
async fn selecting_past_the_list_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "", LookupOptions::default()));

    harness.send(AppEvent::Select(7)).await;

    assert_eq!(harness.status().await, "No item 7");
}

#[tokio::test]
async fn info_rows_open_the_word_website() {
    let dir = tempfile::tempdir().unwrap();
    let options = LookupOptions {
        word_website: "https://dict.example/{}".to_string(),
        ..LookupOptions::default()
    };
    let harness = Harness::start(ready_session(dir.path(), "", options));

    harness.send(AppEvent::TextInput("apple!".to_string())).await;
    let details = harness.results().await;
    assert_eq!(
        details.items[0].action,
        ItemAction::OpenUrl("https://dict.example/apple".to_string())
    );

    harness.send(AppEvent::Select(1)).await;
    let url = harness
        .next(|event| match event {
            AppEvent::OpenUrl(url) => Some(url),
            _ => None,
        })
        .await;

    assert_eq!(url, "https://dict.example/apple");
}

#[tokio::test]
async fn start_download_keeps_showing_status() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_with(
        words(),
        &dir.path().join("dicts").join("ecdict.db"),
        "",
        LookupOptions::default(),
    );
    let harness = Harness::start(session);

    harness.send(AppEvent::TextInput("apple".to_string())).await;
    let status = harness.results().await;
    assert_eq!(status.items[0].action, ItemAction::StartDownload);

    harness.send(AppEvent::Select(1)).await;
    let after = harness.results().await;

    // The unreachable server fails the attempt quickly; either way the
    // query is still answered by the bootstrap row
    assert_eq!(after.query, "apple");
    assert_eq!(after.items.len(), 1);
    assert!(matches!(
        after.items[0].action,
        ItemAction::StartDownload | ItemAction::RefreshProgress
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_partial_follows_the_final_list() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "", LookupOptions::default()));
    let mut renderer = Renderer::default();
    let mut finalized = 0;
    let mut screen_is_final = false;

    for _ in 0..200 {
        harness.send(AppEvent::TextInput("apple".to_string())).await;
        loop {
            let event = harness.recv().await;
            match &event {
                AppEvent::ResultsUpdated(update) => {
                    assert!(
                        update.query_id > finalized,
                        "partial of query {} after its final list",
                        update.query_id
                    );
                    if renderer.render(&event).is_some() {
                        screen_is_final = false;
                    }
                }
                AppEvent::ShowResults(update) => {
                    let id = update.query_id;
                    assert!(renderer.render(&event).is_some());
                    screen_is_final = true;
                    finalized = id;
                    break;
                }
                _ => {}
            }
        }
    }

    assert!(screen_is_final);
}

#[tokio::test]
async fn pivot_drops_the_keyword_before_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::start(ready_session(dir.path(), "d", LookupOptions::default()));

    harness.send(AppEvent::TextInput("apple".to_string())).await;
    harness.results().await;

    harness.send(AppEvent::Select(1)).await;
    assert_eq!(harness.status().await, "> d apple!");

    let details = harness.results().await;
    assert_eq!(details.query, "apple!");
    assert_eq!(details.items[1].title, "Translation");
}
