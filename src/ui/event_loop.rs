use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::debug;

use crate::settings::models::SettingsModel;
use crate::settings::repositories::SettingsRepository;
use crate::trivia;
use crate::ui::app::App;
use crate::ui::render;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the UI until quit.
///
/// All state lives in [`App`], owned by this loop; the three event
/// sources (terminal input, stream chunks, trivia results) arrive over
/// channels, and every handled event is followed by a redraw.
pub async fn run(
    mut terminal: DefaultTerminal,
    settings: SettingsModel,
    repository: Arc<dyn SettingsRepository>,
) -> Result<()> {
    let (stream_tx, mut stream_rx) = mpsc::unbounded_channel();
    let (trivia_tx, mut trivia_rx) = mpsc::unbounded_channel();
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();

    spawn_input_reader(input_tx);
    trivia::spawn_fetches(reqwest::Client::new(), trivia_tx);

    let mut app = App::new(settings, repository, stream_tx);

    while !app.should_quit {
        terminal.draw(|frame| render::draw(frame, &app))?;

        tokio::select! {
            Some(event) = input_rx.recv() => app.handle_input(event),
            Some(event) = stream_rx.recv() => app.handle_stream_event(event),
            Some(event) = trivia_rx.recv() => app.handle_trivia(event),
            else => break,
        }
    }

    debug!("event loop finished");
    Ok(())
}

/// Forward crossterm events into the app channel. Polling runs on the
/// blocking pool so the reader never stalls the async loop.
fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        loop {
            let ready =
                tokio::task::spawn_blocking(|| event::poll(INPUT_POLL_INTERVAL)).await;
            match ready {
                Ok(Ok(true)) => match tokio::task::spawn_blocking(event::read).await {
                    Ok(Ok(event)) => {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                    _ => return,
                },
                Ok(Ok(false)) => {
                    if tx.is_closed() {
                        return;
                    }
                }
                _ => return,
            }
        }
    });
}
