use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use tui_textarea::TextArea;

use crate::chat::models::{ChatSession, SendError};
use crate::chat::services::{GeminiAgent, StreamEvent, spawn_stream_pump};
use crate::settings::models::SettingsModel;
use crate::settings::repositories::SettingsRepository;
use crate::trivia::{TriviaBoard, TriviaEvent};
use crate::ui::theme::Theme;

/// Which input widget receives keystrokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Composer,
    ApiKey,
    Model,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Composer => Focus::ApiKey,
            Focus::ApiKey => Focus::Model,
            Focus::Model => Focus::Composer,
        }
    }
}

/// Canned prompts submitted immediately by F5..F7.
pub const SUGGESTIONS: [&str; 3] = [
    "What free exhibitions are on in Taipei today?",
    "Translate this: Hello from Taipei!",
    "Write a short poem about the metro",
];

/// All mutable UI state, owned by the event loop and updated only
/// through the handlers below.
pub struct App {
    pub session: ChatSession,
    pub settings: SettingsModel,
    pub trivia: TriviaBoard,
    pub composer: TextArea<'static>,
    pub focus: Focus,
    pub key_visible: bool,
    pub should_quit: bool,
    repository: Arc<dyn SettingsRepository>,
    stream_tx: UnboundedSender<StreamEvent>,
}

impl App {
    pub fn new(
        settings: SettingsModel,
        repository: Arc<dyn SettingsRepository>,
        stream_tx: UnboundedSender<StreamEvent>,
    ) -> Self {
        let mut composer = TextArea::default();
        composer.set_placeholder_text("Type a message. Enter sends, Alt+Enter adds a line.");

        let mut app = Self {
            session: ChatSession::new(),
            settings,
            trivia: TriviaBoard::default(),
            composer,
            focus: Focus::Composer,
            key_visible: false,
            should_quit: false,
            repository,
            stream_tx,
        };
        app.refresh_composer();
        app
    }

    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.settings.dark_mode)
    }

    pub fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else { return };
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('t') => {
                    self.settings.dark_mode = !self.settings.dark_mode;
                    self.persist_settings();
                    self.refresh_composer();
                    return;
                }
                KeyCode::Char('l') => {
                    if !self.session.clear() {
                        debug!("clear refused while a stream is active");
                    }
                    return;
                }
                KeyCode::Char('r') => {
                    self.settings.remember_key = !self.settings.remember_key;
                    self.persist_settings();
                    return;
                }
                KeyCode::Char('p') => {
                    self.key_visible = !self.key_visible;
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                self.refresh_composer();
                return;
            }
            KeyCode::F(5) => return self.submit(SUGGESTIONS[0].to_string()),
            KeyCode::F(6) => return self.submit(SUGGESTIONS[1].to_string()),
            KeyCode::F(7) => return self.submit(SUGGESTIONS[2].to_string()),
            _ => {}
        }

        match self.focus {
            Focus::Composer => self.handle_composer_key(key),
            Focus::ApiKey => self.handle_api_key_key(key),
            Focus::Model => self.handle_model_key(key),
        }
    }

    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Chunk { send_id, text } => self.session.apply_chunk(send_id, &text),
            StreamEvent::Finished { send_id } => self.session.finish(send_id),
            StreamEvent::Failed { send_id, message } => {
                warn!(send_id, error = %message, "stream failed");
                self.session.fail(send_id, &message);
            }
        }
    }

    pub fn handle_trivia(&mut self, event: TriviaEvent) {
        self.trivia.set(event.kind, event.text);
    }

    /// Validate and dispatch a send. Accepted sends clear the composer
    /// and hand the streaming work to a background task; the pumped
    /// events come back through the stream channel.
    pub fn submit(&mut self, text: String) {
        let ticket = match self.session.begin_send(&text, self.settings.has_api_key()) {
            Ok(ticket) => ticket,
            // Error is surfaced on the session (or the no-op is silent).
            Err(SendError::EmptyMessage | SendError::Busy | SendError::MissingApiKey) => return,
        };

        self.clear_composer();

        let api_key = self.settings.api_key.clone().unwrap_or_default();
        let model = self.settings.model.clone();
        let agent = match GeminiAgent::new(&api_key, &model) {
            Ok(agent) => agent,
            Err(error) => {
                warn!(error = %error, "failed to build Gemini client");
                self.session.fail(ticket.send_id, &error.to_string());
                return;
            }
        };

        info!(model = %model, send_id = ticket.send_id, "opening streaming request");
        let tx = self.stream_tx.clone();
        tokio::spawn(async move {
            let stream = agent.stream_reply(&ticket.history, &ticket.user_text).await;
            spawn_stream_pump(stream, ticket.send_id, tx);
        });
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.composer.insert_newline();
            }
            KeyCode::Enter => {
                let text = self.composer_text();
                self.submit(text);
            }
            _ => {
                self.composer.input(key);
            }
        }
    }

    fn handle_api_key_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.settings.api_key.get_or_insert_with(String::new).push(c);
                self.persist_settings();
            }
            KeyCode::Backspace => {
                if let Some(api_key) = self.settings.api_key.as_mut() {
                    api_key.pop();
                }
                self.persist_settings();
            }
            _ => {}
        }
    }

    fn handle_model_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.settings.model.push(c);
                self.persist_settings();
            }
            KeyCode::Backspace => {
                self.settings.model.pop();
                self.persist_settings();
            }
            _ => {}
        }
    }

    pub fn composer_text(&self) -> String {
        self.composer.lines().join("\n")
    }

    fn clear_composer(&mut self) {
        self.composer.select_all();
        self.composer.cut();
    }

    /// Save on every relevant change, through the storage view so the
    /// key is only written while remember-key is on.
    fn persist_settings(&self) {
        let repository = Arc::clone(&self.repository);
        let view = self.settings.storage_view();
        tokio::spawn(async move {
            if let Err(error) = repository.save(view).await {
                warn!(error = %error, "failed to save settings");
            }
        });
    }

    fn refresh_composer(&mut self) {
        let theme = self.theme();
        let border = if self.focus == Focus::Composer {
            theme.accent
        } else {
            theme.border
        };
        self.composer.set_style(Style::default().fg(theme.text));
        self.composer.set_cursor_line_style(Style::default());
        self.composer.set_placeholder_style(Style::default().fg(theme.dim));
        self.composer.set_block(
            Block::bordered()
                .border_style(Style::default().fg(border))
                .title("Message"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::SendPhase;
    use crate::settings::repositories::JsonSettingsRepository;
    use crate::trivia::TriviaKind;
    use tokio::sync::mpsc;

    fn test_app(settings: SettingsModel) -> (App, mpsc::UnboundedReceiver<StreamEvent>) {
        let dir = std::env::temp_dir().join(format!("gemterm-test-{}", std::process::id()));
        let repository = Arc::new(JsonSettingsRepository::with_path(dir.join("settings.json")));
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(settings, repository, tx), rx)
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        assert_eq!(Focus::Composer.next(), Focus::ApiKey);
        assert_eq!(Focus::ApiKey.next(), Focus::Model);
        assert_eq!(Focus::Model.next(), Focus::Composer);
    }

    #[tokio::test]
    async fn submit_without_key_surfaces_an_error_and_sends_nothing() {
        let (mut app, _rx) = test_app(SettingsModel::default());

        app.submit("Hello".into());

        assert!(app.session.error().is_some());
        assert_eq!(app.session.conversation().len(), 1);
        assert_eq!(app.session.phase(), SendPhase::Idle);
    }

    #[tokio::test]
    async fn stream_events_flow_into_the_session() {
        let (mut app, _rx) = test_app(SettingsModel {
            api_key: Some("AIza-test".into()),
            ..SettingsModel::default()
        });
        app.submit("Hello".into());
        let send_id = 1;

        app.handle_stream_event(StreamEvent::Chunk {
            send_id,
            text: "Hi".into(),
        });
        app.handle_stream_event(StreamEvent::Chunk {
            send_id,
            text: " there".into(),
        });
        app.handle_stream_event(StreamEvent::Finished { send_id });

        let messages = app.session.conversation().messages();
        assert_eq!(messages[2].text(), "Hi there");
        assert_eq!(app.session.phase(), SendPhase::Idle);
    }

    #[tokio::test]
    async fn trivia_events_fill_their_own_field() {
        let (mut app, _rx) = test_app(SettingsModel::default());

        app.handle_trivia(TriviaEvent {
            kind: TriviaKind::Joke,
            text: "a joke".into(),
        });

        assert_eq!(app.trivia.get(TriviaKind::Joke), Some("a joke"));
        assert_eq!(app.trivia.get(TriviaKind::CatFact), None);
    }

    #[tokio::test]
    async fn ctrl_t_flips_the_theme() {
        let (mut app, _rx) = test_app(SettingsModel::default());
        assert!(!app.settings.dark_mode);

        app.handle_input(press(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert!(app.settings.dark_mode);
    }

    #[tokio::test]
    async fn typing_into_the_composer_does_not_touch_settings() {
        let (mut app, _rx) = test_app(SettingsModel::default());

        app.handle_input(press(KeyCode::Char('h'), KeyModifiers::NONE));
        app.handle_input(press(KeyCode::Char('i'), KeyModifiers::NONE));

        assert_eq!(app.composer_text(), "hi");
        assert!(app.settings.api_key.is_none());
    }

    #[tokio::test]
    async fn key_field_edits_accumulate() {
        let (mut app, _rx) = test_app(SettingsModel::default());
        app.handle_input(press(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.focus, Focus::ApiKey);

        app.handle_input(press(KeyCode::Char('a'), KeyModifiers::NONE));
        app.handle_input(press(KeyCode::Char('b'), KeyModifiers::NONE));
        app.handle_input(press(KeyCode::Backspace, KeyModifiers::NONE));

        assert_eq!(app.settings.api_key.as_deref(), Some("a"));
    }
}
