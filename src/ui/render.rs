use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::chat::models::{Role, SendPhase};
use crate::trivia::TriviaKind;
use crate::ui::app::{App, Focus, SUGGESTIONS};
use crate::ui::theme::Theme;

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.theme();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.text)),
        frame.area(),
    );

    let [main_area, trivia_area] =
        Layout::vertical([Constraint::Min(10), Constraint::Length(6)]).areas(frame.area());
    let [settings_area, chat_area] =
        Layout::horizontal([Constraint::Length(38), Constraint::Min(30)]).areas(main_area);

    draw_settings(frame, app, settings_area, &theme);
    draw_chat(frame, app, chat_area, &theme);
    draw_trivia(frame, app, trivia_area, &theme);
}

fn field_marker(focused: bool) -> &'static str {
    if focused { "▸ " } else { "  " }
}

fn draw_settings(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let label = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme.dim);

    let api_key = app.settings.api_key.as_deref().unwrap_or_default();
    let key_display = if app.key_visible {
        api_key.to_string()
    } else {
        "•".repeat(api_key.chars().count())
    };

    let lines = vec![
        Line::from(vec![
            Span::raw(field_marker(app.focus == Focus::Model)),
            Span::styled("Model: ", label),
            Span::raw(app.settings.model.clone()),
        ]),
        Line::from(vec![
            Span::raw(field_marker(app.focus == Focus::ApiKey)),
            Span::styled("API key: ", label),
            Span::raw(key_display),
        ]),
        Line::raw(format!(
            "  [{}] remember key on this machine",
            if app.settings.remember_key { "x" } else { " " }
        )),
        Line::raw(if app.settings.dark_mode {
            "  🌙 dark mode"
        } else {
            "  ☀ light mode"
        }),
        Line::raw(""),
        Line::styled("  Tab       switch field", dim),
        Line::styled("  Enter     send message", dim),
        Line::styled("  Alt+Enter new line", dim),
        Line::styled("  F5..F7    suggestions", dim),
        Line::styled("  Ctrl+T    toggle theme", dim),
        Line::styled("  Ctrl+P    reveal API key", dim),
        Line::styled("  Ctrl+R    toggle remember", dim),
        Line::styled("  Ctrl+L    clear history", dim),
        Line::styled("  Ctrl+Q    quit", dim),
        Line::raw(""),
        Line::styled("  The key never leaves this machine.", dim),
    ];

    let block = Block::bordered()
        .title("Settings")
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_chat(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let error = app.session.error();
    let [messages_area, error_area, suggestions_area, composer_area] = Layout::vertical([
        Constraint::Min(5),
        Constraint::Length(if error.is_some() { 1 } else { 0 }),
        Constraint::Length(3),
        Constraint::Length(4),
    ])
    .areas(area);

    let mut lines: Vec<Line> = Vec::new();
    for message in app.session.conversation().messages() {
        let (author, color) = match message.role {
            Role::User => ("You", theme.user),
            Role::Model => ("Gemini", theme.model),
        };
        lines.push(Line::from(Span::styled(
            author,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in message.text().lines() {
            lines.push(Line::raw(text_line.to_string()));
        }
        lines.push(Line::raw(""));
    }
    if app.session.phase() == SendPhase::AwaitingFirstChunk {
        lines.push(Line::styled(
            "Gemini is thinking…",
            Style::default().fg(theme.dim),
        ));
    }

    // Pin the view to the latest message.
    let inner_height = messages_area.height.saturating_sub(2);
    let scroll = (lines.len() as u16).saturating_sub(inner_height);

    let block = Block::bordered()
        .title("Gemini Chat")
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        messages_area,
    );

    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(format!("⚠ {message}")).style(Style::default().fg(theme.error)),
            error_area,
        );
    }

    let suggestion_lines: Vec<Line> = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            Line::from(vec![
                Span::styled(format!("F{} ", i + 5), Style::default().fg(theme.accent)),
                Span::styled(*suggestion, Style::default().fg(theme.dim)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(suggestion_lines), suggestions_area);

    frame.render_widget(&app.composer, composer_area);
}

fn draw_trivia(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let [fact_area, joke_area, advice_area] = Layout::horizontal([
        Constraint::Percentage(33),
        Constraint::Percentage(34),
        Constraint::Percentage(33),
    ])
    .areas(area);

    draw_trivia_box(frame, fact_area, "🐱 Cat Fact", app, TriviaKind::CatFact, theme);
    draw_trivia_box(frame, joke_area, "😂 Joke", app, TriviaKind::Joke, theme);
    draw_trivia_box(frame, advice_area, "💡 Advice", app, TriviaKind::Advice, theme);
}

fn draw_trivia_box(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    app: &App,
    kind: TriviaKind,
    theme: &Theme,
) {
    let content = app.trivia.get(kind).unwrap_or("Loading…");
    let block = Block::bordered()
        .title(title.to_string())
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(
        Paragraph::new(content.to_string())
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
