use super::popup::{centered_rect, ClearWidget};
use crate::app::{App, AppScreen, UploadStatus};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::Throbber;

fn busy_label(app: &App) -> &'static str {
    if app.upload.is_pending() {
        "Uploading..."
    } else if app.overview.loading() {
        "Loading emissions data..."
    } else if app.mine_offset.loading() {
        "Searching..."
    } else {
        "Locating..."
    }
}

/// The most relevant line for the status bar and its colour.
fn status_line(app: &App) -> (String, Color) {
    match &app.upload {
        UploadStatus::Error(message) => return (message.clone(), Color::Red),
        UploadStatus::Success(message) => return (message.clone(), Color::Green),
        UploadStatus::Idle | UploadStatus::Pending => {}
    }

    if !app.status_message.is_empty() {
        return (app.status_message.clone(), Color::Yellow);
    }

    match (&app.overview.error, app.overview.last_updated) {
        (Some(error), _) => (format!("Error: {error}"), Color::Red),
        (None, Some(at)) => (
            format!("Last updated {}", at.format("%H:%M:%S")),
            Color::Gray,
        ),
        (None, None) => (String::new(), Color::Gray),
    }
}

pub fn render_status_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.busy() {
        let throbber = Throbber::default()
            .label(busy_label(app))
            .style(Style::default().fg(Color::Cyan))
            .throbber_set(throbber_widgets_tui::BRAILLE_SIX);
        let mut state = app.throbber.clone();
        f.render_stateful_widget(throbber, inner, &mut state);
        return;
    }

    let (message, color) = status_line(app);
    let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(color)))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, inner);
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn shortcuts(screen: AppScreen) -> &'static [(&'static str, &'static str)] {
    match screen {
        AppScreen::Overview => &[
            ("?", "Help"),
            ("Arrows", "Move"),
            ("Enter", "Select"),
            ("Tab", "Next hotspot"),
            ("r", "Refresh"),
            ("u", "Upload"),
            ("m", "Mine offsets"),
            ("q", "Quit"),
        ],
        AppScreen::MineOffset => &[
            ("F1", "Help"),
            ("Enter", "Search"),
            ("Tab", "Suggestion"),
            ("Esc", "Back"),
        ],
    }
}

pub fn shortcuts_line(screen: AppScreen) -> TextLine<'static> {
    let entries = shortcuts(screen);
    let mut spans = Vec::with_capacity(entries.len() * 2);
    for (index, (key, action)) in entries.iter().enumerate() {
        spans.push(key_span(*key));
        let separator = if index + 1 == entries.len() { "" } else { " | " };
        spans.push(Span::styled(
            format!(": {action}{separator}"),
            Style::default().fg(Color::Gray),
        ));
    }
    TextLine::from(spans)
}

pub fn render_shortcuts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(shortcuts_line(app.screen)).alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn help_lines() -> Vec<TextLine<'static>> {
    let heading = |text: &'static str| {
        TextLine::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |key: &'static str, action: &'static str| {
        TextLine::from(vec![
            Span::raw("  "),
            key_span(key),
            Span::raw(format!(" - {action}")),
        ])
    };

    vec![
        TextLine::from(Span::styled(
            "Coal Mine Emissions Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        heading("Overview"),
        entry("Arrows", "Move the map cursor"),
        entry("Enter", "Select the hotspot under the cursor, or look up the place"),
        entry("Tab / Shift-Tab", "Step through hotspots"),
        entry("Esc", "Reset the map"),
        entry("r", "Refresh all data"),
        entry("u", "Upload a summary CSV"),
        entry("m", "Open mine offset planner"),
        entry("q", "Quit"),
        TextLine::from(""),
        heading("Mine offsets"),
        entry("Type", "Mine name"),
        entry("Enter", "Search"),
        entry("Tab / Shift-Tab", "Cycle suggestions"),
        entry("Esc", "Back to overview"),
        TextLine::from(""),
        heading("Anywhere"),
        entry("F1", "Toggle this help (? also works on the overview)"),
        entry("Ctrl-C", "Quit"),
    ]
}

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(Text::from(help_lines()))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);

    let hint = Paragraph::new(Span::styled(
        "Press F1, ? or Esc to close",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);
    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}
