use crate::api::DashboardSnapshot;
use crate::app::{App, InputMode};
use crate::domain::Pollutant;
use crate::ui::widgets::charts::{
    render_breakdown, render_particulate_chart, render_series_chart,
};
use crate::ui::widgets::kpi::{overview_cards, render_cards};
use crate::ui::widgets::map::{render_location_card, render_map};
use crate::ui::widgets::popup::{bottom_bar, ClearWidget};
use crate::ui::widgets::status::{render_shortcuts, render_status_bar};
use crate::ui::widgets::tables::render_hotspot_table;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_overview(app: &App, f: &mut Frame<'_>) {
    let [title, kpis, body, status, shortcuts] = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Length(4), // KPI cards
        Constraint::Min(12),   // Map and charts
        Constraint::Length(3), // Status
        Constraint::Length(1), // Shortcuts hint
    ])
    .areas(f.area().inner(Margin::new(1, 0)));

    render_title(app, f, title);

    match &app.overview.snapshot {
        Some(snapshot) => {
            render_cards(f, kpis, &overview_cards(snapshot));
            render_body(app, snapshot, f, body);
        }
        None => render_placeholder(app, f, kpis.union(body)),
    }

    render_status_bar(app, f, status);
    render_shortcuts(app, f, shortcuts);

    if app.input_mode == InputMode::UploadPath {
        render_upload_prompt(app, f, body);
    }
}

fn render_title(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let updated = app.overview.last_updated.map_or_else(
        || "not loaded".to_string(),
        |at| format!("updated {}", at.format("%d %b %H:%M")),
    );

    let line = TextLine::from(vec![
        Span::styled(
            "Coal Mine ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Emissions Dashboard",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({updated})"), Style::default().fg(Color::Gray)),
    ]);

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_placeholder(app: &App, f: &mut Frame<'_>, area: Rect) {
    let (message, color) = match &app.overview.error {
        _ if app.overview.loading() => ("Loading emissions data...".to_string(), Color::Cyan),
        Some(error) => (
            format!("Could not load the dashboard: {error}\nPress r to retry."),
            Color::Red,
        ),
        None => ("No data yet. Press r to load.".to_string(), Color::Gray),
    };

    let paragraph = Paragraph::new(Text::styled(message, Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_body(app: &App, snapshot: &DashboardSnapshot, f: &mut Frame<'_>, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let [map_area, details] =
        Layout::vertical([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(left);
    let [location, table] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .areas(details);

    render_map(app, f, map_area);
    render_location_card(app, f, location);
    render_hotspot_table(app, f, table);

    let [gases, particulates, breakdown] = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(right);
    let [co2, ch4] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(gases);

    render_series_chart(f, co2, Pollutant::Co2, &snapshot.series.co2);
    render_series_chart(f, ch4, Pollutant::Ch4, &snapshot.series.ch4);
    render_particulate_chart(f, particulates, &snapshot.series);
    render_breakdown(f, breakdown, &snapshot.breakdown);
}

fn render_upload_prompt(app: &App, f: &mut Frame<'_>, area: Rect) {
    let prompt_area = bottom_bar(3, area);
    f.render_widget(ClearWidget, prompt_area);

    let block = Block::default()
        .title(" Upload summary CSV (Enter to send, Esc to cancel) ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input = Paragraph::new(TextLine::from(vec![
        Span::styled("Path: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}█", app.upload_input),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(block);
    f.render_widget(input, prompt_area);
}
