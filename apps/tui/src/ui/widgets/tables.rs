use crate::app::App;
use crate::metrics::format_number;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

/// Drawn hotspot markers, highest emission first in the source order.
pub fn render_hotspot_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Hotspots ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let markers = app.map.markers();
    if markers.is_empty() {
        let paragraph = Paragraph::new("No hotspots with coordinates")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Mine"),
        Cell::from("Level"),
        Cell::from("Score"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let hotspots = app
        .overview
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.hotspots.as_slice())
        .unwrap_or_default();

    let max_visible_rows = area.height.saturating_sub(3) as usize;
    let selected = app.map.highlighted().unwrap_or(0);
    let offset = scroll_offset(markers.len(), max_visible_rows, selected);

    let rows = markers
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, marker)| {
            let score = hotspots
                .get(marker.hotspot)
                .map_or(0.0, |hotspot| hotspot.emission_score);
            let style = if app.map.highlighted() == Some(index) {
                Style::default()
                    .bg(Color::Rgb(0, 0, 238))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(marker.level.color())
            };

            Row::new(vec![
                Cell::from(marker.label.clone()),
                Cell::from(marker.level.to_string()),
                Cell::from(format_number(score, 1)),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
