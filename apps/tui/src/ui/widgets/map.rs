use crate::app::App;
use crate::map::{SelectedLocation, SelectionSource};
use crate::metrics::format_number;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Map, MapResolution};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const CROSSHAIR: f64 = 0.6;

/// World map with hotspot markers, the click marker and the cursor.
pub fn render_map(app: &App, f: &mut Frame<'_>, area: Rect) {
    let surface = app.map.surface();
    let title = if app.map.lookup_pending() {
        " Map (locating...) "
    } else {
        " Map "
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .marker(Marker::Braille)
        .x_bounds(surface.x_bounds())
        .y_bounds(surface.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for marker in surface.markers() {
                ctx.draw(&Circle {
                    x: marker.point.lng,
                    y: marker.point.lat,
                    radius: marker.level.marker_size(),
                    color: marker.level.color(),
                });
            }

            if let Some(marker) = surface.highlighted() {
                ctx.draw(&Circle {
                    x: marker.point.lng,
                    y: marker.point.lat,
                    radius: marker.level.marker_size() + 0.5,
                    color: Color::White,
                });
                ctx.print(
                    marker.point.lng + 1.2,
                    marker.point.lat,
                    TextLine::from(Span::styled(
                        marker.label.clone(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                );
            }

            if let Some(point) = surface.click_marker() {
                ctx.print(
                    point.lng,
                    point.lat,
                    TextLine::from(Span::styled(
                        "×",
                        Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD),
                    )),
                );
            }

            let cursor = surface.cursor();
            ctx.draw(&CanvasLine {
                x1: cursor.lng - CROSSHAIR,
                y1: cursor.lat,
                x2: cursor.lng + CROSSHAIR,
                y2: cursor.lat,
                color: Color::Yellow,
            });
            ctx.draw(&CanvasLine {
                x1: cursor.lng,
                y1: cursor.lat - CROSSHAIR,
                x2: cursor.lng,
                y2: cursor.lat + CROSSHAIR,
                color: Color::Yellow,
            });
        });

    f.render_widget(canvas, area);
}

fn detail_line(label: &str, value: String, value_style: Style) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ])
}

fn location_lines(selection: &SelectedLocation) -> Vec<TextLine<'static>> {
    let value_style = Style::default().fg(Color::White);
    let source = match selection.source {
        SelectionSource::Default => "Default view",
        SelectionSource::MapClick => "Map selection",
        SelectionSource::Hotspot => "Hotspot",
    };

    let mut lines = vec![
        TextLine::from(Span::styled(
            selection.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(Span::styled(source, Style::default().fg(Color::DarkGray))),
        TextLine::from(""),
        detail_line("District", selection.district.clone(), value_style),
        detail_line("State", selection.state.clone(), value_style),
        detail_line("Country", selection.country.clone(), value_style),
        detail_line(
            "Coordinates",
            format!("{}, {}", selection.lat, selection.lng),
            value_style,
        ),
    ];

    if let Some(level) = &selection.level {
        lines.push(detail_line(
            "Hotspot Level",
            level.to_string(),
            Style::default().fg(level.color()).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(emission) = selection.emission {
        lines.push(detail_line(
            "Emission Score",
            format_number(emission, 2),
            value_style,
        ));
    }

    lines
}

pub fn render_location_card(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Selected Location ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(Text::from(location_lines(app.map.selection())))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
