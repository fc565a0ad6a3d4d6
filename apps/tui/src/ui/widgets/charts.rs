use crate::domain::Pollutant;
use crate::metrics::{format_number, ChartSeries, PieSlice, SeriesPoint};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};
use ratatui::Frame;

const BAR_CELLS: usize = 24;

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn render_empty(f: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .block(chart_block(title))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn indexed(values: impl Iterator<Item = f64>) -> Vec<(f64, f64)> {
    values
        .enumerate()
        .map(|(index, value)| (index as f64, value))
        .collect()
}

/// `[min, max]` padded so flat series still get a visible band.
fn value_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.1).max(max.abs() * 0.05).max(0.5);
    [(min - pad).max(0.0), max + pad]
}

fn month_labels(months: &[&str]) -> Vec<Span<'static>> {
    match months {
        [] => Vec::new(),
        [only] => vec![Span::raw((*only).to_string())],
        [first, .., last] => {
            let middle = months[months.len() / 2];
            vec![
                Span::raw((*first).to_string()),
                Span::raw(middle.to_string()),
                Span::raw((*last).to_string()),
            ]
        }
    }
}

fn y_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let middle = (bounds[0] + bounds[1]) / 2.0;
    vec![
        Span::raw(format_number(bounds[0], 1)),
        Span::raw(format_number(middle, 1)),
        Span::raw(format_number(bounds[1], 1)),
    ]
}

/// A single-pollutant monthly line chart.
pub fn render_series_chart(
    f: &mut Frame<'_>,
    area: Rect,
    pollutant: Pollutant,
    points: &[SeriesPoint],
) {
    let title = format!("{} (ppm)", pollutant.label());
    if points.is_empty() {
        render_empty(f, area, &title, "No monthly data");
        return;
    }

    let data = indexed(points.iter().map(|point| point.value));
    let bounds = value_bounds(points.iter().map(|point| point.value));
    let months = points.iter().map(|p| p.month.as_str()).collect::<Vec<_>>();

    let datasets = vec![Dataset::default()
        .name(pollutant.label())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(pollutant.color()))
        .data(&data)];

    let chart = Chart::new(datasets)
        .block(chart_block(&title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                .labels(month_labels(&months)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds)
                .labels(y_labels(bounds)),
        );

    f.render_widget(chart, area);
}

/// PM10 and PM2.5 on shared axes.
pub fn render_particulate_chart(f: &mut Frame<'_>, area: Rect, series: &ChartSeries) {
    let title = "Particulates (µg/m³)";
    let points = &series.particulates;
    if points.is_empty() {
        render_empty(f, area, title, "No monthly data");
        return;
    }

    let pm10 = indexed(points.iter().map(|point| point.pm10));
    let pm25 = indexed(points.iter().map(|point| point.pm2_5));
    let bounds = value_bounds(points.iter().flat_map(|point| [point.pm10, point.pm2_5]));
    let months = points.iter().map(|p| p.month.as_str()).collect::<Vec<_>>();

    let datasets = vec![
        Dataset::default()
            .name(Pollutant::Pm10.label())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Pollutant::Pm10.color()))
            .data(&pm10),
        Dataset::default()
            .name(Pollutant::Pm25.label())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Pollutant::Pm25.color()))
            .data(&pm25),
    ];

    let chart = Chart::new(datasets)
        .block(chart_block(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                .labels(month_labels(&months)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds)
                .labels(y_labels(bounds)),
        );

    f.render_widget(chart, area);
}

/// `█` cells proportional to `percent`, padded with `░`.
pub fn share_bar(percent: f64, cells: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * cells as f64).round() as usize;
    let filled = filled.min(cells);
    format!("{}{}", "█".repeat(filled), "░".repeat(cells - filled))
}

fn slice_color(name: &str) -> Color {
    Pollutant::ALL
        .iter()
        .find(|pollutant| pollutant.label() == name)
        .map_or(Color::Gray, |pollutant| pollutant.color())
}

/// Pollutant shares as horizontal bars with a legend line each.
pub fn render_breakdown(f: &mut Frame<'_>, area: Rect, slices: &[PieSlice]) {
    let title = "Pollutant Breakdown";
    if slices.is_empty() {
        render_empty(f, area, title, "No average data");
        return;
    }

    let mut lines = Vec::with_capacity(slices.len() * 2);
    for slice in slices {
        let color = slice_color(&slice.name);
        lines.push(TextLine::from(vec![
            Span::styled("■ ", Style::default().fg(color)),
            Span::styled(
                format!("{:<6}", slice.name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "{}  ({}%)",
                    format_number(slice.actual, 2),
                    format_number(slice.value, 1)
                ),
                Style::default().fg(Color::Gray),
            ),
        ]));
        lines.push(TextLine::from(Span::styled(
            share_bar(slice.value, BAR_CELLS),
            Style::default().fg(color),
        )));
    }

    let paragraph = Paragraph::new(Text::from(lines)).block(chart_block(title));
    f.render_widget(paragraph, area);
}

/// Labelled category values as a bar chart.
pub fn render_category_bars(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    values: &[(String, f64)],
    colors: &[Color],
) {
    if values.is_empty() {
        render_empty(f, area, title, "No data");
        return;
    }

    let bars: Vec<Bar<'_>> = values
        .iter()
        .enumerate()
        .map(|(index, (label, value))| {
            let color = colors.get(index % colors.len().max(1)).copied().unwrap_or(Color::Cyan);
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format_number(*value, 0))
                .label(TextLine::from(label.clone()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = values
        .iter()
        .map(|(_, value)| value.max(0.0).round() as u64)
        .max()
        .unwrap_or(0)
        .max(1);

    let inner_width = area.width.saturating_sub(2);
    let count = u16::try_from(values.len()).unwrap_or(u16::MAX).max(1);
    let bar_width = (inner_width / count).saturating_sub(1).clamp(3, 14);

    let chart = BarChart::default()
        .block(chart_block(title))
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(bar_width);

    f.render_widget(chart, area);
}

/// Labelled time series as a line chart.
pub fn render_trend_chart(f: &mut Frame<'_>, area: Rect, title: &str, points: &[(String, f64)]) {
    if points.is_empty() {
        render_empty(f, area, title, "No trend data");
        return;
    }

    let data = indexed(points.iter().map(|(_, value)| *value));
    let bounds = value_bounds(points.iter().map(|(_, value)| *value));
    let months = points.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>();

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::LightRed))
        .data(&data)];

    let chart = Chart::new(datasets)
        .block(chart_block(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
                .labels(month_labels(&months)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(bounds)
                .labels(y_labels(bounds)),
        );

    f.render_widget(chart, area);
}
