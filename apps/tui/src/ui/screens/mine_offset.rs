use crate::api::mine_offset::{title_case, MineOffsetRecord};
use crate::app::App;
use crate::metrics::format_number;
use crate::ui::widgets::charts::{render_category_bars, render_trend_chart};
use crate::ui::widgets::kpi::{offset_cards, render_cards};
use crate::ui::widgets::status::{render_shortcuts, render_status_bar};
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

const MIX_COLORS: [Color; 5] = [
    Color::Green,
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::LightBlue,
];

pub fn render_mine_offset(app: &App, f: &mut Frame<'_>) {
    let [title, search, body, status, shortcuts] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(f.area().inner(Margin::new(1, 0)));

    render_title(app, f, title);
    render_search(app, f, search);

    let state = &app.mine_offset;
    match (&state.record, &state.error) {
        (Some(record), _) => render_record(record, f, body),
        (None, Some(error)) => render_not_found(app, error, f, body),
        (None, None) => render_hint(app, f, body),
    }

    render_status_bar(app, f, status);
    render_shortcuts(app, f, shortcuts);
}

fn render_title(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let mut spans = vec![Span::styled(
        "Mine Offset Planner",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(record) = &app.mine_offset.record {
        let meta = &record.meta;
        spans.push(Span::styled(
            format!("  {}", meta.mine_name),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        let place = [meta.district.as_str(), meta.state.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !place.is_empty() {
            spans.push(Span::styled(format!(" | {place}"), Style::default().fg(Color::Gray)));
        }
        if !meta.status.is_empty() {
            spans.push(Span::styled(
                format!(" | {}", meta.status),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    f.render_widget(Paragraph::new(TextLine::from(spans)).block(block), area);
}

fn render_search(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Search mine ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input = Paragraph::new(TextLine::from(vec![
        Span::styled("> ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}█", app.mine_offset.query),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(block);
    f.render_widget(input, area);
}

fn render_hint(app: &App, f: &mut Frame<'_>, area: Rect) {
    let message = if app.mine_offset.loading() {
        "Searching..."
    } else {
        "Type a mine name and press Enter to see its offset plan."
    };
    let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_not_found(app: &App, error: &str, f: &mut Frame<'_>, area: Rect) {
    let state = &app.mine_offset;
    let mut lines = vec![
        TextLine::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
    ];

    if state.suggestions.is_empty() {
        lines.push(TextLine::from(Span::styled(
            "No similar mine names found.",
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.push(TextLine::from(Span::styled(
            "Did you mean (Tab to pick, Enter to search):",
            Style::default().fg(Color::Gray),
        )));
        for (index, name) in state.suggestions.iter().enumerate() {
            let selected = state.suggestion_index == Some(index);
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if selected { ">" } else { " " };
            lines.push(TextLine::from(Span::styled(format!("{prefix} {name}"), style)));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(" Not found ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_record(record: &MineOffsetRecord, f: &mut Frame<'_>, area: Rect) {
    let [kpis, main] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(6)]).areas(area);
    render_cards(f, kpis, &offset_cards(&record.kpis));

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(main);

    let [plan, programs, scenarios] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Percentage(30),
    ])
    .areas(left);
    render_tree_plan(record, f, plan);
    render_programs(record, f, programs);
    render_scenarios(record, f, scenarios);

    let [mix, land, trend] = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(right);

    render_category_bars(f, mix, "Financial Mix (₹)", &record.financial_mix(), &MIX_COLORS);
    let land_colors = if record.kpis.land_is_critical() {
        [Color::Red, Color::Green]
    } else {
        [Color::Yellow, Color::Green]
    };
    render_category_bars(f, land, "Land (ha)", &record.land_compliance(), &land_colors);

    let trend_title = if record.graphs.emissions_trend.label.is_empty() {
        "Emissions Trend".to_string()
    } else {
        record.graphs.emissions_trend.label.clone()
    };
    render_trend_chart(f, trend, &trend_title, &record.emissions_trend());
}

fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|title| Cell::from(*title))).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_tree_plan(record: &MineOffsetRecord, f: &mut Frame<'_>, area: Rect) {
    let rows = record.tree_plan.iter().map(|(species, entry)| {
        Row::new(vec![
            Cell::from(title_case(species)),
            Cell::from(format_number(entry.count, 0)),
            Cell::from(format_number(entry.total_cost, 0)),
            Cell::from(format_number(entry.asr_per_tree, 1)),
            Cell::from(format_number(entry.offset_contribution_tonnes, 1)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(header_row(&["Species", "Trees", "Cost ₹", "kg/tree", "Offset t"]))
    .block(section_block("Tree Plan"));
    f.render_widget(table, area);
}

pub(crate) fn program_lines(record: &MineOffsetRecord) -> Vec<TextLine<'static>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);
    let heading = |text: &'static str| {
        TextLine::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let fact = |name: &str, amount: String| {
        TextLine::from(vec![
            Span::styled(format!("  {name}: "), label),
            Span::styled(amount, value),
        ])
    };

    let waste = &record.waste_to_wealth;
    let credits = &record.carbon_credits;
    let water = &record.water_conservation;

    let mut lines = vec![
        heading("Waste to Wealth"),
        fact(
            "Methane captured",
            format!("{} kg/yr", format_number(waste.annual_methane_captured_kg, 0)),
        ),
        fact(
            "Ethanol potential",
            format!("{} L", format_number(waste.ethanol_production_litres, 0)),
        ),
        fact(
            "Revenue",
            format!("₹{}", format_number(waste.estimated_revenue_inr, 0)),
        ),
        heading("Carbon Credits"),
        fact(
            "Credits",
            format!("{} t", format_number(credits.total_offset_credits_tonnes, 1)),
        ),
        fact(
            "Revenue potential",
            format!("₹{}", format_number(credits.total_revenue_potential_inr, 0)),
        ),
        heading("Water Conservation"),
        fact(
            "Conserved",
            format!("{} kL/yr", format_number(water.total_water_conserved_kilolitres, 0)),
        ),
    ];
    if !water.status.is_empty() {
        lines.push(fact("Status", water.status.clone()));
    }
    lines
}

fn render_programs(record: &MineOffsetRecord, f: &mut Frame<'_>, area: Rect) {
    let paragraph = Paragraph::new(Text::from(program_lines(record)))
        .block(section_block("Programs"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_scenarios(record: &MineOffsetRecord, f: &mut Frame<'_>, area: Rect) {
    let rows = record.scenarios().into_iter().map(|(name, scenario)| {
        Row::new(vec![
            Cell::from(name),
            Cell::from(format_number(scenario.total_trees, 0)),
            Cell::from(format_number(scenario.total_cost, 0)),
            Cell::from(format_number(scenario.offset_tonnes, 1)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(9),
        ],
    )
    .header(header_row(&["Scenario", "Trees", "Cost ₹", "Offset t"]))
    .block(section_block("What-if Scenarios"));
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn program_lines_include_water_status_only_when_present() {
        let record = MineOffsetRecord::from_value(json!({
            "waste_to_wealth": {"annual_methane_captured_kg": 12000},
            "water_conservation": {"total_water_conserved_kilolitres": 50}
        }));
        let lines = program_lines(&record);
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[1].spans[1].content, "12,000 kg/yr");

        let record = MineOffsetRecord::from_value(json!({
            "water_conservation": {"status": "Surplus"}
        }));
        assert_eq!(program_lines(&record).len(), 10);
    }
}
