use crate::api::mine_offset::OffsetKpis;
use crate::api::DashboardSnapshot;
use crate::domain::{HotspotLevel, Pollutant};
use crate::metrics::{format_number, summarize};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub detail: String,
    pub color: Color,
}

impl KpiCard {
    fn new(title: &str, value: String, detail: String, color: Color) -> Self {
        Self {
            title: title.to_string(),
            value,
            detail,
            color,
        }
    }
}

pub fn overview_cards(snapshot: &DashboardSnapshot) -> Vec<KpiCard> {
    let co2 = snapshot.averages.get(Pollutant::Co2);
    let ch4 = snapshot.averages.get(Pollutant::Ch4);
    let co2_detail = summarize(&snapshot.series.co2).map_or_else(
        || "no monthly data".to_string(),
        |summary| format!("peak {}", summary.peak_month),
    );
    let red = snapshot.stats.count(&HotspotLevel::Red);

    vec![
        KpiCard::new(
            "Avg CO₂",
            format!("{} ppm", format_number(co2, 2)),
            co2_detail,
            Pollutant::Co2.color(),
        ),
        KpiCard::new(
            "Avg CH₄",
            format!("{} ppm", format_number(ch4, 2)),
            String::new(),
            Pollutant::Ch4.color(),
        ),
        KpiCard::new(
            "Hotspots",
            format_number(snapshot.stats.total as f64, 0),
            format!("{} on map", snapshot.hotspots.len()),
            Color::Cyan,
        ),
        KpiCard::new(
            "Red Zones",
            format_number(red as f64, 0),
            format!(
                "{} orange / {} yellow",
                snapshot.stats.count(&HotspotLevel::Orange),
                snapshot.stats.count(&HotspotLevel::Yellow)
            ),
            HotspotLevel::Red.color(),
        ),
    ]
}

pub fn offset_cards(kpis: &OffsetKpis) -> Vec<KpiCard> {
    let land_color = if kpis.land_is_critical() {
        Color::Red
    } else {
        Color::Green
    };

    vec![
        KpiCard::new(
            "Offset Target",
            format!("{} t/yr", format_number(kpis.annual_offset_target_tonnes, 0)),
            format!("{} t achieved", format_number(kpis.total_offset_achieved, 0)),
            Color::Cyan,
        ),
        KpiCard::new(
            "Trees Required",
            format_number(kpis.total_trees_required, 0),
            String::new(),
            Color::Green,
        ),
        KpiCard::new(
            "Budget",
            format!("₹{}", format_number(kpis.estimated_budget_inr, 0)),
            String::new(),
            Color::Yellow,
        ),
        KpiCard::new(
            "Land",
            format!(
                "{} / {} ha",
                format_number(kpis.land_required_ha, 1),
                format_number(kpis.land_available_ha, 1)
            ),
            if kpis.land_status.is_empty() {
                "required / available".to_string()
            } else {
                kpis.land_status.clone()
            },
            land_color,
        ),
    ]
}

pub fn render_cards(f: &mut Frame<'_>, area: Rect, cards: &[KpiCard]) {
    if cards.is_empty() {
        return;
    }
    let constraints = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect::<Vec<_>>();
    let areas = Layout::horizontal(constraints).split(area);

    for (card, card_area) in cards.iter().zip(areas.iter()) {
        let block = Block::default()
            .title(format!(" {} ", card.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(card.color));

        let mut lines = vec![TextLine::from(Span::styled(
            card.value.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))];
        if !card.detail.is_empty() {
            lines.push(TextLine::from(Span::styled(
                card.detail.clone(),
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, *card_area);
    }
}
