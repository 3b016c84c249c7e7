// ============================================================================
// Chart - Graphiques ligne
// ============================================================================
// Trois graphiques, tous avec les jours depuis la première date en X :
// - la devise sélectionnée (depuis ChartData, déjà calculé par la sélection)
// - toutes les devises (taux bruts)
// - la volatilité glissante de toutes les devises
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher (emprunte ses points)
// 3. Axis : bornes et labels
// ============================================================================

use chrono::{Duration, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::selection::padded_bounds;
use crate::models::{ChartData, RateTable};
use crate::stats::Volatility;

/// Palette pour les graphiques multi-séries (cycle si plus de devises)
const PALETTE: [Color; 11] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightMagenta,
    Color::LightRed,
];

/// Une série prête à tracer : (nom, points (x, y))
pub type Series = (String, Vec<(f64, f64)>);

// ============================================================================
// Préparation des séries (fonctions pures, testables)
// ============================================================================

/// Toutes les devises de la table, taux bruts
///
/// Les valeurs manquantes sont sautées : la ligne relie les points voisins.
pub fn rate_series(table: &RateTable) -> Vec<Series> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let points = table
                .rows()
                .iter()
                .filter_map(|row| row.rate(index).map(|r| (table.day_offset(row.date), r)))
                .collect();
            (code.clone(), points)
        })
        .collect()
}

/// Volatilité glissante de chaque devise
///
/// Les premières lignes (fenêtre incomplète) sont indéfinies et n'ont pas de point.
pub fn volatility_series(table: &RateTable, volatility: &Volatility) -> Vec<Series> {
    volatility
        .series
        .iter()
        .map(|(code, values)| {
            let points = volatility
                .dates
                .iter()
                .zip(values)
                .filter_map(|(&date, value)| value.map(|v| (table.day_offset(date), v)))
                .collect();
            (code.clone(), points)
        })
        .collect()
}

/// Bornes X communes : toute la plage de dates de la table
pub fn x_bounds(table: &RateTable) -> [f64; 2] {
    let span = table
        .date_range()
        .map(|(first, last)| (last - first).num_days() as f64)
        .unwrap_or(0.0);
    [0.0, span.max(1.0)]
}

/// Labels de l'axe X : première date, milieu, dernière date
fn date_labels(table: &RateTable) -> Vec<Span<'static>> {
    let Some((first, last)) = table.date_range() else {
        return Vec::new();
    };
    let middle = first + Duration::days((last - first).num_days() / 2);

    [first, middle, last]
        .iter()
        .map(|date: &NaiveDate| Span::raw(date.format("%Y-%m-%d").to_string()))
        .collect()
}

/// Labels de l'axe Y : min, milieu, max
fn value_labels(bounds: [f64; 2], precision: usize) -> Vec<Span<'static>> {
    let [min, max] = bounds;
    [min, (min + max) / 2.0, max]
        .iter()
        .map(|v| Span::raw(format!("{:.*}", precision, v)))
        .collect()
}

/// Précision des labels selon l'ordre de grandeur (0.9 EUR vs 1300 KRW)
fn precision_for(bounds: [f64; 2]) -> usize {
    if bounds[1].abs() >= 100.0 {
        0
    } else if bounds[1].abs() >= 1.0 {
        2
    } else {
        4
    }
}

// ============================================================================
// Rendu
// ============================================================================

/// Graphique de la devise sélectionnée
pub fn render_currency_chart(frame: &mut Frame, table: &RateTable, chart: Option<&ChartData>, area: Rect) {
    let Some(data) = chart.filter(|c| !c.points.is_empty()) else {
        render_no_data(frame, area, " Selected Currency ", "No data for the selected currency");
        return;
    };

    let datasets = vec![Dataset::default()
        .name(data.label.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data.points)];

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds(data.x_bounds)
        .labels(date_labels(table));

    let y_axis = Axis::default()
        .title(data.label.as_str())
        .style(Style::default().fg(Color::Gray))
        .bounds(data.y_bounds)
        .labels(value_labels(data.y_bounds, precision_for(data.y_bounds)));

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", data.title)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Graphique de toutes les devises (taux bruts)
pub fn render_rates_chart(frame: &mut Frame, table: &RateTable, area: Rect) {
    let series = rate_series(table);
    render_multi_series(
        frame,
        table,
        &series,
        " Exchange Rates vs USD ",
        "Rate",
        area,
    );
}

/// Graphique de la volatilité glissante
pub fn render_volatility_chart(frame: &mut Frame, table: &RateTable, volatility: &Volatility, area: Rect) {
    let series = volatility_series(table, volatility);
    let title = volatility_title(volatility.window);
    render_multi_series(frame, table, &series, &title, "Std dev", area);
}

/// Rendu commun des graphiques multi-séries
fn render_multi_series(
    frame: &mut Frame,
    table: &RateTable,
    series: &[Series],
    title: &str,
    y_title: &str,
    area: Rect,
) {
    if series.iter().all(|(_, points)| points.is_empty()) {
        render_no_data(frame, area, title, "No data to display");
        return;
    }

    let y_bounds = padded_bounds(series.iter().flat_map(|(_, points)| points.iter().map(|&(_, y)| y)));

    // Les datasets empruntent les points : `series` doit vivre jusqu'au rendu
    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, (code, points))| {
            Dataset::default()
                .name(code.as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                .data(points)
        })
        .collect();

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds(x_bounds(table))
        .labels(date_labels(table));

    let y_axis = Axis::default()
        .title(y_title.to_string())
        .style(Style::default().fg(Color::Gray))
        .bounds(y_bounds)
        .labels(value_labels(y_bounds, precision_for(y_bounds)));

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title.to_string()),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Titre du graphique de volatilité
///
/// La fenêtre se compte en lignes : hebdomadaires sur deux ans, journalières
/// sur une plage courte.
pub fn volatility_title(window: usize) -> String {
    format!(" Rolling Volatility ({}-row window) ", window)
}

/// Message quand il n'y a rien à tracer (le titre du graphique reste affiché)
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
