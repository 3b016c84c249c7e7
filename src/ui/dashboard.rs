// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Layout commun à tous les écrans :
//
//   ┌ header : titre + date du jour ─────────────────────────┐
//   ├ onglets : 1 Converter  2 Overview  3 Summary  4 Vol.  ─┤
//   │ contenu de l'écran courant                             │
//   └ footer : raccourcis ou confirmation de quit ───────────┘
//
// Le rendu ne fait que lire App : aucun calcul lourd ici, la vue de la
// sélection et les statistiques sont déjà prêtes.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::rate_table::DISPLAY_DATE_COLUMN;
use crate::models::{display_name, RateTable};
use crate::ui::{change_bars, chart};

/// Titre affiché dans l'en-tête
pub const DASHBOARD_TITLE: &str = "Currency Exchange Rates vs USD";

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit que chaque écran est géré
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);

    match app.current_screen {
        Screen::Converter => render_converter(frame, app, chunks[2]),
        Screen::Overview => render_overview(frame, app, chunks[2]),
        Screen::Summary => render_summary(frame, app, chunks[2]),
        Screen::Volatility => {
            chart::render_volatility_chart(frame, &app.data.table, &app.data.stats.volatility, chunks[2])
        }
    }

    render_footer(frame, app, chunks[3]);
}

/// Header, onglets, contenu, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Onglets
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header et onglets
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyFx ")
        .title_alignment(Alignment::Center);

    let text = Line::from(vec![
        Span::styled(
            DASHBOARD_TITLE,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            app.data.today.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, screen)| Line::from(format!("{} {}", i + 1, screen.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)))
        .select(app.current_screen.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

// ============================================================================
// Écran 1 : Converter
// ============================================================================
// Colonne gauche : sélecteur de devise, montant, conversion
// Colonne droite : graphique de la devise sélectionnée
// ============================================================================

fn render_converter(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Sélecteur
            Constraint::Length(4), // Montant
            Constraint::Length(4), // Conversion
        ])
        .split(columns[0]);

    render_currency_selector(frame, app, left[0]);
    render_amount_input(frame, app, left[1]);
    render_conversion(frame, app, left[2]);

    chart::render_currency_chart(frame, &app.data.table, app.view.chart.as_ref(), columns[1]);
}

/// Liste des devises, la sélection en inversé
///
/// CONCEPT RATATUI : ListState
/// - render_stateful_widget fait défiler la liste pour garder la sélection
///   visible quand le terminal est trop court
fn render_currency_selector(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Currency ");

    let columns = app.data.table.columns();
    if columns.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No currency available",
            Style::default().fg(Color::Gray),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = columns
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let item = ListItem::new(format!(" {}", display_name(code)));
            if index == app.selected_index {
                item.style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                item.style(Style::default().fg(Color::White))
            }
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

/// Montant en USD, ou la ligne de saisie en mode édition
fn render_amount_input(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.is_editing_amount() { Color::Green } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Amount in USD ");

    let lines = if app.is_editing_amount() {
        let mut lines = vec![Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
        ])];
        if let Some(error) = &app.input_error {
            lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
        }
        lines
    } else {
        vec![Line::from(Span::styled(
            format!("{}", app.selection.amount),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))]
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Chaîne de conversion calculée par la sélection
fn render_conversion(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversion ");

    let paragraph = Paragraph::new(Line::from(Span::styled(
        app.view.conversion.as_str(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .block(block)
    .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Écran 2 : Overview
// ============================================================================

fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    chart::render_rates_chart(frame, &app.data.table, rows[0]);
    render_data_table(frame, &app.data.table, rows[1]);
}

/// Dernières lignes de la table (autant que la zone en contient)
fn render_data_table(frame: &mut Frame, table: &RateTable, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Exchange Rate Data ");

    if table.is_empty() {
        render_empty(frame, block, area);
        return;
    }

    // Bordures (2) + en-tête (1)
    let visible = area.height.saturating_sub(3) as usize;

    let mut header = vec![Cell::from(DISPLAY_DATE_COLUMN)];
    header.extend(table.columns().iter().map(|code| Cell::from(code.as_str())));

    let rows: Vec<Row> = table
        .tail(visible)
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::from(row.date.format("%Y-%m-%d").to_string())];
            cells.extend(
                row.rates
                    .iter()
                    .map(|rate| Cell::from(rate.map(|r| format!("{:.4}", r)).unwrap_or_default())),
            );
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(11)];
    widths.extend(table.columns().iter().map(|_| Constraint::Min(9)));

    let widget = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
        .block(block);

    frame.render_widget(widget, area);
}

// ============================================================================
// Écran 3 : Summary
// ============================================================================

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(area);

    render_latest_rates(frame, app, columns[0]);
    change_bars::render_change_bars(frame, &app.data.stats.percentage_change, columns[1]);
}

/// Table des derniers taux (4 décimales)
fn render_latest_rates(frame: &mut Frame, app: &App, area: Rect) {
    let date = app
        .data
        .table
        .last()
        .map(|row| format!(" ({})", row.date.format("%Y-%m-%d")))
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" Latest Exchange Rates{} ", date));

    if app.data.stats.latest.is_empty() {
        render_empty(frame, block, area);
        return;
    }

    let rows: Vec<Row> = app
        .data
        .stats
        .latest
        .iter()
        .map(|(code, rate)| {
            Row::new(vec![
                Cell::from(display_name(code).into_owned()),
                Cell::from(rate.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "N/A".to_string())),
            ])
        })
        .collect();

    let widget = Table::new(rows, [Constraint::Min(24), Constraint::Length(12)])
        .header(
            Row::new(vec!["Currency", "Rate vs USD"])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(block);

    frame.render_widget(widget, area);
}

fn render_empty(frame: &mut Frame, block: Block, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled("No data", Style::default().fg(Color::Gray))))
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis ou confirmation
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = |label: &'static str| {
        Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_editing_amount() {
        Line::from(vec![
            key("[0-9 .]"),
            Span::raw(" Type  "),
            key("[Enter]"),
            Span::raw(" Confirm  "),
            key("[ESC]"),
            Span::raw(" Cancel"),
        ])
    } else if app.is_on_converter() {
        Line::from(vec![
            key("[q]"),
            Span::raw(" Quit  "),
            key("[Tab / 1-4]"),
            Span::raw(" Screens  "),
            key("[↑↓ / j k]"),
            Span::raw(" Currency  "),
            key("[a / Enter]"),
            Span::raw(" Amount"),
        ])
    } else {
        Line::from(vec![
            key("[q]"),
            Span::raw(" Quit  "),
            key("[Tab / 1-4]"),
            Span::raw(" Screens"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests : rendu dans un TestBackend
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppData;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn draw(app: &App) -> String {
        draw_sized(app, 120, 40)
    }

    fn draw_sized(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn app() -> App {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let table = RateTable::from_snapshots(vec![
            (day(1), vec![("KRW".to_string(), 1300.0), ("EUR".to_string(), 0.80)]),
            (day(8), vec![("KRW".to_string(), 1320.0), ("EUR".to_string(), 0.85)]),
        ]);
        App::new(AppData::new(table, 4, day(8)))
    }

    #[test]
    fn test_converter_screen_shows_title_and_conversion() {
        let text = draw(&app());

        assert!(text.contains(DASHBOARD_TITLE));
        assert!(text.contains("2024-01-08"));
        assert!(text.contains("KRW - South Korean Won"));
        assert!(text.contains("1.00 USD = 1,320.00 KRW (latest)"));
    }

    /// Titre de bloc propre à chaque écran
    fn screen_marker(screen: Screen) -> &'static str {
        match screen {
            Screen::Converter => "Select Currency",
            Screen::Overview => "Exchange Rate Data",
            Screen::Summary => "Latest Exchange Rates",
            Screen::Volatility => "Rolling Volatility",
        }
    }

    #[test]
    fn test_every_screen_renders_its_own_content() {
        let mut app = app();
        for screen in Screen::all() {
            app.show_screen(screen);
            let text = draw(&app);

            assert!(text.contains(screen_marker(screen)), "{:?}", screen);
            for other in Screen::all().into_iter().filter(|s| *s != screen) {
                assert!(!text.contains(screen_marker(other)), "{:?} shows {:?}", screen, other);
            }
        }

        app.show_screen(Screen::Overview);
        assert!(draw(&app).contains(DISPLAY_DATE_COLUMN));

        app.show_screen(Screen::Summary);
        let text = draw(&app);
        assert!(text.contains("0.8500"));
        assert!(text.contains("+6.25%"));

        app.show_screen(Screen::Volatility);
        assert!(draw(&app).contains("4-row window"));
    }

    #[test]
    fn test_selected_currency_stays_visible_on_short_terminal() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rates: Vec<(String, f64)> = crate::models::currency::DEFAULT_SYMBOLS
            .iter()
            .map(|code| (code.to_string(), 1.0))
            .collect();
        let table = RateTable::from_snapshots(vec![(day, rates)]);
        let mut app = App::new(AppData::new(table, 4, day));

        for _ in 0..10 {
            app.navigate_down();
        }
        assert_eq!(app.selected_currency(), Some("SGD"));

        // 20 lignes : il reste quelques lignes pour le sélecteur
        let text = draw_sized(&app, 120, 20);
        assert!(text.contains("SGD - Singapore Dollar"));
        assert!(!text.contains("KRW - South Korean Won"));
    }

    #[test]
    fn test_empty_table_renders_placeholders() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut app = App::new(AppData::new(RateTable::empty(), 4, today));

        let text = draw(&app);
        assert!(text.contains("No currency available"));

        app.show_screen(Screen::Summary);
        assert!(draw(&app).contains("No data"));
    }

    #[test]
    fn test_quit_confirmation_footer() {
        let mut app = app();
        app.request_quit();
        assert!(draw(&app).contains("à nouveau pour quitter"));
    }
}
