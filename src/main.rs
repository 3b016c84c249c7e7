// ============================================================================
// LazyFx - Taux de change vs USD dans le terminal
// ============================================================================
// Déroulement :
// 1. Paramètres (env / .env) et logging vers fichier
// 2. Chargement des taux, une seule fois : cache CSV ou réseau
// 3. Diagnostics sur stdout (head, describe, valeurs manquantes)
// 4. Boucle TUI mono-thread : render → event → update
//
// Aucun fetch après le démarrage : la table est figée pour toute la session.
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use lazyfx::api::{FrankfurterClient, OpenErClient, RateQuery};
use lazyfx::app::{App, AppData, Screen};
use lazyfx::cache::SeriesCache;
use lazyfx::config::{DataSource, Settings};
use lazyfx::models::rate_table::DISPLAY_DATE_COLUMN;
use lazyfx::models::RateTable;
use lazyfx::stats::{describe, null_counts};
use lazyfx::ui::{events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent plus une fois le TUI lancé : on log dans un
// fichier avec rotation quotidienne.
//
//   tail -f ~/.local/share/lazyfx/logs/lazyfx.log.<date>
//   RUST_LOG=lazyfx=trace cargo run
// ============================================================================

fn init_logging(log_dir: &std::path::Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazyfx.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyfx=debug,info".into()),
        )
        .init();

    info!(log_dir = %log_dir.display(), "Logging initialisé");
    Ok(())
}

fn main() -> Result<()> {
    let settings = Settings::from_env().context("Configuration invalide")?;

    init_logging(&settings.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?settings, "LazyFx starting up");
    println!("📊 Chargement des taux de change...\n");

    let today = Local::now().date_naive();

    // Un seul appel async au démarrage : pas besoin d'un runtime permanent
    let runtime = tokio::runtime::Runtime::new()?;
    let table = match runtime.block_on(load_rates(&settings, today)) {
        Ok(table) => table,
        Err(e) => {
            // main affiche l'erreur et sa chaîne de causes en retournant Err
            error!(error = ?e, "Failed to load exchange rates");
            return Err(e);
        }
    };
    drop(runtime);

    info!(rows = table.len(), currencies = table.columns().len(), "Exchange rates loaded");
    print_diagnostics(&table);

    let mut app = App::new(AppData::new(table, settings.volatility_window, today));

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();
    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Chargement des données
// ============================================================================

/// Charge la table selon la source configurée
///
/// - Historical : cache CSV s'il existe, sinon Frankfurter puis écriture du
///   cache. Une erreur de fetch est fatale. Le client HTTP n'est construit
///   que si le cache est absent.
/// - Latest : open.er-api, jamais de cache. Une erreur réseau donne une table
///   vide, une réponse illisible est fatale.
async fn load_rates(settings: &Settings, today: NaiveDate) -> Result<RateTable> {
    match settings.source {
        DataSource::Historical => {
            let cache = SeriesCache::new(&settings.cache_path);
            let query = RateQuery::last_days(&settings.base, &settings.symbols, settings.history_days, today)
                .with_context(|| format!("Plage de {} jours hors limites", settings.history_days))?;

            cache
                .load_or_fetch(|| async {
                    let client = FrankfurterClient::new()?;
                    client.fetch_history(&query).await
                })
                .await
        }
        DataSource::Latest => {
            let client = OpenErClient::new()?;
            let table = client
                .fetch_latest(&settings.base, &settings.symbols, today)
                .await
                .context("Failed to fetch latest rates")?;
            Ok(table)
        }
    }
}

/// Affiche les premières lignes, le résumé descriptif et les valeurs manquantes
fn print_diagnostics(table: &RateTable) {
    let columns = table.columns();

    println!("{:<12}{}", DISPLAY_DATE_COLUMN, columns.iter().map(|c| format!("{:>12}", c)).collect::<String>());
    for row in table.head(5) {
        let rates: String = row
            .rates
            .iter()
            .map(|rate| match rate {
                Some(r) => format!("{:>12.4}", r),
                None => format!("{:>12}", "NaN"),
            })
            .collect();
        println!("{:<12}{}", row.date.format("%Y-%m-%d"), rates);
    }

    println!("\n{:<6}{:>8}{:>14}{:>14}{:>14}{:>14}", "", "count", "mean", "std", "min", "max");
    for summary in describe(table) {
        println!(
            "{:<6}{:>8}{:>14.4}{:>14.4}{:>14.4}{:>14.4}",
            summary.code, summary.count, summary.mean, summary.std, summary.min, summary.max
        );
    }

    println!("\nMissing values:");
    for (code, missing) in null_counts(table) {
        println!("  {:<6}{}", code, missing);
    }
    println!();
}

// ============================================================================
// Event loop
// ============================================================================
// Render → Input → Update, sur un seul thread. La vue de la sélection est
// mise à jour par App quand la sélection change, pas à chaque frame.
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        handle_event(app, event);
    }

    Ok(())
}

/// Met à jour l'état de l'application selon la touche pressée
///
/// CONCEPT RUST : Match avec guards
/// - L'ordre des bras compte : le mode saisie passe avant la navigation
fn handle_event(app: &mut App, event: lazyfx::ui::events::Event) {
    use lazyfx::ui::events::{
        amount_char, is_backspace_event, is_down_event, is_edit_amount_event, is_enter_event,
        is_escape_event, is_next_screen_event, is_previous_screen_event, is_quit_event, is_up_event,
        screen_number, Event,
    };

    match event {
        // Mode saisie du montant : toutes les touches vont au buffer
        Event::Key(_) if app.is_editing_amount() => {
            if is_escape_event(&event) {
                info!("User cancelled amount input");
                app.cancel_input();
            } else if is_enter_event(&event) {
                if app.submit_amount() {
                    info!(amount = app.selection.amount, "User changed amount");
                } else {
                    debug!(input = %app.input_buffer, "Invalid amount rejected");
                }
            } else if is_backspace_event(&event) {
                app.backspace();
            } else if let Some(c) = amount_char(&event) {
                app.append_char(c);
            }
        }

        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) => {
            app.cancel_quit();

            if let Some(n) = screen_number(&event) {
                if let Some(screen) = Screen::from_number(n) {
                    debug!(screen = screen.title(), "User switched screen");
                    app.show_screen(screen);
                }
            } else if is_next_screen_event(&event) {
                app.next_screen();
            } else if is_previous_screen_event(&event) {
                app.previous_screen();
            } else if app.is_on_converter() {
                if is_up_event(&event) {
                    app.navigate_up();
                    debug!(currency = ?app.selected_currency(), "User selected currency");
                } else if is_down_event(&event) {
                    app.navigate_down();
                    debug!(currency = ?app.selected_currency(), "User selected currency");
                } else if is_edit_amount_event(&event) || is_enter_event(&event) {
                    app.start_amount_input();
                }
            }
        }

        Event::Resize | Event::Tick => {}
    }
}

// ============================================================================
// Terminal setup / restore
// ============================================================================

/// Passe le terminal en raw mode + alternate screen
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal, même si la boucle a échoué
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyfx::models::rate_table::RateRow;

    #[tokio::test]
    async fn test_historical_source_uses_existing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cached = RateTable::from_rows(vec!["EUR".to_string()], vec![RateRow::new(day, vec![Some(0.9)])]);

        let settings = Settings {
            cache_path: dir.path().join("rates.csv"),
            log_dir: dir.path().join("logs"),
            ..Settings::default()
        };
        SeriesCache::new(&settings.cache_path).store(&cached).unwrap();

        let table = load_rates(&settings, day).await.unwrap();
        assert_eq!(table, cached);
    }

    #[tokio::test]
    async fn test_out_of_range_history_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            cache_path: dir.path().join("rates.csv"),
            history_days: u32::MAX,
            ..Settings::default()
        };

        let err = load_rates(&settings, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("hors limites"));
        assert!(!settings.cache_path.exists());
    }
}
