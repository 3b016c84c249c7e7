// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut en dur, surchargeables par variables d'environnement
// (éventuellement chargées depuis un fichier .env) :
//
//   LAZYFX_SOURCE             historical | latest      (défaut : historical)
//   LAZYFX_BASE               devise de base            (défaut : USD)
//   LAZYFX_SYMBOLS            KRW,AUD,...               (défaut : 11 devises)
//   LAZYFX_HISTORY_DAYS       profondeur d'historique   (défaut : 730)
//   LAZYFX_CACHE_PATH         fichier cache CSV         (défaut : frankfurter_exchange_rates.csv)
//   LAZYFX_VOLATILITY_WINDOW  fenêtre de volatilité     (défaut : 4)
//   LAZYFX_LOG_DIR            répertoire des logs
//
// Une valeur invalide est une erreur : on préfère échouer au démarrage
// plutôt que d'ignorer silencieusement une faute de frappe.
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::cache::DEFAULT_CACHE_PATH;
use crate::models::currency::{normalize_code, BASE_CURRENCY, DEFAULT_SYMBOLS};
use crate::stats::DEFAULT_VOLATILITY_WINDOW;

/// Profondeur d'historique par défaut : deux ans
pub const DEFAULT_HISTORY_DAYS: u32 = 365 * 2;

/// Profondeur d'historique maximale : un siècle
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// Source des données
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Historique Frankfurter + cache CSV (erreur fatale)
    Historical,

    /// Dernier taux open.er-api, pas de cache (erreur → table vide)
    Latest,
}

impl FromStr for DataSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "historical" | "history" => Ok(DataSource::Historical),
            "latest" => Ok(DataSource::Latest),
            other => bail!("source inconnue '{}' (attendu : historical ou latest)", other),
        }
    }
}

/// Paramètres de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: DataSource,
    pub base: String,
    pub symbols: Vec<String>,
    pub history_days: u32,
    pub cache_path: PathBuf,
    pub volatility_window: usize,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: DataSource::Historical,
            base: BASE_CURRENCY.to_string(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            history_days: DEFAULT_HISTORY_DAYS,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            log_dir: default_log_dir(),
        }
    }
}

impl Settings {
    /// Charge le fichier .env (s'il existe) puis lit les variables LAZYFX_*
    pub fn from_env() -> Result<Self> {
        // Un .env absent n'est pas une erreur
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit les paramètres depuis une fonction de lecture clé → valeur
    ///
    /// CONCEPT RUST : Injection de dépendance par closure
    /// - En production : std::env::var
    /// - En test : une HashMap, sans toucher à l'environnement du processus
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(source) = lookup("LAZYFX_SOURCE") {
            settings.source = source.parse()?;
        }

        if let Some(base) = lookup("LAZYFX_BASE") {
            let base = normalize_code(&base);
            if base.is_empty() {
                bail!("LAZYFX_BASE est vide");
            }
            settings.base = base;
        }

        if let Some(symbols) = lookup("LAZYFX_SYMBOLS") {
            settings.symbols = symbols
                .split(',')
                .map(normalize_code)
                .filter(|code| !code.is_empty())
                .collect();
            if settings.symbols.is_empty() {
                bail!("LAZYFX_SYMBOLS ne contient aucune devise");
            }
        }

        if let Some(days) = lookup("LAZYFX_HISTORY_DAYS") {
            let days: u32 = days
                .trim()
                .parse()
                .with_context(|| format!("LAZYFX_HISTORY_DAYS invalide : '{}'", days))?;
            if !(1..=MAX_HISTORY_DAYS).contains(&days) {
                bail!(
                    "LAZYFX_HISTORY_DAYS doit être entre 1 et {} (reçu {})",
                    MAX_HISTORY_DAYS,
                    days
                );
            }
            settings.history_days = days;
        }

        if let Some(path) = lookup("LAZYFX_CACHE_PATH") {
            settings.cache_path = PathBuf::from(path);
        }

        if let Some(window) = lookup("LAZYFX_VOLATILITY_WINDOW") {
            let window: usize = window
                .trim()
                .parse()
                .with_context(|| format!("LAZYFX_VOLATILITY_WINDOW invalide : '{}'", window))?;
            // Un écart-type échantillon demande au moins 2 valeurs
            if window < 2 {
                bail!("LAZYFX_VOLATILITY_WINDOW doit être >= 2 (reçu {})", window);
            }
            settings.volatility_window = window;
        }

        if let Some(dir) = lookup("LAZYFX_LOG_DIR") {
            settings.log_dir = PathBuf::from(dir);
        }

        Ok(settings)
    }
}

/// Répertoire des logs par défaut
///
/// - Linux/WSL : ~/.local/share/lazyfx/logs
/// - macOS : ~/Library/Application Support/lazyfx/logs
/// - Windows : C:\Users\<user>\AppData\Local\lazyfx\logs
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("lazyfx").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
