// ============================================================================
// API Client : open.er-api.com (dernier taux uniquement)
// ============================================================================
// GET https://open.er-api.com/v6/latest/USD
//
// Réponse :
// { "result": "success", "base_code": "USD", "rates": { "USD": 1, "EUR": 0.85, ... } }
//
// L'API gratuite n'a pas d'historique : on obtient une table d'une seule ligne
// datée du jour. En cas d'échec réseau ou de statut non-2xx, on dégrade vers
// une table vide au lieu d'arrêter le programme. Un corps 2xx illisible reste
// une erreur.
// ============================================================================

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, FetchResult};
use crate::models::RateTable;

use super::{build_client, get_text, parse_rate_object};

/// URL de production
pub const OPEN_ER_URL: &str = "https://open.er-api.com";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<serde_json::Value>,
}

/// Client de l'API open.er-api.com
#[derive(Debug, Clone)]
pub struct OpenErClient {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErClient {
    /// Client vers l'API de production
    pub fn new() -> FetchResult<Self> {
        Self::with_base_url(OPEN_ER_URL)
    }

    /// Client vers une autre URL (serveur de test)
    pub fn with_base_url(base_url: impl Into<String>) -> FetchResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }

    /// URL du dernier taux pour une devise de base
    pub fn latest_url(&self, base: &str) -> String {
        format!("{}/v6/latest/{}", self.base_url, base)
    }

    /// Récupère le dernier taux et renvoie l'erreur éventuelle
    #[instrument(skip(self, symbols, today))]
    pub async fn try_fetch_latest(
        &self,
        base: &str,
        symbols: &[String],
        today: NaiveDate,
    ) -> FetchResult<RateTable> {
        let url = self.latest_url(base);
        debug!(url = %url, "Built open.er-api URL");

        let body = get_text(&self.client, &url).await?;
        let table = parse_latest(&body, symbols, today)?;

        info!(currencies = table.columns().len(), "Successfully fetched latest rates");
        Ok(table)
    }

    /// Récupère le dernier taux ; une erreur réseau donne une table vide
    ///
    /// CONCEPT : Dégradation gracieuse
    /// - Connexion impossible ou statut non-2xx : loggé, table vide
    /// - Réponse 2xx illisible (JSON malformé, "rates" absent) : propagée
    pub async fn fetch_latest(
        &self,
        base: &str,
        symbols: &[String],
        today: NaiveDate,
    ) -> FetchResult<RateTable> {
        match self.try_fetch_latest(base, symbols, today).await {
            Ok(table) => Ok(table),
            Err(e @ (FetchError::Network { .. } | FetchError::Status { .. })) => {
                warn!(error = %e, "Latest rates unavailable, continuing with an empty table");
                Ok(RateTable::empty())
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse la réponse et garde uniquement les devises demandées
///
/// Les colonnes suivent l'ordre de `symbols` ; une devise demandée mais absente
/// de la réponse n'apparaît pas. Sans `symbols`, toutes les devises sont gardées.
fn parse_latest(body: &str, symbols: &[String], today: NaiveDate) -> FetchResult<RateTable> {
    let response: LatestResponse = serde_json::from_str(body)?;

    if response.result.as_deref() == Some("error") {
        return Err(FetchError::Parse(format!(
            "l'API a refusé la requête ({})",
            response.error_type.as_deref().unwrap_or("erreur inconnue")
        )));
    }

    let rates = response
        .rates
        .ok_or_else(|| FetchError::Parse("clé \"rates\" absente".to_string()))?;
    let rates = parse_rate_object("latest", &rates)?;

    let selected: Vec<(String, f64)> = if symbols.is_empty() {
        rates
    } else {
        symbols
            .iter()
            .filter_map(|code| rates.iter().find(|(c, _)| c == code).cloned())
            .collect()
    };

    if selected.is_empty() {
        return Ok(RateTable::empty());
    }

    Ok(RateTable::from_snapshots(vec![(today, selected)]))
}

// ============================================================================
// Tests unitaires
// ============================================================================
