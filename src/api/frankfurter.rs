// ============================================================================
// API Client : Frankfurter (historique)
// ============================================================================
// GET https://api.frankfurter.app/{start}..{end}?from=USD&to=KRW,AUD,...
//
// Réponse :
// {
//   "base": "USD", "start_date": "...", "end_date": "...",
//   "rates": { "2024-01-01": { "AUD": 1.47, "KRW": 1300.5 }, ... }
// }
//
// Sur une plage de deux ans, Frankfurter renvoie des points hebdomadaires.
// ============================================================================

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::{FetchError, FetchResult};
use crate::models::RateTable;

use super::{build_client, get_text, parse_rate_object};

/// URL de production
pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app";

/// Corps JSON de la réponse (seul "rates" nous intéresse)
///
/// serde_json::Map garde l'ordre des clés (feature "preserve_order")
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    rates: serde_json::Map<String, serde_json::Value>,
}

/// Paramètres d'une requête historique
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery {
    /// Devise de base (ex: "USD")
    pub base: String,

    /// Devises cibles
    pub symbols: Vec<String>,

    /// Première date incluse
    pub start: NaiveDate,

    /// Dernière date incluse
    pub end: NaiveDate,
}

impl RateQuery {
    /// Requête sur les `days` derniers jours jusqu'à `end` inclus
    ///
    /// None si la date de début sort de la plage de chrono.
    pub fn last_days(base: &str, symbols: &[String], days: u32, end: NaiveDate) -> Option<Self> {
        let start = end.checked_sub_signed(Duration::days(i64::from(days)))?;
        Some(Self {
            base: base.to_string(),
            symbols: symbols.to_vec(),
            start,
            end,
        })
    }
}

/// Client de l'API Frankfurter
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterClient {
    /// Client vers l'API de production
    pub fn new() -> FetchResult<Self> {
        Self::with_base_url(FRANKFURTER_URL)
    }

    /// Client vers une autre URL (serveur de test)
    pub fn with_base_url(base_url: impl Into<String>) -> FetchResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }

    /// Construit l'URL de la requête historique
    pub fn history_url(&self, query: &RateQuery) -> String {
        let mut url = format!(
            "{}/{}..{}?from={}",
            self.base_url,
            query.start.format("%Y-%m-%d"),
            query.end.format("%Y-%m-%d"),
            query.base
        );
        if !query.symbols.is_empty() {
            url.push_str("&to=");
            url.push_str(&query.symbols.join(","));
        }
        url
    }

    /// Récupère l'historique et le convertit en RateTable
    ///
    /// Une seule requête, sans retry. Toute erreur est renvoyée à l'appelant
    /// (le chemin historique est fatal).
    #[instrument(skip(self, query), fields(base = %query.base, start = %query.start, end = %query.end))]
    pub async fn fetch_history(&self, query: &RateQuery) -> FetchResult<RateTable> {
        let url = self.history_url(query);
        debug!(url = %url, "Built Frankfurter API URL");

        let body = get_text(&self.client, &url).await?;

        debug!(bytes = body.len(), "Parsing Frankfurter response");
        let table = parse_history(&body)?;

        info!(
            rows = table.len(),
            currencies = table.columns().len(),
            "Successfully fetched exchange rate history"
        );
        Ok(table)
    }
}

/// Parse le corps JSON de Frankfurter en RateTable
///
/// Chaque clé de "rates" est une date, chaque valeur un objet devise → taux.
fn parse_history(body: &str) -> FetchResult<RateTable> {
    let response: HistoryResponse = serde_json::from_str(body)?;

    let snapshots = response
        .rates
        .iter()
        .map(|(date, rates)| -> FetchResult<(NaiveDate, Vec<(String, f64)>)> {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| FetchError::Parse(format!("date invalide '{}' : {}", date, e)))?;
            Ok((date, parse_rate_object(&date.to_string(), rates)?))
        })
        .collect::<FetchResult<Vec<_>>>()?;

    Ok(RateTable::from_snapshots(snapshots))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn query() -> RateQuery {
        RateQuery {
            base: "USD".to_string(),
            symbols: vec!["KRW".to_string(), "EUR".to_string()],
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    }

    const BODY: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "start_date": "2024-01-01",
        "end_date": "2024-01-15",
        "rates": {
            "2024-01-15": {"KRW": 1320.5, "EUR": 0.91},
            "2024-01-01": {"KRW": 1300.0, "EUR": 0.90},
            "2024-01-08": {"KRW": 1310.0}
        }
    }"#;

    #[test]
    fn test_history_url() {
        let client = FrankfurterClient::new().unwrap();
        assert_eq!(
            client.history_url(&query()),
            "https://api.frankfurter.app/2024-01-01..2024-01-31?from=USD&to=KRW,EUR"
        );
    }

    #[test]
    fn test_last_days_query() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let q = RateQuery::last_days("USD", &["EUR".to_string()], 730, end).unwrap();
        assert_eq!(q.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(q.end, end);
    }

    #[test]
    fn test_last_days_out_of_range_is_none() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(RateQuery::last_days("USD", &[], 4_000_000_000, end).is_none());
    }

    #[test]
    fn test_parse_history_sorted_with_gaps() {
        let table = parse_history(BODY).unwrap();

        assert_eq!(table.columns(), &["KRW", "EUR"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.first().unwrap().rate(0), Some(1300.0));
        assert_eq!(table.rows()[1].rates, vec![Some(1310.0), None]);
        assert_eq!(table.last().unwrap().rate(1), Some(0.91));
    }

    #[test]
    fn test_parse_history_missing_rates_key() {
        let err = parse_history(r#"{"base": "USD"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_parse_history_non_numeric_rate() {
        let err = parse_history(r#"{"rates": {"2024-01-01": {"EUR": "abc"}}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_history_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/2024-01-01..2024-01-31")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "USD".into()),
                Matcher::UrlEncoded("to".into(), "KRW,EUR".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let client = FrankfurterClient::with_base_url(server.url()).unwrap();
        let table = client.fetch_history(&query()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(table.len(), 3);
        assert_eq!(table.default_currency(), Some("KRW"));
    }

    #[tokio::test]
    async fn test_fetch_history_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = FrankfurterClient::with_base_url(server.url()).unwrap();
        let err = client.fetch_history(&query()).await.unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 500),
            other => panic!("erreur inattendue : {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_history_connection_refused() {
        // Port 1 : rien n'écoute, la connexion échoue
        let client = FrankfurterClient::with_base_url("http://127.0.0.1:1").unwrap();
        let err = client.fetch_history(&query()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
