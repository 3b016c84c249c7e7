// ============================================================================
// Module : api
// ============================================================================
// Clients HTTP pour récupérer les taux de change :
// - frankfurter : historique sur une plage de dates (source par défaut)
// - open_er : dernier taux uniquement (un seul snapshot)
// ============================================================================

pub mod frankfurter; // Historique Frankfurter (api.frankfurter.app)
pub mod open_er;     // Dernier taux (open.er-api.com)

pub use frankfurter::{FrankfurterClient, RateQuery};
pub use open_er::OpenErClient;

use crate::error::{FetchError, FetchResult};

/// User-Agent envoyé à toutes les APIs
const USER_AGENT: &str = concat!("lazyfx/", env!("CARGO_PKG_VERSION"));

/// Crée le client HTTP partagé par les fetchers
///
/// Pas de timeout explicite : on garde la valeur par défaut de reqwest.
fn build_client() -> FetchResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)
}

/// Envoie un GET et retourne le corps texte si le statut est 2xx
///
/// Le corps est lu en texte puis parsé séparément : une erreur de parsing
/// reste ainsi distincte d'une erreur réseau.
async fn get_text(client: &reqwest::Client, url: &str) -> FetchResult<String> {
    let network = |source| FetchError::Network {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(network)?;

    let status = response.status();
    tracing::debug!(status = %status, "Received HTTP response");

    if !status.is_success() {
        tracing::error!(status = %status, url = %url, "API returned error status");
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(network)
}

/// Convertit un objet JSON {"EUR": 0.9, ...} en liste (devise, taux)
///
/// CONCEPT RUST : collect() sur des Result
/// - Iterator<Item = Result<T, E>> se collecte en Result<Vec<T>, E>
/// - S'arrête à la première erreur
fn parse_rate_object(
    context: &str,
    object: &serde_json::Value,
) -> FetchResult<Vec<(String, f64)>> {
    let object = object
        .as_object()
        .ok_or_else(|| FetchError::Parse(format!("{} : objet de taux attendu", context)))?;

    object
        .iter()
        .map(|(code, value)| {
            value
                .as_f64()
                .map(|rate| (code.clone(), rate))
                .ok_or_else(|| {
                    FetchError::Parse(format!("{} : taux non numérique pour {}", context, code))
                })
        })
        .collect()
}
