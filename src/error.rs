// ============================================================================
// Erreurs du fetcher
// ============================================================================
// Le reste de l'application utilise anyhow (erreurs avec contexte).
// Le fetcher a besoin d'une taxonomie précise pour décider quoi faire :
// - chemin historique : toute erreur arrête le programme
// - chemin "latest" : toute erreur donne une table vide
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - From<serde_json::Error> écrit à la main : on ne garde que le message
// ============================================================================

use thiserror::Error;

/// Erreurs possibles lors de la récupération des taux
#[derive(Debug, Error)]
pub enum FetchError {
    /// Impossible de construire le client HTTP
    #[error("Échec de la création du client HTTP : {0}")]
    Client(#[source] reqwest::Error),

    /// Connexion impossible, timeout, corps illisible...
    #[error("Échec de la requête HTTP vers {url} : {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Réponse HTTP hors de la plage 2xx
    #[error("{url} a retourné une erreur : HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// JSON malformé, clé "rates" absente, date ou taux invalide
    #[error("Réponse invalide : {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Alias pratique pour les fonctions du fetcher
pub type FetchResult<T> = Result<T, FetchError>;
