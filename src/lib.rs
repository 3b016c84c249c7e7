// ============================================================================
// LazyFx - Library
// ============================================================================
// Expose les modules publics pour les tests et le binaire
// ============================================================================

pub mod api;       // Clients Frankfurter / open.er-api
pub mod app;       // État de l'application
pub mod cache;     // Cache CSV des séries
pub mod config;    // Paramètres (env / .env)
pub mod error;     // Erreurs de fetch
pub mod models;    // Structures de données
pub mod stats;     // Statistiques dérivées
pub mod ui;        // Interface utilisateur
