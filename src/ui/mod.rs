// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod change_bars; // Barres de variation en texte autour d'un axe zéro
pub mod chart;       // Graphiques ligne (devise, toutes devises, volatilité)
pub mod dashboard;   // Layout, écrans, header/footer
pub mod events;      // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
