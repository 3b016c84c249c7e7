// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : table des taux, devises,
// sélection utilisateur.
// ============================================================================

pub mod currency;   // Codes devise et noms affichés
pub mod rate_table; // Table des taux (une ligne par date)
pub mod selection;  // Sélection utilisateur + vue recalculée

// Re-export des structures principales pour simplifier les imports
// On peut faire : use lazyfx::models::RateTable;
pub use currency::display_name;
pub use rate_table::{RateRow, RateTable};
pub use selection::{selection_view, ChartData, Selection, SelectionView};
