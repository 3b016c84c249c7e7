// ============================================================================
// Devises : codes et noms affichés
// ============================================================================
// Un code devise est un identifiant court en majuscules ("EUR", "KRW").
// Pour l'affichage, on le convertit en "EUR - Euro" via une table statique.
//
// CONCEPTS RUST :
// 1. &'static [(&str, &str)] : table compilée dans le binaire, sans allocation
// 2. Cow<'a, str> : retourne un &str emprunté OU une String possédée
// ============================================================================

use std::borrow::Cow;

/// Devise de base : tous les taux sont exprimés par rapport à l'USD
pub const BASE_CURRENCY: &str = "USD";

/// Devises cibles chargées par défaut
pub const DEFAULT_SYMBOLS: [&str; 11] = [
    "KRW", "AUD", "CAD", "PLN", "MXN", "EUR", "INR", "CNY", "HKD", "THB", "SGD",
];

/// Noms complets affichés dans le sélecteur et les tableaux
const CURRENCY_NAMES: &[(&str, &str)] = &[
    ("KRW", "KRW - South Korean Won"),
    ("AUD", "AUD - Australian Dollar"),
    ("CAD", "CAD - Canadian Dollar"),
    ("PLN", "PLN - Polish Zloty"),
    ("MXN", "MXN - Mexican Peso"),
    ("EUR", "EUR - Euro"),
    ("INR", "INR - Indian Rupee"),
    ("CNY", "CNY - Chinese Yuan"),
    ("HKD", "HKD - Hong Kong Dollar"),
    ("THB", "THB - Thai Baht"),
    ("SGD", "SGD - Singapore Dollar"),
    ("USD", "USD - US Dollar"),
];

/// Retourne le nom affiché d'une devise
///
/// Un code inconnu s'affiche tel quel : on ne veut jamais échouer sur une
/// colonne que la table statique ne connaît pas.
///
/// CONCEPT RUST : Cow
/// - Cow::Borrowed : pas d'allocation pour les codes connus
/// - Cow::Owned : copie du code inconnu
pub fn display_name(code: &str) -> Cow<'static, str> {
    CURRENCY_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or_else(|| Cow::Owned(code.to_string()))
}

/// Normalise un code saisi (espaces, minuscules)
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_display_name() {
        assert_eq!(display_name("EUR"), "EUR - Euro");
        assert_eq!(display_name("USD"), "USD - US Dollar");
    }

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        assert_eq!(display_name("COP"), "COP");
        assert_eq!(display_name("XYZ"), "XYZ");
    }

    #[test]
    fn test_every_default_symbol_has_a_name() {
        for code in DEFAULT_SYMBOLS {
            assert!(display_name(code).starts_with(code));
            assert_ne!(display_name(code), code);
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" eur "), "EUR");
    }
}
