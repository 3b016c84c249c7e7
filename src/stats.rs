// ============================================================================
// Moteur de statistiques
// ============================================================================
// Fonctions pures calculées une seule fois par chargement de la table :
// - dernière / première ligne
// - variation en pourcentage entre la première et la dernière ligne
// - volatilité glissante (écart-type sur une fenêtre de N lignes)
// - résumé descriptif et comptage des valeurs manquantes (diagnostic au démarrage)
//
// Aucune de ces fonctions ne renvoie d'erreur : une division par zéro ou une
// valeur manquante produit NaN / None, comme une feuille de calcul.
// ============================================================================

use chrono::NaiveDate;
use statrs::statistics::Statistics as _;

use crate::models::RateTable;

/// Taille de fenêtre par défaut de la volatilité (4 périodes = ~1 mois hebdo)
pub const DEFAULT_VOLATILITY_WINDOW: usize = 4;

/// Taux d'une ligne, devise par devise (colonne date exclue)
pub type RowRates = Vec<(String, Option<f64>)>;

/// Volatilité glissante pour toutes les devises
#[derive(Debug, Clone, PartialEq)]
pub struct Volatility {
    /// Taille de la fenêtre
    pub window: usize,

    /// Dates de la table (même longueur que chaque série)
    pub dates: Vec<NaiveDate>,

    /// (devise, écart-type glissant), None tant que la fenêtre n'est pas pleine
    pub series: Vec<(String, Vec<Option<f64>>)>,
}

/// Résumé descriptif d'une colonne
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub code: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Toutes les statistiques dérivées d'une table
///
/// Calculées une fois au démarrage, jamais recalculées lors d'une interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub latest: RowRates,
    pub first: RowRates,
    pub percentage_change: Vec<(String, f64)>,
    pub volatility: Volatility,
}

impl Statistics {
    /// Calcule toutes les statistiques pour une table
    pub fn compute(table: &RateTable, window: usize) -> Self {
        let latest = latest_row(table);
        let first = first_row(table);
        let percentage_change = percentage_change(&first, &latest);
        let volatility = rolling_volatility(table, window);

        Self {
            latest,
            first,
            percentage_change,
            volatility,
        }
    }

    /// Dernier taux connu d'une devise
    pub fn latest_rate(&self, code: &str) -> Option<f64> {
        self.latest
            .iter()
            .find(|(c, _)| c == code)
            .and_then(|(_, rate)| *rate)
    }
}

/// Dernière ligne (date la plus récente), sans la date
pub fn latest_row(table: &RateTable) -> RowRates {
    row_rates(table, table.last().map(|row| row.rates.as_slice()))
}

/// Première ligne (date la plus ancienne), sans la date
pub fn first_row(table: &RateTable) -> RowRates {
    row_rates(table, table.first().map(|row| row.rates.as_slice()))
}

fn row_rates(table: &RateTable, rates: Option<&[Option<f64>]>) -> RowRates {
    match rates {
        Some(rates) => table
            .columns()
            .iter()
            .cloned()
            .zip(rates.iter().copied())
            .collect(),
        None => Vec::new(),
    }
}

/// Variation en pourcentage : (dernier - premier) / premier * 100
///
/// Un taux manquant donne NaN ; un premier taux nul donne ±inf ou NaN.
/// L'appelant ne doit pas supposer un résultat fini.
pub fn percentage_change(first: &RowRates, latest: &RowRates) -> Vec<(String, f64)> {
    first
        .iter()
        .zip(latest.iter())
        .map(|((code, first), (_, latest))| {
            let first = first.unwrap_or(f64::NAN);
            let latest = latest.unwrap_or(f64::NAN);
            (code.clone(), (latest - first) / first * 100.0)
        })
        .collect()
}

/// Écart-type glissant (échantillon, ddof = 1) sur une fenêtre de `window` valeurs
///
/// Les `window - 1` premières entrées valent None par construction, ainsi que
/// toute fenêtre contenant une valeur manquante.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            let slice = &values[end + 1 - window..=end];
            let complete: Option<Vec<f64>> = slice.iter().copied().collect();
            complete.map(|v| v.iter().std_dev())
        })
        .collect()
}

/// Volatilité glissante de chaque devise
pub fn rolling_volatility(table: &RateTable, window: usize) -> Volatility {
    let series = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let values: Vec<Option<f64>> = table.rows().iter().map(|row| row.rate(index)).collect();
            (code.clone(), rolling_std(&values, window))
        })
        .collect();

    Volatility {
        window,
        dates: table.rows().iter().map(|row| row.date).collect(),
        series,
    }
}

/// Résumé descriptif (count / mean / std / min / max) de chaque colonne
pub fn describe(table: &RateTable) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let values: Vec<f64> = table.rows().iter().filter_map(|row| row.rate(index)).collect();

            // fold comme dans le calcul des bornes des graphiques
            let (min, max) = if values.is_empty() {
                (f64::NAN, f64::NAN)
            } else {
                values
                    .iter()
                    .fold((f64::MAX, f64::MIN), |(min, max), &v| (min.min(v), max.max(v)))
            };

            ColumnSummary {
                code: code.clone(),
                count: values.len(),
                mean: values.iter().mean(),
                std: values.iter().std_dev(),
                min,
                max,
            }
        })
        .collect()
}

/// Nombre de valeurs manquantes par colonne
pub fn null_counts(table: &RateTable) -> Vec<(String, usize)> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let missing = table.rows().iter().filter(|row| row.rate(index).is_none()).count();
            (code.clone(), missing)
        })
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(rows: &[(u32, &[(&str, f64)])]) -> RateTable {
        RateTable::from_snapshots(rows.iter().map(|(d, rates)| {
            (
                NaiveDate::from_ymd_opt(2024, 1, *d).unwrap(),
                rates.iter().map(|(c, r)| (c.to_string(), *r)).collect::<Vec<_>>(),
            )
        }))
    }

    #[test]
    fn test_latest_and_first_rows() {
        let t = table(&[
            (2, &[("EUR", 0.92), ("KRW", 1310.0)]),
            (1, &[("EUR", 0.90), ("KRW", 1300.0)]),
        ]);

        assert_eq!(
            latest_row(&t),
            vec![("EUR".to_string(), Some(0.92)), ("KRW".to_string(), Some(1310.0))]
        );
        assert_eq!(first_row(&t)[0], ("EUR".to_string(), Some(0.90)));
    }

    #[test]
    fn test_percentage_change_formula() {
        let t = table(&[
            (1, &[("EUR", 0.80), ("KRW", 1300.0)]),
            (2, &[("EUR", 0.82), ("KRW", 1250.0)]),
            (3, &[("EUR", 0.85), ("KRW", 1365.0)]),
        ]);
        let stats = Statistics::compute(&t, DEFAULT_VOLATILITY_WINDOW);

        let eur = stats.percentage_change[0].1;
        assert_relative_eq!(eur, (0.85 - 0.80) / 0.80 * 100.0, epsilon = 1e-12);
        let krw = stats.percentage_change[1].1;
        assert_relative_eq!(krw, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_percentage_change_zero_first_is_not_finite() {
        let t = table(&[(1, &[("EUR", 0.0)]), (2, &[("EUR", 1.0)])]);
        let change = percentage_change(&first_row(&t), &latest_row(&t));
        assert!(!change[0].1.is_finite());
    }

    #[test]
    fn test_percentage_change_missing_is_nan() {
        let t = table(&[(1, &[("EUR", 0.9)]), (2, &[("KRW", 1300.0)])]);
        let change = percentage_change(&first_row(&t), &latest_row(&t));
        assert!(change.iter().all(|(_, v)| v.is_nan()));
    }

    #[test]
    fn test_rolling_std_leading_entries_are_none() {
        let values: Vec<Option<f64>> = [1.0, 2.0, 4.0, 8.0, 16.0].iter().map(|v| Some(*v)).collect();
        let std = rolling_std(&values, 4);

        assert_eq!(std.len(), 5);
        assert!(std[..3].iter().all(|v| v.is_none()));

        // Écart-type échantillon de [1, 2, 4, 8]
        let mean = (1.0 + 2.0 + 4.0 + 8.0) / 4.0;
        let var = [1.0, 2.0, 4.0, 8.0_f64]
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / 3.0;
        assert_relative_eq!(std[3].unwrap(), var.sqrt(), epsilon = 1e-12);
        assert!(std[4].is_some());
    }

    #[test]
    fn test_rolling_std_window_with_gap_is_none() {
        let values = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0), Some(6.0)];
        let std = rolling_std(&values, 3);

        assert_eq!(std[2], None);
        assert_eq!(std[3], None);
        assert!(std[4].is_some());
    }

    #[test]
    fn test_rolling_std_short_table() {
        let values = vec![Some(1.0), Some(2.0)];
        assert_eq!(rolling_std(&values, 4), vec![None, None]);
        assert_eq!(rolling_std(&values, 0), vec![None, None]);
    }

    #[test]
    fn test_rolling_volatility_aligned_with_dates() {
        let t = table(&[
            (1, &[("EUR", 1.0)]),
            (2, &[("EUR", 2.0)]),
            (3, &[("EUR", 3.0)]),
            (4, &[("EUR", 4.0)]),
        ]);
        let vol = rolling_volatility(&t, 4);

        assert_eq!(vol.dates.len(), 4);
        assert_eq!(vol.series[0].0, "EUR");
        assert_relative_eq!(vol.series[0].1[3].unwrap(), (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_describe_and_null_counts() {
        let t = table(&[
            (1, &[("EUR", 1.0), ("KRW", 1300.0)]),
            (2, &[("EUR", 3.0)]),
        ]);

        let summary = describe(&t);
        assert_eq!(summary[0].count, 2);
        assert_relative_eq!(summary[0].mean, 2.0);
        assert_relative_eq!(summary[0].min, 1.0);
        assert_relative_eq!(summary[0].max, 3.0);
        assert_eq!(summary[1].count, 1);

        assert_eq!(
            null_counts(&t),
            vec![("EUR".to_string(), 0), ("KRW".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_table_statistics() {
        let stats = Statistics::compute(&RateTable::empty(), 4);
        assert!(stats.latest.is_empty());
        assert!(stats.percentage_change.is_empty());
        assert!(stats.volatility.series.is_empty());
        assert!(stats.latest_rate("EUR").is_none());
    }
}
