// ============================================================================
// Structure : RateTable
// ============================================================================
// Table des taux de change : une ligne par date, une colonne par devise.
// Tous les taux sont exprimés par rapport à la devise de base (USD).
//
// INVARIANTS :
// - Les dates sont strictement croissantes (tri + dédoublonnage à la construction)
// - Chaque ligne a exactement une cellule par colonne
// - Une cellule vaut None quand le taux manque ce jour-là
// - La table est immuable une fois construite
//
// CONCEPTS RUST :
// 1. Encapsulation : champs privés, seuls les constructeurs garantissent les invariants
// 2. Option<f64> : valeur manquante type-safe (pas de NaN "magique")
// 3. Iterators : accès aux séries sans copier la table
// ============================================================================

use chrono::NaiveDate;

/// Nom de la colonne date dans le fichier CSV
pub const DATE_COLUMN: &str = "Date";

/// Nom de la colonne date à l'affichage (les données Frankfurter sont hebdomadaires
/// sur deux ans : chaque date correspond au lundi de la semaine)
pub const DISPLAY_DATE_COLUMN: &str = "Week_start";

/// Une ligne de la table : une date et un taux par colonne
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    /// Date de la cotation
    pub date: NaiveDate,

    /// Taux par devise, alignés sur `RateTable::columns()`
    pub rates: Vec<Option<f64>>,
}

impl RateRow {
    /// Crée une ligne
    pub fn new(date: NaiveDate, rates: Vec<Option<f64>>) -> Self {
        Self { date, rates }
    }

    /// Taux de la colonne `index` (None si manquant ou hors limites)
    pub fn rate(&self, index: usize) -> Option<f64> {
        self.rates.get(index).copied().flatten()
    }
}

/// Table des taux, triée par date croissante
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateTable {
    /// Codes devise, dans l'ordre de première apparition
    columns: Vec<String>,

    /// Lignes triées par date
    rows: Vec<RateRow>,
}

impl RateTable {
    /// Table vide (aucune colonne, aucune ligne)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construit la table depuis des "snapshots" (date, liste de (devise, taux))
    ///
    /// C'est la forme naturelle des réponses JSON : un objet par date.
    /// Les colonnes gardent l'ordre de première apparition ; une devise absente
    /// d'un jour donne une cellule None.
    ///
    /// CONCEPT RUST : Generics avec IntoIterator
    /// - Accepte Vec, iterator, tableau... sans copier
    pub fn from_snapshots<I, R>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, R)>,
        R: IntoIterator<Item = (String, f64)>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for (date, rates) in snapshots {
            let mut cells: Vec<Option<f64>> = vec![None; columns.len()];

            for (code, rate) in rates {
                let index = match columns.iter().position(|c| *c == code) {
                    Some(index) => index,
                    None => {
                        columns.push(code);
                        columns.len() - 1
                    }
                };
                if cells.len() < columns.len() {
                    cells.resize(columns.len(), None);
                }
                cells[index] = Some(rate);
            }

            rows.push(RateRow::new(date, cells));
        }

        Self::from_rows(columns, rows)
    }

    /// Construit la table depuis des colonnes et des lignes déjà découpées
    ///
    /// Les lignes sont triées par date ; pour une date en double, la dernière
    /// ligne lue remplace la précédente. Les lignes trop courtes sont complétées
    /// avec None, les lignes trop longues tronquées.
    pub fn from_rows(columns: Vec<String>, mut rows: Vec<RateRow>) -> Self {
        let width = columns.len();

        // sort_by_key est stable : l'ordre de lecture est conservé entre doublons
        rows.sort_by_key(|row| row.date);

        let mut normalized: Vec<RateRow> = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.rates.resize(width, None);
            match normalized.last_mut() {
                Some(previous) if previous.date == row.date => *previous = row,
                _ => normalized.push(row),
            }
        }

        Self {
            columns,
            rows: normalized,
        }
    }

    /// Codes devise (sans la colonne date)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Toutes les lignes, triées par date
    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    /// Nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Vérifie si la table est vide
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Première ligne (date la plus ancienne)
    pub fn first(&self) -> Option<&RateRow> {
        self.rows.first()
    }

    /// Dernière ligne (date la plus récente)
    pub fn last(&self) -> Option<&RateRow> {
        self.rows.last()
    }

    /// Les `n` premières lignes
    pub fn head(&self, n: usize) -> &[RateRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Les `n` dernières lignes
    pub fn tail(&self, n: usize) -> &[RateRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Index de la colonne d'une devise
    pub fn column_index(&self, code: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == code)
    }

    /// Série temporelle d'une devise : (date, taux) pour chaque ligne
    ///
    /// CONCEPT RUST : impl Iterator + '_
    /// - Retourne un itérateur paresseux qui emprunte la table
    /// - Aucun Vec intermédiaire n'est alloué
    pub fn series(&self, code: &str) -> Option<impl Iterator<Item = (NaiveDate, Option<f64>)> + '_> {
        let index = self.column_index(code)?;
        Some(self.rows.iter().map(move |row| (row.date, row.rate(index))))
    }

    /// Devise sélectionnée par défaut : la première colonne après la date
    pub fn default_currency(&self) -> Option<&str> {
        self.columns.first().map(|c| c.as_str())
    }

    /// Première et dernière date de la table
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first()?.date, self.last()?.date))
    }

    /// Nombre de jours entre la première date et `date` (axe X des graphiques)
    pub fn day_offset(&self, date: NaiveDate) -> f64 {
        match self.first() {
            Some(first) => (date - first.date).num_days() as f64,
            None => 0.0,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn snapshot(date: NaiveDate, rates: &[(&str, f64)]) -> (NaiveDate, Vec<(String, f64)>) {
        (
            date,
            rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
        )
    }

    #[test]
    fn test_from_snapshots_sorts_by_date() {
        let table = RateTable::from_snapshots(vec![
            snapshot(day(3), &[("EUR", 0.93)]),
            snapshot(day(1), &[("EUR", 0.91)]),
            snapshot(day(2), &[("EUR", 0.92)]),
        ]);

        let dates: Vec<NaiveDate> = table.rows().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(table.first().unwrap().rate(0), Some(0.91));
        assert_eq!(table.last().unwrap().rate(0), Some(0.93));
    }

    #[test]
    fn test_columns_keep_first_seen_order() {
        let table = RateTable::from_snapshots(vec![
            snapshot(day(1), &[("KRW", 1300.0), ("AUD", 1.5)]),
            snapshot(day(2), &[("AUD", 1.6), ("KRW", 1310.0), ("EUR", 0.9)]),
        ]);

        assert_eq!(table.columns(), &["KRW", "AUD", "EUR"]);
        assert_eq!(table.default_currency(), Some("KRW"));
    }

    #[test]
    fn test_missing_currency_is_none() {
        let table = RateTable::from_snapshots(vec![
            snapshot(day(1), &[("KRW", 1300.0)]),
            snapshot(day(2), &[("KRW", 1310.0), ("EUR", 0.9)]),
        ]);

        // La première ligne a été complétée avec None pour EUR
        assert_eq!(table.rows()[0].rates, vec![Some(1300.0), None]);
        assert_eq!(table.rows()[1].rates, vec![Some(1310.0), Some(0.9)]);
    }

    #[test]
    fn test_duplicate_date_keeps_last_row() {
        let table = RateTable::from_rows(
            vec!["EUR".to_string()],
            vec![
                RateRow::new(day(1), vec![Some(0.9)]),
                RateRow::new(day(1), vec![Some(0.95)]),
            ],
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].rate(0), Some(0.95));
    }

    #[test]
    fn test_empty_table() {
        let table = RateTable::empty();
        assert!(table.is_empty());
        assert!(table.default_currency().is_none());
        assert!(table.date_range().is_none());
        assert!(table.head(5).is_empty());
    }

    #[test]
    fn test_head_tail_and_series() {
        let table = RateTable::from_snapshots(
            (1..=6).map(|d| snapshot(day(d), &[("EUR", d as f64)])),
        );

        assert_eq!(table.head(5).len(), 5);
        assert_eq!(table.tail(2)[0].date, day(5));
        assert_eq!(table.head(10).len(), 6);

        let series: Vec<_> = table.series("EUR").unwrap().collect();
        assert_eq!(series.len(), 6);
        assert_eq!(series[5], (day(6), Some(6.0)));
        assert!(table.series("GBP").is_none());
    }

    #[test]
    fn test_day_offset() {
        let table = RateTable::from_snapshots(vec![
            snapshot(day(1), &[("EUR", 0.9)]),
            snapshot(day(8), &[("EUR", 0.9)]),
        ]);

        assert_eq!(table.day_offset(day(8)), 7.0);
        assert_eq!(table.date_range(), Some((day(1), day(8))));
    }
}
