// ============================================================================
// Cache des séries : fichier CSV local
// ============================================================================
// Avant de fetcher, on regarde si le fichier cache existe :
// - oui : on le charge et on n'appelle jamais le réseau
// - non : on fetch, on écrit le fichier, on renvoie la table
//
// Cache "write-once, read-many" : pas de TTL, pas d'invalidation, pas de
// verrou. Deux processus qui écrivent le même fichier en même temps donnent
// un résultat indéfini.
//
// Format :
//   Date,KRW,AUD,...
//   2024-01-01,1300.5,1.47,...
// Une cellule vide = taux manquant.
// ============================================================================

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Writer};
use tracing::{debug, info, instrument};

use crate::models::rate_table::DATE_COLUMN;
use crate::models::{RateRow, RateTable};

/// Chemin par défaut du fichier cache (relatif au répertoire courant)
pub const DEFAULT_CACHE_PATH: &str = "frankfurter_exchange_rates.csv";

/// Cache CSV d'une RateTable
#[derive(Debug, Clone)]
pub struct SeriesCache {
    path: PathBuf,
}

impl SeriesCache {
    /// Crée un cache pointant vers `path` (le fichier n'est pas touché)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Chemin du fichier cache
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Le fichier cache existe-t-il ?
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Charge la table depuis le cache, ou la fetch puis l'écrit
    ///
    /// CONCEPT RUST : Generics sur une closure async
    /// - F : FnOnce() -> Fut, appelée au plus une fois
    /// - Fut : la Future renvoyée par la closure
    /// - Le fetch n'est même pas construit si le fichier existe
    pub async fn load_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<RateTable>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<RateTable, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if self.exists() {
            info!(path = %self.path.display(), "Cache file found, skipping network fetch");
            return self.load();
        }

        info!(path = %self.path.display(), "No cache file, fetching exchange rates");
        let table = fetch().await.context("Failed to fetch data")?;
        self.store(&table)?;
        Ok(table)
    }

    /// Lit le fichier CSV
    ///
    /// La première colonne est la date, quel que soit son nom ("Date",
    /// "Week_start"...). Les autres colonnes sont des codes devise.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<RateTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Échec de l'ouverture du cache {}", self.path.display()))?;

        let headers = reader
            .headers()
            .context("Échec de la lecture de l'en-tête du cache")?
            .clone();

        // On saute la colonne date
        let columns: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            // +2 : en-tête + numérotation humaine
            let line = line + 2;
            let record = record.with_context(|| format!("Ligne {} illisible", line))?;

            let date_field = record
                .get(0)
                .with_context(|| format!("Ligne {} : date manquante", line))?;
            let date = parse_date(date_field)
                .with_context(|| format!("Ligne {} : date invalide '{}'", line, date_field))?;

            let rates = record
                .iter()
                .skip(1)
                .map(parse_rate)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Ligne {} : taux invalide", line))?;

            rows.push(RateRow::new(date, rates));
        }

        let table = RateTable::from_rows(columns, rows);
        debug!(rows = table.len(), currencies = table.columns().len(), "Loaded cache file");
        Ok(table)
    }

    /// Écrit la table dans le fichier CSV (écrase le fichier existant)
    #[instrument(skip(self, table), fields(path = %self.path.display(), rows = table.len()))]
    pub fn store(&self, table: &RateTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Échec de la création du répertoire {}", parent.display()))?;
        }

        let mut writer = Writer::from_path(&self.path)
            .with_context(|| format!("Échec de la création du cache {}", self.path.display()))?;

        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(table.columns().iter().cloned());
        writer.write_record(&header)?;

        for row in table.rows() {
            let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
            record.extend(
                row.rates
                    .iter()
                    .map(|rate| rate.map(|r| r.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush().context("Échec de l'écriture du cache")?;
        info!("Exchange rates written to cache");
        Ok(())
    }
}

/// Parse une date "YYYY-MM-DD" (ou "YYYY-MM-DD HH:MM:SS")
fn parse_date(field: &str) -> Result<NaiveDate> {
    let field = field.trim();
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(Into::into)
}

/// Parse un taux ; une cellule vide est une valeur manquante
fn parse_rate(field: &str) -> Result<Option<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    let rate: f64 = field
        .parse()
        .with_context(|| format!("'{}' n'est pas un nombre", field))?;
    Ok(Some(rate))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_table() -> RateTable {
        RateTable::from_snapshots(vec![
            (
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                vec![("KRW".to_string(), 1300.5), ("EUR".to_string(), 0.9)],
            ),
            (
                NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                vec![("KRW".to_string(), 1310.25)],
            ),
        ])
    }

    #[test]
    fn test_store_writes_expected_csv() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SeriesCache::new(dir.path().join("rates.csv"));

        cache.store(&sample_table()).unwrap();

        let content = std::fs::read_to_string(cache.path()).unwrap();
        assert_eq!(
            content,
            "Date,KRW,EUR\n2024-01-01,1300.5,0.9\n2024-01-08,1310.25,\n"
        );
    }

    #[test]
    fn test_store_then_load_keeps_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SeriesCache::new(dir.path().join("rates.csv"));

        cache.store(&sample_table()).unwrap();
        let loaded = cache.load().unwrap();

        assert_eq!(loaded, sample_table());
        assert_eq!(loaded.rows()[1].rate(1), None);
    }

    #[test]
    fn test_load_accepts_week_start_header_and_unsorted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(
            &path,
            "Week_start,KRW,AUD\n2024-01-08,1310,1.5\n2024-01-01 00:00:00,1300,1.4\n",
        )
        .unwrap();

        let table = SeriesCache::new(&path).load().unwrap();

        assert_eq!(table.default_currency(), Some("KRW"));
        assert_eq!(table.first().unwrap().date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(table.last().unwrap().rate(1), Some(1.5));
    }

    #[test]
    fn test_load_rejects_bad_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(&path, "Date,EUR\n2024-01-01,abc\n").unwrap();

        assert!(SeriesCache::new(&path).load().is_err());
    }

    #[tokio::test]
    async fn test_existing_cache_skips_fetch_and_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SeriesCache::new(dir.path().join("rates.csv"));
        cache.store(&sample_table()).unwrap();
        let bytes_before = std::fs::read(cache.path()).unwrap();

        let calls = AtomicUsize::new(0);
        let mut loads = Vec::new();
        for _ in 0..2 {
            let table = cache
                .load_or_fetch(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, FetchError>(RateTable::empty()) }
                })
                .await
                .unwrap();
            loads.push(table);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(loads[0], loads[1]);
        assert_eq!(loads[0], sample_table());
        assert_eq!(std::fs::read(cache.path()).unwrap(), bytes_before);
    }

    #[tokio::test]
    async fn test_missing_cache_fetches_once_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SeriesCache::new(dir.path().join("nested").join("rates.csv"));
        assert!(!cache.exists());

        let calls = AtomicUsize::new(0);
        let table = cache
            .load_or_fetch(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, FetchError>(sample_table()) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(table, sample_table());
        assert!(cache.exists());
        assert_eq!(cache.load().unwrap(), sample_table());
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_no_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SeriesCache::new(dir.path().join("rates.csv"));

        let result = cache
            .load_or_fetch(|| async { Err::<RateTable, _>(FetchError::Parse("boom".to_string())) })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch data"));
        assert!(!cache.exists());
    }
}
