// ============================================================================
// Sélection utilisateur et vue recalculée
// ============================================================================
// La sélection (devise + montant en USD) est le seul état modifié par
// l'utilisateur. À chaque changement, on recalcule deux choses :
// - le graphique ligne de la devise sélectionnée
// - la chaîne de conversion "100.00 USD = 85.00 EUR (latest)"
//
// `selection_view` est une fonction pure : (table, stats, sélection) → vue.
// Elle ne dépend d'aucun widget et se teste sans terminal.
// ============================================================================

use crate::models::currency::{display_name, BASE_CURRENCY};
use crate::models::RateTable;
use crate::stats::Statistics;

/// Montant par défaut en USD
pub const DEFAULT_AMOUNT: f64 = 1.0;

/// Sélection courante : devise + montant
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Code de la devise sélectionnée (None si la table est vide)
    pub currency: Option<String>,

    /// Montant en USD à convertir
    pub amount: f64,
}

impl Selection {
    /// Sélection initiale : première devise de la table, montant 1
    pub fn initial(table: &RateTable) -> Self {
        Self {
            currency: table.default_currency().map(str::to_string),
            amount: DEFAULT_AMOUNT,
        }
    }
}

/// Données d'un graphique ligne, indépendantes du moteur de rendu
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Titre du graphique
    pub title: String,

    /// Nom de la série (légende / axe Y)
    pub label: String,

    /// Points (jours depuis la première date, taux)
    pub points: Vec<(f64, f64)>,

    /// Bornes de l'axe X : toute la plage de la table, quelle que soit la série
    pub x_bounds: [f64; 2],

    /// Bornes de l'axe Y (min, max des points, avec marge)
    pub y_bounds: [f64; 2],
}

/// Résultat du recalcul pour une sélection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    /// Graphique de la devise sélectionnée (None si rien à afficher)
    pub chart: Option<ChartData>,

    /// Chaîne de conversion
    pub conversion: String,
}

/// Recalcule la vue pour une sélection
///
/// Appelée uniquement quand la sélection change : jamais à chaque frame.
pub fn selection_view(table: &RateTable, stats: &Statistics, selection: &Selection) -> SelectionView {
    let Some(code) = selection.currency.as_deref() else {
        return SelectionView {
            chart: None,
            conversion: "No currency available".to_string(),
        };
    };

    SelectionView {
        chart: currency_chart(table, code),
        conversion: conversion_text(selection.amount, code, stats.latest_rate(code)),
    }
}

/// Graphique ligne d'une devise sur toute la table
///
/// L'axe X est fixé sur toute la plage de dates, même si la série a des trous.
pub fn currency_chart(table: &RateTable, code: &str) -> Option<ChartData> {
    let (first, last) = table.date_range()?;

    let points: Vec<(f64, f64)> = table
        .series(code)?
        .filter_map(|(date, rate)| rate.map(|r| (table.day_offset(date), r)))
        .collect();

    let name = display_name(code);
    let x_max = (last - first).num_days() as f64;

    Some(ChartData {
        title: format!("{} per 1 {}", name, display_name(BASE_CURRENCY)),
        label: name.into_owned(),
        y_bounds: padded_bounds(points.iter().map(|&(_, y)| y)),
        points,
        x_bounds: [0.0, x_max.max(1.0)],
    })
}

/// Bornes [min, max] d'une série avec 5% de marge
///
/// Même logique que le graphique de prix : fold pour min/max en une passe.
pub fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::MAX, f64::MIN), |(min, max), v| (min.min(v), max.max(v)));

    if min > max {
        return [0.0, 1.0];
    }

    let margin = if max > min { (max - min) * 0.05 } else { max.abs() * 0.05 + 1e-9 };
    [min - margin, max + margin]
}

/// Chaîne de conversion "{montant} USD = {converti} {devise} (latest)"
pub fn conversion_text(amount: f64, code: &str, latest_rate: Option<f64>) -> String {
    let converted = match latest_rate {
        Some(rate) => format_amount(amount * rate),
        None => "N/A".to_string(),
    };
    format!(
        "{} {} = {} {} (latest)",
        format_amount(amount),
        BASE_CURRENCY,
        converted,
        code
    )
}

/// Formate un montant avec deux décimales et séparateur de milliers
///
/// 1234.5 → "1,234.50", -0.5 → "-0.50"
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let formatted = format!("{:.2}", value.abs());
    let (integer, decimals) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    // Regroupe les chiffres par 3 en partant de la droite
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, decimals)
}

// ============================================================================
// Tests unitaires
// ============================================================================
