// ============================================================================
// Barres de variation (texte Unicode)
// ============================================================================
// Variation en pourcentage de chaque devise, dessinée en texte autour d'un
// axe zéro central :
//
//   KRW            │████████   +3.21%
//   EUR        ████│           -1.50%
//   THB            │            N/A
//
// Le BarChart de ratatui ne prend que des u64 : pas de valeurs négatives.
// On construit donc les barres caractère par caractère, comme les bougies.
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Caractère d'une barre pleine
const BAR: char = '█';

/// Axe zéro
const AXIS: &str = "│";

/// Une ligne du graphique, prête à styliser
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    /// Code devise
    pub code: String,

    /// Moitié gauche (barre négative alignée contre l'axe)
    pub left: String,

    /// Moitié droite (barre positive partant de l'axe)
    pub right: String,

    /// Variation en pourcentage (NaN si inconnue)
    pub change: f64,
}

impl BarRow {
    /// Libellé de la valeur : "+3.21%", "-1.50%" ou "N/A"
    pub fn label(&self) -> String {
        if self.change.is_finite() {
            format!("{:+.2}%", self.change)
        } else {
            "N/A".to_string()
        }
    }
}

/// Construit les lignes du graphique
///
/// Les barres sont proportionnelles à la plus grande variation finie en
/// valeur absolue, qui occupe toute la demi-largeur `half_width`.
/// Une variation non finie (taux manquant) n'a pas de barre.
pub fn bar_rows(changes: &[(String, f64)], half_width: usize) -> Vec<BarRow> {
    let max_abs = changes
        .iter()
        .map(|(_, c)| c.abs())
        .filter(|c| c.is_finite())
        .fold(0.0_f64, f64::max);

    changes
        .iter()
        .map(|(code, change)| {
            let length = if change.is_finite() && max_abs > 0.0 {
                ((change.abs() / max_abs) * half_width as f64).round() as usize
            } else {
                0
            };
            let bar: String = std::iter::repeat(BAR).take(length.min(half_width)).collect();

            let (left, right) = if *change < 0.0 {
                (format!("{:>width$}", bar, width = half_width), " ".repeat(half_width))
            } else {
                (" ".repeat(half_width), format!("{:<width$}", bar, width = half_width))
            };

            BarRow {
                code: code.clone(),
                left,
                right,
                change: *change,
            }
        })
        .collect()
}

/// Dessine le graphique des variations
pub fn render_change_bars(frame: &mut Frame, changes: &[(String, f64)], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Percentage Change (first → latest) ");

    if changes.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No data",
            Style::default().fg(Color::Gray),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Bordures (2) + code (5) + axe (1) + libellé (10)
    let half_width = (area.width.saturating_sub(18) / 2).max(1) as usize;

    let lines: Vec<Line> = bar_rows(changes, half_width)
        .into_iter()
        .map(|row| {
            let label = row.label();
            let color = if !row.change.is_finite() {
                Color::Gray
            } else if row.change >= 0.0 {
                Color::Green
            } else {
                Color::Red
            };

            Line::from(vec![
                Span::styled(
                    format!("{:<5}", row.code),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(row.left, Style::default().fg(Color::Red)),
                Span::styled(AXIS, Style::default().fg(Color::DarkGray)),
                Span::styled(row.right, Style::default().fg(Color::Green)),
                Span::styled(format!(" {:>9}", label), Style::default().fg(color)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
