// ============================================================================
// Structure : App
// ============================================================================
// État de l'application TUI, construit une seule fois au démarrage.
//
// Deux parties bien séparées :
// - AppData : la table et ses statistiques, immuables après le chargement
// - l'état d'interface : écran courant, sélection, saisie du montant
//
// PATTERN : "Application State"
// - Tous les widgets lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - La vue de la sélection n'est recalculée que lorsque la sélection change
// ============================================================================

use chrono::NaiveDate;

use crate::models::selection::{selection_view, Selection, SelectionView};
use crate::models::RateTable;
use crate::stats::Statistics;

/// Données chargées au démarrage (jamais modifiées ensuite)
#[derive(Debug, Clone)]
pub struct AppData {
    /// Table des taux
    pub table: RateTable,

    /// Statistiques calculées une fois pour toutes
    pub stats: Statistics,

    /// Date du jour affichée dans l'en-tête
    pub today: NaiveDate,
}

impl AppData {
    /// Calcule les statistiques et fige les données
    pub fn new(table: RateTable, volatility_window: usize, today: NaiveDate) -> Self {
        let stats = Statistics::compute(&table, volatility_window);
        Self { table, stats, today }
    }
}

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Tab / Shift-Tab / 1-4 pour naviguer
// ============================================================================

/// Écrans du dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sélecteur de devise, montant, conversion, graphique de la devise
    Converter,

    /// Graphique multi-séries + table des données
    Overview,

    /// Derniers taux + variation en pourcentage
    Summary,

    /// Volatilité glissante
    Volatility,
}

impl Screen {
    /// Tous les écrans, dans l'ordre des onglets
    pub fn all() -> [Screen; 4] {
        [Screen::Converter, Screen::Overview, Screen::Summary, Screen::Volatility]
    }

    /// Titre de l'onglet
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Converter => "Converter",
            Screen::Overview => "Overview",
            Screen::Summary => "Summary",
            Screen::Volatility => "Volatility",
        }
    }

    /// Position dans les onglets
    pub fn index(&self) -> usize {
        Screen::all().iter().position(|s| s == self).unwrap_or(0)
    }

    /// Écran par numéro (1-4)
    pub fn from_number(n: u32) -> Option<Screen> {
        let index = usize::try_from(n.checked_sub(1)?).ok()?;
        Screen::all().get(index).copied()
    }

    /// Écran suivant (cycle)
    pub fn next(&self) -> Screen {
        let all = Screen::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Écran précédent (cycle)
    pub fn previous(&self) -> Screen {
        let all = Screen::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Table et statistiques
    pub data: AppData,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Index de la devise sélectionnée dans `data.table.columns()`
    pub selected_index: usize,

    /// Sélection courante (devise + montant)
    pub selection: Selection,

    /// Vue recalculée pour la sélection courante
    pub view: SelectionView,

    /// Saisie du montant en cours ?
    pub editing_amount: bool,

    /// Buffer de saisie du montant
    pub input_buffer: String,

    /// Dernière erreur de saisie (montant invalide)
    pub input_error: Option<String>,

    /// Two-step quit : première pression de 'q' → true
    pub confirm_quit: bool,
}

impl App {
    /// Crée l'application avec la devise par défaut et un montant de 1
    pub fn new(data: AppData) -> Self {
        let selection = Selection::initial(&data.table);
        let view = selection_view(&data.table, &data.stats, &selection);

        Self {
            running: true,
            data,
            current_screen: Screen::Converter,
            selected_index: 0,
            selection,
            view,
            editing_amount: false,
            input_buffer: String::new(),
            input_error: None,
            confirm_quit: false,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Sélection de la devise
    // ========================================================================

    /// Devise précédente dans le sélecteur
    pub fn navigate_up(&mut self) {
        self.select_currency(self.selected_index.saturating_sub(1));
    }

    /// Devise suivante dans le sélecteur
    pub fn navigate_down(&mut self) {
        let max_index = self.data.table.columns().len().saturating_sub(1);
        self.select_currency((self.selected_index + 1).min(max_index));
    }

    /// Sélectionne la devise à `index` et recalcule la vue si elle change
    pub fn select_currency(&mut self, index: usize) {
        let Some(code) = self.data.table.columns().get(index) else {
            return;
        };

        self.selected_index = index;
        if self.selection.currency.as_deref() != Some(code.as_str()) {
            self.selection.currency = Some(code.clone());
            self.refresh_view();
        }
    }

    /// Code de la devise sélectionnée
    pub fn selected_currency(&self) -> Option<&str> {
        self.selection.currency.as_deref()
    }

    /// Recalcule la vue (graphique + conversion) depuis la sélection
    fn refresh_view(&mut self) {
        self.view = selection_view(&self.data.table, &self.data.stats, &self.selection);
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn show_screen(&mut self, screen: Screen) {
        self.current_screen = screen;
    }

    pub fn next_screen(&mut self) {
        self.current_screen = self.current_screen.next();
    }

    pub fn previous_screen(&mut self) {
        self.current_screen = self.current_screen.previous();
    }

    pub fn is_on_converter(&self) -> bool {
        self.current_screen == Screen::Converter
    }

    // ========================================================================
    // Saisie du montant
    // ========================================================================

    /// Entre en mode saisie, pré-rempli avec le montant courant
    pub fn start_amount_input(&mut self) {
        self.editing_amount = true;
        self.input_error = None;
        self.input_buffer = trim_amount(self.selection.amount);
    }

    /// Annule la saisie (le montant ne change pas)
    pub fn cancel_input(&mut self) {
        self.editing_amount = false;
        self.input_buffer.clear();
        self.input_error = None;
    }

    /// Valide la saisie
    ///
    /// Retourne true si le montant a été accepté. Un montant invalide laisse
    /// la sélection intacte et reste en mode saisie avec un message d'erreur.
    pub fn submit_amount(&mut self) -> bool {
        match self.input_buffer.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount >= 0.0 => {
                self.editing_amount = false;
                self.input_buffer.clear();
                self.input_error = None;
                if amount != self.selection.amount {
                    self.selection.amount = amount;
                    self.refresh_view();
                }
                true
            }
            _ => {
                self.input_error = Some(format!("Montant invalide : '{}'", self.input_buffer));
                false
            }
        }
    }

    /// Ajoute un caractère au buffer (chiffres et un seul point décimal)
    pub fn append_char(&mut self, c: char) {
        let accepted = c.is_ascii_digit() || (c == '.' && !self.input_buffer.contains('.'));
        if accepted {
            self.input_buffer.push(c);
            self.input_error = None;
        }
    }

    /// Supprime le dernier caractère du buffer
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Vérifie si on est en mode saisie
    pub fn is_editing_amount(&self) -> bool {
        self.editing_amount
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Première pression de 'q'
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Toute autre touche annule la demande
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

/// Montant sans zéros inutiles pour pré-remplir la saisie (1.0 → "1")
fn trim_amount(amount: f64) -> String {
    let text = format!("{}", amount);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

// ============================================================================
// Tests unitaires
// ============================================================================
