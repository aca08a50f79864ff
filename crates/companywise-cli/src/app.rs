//! Application state machine and event dispatcher.

use std::sync::Arc;

use companywise_core::{
  manifest::{Employer, Manifest},
  period::{self, PeriodId},
  question::QuestionRecord,
  source::QuestionSource,
  stats::Progress,
  tracker::SolvedTracker,
  view::{self, ViewControls},
};
use companywise_store_sqlite::SqliteStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
  loader::{self, LoadGeneration, LoadResult},
  source::Source,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the employer list.
  Employers,
  /// Focus on the question table for the selected employer.
  Questions,
  /// Aggregate solved statistics.
  Stats,
}

/// Where printable keys go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
  Normal,
  /// Typing into the employer fuzzy filter.
  EmployerFilter,
  /// Typing into the question search box.
  Search,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,
  pub mode:   InputMode,

  /// Employers from the manifest, in manifest order.
  pub manifest: Manifest,

  /// Fuzzy filter over employer names.
  pub employer_filter: String,

  /// Cursor position within the *filtered* employer list.
  pub employer_cursor: usize,

  /// Employer whose questions are shown.
  pub selected_employer: Option<String>,

  pub period: PeriodId,

  /// The loaded data set, in file order.
  pub questions: Vec<QuestionRecord>,

  pub controls: ViewControls,

  /// Positions in `questions` after filtering and sorting. Recomputed only
  /// when `questions` or `controls` change.
  pub view: Vec<usize>,

  /// Cursor position within `view`.
  pub question_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub tracker: SolvedTracker<SqliteStore>,

  pub source: Arc<Source>,

  loads:   LoadGeneration,
  load_tx: UnboundedSender<LoadResult>,
  load_rx: UnboundedReceiver<LoadResult>,
}

impl App {
  pub fn new(
    source: Source,
    tracker: SolvedTracker<SqliteStore>,
    period: PeriodId,
  ) -> Self {
    let (load_tx, load_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::Employers,
      mode: InputMode::Normal,
      manifest: Manifest::default(),
      employer_filter: String::new(),
      employer_cursor: 0,
      selected_employer: None,
      period,
      questions: Vec::new(),
      controls: ViewControls::default(),
      view: Vec::new(),
      question_cursor: 0,
      status_msg: String::new(),
      tracker,
      source: Arc::new(source),
      loads: LoadGeneration::default(),
      load_tx,
      load_rx,
    }
  }

  // ── Manifest ──────────────────────────────────────────────────────────────

  /// Fetch and normalise the manifest. Failure leaves an empty employer
  /// list and a status message; it never aborts the app.
  pub async fn load_manifest(&mut self) {
    self.status_msg = "Loading employers…".into();
    let result = match self.source.fetch_manifest().await {
      Ok(raw) => Manifest::from_json(&raw).map_err(|e| e.to_string()),
      Err(e) => Err(e.to_string()),
    };

    match result {
      Ok(manifest) => {
        tracing::info!(employers = manifest.employers.len(), "loaded manifest");
        self.manifest = manifest;
        self.employer_cursor = 0;
        self.status_msg.clear();
        // A reload may have narrowed what the selected employer offers.
        if let Some(e) = self.selected() {
          let resolved = period::resolve(&e.available_periods, self.period);
          self.set_period(resolved);
        }
      }
      Err(e) => {
        tracing::error!(source = %self.source.describe(), "loading manifest failed: {e}");
        self.manifest = Manifest::default();
        self.status_msg = format!("Could not load employers: {e}");
      }
    }
  }

  /// Employers matching the current filter.
  pub fn visible_employers(&self) -> Vec<&Employer> {
    if self.employer_filter.is_empty() {
      return self.manifest.employers.iter().collect();
    }
    let matcher = SkimMatcherV2::default().ignore_case();
    self
      .manifest
      .employers
      .iter()
      .filter(|e| matcher.fuzzy_match(&e.name, &self.employer_filter).is_some())
      .collect()
  }

  pub fn cursor_employer(&self) -> Option<&Employer> {
    self.visible_employers().get(self.employer_cursor).copied()
  }

  fn selected(&self) -> Option<&Employer> {
    self
      .selected_employer
      .as_deref()
      .and_then(|name| self.manifest.employer(name))
  }

  /// Periods offered for the selected employer.
  pub fn selectable_periods(&self) -> Vec<PeriodId> {
    match self.selected() {
      Some(e) => period::selectable(&e.available_periods),
      None => PeriodId::PREFERENCE.to_vec(),
    }
  }

  // ── Selection & loading ───────────────────────────────────────────────────

  /// Select `name`, reconcile the period with what it offers and start
  /// loading its data set.
  pub fn select_employer(&mut self, name: &str) {
    let resolved = self
      .manifest
      .employer(name)
      .map(|e| period::resolve(&e.available_periods, self.period))
      .unwrap_or(self.period);
    if resolved != self.period {
      tracing::debug!(employer = name, from = %self.period, to = %resolved, "period not offered, falling back");
    }

    self.selected_employer = Some(name.to_owned());
    self.period = resolved;
    self.screen = Screen::Questions;
    self.question_cursor = 0;
    self.request_load();
  }

  pub fn set_period(&mut self, period: PeriodId) {
    if period == self.period {
      return;
    }
    self.period = period;
    if self.selected_employer.is_some() {
      self.question_cursor = 0;
      self.request_load();
    }
  }

  pub fn cycle_period(&mut self, forward: bool) {
    let next = match self.selected() {
      Some(e) => period::cycle(&e.available_periods, self.period, forward),
      None => period::cycle(&Default::default(), self.period, forward),
    };
    self.set_period(next);
  }

  /// Start a load for the current selection, superseding any in flight.
  fn request_load(&mut self) {
    let Some(employer) = self.selected_employer.clone() else {
      return;
    };
    // The old list must not stay toggleable while the new one loads.
    self.questions.clear();
    self.refresh_view();

    let request = self.loads.begin(&employer, self.period);
    tracing::debug!(%employer, period = %self.period, generation = request.generation, "requesting data set");
    loader::spawn_load(Arc::clone(&self.source), request, self.load_tx.clone());
  }

  pub fn is_loading(&self) -> bool { self.loads.is_loading() }

  /// Apply every finished load waiting on the channel.
  pub async fn poll_loads(&mut self) {
    while let Ok(result) = self.load_rx.try_recv() {
      self.apply_load(result).await;
    }
  }

  /// Block until one load finishes, then apply it.
  #[cfg(test)]
  pub async fn wait_for_load(&mut self) {
    if let Some(result) = self.load_rx.recv().await {
      self.apply_load(result).await;
    }
  }

  async fn apply_load(&mut self, result: LoadResult) {
    let LoadResult { request, questions } = result;
    let current = self.loads.finish(&request)
      && self.selected_employer.as_deref() == Some(request.employer.as_str())
      && self.period == request.period;
    if !current {
      tracing::debug!(employer = %request.employer, generation = request.generation, "discarding stale data set");
      return;
    }

    self.questions = questions;
    self.question_cursor = 0;
    self.refresh_view();

    if let Err(e) = self
      .tracker
      .sync_metadata(&request.employer, &self.questions)
      .await
    {
      tracing::error!(employer = %request.employer, "caching solved metadata failed: {e}");
      self.status_msg = format!("Could not save progress: {e}");
    }
  }

  // ── Question view ─────────────────────────────────────────────────────────

  /// Recompute the derived view after a change to questions or controls.
  pub fn refresh_view(&mut self) {
    self.view = view::derive_indices(&self.questions, &self.controls);
    if self.question_cursor >= self.view.len() {
      self.question_cursor = self.view.len().saturating_sub(1);
    }
  }

  pub fn visible_questions(&self) -> impl Iterator<Item = &QuestionRecord> + '_ {
    self.view.iter().map(|&i| &self.questions[i])
  }

  pub fn cursor_question(&self) -> Option<&QuestionRecord> {
    self
      .view
      .get(self.question_cursor)
      .map(|&i| &self.questions[i])
  }

  /// Put the cursor question's problem link in the status bar.
  pub fn show_link(&mut self) {
    let Some(question) = self.cursor_question() else { return };
    self.status_msg = if question.url.is_empty() {
      format!("No link for {}", question.title)
    } else {
      question.url.clone()
    };
  }

  pub fn is_solved(&self, id: &str) -> bool {
    self
      .selected_employer
      .as_deref()
      .is_some_and(|e| self.tracker.is_solved(e, id))
  }

  /// Progress for the selected employer over the loaded data set.
  pub fn progress(&self) -> Option<Progress> {
    let employer = self.selected_employer.as_deref()?;
    Some(self.tracker.progress(employer, &self.questions))
  }

  /// Flip the solved flag of the question under the cursor.
  pub async fn toggle_current(&mut self) {
    let (Some(employer), Some(question)) =
      (self.selected_employer.clone(), self.cursor_question().cloned())
    else {
      return;
    };

    match self.tracker.toggle(&employer, &question.id).await {
      Ok(solved) => {
        self.status_msg = if solved {
          format!("Solved: {}", question.title)
        } else {
          format!("Unsolved: {}", question.title)
        };
        if let Err(e) = self
          .tracker
          .sync_metadata(&employer, &self.questions)
          .await
        {
          tracing::error!(%employer, "caching solved metadata failed: {e}");
          self.status_msg = format!("Could not save progress: {e}");
        }
      }
      Err(e) => {
        tracing::error!(%employer, id = %question.id, "saving solved ledger failed: {e}");
        self.status_msg = format!("Could not save progress: {e}");
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return false;
    }

    match self.mode {
      InputMode::EmployerFilter => {
        self.handle_filter_key(key);
        return true;
      }
      InputMode::Search => {
        self.handle_search_key(key);
        return true;
      }
      InputMode::Normal => {}
    }

    match self.screen {
      Screen::Employers => self.handle_employers_key(key).await,
      Screen::Questions => self.handle_questions_key(key).await,
      Screen::Stats => self.handle_stats_key(key),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = InputMode::Normal;
        self.employer_filter.clear();
        self.employer_cursor = 0;
      }
      KeyCode::Enter => {
        self.mode = InputMode::Normal;
        self.employer_cursor = 0;
        // Open straight away if there's exactly one match.
        let only = match self.visible_employers().as_slice() {
          [only] => Some(only.name.clone()),
          _ => None,
        };
        if let Some(name) = only {
          self.select_employer(&name);
        }
      }
      KeyCode::Backspace => {
        self.employer_filter.pop();
        self.employer_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.employer_filter.push(c);
        self.employer_cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = InputMode::Normal;
        self.controls.search_term.clear();
      }
      KeyCode::Enter => self.mode = InputMode::Normal,
      KeyCode::Backspace => {
        self.controls.search_term.pop();
      }
      KeyCode::Char(c) => self.controls.search_term.push(c),
      _ => return,
    }
    self.question_cursor = 0;
    self.refresh_view();
  }

  async fn handle_employers_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_employers().len();
        if self.employer_cursor + 1 < len {
          self.employer_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.employer_cursor = self.employer_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(name) = self.cursor_employer().map(|e| e.name.clone()) {
          self.select_employer(&name);
        }
      }

      KeyCode::Char('/') => {
        self.mode = InputMode::EmployerFilter;
        self.employer_filter.clear();
        self.employer_cursor = 0;
      }

      KeyCode::Char('r') => self.load_manifest().await,
      KeyCode::Char('s') => self.screen = Screen::Stats,
      KeyCode::Tab if self.selected_employer.is_some() => {
        self.screen = Screen::Questions;
      }

      _ => {}
    }
    true
  }

  async fn handle_questions_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Tab => {
        self.screen = Screen::Employers;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.question_cursor + 1 < self.view.len() {
          self.question_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.question_cursor = self.question_cursor.saturating_sub(1);
      }
      KeyCode::Home | KeyCode::Char('g') => self.question_cursor = 0,
      KeyCode::End | KeyCode::Char('G') => {
        self.question_cursor = self.view.len().saturating_sub(1);
      }

      KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_current().await,
      KeyCode::Enter => self.show_link(),

      KeyCode::Char('/') => self.mode = InputMode::Search,
      KeyCode::Char('d') => {
        self.controls.difficulty = self.controls.difficulty.next();
        self.refresh_view();
      }
      KeyCode::Char('o') => {
        self.controls.sort = self.controls.sort.next();
        self.refresh_view();
      }
      KeyCode::Char('p') | KeyCode::Char(']') => self.cycle_period(true),
      KeyCode::Char('P') | KeyCode::Char('[') => self.cycle_period(false),

      KeyCode::Char('s') => self.screen = Screen::Stats,

      _ => {}
    }
    true
  }

  fn handle_stats_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('s') => {
        self.screen = if self.selected_employer.is_some() {
          Screen::Questions
        } else {
          Screen::Employers
        };
      }
      _ => {}
    }
    true
  }
}
