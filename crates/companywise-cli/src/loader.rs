//! Dataset loading with request superseding.
//!
//! Loads run as spawned tasks and report back over a channel. Every request
//! carries a generation number; only the newest request's result is ever
//! applied, so a slow response for an employer the user has already left
//! cannot overwrite the current question set.

use std::sync::Arc;

use companywise_core::{
  period::PeriodId,
  question::QuestionRecord,
  source::QuestionSource,
};
use tokio::sync::mpsc::UnboundedSender;

/// Identity of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
  pub generation: u64,
  pub employer:   String,
  pub period:     PeriodId,
}

/// What a finished load sends back.
#[derive(Debug)]
pub struct LoadResult {
  pub request:   LoadRequest,
  pub questions: Vec<QuestionRecord>,
}

/// Hands out generations and remembers which request is current.
#[derive(Debug, Default)]
pub struct LoadGeneration {
  next:    u64,
  pending: Option<LoadRequest>,
}

impl LoadGeneration {
  /// Start a new request, superseding any pending one.
  pub fn begin(&mut self, employer: &str, period: PeriodId) -> LoadRequest {
    self.next += 1;
    let request = LoadRequest {
      generation: self.next,
      employer: employer.to_owned(),
      period,
    };
    self.pending = Some(request.clone());
    request
  }

  /// Accept `request` if it is the pending one, clearing it.
  /// Returns `false` for superseded (stale) requests.
  pub fn finish(&mut self, request: &LoadRequest) -> bool {
    if self.pending.as_ref() == Some(request) {
      self.pending = None;
      true
    } else {
      false
    }
  }

  pub fn is_loading(&self) -> bool { self.pending.is_some() }
}

/// Fetch and parse the data set for `(employer, period)`.
///
/// Never fails: a missing data set, a transport error or a parse error all
/// yield an empty list after being logged.
pub async fn load_questions<D: QuestionSource>(
  source: &D,
  employer: &str,
  period: PeriodId,
) -> Vec<QuestionRecord> {
  let text = match source.fetch_dataset(employer, period).await {
    Ok(Some(text)) => text,
    Ok(None) => {
      tracing::info!(employer, %period, "no data set published");
      return Vec::new();
    }
    Err(e) => {
      tracing::warn!(employer, %period, "fetching data set failed: {e}");
      return Vec::new();
    }
  };

  match companywise_csv::parse(&text) {
    Ok(questions) => {
      tracing::debug!(employer, %period, count = questions.len(), "loaded data set");
      questions
    }
    Err(e) => {
      tracing::warn!(employer, %period, "parsing data set failed: {e}");
      Vec::new()
    }
  }
}

/// Run [`load_questions`] on the runtime and send the result to `tx`.
pub fn spawn_load<D>(
  source: Arc<D>,
  request: LoadRequest,
  tx: UnboundedSender<LoadResult>,
) where
  D: QuestionSource + 'static,
{
  tokio::spawn(async move {
    let questions =
      load_questions(source.as_ref(), &request.employer, request.period).await;
    // The receiver only goes away when the app is shutting down.
    let _ = tx.send(LoadResult { request, questions });
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::{DirSource, Source};

  fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data/Globex")).unwrap();
    std::fs::write(
      dir.path().join("data/Globex/all.csv"),
      "ID,Title,Difficulty,Frequency %\n1,Two Sum,Easy,90%\n2,Bad Row\n",
    )
    .unwrap();
    // Not UTF-8: the source cannot return it as text.
    std::fs::write(
      dir.path().join("data/Globex/six-months.csv"),
      b"ID,Title\n1,\xff\xfe\n",
    )
    .unwrap();
    dir
  }

  #[test]
  fn newer_request_supersedes_older() {
    let mut loads = LoadGeneration::default();
    let first = loads.begin("Acme", PeriodId::ThirtyDays);
    let second = loads.begin("Acme", PeriodId::All);
    assert!(loads.is_loading());
    assert!(!loads.finish(&first));
    assert!(loads.is_loading());
    assert!(loads.finish(&second));
    assert!(!loads.is_loading());
    assert!(!loads.finish(&second));
  }

  #[test]
  fn same_selection_requested_twice_only_accepts_latest() {
    let mut loads = LoadGeneration::default();
    let first = loads.begin("Acme", PeriodId::All);
    let second = loads.begin("Acme", PeriodId::All);
    assert_ne!(first, second);
    assert!(!loads.finish(&first));
    assert!(loads.finish(&second));
  }

  #[tokio::test]
  async fn loads_every_row() {
    let dir = site();
    let source = Source::Dir(DirSource::new(dir.path()));
    let questions = load_questions(&source, "Globex", PeriodId::All).await;
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].frequency_percent, 90.0);
    assert_eq!(questions[1].title, "Bad Row");
  }

  #[tokio::test]
  async fn missing_data_set_is_empty() {
    let dir = site();
    let source = Source::Dir(DirSource::new(dir.path()));
    assert!(
      load_questions(&source, "AcmeCorp", PeriodId::ThirtyDays)
        .await
        .is_empty()
    );
  }

  #[tokio::test]
  async fn unreadable_data_set_is_empty() {
    let dir = site();
    let source = Source::Dir(DirSource::new(dir.path()));
    assert!(
      load_questions(&source, "Globex", PeriodId::SixMonths)
        .await
        .is_empty()
    );
  }

  #[tokio::test]
  async fn spawned_load_reports_its_request() {
    let dir = site();
    let source = Arc::new(Source::Dir(DirSource::new(dir.path())));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut loads = LoadGeneration::default();

    let request = loads.begin("Globex", PeriodId::All);
    spawn_load(source, request.clone(), tx);

    let result = rx.recv().await.unwrap();
    assert_eq!(result.request, request);
    assert_eq!(result.questions.len(), 2);
    assert!(loads.finish(&result.request));
  }
}
