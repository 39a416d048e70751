//! The recurring shift materializer.
//!
//! A pass looks at a family's assignments and makes sure every recurring,
//! active assignment has instances in the upcoming week. Existence of any
//! instance in the window is the only idempotency signal: such assignments are
//! skipped, everything else is handed to the [`InstanceGenerator`].
//!
//! A pass never fails. Per-assignment problems are logged and recorded in the
//! returned [`PassReport`]; the next pass retries them naturally.

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::{
  shift::{AssignmentId, ShiftAssignment},
  store::{InstanceGenerator, InstanceQuery},
  window::{WeekStart, WeekWindow},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// What happened to a single assignment during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutcomeKind {
  /// No instances existed; the generation service created `created` of them.
  Generated { created: usize },
  /// Instances already existed in the window.
  Skipped { existing: usize },
  /// The existence query failed, so generation was not attempted.
  VerificationFailed { reason: String },
  /// The generation service reported an error.
  GenerationFailed { reason: String },
}

impl OutcomeKind {
  pub fn is_failure(&self) -> bool {
    matches!(self, Self::VerificationFailed { .. } | Self::GenerationFailed { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
  pub assignment_id: AssignmentId,
  #[serde(flatten)]
  pub outcome:       OutcomeKind,
}

/// Summary of one materialization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
  /// The target window, or `None` when the pass had no assignments at all.
  pub window:   Option<WeekWindow>,
  /// One entry per recurring, active assignment, in input order.
  pub outcomes: Vec<AssignmentOutcome>,
}

impl PassReport {
  pub fn generated(&self) -> usize { self.count(|o| matches!(o, OutcomeKind::Generated { .. })) }

  pub fn skipped(&self) -> usize { self.count(|o| matches!(o, OutcomeKind::Skipped { .. })) }

  pub fn failed(&self) -> usize { self.count(OutcomeKind::is_failure) }

  /// True when no assignment failed verification or generation.
  pub fn is_clean(&self) -> bool { self.failed() == 0 }

  pub fn outcome_for(&self, id: &AssignmentId) -> Option<&OutcomeKind> {
    self
      .outcomes
      .iter()
      .find(|o| &o.assignment_id == id)
      .map(|o| &o.outcome)
  }

  fn count(&self, pred: impl Fn(&OutcomeKind) -> bool) -> usize {
    self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
  }
}

// ─── Materializer ────────────────────────────────────────────────────────────

/// Drives materialization passes against a query service and a generation
/// service. Holds no state between passes.
pub struct Materializer<'s, Q, G> {
  query:      &'s Q,
  generator:  &'s G,
  week_start: WeekStart,
}

impl<'s, Q, G> Materializer<'s, Q, G>
where
  Q: InstanceQuery,
  G: InstanceGenerator,
{
  pub fn new(query: &'s Q, generator: &'s G) -> Self {
    Self { query, generator, week_start: WeekStart::default() }
  }

  pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
    self.week_start = week_start;
    self
  }

  /// Ensure instances exist in the week after the one containing `today` for
  /// every recurring, active assignment in `assignments`.
  ///
  /// Per-assignment checks run concurrently. An assignment id that appears
  /// more than once is processed once.
  pub async fn materialize_upcoming_week(
    &self,
    assignments: &[ShiftAssignment],
    today:       NaiveDate,
  ) -> PassReport {
    if assignments.is_empty() {
      tracing::debug!("no assignments; nothing to materialize");
      return PassReport::default();
    }

    let Some(window) = WeekWindow::upcoming(today, self.week_start) else {
      tracing::warn!(%today, "week after today is outside the calendar; nothing to materialize");
      return PassReport::default();
    };

    let mut seen = HashSet::new();
    let pending = assignments
      .iter()
      .filter(|a| a.is_materializable())
      .filter(|a| seen.insert(&a.id))
      .map(|a| self.materialize_one(&a.id, window));

    let outcomes = join_all(pending).await;
    let report = PassReport { window: Some(window), outcomes };

    tracing::info!(
      week_start = %window.start,
      week_end   = %window.end,
      generated  = report.generated(),
      skipped    = report.skipped(),
      failed     = report.failed(),
      "materialization pass complete"
    );

    report
  }

  async fn materialize_one(&self, id: &AssignmentId, window: WeekWindow) -> AssignmentOutcome {
    let outcome = match self.query.existing_dates(id, window).await {
      Err(e) => {
        tracing::warn!(
          assignment_id = %id,
          error = %e,
          "could not verify existing instances; not generating"
        );
        OutcomeKind::VerificationFailed { reason: e.to_string() }
      }
      Ok(existing) if !existing.is_empty() => {
        tracing::debug!(
          assignment_id = %id,
          existing = existing.len(),
          "instances already present; skipping"
        );
        OutcomeKind::Skipped { existing: existing.len() }
      }
      Ok(_) => match self.generator.generate(id, window).await {
        Ok(created) => {
          tracing::info!(assignment_id = %id, created, "generated shift instances");
          OutcomeKind::Generated { created }
        }
        Err(e) => {
          tracing::warn!(
            assignment_id = %id,
            error = %e,
            "failed to generate shift instances"
          );
          OutcomeKind::GenerationFailed { reason: e.to_string() }
        }
      },
    };

    AssignmentOutcome { assignment_id: id.clone(), outcome }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
  };

  use chrono::{NaiveTime, Utc, Weekday};
  use uuid::Uuid;

  use super::*;

  // ─── Fake services ─────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("service unavailable")]
  struct Unavailable;

  /// Records every call and answers from canned data.
  #[derive(Default)]
  struct FakeService {
    existing:            HashMap<AssignmentId, Vec<NaiveDate>>,
    failing_queries:     HashSet<AssignmentId>,
    failing_generations: HashSet<AssignmentId>,
    queries:             Mutex<Vec<AssignmentId>>,
    generations:         Mutex<Vec<(AssignmentId, WeekWindow)>>,
  }

  impl FakeService {
    fn queries(&self) -> Vec<AssignmentId> { self.queries.lock().unwrap().clone() }

    fn generations(&self) -> Vec<(AssignmentId, WeekWindow)> {
      self.generations.lock().unwrap().clone()
    }

    fn generated_ids(&self) -> HashSet<AssignmentId> {
      self.generations().into_iter().map(|(id, _)| id).collect()
    }
  }

  impl InstanceQuery for FakeService {
    type Error = Unavailable;

    async fn existing_dates(
      &self,
      id:     &AssignmentId,
      window: WeekWindow,
    ) -> Result<Vec<NaiveDate>, Unavailable> {
      self.queries.lock().unwrap().push(id.clone());
      if self.failing_queries.contains(id) {
        return Err(Unavailable);
      }
      Ok(
        self
          .existing
          .get(id)
          .map(|dates| dates.iter().copied().filter(|d| window.contains(*d)).collect())
          .unwrap_or_default(),
      )
    }
  }

  impl InstanceGenerator for FakeService {
    type Error = Unavailable;

    async fn generate(&self, id: &AssignmentId, window: WeekWindow) -> Result<usize, Unavailable> {
      self.generations.lock().unwrap().push((id.clone(), window));
      if self.failing_generations.contains(id) {
        return Err(Unavailable);
      }
      Ok(2)
    }
  }

  // ─── Helpers ───────────────────────────────────────────────────────────────

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  /// 2025-06-11, a Wednesday.
  fn today() -> NaiveDate { date(2025, 6, 11) }

  fn assignment(id: &str, is_recurring: bool, active: bool) -> ShiftAssignment {
    ShiftAssignment {
      id: AssignmentId::from(id),
      family_id: Uuid::nil(),
      carer_id: None,
      title: format!("shift {id}"),
      weekdays: vec![Weekday::Mon, Weekday::Thu],
      start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
      is_recurring,
      active,
      created_at: Utc::now(),
    }
  }

  async fn run(service: &FakeService, assignments: &[ShiftAssignment]) -> PassReport {
    Materializer::new(service, service)
      .materialize_upcoming_week(assignments, today())
      .await
  }

  // ─── Tests ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_assignment_list_is_a_no_op() {
    let service = FakeService::default();
    let report = run(&service, &[]).await;

    assert!(service.queries().is_empty());
    assert!(service.generations().is_empty());
    assert_eq!(report, PassReport::default());
  }

  #[tokio::test]
  async fn generates_for_single_recurring_assignment() {
    let service = FakeService::default();
    let report = run(&service, &[assignment("A1", true, true)]).await;

    let expected = WeekWindow { start: date(2025, 6, 16), end: date(2025, 6, 22) };
    assert_eq!(service.generations(), vec![(AssignmentId::from("A1"), expected)]);
    assert_eq!(report.window, Some(expected));
    assert_eq!(
      report.outcome_for(&"A1".into()),
      Some(&OutcomeKind::Generated { created: 2 })
    );
  }

  #[tokio::test]
  async fn existing_instances_suppress_generation() {
    let mut service = FakeService::default();
    service
      .existing
      .insert("A1".into(), vec![date(2025, 6, 16), date(2025, 6, 19)]);

    let assignments = [assignment("A1", true, true)];
    let first = run(&service, &assignments).await;
    let second = run(&service, &assignments).await;

    assert!(service.generations().is_empty());
    assert_eq!(service.queries().len(), 2);
    assert_eq!(first, second);
    assert_eq!(
      first.outcome_for(&"A1".into()),
      Some(&OutcomeKind::Skipped { existing: 2 })
    );
  }

  #[tokio::test]
  async fn instances_outside_the_window_do_not_count() {
    let mut service = FakeService::default();
    // Current week and the week after next.
    service
      .existing
      .insert("A1".into(), vec![date(2025, 6, 12), date(2025, 6, 23)]);

    run(&service, &[assignment("A1", true, true)]).await;
    assert_eq!(service.generations().len(), 1);
  }

  #[tokio::test]
  async fn non_recurring_and_inactive_assignments_are_ignored() {
    let service = FakeService::default();
    let report = run(
      &service,
      &[
        assignment("one-off", false, true),
        assignment("paused", true, false),
        assignment("retired", false, false),
      ],
    )
    .await;

    assert!(service.queries().is_empty());
    assert!(service.generations().is_empty());
    assert!(report.outcomes.is_empty());
    assert!(report.window.is_some());
  }

  #[tokio::test]
  async fn generation_failure_does_not_stop_the_pass() {
    let mut service = FakeService::default();
    service.failing_generations.insert("A2".into());

    let report = run(
      &service,
      &[
        assignment("A1", true, true),
        assignment("A2", true, true),
        assignment("A3", true, true),
      ],
    )
    .await;

    let expected: HashSet<AssignmentId> = ["A1", "A2", "A3"].map(AssignmentId::from).into();
    assert_eq!(service.generated_ids(), expected);
    assert_eq!(report.generated(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_clean());
    assert!(matches!(
      report.outcome_for(&"A2".into()),
      Some(OutcomeKind::GenerationFailed { .. })
    ));
  }

  #[tokio::test]
  async fn verification_failure_fails_closed() {
    let mut service = FakeService::default();
    service.failing_queries.insert("A1".into());

    let report = run(&service, &[assignment("A1", true, true), assignment("A2", true, true)]).await;

    assert_eq!(service.generated_ids(), HashSet::from([AssignmentId::from("A2")]));
    assert_eq!(
      report.outcome_for(&"A1".into()),
      Some(&OutcomeKind::VerificationFailed { reason: "service unavailable".into() })
    );
  }

  #[tokio::test]
  async fn duplicate_ids_are_processed_once() {
    let service = FakeService::default();
    let report = run(&service, &[assignment("A1", true, true), assignment("A1", true, true)]).await;

    assert_eq!(service.queries().len(), 1);
    assert_eq!(service.generations().len(), 1);
    assert_eq!(report.outcomes.len(), 1);
  }

  #[tokio::test]
  async fn sunday_week_start_shifts_the_window() {
    let service = FakeService::default();
    Materializer::new(&service, &service)
      .with_week_start(WeekStart::Sunday)
      .materialize_upcoming_week(&[assignment("A1", true, true)], today())
      .await;

    let (_, window) = service.generations().remove(0);
    assert_eq!(window, WeekWindow { start: date(2025, 6, 15), end: date(2025, 6, 21) });
  }

  #[tokio::test]
  async fn date_at_calendar_end_yields_empty_report() {
    let service = FakeService::default();
    let report = Materializer::new(&service, &service)
      .materialize_upcoming_week(&[assignment("A1", true, true)], NaiveDate::MAX)
      .await;

    assert_eq!(report, PassReport::default());
    assert!(service.queries().is_empty());
    assert!(service.generations().is_empty());
  }

  #[test]
  fn report_serialises_with_flattened_outcome() {
    let report = PassReport {
      window:   None,
      outcomes: vec![AssignmentOutcome {
        assignment_id: "A1".into(),
        outcome:       OutcomeKind::Skipped { existing: 3 },
      }],
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
      json["outcomes"][0],
      serde_json::json!({ "assignment_id": "A1", "outcome": "skipped", "existing": 3 })
    );
  }
}
