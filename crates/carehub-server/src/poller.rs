//! Polling trigger.
//!
//! Every tick, lists families and their assignments and runs a pass for each
//! family whose snapshot changed (or whose target week rolled over) since the
//! last clean pass. Listing failures are logged and retried next tick.

use std::{sync::Arc, time::Duration};

use carehub_api::Backend;
use carehub_core::{Materializer, SnapshotTrigger, WeekStart, WeekWindow, store::ScheduleStore};
use chrono::{Local, NaiveDate};
use tokio::time::MissedTickBehavior;

/// Poll forever at `interval`, using the local date as "today".
pub async fn run<S: Backend>(store: Arc<S>, week_start: WeekStart, interval: Duration) {
  let mut trigger = SnapshotTrigger::new();
  let mut ticker = tokio::time::interval(interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  tracing::info!(interval_secs = interval.as_secs(), %week_start, "materialization poller started");

  loop {
    ticker.tick().await;
    let today = Local::now().date_naive();
    poll_once(&*store, week_start, &mut trigger, today).await;
  }
}

/// One poll over every family. Returns the number of passes run.
pub async fn poll_once<S: Backend>(
  store:      &S,
  week_start: WeekStart,
  trigger:    &mut SnapshotTrigger,
  today:      NaiveDate,
) -> usize {
  let families = match store.list_families().await {
    Ok(families) => families,
    Err(e) => {
      tracing::warn!(error = %e, "could not list families");
      return 0;
    }
  };

  let Some(window) = WeekWindow::upcoming(today, week_start) else {
    tracing::warn!(%today, "week after today is outside the calendar; skipping poll");
    return 0;
  };
  let materializer = Materializer::new(store, store).with_week_start(week_start);
  let mut passes = 0;

  for family_id in families {
    let assignments = match store.list_assignments(family_id).await {
      Ok(assignments) => assignments,
      Err(e) => {
        tracing::warn!(%family_id, error = %e, "could not list assignments");
        continue;
      }
    };

    if !trigger.should_run(family_id, &assignments, window) {
      continue;
    }

    tracing::debug!(%family_id, assignments = assignments.len(), "assignment snapshot changed");
    let report = materializer.materialize_upcoming_week(&assignments, today).await;
    trigger.record(family_id, &assignments, &report);
    passes += 1;
  }

  passes
}

#[cfg(test)]
mod tests {
  use carehub_core::{AssignmentId, NewAssignment};
  use carehub_store_sqlite::SqliteStore;
  use chrono::{NaiveTime, Weekday};
  use uuid::Uuid;

  use super::*;

  fn date(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, d).unwrap() }

  fn visit(family_id: Uuid, weekday: Weekday) -> NewAssignment {
    NewAssignment::recurring(
      family_id,
      "Visit",
      vec![weekday],
      NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
    )
  }

  async fn instance_count(store: &SqliteStore, id: &AssignmentId) -> usize {
    store
      .list_instances(id, date(1), date(30))
      .await
      .unwrap()
      .len()
  }

  #[tokio::test]
  async fn runs_only_when_snapshot_changes() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let family = Uuid::new_v4();
    let first = store.create_assignment(visit(family, Weekday::Tue)).await.unwrap();
    let mut trigger = SnapshotTrigger::new();

    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(11)).await, 1);
    assert_eq!(instance_count(&store, &first.id).await, 1);

    // Nothing changed.
    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(12)).await, 0);

    // A new assignment changes the snapshot.
    let second = store.create_assignment(visit(family, Weekday::Wed)).await.unwrap();
    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(12)).await, 1);
    assert_eq!(instance_count(&store, &first.id).await, 1);
    assert_eq!(instance_count(&store, &second.id).await, 1);

    // The following week materializes the week after.
    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(18)).await, 1);
    assert_eq!(instance_count(&store, &first.id).await, 2);
  }

  #[tokio::test]
  async fn families_are_tracked_independently() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    store.create_assignment(visit(a, Weekday::Mon)).await.unwrap();
    let mut trigger = SnapshotTrigger::new();

    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(11)).await, 1);

    store.create_assignment(visit(b, Weekday::Fri)).await.unwrap();
    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(11)).await, 1);
    assert_eq!(trigger.len(), 2);
  }

  #[tokio::test]
  async fn paused_assignment_still_counts_as_change() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let family = Uuid::new_v4();
    let a = store.create_assignment(visit(family, Weekday::Thu)).await.unwrap();
    let mut trigger = SnapshotTrigger::new();
    poll_once(&store, WeekStart::Monday, &mut trigger, date(11)).await;

    store.set_assignment_active(&a.id, false).await.unwrap();
    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, date(11)).await, 1);
    // Deactivation never removes what was already generated.
    assert_eq!(instance_count(&store, &a.id).await, 1);
  }

  #[tokio::test]
  async fn calendar_end_skips_the_poll() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = store.create_assignment(visit(Uuid::new_v4(), Weekday::Mon)).await.unwrap();
    let mut trigger = SnapshotTrigger::new();

    assert_eq!(poll_once(&store, WeekStart::Monday, &mut trigger, NaiveDate::MAX).await, 0);
    assert!(trigger.is_empty());
    assert_eq!(instance_count(&store, &a.id).await, 0);
  }
}
