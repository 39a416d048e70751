//! [`SqliteStore`]: the SQLite implementation of the Carehub store traits.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use carehub_core::{
  store::{InstanceGenerator, InstanceQuery, ScheduleStore},
  AssignmentId, NewAssignment, ShiftAssignment, ShiftInstance, WeekWindow,
};

use crate::{
  encode::{
    decode_date, decode_uuid, encode_date, encode_dt, encode_time, encode_uuid,
    encode_weekdays, RawAssignment, RawInstance, ASSIGNMENT_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Carehub store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert instances for the given dates in one transaction, ignoring dates
  /// that already have one. Returns the number of rows actually inserted.
  async fn insert_instances(
    &self,
    assignment: &ShiftAssignment,
    dates:      Vec<NaiveDate>,
  ) -> Result<usize> {
    let assignment_id = assignment.id.as_str().to_owned();
    let start_str     = encode_time(assignment.start_time);
    let end_str       = encode_time(assignment.end_time);
    let at_str        = encode_dt(Utc::now());
    let rows: Vec<(String, String)> = dates
      .into_iter()
      .map(|d| Ok((encode_uuid(Uuid::new_v4()), encode_date(d)?)))
      .collect::<Result<_>>()?;

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut created = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO shift_instances (
               instance_id, shift_assignment_id, scheduled_date,
               start_time, end_time, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (instance_id, date) in &rows {
            created += stmt.execute(rusqlite::params![
              instance_id,
              assignment_id,
              date,
              start_str,
              end_str,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(created)
      })
      .await?;

    Ok(created)
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  async fn create_assignment(&self, input: NewAssignment) -> Result<ShiftAssignment> {
    input.validate()?;
    let assignment = input.into_assignment(AssignmentId::generate(), Utc::now());

    let id_str       = assignment.id.as_str().to_owned();
    let family_str   = encode_uuid(assignment.family_id);
    let carer_str    = assignment.carer_id.map(encode_uuid);
    let title        = assignment.title.clone();
    let weekdays_str = encode_weekdays(&assignment.weekdays)?;
    let start_str    = encode_time(assignment.start_time);
    let end_str      = encode_time(assignment.end_time);
    let is_recurring = assignment.is_recurring;
    let active       = assignment.active;
    let at_str       = encode_dt(assignment.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shift_assignments (
             assignment_id, family_id, carer_id, title, weekdays,
             start_time, end_time, is_recurring, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            family_str,
            carer_str,
            title,
            weekdays_str,
            start_str,
            end_str,
            is_recurring,
            active,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(assignment_id = %assignment.id, family_id = %assignment.family_id, "assignment created");
    Ok(assignment)
  }

  async fn get_assignment(&self, id: &AssignmentId) -> Result<Option<ShiftAssignment>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ASSIGNMENT_COLUMNS} FROM shift_assignments WHERE assignment_id = ?1"),
            rusqlite::params![id_str],
            RawAssignment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn list_assignments(&self, family_id: Uuid) -> Result<Vec<ShiftAssignment>> {
    let family_str = encode_uuid(family_id);

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSIGNMENT_COLUMNS} FROM shift_assignments
           WHERE family_id = ?1
           ORDER BY created_at, assignment_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![family_str], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn list_families(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT DISTINCT family_id FROM shift_assignments ORDER BY family_id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn set_assignment_active(
    &self,
    id:     &AssignmentId,
    active: bool,
  ) -> Result<Option<ShiftAssignment>> {
    let id_str = id.as_str().to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE shift_assignments SET active = ?2 WHERE assignment_id = ?1",
          rusqlite::params![id_str, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_assignment(id).await
  }

  async fn list_instances(
    &self,
    id:   &AssignmentId,
    from: NaiveDate,
    to:   NaiveDate,
  ) -> Result<Vec<ShiftInstance>> {
    let id_str   = id.as_str().to_owned();
    let from_str = encode_date(from)?;
    let to_str   = encode_date(to)?;

    let raws: Vec<RawInstance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT instance_id, shift_assignment_id, scheduled_date,
                  start_time, end_time, created_at
           FROM shift_instances
           WHERE shift_assignment_id = ?1
             AND scheduled_date BETWEEN ?2 AND ?3
           ORDER BY scheduled_date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, from_str, to_str], RawInstance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInstance::into_instance).collect()
  }
}

// ─── InstanceQuery impl ──────────────────────────────────────────────────────

impl InstanceQuery for SqliteStore {
  type Error = Error;

  async fn existing_dates(&self, id: &AssignmentId, window: WeekWindow) -> Result<Vec<NaiveDate>> {
    let id_str    = id.as_str().to_owned();
    let start_str = encode_date(window.start)?;
    let end_str   = encode_date(window.end)?;

    let dates: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT scheduled_date FROM shift_instances
           WHERE shift_assignment_id = ?1
             AND scheduled_date BETWEEN ?2 AND ?3
           ORDER BY scheduled_date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, start_str, end_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    dates.iter().map(|s| decode_date(s)).collect()
  }
}

// ─── InstanceGenerator impl ──────────────────────────────────────────────────

impl InstanceGenerator for SqliteStore {
  type Error = Error;

  /// Create one instance per window day matching the assignment's weekdays.
  /// Dates that already have an instance are left alone.
  async fn generate(&self, id: &AssignmentId, window: WeekWindow) -> Result<usize> {
    let assignment = self
      .get_assignment(id)
      .await?
      .ok_or_else(|| Error::AssignmentNotFound(id.clone()))?;

    if !assignment.is_materializable() {
      return Err(Error::NotEligible(id.clone()));
    }

    let dates: Vec<NaiveDate> = window.days().filter(|d| assignment.occurs_on(*d)).collect();
    let created = self.insert_instances(&assignment, dates).await?;

    tracing::debug!(
      assignment_id = %id,
      week_start = %window.start,
      created,
      "instances inserted"
    );
    Ok(created)
  }
}
