//! The target week window for materialization.
//!
//! The window is derived from "today" on every pass and never stored.

use std::fmt;

use chrono::{Datelike as _, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// The day on which a week begins. Fixed per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
  /// ISO 8601 convention.
  #[default]
  Monday,
  Sunday,
}

impl WeekStart {
  /// Number of days between the start of the week and `date`.
  fn offset_of(self, date: NaiveDate) -> u64 {
    let weekday = date.weekday();
    let days = match self {
      WeekStart::Monday => weekday.num_days_from_monday(),
      WeekStart::Sunday => weekday.num_days_from_sunday(),
    };
    u64::from(days)
  }
}

impl fmt::Display for WeekStart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      WeekStart::Monday => "monday",
      WeekStart::Sunday => "sunday",
    })
  }
}

/// An inclusive seven-day date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl WeekWindow {
  /// The week containing `date`, or `None` when its first day falls before
  /// the start of the calendar.
  pub fn containing(date: NaiveDate, week_start: WeekStart) -> Option<Self> {
    let start = date.checked_sub_days(Days::new(week_start.offset_of(date)))?;
    Self::starting(start)
  }

  /// The week after the one containing `today`, or `None` when that week
  /// runs past the end of the calendar.
  pub fn upcoming(today: NaiveDate, week_start: WeekStart) -> Option<Self> {
    let current = Self::containing(today, week_start)?;
    Self::starting(current.start.checked_add_days(Days::new(7))?)
  }

  fn starting(start: NaiveDate) -> Option<Self> {
    let end = start.checked_add_days(Days::new(6))?;
    Some(Self { start, end })
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  /// Every date in the window, in order.
  pub fn days(self) -> impl Iterator<Item = NaiveDate> {
    (0..7)
      .map_while(move |n| self.start.checked_add_days(Days::new(n)))
      .take_while(move |d| *d <= self.end)
  }
}
