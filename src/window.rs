use anyhow::{Result, bail};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

// Time bucketing for the report. Everything is anchored to one reporting zone.

pub const ROLLING_DAYS: i64 = 7;

/// Default reporting zone when neither config nor CLI names one.
pub const DEFAULT_TZ: Tz = chrono_tz::Asia::Tokyo;

/// Parse an IANA zone name; "utc" is accepted in any case.
pub fn parse_tz(name: &str) -> Result<Tz> {
  let name = name.trim();
  if name.eq_ignore_ascii_case("utc") {
    return Ok(Tz::UTC);
  }
  match name.parse::<Tz>() {
    Ok(tz) => Ok(tz),
    Err(_) => bail!("unknown time zone {:?} (expected an IANA name such as Asia/Tokyo)", name),
  }
}

/// Half-open `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl Span {
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.start <= at && at < self.end
  }
}

/// The two back-to-back windows compared by the rolling report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindows {
  pub current: Span,
  pub previous: Span,
}

impl RollingWindows {
  /// `current = [day-7d, day)`, `previous = [day-14d, day-7d)` where `day` is
  /// the start of `now`'s calendar day in `tz`.
  pub fn ending_at(now: DateTime<Utc>, tz: Tz) -> Self {
    let day = start_of_day(now, tz);
    let width = Duration::days(ROLLING_DAYS);
    Self {
      current: Span { start: day - width, end: day },
      previous: Span {
        start: day - width - width,
        end: day - width,
      },
    }
  }

  pub fn label(&self) -> String {
    format!("{}d", ROLLING_DAYS)
  }
}

/// Midnight of `now`'s local date in `tz`, as a UTC instant.
pub fn start_of_day(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
  let date = now.with_timezone(&tz).date_naive();
  let midnight = date.and_time(chrono::NaiveTime::MIN);

  // A DST gap can swallow midnight; the first valid local time that day is the next best anchor.
  tz.from_local_datetime(&midnight)
    .earliest()
    .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or(now)
}

pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
  at.with_timezone(&tz).date_naive()
}

/// ISO week label such as `2025-W33`.
pub fn iso_week_label(date: NaiveDate) -> String {
  let iso = date.iso_week();
  format!("{}-W{:02}", iso.year(), iso.week())
}

/// Parse a `--now-override` string. Accepts RFC 3339 or a naive
/// `%Y-%m-%dT%H:%M:%S` timestamp interpreted in `tz`.
pub fn parse_now_override(s: Option<&str>, tz: Tz) -> Option<DateTime<Utc>> {
  s.and_then(|raw| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
      .or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| tz.from_local_datetime(&ndt).earliest())
          .map(|dt| dt.with_timezone(&Utc))
      })
  })
}

/// Returns the effective "now" given an optional override.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}
