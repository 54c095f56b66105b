//! Custom-range export link builder
//!
//! The dashboard export is limited to a short window; the same endpoint
//! accepts arbitrary millisecond bounds, so a link for any range of whole
//! days can be built offline.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::types::{Result, TokdashError};

pub const EXPORT_ENDPOINT: &str = "https://cursor.com/api/dashboard/export-usage-events-csv";

/// Build the export URL covering `start` 00:00:00.000 through
/// `end` 23:59:59.999 in `tz`.
pub fn export_url<Tz: TimeZone>(start: NaiveDate, end: NaiveDate, tz: &Tz) -> Result<String> {
    if start > end {
        return Err(TokdashError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }

    let start_ms = resolve(tz, start, NaiveTime::MIN)?.timestamp_millis();
    let end_time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| TokdashError::Parse("end-of-day time".into()))?;
    let end_ms = resolve(tz, end, end_time)?.timestamp_millis();

    Ok(format!(
        "{}?startDate={}&endDate={}&strategy=tokens",
        EXPORT_ENDPOINT, start_ms, end_ms
    ))
}

/// Longest wall-clock gap searched when a local time is skipped
const MAX_GAP_MINUTES: i64 = 26 * 60;

/// Local wall-clock time to an instant.
///
/// The earlier reading wins on DST overlap; a time inside a DST gap rolls
/// forward to the first wall-clock minute that exists.
fn resolve<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>> {
    first_valid_from(date.and_time(time), |local| tz.from_local_datetime(local))
}

fn first_valid_from<T, F>(local: NaiveDateTime, lookup: F) -> Result<T>
where
    F: Fn(&NaiveDateTime) -> LocalResult<T>,
{
    for minute in 0..=MAX_GAP_MINUTES {
        let resolved = match lookup(&(local + Duration::minutes(minute))) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earlier, _) => earlier,
            LocalResult::None => continue,
        };
        if minute > 0 {
            tracing::debug!(%local, minutes = minute, "local time in DST gap, rolled forward");
        }
        return Ok(resolved);
    }
    Err(TokdashError::InvalidRange(format!(
        "{} does not exist in this timezone",
        local
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_export_url_utc() {
        let url = export_url(ymd(2024, 1, 1), ymd(2024, 1, 31), &Utc).unwrap();
        assert_eq!(
            url,
            "https://cursor.com/api/dashboard/export-usage-events-csv?startDate=1704067200000&endDate=1706745599999&strategy=tokens"
        );
    }

    #[test]
    fn test_export_url_single_day() {
        let url = export_url(ymd(2024, 1, 1), ymd(2024, 1, 1), &Utc).unwrap();
        assert!(url.contains("startDate=1704067200000"));
        assert!(url.contains("endDate=1704153599999"));
    }

    #[test]
    fn test_export_url_offset_shifts_bounds() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let url = export_url(ymd(2024, 1, 1), ymd(2024, 1, 1), &tz).unwrap();
        // Midnight at +02:00 is 22:00 UTC the previous day
        assert!(url.contains("startDate=1704060000000"));
    }

    #[test]
    fn test_dst_gap_rolls_forward_to_first_valid_time() {
        // Midnight to 01:00 skipped, as on a spring-forward day
        let gap = |local: &NaiveDateTime| {
            if local.hour() < 1 {
                LocalResult::None
            } else {
                LocalResult::Single(Utc.from_utc_datetime(local))
            }
        };
        let midnight = ymd(2024, 3, 10).and_time(NaiveTime::MIN);

        let resolved = first_valid_from(midnight, gap).unwrap();
        assert_eq!(resolved, Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_overlap_takes_earlier_reading() {
        let earlier = Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap();
        let local = ymd(2024, 11, 3).and_hms_opt(1, 30, 0).unwrap();

        let resolved =
            first_valid_from(local, |_| LocalResult::Ambiguous(earlier, later)).unwrap();
        assert_eq!(resolved, earlier);
    }

    #[test]
    fn test_unresolvable_local_time_is_invalid_range() {
        let local = ymd(2024, 3, 10).and_time(NaiveTime::MIN);
        let err = first_valid_from(local, |_| LocalResult::<DateTime<Utc>>::None).unwrap_err();
        assert!(matches!(err, TokdashError::InvalidRange(_)));
    }

    #[test]
    fn test_export_url_start_after_end() {
        let err = export_url(ymd(2024, 2, 1), ymd(2024, 1, 1), &Utc).unwrap_err();
        assert!(matches!(err, TokdashError::InvalidRange(_)));
    }
}
