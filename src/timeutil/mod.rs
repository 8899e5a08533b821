//! Calendar-aware time utilities
//!
//! [`TimeHelper`] computes the boundaries of the calendar bucket containing
//! an instant, in a caller-specified time zone, using calendar (not
//! fixed-duration) arithmetic: "1 month" buckets vary in wall-clock length.
//! This asymmetry from fixed-duration bins is intentional and load-bearing
//! for historical data whose bin size was chosen in calendar units.
//!
//! [`TemporalAmount`] models bucket sizes: either a fixed [`Duration`] or a
//! calendar [`Period`] (days / months / years). Fixed durations are
//! interpreted through the largest recognised calendar unit when locating
//! bucket starts, so a 7-day duration aligns to the configured start of the
//! week rather than to an arbitrary 168-hour boundary.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike, Utc, Weekday,
};

/// A calendar period. Components are non-negative; "1 week" is 7 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Period {
    pub fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn weeks(weeks: u32) -> Self {
        Self::days(weeks * 7)
    }

    pub fn months(months: u32) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    pub fn years(years: u32) -> Self {
        Self {
            years,
            ..Self::default()
        }
    }

    fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }
}

/// A bucket size: fixed wall-clock duration or calendar period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemporalAmount {
    Duration(Duration),
    Period(Period),
}

impl TemporalAmount {
    pub fn hours(hours: i64) -> Self {
        TemporalAmount::Duration(Duration::hours(hours))
    }

    pub fn days(days: u32) -> Self {
        TemporalAmount::Period(Period::days(days))
    }

    pub fn weeks(weeks: u32) -> Self {
        TemporalAmount::Period(Period::weeks(weeks))
    }

    pub fn months(months: u32) -> Self {
        TemporalAmount::Period(Period::months(months))
    }

    pub fn years(years: u32) -> Self {
        TemporalAmount::Period(Period::years(years))
    }

    /// Add this amount to an instant using calendar arithmetic.
    pub fn add_to<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            TemporalAmount::Duration(d) => dt.clone() + *d,
            TemporalAmount::Period(p) => {
                let with_months = dt
                    .clone()
                    .checked_add_months(Months::new(p.total_months()))
                    .unwrap_or_else(|| dt.clone());
                with_months
                    .clone()
                    .checked_add_days(Days::new(p.days as u64))
                    .unwrap_or(with_months)
            }
        }
    }

    /// Subtract this amount from an instant using calendar arithmetic.
    pub fn subtract_from<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            TemporalAmount::Duration(d) => dt.clone() - *d,
            TemporalAmount::Period(p) => {
                let with_months = dt
                    .clone()
                    .checked_sub_months(Months::new(p.total_months()))
                    .unwrap_or_else(|| dt.clone());
                with_months
                    .clone()
                    .checked_sub_days(Days::new(p.days as u64))
                    .unwrap_or(with_months)
            }
        }
    }
}

/// User preferences that shift where calendar buckets begin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationPreferences {
    /// Which day a week-sized bucket starts on.
    pub first_day_of_week: Weekday,
    /// Offset from midnight at which a day-sized bucket starts, e.g. 4h for
    /// people who track past midnight.
    pub start_time_of_day: Duration,
}

impl Default for AggregationPreferences {
    fn default() -> Self {
        Self {
            first_day_of_week: Weekday::Mon,
            start_time_of_day: Duration::zero(),
        }
    }
}

/// Computes calendar bucket boundaries for a time amount.
#[derive(Debug, Clone, Default)]
pub struct TimeHelper {
    prefs: AggregationPreferences,
}

impl TimeHelper {
    pub fn new(prefs: AggregationPreferences) -> Self {
        Self { prefs }
    }

    /// Find the beginning of the bucket of size `amount` containing
    /// `instant`, in the given time zone.
    ///
    /// For example if the amount is one week and the preferences say weeks
    /// start on Monday, this returns the Monday 00:00 (plus the configured
    /// start-of-day offset) at or before the instant, in `tz`.
    ///
    /// Duration amounts are approximated by the largest recognised unit:
    /// up to one hour aligns to the hour, up to 24 hours to the start of
    /// the day, anything larger to the start of the week.
    ///
    /// An instant exactly on a bucket boundary starts its own bucket: the
    /// returned lower bound equals the instant.
    pub fn find_beginning_of_temporal<Tz: TimeZone>(
        &self,
        instant: DateTime<Utc>,
        amount: &TemporalAmount,
        tz: &Tz,
    ) -> DateTime<Tz> {
        let local = instant.with_timezone(tz);
        match amount {
            TemporalAmount::Duration(d) => self.find_beginning_of_duration(local, *d),
            TemporalAmount::Period(p) => self.find_beginning_of_period(local, *p),
        }
    }

    /// The inclusive lower and exclusive upper bound of the bucket of size
    /// `amount` containing `instant`, in the given time zone:
    /// `[lower, lower + amount)` in calendar arithmetic.
    pub fn bucket_bounds<Tz: TimeZone>(
        &self,
        instant: DateTime<Utc>,
        amount: &TemporalAmount,
        tz: &Tz,
    ) -> (DateTime<Tz>, DateTime<Tz>) {
        let lower = self.find_beginning_of_temporal(instant, amount, tz);
        let upper = amount.add_to(&lower);
        (lower, upper)
    }

    fn find_beginning_of_duration<Tz: TimeZone>(
        &self,
        local: DateTime<Tz>,
        duration: Duration,
    ) -> DateTime<Tz> {
        let naive = local.naive_local();
        let hour_start =
            naive.date().and_time(NaiveTime::MIN) + Duration::hours(naive.hour() as i64);

        if duration <= Duration::minutes(60) {
            return resolve_local(&local.timezone(), hour_start);
        }

        let day_start = naive.date().and_time(NaiveTime::MIN) + self.prefs.start_time_of_day;
        let start = if duration <= Duration::days(1) {
            day_start
        } else {
            previous_or_same_weekday(day_start, self.prefs.first_day_of_week)
        };

        let resolved = resolve_local(&local.timezone(), start);
        if resolved > local {
            resolved - duration
        } else {
            resolved
        }
    }

    fn find_beginning_of_period<Tz: TimeZone>(
        &self,
        local: DateTime<Tz>,
        period: Period,
    ) -> DateTime<Tz> {
        let date = local.naive_local().date();
        let day_start = date.and_time(NaiveTime::MIN) + self.prefs.start_time_of_day;

        let start = if period_at_most(&period, 0, 0, 1) {
            day_start
        } else if period_at_most(&period, 0, 0, 7) {
            previous_or_same_weekday(day_start, self.prefs.first_day_of_week)
        } else if period_at_most(&period, 0, 1, 0) {
            with_month_day(day_start, date.month(), 1)
        } else if period_at_most(&period, 0, 3, 0) {
            with_month_day(day_start, quarter_start_month(date.month()), 1)
        } else if period_at_most(&period, 0, 6, 0) {
            with_month_day(day_start, bi_year_start_month(date.month()), 1)
        } else {
            with_month_day(day_start, 1, 1)
        };

        let resolved = resolve_local(&local.timezone(), start);
        if resolved > local {
            TemporalAmount::Period(period).subtract_from(&resolved)
        } else {
            resolved
        }
    }
}

/// Componentwise `period <= (years, months, days)` the way calendar
/// periods compare: larger units dominate.
fn period_at_most(period: &Period, years: i64, months: i64, days: i64) -> bool {
    let dy = period.years as i64 - years;
    let dm = period.months as i64 - months;
    let dd = period.days as i64 - days;
    dy < 0 || (dy == 0 && dm < 0) || (dy == 0 && dm == 0 && dd <= 0)
}

/// The month (1-12) starting the quarter containing the given month.
pub fn quarter_start_month(month: u32) -> u32 {
    3 * ((month - 1) / 3) + 1
}

/// The month (1-12) starting the half-year containing the given month.
pub fn bi_year_start_month(month: u32) -> u32 {
    if month < 7 {
        1
    } else {
        7
    }
}

fn previous_or_same_weekday(dt: NaiveDateTime, target: Weekday) -> NaiveDateTime {
    let back = (dt.weekday().num_days_from_monday() as i64
        - target.num_days_from_monday() as i64)
        .rem_euclid(7);
    dt - Duration::days(back)
}

fn with_month_day(dt: NaiveDateTime, month: u32, day: u32) -> NaiveDateTime {
    match NaiveDate::from_ymd_opt(dt.year(), month, day) {
        Some(date) => date.and_time(dt.time()),
        None => dt,
    }
}

/// Map a naive local time back into the zone. Ambiguous times (DST
/// fall-back) take the earlier offset; nonexistent times (DST spring
/// forward) move with the clock.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => tz.from_utc_datetime(&naive),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_beginning_of_day() {
        let helper = TimeHelper::default();
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::days(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 15, 0, 0, 0));
    }

    #[test]
    fn test_beginning_of_week_monday_start() {
        let helper = TimeHelper::default();
        // 2024-05-15 is a Wednesday; the week starts Monday 2024-05-13.
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::weeks(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 13, 0, 0, 0));
    }

    #[test]
    fn test_beginning_of_week_sunday_start() {
        let helper = TimeHelper::new(AggregationPreferences {
            first_day_of_week: Weekday::Sun,
            start_time_of_day: Duration::zero(),
        });
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::weeks(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 12, 0, 0, 0));
    }

    #[test]
    fn test_beginning_of_month_quarter_year() {
        let helper = TimeHelper::default();
        let instant = utc(2024, 5, 15, 13, 45, 12);

        assert_eq!(
            helper.find_beginning_of_temporal(instant, &TemporalAmount::months(1), &Utc),
            utc(2024, 5, 1, 0, 0, 0)
        );
        assert_eq!(
            helper.find_beginning_of_temporal(instant, &TemporalAmount::months(3), &Utc),
            utc(2024, 4, 1, 0, 0, 0)
        );
        assert_eq!(
            helper.find_beginning_of_temporal(instant, &TemporalAmount::months(6), &Utc),
            utc(2024, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            helper.find_beginning_of_temporal(instant, &TemporalAmount::years(1), &Utc),
            utc(2024, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_beginning_of_hour_duration() {
        let helper = TimeHelper::default();
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::hours(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 15, 13, 0, 0));
    }

    #[test]
    fn test_week_duration_aligns_to_week() {
        let helper = TimeHelper::default();
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::Duration(Duration::days(7)),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 13, 0, 0, 0));
    }

    #[test]
    fn test_instant_on_boundary_starts_its_own_bucket() {
        let helper = TimeHelper::default();
        let boundary = utc(2024, 5, 15, 0, 0, 0);
        let start =
            helper.find_beginning_of_temporal(boundary, &TemporalAmount::days(1), &Utc);
        assert_eq!(start, boundary);
    }

    #[test]
    fn test_start_time_of_day_shifts_bucket() {
        let helper = TimeHelper::new(AggregationPreferences {
            first_day_of_week: Weekday::Mon,
            start_time_of_day: Duration::hours(4),
        });
        // 02:00 is before the 04:00 day start, so it belongs to the
        // previous day's bucket.
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 2, 0, 0),
            &TemporalAmount::days(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 14, 4, 0, 0));

        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 5, 0, 0),
            &TemporalAmount::days(1),
            &Utc,
        );
        assert_eq!(start, utc(2024, 5, 15, 4, 0, 0));
    }

    #[test]
    fn test_bucket_bounds_day() {
        let helper = TimeHelper::default();
        let (lower, upper) = helper.bucket_bounds(
            utc(2024, 5, 15, 13, 45, 12),
            &TemporalAmount::days(1),
            &Utc,
        );
        assert_eq!(lower, utc(2024, 5, 15, 0, 0, 0));
        assert_eq!(upper, utc(2024, 5, 16, 0, 0, 0));
    }

    #[test]
    fn test_month_buckets_vary_in_length() {
        let helper = TimeHelper::default();
        let (jan_lo, jan_hi) = helper.bucket_bounds(
            utc(2023, 1, 20, 12, 0, 0),
            &TemporalAmount::months(1),
            &Utc,
        );
        let (feb_lo, feb_hi) = helper.bucket_bounds(
            utc(2023, 2, 20, 12, 0, 0),
            &TemporalAmount::months(1),
            &Utc,
        );
        assert_eq!(jan_hi - jan_lo, Duration::days(31));
        assert_eq!(feb_hi - feb_lo, Duration::days(28));
    }

    #[test]
    fn test_bucketing_respects_time_zone() {
        let helper = TimeHelper::default();
        // 23:30 UTC is already the next day at UTC+2.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = helper.find_beginning_of_temporal(
            utc(2024, 5, 15, 23, 30, 0),
            &TemporalAmount::days(1),
            &tz,
        );
        assert_eq!(start.with_timezone(&Utc), utc(2024, 5, 15, 22, 0, 0));
    }

    #[test]
    fn test_quarter_and_bi_year_month_helpers() {
        assert_eq!(quarter_start_month(1), 1);
        assert_eq!(quarter_start_month(3), 1);
        assert_eq!(quarter_start_month(4), 4);
        assert_eq!(quarter_start_month(12), 10);
        assert_eq!(bi_year_start_month(6), 1);
        assert_eq!(bi_year_start_month(7), 7);
    }

    #[test]
    fn test_calendar_add_subtract_roundtrip() {
        let amount = TemporalAmount::months(1);
        let dt = utc(2024, 3, 31, 0, 0, 0);
        // Calendar arithmetic clamps to month ends rather than
        // overflowing.
        let plus = amount.add_to(&dt);
        assert_eq!(plus, utc(2024, 4, 30, 0, 0, 0));
        let minus = amount.subtract_from(&dt);
        assert_eq!(minus, utc(2024, 2, 29, 0, 0, 0));
    }
}
