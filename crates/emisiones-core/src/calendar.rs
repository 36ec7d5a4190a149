//! Plan generation: which events should exist over a date window.
//!
//! The generator is a lazy, finite iterator of [`EventSpec`]s, date-major
//! and in catalog order within each date. The ordering is a contract:
//! consumers create events in this sequence and the provider's quota is
//! consumed in it.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::catalog::Category;
use crate::title::build_title;

/// One event that should exist: a date/category slot with its derived
/// title and absolute start instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    /// The calendar date the event falls on.
    pub date: NaiveDate,
    /// The category the event belongs to.
    pub category: Category,
    /// The deterministic title; the idempotency key.
    pub title: String,
    /// Absolute UTC start, resolved with the date's local offset.
    pub scheduled_start: DateTime<Utc>,
}

impl EventSpec {
    fn for_slot(category: &Category, date: NaiveDate, tz: Tz) -> Self {
        Self {
            date,
            title: build_title(&category.keyword, date),
            scheduled_start: resolve_local(date, category.time_of_day, tz),
            category: category.clone(),
        }
    }
}

/// The inclusive date window one reconciliation pass plans over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanWindow {
    /// Creates a window; `start > end` is a valid, empty window.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if the window contains no dates.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Iterates the dates of the window in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Resolves a wall-clock time on a date to its UTC instant using that
/// date's offset in `tz`. Ambiguous local times (autumn fold) take the
/// earlier offset; nonexistent local times (spring gap) are pushed forward
/// one hour.
pub fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
        chrono::LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        chrono::LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
        }
    }
}

/// Widest window the year-less title scheme keeps collision-free: the same
/// weekday/day/month combination recurs five years apart at the earliest.
const MAX_WINDOW_DAYS: usize = 4 * 365;

/// Lazily yields every [`EventSpec`] that should exist in `window`:
/// for each date, each category whose weekday filter accepts it, in
/// catalog order. Empty windows yield nothing.
///
/// # Panics
///
/// In debug builds, panics when the window is wide enough for titles of
/// distinct dates to collide.
pub fn plan(
    window: PlanWindow,
    catalog: &[Category],
    tz: Tz,
) -> impl Iterator<Item = EventSpec> + '_ {
    debug_assert!(
        window.days().count() <= MAX_WINDOW_DAYS,
        "window of {} days exceeds the unique-title span of {} days",
        window.days().count(),
        MAX_WINDOW_DAYS
    );
    window.days().flat_map(move |date| {
        catalog
            .iter()
            .filter(move |category| category.applies_on(date))
            .map(move |category| EventSpec::for_slot(category, date, tz))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_catalog, CatalogKeywords};
    use chrono::{Datelike, Weekday};
    use chrono_tz::Europe::Madrid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn default_catalog() -> Vec<Category> {
        build_catalog(&CatalogKeywords::default()).unwrap()
    }

    #[test]
    fn single_wednesday_yields_three_masses() {
        // Window of exactly one day: Wednesday 2025-04-02.
        let window = PlanWindow::new(date(2025, 4, 2), date(2025, 4, 2));
        let specs: Vec<EventSpec> = plan(window, &default_catalog(), Madrid).collect();

        let titles: Vec<&str> = specs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Misa 10h - Miércoles 02 de Abril",
                "Misa 12h - Miércoles 02 de Abril",
                "Misa 20h - Miércoles 02 de Abril",
            ]
        );
        assert!(titles.iter().all(|t| !t.starts_with("Vela 21h")));
    }

    #[test]
    fn vigil_appears_only_on_thursdays() {
        // Four full weeks.
        let window = PlanWindow::new(date(2025, 4, 7), date(2025, 5, 4));
        let catalog = default_catalog();
        for spec in plan(window, &catalog, Madrid) {
            if spec.title.starts_with("Vela 21h") {
                assert_eq!(spec.date.weekday(), Weekday::Thu);
            }
        }
        let vigils = plan(window, &catalog, Madrid)
            .filter(|s| s.title.starts_with("Vela 21h"))
            .count();
        assert_eq!(vigils, 4);
    }

    #[test]
    fn ordering_is_date_major_then_catalog_order() {
        let window = PlanWindow::new(date(2025, 4, 2), date(2025, 4, 3));
        let specs: Vec<EventSpec> = plan(window, &default_catalog(), Madrid).collect();
        let titles: Vec<&str> = specs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Misa 10h - Miércoles 02 de Abril",
                "Misa 12h - Miércoles 02 de Abril",
                "Misa 20h - Miércoles 02 de Abril",
                "Misa 10h - Jueves 03 de Abril",
                "Misa 12h - Jueves 03 de Abril",
                "Misa 20h - Jueves 03 de Abril",
                "Vela 21h - Jueves 03 de Abril",
            ]
        );
    }

    #[test]
    #[should_panic(expected = "unique-title span")]
    fn window_wider_than_the_title_span_is_rejected() {
        // Six years: "Miércoles 02 de Abril" falls in both 2025 and 2031.
        let window = PlanWindow::new(date(2025, 4, 2), date(2031, 4, 2));
        let _ = plan(window, &default_catalog(), Madrid);
    }

    #[test]
    fn inverted_window_is_empty() {
        let window = PlanWindow::new(date(2025, 4, 10), date(2025, 4, 2));
        assert!(window.is_empty());
        assert_eq!(plan(window, &default_catalog(), Madrid).count(), 0);
    }

    #[test]
    fn dst_transition_uses_per_date_offset() {
        // Madrid switches to CEST on 2025-03-30: 10:00 local is 09:00 UTC
        // before the change and 08:00 UTC after it.
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let before = resolve_local(date(2025, 3, 29), ten, Madrid);
        let after = resolve_local(date(2025, 3, 31), ten, Madrid);
        assert_eq!(before.format("%H:%M").to_string(), "09:00");
        assert_eq!(after.format("%H:%M").to_string(), "08:00");
    }

    #[test]
    fn nonexistent_local_time_is_pushed_forward() {
        // 02:30 does not exist on 2025-03-30 in Madrid; it resolves to the
        // instant an hour later (03:30 CEST = 01:30 UTC).
        let gap = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let resolved = resolve_local(date(2025, 3, 30), gap, Madrid);
        assert_eq!(resolved.format("%H:%M").to_string(), "01:30");
    }

    #[test]
    fn ambiguous_local_time_takes_earlier_offset() {
        // 02:30 occurs twice on 2025-10-26 in Madrid; the earlier (CEST)
        // instant is 00:30 UTC.
        let fold = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let resolved = resolve_local(date(2025, 10, 26), fold, Madrid);
        assert_eq!(resolved.format("%H:%M").to_string(), "00:30");
    }

    #[test]
    fn spec_start_combines_date_and_category_time() {
        let window = PlanWindow::new(date(2025, 4, 3), date(2025, 4, 3));
        let specs: Vec<EventSpec> = plan(window, &default_catalog(), Madrid).collect();
        // April is CEST (UTC+2): 21:00 local is 19:00 UTC.
        let vigil = specs.last().unwrap();
        assert_eq!(vigil.scheduled_start.format("%H:%M").to_string(), "19:00");
        assert_eq!(vigil.date, date(2025, 4, 3));
    }
}
