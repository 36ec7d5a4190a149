//! Deterministic Spanish titles for scheduled broadcasts.
//!
//! Weekday and month names are fixed data tables rather than locale output,
//! so a given date always produces the same title string. Title equality is
//! the idempotency key for the whole system: one date/category pair maps to
//! exactly one title, and distinct pairs never collide.
//!
//! Titles carry no year. The same weekday/day/month combination recurs only
//! at multi-year intervals (five years at the earliest), so non-collision
//! across distinct dates holds only for plan windows narrower than that;
//! [`crate::calendar::plan`] asserts the bound.

use chrono::{Datelike, NaiveDate};

/// Spanish weekday names, indexed by `Weekday::num_days_from_monday`.
pub const WEEKDAYS_ES: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

/// Spanish month names, indexed by month number minus one.
pub const MONTHS_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Formats the date part of a title, e.g. `02 de Abril`.
pub fn format_spanish_date(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{:02} de {}", date.day(), month)
}

/// Builds the canonical title for a category keyword on a date,
/// e.g. `Misa 10h - Miércoles 02 de Abril`.
pub fn build_title(keyword: &str, date: NaiveDate) -> String {
    let weekday = WEEKDAYS_ES[date.weekday().num_days_from_monday() as usize];
    format!("{} - {} {}", keyword, weekday, format_spanish_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_reference_title() {
        // 2025-04-02 is a Wednesday.
        assert_eq!(
            build_title("Misa 10h", date(2025, 4, 2)),
            "Misa 10h - Miércoles 02 de Abril"
        );
    }

    #[test]
    fn pads_single_digit_days() {
        assert_eq!(
            build_title("Vela 21h", date(2025, 4, 3)),
            "Vela 21h - Jueves 03 de Abril"
        );
    }

    #[test]
    fn covers_year_boundaries() {
        // 2025-12-31 is a Wednesday, 2026-01-01 a Thursday.
        assert_eq!(
            build_title("Misa 20h", date(2025, 12, 31)),
            "Misa 20h - Miércoles 31 de Diciembre"
        );
        assert_eq!(
            build_title("Misa 20h", date(2026, 1, 1)),
            "Misa 20h - Jueves 01 de Enero"
        );
    }

    #[test]
    fn distinct_dates_never_collide() {
        let a = build_title("Misa 12h", date(2025, 4, 2));
        let b = build_title("Misa 12h", date(2025, 4, 9));
        assert_ne!(a, b);
    }

    #[test]
    fn weekday_table_alignment() {
        // 2025-04-07 is a Monday; walk the whole week.
        for (offset, expected) in WEEKDAYS_ES.iter().enumerate() {
            let d = date(2025, 4, 7 + offset as u32);
            assert!(build_title("X", d).contains(expected));
        }
    }
}
