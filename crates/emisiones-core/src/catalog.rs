//! The fixed category catalog.
//!
//! Categories are tagged data, not a type hierarchy: adding one is a data
//! change. The catalog order is a contract — consumers create events in this
//! order within each date, and the provider's quota is consumed in it.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use thiserror::Error;

/// Default description for the daily mass categories.
pub const DEFAULT_MISA_DESCRIPTION: &str = "Si quieres hacer un donativo a la Parroquia:\n\
https://smcana.es/donativos/\n\
Donativo Bizum ONG: 00104 o 38194 o 38341";

/// Default description for the Thursday vigil category.
pub const DEFAULT_VELA_DESCRIPTION: &str = "También puedes oírlas después en Spotify:\n\
https://open.spotify.com/show/1XitO8Ckw0kDvDTT9CuVp2";

/// Errors raised while building the category catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A category keyword was empty or whitespace-only.
    #[error("category keyword must not be empty")]
    EmptyKeyword,
}

/// Which weekdays a category generates events on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayFilter {
    /// Every day of the week.
    EveryDay,
    /// Only the given weekday.
    Only(Weekday),
}

impl WeekdayFilter {
    /// Returns true if the filter accepts the given weekday.
    pub fn accepts(&self, weekday: Weekday) -> bool {
        match self {
            Self::EveryDay => true,
            Self::Only(day) => *day == weekday,
        }
    }
}

/// A recurring kind of broadcast: a keyword, a fixed local time of day,
/// a weekday filter and a fallback description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Unique keyword anchoring titles and template lookup.
    pub keyword: String,
    /// Wall-clock start time, local to the configured timezone.
    pub time_of_day: NaiveTime,
    /// Which weekdays this category applies on.
    pub weekday_filter: WeekdayFilter,
    /// Description used when no template supplies one.
    pub default_description: String,
}

impl Category {
    /// Creates a category, rejecting blank keywords.
    pub fn new(
        keyword: impl Into<String>,
        time_of_day: NaiveTime,
        weekday_filter: WeekdayFilter,
        default_description: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(CatalogError::EmptyKeyword);
        }
        Ok(Self {
            keyword,
            time_of_day,
            weekday_filter,
            default_description: default_description.into(),
        })
    }

    /// Returns true if this category generates an event on the given date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.weekday_filter.accepts(date.weekday())
    }
}

/// The keyword for each category of the fixed set, each independently
/// overridable from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogKeywords {
    pub misa_10: String,
    pub misa_12: String,
    pub misa_20: String,
    pub vela_21: String,
}

impl Default for CatalogKeywords {
    fn default() -> Self {
        Self {
            misa_10: "Misa 10h".to_string(),
            misa_12: "Misa 12h".to_string(),
            misa_20: "Misa 20h".to_string(),
            vela_21: "Vela 21h".to_string(),
        }
    }
}

/// Builds the ordered catalog: the three daily masses, then the
/// Thursday-only vigil.
pub fn build_catalog(keywords: &CatalogKeywords) -> Result<Vec<Category>, CatalogError> {
    let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid time");
    Ok(vec![
        Category::new(
            &keywords.misa_10,
            time(10, 0),
            WeekdayFilter::EveryDay,
            DEFAULT_MISA_DESCRIPTION,
        )?,
        Category::new(
            &keywords.misa_12,
            time(12, 0),
            WeekdayFilter::EveryDay,
            DEFAULT_MISA_DESCRIPTION,
        )?,
        Category::new(
            &keywords.misa_20,
            time(20, 0),
            WeekdayFilter::EveryDay,
            DEFAULT_MISA_DESCRIPTION,
        )?,
        Category::new(
            &keywords.vela_21,
            time(21, 0),
            WeekdayFilter::Only(Weekday::Thu),
            DEFAULT_VELA_DESCRIPTION,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_order_and_times() {
        let catalog = build_catalog(&CatalogKeywords::default()).unwrap();
        let keywords: Vec<&str> = catalog.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, ["Misa 10h", "Misa 12h", "Misa 20h", "Vela 21h"]);

        let hours: Vec<String> = catalog
            .iter()
            .map(|c| c.time_of_day.format("%H:%M").to_string())
            .collect();
        assert_eq!(hours, ["10:00", "12:00", "20:00", "21:00"]);
    }

    #[test]
    fn vigil_is_thursday_only() {
        let catalog = build_catalog(&CatalogKeywords::default()).unwrap();
        let vigil = catalog.last().unwrap();
        assert_eq!(vigil.weekday_filter, WeekdayFilter::Only(Weekday::Thu));

        // 2025-04-03 is a Thursday, 2025-04-04 a Friday.
        assert!(vigil.applies_on(NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()));
        assert!(!vigil.applies_on(NaiveDate::from_ymd_opt(2025, 4, 4).unwrap()));
    }

    #[test]
    fn daily_categories_apply_every_day() {
        let catalog = build_catalog(&CatalogKeywords::default()).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 4, 6).unwrap();
        for category in &catalog[..3] {
            assert!(category.applies_on(sunday));
        }
    }

    #[test]
    fn keywords_are_overridable() {
        let keywords = CatalogKeywords {
            misa_10: "Morning service".to_string(),
            ..CatalogKeywords::default()
        };
        let catalog = build_catalog(&keywords).unwrap();
        assert_eq!(catalog[0].keyword, "Morning service");
        assert_eq!(catalog[1].keyword, "Misa 12h");
    }

    #[test]
    fn blank_keyword_is_rejected() {
        let keywords = CatalogKeywords {
            vela_21: "   ".to_string(),
            ..CatalogKeywords::default()
        };
        assert!(matches!(
            build_catalog(&keywords),
            Err(CatalogError::EmptyKeyword)
        ));
    }
}
