//! Template resolution.
//!
//! A new event inherits the operational settings (description, privacy,
//! stream binding, thumbnail) of the most recent prior event of the same
//! category, so nothing has to be re-entered by hand. The keyword substring
//! match tolerates title variability while anchoring on the stable keyword.

use crate::event::RemoteEvent;

/// Finds the template for a category: the event with the greatest
/// `scheduled_start` whose title contains `keyword` as a substring.
///
/// Ties on the maximal timestamp resolve to the last matching event in the
/// supplied order. Events without a scheduled start are never templates.
pub fn resolve_template<'a>(history: &'a [RemoteEvent], keyword: &str) -> Option<&'a RemoteEvent> {
    let mut best: Option<&RemoteEvent> = None;
    for event in history {
        if !event.title.contains(keyword) {
            continue;
        }
        let Some(start) = event.scheduled_start else {
            continue;
        };
        match best.and_then(|b| b.scheduled_start) {
            Some(current) if start < current => {}
            _ => best = Some(event),
        }
    }
    best
}
