//! Core types: category catalog, Spanish titles, plan generation, template resolution

pub mod calendar;
pub mod catalog;
pub mod event;
pub mod template;
pub mod title;
pub mod tracing;

pub use calendar::{plan, EventSpec, PlanWindow};
pub use catalog::{
    build_catalog, CatalogError, CatalogKeywords, Category, WeekdayFilter,
    DEFAULT_MISA_DESCRIPTION, DEFAULT_VELA_DESCRIPTION,
};
pub use event::RemoteEvent;
pub use template::resolve_template;
pub use title::{build_title, format_spanish_date};
pub use self::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
