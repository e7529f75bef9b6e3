//! Marketing events and analytics for seminar-pulse.
//!
//! This crate provides the typed marketing event record with its boundary
//! validation, listing order, and the metric roll-ups shown on the
//! dashboard (ROI, conversion and attendance rates, income breakdowns).

pub mod analytics;
pub mod error;
pub mod event;
pub mod sort;

pub use analytics::{
    EventHighlight, EventMetrics, EventWithMetrics, PortfolioSummary, RevenueSlice,
    gauge_percent, percentage,
};
pub use error::ValidationError;
pub use event::{EVENTS_COLLECTION, EventInput, MarketingEvent};
pub use sort::{EventSortField, SortOrder, sort_events};
