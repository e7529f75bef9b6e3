//! Ordering of event listings by a caller-chosen field.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::analytics::EventMetrics;
use crate::error::ValidationError;
use crate::event::MarketingEvent;

/// Field a listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventSortField {
    #[default]
    EventDate,
    Name,
    MarketingCost,
    Revenue,
    Attendees,
    Conversions,
    Roi,
    ConversionRate,
}

impl FromStr for EventSortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eventDate" | "date" => Ok(Self::EventDate),
            "name" => Ok(Self::Name),
            "marketingCost" | "cost" => Ok(Self::MarketingCost),
            "revenue" => Ok(Self::Revenue),
            "attendees" => Ok(Self::Attendees),
            "conversions" => Ok(Self::Conversions),
            "roi" => Ok(Self::Roi),
            "conversionRate" => Ok(Self::ConversionRate),
            other => Err(ValidationError::InvalidField {
                field: "sortBy",
                reason: format!("unknown sort field '{other}'"),
            }),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ValidationError::InvalidField {
                field: "order",
                reason: format!("expected 'asc' or 'desc', got '{other}'"),
            }),
        }
    }
}

// Events without a value for the key (e.g. ROI of a free event) sort last
// in either direction.
fn compare_optional(a: Option<f64>, b: Option<f64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.total_cmp(&b),
            SortOrder::Desc => b.total_cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn key(event: &MarketingEvent, field: EventSortField) -> Option<f64> {
    match field {
        EventSortField::MarketingCost => Some(event.marketing_cost),
        EventSortField::Revenue => Some(event.revenue),
        EventSortField::Attendees => Some(f64::from(event.attendees)),
        EventSortField::Conversions => Some(f64::from(event.conversions)),
        EventSortField::Roi => EventMetrics::for_event(event).roi_percent,
        EventSortField::ConversionRate => EventMetrics::for_event(event).conversion_rate,
        EventSortField::EventDate | EventSortField::Name => None,
    }
}

/// Sorts events in place. Ties fall back to event date, then id.
pub fn sort_events(events: &mut [MarketingEvent], field: EventSortField, order: SortOrder) {
    events.sort_by(|a, b| {
        let primary = match field {
            EventSortField::EventDate => {
                let ord = a.event_date.cmp(&b.event_date);
                if order == SortOrder::Asc { ord } else { ord.reverse() }
            }
            EventSortField::Name => {
                let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
                if order == SortOrder::Asc { ord } else { ord.reverse() }
            }
            _ => compare_optional(key(a, field), key(b, field), order),
        };
        primary
            .then_with(|| a.event_date.cmp(&b.event_date))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventInput;
    use seminar_pulse_core::Uid;

    fn event(name: &str, date: &str, cost: f64, revenue: f64) -> MarketingEvent {
        EventInput {
            name: Some(name.to_string()),
            event_date: Some(date.to_string()),
            marketing_cost: Some(cost),
            revenue: Some(revenue),
            attendees: Some(10),
            conversions: Some(2),
            ..EventInput::default()
        }
        .into_event(Uid::new("uid-1"))
        .expect("valid fixture")
    }

    fn names(events: &[MarketingEvent]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn parse_fields_and_orders() {
        assert_eq!("roi".parse::<EventSortField>().expect("field"), EventSortField::Roi);
        assert_eq!("date".parse::<EventSortField>().expect("field"), EventSortField::EventDate);
        assert!("bogus".parse::<EventSortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().expect("order"), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sort_by_date_descending_by_default() {
        let mut events = vec![
            event("Jan", "2026-01-01", 1.0, 1.0),
            event("Mar", "2026-03-01", 1.0, 1.0),
            event("Feb", "2026-02-01", 1.0, 1.0),
        ];
        sort_events(&mut events, EventSortField::default(), SortOrder::default());
        assert_eq!(names(&events), ["Mar", "Feb", "Jan"]);
    }

    #[test]
    fn sort_by_name_is_case_insensitive() {
        let mut events = vec![
            event("beta", "2026-01-01", 1.0, 1.0),
            event("Alpha", "2026-01-01", 1.0, 1.0),
            event("gamma", "2026-01-01", 1.0, 1.0),
        ];
        sort_events(&mut events, EventSortField::Name, SortOrder::Asc);
        assert_eq!(names(&events), ["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn sort_by_roi_puts_undefined_last() {
        let mut events = vec![
            event("Free", "2026-01-01", 0.0, 100.0),
            event("Low", "2026-01-02", 100.0, 150.0),
            event("High", "2026-01-03", 100.0, 400.0),
        ];
        sort_events(&mut events, EventSortField::Roi, SortOrder::Desc);
        assert_eq!(names(&events), ["High", "Low", "Free"]);

        sort_events(&mut events, EventSortField::Roi, SortOrder::Asc);
        assert_eq!(names(&events), ["Low", "High", "Free"]);
    }

    #[test]
    fn ties_fall_back_to_date() {
        let mut events = vec![
            event("Later", "2026-05-01", 10.0, 50.0),
            event("Earlier", "2026-04-01", 10.0, 50.0),
        ];
        sort_events(&mut events, EventSortField::Revenue, SortOrder::Desc);
        assert_eq!(names(&events), ["Earlier", "Later"]);
    }
}
