//! Marketing event record and its boundary validation.
//!
//! Requests arrive as [`EventInput`] with every field optional; they are
//! validated once, here, into a [`MarketingEvent`] or a field patch.

use chrono::{DateTime, NaiveDate, Utc};
use seminar_pulse_core::{EventId, Uid};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Collection holding marketing event documents.
pub const EVENTS_COLLECTION: &str = "marketing_events";

/// Metrics recorded for one seminar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingEvent {
    pub id: EventId,
    pub name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    pub marketing_cost: f64,
    #[serde(default)]
    pub leads: u32,
    #[serde(default)]
    pub registrations: u32,
    #[serde(default)]
    pub attendees: u32,
    #[serde(default)]
    pub conversions: u32,
    pub revenue: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: Uid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated event fields as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub name: Option<String>,
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub marketing_cost: Option<f64>,
    pub leads: Option<i64>,
    pub registrations: Option<i64>,
    pub attendees: Option<i64>,
    pub conversions: Option<i64>,
    pub revenue: Option<f64>,
    pub notes: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| ValidationError::InvalidField {
        field: "eventDate",
        reason: format!("expected YYYY-MM-DD ({e})"),
    })
}

fn money(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidField {
            field,
            reason: "must be a non-negative number".to_string(),
        });
    }
    Ok(value)
}

fn count(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::InvalidField {
        field,
        reason: "must be a non-negative whole number".to_string(),
    })
}

fn non_blank(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl EventInput {
    /// Validates a create request into a new event.
    ///
    /// Name, event date, marketing cost and revenue are required; counts
    /// default to zero.
    pub fn into_event(self, created_by: Uid) -> Result<MarketingEvent, ValidationError> {
        let name = non_blank("name", self.name.as_deref())?;
        let event_date = parse_date(&non_blank("eventDate", self.event_date.as_deref())?)?;
        let marketing_cost = money(
            "marketingCost",
            self.marketing_cost
                .ok_or(ValidationError::MissingField {
                    field: "marketingCost",
                })?,
        )?;
        let revenue = money(
            "revenue",
            self.revenue
                .ok_or(ValidationError::MissingField { field: "revenue" })?,
        )?;

        let now = Utc::now();
        Ok(MarketingEvent {
            id: EventId::new(),
            name,
            event_date,
            location: optional_text(self.location.as_deref()),
            marketing_cost,
            leads: count("leads", self.leads.unwrap_or(0))?,
            registrations: count("registrations", self.registrations.unwrap_or(0))?,
            attendees: count("attendees", self.attendees.unwrap_or(0))?,
            conversions: count("conversions", self.conversions.unwrap_or(0))?,
            revenue,
            notes: optional_text(self.notes.as_deref()),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Validates an update request and applies it to an existing event.
    ///
    /// Absent fields are left unchanged; a present but blank name is
    /// rejected, a blank location or notes clears the field.
    pub fn apply_to(&self, event: &mut MarketingEvent) -> Result<(), ValidationError> {
        let mut updated = event.clone();

        if let Some(name) = &self.name {
            updated.name = non_blank("name", Some(name))?;
        }
        if let Some(date) = &self.event_date {
            updated.event_date = parse_date(date)?;
        }
        if let Some(location) = &self.location {
            updated.location = optional_text(Some(location));
        }
        if let Some(cost) = self.marketing_cost {
            updated.marketing_cost = money("marketingCost", cost)?;
        }
        if let Some(revenue) = self.revenue {
            updated.revenue = money("revenue", revenue)?;
        }
        if let Some(leads) = self.leads {
            updated.leads = count("leads", leads)?;
        }
        if let Some(registrations) = self.registrations {
            updated.registrations = count("registrations", registrations)?;
        }
        if let Some(attendees) = self.attendees {
            updated.attendees = count("attendees", attendees)?;
        }
        if let Some(conversions) = self.conversions {
            updated.conversions = count("conversions", conversions)?;
        }
        if let Some(notes) = &self.notes {
            updated.notes = optional_text(Some(notes));
        }

        updated.updated_at = Utc::now();
        *event = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> EventInput {
        EventInput {
            name: Some("  Retirement Income Workshop ".to_string()),
            event_date: Some("2026-03-14".to_string()),
            location: Some("Denver".to_string()),
            marketing_cost: Some(2500.0),
            leads: Some(120),
            registrations: Some(80),
            attendees: Some(60),
            conversions: Some(9),
            revenue: Some(18000.0),
            notes: None,
        }
    }

    #[test]
    fn valid_input_becomes_event() {
        let event = valid_input().into_event(Uid::new("uid-1")).expect("valid");
        assert_eq!(event.name, "Retirement Income Workshop");
        assert_eq!(
            event.event_date,
            NaiveDate::from_ymd_opt(2026, 3, 14).expect("date")
        );
        assert_eq!(event.attendees, 60);
        assert_eq!(event.created_by.as_str(), "uid-1");
        assert_eq!(event.created_at, event.updated_at);
    }

    #[test]
    fn counts_default_to_zero() {
        let input = EventInput {
            leads: None,
            registrations: None,
            attendees: None,
            conversions: None,
            ..valid_input()
        };
        let event = input.into_event(Uid::new("uid-1")).expect("valid");
        assert_eq!(
            (event.leads, event.registrations, event.attendees, event.conversions),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn missing_required_fields() {
        let cases: [(EventInput, &str); 4] = [
            (EventInput { name: Some(" ".into()), ..valid_input() }, "name"),
            (EventInput { event_date: None, ..valid_input() }, "eventDate"),
            (EventInput { marketing_cost: None, ..valid_input() }, "marketingCost"),
            (EventInput { revenue: None, ..valid_input() }, "revenue"),
        ];
        for (input, field) in cases {
            assert_eq!(
                input.into_event(Uid::new("uid-1")).unwrap_err(),
                ValidationError::MissingField { field }
            );
        }
    }

    #[test]
    fn invalid_values_rejected() {
        let bad_date = EventInput {
            event_date: Some("14/03/2026".into()),
            ..valid_input()
        };
        assert!(matches!(
            bad_date.into_event(Uid::new("u")).unwrap_err(),
            ValidationError::InvalidField { field: "eventDate", .. }
        ));

        let negative_cost = EventInput {
            marketing_cost: Some(-1.0),
            ..valid_input()
        };
        assert!(matches!(
            negative_cost.into_event(Uid::new("u")).unwrap_err(),
            ValidationError::InvalidField { field: "marketingCost", .. }
        ));

        let nan_revenue = EventInput {
            revenue: Some(f64::NAN),
            ..valid_input()
        };
        assert!(nan_revenue.into_event(Uid::new("u")).is_err());

        let negative_count = EventInput {
            attendees: Some(-3),
            ..valid_input()
        };
        assert!(matches!(
            negative_count.into_event(Uid::new("u")).unwrap_err(),
            ValidationError::InvalidField { field: "attendees", .. }
        ));
    }

    #[test]
    fn apply_patch_changes_only_given_fields() {
        let mut event = valid_input().into_event(Uid::new("uid-1")).expect("valid");
        let patch = EventInput {
            revenue: Some(21000.0),
            location: Some("".into()),
            ..EventInput::default()
        };
        patch.apply_to(&mut event).expect("patch");

        assert_eq!(event.revenue, 21000.0);
        assert_eq!(event.location, None);
        assert_eq!(event.name, "Retirement Income Workshop");
        assert!(event.updated_at >= event.created_at);
    }

    #[test]
    fn failed_patch_leaves_event_untouched() {
        let mut event = valid_input().into_event(Uid::new("uid-1")).expect("valid");
        let before = event.clone();
        let patch = EventInput {
            revenue: Some(1.0),
            conversions: Some(-1),
            ..EventInput::default()
        };
        assert!(patch.apply_to(&mut event).is_err());
        assert_eq!(event, before);
    }

    #[test]
    fn event_document_shape() {
        let event = valid_input().into_event(Uid::new("uid-1")).expect("valid");
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["eventDate"], "2026-03-14");
        assert_eq!(json["createdBy"], "uid-1");
        assert!(json["id"].as_str().expect("id").starts_with("evt_"));
        let back: MarketingEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }
}
