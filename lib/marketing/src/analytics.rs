//! Per-event metrics and portfolio roll-ups.
//!
//! Ratios are reported as percentages. A ratio whose denominator is zero is
//! `None` rather than zero or infinity; gauges clamp to `0..=100`.

use chrono::Datelike;
use seminar_pulse_core::EventId;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::event::MarketingEvent;

/// Label used for events without a location.
pub const UNSPECIFIED_LOCATION: &str = "Unspecified";

/// `part / whole * 100`, or `None` when `whole` is zero.
#[must_use]
pub fn percentage(part: f64, whole: f64) -> Option<f64> {
    (whole > 0.0).then(|| part / whole * 100.0)
}

/// Fill level of a gauge, clamped to `0..=100`. Zero when `target` is zero.
#[must_use]
pub fn gauge_percent(value: f64, target: f64) -> f64 {
    percentage(value, target).map_or(0.0, |p| p.clamp(0.0, 100.0))
}

/// Derived metrics for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetrics {
    pub profit: f64,
    pub roi_percent: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub cost_per_lead: Option<f64>,
    pub cost_per_acquisition: Option<f64>,
}

impl EventMetrics {
    #[must_use]
    pub fn for_event(event: &MarketingEvent) -> Self {
        let profit = event.revenue - event.marketing_cost;
        let per = |count: u32| (count > 0).then(|| event.marketing_cost / f64::from(count));
        Self {
            profit,
            roi_percent: percentage(profit, event.marketing_cost),
            conversion_rate: percentage(f64::from(event.conversions), f64::from(event.attendees)),
            attendance_rate: percentage(f64::from(event.attendees), f64::from(event.registrations)),
            cost_per_lead: per(event.leads),
            cost_per_acquisition: per(event.conversions),
        }
    }
}

/// An event together with its metrics, as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithMetrics {
    #[serde(flatten)]
    pub event: MarketingEvent,
    pub metrics: EventMetrics,
}

impl From<MarketingEvent> for EventWithMetrics {
    fn from(event: MarketingEvent) -> Self {
        let metrics = EventMetrics::for_event(&event);
        Self { event, metrics }
    }
}

/// One slice of an income breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSlice {
    pub label: String,
    pub events: usize,
    pub revenue: f64,
    pub share_percent: f64,
}

/// Event with the best return on investment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHighlight {
    pub id: EventId,
    pub name: String,
    pub roi_percent: f64,
}

/// Roll-up across a set of events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub event_count: usize,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub total_leads: u64,
    pub total_registrations: u64,
    pub total_attendees: u64,
    pub total_conversions: u64,
    pub overall_roi_percent: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub attendance_gauge: f64,
    pub conversion_gauge: f64,
    pub revenue_by_location: Vec<RevenueSlice>,
    pub revenue_by_month: Vec<RevenueSlice>,
    pub best_event: Option<EventHighlight>,
}

fn slices(groups: BTreeMap<String, (usize, f64)>, total_revenue: f64) -> Vec<RevenueSlice> {
    groups
        .into_iter()
        .map(|(label, (events, revenue))| RevenueSlice {
            label,
            events,
            revenue,
            share_percent: percentage(revenue, total_revenue).unwrap_or(0.0),
        })
        .collect()
}

impl PortfolioSummary {
    #[must_use]
    pub fn from_events(events: &[MarketingEvent]) -> Self {
        let total_cost: f64 = events.iter().map(|e| e.marketing_cost).sum();
        let total_revenue: f64 = events.iter().map(|e| e.revenue).sum();
        let sum = |f: fn(&MarketingEvent) -> u32| events.iter().map(|e| u64::from(f(e))).sum::<u64>();
        let total_leads = sum(|e| e.leads);
        let total_registrations = sum(|e| e.registrations);
        let total_attendees = sum(|e| e.attendees);
        let total_conversions = sum(|e| e.conversions);

        let mut by_location: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        let mut by_month: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        for event in events {
            let location = event
                .location
                .clone()
                .unwrap_or_else(|| UNSPECIFIED_LOCATION.to_string());
            let slot = by_location.entry(location).or_default();
            slot.0 += 1;
            slot.1 += event.revenue;

            let month = format!("{:04}-{:02}", event.event_date.year(), event.event_date.month());
            let slot = by_month.entry(month).or_default();
            slot.0 += 1;
            slot.1 += event.revenue;
        }

        let mut revenue_by_location = slices(by_location, total_revenue);
        revenue_by_location.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.label.cmp(&b.label))
        });

        let best_event = events
            .iter()
            .filter_map(|e| {
                EventMetrics::for_event(e).roi_percent.map(|roi| EventHighlight {
                    id: e.id,
                    name: e.name.clone(),
                    roi_percent: roi,
                })
            })
            .max_by(|a, b| a.roi_percent.total_cmp(&b.roi_percent));

        let total_profit = total_revenue - total_cost;
        Self {
            event_count: events.len(),
            total_cost,
            total_revenue,
            total_profit,
            total_leads,
            total_registrations,
            total_attendees,
            total_conversions,
            overall_roi_percent: percentage(total_profit, total_cost),
            conversion_rate: percentage(total_conversions as f64, total_attendees as f64),
            attendance_gauge: gauge_percent(total_attendees as f64, total_registrations as f64),
            conversion_gauge: gauge_percent(total_conversions as f64, total_attendees as f64),
            revenue_by_location,
            revenue_by_month: slices(by_month, total_revenue),
            best_event,
        }
    }
}
