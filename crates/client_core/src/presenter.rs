//! Screen models derived from the current record and the local clock.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use shared::{OfficeStatus, StatusRecord};

use crate::controller::ControllerSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Emerald,
    Rose,
    Indigo,
    Slate,
}

impl From<OfficeStatus> for StatusTone {
    fn from(status: OfficeStatus) -> Self {
        match status {
            OfficeStatus::Available => StatusTone::Emerald,
            OfficeStatus::Busy => StatusTone::Rose,
            OfficeStatus::Prayer => StatusTone::Indigo,
            OfficeStatus::Closed => StatusTone::Slate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub status: OfficeStatus,
    pub tone: StatusTone,
    pub label: &'static str,
    pub message: String,
    pub clock: String,
    pub date: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerFrame {
    pub status: OfficeStatus,
    pub tone: StatusTone,
    pub badge: &'static str,
    pub message: String,
    pub last_updated: String,
    pub pending_context: Option<String>,
    pub is_composing: bool,
}

fn hh_mm<Tz: TimeZone>(zone: &Tz, millis: i64) -> String
where
    Tz::Offset: Display,
{
    zone.timestamp_millis_opt(millis)
        .single()
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Read-only renderer for the passive display.
pub struct DisplayPresenter;

impl DisplayPresenter {
    pub fn present<Tz: TimeZone>(record: &StatusRecord, now: &DateTime<Tz>) -> DisplayFrame
    where
        Tz::Offset: Display,
    {
        DisplayFrame {
            status: record.status,
            tone: record.status.into(),
            label: record.status.display_label(),
            message: record.message.clone(),
            clock: hh_mm(&now.timezone(), now.timestamp_millis()),
            date: now.naive_local().format("%A %d %B %Y").to_string(),
            last_updated: hh_mm(&now.timezone(), record.timestamp),
        }
    }

    /// Manager screen: the controller's optimistic status wins over the view
    /// while a change is in flight.
    pub fn present_manager<Tz: TimeZone>(
        snapshot: &ControllerSnapshot,
        record: &StatusRecord,
        zone: &Tz,
    ) -> ManagerFrame
    where
        Tz::Offset: Display,
    {
        let pending = snapshot.pending_context.trim();
        ManagerFrame {
            status: snapshot.current_status,
            tone: snapshot.current_status.into(),
            badge: snapshot.current_status.manager_label(),
            message: record.message.clone(),
            last_updated: hh_mm(zone, snapshot.last_updated_at),
            pending_context: (!pending.is_empty()).then(|| pending.to_string()),
            is_composing: snapshot.is_composing,
        }
    }
}
