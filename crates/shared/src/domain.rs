use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Well-known store location of the single live status record.
pub const DEFAULT_STATUS_PATH: &str = "officeStatus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfficeStatus {
    Available,
    Busy,
    Closed,
    Prayer,
}

impl OfficeStatus {
    pub const ALL: [OfficeStatus; 4] = [
        OfficeStatus::Available,
        OfficeStatus::Busy,
        OfficeStatus::Prayer,
        OfficeStatus::Closed,
    ];

    /// Canned display message used when no context is supplied or generation fails.
    pub fn default_message(self) -> &'static str {
        match self {
            OfficeStatus::Available => "المكتب مفتوح، تفضل بالدخول.",
            OfficeStatus::Busy => "مشغول حالياً، الرجاء عدم الإزعاج.",
            OfficeStatus::Closed => "الدوام انتهى، نراكم غداً.",
            OfficeStatus::Prayer => "ذهب للصلاة وسيعود قريباً.",
        }
    }

    /// Headline shown on the passive display.
    pub fn display_label(self) -> &'static str {
        match self {
            OfficeStatus::Available => "تفضل بالدخول",
            OfficeStatus::Busy => "مشغول حالياً",
            OfficeStatus::Closed => "المكتب مغلق",
            OfficeStatus::Prayer => "وقت الصلاة",
        }
    }

    /// Short badge shown on the manager screen.
    pub fn manager_label(self) -> &'static str {
        match self {
            OfficeStatus::Available => "متاح الآن",
            OfficeStatus::Busy => "مشغول",
            OfficeStatus::Closed => "مغلق",
            OfficeStatus::Prayer => "في الصلاة",
        }
    }

    pub fn as_wire_str(self) -> &'static str {
        match self {
            OfficeStatus::Available => "AVAILABLE",
            OfficeStatus::Busy => "BUSY",
            OfficeStatus::Closed => "CLOSED",
            OfficeStatus::Prayer => "PRAYER",
        }
    }
}

impl fmt::Display for OfficeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl FromStr for OfficeStatus {
    type Err = RecordError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "available" | "open" | "1" => Ok(OfficeStatus::Available),
            "busy" | "2" => Ok(OfficeStatus::Busy),
            "prayer" | "3" => Ok(OfficeStatus::Prayer),
            "closed" | "4" => Ok(OfficeStatus::Closed),
            _ => Err(RecordError::UnknownStatus(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_distinct_default_message() {
        let mut seen = std::collections::HashSet::new();
        for status in OfficeStatus::ALL {
            assert!(!status.default_message().is_empty());
            assert!(seen.insert(status.default_message()));
        }
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("BUSY".parse::<OfficeStatus>().unwrap(), OfficeStatus::Busy);
        assert_eq!(" prayer ".parse::<OfficeStatus>().unwrap(), OfficeStatus::Prayer);
        assert_eq!("4".parse::<OfficeStatus>().unwrap(), OfficeStatus::Closed);
        assert!("away".parse::<OfficeStatus>().is_err());
    }

    #[test]
    fn serializes_as_upper_case_wire_value() {
        let raw = serde_json::to_string(&OfficeStatus::Prayer).expect("serialize");
        assert_eq!(raw, "\"PRAYER\"");
    }
}
