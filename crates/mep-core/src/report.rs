//! Audit report as produced by the external audit engine.
//!
//! The engine owns the shape; this side only reads it, so every field is
//! lenient on input.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::html::format_number;

/// Missing and `null` both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of a single room or equipment check.
///
/// Anything the engine emits other than `PASS` is treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn is_pass(self) -> bool {
        self == Status::Pass
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        if raw == "PASS" {
            Status::Pass
        } else {
            Status::Fail
        }
    }
}

impl From<Option<String>> for Status {
    fn from(raw: Option<String>) -> Self {
        raw.map(Status::from).unwrap_or_default()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Fail
    }
}

/// Air change rate as the engine reported it: usually a number, sometimes
/// text such as `"N/A"` or `"12.5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AirChanges {
    Value(f64),
    Text(String),
}

impl fmt::Display for AirChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirChanges::Value(v) => f.write_str(&format_number(*v)),
            AirChanges::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Calculated air changes per hour
    #[serde(default)]
    pub ach: Option<AirChanges>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comfort: String,
    #[serde(default)]
    pub status: Status,
}

impl RoomResult {
    /// Air change rate as shown in the dashboard, `N/A` when absent.
    pub fn ach_label(&self) -> String {
        self.ach
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "N/A".into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mark: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Comma-joined issue list, "None" when the row is clean
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: String,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub run_date: Option<String>,
    #[serde(default)]
    pub job_reference: Option<String>,
    #[serde(default)]
    pub input_file: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rooms: Vec<RoomResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment: Vec<EquipmentResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_engine_output() {
        let raw = json!({
            "job_reference": "JOB-7",
            "run_date": "2025-03-01 10:15:00",
            "input_file": "EquipmentSchedule.csv",
            "rooms": [
                {"name": "Cleanroom A", "ach": 32.5, "comfort": "Optimal", "status": "PASS"},
                {"name": "Airlock", "ach": 8, "comfort": "Sub-optimal", "status": "FAIL"}
            ],
            "equipment": [
                {"mark": "AHU-1", "category": "Fan", "issues": "None", "status": "PASS"}
            ]
        });

        let report: AuditReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.job_reference.as_deref(), Some("JOB-7"));
        assert_eq!(report.rooms.len(), 2);
        assert_eq!(report.rooms[1].ach, Some(AirChanges::Value(8.0)));
        assert_eq!(report.rooms[1].ach_label(), "8");
        assert!(report.rooms[0].status.is_pass());
        assert_eq!(report.equipment[0].mark, "AHU-1");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let report: AuditReport = serde_json::from_value(json!({})).unwrap();
        assert!(report.rooms.is_empty());
        assert!(report.equipment.is_empty());
        assert!(report.run_date.is_none());
    }

    #[test]
    fn unknown_status_counts_as_failure() {
        let room: RoomResult =
            serde_json::from_value(json!({"name": "Lab", "status": "WARN"})).unwrap();
        assert_eq!(room.status, Status::Fail);
        assert_eq!(serde_json::to_value(room.status).unwrap(), json!("FAIL"));
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let report: AuditReport = serde_json::from_value(json!({
            "rooms": [{"name": null, "ach": null, "comfort": null, "status": null}],
            "equipment": [{"mark": "AHU-2", "category": null, "issues": null, "status": "PASS"}]
        }))
        .unwrap();

        let room = &report.rooms[0];
        assert_eq!(room.name, "");
        assert_eq!(room.ach, None);
        assert_eq!(room.ach_label(), "N/A");
        assert_eq!(room.status, Status::Fail);
        assert_eq!(report.equipment[0].issues, "");
        assert!(report.equipment[0].status.is_pass());

        let empty: AuditReport =
            serde_json::from_value(json!({"rooms": null, "equipment": null})).unwrap();
        assert!(empty.rooms.is_empty() && empty.equipment.is_empty());
    }

    #[test]
    fn textual_air_changes_are_kept_verbatim() {
        let room: RoomResult =
            serde_json::from_value(json!({"name": "Store", "ach": "12.5"})).unwrap();
        assert_eq!(room.ach, Some(AirChanges::Text("12.5".into())));
        assert_eq!(room.ach_label(), "12.5");

        let room: RoomResult = serde_json::from_value(json!({"ach": 22.5})).unwrap();
        assert_eq!(room.ach_label(), "22.5");
    }
}
