//! Dashboard view model: pass/fail tallies, header labels, section
//! visibility and the table-row markup for an audit report.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::html::escape;
use crate::{AuditReport, EquipmentResult, RoomResult, Status};

/// Issue text the engine emits when an equipment row has no usable power rating.
pub const INVALID_POWER_FORMAT: &str = "Invalid power format";

/// Insight shown for failing rooms.
pub const ROOM_FAILURE_INSIGHT: &str = "Low_ACH";

/// Where the report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    /// Full run on a file chosen from the server's list
    FileList,
    /// View-only JSON opened from the operator's machine
    LocalUpload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentVisibility {
    Hidden,
    NoData,
    Table,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub passed: usize,
    pub failed: usize,
}

impl CategorySummary {
    pub fn tally(statuses: impl IntoIterator<Item = Status>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |mut acc, status| {
                if status.is_pass() {
                    acc.passed += 1;
                } else {
                    acc.failed += 1;
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Pass rate rounded to the nearest whole percent; 0 for an empty category.
    pub fn percent(&self) -> u32 {
        match self.total() {
            0 => 0,
            total => ((self.passed as f64 / total as f64) * 100.0).round() as u32,
        }
    }

    pub fn labels(&self) -> CategoryLabels {
        CategoryLabels {
            passed: self.passed,
            failed: self.failed,
            total: self.total(),
            percent: format!("{}%", self.percent()),
            passed_label: format!("{} PASSED", self.passed),
            failed_label: format!("{} FAILED", self.failed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLabels {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub percent: String,
    pub passed_label: String,
    pub failed_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub run_date: String,
    pub job_label: String,
    pub file_label: String,
    pub rooms: CategoryLabels,
    pub equipment: CategoryLabels,
    pub equipment_visibility: EquipmentVisibility,
}

pub struct DashboardView<'a> {
    report: &'a AuditReport,
    rooms: CategorySummary,
    equipment: CategorySummary,
    source: ReportSource,
    file_name: &'a str,
}

impl<'a> DashboardView<'a> {
    pub fn new(report: &'a AuditReport, file_name: &'a str, source: ReportSource) -> Self {
        Self {
            report,
            rooms: CategorySummary::tally(report.rooms.iter().map(|r| r.status)),
            equipment: CategorySummary::tally(report.equipment.iter().map(|e| e.status)),
            source,
            file_name,
        }
    }

    pub fn equipment_visibility(&self) -> EquipmentVisibility {
        if self.source == ReportSource::LocalUpload {
            return EquipmentVisibility::Hidden;
        }
        let equipment = &self.report.equipment;
        let all_invalid_power = !equipment.is_empty()
            && equipment
                .iter()
                .all(|e| e.status == Status::Fail && e.issues.contains(INVALID_POWER_FORMAT));
        if all_invalid_power {
            EquipmentVisibility::NoData
        } else {
            EquipmentVisibility::Table
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        let job = self
            .report
            .job_reference
            .as_deref()
            .filter(|j| !j.is_empty())
            .unwrap_or("Unreferenced");
        let file = self
            .report
            .input_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(self.file_name);
        DashboardSummary {
            run_date: self
                .report
                .run_date
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Unknown Date".into()),
            job_label: format!("Job: {job}"),
            file_label: format!("File: {file}"),
            rooms: self.rooms.labels(),
            equipment: self.equipment.labels(),
            equipment_visibility: self.equipment_visibility(),
        }
    }

    pub fn render_room_rows(&self) -> String {
        let mut html = String::new();
        for room in &self.report.rooms {
            render_room_row(&mut html, room);
        }
        html
    }

    pub fn render_equipment_rows(&self) -> String {
        let mut html = String::new();
        for item in &self.report.equipment {
            render_equipment_row(&mut html, item);
        }
        html
    }
}

fn status_badge(status: Status) -> String {
    let class = if status.is_pass() { "status-pass" } else { "status-fail" };
    format!(r#"<span class="status-badge {class}">{status}</span>"#)
}

fn render_room_row(html: &mut String, room: &RoomResult) {
    let action = if room.status.is_pass() {
        String::new()
    } else {
        format!(
            r#"<button class="expert-btn" data-insight="{ROOM_FAILURE_INSIGHT}">Ask AI Expert</button>"#
        )
    };
    let _ = write!(
        html,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&room.name),
        escape(&room.ach_label()),
        escape(&room.comfort),
        status_badge(room.status),
        action
    );
}

fn render_equipment_row(html: &mut String, item: &EquipmentResult) {
    let _ = write!(
        html,
        "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&item.mark),
        escape(&item.category),
        escape(&item.issues),
        status_badge(item.status)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AirChanges;

    fn room(name: &str, status: Status) -> RoomResult {
        RoomResult {
            name: name.into(),
            ach: Some(AirChanges::Value(20.0)),
            comfort: "Optimal".into(),
            status,
        }
    }

    fn equipment(mark: &str, issues: &str, status: Status) -> EquipmentResult {
        EquipmentResult {
            mark: mark.into(),
            category: "Fan".into(),
            issues: issues.into(),
            status,
        }
    }

    #[test]
    fn two_of_three_rooms_is_sixty_seven_percent() {
        let report = AuditReport {
            rooms: vec![
                room("A", Status::Pass),
                room("B", Status::Pass),
                room("C", Status::Fail),
            ],
            ..Default::default()
        };
        let view = DashboardView::new(&report, "rooms.csv", ReportSource::FileList);
        let summary = view.summary();

        assert_eq!(summary.rooms.percent, "67%");
        assert_eq!(summary.rooms.passed_label, "2 PASSED");
        assert_eq!(summary.rooms.failed_label, "1 FAILED");
        assert_eq!(summary.rooms.passed + summary.rooms.failed, report.rooms.len());
        assert_eq!(summary.equipment.percent, "0%");
    }

    #[test]
    fn header_labels_fall_back() {
        let report = AuditReport::default();
        let summary = DashboardView::new(&report, "upload.json", ReportSource::LocalUpload).summary();
        assert_eq!(summary.run_date, "Unknown Date");
        assert_eq!(summary.job_label, "Job: Unreferenced");
        assert_eq!(summary.file_label, "File: upload.json");
    }

    #[test]
    fn report_input_file_wins_over_chosen_name() {
        let report = AuditReport {
            input_file: Some("EquipmentSchedule.csv".into()),
            job_reference: Some("J-42".into()),
            ..Default::default()
        };
        let summary = DashboardView::new(&report, "other.csv", ReportSource::FileList).summary();
        assert_eq!(summary.file_label, "File: EquipmentSchedule.csv");
        assert_eq!(summary.job_label, "Job: J-42");
    }

    #[test]
    fn local_upload_hides_equipment() {
        let report = AuditReport {
            equipment: vec![equipment("F-1", "None", Status::Pass)],
            ..Default::default()
        };
        let view = DashboardView::new(&report, "r.json", ReportSource::LocalUpload);
        assert_eq!(view.equipment_visibility(), EquipmentVisibility::Hidden);
    }

    #[test]
    fn all_invalid_power_rows_show_no_data() {
        let report = AuditReport {
            equipment: vec![
                equipment("F-1", "Invalid power format", Status::Fail),
                equipment("P-1", "Missing flow rate, Invalid power format", Status::Fail),
            ],
            ..Default::default()
        };
        let view = DashboardView::new(&report, "e.csv", ReportSource::FileList);
        assert_eq!(view.equipment_visibility(), EquipmentVisibility::NoData);
    }

    #[test]
    fn mixed_equipment_shows_table() {
        let report = AuditReport {
            equipment: vec![
                equipment("F-1", "Invalid power format", Status::Fail),
                equipment("F-2", "None", Status::Pass),
            ],
            ..Default::default()
        };
        let view = DashboardView::new(&report, "e.csv", ReportSource::FileList);
        assert_eq!(view.equipment_visibility(), EquipmentVisibility::Table);

        let empty = AuditReport::default();
        let view = DashboardView::new(&empty, "e.csv", ReportSource::FileList);
        assert_eq!(view.equipment_visibility(), EquipmentVisibility::Table);
    }

    #[test]
    fn failing_rooms_offer_expert_button_and_escape_names() {
        let report = AuditReport {
            rooms: vec![room("<Lab 1>", Status::Fail), room("Lab 2", Status::Pass)],
            ..Default::default()
        };
        let html = DashboardView::new(&report, "r.csv", ReportSource::FileList).render_room_rows();
        assert!(html.contains("&lt;Lab 1&gt;"));
        assert_eq!(html.matches("Ask AI Expert").count(), 1);
        assert!(html.contains(r#"data-insight="Low_ACH""#));
        assert!(html.contains("<td>20</td>"));
    }
}
