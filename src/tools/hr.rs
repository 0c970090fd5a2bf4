//! HR lookup tools: assignment IDs, timeoff schedules and direct reports.
//!
//! The lookups run against an [`HrDirectory`]. [`MockDirectory`] ships the
//! sample data used by the demo service; a real deployment substitutes its
//! own HR backend behind the same trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::table::ToolTable;
use super::tool::AgentTool;
use super::types::AgentToolParameters;
use crate::error::{HrAgentError, Result};

pub const ASSIGNMENT_ID_TOOL: &str = "get_assignment_id_hr_usecase";
pub const TIMEOFF_SCHEDULE_TOOL: &str = "get_timeoff_schedule_hr_usecase";
pub const DIRECT_REPORTS_TOOL: &str = "get_direct_reports_hr_usecase";

/// Sentinel returned when a username has no assignment.
pub const NOT_FOUND: &str = "not found";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// Source of HR records.
#[async_trait]
pub trait HrDirectory: Send + Sync {
    /// Assignment id for a username, if the user exists.
    async fn assignment_id(&self, username: &str) -> Result<Option<String>>;

    /// Every scheduled timeoff day for an assignment.
    async fn timeoff_dates(&self, assignment_id: &str) -> Result<Vec<NaiveDate>>;

    /// Usernames reporting to `manager`.
    async fn direct_reports(&self, manager: &str) -> Result<Vec<String>>;
}

/// In-memory directory.
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    assignments: HashMap<String, String>,
    timeoff: HashMap<String, Vec<NaiveDate>>,
    reports: HashMap<String, Vec<String>>,
}

impl MockDirectory {
    /// Directory seeded with the demo employees.
    pub fn sample() -> Self {
        Self::default()
            .with_employee("nwaters", "15778303")
            .with_employee("johndoe", "15338303")
            .with_timeoff("15778303", &[ymd(2025, 1, 5)])
            .with_timeoff(
                "15338303",
                &[ymd(2025, 4, 11), ymd(2025, 3, 11), ymd(2025, 1, 1)],
            )
            .with_report("johndoe", "nwaters")
    }

    pub fn with_employee(mut self, username: impl Into<String>, assignment_id: impl Into<String>) -> Self {
        self.assignments.insert(username.into(), assignment_id.into());
        self
    }

    pub fn with_timeoff(mut self, assignment_id: impl Into<String>, dates: &[NaiveDate]) -> Self {
        self.timeoff
            .entry(assignment_id.into())
            .or_default()
            .extend_from_slice(dates);
        self
    }

    pub fn with_report(mut self, manager: impl Into<String>, report: impl Into<String>) -> Self {
        self.reports.entry(manager.into()).or_default().push(report.into());
        self
    }
}

#[async_trait]
impl HrDirectory for MockDirectory {
    async fn assignment_id(&self, username: &str) -> Result<Option<String>> {
        Ok(self.assignments.get(username).cloned())
    }

    async fn timeoff_dates(&self, assignment_id: &str) -> Result<Vec<NaiveDate>> {
        Ok(self.timeoff.get(assignment_id).cloned().unwrap_or_default())
    }

    async fn direct_reports(&self, manager: &str) -> Result<Vec<String>> {
        Ok(self.reports.get(manager).cloned().unwrap_or_default())
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        HrAgentError::tool(
            TIMEOFF_SCHEDULE_TOOL,
            format!("Incorrect date format {value}, should be YYYY-MM-DD"),
        )
    })
}

/// Dates of `schedule` inside `[start, end]`, ascending and deduplicated.
///
/// An inverted range yields nothing.
pub fn dates_in_range(schedule: &[NaiveDate], start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut dates: Vec<NaiveDate> = schedule
        .iter()
        .copied()
        .filter(|d| *d >= start && *d <= end)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Resolve a username to its assignment id, or [`NOT_FOUND`].
pub async fn lookup_assignment_id(directory: &dyn HrDirectory, username: &str) -> Result<String> {
    Ok(directory
        .assignment_id(username)
        .await?
        .unwrap_or_else(|| NOT_FOUND.to_string()))
}

/// Timeoff days for an assignment within an inclusive `YYYY-MM-DD` range.
pub async fn lookup_timeoff(
    directory: &dyn HrDirectory,
    assignment_id: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<String>> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    let schedule = directory.timeoff_dates(assignment_id).await?;
    Ok(dates_in_range(&schedule, start, end)
        .into_iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect())
}

#[derive(Deserialize)]
struct UsernameArgs {
    username: String,
}

#[derive(Deserialize)]
struct TimeoffArgs {
    assignment_id: String,
    start_date: String,
    end_date: String,
}

/// Build the three HR tools over `directory`.
pub fn hr_tools(directory: Arc<dyn HrDirectory>) -> ToolTable {
    let assignment_dir = Arc::clone(&directory);
    let assignment = AgentTool::new(
        ASSIGNMENT_ID_TOOL,
        "Get the assignment id from username",
        AgentToolParameters::object()
            .string("username", "Employee username", true)
            .build(),
        move |args, _ctx| {
            let directory = Arc::clone(&assignment_dir);
            async move {
                let args: UsernameArgs = args.deserialize()?;
                let id = lookup_assignment_id(directory.as_ref(), &args.username).await?;
                Ok(serde_json::Value::String(id))
            }
        },
    );

    let timeoff_dir = Arc::clone(&directory);
    let timeoff = AgentTool::new(
        TIMEOFF_SCHEDULE_TOOL,
        "Get timeoff schedule for employee based on assignment id, start date and end date",
        AgentToolParameters::object()
            .string("assignment_id", "Employee assignment id", true)
            .string_pattern("start_date", "Range start, YYYY-MM-DD", DATE_PATTERN, true)
            .string_pattern("end_date", "Range end (inclusive), YYYY-MM-DD", DATE_PATTERN, true)
            .build(),
        move |args, _ctx| {
            let directory = Arc::clone(&timeoff_dir);
            async move {
                let args: TimeoffArgs = args.deserialize()?;
                let dates = lookup_timeoff(
                    directory.as_ref(),
                    &args.assignment_id,
                    &args.start_date,
                    &args.end_date,
                )
                .await?;
                Ok(serde_json::json!(dates))
            }
        },
    );

    let reports_dir = directory;
    let reports = AgentTool::new(
        DIRECT_REPORTS_TOOL,
        "Get direct reports for a given username",
        AgentToolParameters::object()
            .string("username", "Manager username", true)
            .build(),
        move |args, _ctx| {
            let directory = Arc::clone(&reports_dir);
            async move {
                let args: UsernameArgs = args.deserialize()?;
                let reports = directory.direct_reports(&args.username).await?;
                Ok(serde_json::json!(reports))
            }
        },
    );

    ToolTable::new()
        .with_tool(assignment)
        .with_tool(timeoff)
        .with_tool(reports)
}
