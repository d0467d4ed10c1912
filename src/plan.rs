use crate::metadata::PlanMetadata;
use crate::recurrence::PeriodType;
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};
use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub task_count: usize,
    pub recurring_count: usize,
    pub on_demand_count: usize,
    pub unscheduled_count: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub next_due: Option<NaiveDate>,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("recurring={}", self.recurring_count));
        if self.on_demand_count > 0 {
            parts.push(format!("on_demand={}", self.on_demand_count));
        }
        if self.unscheduled_count > 0 {
            parts.push(format!("unscheduled={}", self.unscheduled_count));
        }
        if self.overdue_count > 0 {
            parts.push(format!("overdue={}", self.overdue_count));
        }
        if self.due_soon_count > 0 {
            parts.push(format!("due_soon={}", self.due_soon_count));
        }
        if let Some(date) = self.next_due {
            parts.push(format!("next_due={}", date));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
pub enum PlanMetadataError {
    NegativeDueSoonWindow { days: i64 },
}

impl fmt::Display for PlanMetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanMetadataError::NegativeDueSoonWindow { days } => write!(
                f,
                "due-soon window must be zero or more days (got {days})"
            ),
        }
    }
}

impl std::error::Error for PlanMetadataError {}

pub struct MaintenancePlan {
    df: DataFrame,
    metadata: PlanMetadata,
}

impl MaintenancePlan {
    pub(crate) fn from_parts(metadata: PlanMetadata) -> Self {
        let schema = Self::default_schema();
        let df = DataFrame::empty_with_schema(&schema);
        Self { df, metadata }
    }

    pub fn new() -> Self {
        Self::from_parts(PlanMetadata::default())
    }

    pub fn new_with_metadata(metadata: PlanMetadata) -> Self {
        Self::from_parts(metadata)
    }

    fn validate_metadata(metadata: &PlanMetadata) -> Result<(), PlanMetadataError> {
        if metadata.due_soon_window_days < 0 {
            return Err(PlanMetadataError::NegativeDueSoonWindow {
                days: metadata.due_soon_window_days,
            });
        }
        Ok(())
    }

    pub fn set_metadata(&mut self, metadata: PlanMetadata) -> Result<(), PlanMetadataError> {
        Self::validate_metadata(&metadata)?;
        self.metadata = metadata;
        Ok(())
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn metadata(&self) -> &PlanMetadata {
        &self.metadata
    }

    pub fn facility_name(&self) -> &str {
        &self.metadata.facility_name
    }

    pub fn facility_description(&self) -> &str {
        &self.metadata.facility_description
    }

    pub fn set_facility_name(&mut self, name: impl Into<String>) {
        self.metadata.facility_name = name.into();
    }

    pub fn set_facility_description(&mut self, description: impl Into<String>) {
        self.metadata.facility_description = description.into();
    }

    pub fn set_due_soon_window_days(&mut self, days: i64) -> Result<(), PlanMetadataError> {
        let mut metadata = self.metadata.clone();
        metadata.due_soon_window_days = days;
        self.set_metadata(metadata)
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("name".into(), DataType::String),
            Field::new("equipment".into(), DataType::String),
            Field::new("location".into(), DataType::String),
            Field::new("period_type".into(), DataType::String),
            Field::new("period_value".into(), DataType::Int64),
            Field::new("base_date".into(), DataType::Date),
            Field::new("last_completed".into(), DataType::Date),
            Field::new("next_due".into(), DataType::Date),
            Field::new("assignee".into(), DataType::String),
            Field::new("notes".into(), DataType::String),
            Field::new(
                "attachments".into(),
                DataType::List(Box::new(DataType::String)),
            ),
        ])
    }

    pub fn tasks(&self) -> Result<Vec<Task>, PolarsError> {
        let df = self.dataframe();
        let mut tasks = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            tasks.push(Task::from_dataframe_row(df, idx)?);
        }
        Ok(tasks)
    }

    pub fn find_task(&self, task_id: i32) -> Result<Option<Task>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.i32()?;
        for (idx, id_opt) in ids.into_iter().enumerate() {
            if id_opt == Some(task_id) {
                let task = Task::from_dataframe_row(self.dataframe(), idx)?;
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    pub fn delete_task(&mut self, task_id: i32) -> Result<bool, PolarsError> {
        if self.df.height() == 0 {
            return Ok(false);
        }
        let snapshot = self.df.clone();
        let mut tasks: Vec<Task> = Vec::with_capacity(snapshot.height());
        let mut found = false;
        for idx in 0..snapshot.height() {
            let task = Task::from_dataframe_row(&snapshot, idx)?;
            if task.id == task_id {
                found = true;
                continue;
            }
            tasks.push(task);
        }
        if !found {
            return Ok(false);
        }

        self.df = DataFrame::empty_with_schema(&Self::default_schema());
        for task in tasks {
            self.upsert_task_record(task)?;
        }
        Ok(true)
    }

    fn update_string_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: &str,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(task_id) {
                    Some(new_value)
                } else {
                    val
                }
            })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_i64_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: i64,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .i64()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(task_id) {
                    Some(new_value)
                } else {
                    val
                }
            })
            .collect::<Int64Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_list_str_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_values: Vec<String>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let replacement = Series::new(PlSmallStr::from_static(""), new_values);
        let new_series = target_col
            .list()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(task_id) {
                    Some(replacement.clone())
                } else {
                    val
                }
            })
            .collect::<ListChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_date_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_date: NaiveDate,
    ) -> Result<(), PolarsError> {
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(task_id)))
                    .then(lit(new_date).cast(DataType::Date))
                    .otherwise(col(column_name).cast(DataType::Date))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    fn validation_error(err: TaskValidationError) -> PolarsError {
        PolarsError::ComputeError(err.to_string().into())
    }

    pub fn upsert_task(
        &mut self,
        id: i32,
        name: &str,
        period_type: PeriodType,
        period_value: i64,
        base_date: Option<NaiveDate>,
    ) -> Result<(), PolarsError> {
        if period_value < 0 {
            return Err(PolarsError::ComputeError(
                format!("task {} has negative period value {}", id, period_value).into(),
            ));
        }
        let id_exists = if self.df.height() == 0 {
            false
        } else {
            self.df
                .column("id")?
                .i32()?
                .into_iter()
                .any(|v| v == Some(id))
        };

        if id_exists {
            self.update_string_column("name", id, name)?;
            self.update_string_column("period_type", id, period_type.as_str())?;
            self.update_i64_column("period_value", id, period_value)?;
            if let Some(date) = base_date {
                self.update_date_column("base_date", id, date)?;
            }
            self.recompute_next_due()?;
            return Ok(());
        }

        let mut task = Task::new(id, name, period_type, period_value);
        task.base_date = base_date;
        task.next_due = task.next_due_from_base();
        task_validation::validate_task(&task).map_err(Self::validation_error)?;
        let new_row = task.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        Ok(())
    }

    pub fn upsert_task_record(&mut self, task: Task) -> Result<(), PolarsError> {
        task_validation::validate_task(&task).map_err(Self::validation_error)?;
        let id_exists = if self.df.height() == 0 {
            false
        } else {
            self.df
                .column("id")?
                .i32()?
                .into_iter()
                .any(|v| v == Some(task.id))
        };

        if id_exists {
            self.update_string_column("name", task.id, &task.name)?;
            self.update_string_column("period_type", task.id, task.period_type.as_str())?;
            self.update_i64_column("period_value", task.id, task.period_value)?;

            if let Some(ref equipment) = task.equipment {
                self.update_string_column("equipment", task.id, equipment)?;
            }

            if let Some(ref location) = task.location {
                self.update_string_column("location", task.id, location)?;
            }

            if let Some(date) = task.base_date {
                self.update_date_column("base_date", task.id, date)?;
            }

            if let Some(date) = task.last_completed {
                self.update_date_column("last_completed", task.id, date)?;
            }

            if let Some(date) = task.next_due {
                self.update_date_column("next_due", task.id, date)?;
            }

            if let Some(ref assignee) = task.assignee {
                self.update_string_column("assignee", task.id, assignee)?;
            }

            if let Some(ref notes) = task.notes {
                self.update_string_column("notes", task.id, notes)?;
            }

            if !task.attachments.is_empty() {
                self.update_list_str_column("attachments", task.id, task.attachments.clone())?;
            }

            return Ok(());
        }

        let new_row = task.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        Ok(())
    }

    /// Record a completion and advance the task's next due date from it.
    pub fn complete_task(
        &mut self,
        task_id: i32,
        completed_on: NaiveDate,
    ) -> Result<(), PolarsError> {
        let mut task = self
            .find_task(task_id)?
            .ok_or_else(|| PolarsError::ComputeError(format!("task {task_id} not found").into()))?;
        task.last_completed = Some(completed_on);
        task.next_due = task.next_due_from_base();
        self.upsert_task_record(task)?;
        self.recompute_next_due()
    }

    /// Rewrite the next_due column for every row from the cadence rule.
    pub fn recompute_next_due(&mut self) -> Result<(), PolarsError> {
        let height = self.df.height();
        if height == 0 {
            return Ok(());
        }
        let mut next_vals: Vec<Option<i32>> = Vec::with_capacity(height);
        for idx in 0..height {
            let task = Task::from_dataframe_row(&self.df, idx)?;
            next_vals.push(task.next_due_from_base().map(Self::date_to_i32));
        }
        let next_series =
            Series::new(PlSmallStr::from_static("next_due"), next_vals).cast(&DataType::Date)?;
        self.df.replace("next_due", next_series)?;
        Ok(())
    }

    /// Recompute due dates and summarize the plan against a reference date.
    pub fn refresh_as_of(&mut self, as_of: NaiveDate) -> Result<RefreshSummary, PolarsError> {
        self.recompute_next_due()?;

        let tasks = self.tasks()?;
        let window = self.metadata.due_soon_window_days.max(0);
        let due_soon_cutoff = as_of + Duration::days(window);

        let mut recurring_count = 0usize;
        let mut on_demand_count = 0usize;
        let mut unscheduled_count = 0usize;
        let mut overdue_count = 0usize;
        let mut due_soon_count = 0usize;
        let mut next_due: Option<NaiveDate> = None;

        for task in &tasks {
            if !task.period_type.is_recurring() {
                on_demand_count += 1;
                continue;
            }
            recurring_count += 1;
            match task.next_due {
                None => unscheduled_count += 1,
                Some(due) => {
                    if due < as_of {
                        overdue_count += 1;
                    } else if due <= due_soon_cutoff {
                        due_soon_count += 1;
                    }
                    next_due = Some(match next_due {
                        Some(current) if current <= due => current,
                        _ => due,
                    });
                }
            }
        }

        Ok(RefreshSummary {
            task_count: tasks.len(),
            recurring_count,
            on_demand_count,
            unscheduled_count,
            overdue_count,
            due_soon_count,
            next_due,
        })
    }

    // Public setters for common columns to enable CLI editing
    #[cfg(feature = "cli_api")]
    pub fn set_base_date(&mut self, task_id: i32, date: NaiveDate) -> Result<(), PolarsError> {
        self.update_date_column("base_date", task_id, date)?;
        self.recompute_next_due()
    }

    #[cfg(feature = "cli_api")]
    pub fn set_last_completed(&mut self, task_id: i32, date: NaiveDate) -> Result<(), PolarsError> {
        self.update_date_column("last_completed", task_id, date)?;
        self.recompute_next_due()
    }

    #[cfg(feature = "cli_api")]
    pub fn set_period(
        &mut self,
        task_id: i32,
        period_type: PeriodType,
        period_value: i64,
    ) -> Result<(), PolarsError> {
        if period_value < 0 {
            return Err(PolarsError::ComputeError(
                format!(
                    "task {} has negative period value {}",
                    task_id, period_value
                )
                .into(),
            ));
        }
        self.update_string_column("period_type", task_id, period_type.as_str())?;
        self.update_i64_column("period_value", task_id, period_value)?;
        self.recompute_next_due()
    }

    #[cfg(feature = "cli_api")]
    pub fn set_equipment(&mut self, task_id: i32, equipment: &str) -> Result<(), PolarsError> {
        self.update_string_column("equipment", task_id, equipment)
    }

    #[cfg(feature = "cli_api")]
    pub fn set_location(&mut self, task_id: i32, location: &str) -> Result<(), PolarsError> {
        self.update_string_column("location", task_id, location)
    }

    #[cfg(feature = "cli_api")]
    pub fn set_assignee(&mut self, task_id: i32, assignee: &str) -> Result<(), PolarsError> {
        self.update_string_column("assignee", task_id, assignee)
    }

    #[cfg(feature = "cli_api")]
    pub fn set_notes(&mut self, task_id: i32, notes: &str) -> Result<(), PolarsError> {
        self.update_string_column("notes", task_id, notes)
    }

    #[cfg(feature = "cli_api")]
    pub fn set_attachments(
        &mut self,
        task_id: i32,
        attachments: Vec<String>,
    ) -> Result<(), PolarsError> {
        self.update_list_str_column("attachments", task_id, attachments)
    }
}

impl Default for MaintenancePlan {
    fn default() -> Self {
        Self::new()
    }
}
