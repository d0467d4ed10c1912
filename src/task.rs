use crate::recurrence::{self, PeriodType};
use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One preventive-maintenance task: what to service, and on what cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub period_type: PeriodType,
    pub period_value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Task {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        period_type: PeriodType,
        period_value: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            equipment: None,
            location: None,
            period_type,
            period_value,
            base_date: None,
            last_completed: None,
            next_due: None,
            assignee: None,
            notes: None,
            attachments: Vec::new(),
        }
    }

    /// The date the next occurrence is computed from: the last completion
    /// wins over the originally scheduled anchor.
    pub fn effective_base(&self) -> Option<NaiveDate> {
        self.last_completed.or(self.base_date)
    }

    /// Next due date per the task's cadence. On-demand tasks and recurring
    /// tasks without an effective base have none.
    pub fn next_due_from_base(&self) -> Option<NaiveDate> {
        if !self.period_type.is_recurring() {
            return None;
        }
        self.effective_base()
            .map(|base| recurrence::next_occurrence(base, self.period_type, self.period_value))
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(12);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let name_data: [&str; 1] = [self.name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("name"), name_data).into_column());

        let equipment: [Option<&str>; 1] = [self.equipment.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("equipment"), equipment).into_column());

        let location: [Option<&str>; 1] = [self.location.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("location"), location).into_column());

        let period_type: [&str; 1] = [self.period_type.as_str()];
        columns
            .push(Series::new(PlSmallStr::from_static("period_type"), period_type).into_column());

        let period_value: [i64; 1] = [self.period_value];
        columns.push(
            Series::new(PlSmallStr::from_static("period_value"), period_value).into_column(),
        );

        columns.push(Self::series_from_date("base_date", self.base_date)?.into_column());
        columns.push(Self::series_from_date("last_completed", self.last_completed)?.into_column());
        columns.push(Self::series_from_date("next_due", self.next_due)?.into_column());

        let assignee: [Option<&str>; 1] = [self.assignee.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("assignee"), assignee).into_column());

        let notes: [Option<&str>; 1] = [self.notes.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("notes"), notes).into_column());

        columns.push(Self::series_from_string_list("attachments", &self.attachments).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("task row missing id".into()))?;

        let name = df
            .column("name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let period_type_tag = df
            .column("period_type")?
            .str()?
            .get(row_idx)
            .unwrap_or("ON_DEMAND");
        let period_type = period_type_tag
            .parse::<PeriodType>()
            .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;

        let period_value = df.column("period_value")?.i64()?.get(row_idx).unwrap_or(0);

        let attachments = Self::vec_from_string_list(df.column("attachments")?.list()?, row_idx)?;

        Ok(Self {
            id,
            name,
            equipment: df
                .column("equipment")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            location: df
                .column("location")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            period_type,
            period_value,
            base_date: Self::date_from_series(df.column("base_date")?.date()?, row_idx),
            last_completed: Self::date_from_series(df.column("last_completed")?.date()?, row_idx),
            next_due: Self::date_from_series(df.column("next_due")?.date()?, row_idx),
            assignee: df
                .column("assignee")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            notes: df
                .column("notes")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            attachments,
        })
    }

    fn series_from_string_list(name: &str, values: &[String]) -> Series {
        let inner_values: Vec<&str> = values.iter().map(|s| s.as_str()).collect();
        let inner = Series::new(PlSmallStr::from_static(""), inner_values);
        Series::new(name.into(), &[inner])
    }

    fn series_from_date(name: &str, date: Option<NaiveDate>) -> PolarsResult<Series> {
        let data: [Option<i32>; 1] = [date.map(Self::date_to_i32)];
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_from_series(chunked: &DateChunked, row_idx: usize) -> Option<NaiveDate> {
        chunked.get(row_idx).map(Self::date_from_i32)
    }

    fn vec_from_string_list(list: &ListChunked, row_idx: usize) -> PolarsResult<Vec<String>> {
        if let Some(series) = list.get_as_series(row_idx) {
            Ok(series
                .str()?
                .into_iter()
                .flatten()
                .map(ToOwned::to_owned)
                .collect())
        } else {
            Ok(Vec::new())
        }
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}
