use super::{PersistenceError, PersistenceResult};
use crate::recurrence::PeriodType;
use crate::{MaintenancePlan, PlanMetadata, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    metadata: PlanMetadata,
    tasks: Vec<Task>,
}

impl PlanSnapshot {
    fn from_plan(plan: &MaintenancePlan) -> PersistenceResult<Self> {
        let df = plan.dataframe();
        let mut tasks = Vec::with_capacity(df.height());
        for row_idx in 0..df.height() {
            tasks.push(Task::from_dataframe_row(df, row_idx)?);
        }
        super::validate_tasks(&tasks)?;
        Ok(Self {
            metadata: plan.metadata().clone(),
            tasks,
        })
    }

    fn into_plan(self) -> PersistenceResult<MaintenancePlan> {
        super::validate_tasks(&self.tasks)?;
        let mut plan = MaintenancePlan::new_with_metadata(self.metadata);
        for task in self.tasks {
            plan.upsert_task_record(task)?;
        }
        Ok(plan)
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &MaintenancePlan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<MaintenancePlan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: i32,
    name: String,
    equipment: String,
    location: String,
    period_type: String,
    period_value: i64,
    base_date: String,
    last_completed: String,
    next_due: String,
    assignee: String,
    notes: String,
    attachments: String,
    #[serde(default)]
    metadata_json: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        let mut record = TaskCsvRecord::default();
        record.id = task.id;
        record.name = task.name.clone();
        record.equipment = task.equipment.clone().unwrap_or_default();
        record.location = task.location.clone().unwrap_or_default();
        record.period_type = task.period_type.as_str().to_string();
        record.period_value = task.period_value;
        record.base_date = format_date(task.base_date);
        record.last_completed = format_date(task.last_completed);
        record.next_due = format_date(task.next_due);
        record.assignee = task.assignee.clone().unwrap_or_default();
        record.notes = task.notes.clone().unwrap_or_default();
        record.attachments = join_strings(&task.attachments);
        record
    }
}

impl TaskCsvRecord {
    fn metadata_row(plan: &MaintenancePlan) -> PersistenceResult<Self> {
        let metadata_json = serde_json::to_string(plan.metadata())?;
        let mut record = TaskCsvRecord::default();
        record.name = "__metadata__".to_string();
        record.period_type = PeriodType::OnDemand.as_str().to_string();
        record.metadata_json = metadata_json;
        Ok(record)
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_task(self) -> PersistenceResult<Task> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to task".into(),
            ));
        }
        let period_type = PeriodType::from_str(self.period_type.trim()).map_err(|_| {
            PersistenceError::InvalidData(format!("invalid period_type '{}'", self.period_type))
        })?;
        let mut task = Task::new(self.id, self.name, period_type, self.period_value);
        task.equipment = parse_string_option(self.equipment);
        task.location = parse_string_option(self.location);
        task.base_date = parse_date(&self.base_date)?;
        task.last_completed = parse_date(&self.last_completed)?;
        task.next_due = parse_date(&self.next_due)?;
        task.assignee = parse_string_option(self.assignee);
        task.notes = parse_string_option(self.notes);
        task.attachments = split_strings(&self.attachments);
        Ok(task)
    }
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &MaintenancePlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(TaskCsvRecord::metadata_row(plan)?)?;
    let df = plan.dataframe();
    for row_idx in 0..df.height() {
        let task = Task::from_dataframe_row(df, row_idx)?;
        writer.serialize(TaskCsvRecord::from(&task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_plan_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<MaintenancePlan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    let mut metadata: Option<PlanMetadata> = None;
    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if metadata.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
            })?);
            continue;
        }
        tasks.push(record.into_task()?);
    }

    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }

    super::validate_tasks(&tasks)?;

    let mut plan = match metadata {
        Some(metadata) => MaintenancePlan::new_with_metadata(metadata),
        None => MaintenancePlan::new(),
    };
    for task in tasks {
        plan.upsert_task_record(task)?;
    }
    Ok(plan)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn join_strings(values: &[String]) -> String {
    values.join(";")
}

fn split_strings(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(';').map(|s| s.trim().to_string()).collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
