use chrono::NaiveDate;
use maintenance_tool::{
    MaintenancePlan, PeriodType, PersistenceError, PlanMetadata, Task, load_plan_from_csv,
    load_plan_from_json, save_plan_to_csv, save_plan_to_json,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn build_sample_plan() -> MaintenancePlan {
    let mut metadata = PlanMetadata::default();
    metadata.facility_name = "Export Facility".into();
    metadata.facility_description = "Testing persistence helpers".into();
    metadata.due_soon_window_days = 30;

    let mut plan = MaintenancePlan::new_with_metadata(metadata);

    let mut task1 = Task::new(1, "Fire extinguisher check", PeriodType::Monthly, 1);
    task1.equipment = Some("FE-lobby".into());
    task1.base_date = Some(d(2025, 1, 6));
    task1.notes = Some("All floors".into());
    task1.attachments = vec!["extinguisher-map.pdf".into()];
    plan.upsert_task_record(task1).unwrap();

    let mut task2 = Task::new(2, "Elevator load test", PeriodType::Annually, 1);
    task2.location = Some("Tower A".into());
    task2.base_date = Some(d(2025, 2, 1));
    task2.last_completed = Some(d(2025, 2, 10));
    task2.assignee = Some("vendor:liftco".into());
    plan.upsert_task_record(task2).unwrap();

    plan.recompute_next_due().unwrap();
    plan
}

fn collect_tasks(plan: &MaintenancePlan) -> Vec<Task> {
    plan.tasks().unwrap()
}

#[test]
fn json_round_trip_preserves_plan() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_json(&plan, file.path()).unwrap();
    let loaded = load_plan_from_json(file.path()).unwrap();

    assert_eq!(loaded.metadata().facility_name, "Export Facility");
    assert_eq!(loaded.metadata().due_soon_window_days, 30);
    assert_eq!(collect_tasks(&loaded), collect_tasks(&plan));
}

#[test]
fn csv_round_trip_preserves_plan() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_csv(&plan, file.path()).unwrap();
    let loaded = load_plan_from_csv(file.path()).unwrap();

    assert_eq!(loaded.metadata().facility_name, "Export Facility");
    assert_eq!(collect_tasks(&loaded), collect_tasks(&plan));
}

#[test]
fn csv_round_trip_keeps_cadence_fields() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_csv(&plan, file.path()).unwrap();
    let loaded = load_plan_from_csv(file.path()).unwrap();

    let task = loaded.find_task(2).unwrap().unwrap();
    assert_eq!(task.period_type, PeriodType::Annually);
    assert_eq!(task.period_value, 1);
    assert_eq!(task.last_completed, Some(d(2025, 2, 10)));
    assert_eq!(task.next_due, Some(d(2026, 2, 10)));
}

#[test]
fn csv_load_rejects_duplicate_ids() {
    let mut csv_text = String::new();
    csv_text.push_str(
        "id,name,equipment,location,period_type,period_value,base_date,last_completed,next_due,assignee,notes,attachments,metadata_json\n",
    );
    csv_text.push_str("1,A,,,MONTHLY,1,2025-01-01,,,,,,\n");
    csv_text.push_str("1,B,,,WEEKLY,1,2025-01-01,,,,,,\n");

    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), csv_text).unwrap();

    let err = load_plan_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
    assert!(err.to_string().contains("duplicate task id"));
}

#[test]
fn csv_load_rejects_unknown_period_type() {
    let mut csv_text = String::new();
    csv_text.push_str(
        "id,name,equipment,location,period_type,period_value,base_date,last_completed,next_due,assignee,notes,attachments,metadata_json\n",
    );
    csv_text.push_str("1,A,,,FORTNIGHTLY,1,2025-01-01,,,,,,\n");

    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), csv_text).unwrap();

    let err = load_plan_from_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("invalid period_type"));
}

#[test]
fn csv_load_without_tasks_is_invalid() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "id,name,equipment,location,period_type,period_value,base_date,last_completed,next_due,assignee,notes,attachments,metadata_json\n",
    )
    .unwrap();

    let err = load_plan_from_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("no tasks"));
}

#[test]
fn json_load_missing_file_is_io_error() {
    let err = load_plan_from_json("/nonexistent/plan.json").unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}
