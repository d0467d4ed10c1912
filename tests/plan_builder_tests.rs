use chrono::NaiveDate;
use maintenance_tool::{MaintenancePlan, PeriodType, PlanMetadata, Task};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn upsert_with_base_date_computes_next_due_on_insert() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(
        1,
        "HVAC filter change",
        PeriodType::Monthly,
        1,
        Some(d(2024, 1, 15)),
    )
    .unwrap();

    let task = plan.find_task(1).unwrap().unwrap();
    assert_eq!(task.base_date, Some(d(2024, 1, 15)));
    assert_eq!(task.next_due, Some(d(2024, 2, 15)));
}

#[test]
fn upsert_update_path_recomputes_next_due() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(
        1,
        "Pump inspection",
        PeriodType::Monthly,
        1,
        Some(d(2024, 1, 15)),
    )
    .unwrap();

    plan.upsert_task(
        1,
        "Pump inspection",
        PeriodType::Quarterly,
        1,
        Some(d(2024, 1, 15)),
    )
    .unwrap();

    let task = plan.find_task(1).unwrap().unwrap();
    assert_eq!(task.period_type, PeriodType::Quarterly);
    assert_eq!(task.next_due, Some(d(2024, 4, 15)));
}

#[test]
fn negative_period_value_is_rejected() {
    let mut plan = MaintenancePlan::new();
    let err = plan
        .upsert_task(1, "Broken cadence", PeriodType::Weekly, -2, None)
        .unwrap_err();
    assert!(err.to_string().contains("negative period value"));
}

#[test]
fn zero_period_value_is_tolerated() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(1, "Frozen cadence", PeriodType::Weekly, 0, Some(d(2024, 3, 1)))
        .unwrap();

    // No advancement: the due date stays on the anchor.
    let task = plan.find_task(1).unwrap().unwrap();
    assert_eq!(task.next_due, Some(d(2024, 3, 1)));
}

#[test]
fn on_demand_tasks_have_no_next_due() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(
        1,
        "Emergency generator check",
        PeriodType::OnDemand,
        1,
        Some(d(2024, 1, 15)),
    )
    .unwrap();

    let task = plan.find_task(1).unwrap().unwrap();
    assert_eq!(task.next_due, None);
}

#[test]
fn complete_task_advances_from_completion_date() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(
        1,
        "Boiler inspection",
        PeriodType::Quarterly,
        1,
        Some(d(2024, 1, 15)),
    )
    .unwrap();

    plan.complete_task(1, d(2024, 2, 20)).unwrap();

    let task = plan.find_task(1).unwrap().unwrap();
    assert_eq!(task.last_completed, Some(d(2024, 2, 20)));
    // Completion date supersedes the original anchor.
    assert_eq!(task.next_due, Some(d(2024, 5, 20)));
}

#[test]
fn complete_task_unknown_id_errors() {
    let mut plan = MaintenancePlan::new();
    let err = plan.complete_task(42, d(2024, 2, 20)).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn delete_task_removes_row() {
    let mut plan = MaintenancePlan::new();
    plan.upsert_task(1, "A", PeriodType::Monthly, 1, None).unwrap();
    plan.upsert_task(2, "B", PeriodType::Weekly, 2, None).unwrap();

    assert!(plan.delete_task(1).unwrap());
    assert_eq!(plan.dataframe().height(), 1);
    assert!(plan.find_task(1).unwrap().is_none());
    assert!(!plan.delete_task(99).unwrap());
}

#[test]
fn refresh_summary_classifies_tasks() {
    let mut metadata = PlanMetadata::default();
    metadata.due_soon_window_days = 14;
    let mut plan = MaintenancePlan::new_with_metadata(metadata);

    // Overdue: monthly from Jan 1 is due Feb 1, before the Mar 1 reference.
    plan.upsert_task(1, "Overdue", PeriodType::Monthly, 1, Some(d(2024, 1, 1)))
        .unwrap();
    // Due soon: weekly from Feb 28 is due Mar 6, inside the 14-day window.
    plan.upsert_task(2, "DueSoon", PeriodType::Weekly, 1, Some(d(2024, 2, 28)))
        .unwrap();
    // Later: annual from Feb 1 is due in 2025.
    plan.upsert_task(3, "Later", PeriodType::Annually, 1, Some(d(2024, 2, 1)))
        .unwrap();
    // Recurring but never anchored.
    plan.upsert_task(4, "Unscheduled", PeriodType::Monthly, 1, None)
        .unwrap();
    // No cadence at all.
    plan.upsert_task(5, "OnDemand", PeriodType::OnDemand, 0, None)
        .unwrap();

    let summary = plan.refresh_as_of(d(2024, 3, 1)).unwrap();
    assert_eq!(summary.task_count, 5);
    assert_eq!(summary.recurring_count, 4);
    assert_eq!(summary.on_demand_count, 1);
    assert_eq!(summary.unscheduled_count, 1);
    assert_eq!(summary.overdue_count, 1);
    assert_eq!(summary.due_soon_count, 1);
    assert_eq!(summary.next_due, Some(d(2024, 2, 1)));

    let rendered = summary.to_cli_summary();
    assert!(rendered.contains("tasks=5"));
    assert!(rendered.contains("overdue=1"));
    assert!(rendered.contains("next_due=2024-02-01"));
}

#[test]
fn upsert_record_preserves_optional_fields() {
    let mut plan = MaintenancePlan::new();
    let mut task = Task::new(7, "Roof drain clearing", PeriodType::SemiAnnually, 1);
    task.equipment = Some("RD-201".into());
    task.location = Some("Building C roof".into());
    task.base_date = Some(d(2024, 4, 1));
    task.assignee = Some("facilities".into());
    task.notes = Some("Check both drains".into());
    task.attachments = vec!["drain-map.pdf".into()];
    plan.upsert_task_record(task.clone()).unwrap();
    plan.recompute_next_due().unwrap();

    let loaded = plan.find_task(7).unwrap().unwrap();
    assert_eq!(loaded.equipment, task.equipment);
    assert_eq!(loaded.location, task.location);
    assert_eq!(loaded.assignee, task.assignee);
    assert_eq!(loaded.notes, task.notes);
    assert_eq!(loaded.attachments, task.attachments);
    assert_eq!(loaded.next_due, Some(d(2024, 10, 1)));
}

#[test]
fn set_metadata_rejects_negative_window() {
    let mut plan = MaintenancePlan::new();
    let mut metadata = PlanMetadata::default();
    metadata.due_soon_window_days = -1;
    assert!(plan.set_metadata(metadata).is_err());

    plan.set_facility_name("Plant 2");
    assert_eq!(plan.facility_name(), "Plant 2");
}
