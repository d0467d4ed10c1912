use chrono::{Local, NaiveDate};
use maintenance_tool::{
    PeriodType, RecurrenceError, compute_next_date, next_occurrence, try_next_date,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const RECURRING_TYPES: [PeriodType; 10] = [
    PeriodType::Daily,
    PeriodType::Weekly,
    PeriodType::Monthly,
    PeriodType::Quarterly,
    PeriodType::SemiAnnually,
    PeriodType::Annually,
    PeriodType::CustomDays,
    PeriodType::CustomWeeks,
    PeriodType::CustomMonths,
    PeriodType::CustomYears,
];

#[test]
fn positive_values_advance_strictly_later() {
    let bases = [d(2024, 1, 15), d(2024, 2, 29), d(2025, 12, 31)];
    for base in bases {
        for period_type in RECURRING_TYPES {
            for value in [1, 2, 5] {
                let next = next_occurrence(base, period_type, value);
                assert!(
                    next > base,
                    "{period_type} x{value} from {base} gave {next}"
                );
            }
        }
    }
}

#[test]
fn zero_and_negative_values_return_base_for_every_type() {
    let base = d(2024, 6, 10);
    for (tag, _) in PeriodType::variants() {
        let period_type: PeriodType = tag.parse().unwrap();
        assert_eq!(next_occurrence(base, period_type, 0), base, "{tag} x0");
        assert_eq!(next_occurrence(base, period_type, -5), base, "{tag} x-5");
    }
}

#[test]
fn on_demand_never_advances() {
    let base = d(2024, 6, 10);
    for value in [-3, 0, 1, 12, 1000] {
        assert_eq!(next_occurrence(base, PeriodType::OnDemand, value), base);
    }
}

#[test]
fn custom_aliases_match_their_base_types() {
    let pairs = [
        (PeriodType::Daily, PeriodType::CustomDays),
        (PeriodType::Weekly, PeriodType::CustomWeeks),
        (PeriodType::Monthly, PeriodType::CustomMonths),
        (PeriodType::Annually, PeriodType::CustomYears),
    ];
    let bases = [d(2024, 1, 31), d(2024, 7, 4), d(2023, 11, 30)];
    for base in bases {
        for (canonical, alias) in pairs {
            for value in [1, 3, 7] {
                assert_eq!(
                    next_occurrence(base, canonical, value),
                    next_occurrence(base, alias, value),
                    "{canonical} vs {alias} x{value} from {base}"
                );
            }
        }
    }
}

#[test]
fn quarterly_advances_three_months_per_unit() {
    assert_eq!(
        next_occurrence(d(2024, 1, 15), PeriodType::Quarterly, 1),
        d(2024, 4, 15)
    );
    assert_eq!(
        next_occurrence(d(2024, 1, 15), PeriodType::Quarterly, 2),
        d(2024, 7, 15)
    );
}

#[test]
fn semi_annual_advances_six_months_per_unit() {
    assert_eq!(
        next_occurrence(d(2024, 1, 15), PeriodType::SemiAnnually, 1),
        d(2024, 7, 15)
    );
}

#[test]
fn monthly_clamps_to_end_of_short_month() {
    // 2024 is a leap year
    assert_eq!(
        next_occurrence(d(2024, 1, 31), PeriodType::Monthly, 1),
        d(2024, 2, 29)
    );
    assert_eq!(
        next_occurrence(d(2023, 1, 31), PeriodType::Monthly, 1),
        d(2023, 2, 28)
    );
    assert_eq!(
        next_occurrence(d(2024, 3, 31), PeriodType::Monthly, 1),
        d(2024, 4, 30)
    );
}

#[test]
fn annual_clamps_leap_day_anchor() {
    assert_eq!(
        next_occurrence(d(2024, 2, 29), PeriodType::Annually, 1),
        d(2025, 2, 28)
    );
    assert_eq!(
        next_occurrence(d(2024, 2, 29), PeriodType::Annually, 4),
        d(2028, 2, 29)
    );
}

#[test]
fn daily_advances_across_month_boundary() {
    assert_eq!(
        next_occurrence(d(2024, 3, 10), PeriodType::Daily, 30),
        d(2024, 4, 9)
    );
}

#[test]
fn weekly_advances_seven_days_per_unit() {
    assert_eq!(
        next_occurrence(d(2024, 3, 10), PeriodType::Weekly, 2),
        d(2024, 3, 24)
    );
}

#[test]
fn compute_next_date_returns_iso_strings() {
    assert_eq!(compute_next_date("2024-01-15", "QUARTERLY", 1), "2024-04-15");
    assert_eq!(
        compute_next_date("2024-01-15", "SEMI_ANNUALLY", 1),
        "2024-07-15"
    );
    assert_eq!(compute_next_date("2024-01-31", "MONTHLY", 1), "2024-02-29");
    assert_eq!(compute_next_date("2024-03-10", "DAILY", 30), "2024-04-09");
}

#[test]
fn compute_next_date_is_deterministic() {
    let first = compute_next_date("2024-01-15", "MONTHLY", 3);
    let second = compute_next_date("2024-01-15", "MONTHLY", 3);
    assert_eq!(first, second);
    assert_eq!(first, "2024-04-15");
}

#[test]
fn compute_next_date_ignores_unknown_tags() {
    assert_eq!(compute_next_date("2024-01-15", "FORTNIGHTLY", 1), "2024-01-15");
    assert_eq!(compute_next_date("2024-01-15", "", 1), "2024-01-15");
}

#[test]
fn compute_next_date_ignores_non_positive_values() {
    for (tag, _) in PeriodType::variants() {
        assert_eq!(compute_next_date("2024-01-15", tag, 0), "2024-01-15");
        assert_eq!(compute_next_date("2024-01-15", tag, -5), "2024-01-15");
    }
}

#[test]
fn compute_next_date_keeps_on_demand_unchanged() {
    assert_eq!(compute_next_date("2024-01-15", "ON_DEMAND", 12), "2024-01-15");
}

#[test]
fn compute_next_date_drops_time_of_day_from_rfc3339_input() {
    assert_eq!(
        compute_next_date("2024-01-15T08:30:00Z", "DAILY", 1),
        "2024-01-16"
    );
}

#[test]
fn compute_next_date_substitutes_today_for_bad_base() {
    let before = Local::now().date_naive();
    let result = compute_next_date("not-a-date", "ON_DEMAND", 1);
    let after = Local::now().date_naive();

    let parsed = NaiveDate::parse_from_str(&result, "%Y-%m-%d").unwrap();
    assert!(parsed >= before && parsed <= after);
}

#[test]
fn try_next_date_rejects_bad_base() {
    assert!(matches!(
        try_next_date("not-a-date", "DAILY", 1),
        Err(RecurrenceError::InvalidBaseDate(_))
    ));
}

#[test]
fn try_next_date_rejects_unknown_tag() {
    assert!(matches!(
        try_next_date("2024-01-15", "FORTNIGHTLY", 1),
        Err(RecurrenceError::UnknownPeriodType(_))
    ));
}

#[test]
fn try_next_date_rejects_non_positive_values() {
    assert_eq!(
        try_next_date("2024-01-15", "MONTHLY", 0),
        Err(RecurrenceError::NonPositivePeriodValue(0))
    );
    assert_eq!(
        try_next_date("2024-01-15", "MONTHLY", -2),
        Err(RecurrenceError::NonPositivePeriodValue(-2))
    );
}

#[test]
fn try_next_date_treats_on_demand_as_defined_noop() {
    assert_eq!(
        try_next_date("2024-01-15", "ON_DEMAND", 0),
        Ok(d(2024, 1, 15))
    );
}

#[test]
fn try_next_date_computes_like_the_permissive_api() {
    assert_eq!(
        try_next_date("2024-01-15", "QUARTERLY", 1),
        Ok(d(2024, 4, 15))
    );
}
