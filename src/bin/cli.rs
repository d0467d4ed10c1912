use chrono::{Local, NaiveDate};
use maintenance_tool::{
    MaintenancePlan, PeriodType, PlanMetadataError, compute_next_date, load_plan_from_csv,
    load_plan_from_json, save_plan_to_csv, save_plan_to_json,
};
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use std::str::FromStr;

fn parse_attachment_list(s: &str) -> Vec<String> {
    s.split(';')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    // Compute column widths
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = render_any_value(av, col.name().as_str());
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    // Build output
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    // Header
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    // Rows
    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let mut s = String::new();
            if let Ok(ref av) = col.get(row_idx) {
                s = render_any_value(av, col.name().as_str());
            }
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_any_value(av: &AnyValue, column_name: &str) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::List(inner) if column_name == "attachments" => {
            if let Ok(ca) = inner.str() {
                ca.into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(";")
            } else {
                av.to_string()
            }
        }
        _ => av.to_string(),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current plan\n  new                                Append empty on-demand task with next id\n  add <id> <name> <type> <value> [YYYY-MM-DD]\n                                     Upsert a task (type like MONTHLY, optional base date)\n  delete <id>                        Delete a task\n  complete <id> <YYYY-MM-DD>         Record a completion and advance next_due\n  base    <id> <YYYY-MM-DD>          Set base_date\n  last    <id> <YYYY-MM-DD>          Set last_completed\n  period  <id> <type> <value>        Change a task's cadence\n  equip   <id> <tag>                 Set equipment\n  loc     <id> <text...>             Set location (rest of line)\n  assignee <id> <name>               Set assignee\n  notes   <id> <text...>             Set notes (rest of line)\n  attach  <id> <a;b;c>               Set attachments (semicolon separated)\n  types                              List available period types\n  next <YYYY-MM-DD|today> <type> <value>\n                                     Compute a one-off next occurrence date\n  meta show                          Show facility metadata\n  meta name <text...>                Update facility name\n  meta desc <text...>                Update facility description\n  meta window <days>                 Update due-soon window\n  save <json|csv> <path>             Persist plan to disk\n  load <json|csv> <path>             Load plan from disk\n  compute [YYYY-MM-DD]               Recompute due dates and summarize (default today)\n  quit|exit                          Exit"
    );
}

fn print_period_types() {
    println!("Available period types:");
    for (tag, description) in PeriodType::variants() {
        println!("  {:<16} {}", tag, description);
    }
}

fn print_metadata(plan: &MaintenancePlan) {
    let metadata = plan.metadata();
    println!("Facility name       : {}", metadata.facility_name);
    println!("Facility description: {}", metadata.facility_description);
    println!("Due-soon window days: {}", metadata.due_soon_window_days);
}

fn next_id(plan: &MaintenancePlan) -> i32 {
    if plan.dataframe().height() == 0 {
        return 1;
    }
    plan.dataframe()
        .column("id")
        .ok()
        .and_then(|s| s.i32().ok())
        .and_then(|ca| ca.into_iter().flatten().max())
        .map(|m| m + 1)
        .unwrap_or(1)
}

fn parse_task_id(input: &str) -> Option<i32> {
    match input.parse::<i32>() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Invalid id");
            None
        }
    }
}

fn parse_cli_date(input: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            println!("Invalid date (YYYY-MM-DD)");
            None
        }
    }
}

fn parse_period_type(input: &str) -> Option<PeriodType> {
    match PeriodType::from_str(input) {
        Ok(period) => Some(period),
        Err(_) => {
            println!("Unknown period type '{}'. Use 'types' to list options.", input);
            None
        }
    }
}

fn main() {
    let mut plan = MaintenancePlan::new();

    println!("Maintenance Tool (CLI) - type 'help' for commands\n");
    println!("{}", render_df_as_text_table(plan.dataframe()));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => {
                println!("{}", render_df_as_text_table(plan.dataframe()));
            }
            "types" => {
                print_period_types();
            }
            "new" => {
                let id = next_id(&plan);
                let _ = plan.upsert_task(id, "", PeriodType::OnDemand, 0, None);
                println!("Added empty task id={}", id);
                println!("{}", render_df_as_text_table(plan.dataframe()));
            }
            "delete" => match parts.next() {
                Some(id_s) => {
                    let Some(id) = parse_task_id(id_s) else {
                        continue;
                    };
                    match plan.delete_task(id) {
                        Ok(true) => {
                            println!("Deleted task {id}.");
                            println!("{}", render_df_as_text_table(plan.dataframe()));
                        }
                        Ok(false) => println!("Task {id} not found."),
                        Err(e) => println!("Error deleting task: {}", e),
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "add" => {
                let id_s = parts.next();
                let name_s = parts.next();
                let type_s = parts.next();
                let value_s = parts.next();
                let base_s = parts.next();
                match (id_s, name_s, type_s, value_s) {
                    (Some(id_s), Some(name), Some(type_s), Some(value_s)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let Some(period_type) = parse_period_type(type_s) else {
                            continue;
                        };
                        let period_value: i64 = match value_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid period value");
                                continue;
                            }
                        };
                        let base_date = match base_s {
                            Some(base_s) => match parse_cli_date(base_s) {
                                Some(date) => Some(date),
                                None => continue,
                            },
                            None => None,
                        };
                        match plan.upsert_task(id, name, period_type, period_value, base_date) {
                            Ok(_) => {
                                println!("Task upserted.");
                                println!("{}", render_df_as_text_table(plan.dataframe()));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => {
                        println!("Usage: add <id> <name> <type> <value> [YYYY-MM-DD]");
                    }
                }
            }
            "complete" => {
                let id_s = parts.next();
                let date_s = parts.next();
                match (id_s, date_s) {
                    (Some(id_s), Some(date_s)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let Some(date) = parse_cli_date(date_s) else {
                            continue;
                        };
                        match plan.complete_task(id, date) {
                            Ok(_) => {
                                println!("Completion recorded.");
                                println!("{}", render_df_as_text_table(plan.dataframe()));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: complete <id> <YYYY-MM-DD>"),
                }
            }
            "base" | "last" => {
                let id_s = parts.next();
                let date_s = parts.next();
                match (id_s, date_s) {
                    (Some(id_s), Some(date_s)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let Some(date) = parse_cli_date(date_s) else {
                            continue;
                        };
                        let res = match cmd {
                            "base" => plan.set_base_date(id, date),
                            _ => plan.set_last_completed(id, date),
                        };
                        match res {
                            Ok(_) => println!(
                                "{} set.\n{}",
                                cmd,
                                render_df_as_text_table(plan.dataframe())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: {} <id> <YYYY-MM-DD>", cmd),
                }
            }
            "period" => {
                let id_s = parts.next();
                let type_s = parts.next();
                let value_s = parts.next();
                match (id_s, type_s, value_s) {
                    (Some(id_s), Some(type_s), Some(value_s)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let Some(period_type) = parse_period_type(type_s) else {
                            continue;
                        };
                        let period_value: i64 = match value_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid period value");
                                continue;
                            }
                        };
                        match plan.set_period(id, period_type, period_value) {
                            Ok(_) => println!(
                                "period set.\n{}",
                                render_df_as_text_table(plan.dataframe())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: period <id> <type> <value>"),
                }
            }
            "equip" | "assignee" => {
                let id_s = parts.next();
                let value = parts.next();
                match (id_s, value) {
                    (Some(id_s), Some(value)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let res = match cmd {
                            "equip" => plan.set_equipment(id, value),
                            _ => plan.set_assignee(id, value),
                        };
                        match res {
                            Ok(_) => println!(
                                "{} set.\n{}",
                                cmd,
                                render_df_as_text_table(plan.dataframe())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: {} <id> <value>", cmd),
                }
            }
            "loc" | "notes" => {
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id_s, !rest.is_empty()) {
                    (Some(id_s), true) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let text = rest.join(" ");
                        let res = match cmd {
                            "loc" => plan.set_location(id, &text),
                            _ => plan.set_notes(id, &text),
                        };
                        match res {
                            Ok(_) => println!(
                                "{} set.\n{}",
                                cmd,
                                render_df_as_text_table(plan.dataframe())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: {} <id> <text...>", cmd),
                }
            }
            "attach" => {
                let id_s = parts.next();
                let csv_s = parts.next();
                match (id_s, csv_s) {
                    (Some(id_s), Some(csv_s)) => {
                        let Some(id) = parse_task_id(id_s) else {
                            continue;
                        };
                        let attachments = parse_attachment_list(csv_s);
                        match plan.set_attachments(id, attachments) {
                            Ok(_) => println!(
                                "attachments set.\n{}",
                                render_df_as_text_table(plan.dataframe())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: attach <id> <a;b;c>"),
                }
            }
            "next" => {
                let base_s = parts.next();
                let type_s = parts.next();
                let value_s = parts.next();
                match (base_s, type_s, value_s) {
                    (Some(base_s), Some(type_s), Some(value_s)) => {
                        let period_value: i64 = match value_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid period value");
                                continue;
                            }
                        };
                        let base = if base_s == "today" {
                            Local::now().date_naive().format("%Y-%m-%d").to_string()
                        } else {
                            base_s.to_string()
                        };
                        println!("{}", compute_next_date(&base, type_s, period_value));
                    }
                    _ => println!("Usage: next <YYYY-MM-DD|today> <type> <value>"),
                }
            }
            "compute" => {
                let as_of = match parts.next() {
                    Some(date_s) => match parse_cli_date(date_s) {
                        Some(date) => date,
                        None => continue,
                    },
                    None => Local::now().date_naive(),
                };
                match plan.refresh_as_of(as_of) {
                    Ok(summary) => {
                        println!(
                            "Refreshed ({})\n{}",
                            summary.to_cli_summary(),
                            render_df_as_text_table(plan.dataframe())
                        );
                    }
                    Err(e) => println!("Refresh error: {}", e),
                }
            }
            "meta" => match parts.next() {
                Some("show") | None => print_metadata(&plan),
                Some("name") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta name <text...>");
                        continue;
                    }
                    let name = rest.join(" ");
                    plan.set_facility_name(name);
                    println!("Facility name updated.");
                    print_metadata(&plan);
                }
                Some("desc") => {
                    let rest: Vec<&str> = parts.collect();
                    if rest.is_empty() {
                        println!("Usage: meta desc <text...>");
                        continue;
                    }
                    let desc = rest.join(" ");
                    plan.set_facility_description(desc);
                    println!("Facility description updated.");
                    print_metadata(&plan);
                }
                Some("window") => match parts.next() {
                    Some(days_s) => {
                        let days: i64 = match days_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid day count");
                                continue;
                            }
                        };
                        match plan.set_due_soon_window_days(days) {
                            Ok(_) => {
                                println!("Due-soon window updated.");
                                print_metadata(&plan);
                            }
                            Err(PlanMetadataError::NegativeDueSoonWindow { .. }) => {
                                println!("Due-soon window must be zero or more days.");
                            }
                        }
                    }
                    None => println!("Usage: meta window <days>"),
                },
                Some(other) => {
                    println!("Unknown meta command '{}'.", other);
                    println!("Usage: meta show|name|desc|window ...");
                }
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_plan_to_json(&plan, path) {
                        Ok(_) => println!("Plan saved to {}.", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_plan_to_csv(&plan, path) {
                        Ok(_) => println!("Plan saved to {}.", path),
                        Err(e) => println!("Error saving plan: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_plan_from_json(path) {
                        Ok(mut loaded) => {
                            if let Err(e) = loaded.recompute_next_due() {
                                println!("Loaded plan but recompute failed: {}", e);
                            }
                            plan = loaded;
                            println!("Plan loaded from {}.", path);
                            println!("{}", render_df_as_text_table(plan.dataframe()));
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_plan_from_csv(path) {
                        Ok(mut loaded) => {
                            if let Err(e) = loaded.recompute_next_due() {
                                println!("Loaded plan but recompute failed: {}", e);
                            }
                            plan = loaded;
                            println!("Plan loaded from {}.", path);
                            println!("{}", render_df_as_text_table(plan.dataframe()));
                        }
                        Err(e) => println!("Error loading plan: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
