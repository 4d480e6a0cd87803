mod analyzer;
mod api;
mod cli;
mod config;
mod db;
mod models;
mod scheduler;

use crate::analyzer::achievements::{self, History};
use crate::analyzer::report::{percent, render_markdown, save_export_file};
use crate::analyzer::{DraftView, heatmap, scoring, streak, suggestions, weekday};
use crate::cli::onboard::run_onboarding;
use crate::cli::{
    Cli, Commands, ConfigCommands, FocusCommands, PrefsCommands, TaskCommands, TemplateCommands,
    parse_template_entry,
};
use crate::config::{Config, expand_home};
use crate::db::{Database, SharedDatabase};
use crate::models::{FocusSession, Task, Template, UserPreferences};
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => {
            let _ = run_onboarding()?;
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Prefs { command } => handle_prefs_command(command),
        Commands::Task { command } => handle_task_command(command),
        Commands::Template { command } => handle_template_command(command),
        Commands::Save { date, notes } => handle_save(date, notes),
        Commands::Report { date, json } => handle_report(date, json),
        Commands::Discard { report } => handle_discard(&report),
        Commands::Export { date, out } => handle_export(date, out),
        Commands::History { limit } => handle_history(limit),
        Commands::Stats => handle_stats(),
        Commands::Heatmap { days } => handle_heatmap(days),
        Commands::Achievements => handle_achievements(),
        Commands::Suggest => handle_suggest(),
        Commands::Focus { command } => handle_focus_command(command),
        Commands::Status => handle_status(),
        Commands::Doctor => handle_doctor(),
        Commands::Service => {
            let config = load_or_default_config()?;
            run_service(config).await
        }
        Commands::Dashboard => handle_dashboard(),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_prefs_command(command: PrefsCommands) -> Result<()> {
    let (_, database) = open_database()?;

    match command {
        PrefsCommands::Show => {
            let preferences = database.preferences()?;
            println!("Preferences");
            println!("- reminder_times: {}", preferences.reminder_times.join(", "));
            println!(
                "- notifications_enabled: {}",
                preferences.notifications_enabled
            );
            println!("- max_tasks: {}", preferences.max_tasks);
            println!("- timezone: {}", preferences.timezone);
            Ok(())
        }
        PrefsCommands::Set { key, value } => {
            let mut preferences = database.preferences()?;
            preferences.set_value(&key, &value)?;
            database.put_preferences(&preferences)?;

            println!("Preference saved: {key} = {value}");
            Ok(())
        }
        PrefsCommands::Get { key } => {
            let value = database
                .preferences()?
                .get_value(&key)
                .with_context(|| format!("Unsupported preference: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_task_command(command: TaskCommands) -> Result<()> {
    let (_, database) = open_database()?;
    let preferences = database.preferences()?;

    match command {
        TaskCommands::Add {
            title,
            weight,
            category,
            description,
            due,
            estimate,
            done,
            date,
        } => {
            if let Some(due_time) = due.as_deref() {
                config::parse_hhmm(due_time)?;
            }

            let task = Task {
                description,
                category,
                due_time: due,
                estimated_duration: estimate,
                ..Task::new(title, weight).with_completion(done)
            };
            let target_date = parse_optional_date(date, &preferences)?;
            let view = analyzer::add_draft_task(&database, target_date, task)?;
            print_draft(&view);
        }
        TaskCommands::Done {
            task,
            percent,
            date,
        } => {
            let target_date = parse_optional_date(date, &preferences)?;
            let view = analyzer::update_draft_completion(&database, target_date, &task, percent)?;
            print_draft(&view);
        }
        TaskCommands::Remove { task, date } => {
            let target_date = parse_optional_date(date, &preferences)?;
            let removed = analyzer::remove_draft_task(&database, target_date, &task)?;
            println!("Removed task: {}", removed.title);
            print_draft(&analyzer::load_draft(&database, target_date)?);
        }
        TaskCommands::List { date } => {
            let target_date = parse_optional_date(date, &preferences)?;
            print_draft(&analyzer::load_draft(&database, target_date)?);
        }
        TaskCommands::Normalize { date } => {
            let target_date = parse_optional_date(date, &preferences)?;
            let view = analyzer::normalize_draft(&database, target_date)?;
            println!("Weights normalized to 100%");
            print_draft(&view);
        }
    }

    Ok(())
}

fn handle_template_command(command: TemplateCommands) -> Result<()> {
    let (_, database) = open_database()?;

    match command {
        TemplateCommands::Add {
            name,
            tasks,
            description,
        } => {
            let template = Template {
                id: Uuid::new_v4().to_string(),
                name,
                description,
                tasks: tasks
                    .iter()
                    .map(|entry| parse_template_entry(entry))
                    .collect::<Result<Vec<_>>>()?,
                created_at: Utc::now(),
            };
            database.put_template(&template)?;
            println!(
                "Template saved: {} ({} tasks, id {})",
                template.name,
                template.tasks.len(),
                template.id
            );
        }
        TemplateCommands::FromDraft { name, date } => {
            let preferences = database.preferences()?;
            let target_date = parse_optional_date(date, &preferences)?;
            let draft = database.draft_tasks(target_date)?;
            if draft.is_empty() {
                bail!("No draft tasks for {target_date} to build a template from");
            }

            let template = Template {
                id: Uuid::new_v4().to_string(),
                name,
                description: Some(format!("Created from the {target_date} draft")),
                tasks: draft
                    .iter()
                    .map(|task| models::TemplateTask {
                        title: task.title.clone(),
                        weight: task.weight,
                        category: task.category.clone(),
                        estimated_duration: task.estimated_duration,
                    })
                    .collect(),
                created_at: Utc::now(),
            };
            database.put_template(&template)?;
            println!("Template saved: {} (id {})", template.name, template.id);
        }
        TemplateCommands::List => {
            let templates = database.list_templates()?;
            if templates.is_empty() {
                println!("No templates yet");
            }
            templates.iter().for_each(|template| {
                println!(
                    "- {} ({} tasks, {}%) [{}]",
                    template.name,
                    template.tasks.len(),
                    scoring::round2(template.tasks.iter().map(|task| task.weight).sum()),
                    template.id
                );
            });
        }
        TemplateCommands::Show { template } => {
            let template = find_template(&database, &template)?;
            println!("{}", template.name);
            if let Some(description) = template.description.as_deref() {
                println!("{description}");
            }
            template.tasks.iter().enumerate().for_each(|(index, task)| {
                println!(
                    "{}. {} - {}{}",
                    index + 1,
                    task.title,
                    percent(task.weight),
                    task.category
                        .as_deref()
                        .map(|category| format!(" [{category}]"))
                        .unwrap_or_default()
                );
            });
        }
        TemplateCommands::Delete { template } => {
            let template = find_template(&database, &template)?;
            database.delete_template(&template.id)?;
            println!("Template deleted: {}", template.name);
        }
        TemplateCommands::Apply { template, date } => {
            let preferences = database.preferences()?;
            let template = find_template(&database, &template)?;
            let target_date = parse_optional_date(date, &preferences)?;
            let view = analyzer::apply_template(&database, target_date, &template)?;
            print_draft(&view);
        }
    }

    Ok(())
}

fn handle_save(date: Option<String>, notes: Option<String>) -> Result<()> {
    let (_, database) = open_database()?;
    let preferences = database.preferences()?;
    let target_date = parse_optional_date(date, &preferences)?;

    let draft = database.draft_tasks(target_date)?;
    let weight = scoring::total_weight(&draft);
    if !draft.is_empty() && weight != 100.0 {
        warn!(date = %target_date, weight, "draft weights do not sum to 100; run `glow task normalize` to rebalance");
    }

    let report = analyzer::save_daily_report(&database, target_date, notes)?;
    println!(
        "Report saved: {} ({})",
        report.date,
        percent(report.productivity_percent)
    );

    let streak = streak::current_streak(&database.all_reports()?, preferences.today());
    if streak > 0 {
        println!("Current streak: {streak} day(s)");
    }

    Ok(())
}

fn handle_report(date: Option<String>, json: bool) -> Result<()> {
    let (_, database) = open_database()?;
    let preferences = database.preferences()?;
    let target_date = parse_optional_date(date, &preferences)?;

    match database.report_by_date(target_date)? {
        Some(report) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
        Some(report) => print!("{}", render_markdown(&report)),
        None => {
            println!("No report saved for {target_date}");
            let draft = analyzer::load_draft(&database, target_date)?;
            if !draft.tasks.is_empty() {
                print_draft(&draft);
            }
        }
    }

    Ok(())
}

fn handle_discard(reference: &str) -> Result<()> {
    let (_, database) = open_database()?;
    let report = match NaiveDate::parse_from_str(reference, "%Y-%m-%d") {
        Ok(date) => database.report_by_date(date)?,
        Err(_) => database.report(reference)?,
    }
    .with_context(|| format!("No report matches '{reference}'"))?;

    if !database.delete_report(&report.id)? {
        bail!("Report {} was already removed", report.id);
    }

    info!(date = %report.date, id = %report.id, "report discarded");
    println!("Report discarded: {}", report.date);
    Ok(())
}

fn handle_export(date: Option<String>, out: Option<String>) -> Result<()> {
    let (config, database) = open_database()?;
    let preferences = database.preferences()?;
    let target_date = parse_optional_date(date, &preferences)?;
    let export_dir = out
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| config.export_dir.clone());

    let report = database
        .report_by_date(target_date)?
        .with_context(|| format!("No report found for date: {target_date}"))?;
    let path = save_export_file(&report, &export_dir)?;

    info!(date = %target_date, path = %path.display(), "report exported");
    println!("Exported: {}", path.display());
    Ok(())
}

fn handle_history(limit: usize) -> Result<()> {
    let (_, database) = open_database()?;
    let reports = database.list_reports(Some(limit.max(1)))?;

    if reports.is_empty() {
        println!("No saved reports yet");
        return Ok(());
    }

    reports.iter().for_each(|report| {
        println!(
            "{}  {:>7}  {}  {} task(s)",
            report.date,
            percent(report.productivity_percent),
            heatmap::HeatTier::from_productivity(report.productivity_percent).glyph(),
            report.tasks.len()
        );
    });

    Ok(())
}

fn handle_stats() -> Result<()> {
    let (_, database) = open_database()?;
    let today = database.preferences()?.today();
    let dashboard = analyzer::build_dashboard(&database, today)?;

    println!("Glow stats ({today})");
    println!("- reports saved: {}", dashboard.report_count);
    println!(
        "- average productivity: {}",
        percent(dashboard.average_productivity)
    );
    println!("- current streak: {} day(s)", dashboard.streak.current);
    println!("- best streak: {} day(s)", dashboard.streak.best);

    println!("\nBy day of week");
    dashboard.weekdays.iter().for_each(|bucket| {
        let bar = "█".repeat((bucket.average / 5.0).round() as usize);
        println!(
            "{:<9} {:>7} ({} day(s)) {}",
            bucket.name,
            percent(bucket.average),
            bucket.samples,
            bar
        );
    });

    if let Some(best) = weekday::best_day(&dashboard.weekdays) {
        println!("- strongest day: {} ({})", best.name, percent(best.average));
    }
    if let Some(worst) = weekday::worst_day(&dashboard.weekdays) {
        println!("- weakest day: {} ({})", worst.name, percent(worst.average));
    }

    Ok(())
}

fn handle_heatmap(days: Option<u32>) -> Result<()> {
    let (config, database) = open_database()?;
    let today = database.preferences()?.today();
    let window = days.unwrap_or(config.heatmap_days).clamp(7, 366);
    let cells = heatmap::build_heatmap(&database.all_reports()?, today, window);

    println!(
        "Last {window} days ending {today}  (· none  ░ <40%  ▒ 40%+  ▓ 60%+  █ 80%+)"
    );
    heatmap::render_rows(&cells)
        .iter()
        .zip(cells.chunks(7))
        .for_each(|(row, week)| {
            let start = week.first().map(|cell| cell.date.to_string()).unwrap_or_default();
            println!("{start}  {row}");
        });

    Ok(())
}

fn handle_achievements() -> Result<()> {
    let (_, database) = open_database()?;
    let reports = database.all_reports()?;
    let focus_sessions = database.focus_sessions()?;
    let statuses = achievements::evaluate(&History {
        reports: &reports,
        focus_sessions: &focus_sessions,
        today: database.preferences()?.today(),
    });

    let unlocked = statuses.iter().filter(|status| status.unlocked).count();
    println!("Achievements {unlocked}/{}", statuses.len());
    statuses.iter().for_each(|status| {
        let mark = if status.unlocked { "✓" } else { " " };
        println!(
            "[{mark}] {} {} - {} ({:.0}%)",
            status.icon, status.title, status.description, status.progress
        );
    });

    Ok(())
}

fn handle_suggest() -> Result<()> {
    let (_, database) = open_database()?;
    let today = database.preferences()?.today();
    let suggestions = suggestions::generate_suggestions(&database.all_reports()?, today);

    if suggestions.is_empty() {
        println!("Nothing to suggest right now. Keep it up!");
    }
    suggestions.iter().for_each(|suggestion| {
        println!(
            "[{:?}] {}\n    {}",
            suggestion.kind, suggestion.title, suggestion.message
        );
    });

    Ok(())
}

fn handle_focus_command(command: FocusCommands) -> Result<()> {
    let (_, database) = open_database()?;
    let preferences = database.preferences()?;

    match command {
        FocusCommands::Log {
            minutes,
            task,
            abandoned,
            date,
        } => {
            if minutes == 0 {
                bail!("Focus sessions need at least one minute");
            }
            let session = FocusSession {
                id: Uuid::new_v4().to_string(),
                date: parse_optional_date(date, &preferences)?,
                started_at: Utc::now() - chrono::Duration::minutes(i64::from(minutes)),
                duration_minutes: minutes,
                task_id: task,
                completed: !abandoned,
            };
            database.put_focus_session(&session)?;
            println!(
                "Focus session logged: {} min on {}{}",
                session.duration_minutes,
                session.date,
                if session.completed { "" } else { " (abandoned)" }
            );
        }
        FocusCommands::List { date } => {
            let target_date = parse_optional_date(date, &preferences)?;
            let sessions = database.focus_sessions_for_date(target_date)?;
            let total = sessions
                .iter()
                .filter(|session| session.completed)
                .map(|session| session.duration_minutes)
                .sum::<u32>();

            println!(
                "Focus on {target_date}: {} session(s), {total} min completed",
                sessions.len()
            );
            sessions.iter().for_each(|session| {
                println!(
                    "- {} min{}{}",
                    session.duration_minutes,
                    session
                        .task_id
                        .as_deref()
                        .map(|task| format!(" on {task}"))
                        .unwrap_or_default(),
                    if session.completed { "" } else { " (abandoned)" }
                );
            });
        }
    }

    Ok(())
}

fn handle_status() -> Result<()> {
    let (config, database) = open_database()?;
    let preferences = database.preferences()?;
    let today = preferences.today();
    let reports = database.all_reports()?;
    let draft = analyzer::load_draft(&database, today)?;

    println!("Glow status");
    println!("- today: {today}");
    println!(
        "- today's report: {}",
        database
            .report_by_date(today)?
            .map(|report| format!("saved ({})", percent(report.productivity_percent)))
            .unwrap_or_else(|| "not saved".to_string())
    );
    println!(
        "- draft: {} task(s), weight {}, live score {}",
        draft.tasks.len(),
        percent(draft.total_weight),
        percent(draft.productivity)
    );
    println!(
        "- current streak: {} day(s)",
        streak::current_streak(&reports, today)
    );
    println!(
        "- latest_report_date: {}",
        reports
            .first()
            .map(|report| report.date.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("- db_path: {}", config.db_path.display());

    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path();
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    match Database::open(&config.db_path) {
        Ok(database) => {
            println!("[OK] SQLite reachable: {}", config.db_path.display());
            doctor_database(&database, &mut issues)?;
        }
        Err(error) => {
            println!("[WARN] SQLite check failed: {error}");
            issues.push("db unreachable".to_string());
        }
    }

    if config.export_dir.exists() {
        println!("[OK] export dir exists: {}", config.export_dir.display());
    } else {
        println!("[WARN] export dir missing: {}", config.export_dir.display());
        issues.push("export dir missing".to_string());
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

fn doctor_database(database: &Database, issues: &mut Vec<String>) -> Result<()> {
    let preferences = database.preferences()?;

    match scheduler::reminder_schedule(&preferences.reminder_times) {
        Ok(times) if times.is_empty() => {
            println!("[OK] no reminder times configured");
        }
        Ok(times) => {
            println!(
                "[OK] reminder times valid: {}",
                scheduler::describe_schedule(&times)?
            );
        }
        Err(error) => {
            println!("[WARN] invalid reminder time: {error}");
            issues.push("invalid reminder time".to_string());
        }
    }

    let draft = database.draft_tasks(preferences.today())?;
    let weight = scoring::total_weight(&draft);
    if draft.is_empty() || weight == 100.0 {
        println!("[OK] today's draft weights balanced");
    } else {
        println!(
            "[WARN] today's draft weights sum to {} (run `glow task normalize`)",
            percent(weight)
        );
        issues.push("draft weights unbalanced".to_string());
    }

    let duplicates = database
        .all_reports()?
        .iter()
        .fold(HashMap::<NaiveDate, usize>::new(), |mut acc, report| {
            *acc.entry(report.date).or_default() += 1;
            acc
        })
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(date, _)| date.to_string())
        .collect::<Vec<_>>();

    if duplicates.is_empty() {
        println!("[OK] one report per date");
    } else {
        println!(
            "[WARN] multiple reports saved for: {}",
            duplicates.join(", ")
        );
        issues.push("duplicate report dates".to_string());
    }

    Ok(())
}

async fn run_service(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;
    let database = Arc::new(SharedDatabase::new(config.db_path.clone()));
    let shared_config = Arc::new(config);

    let schedule_database = Arc::clone(&database);
    let clock_database = Arc::clone(&database);
    let reminder_database = Arc::clone(&database);

    info!("Glow service started");

    tokio::select! {
        reminder_result = scheduler::run_reminder_scheduler(move || {
            let preferences = schedule_database.with(|database| database.preferences())?;
            if !preferences.notifications_enabled {
                return Ok(Vec::new());
            }

            scheduler::reminder_schedule(&preferences.reminder_times)
        }, move || {
            clock_database
                .with(|database| database.preferences())
                .unwrap_or_default()
                .now()
        }, move |date| {
            let database = Arc::clone(&reminder_database);
            async move { deliver_reminder(&database, date) }
        }) => {
            reminder_result?;
        }
        api_result = api::run_server(shared_config, Arc::clone(&database)) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn deliver_reminder(database: &SharedDatabase, date: NaiveDate) -> Result<()> {
    let (saved, draft) = database.with(|database| {
        Ok((
            database.report_by_date(date)?.is_some(),
            analyzer::load_draft(database, date)?,
        ))
    })?;

    if saved {
        info!(date = %date, "report already saved, reminder skipped");
        return Ok(());
    }

    let body = if draft.tasks.is_empty() {
        "No tasks logged yet today. Take a minute to plan your day.".to_string()
    } else {
        format!(
            "{} task(s) in progress at {}. Update progress and save your report.",
            draft.tasks.len(),
            percent(draft.productivity)
        )
    };

    info!(date = %date, tasks = draft.tasks.len(), "reminder delivered");
    send_desktop_notification("Glow reminder", &body);
    Ok(())
}

#[cfg(target_os = "macos")]
fn send_desktop_notification(title: &str, body: &str) {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        body.replace('"', "'"),
        title.replace('"', "'")
    );

    if let Err(error) = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        warn!(error = %error, "failed to show macOS notification");
    }
}

#[cfg(not(target_os = "macos"))]
fn send_desktop_notification(_title: &str, _body: &str) {}

fn handle_dashboard() -> Result<()> {
    let config = load_or_default_config()?;
    ensure_dashboard_backend(&config)?;
    let url = format!("http://127.0.0.1:{}/api/v1/stats", config.api_port);

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(&url)
            .status()
            .context("Failed to open browser")?;
    }

    println!("Dashboard URL: {url}");
    Ok(())
}

fn ensure_dashboard_backend(config: &Config) -> Result<()> {
    if is_port_open(config.api_port) {
        return Ok(());
    }

    let current_exe =
        std::env::current_exe().context("Failed to resolve current executable path")?;
    let mut command = Command::new(current_exe);
    command
        .arg("service")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null());

    command
        .spawn()
        .context("Failed to spawn dashboard backend process")?;
    thread::sleep(Duration::from_millis(900));

    if !is_port_open(config.api_port) {
        bail!("Failed to start dashboard server. Run `glow service` in a separate terminal.");
    }

    Ok(())
}

fn is_port_open(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpStream::connect_timeout(&addr, Duration::from_millis(250)).is_ok()
}

fn print_draft(view: &DraftView) {
    println!("Draft for {}", view.date);
    if view.tasks.is_empty() {
        println!("- No tasks yet");
        return;
    }

    view.tasks.iter().enumerate().for_each(|(index, task)| {
        println!(
            "{}. {} - weight {}, done {}{}{} [{}]",
            index + 1,
            task.title,
            percent(task.weight),
            percent(task.completion_percent),
            task.category
                .as_deref()
                .map(|category| format!(", {category}"))
                .unwrap_or_default(),
            task.due_time
                .as_deref()
                .map(|due| format!(", due {due}"))
                .unwrap_or_default(),
            &task.id[..8.min(task.id.len())]
        );
    });
    println!(
        "Total weight {} | Productivity {}",
        percent(view.total_weight),
        percent(view.productivity)
    );
}

fn find_template(database: &Database, id_or_name: &str) -> Result<Template> {
    database
        .find_template(id_or_name)?
        .with_context(|| format!("No template matches '{id_or_name}'"))
}

fn parse_optional_date(input: Option<String>, preferences: &UserPreferences) -> Result<NaiveDate> {
    input
        .as_deref()
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date format: {date}. Example: 2026-03-15"))
        })
        .transpose()?
        .map_or_else(|| Ok(preferences.today()), Ok)
}

fn open_database() -> Result<(Config, Database)> {
    let config = load_or_default_config()?;
    let database = Database::open(&config.db_path)?;

    Ok((config, database))
}

fn load_or_default_config() -> Result<Config> {
    let first_run = !Config::config_path().exists();
    let config = Config::load_or_create()?;
    if first_run {
        config.ensure_bootstrap_files()?;
    }

    Ok(config)
}
