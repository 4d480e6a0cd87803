use crate::config::{Config, default_export_dir, expand_home, parse_hhmm};
use crate::db::Database;
use crate::models::{DEFAULT_MAX_TASKS, UserPreferences, parse_timezone};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

pub fn run_onboarding() -> Result<Config> {
    println!("──────────────────────────────────────────");
    println!("  Welcome to Glow onboarding.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();

    println!("\n[1/4] Daily reminders");
    let notifications_enabled = Confirm::with_theme(&theme)
        .with_prompt("  Send reminders to log your day?")
        .default(true)
        .interact()
        .context("Failed to read reminder prompt input")?;

    let reminder_input: String = Input::with_theme(&theme)
        .with_prompt("  Reminder times (comma separated, HH:MM)")
        .default("09:00,21:00".to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            input
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .try_for_each(|part| parse_hhmm(part).map(|_| ()))
                .map_err(|_| "Use HH:MM entries separated by commas (example: 09:00,21:00)")
        })
        .interact_text()
        .context("Failed to read reminder times")?;
    let reminder_times = reminder_input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    println!("  ✓ Reminders at {}", reminder_times.join(", "));

    println!("\n[2/4] Task limit");
    let max_tasks: usize = Input::with_theme(&theme)
        .with_prompt("  Maximum tasks per day")
        .default(DEFAULT_MAX_TASKS)
        .validate_with(|input: &usize| -> std::result::Result<(), &str> {
            (*input > 0).then_some(()).ok_or("Enter at least 1")
        })
        .interact_text()
        .context("Failed to read task limit")?;
    println!("  ✓ Up to {max_tasks} tasks per day");

    println!("\n[3/4] Timezone");
    let timezone: String = Input::with_theme(&theme)
        .with_prompt("  Timezone (local, UTC, or offset like +09:00)")
        .default("local".to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            (input.trim().eq_ignore_ascii_case("local") || parse_timezone(input).is_some())
                .then_some(())
                .ok_or("Use `local`, `UTC`, or an offset like +09:00")
        })
        .interact_text()
        .context("Failed to read timezone")?;
    println!("  ✓ Days roll over in {timezone}");

    println!("\n[4/4] Export directory");
    let export_dir_input: String = Input::with_theme(&theme)
        .with_prompt("  Folder where exported reports will be saved")
        .default(default_export_dir().display().to_string())
        .interact_text()
        .context("Failed to read export directory")?;
    let export_dir = expand_home(&export_dir_input);
    println!("  ✓ {}", export_dir.display());

    let config = Config {
        export_dir,
        ..Config::load().unwrap_or_default()
    };
    config.ensure_bootstrap_files()?;
    config.save()?;

    let database = Database::open(&config.db_path)?;
    database.put_preferences(&UserPreferences {
        reminder_times,
        notifications_enabled,
        max_tasks,
        timezone: timezone.trim().to_string(),
    })?;

    println!("\n──────────────────────────────────────────");
    println!("  Onboarding complete!");
    println!("  Add today's first task: glow task add \"Plan the day\" --weight 20");
    println!("──────────────────────────────────────────");

    Ok(config)
}
