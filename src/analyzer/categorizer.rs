pub fn canonical_categories() -> Vec<&'static str> {
    vec!["work", "study", "health", "personal", "chores", "other"]
}

/// Maps free-form task categories onto the canonical set.
pub fn normalize_category(raw: &str) -> &'static str {
    match raw.trim().to_lowercase().as_str() {
        "work" | "job" | "office" | "dev" | "development" => "work",
        "study" | "learning" | "reading" | "research" => "study",
        "health" | "exercise" | "fitness" | "sport" | "workout" => "health",
        "personal" | "family" | "social" | "hobby" => "personal",
        "chores" | "home" | "errands" | "housework" => "chores",
        _ => "other",
    }
}

pub fn display_name(category: &str) -> &'static str {
    match normalize_category(category) {
        "work" => "Work",
        "study" => "Study",
        "health" => "Health",
        "personal" => "Personal",
        "chores" => "Chores",
        _ => "Other",
    }
}
