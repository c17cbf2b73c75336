use chrono::Utc;
use colored::*;
use console::style;
use fretpad::model::UserProfile;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

/// Render the profile table: marker, name, short id, last-active age.
pub fn print_users(users: &[UserProfile], current: Option<Uuid>) {
    if users.is_empty() {
        println!("No profiles.");
        return;
    }

    let name_width = users
        .iter()
        .map(|u| UnicodeWidthStr::width(u.name.as_str()))
        .max()
        .unwrap_or(0);

    let formatter = timeago::Formatter::new();
    let now = Utc::now();

    for user in users {
        let is_current = current == Some(user.id);
        let marker = if is_current { "*" } else { " " };
        let age = now
            .signed_duration_since(user.last_active)
            .to_std()
            .map(|d| formatter.convert(d))
            .unwrap_or_else(|_| "just now".to_string());

        let padding = name_width - UnicodeWidthStr::width(user.name.as_str());
        let name = if is_current {
            user.name.bold().green().to_string()
        } else {
            user.name.normal().to_string()
        };
        let short_id = &user.id.to_string()[..8];
        println!(
            "{} {}{} {} {}",
            marker,
            name,
            " ".repeat(padding),
            short_id.dimmed(),
            format!("active {}", age).dimmed()
        );
    }
}

pub fn print_user_details(user: &UserProfile) {
    println!("{}", user.name.bold());
    println!("  id          {}", user.id);
    if let Some(email) = &user.email {
        println!("  email       {}", email);
    }
    println!("  created     {}", user.created_at.format("%Y-%m-%d"));
    println!("  last active {}", user.last_active.format("%Y-%m-%d %H:%M"));
    println!("  trainings   {}", user.data.trainings.len());
    println!("  playlists   {}", user.data.tabs.playlists.len());
}

pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow(), message);
}
