//! Terminal rendering helpers.

use colored::{ColoredString, Colorize};
use launchpad_application::{GenerationPhase, GenerationProgress};
use launchpad_core::notification::{Notification, NotificationLevel};
use launchpad_core::report::{ReportSpec, ReportStatus};
use std::time::Duration;

pub fn status_marker(status: ReportStatus) -> ColoredString {
    match status {
        ReportStatus::Pending => "·".dimmed(),
        ReportStatus::Loading => "◐".cyan(),
        ReportStatus::Complete => "✓".green(),
        ReportStatus::Error => "✗".red(),
    }
}

fn status_label(status: ReportStatus) -> ColoredString {
    match status {
        ReportStatus::Pending => "pending".dimmed(),
        ReportStatus::Loading => "generating".cyan(),
        ReportStatus::Complete => "complete".green(),
        ReportStatus::Error => "failed".red(),
    }
}

fn phase_label(phase: GenerationPhase) -> ColoredString {
    match phase {
        GenerationPhase::Idle => "idle".normal(),
        GenerationPhase::Running => "running".cyan(),
        GenerationPhase::Paused => "paused".yellow(),
        GenerationPhase::Stuck => "stuck".red(),
        GenerationPhase::Complete => "complete".green(),
    }
}

/// Human friendly duration, e.g. `45s` or `3m 05s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

pub fn print_transition(spec: &ReportSpec, status: ReportStatus) {
    println!(
        "  {} {} {}",
        status_marker(status),
        spec.name,
        status_label(status)
    );
}

pub fn print_progress(progress: &GenerationProgress) {
    println!(
        "{} {} ({}/{} complete, {}%)",
        "Session".bold(),
        progress.session_id,
        progress.completed,
        progress.total,
        progress.percent()
    );
    println!("  status: {}", phase_label(progress.phase));

    for row in &progress.rows {
        println!(
            "  {} {:<24} {:<11} ~{}",
            status_marker(row.status),
            row.name,
            status_label(row.status),
            format_duration(row.estimated_duration)
        );
    }

    if progress.failed > 0 {
        println!(
            "{}",
            format!(
                "{} report(s) failed. Run `launchpad generate` again to retry them.",
                progress.failed
            )
            .yellow()
        );
    }
    if progress.is_stuck {
        println!(
            "{}",
            "Generation appears stuck. Run `launchpad generate --restart` to start over.".red()
        );
    }
}

pub fn print_notification(notification: &Notification) {
    let line = format!("{}: {}", notification.title, notification.message);
    match notification.level {
        NotificationLevel::Info => println!("{}", line.blue()),
        NotificationLevel::Success => println!("{}", line.green().bold()),
        NotificationLevel::Error => eprintln!("{}", line.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 00s");
        assert_eq!(format_duration(Duration::from_secs(245)), "4m 05s");
    }
}
