//! Plain-text rendering of dashboard views.

use std::fmt::Write as _;

use roster_core::dates;
use roster_core::pipeline::{self, BirthdayEntry, DashboardView, YearDistribution};
use roster_core::{Notification, Student, Tone};

const BAR_WIDTH: usize = 30;

pub fn table(view: &DashboardView) -> String {
    let mut out = String::new();
    if view.page.is_empty() {
        out.push_str("No students match the current filters.\n");
    } else {
        let _ = writeln!(out, "{:<8} {:<24} {:<12} {:>4}", "ID", "NAME", "BORN", "AGE");
        for student in &view.page {
            let _ = writeln!(out, "{}", row(student));
        }
    }
    let p = &view.pagination;
    let _ = writeln!(
        out,
        "Showing {}-{} of {} | page {} / {}",
        p.start, p.end, p.total, p.page, p.total_pages
    );
    out
}

fn row(student: &Student) -> String {
    let birth = student.birth_date.as_deref().and_then(dates::parse_birth_date);
    let born = student
        .birth_date
        .as_deref()
        .and_then(dates::birth_date_local)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string());
    let age = birth
        .map(|birth| dates::age_in_years(birth, chrono::Utc::now()).to_string())
        .unwrap_or_else(|| "—".to_string());
    let id = student
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "—".to_string());
    format!("{id:<8} {:<24} {born:<12} {age:>4}", student.full_name())
}

pub fn stats(view: &DashboardView, last_synced: Option<chrono::DateTime<chrono::Utc>>) -> String {
    let mut out = String::new();
    let m = &view.metrics;
    let _ = writeln!(out, "Total students   {}", m.total);
    let _ = writeln!(out, "In current view  {}", m.in_view);
    let _ = writeln!(out, "Average age      {}", pipeline::format_average_age(m.average_age));
    match &m.next_birthday {
        Some(next) => {
            let _ = writeln!(out, "Next birthday    {next}");
        }
        None => {
            let _ = writeln!(out, "Next birthday    — (no upcoming birthdays)");
        }
    }
    if let Some(at) = last_synced {
        let _ = writeln!(out, "Updated {}", at.with_timezone(&chrono::Local).format("%H:%M"));
    }
    out
}

pub fn birthdays(entries: &[BirthdayEntry]) -> String {
    if entries.is_empty() {
        return "No birthdays on the horizon.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{:<24} {}", entry.student.full_name(), entry.label());
    }
    out
}

pub fn distribution(distribution: &YearDistribution) -> String {
    if distribution.bars.is_empty() {
        return "No enrollment data by academic year yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Total {} students", distribution.total);
    for bar in &distribution.bars {
        let filled = usize::from(bar.percentage) * BAR_WIDTH / 100;
        let _ = writeln!(
            out,
            "{:<8} {:<width$} {} students",
            bar.stat.label.to_string(),
            "#".repeat(filled),
            bar.stat.value,
            width = BAR_WIDTH
        );
    }
    out
}

pub fn student(student: &Student) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", row(student));
    out
}

pub fn notification(notification: &Notification) -> String {
    let tag = match notification.tone {
        Tone::Success => "ok",
        Tone::Info => "info",
        Tone::Danger => "error",
    };
    format!("[{tag}] {}", notification.message)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use roster_core::pipeline::{compute_view, ViewState};
    use roster_core::{StudentId, YearLabel, YearStat};

    use super::*;

    fn view() -> DashboardView {
        let students = vec![Student {
            id: Some(StudentId::Number(1)),
            fname: "Jane".to_string(),
            lname: "Doe".to_string(),
            birth_date: dates::to_iso_date_time("2001-05-10"),
        }];
        let stats = vec![YearStat {
            label: YearLabel::Number(2001),
            value: 1,
        }];
        compute_view(&students, None, &stats, &ViewState::default(), Utc::now())
    }

    #[test]
    fn table_lists_rows_and_range() {
        let out = table(&view());
        assert!(out.contains("Jane Doe"));
        assert!(out.contains("2001-05-10"));
        assert!(out.contains("Showing 1-1 of 1 | page 1 / 1"));
    }

    #[test]
    fn distribution_draws_full_bar_for_largest() {
        let out = distribution(&view().distribution);
        assert!(out.contains(&"#".repeat(BAR_WIDTH)));
        assert!(out.starts_with("Total 1 students"));
    }

    #[test]
    fn empty_birthdays_message() {
        assert_eq!(birthdays(&[]), "No birthdays on the horizon.\n");
    }
}
