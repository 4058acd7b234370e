//! Derived dashboard state.
//!
//! # Design
//! Every value here is recomputed from an immutable snapshot of the roster
//! plus the filter inputs. Nothing is cached: the roster is small and the
//! functions are cheap, so recomputing on every change keeps the derived
//! values trivially consistent with their sources.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::dates;
use crate::types::{Student, YearStat};

pub const DEFAULT_PAGE_SIZE: usize = 8;
pub const UPCOMING_BIRTHDAYS: usize = 4;

/// Birth year filter. `All` passes every student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl YearFilter {
    /// Parse a select value: `"all"` or a year.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(YearFilter::All);
        }
        value.parse().ok().map(YearFilter::Year)
    }
}

/// Search, year filter and page. Changing a filter sends the user back to
/// page 1; replacing the roster does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    year_filter: YearFilter,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            year_filter: YearFilter::All,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn year_filter(&self) -> YearFilter {
        self.year_filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn set_year_filter(&mut self, filter: YearFilter) {
        self.year_filter = filter;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

/// Whether `student` passes both the search term and the year filter.
pub fn matches(student: &Student, search_term: &str, year_filter: YearFilter) -> bool {
    matches_search(student, search_term) && matches_year(student, year_filter)
}

fn matches_search(student: &Student, search_term: &str) -> bool {
    let query = search_term.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    if student.full_name().to_lowercase().contains(&query) {
        return true;
    }
    student
        .id
        .as_ref()
        .is_some_and(|id| id.to_string().contains(&query))
}

fn matches_year(student: &Student, year_filter: YearFilter) -> bool {
    match year_filter {
        YearFilter::All => true,
        YearFilter::Year(year) => birth_local(student).is_some_and(|date| date.year() == year),
    }
}

pub fn filter_students(students: &[Student], search_term: &str, year_filter: YearFilter) -> Vec<Student> {
    students
        .iter()
        .filter(|student| matches(student, search_term, year_filter))
        .cloned()
        .collect()
}

/// Page position and bounds for a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    /// 1-based index of the first visible row, 0 when the page is empty.
    pub start: usize,
    /// 1-based index of the last visible row, 0 when the page is empty.
    pub end: usize,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous_page(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> usize {
        (self.page + 1).min(self.total_pages)
    }
}

/// Slice `[(page-1)*page_size, page*page_size)` of `items`, clamped to its length.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn pagination(total: usize, page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_pages = total.div_ceil(page_size).max(1);
    let visible = total
        .saturating_sub((page - 1).saturating_mul(page_size))
        .min(page_size);
    let (start, end) = if total == 0 || visible == 0 {
        (0, 0)
    } else {
        let start = (page - 1) * page_size + 1;
        (start, start + visible - 1)
    };
    Pagination {
        page,
        page_size,
        total,
        total_pages,
        start,
        end,
    }
}

/// Mean age in years rounded to one decimal, `None` when no birth date parses.
pub fn average_age(students: &[Student], now: DateTime<Utc>) -> Option<f64> {
    let ages: Vec<u32> = students
        .iter()
        .filter_map(|student| student.birth_date.as_deref())
        .filter_map(dates::parse_birth_date)
        .map(|birth| dates::age_in_years(birth, now))
        .collect();
    if ages.is_empty() {
        return None;
    }
    let sum: u64 = ages.iter().map(|age| u64::from(*age)).sum();
    let mean = sum as f64 / ages.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Render an average age the way the stats card shows it.
pub fn format_average_age(average: Option<f64>) -> String {
    match average {
        Some(age) => format!("{age} yrs"),
        None => "—".to_string(),
    }
}

/// A student together with the days left until their next birthday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayEntry {
    pub student: Student,
    pub days_until: i64,
}

impl BirthdayEntry {
    pub fn label(&self) -> String {
        dates::relative_days_label(self.days_until)
    }
}

/// The nearest `UPCOMING_BIRTHDAYS` birthdays, soonest first. Students
/// without a usable birth date are left out.
pub fn upcoming_birthdays(students: &[Student], today: NaiveDate) -> Vec<BirthdayEntry> {
    let mut entries: Vec<BirthdayEntry> = students
        .iter()
        .filter_map(|student| {
            let birth = birth_local(student)?;
            Some(BirthdayEntry {
                student: student.clone(),
                days_until: dates::days_until_next_birthday(birth, today),
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.days_until);
    entries.truncate(UPCOMING_BIRTHDAYS);
    entries
}

/// Distinct birth years, newest first.
pub fn available_years(students: &[Student]) -> Vec<i32> {
    let years: BTreeSet<i32> = students
        .iter()
        .filter_map(birth_local)
        .map(|date| date.year())
        .collect();
    years.into_iter().rev().collect()
}

/// The four headline numbers of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total: usize,
    pub in_view: usize,
    pub average_age: Option<f64>,
    pub next_birthday: Option<NextBirthday>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextBirthday {
    pub name: String,
    pub label: String,
}

impl fmt::Display for NextBirthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.label)
    }
}

pub fn summary_metrics(
    server_count: Option<u64>,
    students: &[Student],
    filtered: usize,
    average_age: Option<f64>,
    birthdays: &[BirthdayEntry],
) -> SummaryMetrics {
    SummaryMetrics {
        total: server_count
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(students.len()),
        in_view: filtered,
        average_age,
        next_birthday: birthdays.first().map(|entry| NextBirthday {
            name: entry.student.full_name(),
            label: entry.label(),
        }),
    }
}

/// One bar of the year distribution chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearBar {
    pub stat: YearStat,
    /// Share of the largest bucket, 0..=100.
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YearDistribution {
    pub bars: Vec<YearBar>,
    pub total: u64,
}

pub fn year_distribution(stats: &[YearStat]) -> YearDistribution {
    let max = stats.iter().map(|stat| stat.value).max().unwrap_or(0);
    let bars = stats
        .iter()
        .map(|stat| YearBar {
            stat: stat.clone(),
            percentage: if max == 0 {
                0
            } else {
                (stat.value as f64 / max as f64 * 100.0).round() as u8
            },
        })
        .collect();
    YearDistribution {
        bars,
        total: stats.iter().map(|stat| stat.value).sum(),
    }
}

/// Everything the dashboard renders, computed from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub filtered: Vec<Student>,
    pub page: Vec<Student>,
    pub pagination: Pagination,
    pub metrics: SummaryMetrics,
    pub birthdays: Vec<BirthdayEntry>,
    pub available_years: Vec<i32>,
    pub distribution: YearDistribution,
}

pub fn compute_view(
    students: &[Student],
    server_count: Option<u64>,
    year_stats: &[YearStat],
    state: &ViewState,
    now: DateTime<Utc>,
) -> DashboardView {
    let filtered = filter_students(students, state.search_term(), state.year_filter());
    let page = paginate(&filtered, state.page(), state.page_size()).to_vec();
    let pagination = pagination(filtered.len(), state.page(), state.page_size());
    let today = now.with_timezone(&Local).date_naive();
    let birthdays = upcoming_birthdays(students, today);
    let metrics = summary_metrics(
        server_count,
        students,
        filtered.len(),
        average_age(students, now),
        &birthdays,
    );
    DashboardView {
        page,
        pagination,
        metrics,
        available_years: available_years(students),
        distribution: year_distribution(year_stats),
        birthdays,
        filtered,
    }
}

fn birth_local(student: &Student) -> Option<NaiveDate> {
    student.birth_date.as_deref().and_then(dates::birth_date_local)
}
