//! Command-line parsing.
//!
//! Uses clap derive; the API origin can also come from the environment.

use clap::{Parser, Subcommand};
use roster_core::{StudentId, YearFilter};

use crate::transport::DEFAULT_ORIGIN;

/// Browse and edit the student roster.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Origin that relative API base URLs are resolved against.
    #[arg(long, env = "STUDENT_API_ORIGIN", default_value = DEFAULT_ORIGIN, global = true)]
    pub origin: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List students, filtered and paginated.
    List {
        /// Match against full name or id.
        #[arg(long, default_value = "")]
        search: String,

        /// Birth year, or "all".
        #[arg(long, default_value = "all", value_parser = parse_year)]
        year: YearFilter,

        /// 1-based page number.
        #[arg(long, default_value = "1", value_parser = parse_page)]
        page: usize,
    },

    /// Headline numbers.
    Stats,

    /// The next upcoming birthdays.
    Birthdays,

    /// Students per academic year.
    Years,

    /// Show one student.
    Show {
        #[arg(value_parser = parse_id)]
        id: StudentId,
    },

    /// Add a student.
    Add {
        fname: String,
        lname: String,
        /// YYYY-MM-DD
        birth_date: String,
    },

    /// Change fields of an existing student.
    Edit {
        #[arg(value_parser = parse_id)]
        id: StudentId,

        #[arg(long)]
        fname: Option<String>,

        #[arg(long)]
        lname: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,
    },

    /// Remove a student.
    Delete {
        #[arg(value_parser = parse_id)]
        id: StudentId,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Numeric ids stay numeric so request bodies carry them as numbers.
pub fn parse_id(raw: &str) -> Result<StudentId, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("id must not be empty".to_string());
    }
    Ok(raw
        .parse::<i64>()
        .map(StudentId::Number)
        .unwrap_or_else(|_| StudentId::Text(raw.to_string())))
}

fn parse_year(raw: &str) -> Result<YearFilter, String> {
    YearFilter::parse(raw).ok_or_else(|| format!("expected a year or \"all\", got {raw:?}"))
}

fn parse_page(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .ok()
        .filter(|page| *page > 0)
        .ok_or_else(|| format!("expected a page number from 1, got {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Command {
        let argv = std::iter::once("roster").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    fn rejects(args: &[&str]) -> bool {
        let argv = std::iter::once("roster").chain(args.iter().copied());
        Cli::try_parse_from(argv).is_err()
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults() {
        assert_eq!(
            command(&["list"]),
            Command::List {
                search: String::new(),
                year: YearFilter::All,
                page: 1
            }
        );
    }

    #[test]
    fn list_with_filters() {
        assert_eq!(
            command(&["list", "--year", "2001", "--search", "doe", "--page", "2"]),
            Command::List {
                search: "doe".to_string(),
                year: YearFilter::Year(2001),
                page: 2
            }
        );
    }

    #[test]
    fn add_takes_three_positionals() {
        assert_eq!(
            command(&["add", "Jane", "Doe", "2001-05-10"]),
            Command::Add {
                fname: "Jane".to_string(),
                lname: "Doe".to_string(),
                birth_date: "2001-05-10".to_string()
            }
        );
        assert!(rejects(&["add", "Jane"]));
    }

    #[test]
    fn edit_options_may_precede_the_id() {
        assert_eq!(
            command(&["edit", "--fname", "Jane", "4"]),
            Command::Edit {
                id: StudentId::Number(4),
                fname: Some("Jane".to_string()),
                lname: None,
                birth_date: None
            }
        );
        assert_eq!(
            command(&["edit", "4", "--lname", "Roe", "--birth-date", "1999-12-31"]),
            Command::Edit {
                id: StudentId::Number(4),
                fname: None,
                lname: Some("Roe".to_string()),
                birth_date: Some("1999-12-31".to_string())
            }
        );
    }

    #[test]
    fn delete_short_flag_before_id() {
        assert_eq!(
            command(&["delete", "-y", "7"]),
            Command::Delete {
                id: StudentId::Number(7),
                yes: true
            }
        );
        assert_eq!(
            command(&["delete", "abc"]),
            Command::Delete {
                id: StudentId::Text("abc".to_string()),
                yes: false
            }
        );
    }

    #[test]
    fn origin_flag_is_global() {
        let cli = Cli::try_parse_from(["roster", "stats", "--origin", "http://school.test"]).unwrap();
        assert_eq!(cli.origin, "http://school.test");
        assert_eq!(cli.command, Command::Stats);
    }

    #[test]
    fn rejects_unknown_and_invalid_arguments() {
        assert!(rejects(&["promote", "3"]));
        assert!(rejects(&["stats", "--verbose"]));
        assert!(rejects(&["list", "--page", "0"]));
        assert!(rejects(&["list", "--year", "soon"]));
        assert!(rejects(&["show", " "]));
        assert!(rejects(&[]));
    }
}
