mod args;
mod error;
mod render;
mod transport;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use roster_core::{ApiConfig, Dashboard, DeleteOutcome, ReloadMode, StudentClient, StudentService};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use clap::Parser;

use crate::args::{Cli, Command};
use crate::error::CliError;
use crate::transport::UreqTransport;

fn main() -> ExitCode {
    // A missing .env is fine; variables may come from the shell.
    let _ = dotenvy::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = ApiConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url, origin = %cli.origin, "configured");

    let service = StudentService::new(StudentClient::new(&config.base_url), UreqTransport::new(&cli.origin));
    let command = cli.command;
    let mut dashboard = Dashboard::new(service, config.page_size);

    match command {
        Command::Show { id } => {
            let student = dashboard
                .service()
                .try_fetch_one(&id)?
                .ok_or_else(|| CliError::NotFound(id.to_string()))?;
            print!("{}", render::student(&student));
            return Ok(());
        }
        Command::Add { fname, lname, birth_date } => {
            dashboard.open_create_form();
            if let Some(values) = dashboard.form_values_mut() {
                *values = roster_core::StudentForm::new(fname, lname, birth_date);
            }
            return submit(&mut dashboard);
        }
        Command::Edit { id, fname, lname, birth_date } => {
            let student = dashboard
                .service()
                .try_fetch_one(&id)?
                .ok_or_else(|| CliError::NotFound(id.to_string()))?;
            dashboard.open_edit_form(&student);
            if let Some(values) = dashboard.form_values_mut() {
                if let Some(fname) = fname {
                    values.fname = fname;
                }
                if let Some(lname) = lname {
                    values.lname = lname;
                }
                if let Some(birth_date) = birth_date {
                    values.birth_date = birth_date;
                }
            }
            return submit(&mut dashboard);
        }
        _ => {}
    }

    dashboard.load(ReloadMode::Visible)?;

    match command {
        Command::List { search, year, page } => {
            dashboard.set_search_term(search);
            dashboard.set_year_filter(year);
            dashboard.set_page(page);
            print!("{}", render::table(&dashboard.view()));
        }
        Command::Stats => {
            print!("{}", render::stats(&dashboard.view(), dashboard.last_synced_at()));
        }
        Command::Birthdays => {
            print!("{}", render::birthdays(&dashboard.view().birthdays));
        }
        Command::Years => {
            print!("{}", render::distribution(&dashboard.view().distribution));
        }
        Command::Delete { id, yes } => {
            let student = dashboard
                .find_student(&id)
                .cloned()
                .ok_or_else(|| CliError::NotFound(id.to_string()))?;
            let outcome = dashboard.delete_student(&student, |s| yes || confirm(s));
            report(&dashboard);
            if outcome? == DeleteOutcome::Cancelled {
                println!("Cancelled.");
            }
        }
        Command::Show { .. } | Command::Add { .. } | Command::Edit { .. } => {}
    }
    Ok(())
}

fn submit<T: roster_core::Transport>(dashboard: &mut Dashboard<T>) -> Result<(), CliError> {
    let result = dashboard.submit_form();
    if let Some(form) = dashboard.form().as_open() {
        for message in form.errors.messages() {
            eprintln!("  {message}");
        }
    }
    report(dashboard);
    let saved = result?;
    print!("{}", render::student(&saved));
    if let Some(banner) = dashboard.error() {
        eprintln!("warning: saved, but reloading failed: {banner}");
    }
    Ok(())
}

fn report<T: roster_core::Transport>(dashboard: &Dashboard<T>) {
    if let Some(note) = dashboard.notification(chrono::Utc::now()) {
        eprintln!("{}", render::notification(note));
    }
}

fn confirm(student: &roster_core::Student) -> bool {
    eprint!("Remove {} from the roster? [y/N] ", student.full_name());
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
