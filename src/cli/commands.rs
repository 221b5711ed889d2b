// Subcommand definitions and dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use std::io::Read;
use std::path::PathBuf;

use super::app::CliApp;
use super::{menu, render};
use crate::config::constants::DEFAULT_SEMESTER_START;
use crate::state::SettingsUpdate;

#[derive(Debug, Parser)]
#[command(
    name = "coursesync",
    version,
    about = "Turn course syllabi into workload analysis, study plans and reminders"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (default)
    Menu,

    /// Add a course from a syllabus file, or stdin when no file is given.
    /// Files ending in .pdf are read as PDFs.
    Add {
        file: Option<PathBuf>,

        /// Read the syllabus from a PDF
        #[arg(long, value_name = "FILE", conflicts_with = "file")]
        pdf: Option<PathBuf>,

        /// Semester start date (YYYY-MM-DD) for resolving relative dates
        #[arg(long, default_value = DEFAULT_SEMESTER_START)]
        semester_start: String,
    },

    /// Scrape a course web page and add it as a course
    Scrape {
        url: String,

        #[arg(long, default_value = DEFAULT_SEMESTER_START)]
        semester_start: String,
    },

    /// Analyze weekly workload and risk weeks
    Workload,

    /// Generate a day-by-day study schedule
    Schedule {
        /// Study hours per day (defaults to the saved setting)
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Show the prioritized notification feed
    Notify,

    /// List courses and assignments
    List,

    /// Set an assignment's progress (0-100)
    Progress {
        /// Assignment index as shown by `list`
        index: usize,
        #[arg(allow_hyphen_values = true)]
        percent: i64,
    },

    /// Remove a course and its assignments
    Remove {
        /// Course index as shown by `list`
        index: usize,
    },

    /// Show settings, or change them with --set key=value
    Settings {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Ask the assistant a question about your courses
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Export assignment deadlines as an ICS calendar
    Calendar {
        /// Output file (defaults to the data directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Save a timestamped snapshot of your courses
    Export {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Run the web API
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
}

/// Run every command except `serve`, which needs the shared server state
pub async fn run_command(command: Command, app: &mut CliApp) -> Result<()> {
    match command {
        Command::Menu => menu::run_menu(app).await?,

        Command::Add {
            file,
            pdf,
            semester_start,
        } => {
            let pdf = pdf.or_else(|| file.clone().filter(|path| is_pdf(path)));
            let added = match pdf {
                Some(path) => app.add_from_pdf(&path, &semester_start).await?,
                None => {
                    let text = read_syllabus(file)?;
                    app.add_syllabus(&text, &semester_start).await?
                }
            };
            match added {
                Some(course) => {
                    println!(
                        "{}",
                        render::success(&format!(
                            "Added {} with {} assignments",
                            course.display_name(),
                            course.assignments.len()
                        ))
                    );
                    print!("{}", render::course_summary(course));
                }
                None => anyhow::bail!("Failed to parse syllabus"),
            }
        }

        Command::Scrape {
            url,
            semester_start,
        } => match app.add_from_url(&url, &semester_start).await? {
            Some(course) => {
                println!(
                    "{}",
                    render::success(&format!("Scraped and parsed {}", course.display_name()))
                );
                print!("{}", render::course_summary(course));
            }
            None => anyhow::bail!("Failed to parse scraped content"),
        },

        Command::Workload => {
            if app.state().assignments.is_empty() {
                println!("{}", render::warning("No assignments to analyze. Add courses first!"));
                return Ok(());
            }
            let analysis = app
                .workload()
                .await?
                .context("The model did not return a usable workload analysis")?;
            print!(
                "{}",
                render::workload_report(&analysis, app.settings().risk_threshold)
            );
        }

        Command::Schedule { hours } => {
            if app.state().open_assignments().is_empty() {
                println!("{}", render::warning("No assignments to schedule. Add courses first!"));
                return Ok(());
            }
            let schedule = app
                .schedule(hours)
                .await?
                .context("The model did not return a usable schedule")?;
            print!("{}", render::schedule_report(&schedule));
        }

        Command::Notify => {
            let feed = app.notifications().await?;
            print!("{}", render::notification_feed(&feed));
        }

        Command::List => {
            print!("{}", render::heading("Courses"));
            print!("{}", render::course_list(app.state()));
            print!("{}", render::assignment_table(app.state()));
            println!("\n{}", render::stats_line(&app.state().stats()).dark_grey());
        }

        Command::Progress { index, percent } => {
            let progress = app.set_progress(index, percent)?;
            println!(
                "{}",
                render::success(&format!("Assignment {} is now {}% done", index, progress))
            );
        }

        Command::Remove { index } => {
            let course = app.remove_course(index)?;
            println!(
                "{}",
                render::success(&format!("Removed {}", course.display_name()))
            );
        }

        Command::Settings { set } => {
            if !set.is_empty() {
                let update = SettingsUpdate::from_pairs(&set)?;
                app.update_settings(&update)?;
                println!("{}", render::success("Settings saved"));
            }
            print!("{}", render::settings_report(app.settings()));
        }

        Command::Ask { question } => {
            let answer = app.ask(&question.join(" ")).await?;
            println!("{}", answer);
        }

        Command::Calendar { out } => {
            if app.state().assignments.is_empty() {
                println!("{}", render::warning("No assignments to export. Add courses first!"));
                return Ok(());
            }
            let (path, export) = app.calendar(out.as_deref())?;
            println!(
                "{}",
                render::success(&format!(
                    "Calendar with {} deadlines saved to {}",
                    export.events,
                    path.display()
                ))
            );
            if export.skipped > 0 {
                println!(
                    "{}",
                    render::warning(&format!(
                        "{} assignments without a valid due date were left out",
                        export.skipped
                    ))
                );
            }
        }

        Command::Export { dir } => {
            if app.state().courses.is_empty() {
                println!("{}", render::warning("No data to save."));
                return Ok(());
            }
            let path = app.export(&dir)?;
            println!(
                "{}",
                render::success(&format!("Data saved to {}", path.display()))
            );
        }

        Command::Serve { .. } => anyhow::bail!("serve is handled by the binary entry point"),
    }
    Ok(())
}

fn is_pdf(path: &std::path::Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn read_syllabus(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read syllabus from stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["coursesync"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_defaults_semester_start() {
        let cli = Cli::try_parse_from(["coursesync", "add", "syllabus.txt"]).unwrap();
        match cli.command {
            Some(Command::Add {
                file,
                pdf,
                semester_start,
            }) => {
                assert_eq!(file, Some(PathBuf::from("syllabus.txt")));
                assert!(pdf.is_none());
                assert_eq!(semester_start, "2025-09-01");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_add_pdf_flag_conflicts_with_file() {
        let cli = Cli::try_parse_from(["coursesync", "add", "--pdf", "math.pdf"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Add { pdf: Some(ref p), .. }) if p == &PathBuf::from("math.pdf")
        ));
        assert!(Cli::try_parse_from(["coursesync", "add", "a.txt", "--pdf", "b.pdf"]).is_err());
    }

    #[test]
    fn test_pdf_extension_detection() {
        assert!(is_pdf(std::path::Path::new("Syllabus.PDF")));
        assert!(!is_pdf(std::path::Path::new("syllabus.txt")));
        assert!(!is_pdf(std::path::Path::new("pdf")));
    }

    #[test]
    fn test_calendar_out_option() {
        let cli = Cli::try_parse_from(["coursesync", "calendar", "--out", "deadlines.ics"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Calendar { out: Some(_) })
        ));
    }

    #[test]
    fn test_progress_accepts_negative() {
        let cli = Cli::try_parse_from(["coursesync", "progress", "2", "-5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Progress {
                index: 2,
                percent: -5
            })
        ));
    }

    #[test]
    fn test_settings_set_pairs() {
        let cli = Cli::try_parse_from([
            "coursesync",
            "settings",
            "--set",
            "hours_per_day=3",
            "--set",
            "notifications_enabled=true",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Settings { set }) => assert_eq!(set.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["coursesync", "ask", "what", "is", "due?"]).unwrap();
        match cli.command {
            Some(Command::Ask { question }) => assert_eq!(question.join(" "), "what is due?"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
