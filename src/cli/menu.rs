// Interactive main menu

use anyhow::Result;
use crossterm::style::Stylize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

use super::app::CliApp;
use super::render;
use crate::config::constants::DEFAULT_SEMESTER_START;

/// Line that ends a pasted syllabus (Ctrl-D works too)
const END_MARKER: &str = "END";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddText,
    ScrapeUrl,
    Workload,
    Schedule,
    Notifications,
    Assignments,
    Save,
    Exit,
}

impl MenuChoice {
    const ALL: [(MenuChoice, &'static str); 8] = [
        (MenuChoice::AddText, "Add Course Syllabus (Text)"),
        (MenuChoice::ScrapeUrl, "Scrape Course Page (URL)"),
        (MenuChoice::Workload, "Analyze Workload"),
        (MenuChoice::Schedule, "Generate Study Schedule"),
        (MenuChoice::Notifications, "View Smart Notifications"),
        (MenuChoice::Assignments, "View All Assignments"),
        (MenuChoice::Save, "Save Data"),
        (MenuChoice::Exit, "Exit"),
    ];

    fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).map(|(choice, _)| *choice)
    }
}

pub async fn run_menu(app: &mut CliApp) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    print!("{}", render::banner());

    loop {
        print!("{}", render::heading("═══ Main Menu ═══"));
        for (i, (_, label)) in MenuChoice::ALL.iter().enumerate() {
            println!("  {}  {}", (i + 1).to_string().cyan(), label);
        }

        let line = match rl.readline("\nSelect option [1-8]: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let Some(choice) = MenuChoice::parse(&line) else {
            println!("{}", render::warning("Please enter a number from 1 to 8."));
            continue;
        };
        if choice == MenuChoice::Exit {
            break;
        }

        // A failed action is reported and the menu keeps going
        if let Err(e) = handle(choice, app, &mut rl).await {
            println!("{}", render::failure(&format!("{:#}", e)));
        }
    }

    println!("\n{}\n", "Stay organized! See you soon!".green().bold());
    Ok(())
}

async fn handle(choice: MenuChoice, app: &mut CliApp, rl: &mut DefaultEditor) -> Result<()> {
    match choice {
        MenuChoice::AddText => {
            print!("{}", render::heading("Add Course Syllabus"));
            println!(
                "{}",
                format!(
                    "Paste your syllabus, then a line with only {} (or Ctrl-D):",
                    END_MARKER
                )
                .dark_grey()
            );
            let text = read_block(rl)?;
            if text.trim().is_empty() {
                println!("{}", render::warning("No content provided."));
                return Ok(());
            }
            let start = ask_semester_start(rl)?;
            match app.add_syllabus(&text, &start).await? {
                Some(course) => {
                    println!(
                        "\n{}",
                        render::success(&format!(
                            "Added {} with {} assignments!",
                            course.display_name(),
                            course.assignments.len()
                        ))
                    );
                    print!("{}", render::course_summary(course));
                }
                None => println!("{}", render::failure("Failed to parse syllabus.")),
            }
        }
        MenuChoice::ScrapeUrl => {
            print!("{}", render::heading("Scrape Course Page"));
            let url = rl.readline("Course webpage URL: ")?;
            let start = ask_semester_start(rl)?;
            match app.add_from_url(url.trim(), &start).await {
                Ok(Some(course)) => {
                    println!(
                        "\n{}",
                        render::success(&format!("Scraped and parsed {}!", course.display_name()))
                    );
                    print!("{}", render::course_summary(course));
                }
                Ok(None) => println!("{}", render::failure("Failed to parse scraped content.")),
                Err(e) => println!(
                    "{}",
                    render::warning(&format!("Scraping failed ({:#}). Try manual input instead.", e))
                ),
            }
        }
        MenuChoice::Workload => {
            if app.state().assignments.is_empty() {
                println!("{}", render::warning("No assignments to analyze. Add courses first!"));
                return Ok(());
            }
            print!("{}", render::heading("Workload Analysis"));
            match app.workload().await? {
                Some(analysis) => print!(
                    "{}",
                    render::workload_report(&analysis, app.settings().risk_threshold)
                ),
                None => println!("{}", render::failure("Analysis failed.")),
            }
        }
        MenuChoice::Schedule => {
            if app.state().open_assignments().is_empty() {
                println!("{}", render::warning("No assignments to schedule. Add courses first!"));
                return Ok(());
            }
            let default = app.settings().hours_per_day.to_string();
            let hours = rl.readline_with_initial("Study hours per day: ", (default.as_str(), ""))?;
            let hours: u32 = match hours.trim().parse() {
                Ok(h) => h,
                Err(_) => {
                    println!("{}", render::warning("Not a number; using your saved setting."));
                    app.settings().hours_per_day
                }
            };
            print!("{}", render::heading("Your Study Schedule"));
            match app.schedule(Some(hours)).await? {
                Some(schedule) => print!("{}", render::schedule_report(&schedule)),
                None => println!("{}", render::failure("Schedule generation failed.")),
            }
        }
        MenuChoice::Notifications => {
            if app.state().open_assignments().is_empty() {
                println!("{}", render::warning("No assignments to notify about. Add courses first!"));
                return Ok(());
            }
            print!("{}", render::heading("Smart Notifications"));
            let feed = app.notifications().await?;
            print!("{}", render::notification_feed(&feed));
        }
        MenuChoice::Assignments => print!("{}", render::assignment_table(app.state())),
        MenuChoice::Save => {
            if app.state().courses.is_empty() {
                println!("{}", render::warning("No data to save."));
                return Ok(());
            }
            let path = app.export(Path::new("."))?;
            println!("\n{}", render::success(&format!("Data saved to {}", path.display())));
        }
        MenuChoice::Exit => {}
    }
    Ok(())
}

fn ask_semester_start(rl: &mut DefaultEditor) -> Result<String> {
    let start = rl.readline_with_initial("Semester start date: ", (DEFAULT_SEMESTER_START, ""))?;
    let start = start.trim();
    Ok(if start.is_empty() {
        DEFAULT_SEMESTER_START.to_string()
    } else {
        start.to_string()
    })
}

/// Read lines until the end marker or EOF
fn read_block(rl: &mut DefaultEditor) -> Result<String> {
    let mut lines = Vec::new();
    loop {
        match rl.readline("") {
            Ok(line) if line.trim() == END_MARKER => break,
            Ok(line) => lines.push(line),
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(lines.join("\n"))
}
