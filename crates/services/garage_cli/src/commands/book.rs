use chrono::Datelike;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use garage_booking::calendar::CalendarFlow;
use garage_booking::models::{BookingSubmissionResult, DraftField};
use garage_booking::registration::{Registration, PART1_MAX, PART2_MAX, PART3_MAX};
use garage_booking::stepper::{Step, StepperFlow};
use garage_booking::BookingFactory;
use garage_common::{Context, GarageError};
use garage_config::{AppConfig, FlowVariant};

type CliResult = Result<(), GarageError>;

pub async fn run(config: &AppConfig, flow: Option<FlowVariant>) -> CliResult {
    let factory = BookingFactory::from_config(config)?;
    match flow.unwrap_or(factory.flow()) {
        FlowVariant::Stepper => run_stepper(factory.stepper()).await,
        FlowVariant::Calendar => run_calendar(factory.calendar()).await,
    }
}

fn prompt(label: &str, initial: &str, allow_empty: bool) -> Result<String, GarageError> {
    Input::<String>::new()
        .with_prompt(label)
        .with_initial_text(initial)
        .allow_empty(allow_empty)
        .interact_text()
        .context("Reading input")
}

fn print_steps(current: Step) {
    let line: Vec<String> = Step::ALL
        .iter()
        .map(|step| match step.cmp(&current) {
            std::cmp::Ordering::Less => step.label().green().to_string(),
            std::cmp::Ordering::Equal => step.label().bold().underline().to_string(),
            std::cmp::Ordering::Greater => step.label().dimmed().to_string(),
        })
        .collect();
    println!();
    println!("{}", line.join("  >  "));
    println!();
}

// --- Stepper ---

async fn run_stepper(mut flow: StepperFlow) -> CliResult {
    println!("{}", "Garage Booking".bold());
    loop {
        print_steps(flow.step());
        match flow.step() {
            Step::PersonalInfo => {
                personal_info(&mut flow)?;
                if let Err(e) = flow.next().await {
                    println!("{}", e.to_string().yellow());
                }
            }
            Step::DateTime => {
                if !date_and_time(&mut flow).await? {
                    return Ok(());
                }
            }
            Step::ServiceDetails => {
                if !service_details(&mut flow).await? {
                    return Ok(());
                }
            }
            Step::Confirmation => {
                println!("{}", "Booking Confirmed!".green().bold());
                if let Some(message) = flow.confirmation_message() {
                    println!("{message}");
                }
                let again = Confirm::new()
                    .with_prompt("Start a new booking?")
                    .default(false)
                    .interact()
                    .context("Reading choice")?;
                if !again {
                    return Ok(());
                }
                flow.start_new();
            }
        }
    }
}

fn personal_info(flow: &mut StepperFlow) -> CliResult {
    let draft = flow.draft().clone();
    let (part1, part2, part3) = match &draft.registration {
        Registration::Parts(parts) => {
            let (a, b, c) = parts.parts();
            (a.to_string(), b.to_string(), c.to_string())
        }
        _ => Default::default(),
    };
    let fields = [
        (DraftField::Name, "Name", draft.name),
        (DraftField::Email, "Email", draft.email),
        (DraftField::Phone, "Phone", draft.phone),
        (
            DraftField::RegistrationPart1,
            "Registration year (digits)",
            part1,
        ),
        (
            DraftField::RegistrationPart2,
            "Registration county (letters)",
            part2,
        ),
        (
            DraftField::RegistrationPart3,
            "Registration number (digits)",
            part3,
        ),
        (DraftField::Make, "Make", draft.make),
        (DraftField::Model, "Model", draft.model),
    ];
    for (field, label, initial) in fields {
        let value = prompt(label, &initial, false)?;
        flow.edit(field, &value);
        let max = match field {
            DraftField::RegistrationPart1 => Some(PART1_MAX),
            DraftField::RegistrationPart2 => Some(PART2_MAX),
            DraftField::RegistrationPart3 => Some(PART3_MAX),
            _ => None,
        };
        if let Some(max) = max {
            if value.chars().count() > max {
                println!("{}", format!("Only the first {max} characters are kept.").dimmed());
            }
        }
    }
    Ok(())
}

/// Returns false when the user quits.
async fn date_and_time(flow: &mut StepperFlow) -> Result<bool, GarageError> {
    if let Some(message) = flow.availability().error_message() {
        println!("{}", message.red());
        let choice = Select::new()
            .with_prompt("Availability")
            .items(&["Try again", "Back", "Quit"])
            .default(0)
            .interact()
            .context("Reading choice")?;
        match choice {
            0 => flow.refresh_availability().await,
            1 => {
                flow.back().await?;
            }
            _ => return Ok(false),
        }
        return Ok(true);
    }

    let dates = flow.selectable_dates();
    if dates.is_empty() {
        println!("{}", "No dates are available in the booking window.".yellow());
        flow.back().await?;
        return Ok(true);
    }
    let mut items: Vec<String> = dates
        .iter()
        .map(|d| d.format("%a %d %b %Y").to_string())
        .collect();
    items.push("Back".to_string());
    let default = flow
        .draft()
        .date
        .and_then(|selected| dates.iter().position(|d| *d == selected))
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Date")
        .items(&items)
        .default(default)
        .max_length(10)
        .interact()
        .context("Reading choice")?;
    let Some(date) = dates.get(idx).copied() else {
        flow.back().await?;
        return Ok(true);
    };
    if flow.draft().date != Some(date) {
        flow.select_date(date)?;
    }

    let slots = flow.time_slots();
    let labels: Vec<String> = slots
        .iter()
        .map(|slot| {
            if !slot.bookable {
                format!("{} (full)", slot.label).dimmed().to_string()
            } else if slot.busy {
                format!("{} (busy)", slot.label).yellow().to_string()
            } else {
                slot.label.clone()
            }
        })
        .collect();
    let idx = Select::new()
        .with_prompt("Time")
        .items(&labels)
        .default(0)
        .interact()
        .context("Reading choice")?;
    if let Some(slot) = slots.get(idx) {
        if let Err(e) = flow.select_time(&slot.label) {
            println!("{}", e.to_string().yellow());
            return Ok(true);
        }
    }
    if let Err(e) = flow.next().await {
        println!("{}", e.to_string().yellow());
    }
    Ok(true)
}

/// Returns false when the user quits.
async fn service_details(flow: &mut StepperFlow) -> Result<bool, GarageError> {
    let service = prompt("Service required", &flow.draft().service, false)?;
    flow.edit(DraftField::Service, &service);
    let notes = prompt("Notes", &flow.draft().notes, true)?;
    flow.edit(DraftField::Notes, &notes);

    let choice = Select::new()
        .with_prompt("Ready?")
        .items(&["Submit booking", "Back", "Quit"])
        .default(0)
        .interact()
        .context("Reading choice")?;
    match choice {
        0 => {
            if let BookingSubmissionResult::Failed { message } = flow.submit().await {
                println!("{}", message.red());
            }
        }
        1 => {
            flow.back().await?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

// --- Calendar ---

async fn run_calendar(mut flow: CalendarFlow) -> CliResult {
    println!("{}", "Garage Booking".bold());
    flow.load().await;

    let fields = [
        (DraftField::Name, "Name", false),
        (DraftField::Email, "Email", false),
        (DraftField::Phone, "Phone", false),
        (DraftField::Registration, "Registration", false),
        (DraftField::Make, "Make", false),
        (DraftField::Model, "Model", false),
        (DraftField::Service, "Service required", false),
        (DraftField::Notes, "Notes", true),
    ];
    for (field, label, allow_empty) in fields {
        let value = prompt(label, "", allow_empty)?;
        flow.edit(field, &value);
    }

    loop {
        if let Some(message) = flow.availability().error_message() {
            println!("{}", message.red());
            let retry = Confirm::new()
                .with_prompt("Try again?")
                .default(true)
                .interact()
                .context("Reading choice")?;
            if !retry {
                return Ok(());
            }
            flow.load().await;
            continue;
        }

        print_month(&flow);
        let choice = Select::new()
            .with_prompt("Calendar")
            .items(&[
                "Pick a date",
                "Next month",
                "Previous month",
                "Submit booking",
                "Quit",
            ])
            .default(0)
            .interact()
            .context("Reading choice")?;
        match choice {
            0 => pick_calendar_date(&mut flow)?,
            1 => {
                flow.next_month();
            }
            2 => {
                if let Err(e) = flow.prev_month() {
                    println!("{}", e.to_string().yellow());
                }
            }
            3 => match flow.submit().await {
                BookingSubmissionResult::Accepted { .. } => {
                    println!("{}", "Booking request sent!".green().bold());
                    println!("We will be in touch to confirm your appointment.");
                    return Ok(());
                }
                BookingSubmissionResult::Failed { message } => println!("{}", message.red()),
            },
            _ => return Ok(()),
        }
    }
}

fn print_month(flow: &CalendarFlow) {
    let grid = flow.month_grid();
    println!();
    println!("{:^27}", grid.title().bold());
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in &grid.weeks {
        let cells: Vec<String> = week
            .iter()
            .map(|cell| {
                let text = format!("{:>3}", cell.date.day());
                if !cell.in_month {
                    "   ".to_string()
                } else if cell.selected {
                    text.black().on_green().to_string()
                } else if cell.selectable {
                    text.green().to_string()
                } else if cell.is_today {
                    text.underline().dimmed().to_string()
                } else {
                    text.dimmed().to_string()
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
    println!();
}

fn pick_calendar_date(flow: &mut CalendarFlow) -> CliResult {
    let grid = flow.month_grid();
    let dates: Vec<_> = grid
        .days()
        .filter(|cell| cell.in_month && cell.selectable)
        .map(|cell| cell.date)
        .collect();
    if dates.is_empty() {
        println!("{}", "No dates can be booked this month.".yellow());
        return Ok(());
    }
    let items: Vec<String> = dates
        .iter()
        .map(|d| d.format("%a %d %b %Y").to_string())
        .collect();
    let idx = Select::new()
        .with_prompt("Date")
        .items(&items)
        .default(0)
        .max_length(10)
        .interact()
        .context("Reading choice")?;
    if let Some(date) = dates.get(idx) {
        if let Err(e) = flow.select_date(*date) {
            println!("{}", e.to_string().yellow());
        }
    }
    Ok(())
}
