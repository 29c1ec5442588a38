use chrono::NaiveDate;
use colored::Colorize;
use garage_booking::service::BookingBackend;
use garage_booking::BookingFactory;
use garage_common::{log_result, validation_error, GarageError};
use garage_config::AppConfig;

/// Prints every date the stepper form would offer, with the state of each hour.
pub async fn run(config: &AppConfig, date: Option<&str>) -> Result<(), GarageError> {
    let only = date
        .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| validation_error("--date must be YYYY-MM-DD"))?;

    let factory = BookingFactory::from_config(config)?;
    let occupancy = log_result(
        factory.backend().fetch_slot_occupancy().await,
        "Slot occupancy loaded",
        "Slot occupancy fetch failed",
    )?;
    let rules = factory.stepper_rules();
    let today = factory.clock().today();

    if let Some(date) = only {
        if let Err(reason) = rules.check_date(date, today, &occupancy) {
            println!("{} {}", date.format("%a %d %b %Y"), reason.to_string().red());
            return Ok(());
        }
    }

    let dates: Vec<NaiveDate> = rules
        .selectable_dates(today, &occupancy)
        .into_iter()
        .filter(|d| only.is_none() || only == Some(*d))
        .collect();
    if dates.is_empty() {
        println!("{}", "No dates available in the booking window.".yellow());
        return Ok(());
    }

    for date in dates {
        let hours: Vec<String> = rules
            .slot_statuses(date, &occupancy)
            .into_iter()
            .map(|slot| {
                if !slot.bookable {
                    slot.label.red().strikethrough().to_string()
                } else if slot.busy {
                    slot.label.yellow().to_string()
                } else {
                    slot.label.green().to_string()
                }
            })
            .collect();
        println!("{}  {}", date.format("%a %d %b %Y").to_string().bold(), hours.join(" "));
    }
    Ok(())
}
