use colored::Colorize;
use dialoguer::Confirm;
use garage_booking::cancel::CancellationState;
use garage_booking::BookingFactory;
use garage_common::{Context, GarageError};
use garage_config::AppConfig;

/// Cancels the booking named by `link`. A failed request may be retried from
/// the prompt; nothing is sent when the link carries no booking id.
pub async fn run(config: &AppConfig, link: &str, yes: bool) -> Result<(), GarageError> {
    let factory = BookingFactory::from_config(config)?;
    let mut view = factory.cancellation(link);

    println!("{}", view.headline().bold());
    println!("{}", view.message());
    let Some(booking_id) = view.booking_id().map(str::to_string) else {
        return Ok(());
    };
    println!("Booking: {}", booking_id.cyan());
    println!();

    if !yes
        && !Confirm::new()
            .with_prompt("Cancel this booking?")
            .default(false)
            .interact()
            .context("Reading confirmation")?
    {
        println!("Booking kept.");
        return Ok(());
    }

    loop {
        match view.cancel().await {
            CancellationState::Cancelled => {
                println!("{}", view.headline().green().bold());
                println!("{}", view.message().green());
                return Ok(());
            }
            CancellationState::Failed(message) => {
                println!("{}", message.red());
                let retry = Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()
                    .context("Reading confirmation")?;
                if !retry {
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}
