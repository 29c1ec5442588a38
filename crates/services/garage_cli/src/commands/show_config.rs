use garage_common::GarageError;
use garage_config::AppConfig;

pub fn run(config: &AppConfig) -> Result<(), GarageError> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
