use crate::environment::AppConfig;

/// Reads and parses a Dhall configuration file into an `AppConfig`.
///
/// Any read or type error is returned as a descriptive message; a record
/// missing one of the required map keys fails to type-check here.
///
/// # Example
///
/// ```rust,no_run
/// use delaymap::tools::dhall::read_dhall_config;
///
/// match read_dhall_config("./dhall-configs/dev/delaymap.dhall") {
///     Ok(config) => println!("Polling every {}s", config.polling_interval),
///     Err(err) => eprintln!("Failed to read config: {}", err),
/// }
/// ```
pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, String> {
    serde_dhall::from_file(config_path)
        .parse::<AppConfig>()
        .map_err(|e| format!("Error reading config: {}", e))
}
