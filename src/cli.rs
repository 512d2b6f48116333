use crate::api::{FoodInput, Price};
use regex::Regex;
use thiserror::Error;

/// Default address for both the client and the server
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9898";

/// Environment variable overriding [`DEFAULT_ADDRESS`]
pub const ADDRESS_ENV: &str = "FOOD_API_ADDRESS";

/// Environment variable holding the path prefix of the food resource, e.g. `/api`
pub const BASE_PATH_ENV: &str = "FOOD_API_BASE_PATH";

/// Errors that can occur when parsing the command line arguments
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CLIError {
    #[error("Invalid target format. Should be <host>:<port>")]
    InvalidUrlFormat,
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{0}'")]
    InvalidParameter(String),
    #[error("Unknown field '{0}', expected one of name, image, price, description")]
    UnknownField(String),
}

/// Validate the format of the TCP address provided by the user
///
/// Returns its input if the address is in the format <host>:<port>, otherwise InvalidUrlFormat
pub fn validate_address(url: &str) -> Result<&str, CLIError> {
    let re = Regex::new(r"^[a-zA-Z0-9\.\-]+:\d{1,5}$").expect("address pattern is valid");
    if re.is_match(url) {
        Ok(url)
    } else {
        Err(CLIError::InvalidUrlFormat)
    }
}

/// Pick the address to use: the one given on the command line, then the environment, then the
/// default.
pub fn resolve_address(arg: Option<&str>) -> Result<String, CLIError> {
    match arg {
        Some(address) => validate_address(address).map(str::to_string),
        None => match std::env::var(ADDRESS_ENV) {
            Ok(address) => validate_address(&address).map(str::to_string),
            Err(_) => Ok(DEFAULT_ADDRESS.to_string()),
        },
    }
}

/// Path prefix of the food resource, empty when served at the root
pub fn base_path() -> String {
    std::env::var(BASE_PATH_ENV).unwrap_or_default()
}

/// Fill a form from `field=value` arguments.
///
/// Fields that are not given keep their value from `form`, so an edit form starts out with the
/// dish being edited.
pub fn parse_form<I>(mut form: FoodInput, fields: I) -> Result<FoodInput, CLIError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for field in fields {
        let field = field.as_ref();
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| CLIError::InvalidParameter(field.to_string()))?;
        match key.trim() {
            "name" => form.name = value.to_string(),
            "image" => form.image = value.to_string(),
            "price" => form.price = Price::from(value),
            "description" => form.description = value.to_string(),
            other => return Err(CLIError::UnknownField(other.to_string())),
        }
    }
    Ok(form)
}

/// Parse a food id argument
pub fn parse_id(arg: &str) -> Result<u32, CLIError> {
    arg.parse::<u32>()
        .map_err(|_| CLIError::InvalidParameter(arg.to_string()))
}

/// Set up logging for the binaries. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
}
