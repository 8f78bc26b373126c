use std::{env, fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Read an environment variable and parse it into `T`, falling back to `default` when the variable is missing or
/// does not parse. The caller decides whether the fallback is worth logging.
pub fn parse_env_or<T>(var: &str, default: T) -> T
where
    T: FromStr + Display,
{
    env::var(var).ok().and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}
