use std::time::Duration;

use crate::error::ConfigError;

/// Parses `"<digits><unit>"` with unit `ms`, `s`, `m` or `h`. A bare number is
/// milliseconds and zero is allowed.
pub(crate) fn parse_duration_value(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ConfigError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ConfigError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    match unit_part.trim() {
        "" | "ms" => Ok(Duration::from_millis(number)),
        "s" => Ok(Duration::from_secs(number)),
        "m" => number
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(ConfigError::DurationOverflow),
        "h" => number
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or(ConfigError::DurationOverflow),
        unit => Err(ConfigError::InvalidDurationUnit {
            unit: unit.to_owned(),
        }),
    }
}
