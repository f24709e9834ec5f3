//! Clock-face rendering and duration parsing

use super::DurationParseError;

/// Render whole seconds as `M:SS`. Minutes are not wrapped into hours.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse `SS` or `M:SS` into a positive number of seconds
pub fn parse_duration(input: &str) -> Result<u64, DurationParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let malformed = || DurationParseError::Malformed(input.to_string());
    let number = |part: &str| -> Result<u64, DurationParseError> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        part.parse::<u64>().map_err(|_| malformed())
    };

    let total = match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes = number(minutes)?;
            let seconds = number(seconds)?;
            if seconds >= 60 {
                return Err(DurationParseError::SecondsOutOfRange(seconds));
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(malformed)?
        }
        None => number(input)?,
    };

    if total == 0 {
        return Err(DurationParseError::Zero);
    }
    Ok(total)
}
