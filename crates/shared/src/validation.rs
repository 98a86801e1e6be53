//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a poll title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a single poll option.
pub const MAX_OPTION_LENGTH: usize = 200;

/// Minimum number of options a poll must keep after normalization.
pub const MIN_POLL_OPTIONS: usize = 2;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Poll titles are required and limited once trimmed.
pub fn validate_poll_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(error("title_required", "Poll title is required"));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(error(
            "title_length",
            "Poll title must be at most 200 characters",
        ));
    }
    Ok(())
}

/// Trims options, drops empty entries and truncates the list to `max`.
///
/// Order is preserved so the output position becomes the option's order index.
pub fn normalize_options<S: AsRef<str>>(raw: &[S], max: usize) -> Vec<String> {
    raw.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .take(max)
        .collect()
}

/// Validates a normalized option list.
pub fn validate_normalized_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < MIN_POLL_OPTIONS {
        return Err(error(
            "options_count",
            "At least 2 options are required",
        ));
    }
    if options
        .iter()
        .any(|o| o.chars().count() > MAX_OPTION_LENGTH)
    {
        return Err(error(
            "option_length",
            "Each option must be at most 200 characters",
        ));
    }
    Ok(())
}

/// Content rule shared by comments: 1..=max characters after trimming.
pub fn validate_trimmed_length(
    value: &str,
    max: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 || len > max {
        Err(error("length", message))
    } else {
        Ok(())
    }
}

/// Trims a value and turns an empty result into `None`.
pub fn trim_to_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
