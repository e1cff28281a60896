use crate::config::{validate, ConfigError, PathFilters, Settings};
use crate::input_info::Mode;

/// Checks every folder pattern; on failure the message lists each bad pattern
/// with its parse error, one per line.
pub fn validate_exclusion_patterns(settings: &Settings) -> Result<(), String> {
    match PathFilters::compile(settings) {
        Ok(_) => Ok(()),
        Err(ConfigError::InvalidPatterns(errors)) => {
            let mut message = format!(
                "{} folder pattern{} could not be parsed:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            );
            for error in errors {
                message.push_str(&format!("\n  {}: '{}': {}", error.setting, error.pattern, error_summary(&error.message)));
            }
            Err(message)
        }
        Err(other) => Err(other.to_string()),
    }
}

pub fn validate_limit(value: usize) -> Result<(), String> {
    if value == 0 {
        Err("Result limit must be at least 1.".to_string())
    } else {
        Ok(())
    }
}

pub fn validate_trigger(trigger: &str) -> Result<(), String> {
    if trigger.is_empty() {
        return Err("Trigger must not be empty.".to_string());
    }
    if trigger.trim().is_empty() {
        return Err("Trigger must contain a visible character.".to_string());
    }
    Ok(())
}

pub fn validate_for_save(settings: &Settings) -> Result<(), String> {
    validate_limit(settings.limit)?;
    for mode in Mode::ALL {
        if let Some(trigger) = settings.trigger(mode) {
            validate_trigger(trigger).map_err(|err| format!("{mode:?}: {err}"))?;
        }
    }
    validate_exclusion_patterns(settings)?;
    validate(settings).map_err(|err| err.to_string())
}

/// regex parse errors span several lines; the last one names the problem
fn error_summary(message: &str) -> &str {
    message.lines().last().unwrap_or(message).trim()
}
