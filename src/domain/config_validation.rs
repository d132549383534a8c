//! Configuration validation.
//!
//! Validates all config fields before a recalculation runs.

use crate::domain::analysis::StatusFilter;
use crate::domain::error::PicktrackError;
use crate::domain::simulator::SimulationPolicy;
use crate::ports::config_port::ConfigPort;

pub fn validate_recalculation_config(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    validate_prices_dir(config)?;
    validate_analyses_file(config)?;
    validate_base_value(config)?;
    validate_policy(config)?;
    validate_status_filter(config)?;
    validate_benchmarks(config)?;
    validate_interval_days(config)?;
    Ok(())
}

fn validate_prices_dir(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    match config.get_string("data", "prices_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(PicktrackError::ConfigInvalid {
            section: "data".to_string(),
            key: "prices_dir".to_string(),
            reason: "prices_dir must not be empty".to_string(),
        }),
        None => Err(PicktrackError::ConfigMissing {
            section: "data".to_string(),
            key: "prices_dir".to_string(),
        }),
    }
}

fn validate_analyses_file(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    match config.get_string("data", "analyses_file") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(PicktrackError::ConfigInvalid {
            section: "data".to_string(),
            key: "analyses_file".to_string(),
            reason: "analyses_file must not be empty".to_string(),
        }),
        None => Err(PicktrackError::ConfigMissing {
            section: "data".to_string(),
            key: "analyses_file".to_string(),
        }),
    }
}

fn validate_base_value(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    let value = config.get_double("recalculation", "base_value", 10_000.0);
    if value <= 0.0 {
        return Err(PicktrackError::ConfigInvalid {
            section: "recalculation".to_string(),
            key: "base_value".to_string(),
            reason: "base_value must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_policy(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    if let Some(value) = config.get_string("recalculation", "policy") {
        value
            .parse::<SimulationPolicy>()
            .map_err(|_| PicktrackError::ConfigInvalid {
                section: "recalculation".to_string(),
                key: "policy".to_string(),
                reason: format!("unknown policy '{}', expected incremental or equal", value),
            })?;
    }
    Ok(())
}

fn validate_status_filter(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    if let Some(value) = config.get_string("recalculation", "status_filter") {
        value
            .parse::<StatusFilter>()
            .map_err(|reason| PicktrackError::ConfigInvalid {
                section: "recalculation".to_string(),
                key: "status_filter".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_benchmarks(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    if let Some(value) = config.get_string("recalculation", "benchmarks") {
        for token in value.split(',') {
            if token.trim().is_empty() {
                return Err(PicktrackError::ConfigInvalid {
                    section: "recalculation".to_string(),
                    key: "benchmarks".to_string(),
                    reason: "empty ticker in benchmark list".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_interval_days(config: &dyn ConfigPort) -> Result<(), PicktrackError> {
    let value = config.get_int("recalculation", "interval_days", 7);
    if value <= 0 {
        return Err(PicktrackError::ConfigInvalid {
            section: "recalculation".to_string(),
            key: "interval_days".to_string(),
            reason: "interval_days must be positive".to_string(),
        });
    }
    Ok(())
}
