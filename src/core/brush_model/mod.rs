//! Validation of painter settings before they reach a stroke.

use crate::core::contracts::{EngineConfig, MAX_JUMBLE_EVENTS_PER_DAB};
use crate::core::errors::CoreError;

fn check_unit(name: &str, value: f32) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::InvalidConfig(format!(
            "{} must be in [0, 1] (was {})",
            name, value
        )));
    }
    Ok(())
}

pub fn validate_engine_config(config: &EngineConfig) -> Result<(), CoreError> {
    if !config.line_stride.is_finite() || config.line_stride <= 0.0 {
        return Err(CoreError::InvalidConfig(
            "lineStride must be a positive finite number".to_string(),
        ));
    }

    let smudge = &config.smudge;
    check_unit("smudge.strength", smudge.strength)?;
    check_unit("smudge.hardTolerance", smudge.hard_tolerance)?;
    check_unit("smudge.hardAlphaThreshold", smudge.hard_alpha_threshold)?;
    if !smudge.gamma.is_finite() || smudge.gamma <= 0.0 {
        return Err(CoreError::InvalidConfig(
            "smudge.gamma must be a positive finite number".to_string(),
        ));
    }
    if !smudge.min_move_distance.is_finite() || smudge.min_move_distance < 0.0 {
        return Err(CoreError::InvalidConfig(
            "smudge.minMoveDistance must be a non-negative finite number".to_string(),
        ));
    }

    check_unit("jumble.strength", config.jumble.strength)?;
    check_unit("jumble.locality", config.jumble.locality)?;
    if let Some(events) = config.jumble.events_per_dab {
        if events > MAX_JUMBLE_EVENTS_PER_DAB {
            return Err(CoreError::InvalidConfig(format!(
                "jumble.eventsPerDab must be at most {} (was {})",
                MAX_JUMBLE_EVENTS_PER_DAB, events
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_default_config() {
        assert!(validate_engine_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = EngineConfig::default();
        config.line_stride = 0.0;
        assert!(validate_engine_config(&config).is_err());

        let mut config = EngineConfig::default();
        config.smudge.strength = 1.5;
        assert!(validate_engine_config(&config).is_err());

        let mut config = EngineConfig::default();
        config.jumble.locality = f32::NAN;
        assert!(validate_engine_config(&config).is_err());

        let mut config = EngineConfig::default();
        config.smudge.gamma = -1.0;
        assert!(matches!(
            validate_engine_config(&config),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_oversized_jumble_event_count() {
        let mut config = EngineConfig::default();
        config.jumble.events_per_dab = Some(MAX_JUMBLE_EVENTS_PER_DAB);
        assert!(validate_engine_config(&config).is_ok());

        config.jumble.events_per_dab = Some(u32::MAX);
        assert!(validate_engine_config(&config).is_err());

        let parsed = EngineConfig::from_json(r#"{ "jumble": { "eventsPerDab": 4294967295 } }"#);
        assert!(matches!(parsed, Err(CoreError::InvalidConfig(_))));
    }
}
