use crate::config::types::{
    Config, HarvestConfig, OutputConfig, PacingConfig, ProgressConfig, UserAgentConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_pacing_config(&config.pacing)?;
    validate_progress_config(&config.progress)?;
    validate_output_config(&config.output)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates pagination settings
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.step < 1 {
        return Err(ConfigError::Validation(format!(
            "step must be >= 1, got {}",
            config.step
        )));
    }

    Ok(())
}

/// Validates pause bounds
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.min_secs > config.max_secs {
        return Err(ConfigError::Validation(format!(
            "pacing min-secs ({}) must not exceed max-secs ({})",
            config.min_secs, config.max_secs
        )));
    }

    Ok(())
}

/// Validates progress line settings
fn validate_progress_config(config: &ProgressConfig) -> Result<(), ConfigError> {
    if config.width < 1 {
        return Err(ConfigError::Validation(
            "progress width must be >= 1".to_string(),
        ));
    }

    if config.mark.is_empty() {
        return Err(ConfigError::Validation(
            "progress mark cannot be empty".to_string(),
        ));
    }

    // Written so that NaN fails too
    if !(config.sample_ratio > 0.0 && config.sample_ratio <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "sample-ratio must be in (0, 1], got {}",
            config.sample_ratio
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "log-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the User-Agent pool
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(agent) = config.agents.iter().find(|a| a.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user-agent entries cannot be blank, got '{}'",
            agent
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_step() {
        let mut harvest = HarvestConfig::default();
        assert!(validate_harvest_config(&harvest).is_ok());

        harvest.step = 0;
        assert!(validate_harvest_config(&harvest).is_err());
    }

    #[test]
    fn test_validate_pacing_bounds() {
        let mut pacing = PacingConfig {
            enabled: true,
            min_secs: 0,
            max_secs: 0,
        };
        assert!(validate_pacing_config(&pacing).is_ok());

        pacing.min_secs = 5;
        pacing.max_secs = 2;
        assert!(validate_pacing_config(&pacing).is_err());
    }

    #[test]
    fn test_validate_sample_ratio() {
        let mut progress = ProgressConfig::default();

        progress.sample_ratio = 1.0;
        assert!(validate_progress_config(&progress).is_ok());

        progress.sample_ratio = 0.0;
        assert!(validate_progress_config(&progress).is_err());

        progress.sample_ratio = 1.5;
        assert!(validate_progress_config(&progress).is_err());

        progress.sample_ratio = f64::NAN;
        assert!(validate_progress_config(&progress).is_err());
    }

    #[test]
    fn test_validate_bar_shape() {
        let mut progress = ProgressConfig::default();
        progress.width = 0;
        assert!(validate_progress_config(&progress).is_err());

        let mut progress = ProgressConfig::default();
        progress.mark = String::new();
        assert!(validate_progress_config(&progress).is_err());
    }

    #[test]
    fn test_validate_user_agents() {
        assert!(validate_user_agent_config(&UserAgentConfig { agents: vec![] }).is_err());
        assert!(validate_user_agent_config(&UserAgentConfig {
            agents: vec!["  ".to_string()]
        })
        .is_err());
        assert!(validate_user_agent_config(&UserAgentConfig {
            agents: vec!["Mozilla/5.0".to_string()]
        })
        .is_ok());
    }
}
