use crate::config::types::{Config, CrawlerConfig, HttpConfig, TerminationStrategy, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for either worker pool
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawl engine configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_workers < 1 || config.fetch_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "fetch_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.fetch_workers
        )));
    }

    if config.index_workers < 1 || config.index_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "index_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.index_workers
        )));
    }

    if config.page_queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "page_queue_capacity must be >= 1".to_string(),
        ));
    }

    // Only the debounce monitor reads the timing knobs
    if config.termination == TerminationStrategy::Debounce {
        if config.debounce_ms < 10 {
            return Err(ConfigError::Validation(format!(
                "debounce_ms must be >= 10ms, got {}ms",
                config.debounce_ms
            )));
        }

        if config.monitor_tick_ms < 1 || config.monitor_tick_ms >= config.debounce_ms {
            return Err(ConfigError::Validation(format!(
                "monitor_tick_ms must be between 1 and debounce_ms ({}ms), got {}ms",
                config.debounce_ms, config.monitor_tick_ms
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
