use crate::config::types::{
    Config, DelayRange, DeliveryConfig, HttpConfig, PacingConfig, PollConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_delivery_config(&config.delivery)?;
    validate_poll_config(&config.poll)?;
    validate_pacing_config(&config.pacing)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the polled site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_web_url("base-url", &config.base_url)?;

    if config.domain.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site domain cannot be empty".to_string(),
        ));
    }

    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the delivery endpoint
fn validate_delivery_config(config: &DeliveryConfig) -> Result<(), ConfigError> {
    validate_web_url("endpoint", &config.endpoint)
}

/// Validates poll loop settings
fn validate_poll_config(config: &PollConfig) -> Result<(), ConfigError> {
    if config.scan_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "scan-interval must be >= 1s, got {}s",
            config.scan_interval
        )));
    }

    if config.max_articles_per_poll < 1 {
        return Err(ConfigError::Validation(format!(
            "max-articles-per-poll must be >= 1, got {}",
            config.max_articles_per_poll
        )));
    }

    if config.failure_backoff < 1 {
        return Err(ConfigError::Validation(format!(
            "failure-backoff must be >= 1s, got {}s",
            config.failure_backoff
        )));
    }

    Ok(())
}

/// Validates the pacing ranges
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_delay_range("request-delay", &config.request_delay)?;
    validate_delay_range("article-delay", &config.article_delay)?;
    validate_delay_range("delivery-delay", &config.delivery_delay)?;
    Ok(())
}

fn validate_delay_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::Validation(format!(
            "{} min ({}ms) must not exceed max ({}ms)",
            name, range.min, range.max
        )));
    }
    Ok(())
}

/// Validates outbound HTTP settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "http timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a configured URL is an absolute HTTP(S) URL with a host
fn validate_web_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            name, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            name, value
        )));
    }

    Ok(())
}
