use adaptive_strategy::LearnerConfig;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,

    /// SQLite URL; learned state stays in memory when unset
    pub database_url: Option<String>,

    /// Upstream fetch rate limit; unlimited when unset
    pub fetch_requests_per_second: Option<u32>,

    pub fetch_user_agent: String,

    /// Empty means any origin
    pub allowed_origins: Vec<String>,

    pub learner: LearnerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            fetch_requests_per_second: parse_var("FETCH_REQUESTS_PER_SECOND")?,
            fetch_user_agent: env::var("FETCH_USER_AGENT")
                .unwrap_or_else(|_| "AdaptiveCrawler/1.0".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            learner: learner_config(|name| env::var(name).ok())?,
        })
    }
}

/// Learner tuning from `LEARNER_*` variables, defaults for anything unset.
fn learner_config(var: impl Fn(&str) -> Option<String>) -> Result<LearnerConfig> {
    let defaults = LearnerConfig::default();
    let value = |name: &str| parse_value::<f64>(name, var(name));

    let success = value("LEARNER_SUCCESS_STEP")?.unwrap_or(defaults.success_step);
    let failure = value("LEARNER_FAILURE_STEP")?.unwrap_or(defaults.failure_step);
    let smoothing = value("LEARNER_SMOOTHING_FACTOR")?.unwrap_or(defaults.smoothing_factor);
    let top_n = parse_value::<usize>("LEARNER_INSIGHTS_TOP_N", var("LEARNER_INSIGHTS_TOP_N"))?
        .unwrap_or(defaults.insights_top_n);

    Ok(defaults
        .with_steps(success, failure)
        .with_smoothing_factor(smoothing)
        .with_insights_top_n(top_n))
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(name, env::var(name).ok())
}

fn parse_value<T>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid number", name)),
        _ => Ok(None),
    }
}

/// Comma-separated origins, blanks dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.org, ,https://b.org "),
            vec!["https://a.org".to_string(), "https://b.org".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_learner_config_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("LEARNER_SUCCESS_STEP", "0.2"),
            ("LEARNER_SMOOTHING_FACTOR", " 0.5 "),
            ("LEARNER_INSIGHTS_TOP_N", "3"),
        ]
        .into_iter()
        .collect();

        let learner = learner_config(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(learner.success_step, 0.2);
        assert_eq!(learner.failure_step, LearnerConfig::default().failure_step);
        assert_eq!(learner.smoothing_factor, 0.5);
        assert_eq!(learner.insights_top_n, 3);
    }

    #[test]
    fn test_learner_config_rejects_garbage() {
        let err = learner_config(|name| {
            (name == "LEARNER_FAILURE_STEP").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("LEARNER_FAILURE_STEP"));
    }
}
