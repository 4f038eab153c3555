use aurora_core::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_ARTICLES, DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_RETENTION_DAYS,
    DEFAULT_SUMMARY_LENGTH,
};
use aurora_core::{Error, Result};
use aurora_news::{JobSchedule, NewsServiceConfig, SchedulerConfig};
use aurora_providers::registry::DEFAULT_RETRY_INTERVAL;
use aurora_providers::ProviderSettings;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// A duration written as `1h30m`, `45s`, `1d` or a bare number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut digits = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let value: u64 = digits
                .parse()
                .map_err(|_| format!("Missing number before unit '{}' in {:?}", c, s))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_seconds = value
                .checked_mul(unit)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            digits.clear();
            seen_number = true;
        }

        // Trailing number without a unit counts as seconds
        if !digits.is_empty() {
            let secs = digits
                .parse::<u64>()
                .map_err(|_| format!("Invalid number in duration: {}", s))?;
            total_seconds = total_seconds
                .checked_add(secs)
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            seen_number = true;
        }

        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

impl TryFrom<String> for HumanDuration {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: HumanDuration,
    pub max_articles: u32,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            timeout: HumanDuration(Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS)),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }
}

impl ProviderSection {
    fn settings(&self, mut base: ProviderSettings) -> ProviderSettings {
        base.enabled = self.enabled;
        base.api_key = self.api_key.clone();
        if let Some(url) = &self.base_url {
            base.base_url = url.clone();
        }
        base.timeout = self.timeout.0;
        base.max_articles = self.max_articles;
        base
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub newsapi: ProviderSection,
    pub gnews: ProviderSection,
    pub retry_interval: Option<HumanDuration>,
}

impl ProvidersConfig {
    pub fn newsapi_settings(&self) -> ProviderSettings {
        self.newsapi.settings(ProviderSettings::newsapi())
    }

    pub fn gnews_settings(&self) -> ProviderSettings {
        self.gnews.settings(ProviderSettings::gnews())
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval.map_or(DEFAULT_RETRY_INTERVAL, |d| d.0)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct JobSection {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub every: HumanDuration,
}

fn enabled_by_default() -> bool {
    true
}

impl From<JobSchedule> for JobSection {
    fn from(schedule: JobSchedule) -> Self {
        Self {
            enabled: schedule.enabled,
            every: HumanDuration(schedule.every),
        }
    }
}

impl From<JobSection> for JobSchedule {
    fn from(section: JobSection) -> Self {
        JobSchedule {
            enabled: section.enabled,
            every: section.every.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub enabled: bool,
    pub refresh: JobSection,
    pub cleanup: JobSection,
    pub health: JobSection,
    pub trending: JobSection,
    pub warmup: JobSection,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let defaults = SchedulerConfig::default();
        Self {
            enabled: true,
            refresh: defaults.refresh.into(),
            cleanup: defaults.cleanup.into(),
            health: defaults.health.into(),
            trending: defaults.trending.into(),
            warmup: defaults.warmup.into(),
        }
    }
}

/// Service configuration, read from YAML. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: String,
    pub database_url: Option<String>,
    pub bind: String,
    pub cache_ttl: HumanDuration,
    pub retention_days: u32,
    pub summary_length: usize,
    pub providers: ProvidersConfig,
    pub scheduler: SchedulerSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            database_url: None,
            bind: "0.0.0.0:8080".to_string(),
            cache_ttl: HumanDuration(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            retention_days: DEFAULT_RETENTION_DAYS,
            summary_length: DEFAULT_SUMMARY_LENGTH,
            providers: ProvidersConfig::default(),
            scheduler: SchedulerSection::default(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", path.display(), e))
                })?;
                Self::from_yaml(&raw)
            }
        }
    }

    pub fn service_config(&self) -> NewsServiceConfig {
        NewsServiceConfig {
            cache_ttl: self.cache_ttl.0,
            retention_days: self.retention_days,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            refresh: self.scheduler.refresh.into(),
            cleanup: self.scheduler.cleanup.into(),
            health: self.scheduler.health.into(),
            trending: self.scheduler.trending.into(),
            warmup: self.scheduler.warmup.into(),
            retention_days: self.retention_days,
            ..SchedulerConfig::default()
        }
    }
}
