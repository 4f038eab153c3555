//! Defaults and limits shared by every crate in the workspace.

pub const PROVIDER_NEWSAPI: &str = "NewsAPI";
pub const PROVIDER_GNEWS: &str = "GNews";

pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_CATEGORY: &str = "general";

pub const DEFAULT_SUMMARY_LENGTH: usize = 230;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ARTICLES: u32 = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const MIN_KEYWORD_LENGTH: usize = 2;
pub const MAX_TITLE_LENGTH: usize = 500;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_URL_LENGTH: usize = 1000;

pub const SUPPORTED_COUNTRIES: &[&str] = &[
    "us", "gb", "ca", "au", "de", "fr", "it", "jp", "kr", "in", "br", "mx", "ru", "cn", "ae", "sa",
];

pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "de", "fr", "it", "es", "pt", "ru", "ja", "ko", "zh", "ar", "he", "hi", "nl", "no", "sv",
];

pub const SUPPORTED_CATEGORIES: &[&str] = &[
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
    "world",
    "nation",
];
