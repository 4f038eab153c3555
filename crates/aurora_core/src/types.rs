use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::constants::{
    DEFAULT_CATEGORY, DEFAULT_COUNTRY, DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    MIN_KEYWORD_LENGTH,
};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub url: String,
    pub source: String,
    pub category: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            summary: None,
            url: url.into(),
            source: source.into(),
            category: None,
            country: None,
            language: None,
            published_at: None,
            fetched_at: Utc::now(),
            image_url: None,
        }
    }

    /// Newest first: `published_at` desc, then `fetched_at` desc, then id desc.
    /// Articles without a publish date sort after dated ones.
    pub fn newest_first(a: &Article, b: &Article) -> Ordering {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| b.fetched_at.cmp(&a.fetched_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_lower(value: Option<String>) -> Option<String> {
    clean(value).map(|v| v.to_lowercase())
}

fn or_any(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("*")
}

/// The (country, language, category, keyword) tuple a refresh runs for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefreshFilter {
    pub country: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
}

impl RefreshFilter {
    pub fn new(
        country: Option<String>,
        language: Option<String>,
        category: Option<String>,
        keyword: Option<String>,
    ) -> Self {
        Self {
            country: clean_lower(country),
            language: clean_lower(language),
            category: clean_lower(category),
            keyword: clean(keyword),
        }
    }

    /// General news for the process-wide default country and language.
    pub fn defaults() -> Self {
        Self::new(
            Some(DEFAULT_COUNTRY.to_string()),
            Some(DEFAULT_LANGUAGE.to_string()),
            Some(DEFAULT_CATEGORY.to_string()),
            None,
        )
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = clean_lower(Some(category.to_string()));
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = clean(Some(keyword.to_string()));
        self
    }

    /// Keyword worth sending to a provider, if any.
    pub fn search_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .filter(|k| k.chars().count() >= MIN_KEYWORD_LENGTH)
    }
}

impl fmt::Display for RefreshFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "country={} language={} category={} keyword={}",
            or_any(&self.country),
            or_any(&self.language),
            or_any(&self.category),
            or_any(&self.keyword)
        )
    }
}

/// Read-side filter with pagination. Construct through [`QueryFilter::new`]
/// so that values are normalized and page bounds clamped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFilter {
    pub country: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            country: None,
            language: None,
            category: None,
            keyword: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryFilter {
    pub fn new(
        country: Option<String>,
        language: Option<String>,
        category: Option<String>,
        keyword: Option<String>,
        page: i64,
        size: i64,
    ) -> Self {
        Self {
            country: clean_lower(country),
            language: clean_lower(language),
            category: clean_lower(category),
            keyword: clean(keyword),
            page: page.clamp(0, u32::MAX as i64) as u32,
            size: size.clamp(1, MAX_PAGE_SIZE as i64) as u32,
        }
    }

    pub fn paged(page: i64, size: i64) -> Self {
        Self::new(None, None, None, None, page, size)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(keyword) = &self.keyword {
            if keyword.chars().count() < MIN_KEYWORD_LENGTH {
                return Err(Error::Validation(format!(
                    "Search keyword must be at least {} characters long",
                    MIN_KEYWORD_LENGTH
                )));
            }
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }

    /// Absent fields are unconstrained; the keyword matches title or
    /// description case-insensitively.
    pub fn matches(&self, article: &Article) -> bool {
        fn field_eq(want: &Option<String>, have: &Option<String>) -> bool {
            match want {
                None => true,
                Some(want) => have
                    .as_deref()
                    .map_or(false, |have| have.eq_ignore_ascii_case(want)),
            }
        }

        if !field_eq(&self.country, &article.country)
            || !field_eq(&self.language, &article.language)
            || !field_eq(&self.category, &article.category)
        {
            return false;
        }

        match &self.keyword {
            None => true,
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                article.title.to_lowercase().contains(&needle)
                    || article
                        .description
                        .as_deref()
                        .map_or(false, |d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Distinct classification values currently present in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub countries: Vec<String>,
    pub languages: Vec<String>,
    pub categories: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub available_countries: Vec<String>,
    pub available_languages: Vec<String>,
    pub available_categories: Vec<String>,
    pub available_sources: Vec<String>,
}

impl NewsPage {
    pub fn new(articles: Vec<Article>, total: u64, filter: &QueryFilter, facets: Facets) -> Self {
        let size = filter.size.max(1) as u64;
        let total_pages = ((total + size - 1) / size) as u32;
        Self {
            articles,
            total_pages,
            total_elements: total,
            current_page: filter.page,
            page_size: filter.size,
            has_next: filter.page.saturating_add(1) < total_pages,
            has_previous: filter.page > 0,
            available_countries: facets.countries,
            available_languages: facets.languages,
            available_categories: facets.categories,
            available_sources: facets.sources,
        }
    }
}
