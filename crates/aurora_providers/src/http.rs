use aurora_core::ProviderError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("aurora-news/", env!("CARGO_PKG_VERSION"));

/// Query parameters that carry credentials and must never reach the logs.
const SECRET_PARAMS: &[&str] = &["apikey", "token"];

pub fn build_client() -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(ProviderError::from)
}

/// `{base}/{path}` with any trailing slash on `base` collapsed.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url, ProviderError> {
    let joined = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse(&joined).map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", joined, e)))
}

/// GET `url` and return the body. The whole exchange, body included, is
/// bounded by `timeout`. Non-2xx responses come back as `ProviderError::Http`
/// with the body attached.
pub async fn get_text(client: &Client, url: Url, timeout: Duration) -> Result<String, ProviderError> {
    let exchange = async {
        let response = client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| ProviderError::Timeout(timeout))?
}

/// The URL with credential parameters masked, for logging.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if SECRET_PARAMS.contains(&k.to_ascii_lowercase().as_str()) {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if pairs.is_empty() {
        return masked.to_string();
    }
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
