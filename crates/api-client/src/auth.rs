use crate::error::ApiError;
use reqwest::header;

/// The cookie/crumb pair the quote API requires on every request.
#[derive(Debug, Clone)]
pub struct Crumb {
    pub cookie: String,
    pub crumb: String,
}

/// Performs the two-step handshake: collect a session cookie, then trade it for a crumb.
///
/// The crumb authenticates requests; it carries no market data.
pub async fn fetch_crumb(
    client: &reqwest::Client,
    cookie_url: &str,
    crumb_url: reqwest::Url,
) -> Result<Crumb, ApiError> {
    // The cookie endpoint usually answers with an error status; only the header matters.
    let response = client.get(cookie_url).send().await?;

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
        .ok_or_else(|| ApiError::Auth("no session cookie in response".to_string()))?;

    let response = client
        .get(crumb_url)
        .header(header::COOKIE, &cookie)
        .send()
        .await?;

    let status = response.status();
    let crumb = response.text().await?;
    if !status.is_success() || crumb.trim().is_empty() {
        return Err(ApiError::Auth(format!("crumb request returned {}", status)));
    }

    Ok(Crumb {
        cookie,
        crumb: crumb.trim().to_string(),
    })
}
