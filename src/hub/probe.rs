use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Header the hub sets on failed resolve requests
const ERROR_CODE_HEADER: &str = "x-error-code";

/// What a HEAD request on a repository file says about access to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProbeOutcome {
    Available,
    NotFound,
    AuthRequired,
    Unexpected(StatusCode),
}

/// Resolve URL for a file inside a model repository
pub(crate) fn resolve_url(endpoint: &str, repo_id: &str, revision: &str, filename: &str) -> String {
    format!(
        "{}/{}/resolve/{}/{}",
        endpoint.trim_end_matches('/'),
        repo_id.trim_matches('/'),
        revision,
        filename
    )
}

/// Client for resolve checks. Redirects are not followed: the CDN behind them
/// signs its URLs for GET, so a HEAD there can be refused for a public file.
pub(crate) fn client() -> Result<Client, reqwest::Error> {
    Client::builder().redirect(Policy::none()).build()
}

/// Classifies a resolve response. A redirect means the hub is serving the file.
///
/// The hub answers an anonymous request for a missing repository with 401,
/// the same status as a gated one, so the error code header wins over the status.
pub(crate) fn classify(status: StatusCode, error_code: Option<&str>) -> ProbeOutcome {
    if status.is_success() || status.is_redirection() {
        return ProbeOutcome::Available;
    }

    match error_code {
        Some("GatedRepo") => ProbeOutcome::AuthRequired,
        Some("RepoNotFound") | Some("EntryNotFound") | Some("RevisionNotFound") => ProbeOutcome::NotFound,
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProbeOutcome::AuthRequired,
            StatusCode::NOT_FOUND => ProbeOutcome::NotFound,
            other => ProbeOutcome::Unexpected(other),
        },
    }
}

/// Sends a HEAD request for `url`
pub(crate) async fn probe(client: &Client, url: &str, token: Option<&str>) -> Result<ProbeOutcome, reqwest::Error> {
    let mut request = client.head(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    let error_code = response
        .headers()
        .get(ERROR_CODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    debug!("Probe {} -> {} ({:?})", url, status, error_code);
    Ok(classify(status, error_code.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://huggingface.co/", "google/gemma-2-9b-it", "main", "tokenizer.json"),
            "https://huggingface.co/google/gemma-2-9b-it/resolve/main/tokenizer.json"
        );
    }

    #[test]
    fn test_error_code_wins_over_status() {
        assert_eq!(classify(StatusCode::UNAUTHORIZED, Some("RepoNotFound")), ProbeOutcome::NotFound);
        assert_eq!(classify(StatusCode::UNAUTHORIZED, Some("GatedRepo")), ProbeOutcome::AuthRequired);
        assert_eq!(classify(StatusCode::FORBIDDEN, Some("GatedRepo")), ProbeOutcome::AuthRequired);
        assert_eq!(classify(StatusCode::NOT_FOUND, Some("EntryNotFound")), ProbeOutcome::NotFound);
    }

    #[test]
    fn test_status_fallback() {
        assert_eq!(classify(StatusCode::OK, None), ProbeOutcome::Available);
        assert_eq!(classify(StatusCode::FOUND, None), ProbeOutcome::Available);
        assert_eq!(classify(StatusCode::TEMPORARY_REDIRECT, None), ProbeOutcome::Available);
        assert_eq!(classify(StatusCode::NOT_FOUND, None), ProbeOutcome::NotFound);
        assert_eq!(classify(StatusCode::UNAUTHORIZED, None), ProbeOutcome::AuthRequired);
        assert_eq!(
            classify(StatusCode::BAD_GATEWAY, None),
            ProbeOutcome::Unexpected(StatusCode::BAD_GATEWAY)
        );
    }
}
