use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Secret used to verify signed bearer tokens. When unset, only the
    /// static shared-secret path (`bearer_token`) can authorize requests.
    pub jwt_secret: Option<String>,
    /// Static shared-secret token accepted as-is in the Authorization header.
    /// Acts as a fallback when token verification fails.
    pub bearer_token: Option<String>,
    /// GitHub token used for shared-secret callers that carry no credential
    /// of their own.
    pub github_token: Option<String>,
    /// Gist targeted by shared-secret callers when the URL names none.
    pub gist_id: Option<String>,
    /// Base URL of the GitHub REST API. Overridden in tests.
    pub github_api_url: String,
}

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
    let bearer_token = std::env::var("BEARER_TOKEN").ok().filter(|s| !s.is_empty());

    if jwt_secret.is_none() && bearer_token.is_none() {
        eprintln!(
            "⚠️  Neither JWT_SECRET nor BEARER_TOKEN is set; every /api request will be rejected. \
             Set at least one before serving traffic."
        );
    }

    Ok(Config {
        port: std::env::var("PORT")
            .unwrap_or_else(|_| "8787".into())
            .parse()
            .unwrap_or(8787),
        jwt_secret,
        bearer_token,
        github_token: std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
        gist_id: std::env::var("GIST_ID").ok().filter(|s| !s.is_empty()),
        github_api_url: std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.into()),
    })
}
