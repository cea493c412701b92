use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use super::*;
use crate::Token;

impl TwitchApiClient {
    pub fn new(auth: Arc<TwitchAuth>) -> Self {
        Self::with_base_url(auth, HELIX_BASE)
    }

    pub fn with_base_url(auth: Arc<TwitchAuth>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build auth headers from the given token.
    fn auth_headers(&self, token: &Token) -> Result<HeaderMap, TwitchError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", token.access_token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        headers.insert("Client-Id", HeaderValue::from_str(self.auth.client_id())?);
        Ok(headers)
    }

    /// Build `{base}/{path}?{query}`; repeated keys are kept in order.
    pub(super) fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, TwitchError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Execute a GET request with a freshly acquired token.
    ///
    /// A 401 invalidates the cached token so the next call fetches a new one.
    pub(super) async fn authenticated_get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<String, TwitchError> {
        let token = self.auth.acquire_token().await?;
        let headers = self.auth_headers(&token)?;
        let url = self.endpoint(path, query)?;

        let resp = self.http.get(url.clone()).headers(headers).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %url, "Got 401, dropping cached app token");
            self.auth.invalidate().await;
            return Err(TwitchError::ApiError {
                status: 401,
                message: body,
            });
        }

        if !status.is_success() {
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    /// GET a Helix collection and return its `data` field.
    pub(super) async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, TwitchError> {
        let body = self.authenticated_get(path, query).await?;
        let resp: HelixResponse<T> = serde_json::from_str(&body)?;
        Ok(resp.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn client() -> TwitchApiClient {
        let auth = Arc::new(TwitchAuth::new(Credentials::new("id", "secret")));
        TwitchApiClient::with_base_url(auth, "https://api.twitch.tv/helix/")
    }

    #[test]
    fn endpoint_keeps_repeated_keys() {
        let url = client()
            .endpoint("games", &[("id", "1".into()), ("id", "2".into())])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/games?id=1&id=2");
    }

    #[test]
    fn endpoint_without_query_has_no_question_mark() {
        let url = client().endpoint("/games/top", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/games/top");
    }

    #[test]
    fn endpoint_encodes_values() {
        let url = client()
            .endpoint("clips", &[("broadcaster_id", "a b&c".into())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twitch.tv/helix/clips?broadcaster_id=a+b%26c"
        );
    }
}
