use super::*;

/// Page size used when a caller does not pass one.
pub const DEFAULT_CLIP_COUNT: u32 = 10;

/// Helix accepts `first` in 1..=100.
const MAX_CLIP_COUNT: u32 = 100;

impl TwitchApiClient {
    /// Get the newest page of clips for a broadcaster.
    pub async fn list_clips(
        &self,
        broadcaster_id: &str,
        count: u32,
    ) -> Result<Vec<ClipRecord>, TwitchError> {
        let query = clips_query(Some(broadcaster_id), None, count);
        self.fetch_clips(&query).await
    }

    /// Get clips of one game for a broadcaster, using the default page size.
    pub async fn list_clips_for_game(
        &self,
        broadcaster_id: &str,
        game_id: &str,
    ) -> Result<Vec<ClipRecord>, TwitchError> {
        let query = clips_query(Some(broadcaster_id), Some(game_id), DEFAULT_CLIP_COUNT);
        self.fetch_clips(&query).await
    }

    /// Get clips for a game across all broadcasters.
    pub async fn list_clips_by_game(
        &self,
        game_id: &str,
        count: u32,
    ) -> Result<Vec<ClipRecord>, TwitchError> {
        let query = clips_query(None, Some(game_id), count);
        self.fetch_clips(&query).await
    }

    /// Get clips for a game restricted to one broadcaster.
    pub async fn list_clips_by_game_and_broadcaster(
        &self,
        game_id: &str,
        broadcaster_id: &str,
        count: u32,
    ) -> Result<Vec<ClipRecord>, TwitchError> {
        let query = clips_query(Some(broadcaster_id), Some(game_id), count);
        self.fetch_clips(&query).await
    }

    async fn fetch_clips(&self, query: &[(&str, String)]) -> Result<Vec<ClipRecord>, TwitchError> {
        let clips: Vec<ClipRecord> = self.get_data("clips", query).await?;
        tracing::debug!(count = clips.len(), "Fetched clips");
        Ok(clips)
    }
}

pub(super) fn clips_query(
    broadcaster_id: Option<&str>,
    game_id: Option<&str>,
    count: u32,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(id) = broadcaster_id {
        query.push(("broadcaster_id", id.to_string()));
    }
    if let Some(id) = game_id {
        query.push(("game_id", id.to_string()));
    }
    query.push(("first", count.clamp(1, MAX_CLIP_COUNT).to_string()));
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_helix::FakeHelix;

    fn client(fake: &FakeHelix) -> TwitchApiClient {
        let auth = Arc::new(TwitchAuth::new(fake.credentials()));
        TwitchApiClient::with_base_url(auth, fake.helix_base())
    }

    #[test]
    fn clips_query_clamps_first() {
        let query = clips_query(Some("b"), None, 0);
        assert_eq!(query, vec![("broadcaster_id", "b".to_string()), ("first", "1".to_string())]);

        let query = clips_query(None, Some("g"), 500);
        assert_eq!(query, vec![("game_id", "g".to_string()), ("first", "100".to_string())]);
    }

    #[tokio::test]
    async fn list_clips_sends_broadcaster_and_first() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        let clips = api.list_clips("1234", 25).await.unwrap();

        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].id, "AbC123");
        assert_eq!(clips[1].creator_name, "other");
        assert_eq!(fake.last_query().as_deref(), Some("broadcaster_id=1234&first=25"));
    }

    #[tokio::test]
    async fn list_clips_for_game_uses_default_page_size() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        api.list_clips_for_game("1234", "33214").await.unwrap();

        assert_eq!(
            fake.last_query().as_deref(),
            Some("broadcaster_id=1234&game_id=33214&first=10")
        );
    }

    #[tokio::test]
    async fn list_clips_by_game_omits_broadcaster() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        api.list_clips_by_game("33214", 5).await.unwrap();

        assert_eq!(fake.last_query().as_deref(), Some("game_id=33214&first=5"));
    }

    #[tokio::test]
    async fn list_clips_by_game_and_broadcaster_sends_both() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        api.list_clips_by_game_and_broadcaster("33214", "1234", 3)
            .await
            .unwrap();

        assert_eq!(
            fake.last_query().as_deref(),
            Some("broadcaster_id=1234&game_id=33214&first=3")
        );
    }

    #[tokio::test]
    async fn missing_data_yields_empty_list() {
        let fake = FakeHelix::start().await;
        fake.omit_data();
        let api = client(&fake);

        let clips = api.list_clips("1234", 10).await.unwrap();
        assert!(clips.is_empty());
    }

    #[tokio::test]
    async fn null_data_yields_empty_list() {
        let fake = FakeHelix::start().await;
        fake.null_data();
        let api = client(&fake);

        let clips = api.list_clips("1234", 10).await.unwrap();
        assert!(clips.is_empty());
    }

    #[tokio::test]
    async fn token_is_reused_across_calls() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        api.list_clips("1234", 10).await.unwrap();
        api.list_clips_by_game("33214", 10).await.unwrap();

        assert_eq!(fake.token_requests(), 1);
        assert_eq!(fake.helix_requests(), 2);
    }

    #[tokio::test]
    async fn unauthorized_drops_token_without_retry() {
        let fake = FakeHelix::start().await;
        let api = client(&fake);

        api.list_clips("1234", 10).await.unwrap();
        fake.reject_next();

        let err = api.list_clips("1234", 10).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(fake.helix_requests(), 2);

        api.list_clips("1234", 10).await.unwrap();
        assert_eq!(fake.token_requests(), 2);
    }
}
