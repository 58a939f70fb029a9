use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::aggregate;
use crate::api;
use crate::config::ClientConfig;
use crate::error::{LoungeError, Result};
use crate::gateway::Gateway;
use crate::leaderboard::LeaderboardFeed;
use crate::live::{self, LiveBoard, LiveEventController};
use crate::model::*;
use crate::poll::Poller;
use crate::report::{CsvExport, Report, ReportType};
use crate::session::{AuthRedirect, LogRedirect, Session};

/// The main entry point for the lounge admin backend.
///
/// `LoungeClient` wraps a [`reqwest::Client`] and a shared [`Session`].
/// Cloning is cheap and every clone shares the same session.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> lounge_admin::Result<()> {
/// use lounge_admin::{ClientConfig, LoungeClient};
///
/// let client = LoungeClient::from_config(ClientConfig::from_env()?)?;
/// let events = client.get_events().await?;
/// println!("Found {} events", events.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LoungeClient {
    gateway: Gateway,
    config: ClientConfig,
}

impl LoungeClient {
    /// Create a client with default settings and no token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), ClientConfig::new(base_url))
    }

    /// Create a client from configuration, applying its request timeout.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| LoungeError::Http {
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure proxies, headers, etc.
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self::with_redirect(http, config, Arc::new(LogRedirect))
    }

    /// Like [`LoungeClient::with_client`], with a custom handler for expired sessions.
    pub fn with_redirect(
        http: reqwest::Client,
        config: ClientConfig,
        redirect: Arc<dyn AuthRedirect>,
    ) -> Self {
        let session = match &config.token {
            Some(token) => Session::with_token(token.clone(), redirect),
            None => Session::new(redirect),
        };
        let gateway = Gateway::new(http, config.base_url.clone(), Arc::new(session));
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<Session> {
        self.gateway.session()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[instrument(skip(self))]
    pub async fn get_events(&self) -> Result<Vec<Event>> {
        api::events::get_events(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> Result<Event> {
        api::events::get_event(&self.gateway, event_id).await
    }

    /// Validate the draft locally, then create the event.
    #[instrument(skip(self, draft))]
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        api::events::create_event(&self.gateway, draft).await
    }

    #[instrument(skip(self, draft))]
    pub async fn update_event(&self, event_id: &str, draft: &EventDraft) -> Result<Event> {
        api::events::update_event(&self.gateway, event_id, draft).await
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        api::events::delete_event(&self.gateway, event_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        api::teams::get_teams(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_event_teams(&self, event_id: &str) -> Result<Vec<Team>> {
        api::teams::get_event_teams(&self.gateway, event_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_games(&self) -> Result<Vec<Game>> {
        api::catalog::get_games(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_packages(&self) -> Result<Vec<Package>> {
        api::catalog::get_packages(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_memberships(&self) -> Result<Vec<Membership>> {
        api::catalog::get_memberships(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_offers(&self) -> Result<Vec<Offer>> {
        api::catalog::get_offers(&self.gateway).await
    }

    /// Toggle an offer and return the refetched list.
    #[instrument(skip(self, offer))]
    pub async fn set_offer_active(&self, offer: &Offer, is_active: bool) -> Result<Vec<Offer>> {
        api::catalog::set_offer_active(&self.gateway, offer, is_active).await
    }

    #[instrument(skip(self))]
    pub async fn get_bookings(&self) -> Result<Vec<Booking>> {
        api::bookings::get_bookings(&self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<UserProfile> {
        api::users::get_profile(&self.gateway).await
    }

    /// Exchange a Firebase id token for a backend session.
    #[instrument(skip(self, id_token))]
    pub async fn authenticate_firebase(&self, id_token: &str) -> Result<UserProfile> {
        api::users::authenticate_firebase(&self.gateway, id_token).await
    }

    /// Every participant across all events, solo registrants and team members alike.
    #[instrument(skip(self))]
    pub async fn participants(&self) -> Result<Vec<Participant>> {
        let (events, teams) = futures::try_join!(self.get_events(), self.get_teams())
            .map_err(LoungeError::composite)?;
        Ok(aggregate::participants(&events, &teams))
    }

    #[instrument(skip(self))]
    pub async fn live_board(&self) -> Result<LiveBoard> {
        live::fetch_live_board(&self.gateway).await
    }

    pub fn controller(&self) -> LiveEventController {
        LiveEventController::new(self.gateway.clone())
    }

    /// Poll the live board at the configured interval.
    pub fn poll_live_board(&self) -> Poller<LiveBoard> {
        let gateway = self.gateway.clone();
        Poller::spawn(self.config.poll_interval, move || {
            let gateway = gateway.clone();
            async move { live::fetch_live_board(&gateway).await }
        })
    }

    /// Fetch events and teams, then assemble the printable summary report.
    #[instrument(skip(self))]
    pub async fn build_report(&self) -> Result<Report> {
        let (events, teams) = futures::try_join!(self.get_events(), self.get_teams())
            .map_err(LoungeError::composite)?;
        let now = Utc::now();
        let snapshot = aggregate::aggregate(&events, &teams);
        let trend = ParticipationTrend::generate(&events, &teams, &snapshot, now.date_naive());
        Ok(Report::build(snapshot, trend, &events, &teams, now))
    }

    #[instrument(skip(self))]
    pub async fn export_csv(&self, report_type: ReportType) -> Result<CsvExport> {
        CsvExport::fetch(&self.gateway, report_type, Utc::now().date_naive()).await
    }

    /// Open the realtime leaderboard feed.
    #[instrument(skip(self))]
    pub async fn leaderboard_feed(&self) -> Result<LeaderboardFeed> {
        LeaderboardFeed::connect(&self.socket_url()).await
    }

    /// Configured socket URL, or the websocket form of the backend root.
    pub fn socket_url(&self) -> String {
        if let Some(url) = &self.config.socket_url {
            return url.clone();
        }
        let base = &self.config.base_url;
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.clone()
        };
        let root = base.strip_suffix("/api").unwrap_or(&base);
        format!("{root}/socket.io/?EIO=4&transport=websocket")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::test_support::{event_json, team_json, MockBackend};

    #[test]
    fn test_socket_url_derived_from_base() {
        let client = LoungeClient::new("https://lounge.example.com/api/");
        assert_eq!(
            client.socket_url(),
            "wss://lounge.example.com/socket.io/?EIO=4&transport=websocket"
        );

        let explicit = LoungeClient::with_client(
            reqwest::Client::new(),
            ClientConfig::new("http://x").with_socket_url("ws://rt.example.com/socket.io/"),
        );
        assert_eq!(explicit.socket_url(), "ws://rt.example.com/socket.io/");
    }

    #[test]
    fn test_config_token_seeds_session() {
        let client = LoungeClient::from_config(ClientConfig::new("http://x").with_token("abc"))
            .unwrap();
        assert_eq!(client.session().token().as_deref(), Some("abc"));
        assert!(LoungeClient::new("http://x").session().token().is_none());
    }

    #[tokio::test]
    async fn test_request_timeout_applies() {
        let mock = MockBackend::start().await;
        mock.stub_delayed(
            "GET",
            "/games",
            200,
            json!({ "success": true, "data": [] }),
            Some(Duration::from_millis(500)),
        );
        let client = LoungeClient::from_config(
            ClientConfig::new(mock.url()).with_request_timeout(Duration::from_millis(50)),
        )
        .unwrap();

        let err = client.get_games().await.unwrap_err();
        match err {
            LoungeError::Http { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_participants_merge_events_and_teams() {
        let mock = MockBackend::start().await;
        mock.ok(
            "GET",
            "/events",
            json!([event_json(
                "e1",
                "single-battle",
                "2026-10-10T18:00:00Z",
                &[("solo@x.com", true)]
            )]),
        );
        mock.ok("GET", "/teams", json!([team_json("t1", &[("m@x.com", false)], &["e1"])]));
        let client = mock.client();

        let participants = client.participants().await.unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(participants.iter().filter(|p| p.is_solo()).count(), 1);
    }

    #[tokio::test]
    async fn test_participants_fail_with_generic_message() {
        let mock = MockBackend::start().await;
        mock.ok("GET", "/events", json!([]));
        mock.stub_json("GET", "/teams", 500, json!({ "message": "db down" }));
        let client = mock.client();

        let err = client.participants().await.unwrap_err();
        assert!(matches!(err, LoungeError::Composite { .. }));
        assert_eq!(err.user_message(), crate::error::GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_build_report_counts_events() {
        let mock = MockBackend::start().await;
        mock.ok(
            "GET",
            "/events",
            json!([
                event_json("e1", "single-battle", "2026-10-10T18:00:00Z", &[("a@x.com", true)]),
                event_json("e2", "team-battle", "2026-10-12T18:00:00Z", &[]),
            ]),
        );
        mock.ok("GET", "/teams", json!([team_json("t1", &[], &["e2"])]));
        let client = mock.client();

        let report = client.build_report().await.unwrap();
        assert_eq!(report.snapshot.total_events, 2);
        assert_eq!(report.event_cards.len(), 2);
    }

    #[tokio::test]
    async fn test_poll_live_board_publishes_first_fetch() {
        let mock = MockBackend::start().await;
        mock.ok("GET", "/events", json!([]));
        mock.ok("GET", "/teams", json!([]));
        let client = LoungeClient::from_config(
            ClientConfig::new(mock.url()).with_poll_interval(Duration::from_secs(3600)),
        )
        .unwrap();

        let mut poller = client.poll_live_board();
        let state = loop {
            let state = poller.next_update().await.unwrap();
            if !state.loading {
                break state;
            }
        };
        assert!(state.error.is_none());
        assert!(state.data.unwrap().events.is_empty());
    }
}
