use tracing::{debug, instrument};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::Team;

#[instrument(skip(gateway))]
pub(crate) async fn get_teams(gateway: &Gateway) -> Result<Vec<Team>> {
    let teams: Vec<Team> = gateway.get("/teams").await?;
    debug!(count = teams.len(), "fetched teams");
    Ok(teams)
}

/// Teams registered for one event.
#[instrument(skip(gateway))]
pub(crate) async fn get_event_teams(gateway: &Gateway, event_id: &str) -> Result<Vec<Team>> {
    let teams: Vec<Team> = gateway.get(&format!("/teams/{event_id}")).await?;
    debug!(count = teams.len(), event_id, "fetched event teams");
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{team_json, MockBackend};

    #[tokio::test]
    async fn test_event_teams_use_event_path() {
        let mock = MockBackend::start().await;
        mock.ok(
            "GET",
            "/teams/e3",
            json!([team_json("t1", &[("m@x.com", true)], &["e3"])]),
        );
        let client = mock.client();

        let teams = get_event_teams(client.gateway(), "e3").await.unwrap();
        assert_eq!(teams.len(), 1);
        assert!(teams[0].is_registered_for("e3"));
        assert_eq!(mock.count("GET", "/teams/e3"), 1);
        assert_eq!(mock.count("GET", "/teams"), 0);
    }
}
