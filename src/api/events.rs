use reqwest::Method;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{Event, EventAction, EventDraft, PlacementAward, RefereeAssignment};

#[instrument(skip(gateway))]
pub(crate) async fn get_events(gateway: &Gateway) -> Result<Vec<Event>> {
    let events: Vec<Event> = gateway.get("/events").await?;
    debug!(count = events.len(), "fetched events");
    Ok(events)
}

#[instrument(skip(gateway))]
pub(crate) async fn get_event(gateway: &Gateway, event_id: &str) -> Result<Event> {
    gateway.get(&format!("/events/{event_id}")).await
}

#[instrument(skip(gateway, draft), fields(name = %draft.name))]
pub(crate) async fn create_event(gateway: &Gateway, draft: &EventDraft) -> Result<Event> {
    draft.validate()?;
    let event: Event = gateway.post("/events", draft).await?;
    info!(event_id = %event.id, "event created");
    Ok(event)
}

#[instrument(skip(gateway, draft))]
pub(crate) async fn update_event(
    gateway: &Gateway,
    event_id: &str,
    draft: &EventDraft,
) -> Result<Event> {
    draft.validate()?;
    gateway.put(&format!("/events/{event_id}"), draft).await
}

#[instrument(skip(gateway))]
pub(crate) async fn delete_event(gateway: &Gateway, event_id: &str) -> Result<()> {
    gateway
        .command(Method::DELETE, &format!("/events/{event_id}"), None::<&()>)
        .await?;
    info!(event_id, "event deleted");
    Ok(())
}

/// `POST /events/{id}/{start|pause|end}`.
#[instrument(skip(gateway))]
pub(crate) async fn send_action(
    gateway: &Gateway,
    event_id: &str,
    action: EventAction,
) -> Result<Option<String>> {
    let message = gateway
        .command(
            Method::POST,
            &format!("/events/{event_id}/{action}"),
            None::<&()>,
        )
        .await?;
    info!(event_id, %action, "lifecycle command accepted");
    Ok(message)
}

#[instrument(skip(gateway))]
pub(crate) async fn award_placement(
    gateway: &Gateway,
    event_id: &str,
    award: &PlacementAward,
) -> Result<Option<String>> {
    gateway
        .command(
            Method::POST,
            &format!("/events/{event_id}/placement"),
            Some(award),
        )
        .await
}

#[instrument(skip(gateway))]
pub(crate) async fn assign_referee(
    gateway: &Gateway,
    event_id: &str,
    assignment: &RefereeAssignment,
) -> Result<Option<String>> {
    gateway
        .command(
            Method::POST,
            &format!("/events/{event_id}/referee"),
            Some(assignment),
        )
        .await
}

#[instrument(skip(gateway))]
pub(crate) async fn export_events(gateway: &Gateway, format: &str, report: &str) -> Result<Vec<u8>> {
    gateway
        .get_blob(
            &format!("/events/export?format={format}&type={report}"),
            "text/csv",
        )
        .await
}
