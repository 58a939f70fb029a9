//! Realtime leaderboard fed by the backend's socket.io channel.
//!
//! Only the websocket transport is spoken. The feed answers engine.io pings
//! and joins the default namespace; it never acknowledges events.

use std::collections::HashMap;

use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, instrument, trace, warn};

use crate::error::{LoungeError, Result};
use crate::model::{Event, LeaderboardPlacement, LeaderboardUpdate, Team};

pub const LEADERBOARD_EVENT: &str = "leaderboard:update";

/// Latest placements per event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: HashMap<String, LeaderboardUpdate>,
}

impl Leaderboard {
    /// Seed from placements already recorded on fetched events.
    pub fn from_events(events: &[Event], teams: &[Team]) -> Self {
        let entries = events
            .iter()
            .filter(|e| !e.placements.is_empty())
            .map(|event| {
                let placements = event
                    .placements
                    .iter()
                    .map(|p| LeaderboardPlacement {
                        rank: p.rank,
                        team_name: p
                            .team_id
                            .as_deref()
                            .and_then(|id| teams.iter().find(|t| t.id == id))
                            .map(|t| t.name.clone()),
                        participant_email: p.participant_email.clone(),
                        points: None,
                    })
                    .collect();
                let update = LeaderboardUpdate {
                    event_id: event.id.clone(),
                    event_name: event.name.clone(),
                    category: event.category,
                    placements,
                };
                (event.id.clone(), update)
            })
            .collect();
        Self { entries }
    }

    /// Replace the entry for the update's event. Returns false if nothing changed.
    pub fn apply(&mut self, mut update: LeaderboardUpdate) -> bool {
        update.placements.sort_by_key(|p| p.rank);
        if self.entries.get(&update.event_id) == Some(&update) {
            return false;
        }
        self.entries.insert(update.event_id.clone(), update);
        true
    }

    pub fn get(&self, event_id: &str) -> Option<&LeaderboardUpdate> {
        self.entries.get(event_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LeaderboardUpdate> {
        self.entries.values()
    }
}

/// A decoded engine.io / socket.io text frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Open,
    Close,
    Ping,
    Connected,
    Event { name: String, payload: Value },
    Other,
}

pub(crate) fn parse_frame(text: &str) -> Frame {
    let mut chars = text.chars();
    match chars.next() {
        Some('0') => Frame::Open,
        Some('1') => Frame::Close,
        Some('2') => Frame::Ping,
        Some('4') => match chars.next() {
            Some('0') => Frame::Connected,
            Some('2') => parse_event(chars.as_str()),
            _ => Frame::Other,
        },
        _ => Frame::Other,
    }
}

/// `[/namespace,][ackId]["name", payload]`
fn parse_event(body: &str) -> Frame {
    let Some(start) = body.find('[') else {
        return Frame::Other;
    };
    let Ok(mut args) = serde_json::from_str::<Vec<Value>>(&body[start..]) else {
        return Frame::Other;
    };
    if args.is_empty() {
        return Frame::Other;
    }
    let payload = if args.len() > 1 {
        args.swap_remove(1)
    } else {
        Value::Null
    };
    match args.swap_remove(0) {
        Value::String(name) => Frame::Event { name, payload },
        _ => Frame::Other,
    }
}

/// Stream of leaderboard updates from one socket connection.
/// Dropping the feed closes the connection.
pub struct LeaderboardFeed {
    updates: mpsc::UnboundedReceiver<LeaderboardUpdate>,
    task: JoinHandle<Result<()>>,
}

impl LeaderboardFeed {
    #[instrument]
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| socket_error(url, e))?;
        debug!(url, "leaderboard socket connected");

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(pump(url.to_owned(), stream, tx));
        Ok(Self { updates: rx, task })
    }

    /// Next update, or `None` once the connection has ended.
    pub async fn next(&mut self) -> Option<LeaderboardUpdate> {
        self.updates.recv().await
    }

    /// Apply updates to `board` until the connection ends.
    pub async fn follow(mut self, board: &mut Leaderboard) -> Result<()> {
        while let Some(update) = self.updates.recv().await {
            board.apply(update);
        }
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "leaderboard task ended abnormally");
                Ok(())
            }
        }
    }
}

impl Drop for LeaderboardFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn socket_error(url: &str, source: WsError) -> LoungeError {
    LoungeError::Socket {
        url: url.to_owned(),
        source: Box::new(source),
    }
}

async fn pump<S>(
    url: String,
    stream: S,
    tx: mpsc::UnboundedSender<LeaderboardUpdate>,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
{
    let (mut sink, mut source) = stream.split();
    while let Some(message) = source.next().await {
        let text = match message.map_err(|e| socket_error(&url, e))? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match parse_frame(&text) {
            Frame::Open => sink
                .send(Message::Text("40".into()))
                .await
                .map_err(|e| socket_error(&url, e))?,
            Frame::Ping => sink
                .send(Message::Text("3".into()))
                .await
                .map_err(|e| socket_error(&url, e))?,
            Frame::Event { name, payload } if name == LEADERBOARD_EVENT => {
                match serde_json::from_value::<LeaderboardUpdate>(payload) {
                    Ok(update) => {
                        trace!(event_id = %update.event_id, "leaderboard update");
                        if tx.send(update).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "ignoring malformed leaderboard update"),
                }
            }
            Frame::Close => break,
            _ => {}
        }
    }
    debug!(url, "leaderboard socket closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade};
    use axum::extract::State;
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::aggregate::tests::{event, team};
    use crate::model::{EventCategory, Placement, Rank};

    fn update_json() -> Value {
        json!({
            "eventId": "e1",
            "eventName": "Friday Fights",
            "category": "team-battle",
            "placements": [
                { "rank": 2, "teamName": "Blue" },
                { "rank": 1, "teamName": "Red", "points": 30 }
            ]
        })
    }

    #[test]
    fn test_parse_frames() {
        assert_eq!(parse_frame(r#"0{"sid":"x"}"#), Frame::Open);
        assert_eq!(parse_frame("2"), Frame::Ping);
        assert_eq!(parse_frame("40"), Frame::Connected);
        assert_eq!(parse_frame("41"), Frame::Other);
        assert_eq!(
            parse_frame(r#"42["leaderboard:update",{"eventId":"e1"}]"#),
            Frame::Event {
                name: LEADERBOARD_EVENT.to_string(),
                payload: json!({ "eventId": "e1" })
            }
        );
        assert_eq!(
            parse_frame(r#"42/admin,7["ping",1]"#),
            Frame::Event {
                name: "ping".to_string(),
                payload: json!(1)
            }
        );
        assert_eq!(parse_frame("42not json"), Frame::Other);
    }

    #[test]
    fn test_apply_replaces_and_sorts() {
        let mut board = Leaderboard::default();
        let update: LeaderboardUpdate = serde_json::from_value(update_json()).unwrap();

        assert!(board.apply(update.clone()));
        assert!(!board.apply(update));
        let entry = board.get("e1").unwrap();
        assert_eq!(entry.placements[0].rank, Rank::First);
        assert_eq!(entry.placements[0].team_name.as_deref(), Some("Red"));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_seed_from_events_names_teams() {
        let mut ev = event("e1", EventCategory::TeamBattle, &[]);
        ev.placements = vec![Placement {
            team_id: Some("t1".to_string()),
            participant_email: None,
            rank: Rank::First,
            awarded_at: None,
        }];
        let idle = event("e2", EventCategory::SingleBattle, &[]);
        let teams = vec![team("t1", &[], &["e1"])];

        let board = Leaderboard::from_events(&[ev, idle], &teams);
        assert_eq!(board.len(), 1);
        assert_eq!(
            board.get("e1").unwrap().placements[0].team_name.as_deref(),
            Some("Team t1")
        );
    }

    async fn socket_handler(
        ws: WebSocketUpgrade,
        State(seen): State<Arc<Mutex<Vec<String>>>>,
    ) -> Response {
        ws.on_upgrade(move |socket| serve_socket(socket, seen))
    }

    async fn serve_socket(mut socket: WebSocket, seen: Arc<Mutex<Vec<String>>>) {
        let open = r#"0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}"#;
        if socket.send(AxumMessage::Text(open.to_string())).await.is_err() {
            return;
        }
        if let Some(Ok(AxumMessage::Text(reply))) = socket.recv().await {
            seen.lock().push(reply);
        }
        let _ = socket.send(AxumMessage::Text("2".to_string())).await;
        if let Some(Ok(AxumMessage::Text(reply))) = socket.recv().await {
            seen.lock().push(reply);
        }
        let _ = socket
            .send(AxumMessage::Text(r#"42["chat:message",{"text":"hi"}]"#.to_string()))
            .await;
        let frame = format!(r#"42["{LEADERBOARD_EVENT}",{}]"#, update_json());
        let _ = socket.send(AxumMessage::Text(frame)).await;
        while let Some(Ok(_)) = socket.recv().await {}
    }

    #[tokio::test]
    async fn test_feed_handshakes_and_delivers_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/socket.io/", get(socket_handler))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = format!("ws://{addr}/socket.io/?EIO=4&transport=websocket");
        let mut feed = LeaderboardFeed::connect(&url).await.unwrap();
        let update = feed.next().await.unwrap();

        assert_eq!(update.event_id, "e1");
        assert_eq!(update.category, EventCategory::TeamBattle);
        assert_eq!(update.placements.len(), 2);
        assert_eq!(*seen.lock(), vec!["40".to_string(), "3".to_string()]);
    }
}
