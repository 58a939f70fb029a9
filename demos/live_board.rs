//! Watch the live board and write the summary report next to the binary.
//!
//! ```sh
//! LOUNGE_API_URL=http://localhost:5000 LOUNGE_TOKEN=... cargo run --example live_board
//! ```

use lounge_admin::{ClientConfig, EventStatus, LoungeClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lounge_admin=debug,live_board=info".into()),
        )
        .init();

    let client = LoungeClient::from_config(ClientConfig::from_env()?)?;
    let mut poller = client.poll_live_board();

    for _ in 0..3 {
        let Some(state) = poller.next_update().await else {
            break;
        };
        if state.loading {
            continue;
        }
        if let Some(error) = &state.error {
            eprintln!("refresh failed: {error}");
        }
        if let Some(board) = &state.data {
            let live = board.with_status(EventStatus::InProgress).count();
            println!(
                "{} events ({live} live), {} participants",
                board.events.len(),
                board.snapshot.total_participants
            );
            for entry in &board.events {
                println!(
                    "  [{}] {} - {} registered, {} verified",
                    entry.event.status, entry.event.name, entry.participant_count, entry.verified_count
                );
            }
        }
    }
    poller.stop();

    let report = client.build_report().await?;
    std::fs::write("lounge-report.html", report.to_html())?;
    println!("wrote lounge-report.html ({} pages)", report.page_count());
    Ok(())
}
