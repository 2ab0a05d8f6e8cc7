//! In-process chat room demo
//!
//! Run with: cargo run --example local_room
//!
//! Spins up one room and a handful of in-process sessions, each with its own
//! write loop, publishes a burst of messages from every participant, then
//! prints what everyone received plus the room statistics. In a real
//! deployment the sessions would be driven by the transport layer's
//! read/write loops instead.

use std::sync::Arc;

use roomcast::{MessageKind, ParticipantId, Room, RoomConfig, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let room = Arc::new(Room::with_config(
        RoomConfig::named("demo").queue_capacity(32),
    ));

    let names = ["alice", "bob", "carol"];
    let mut sessions = Vec::new();
    let mut receivers = Vec::new();

    for name in names {
        let session = Arc::new(
            Session::connect(Arc::clone(&room), ParticipantId::new(name), name).await?,
        );

        // One write loop per session, independent of everyone else's
        let receiver = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                let mut log = Vec::new();
                while let Some(msg) = session.recv().await {
                    let line = match msg.kind {
                        MessageKind::Chat => format!("<{}> {}", msg.sender, msg.body_text()),
                        MessageKind::Joined => format!("* {} joined", msg.body_text()),
                        MessageKind::Left => format!("* {} left", msg.body_text()),
                    };
                    log.push(line);
                }
                log
            })
        };

        sessions.push(session);
        receivers.push((name, receiver));
    }

    for (round, session) in sessions.iter().enumerate() {
        session
            .send(format!("hello from {} (round {round})", session.name()))
            .await?;
    }

    for session in &sessions {
        session.close().await;
    }

    for (name, receiver) in receivers {
        println!("--- {name} received ---");
        for line in receiver.await? {
            println!("{line}");
        }
    }

    let stats = room.stats().await;
    println!(
        "stats: joins={} published={} dropped={} slow_disconnects={}",
        stats.total_joins, stats.messages_published, stats.messages_dropped,
        stats.slow_disconnects,
    );

    Ok(())
}
