//! Concurrency stress test for the broadcast core
//!
//! N sessions publish K messages each, concurrently, while every session
//! drains its own queue. With queues sized to absorb the whole burst, every
//! participant must end up with exactly (N-1) x K chat messages, none of
//! them its own, and each sender's messages in publish order.

use std::collections::HashMap;
use std::sync::Arc;

use roomcast::{MessageKind, ParticipantId, Room, RoomConfig, Session};

const SENDERS: usize = 8;
const MESSAGES_PER_SENDER: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_every_recipient_sees_every_message_in_sender_order() {
    let capacity = SENDERS * MESSAGES_PER_SENDER + SENDERS;
    let room = Arc::new(Room::with_config(
        RoomConfig::named("stress").queue_capacity(capacity),
    ));

    let mut sessions = Vec::new();
    for n in 0..SENDERS {
        let session = Session::connect(
            Arc::clone(&room),
            ParticipantId::new(format!("s{n}")),
            format!("sender-{n}"),
        )
        .await
        .unwrap();
        sessions.push(Arc::new(session));
    }

    // Write loops: collect (sender, sequence number) pairs per recipient.
    let mut receivers = Vec::new();
    for session in &sessions {
        let session = Arc::clone(session);
        receivers.push(tokio::spawn(async move {
            let mut seen: Vec<(ParticipantId, usize)> = Vec::new();
            while let Some(msg) = session.recv().await {
                if msg.kind == MessageKind::Chat {
                    let seq: usize = msg.body_text().parse().unwrap();
                    seen.push((msg.sender.clone(), seq));
                }
            }
            (session.id().clone(), seen)
        }));
    }

    // Read loops: all publishers run concurrently.
    let mut publishers = Vec::new();
    for session in &sessions {
        let session = Arc::clone(session);
        publishers.push(tokio::spawn(async move {
            for seq in 0..MESSAGES_PER_SENDER {
                session.send(seq.to_string()).await.unwrap();
            }
        }));
    }
    for publisher in publishers {
        publisher.await.unwrap();
    }

    let stats = room.stats().await;
    assert_eq!(
        stats.messages_published,
        (SENDERS * MESSAGES_PER_SENDER) as u64
    );
    assert_eq!(stats.messages_dropped, 0);
    assert_eq!(stats.slow_disconnects, 0);

    for session in &sessions {
        session.close().await;
    }

    for receiver in receivers {
        let (recipient, seen) = receiver.await.unwrap();

        // Exactly (N-1) x K chat messages, no echo
        assert_eq!(
            seen.len(),
            (SENDERS - 1) * MESSAGES_PER_SENDER,
            "recipient {recipient} message count"
        );
        assert!(seen.iter().all(|(sender, _)| *sender != recipient));

        // Per-sender FIFO: each sender's sequence numbers arrive in order
        let mut by_sender: HashMap<ParticipantId, Vec<usize>> = HashMap::new();
        for (sender, seq) in seen {
            by_sender.entry(sender).or_default().push(seq);
        }
        assert_eq!(by_sender.len(), SENDERS - 1);
        for (sender, seqs) in by_sender {
            assert_eq!(seqs.len(), MESSAGES_PER_SENDER, "from {sender}");
            assert!(
                seqs.windows(2).all(|w| w[0] < w[1]),
                "out-of-order delivery from {sender}"
            );
        }
    }

    assert!(room.is_empty().await);
}
