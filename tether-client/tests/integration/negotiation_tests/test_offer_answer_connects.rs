use serde_json::json;

use tether_client::{CallEvent, ConnectionState, MemoryStore, SessionState};

use crate::integration::{create_party, init_tracing};
use crate::utils::{FAKE_CANDIDATES_PER_SIDE, wait_for_event, wait_for_state};

#[tokio::test]
async fn test_offer_and_answer_connect_both_sides() {
    init_tracing();

    let store = MemoryStore::new();
    let mut caller = create_party(&store);
    let mut callee = create_party(&store);

    let room_id = caller.controller.start().await.expect("Failed to start call");
    callee
        .controller
        .join(&room_id)
        .await
        .expect("Failed to join call");

    for party in [&caller, &callee] {
        let mut state = party.controller.state();
        assert!(
            wait_for_state(&mut state, |s| {
                s.connection_state == ConnectionState::Connected
                    && s.session_state == SessionState::Connected
                    && s.remote_stream_available
            })
            .await,
            "Party never connected"
        );
    }

    let doc = store.document("rooms", room_id.as_str()).expect("Room missing");
    assert_eq!(doc["offer"], json!({ "type": "offer", "sdp": "v=0 offer t0" }));
    assert_eq!(doc["answer"], json!({ "type": "answer", "sdp": "v=0 answer t0" }));
    assert_eq!(doc["status"], json!("live"));

    assert_eq!(
        store
            .records("rooms", room_id.as_str(), "callerCandidates")
            .len(),
        FAKE_CANDIDATES_PER_SIDE
    );
    assert_eq!(
        store
            .records("rooms", room_id.as_str(), "calleeCandidates")
            .len(),
        FAKE_CANDIDATES_PER_SIDE
    );

    let caller_transport = caller.transports.only().await;
    let callee_transport = callee.transports.only().await;
    assert_eq!(
        caller_transport.applied_candidates().await,
        vec!["candidate:t0-0", "candidate:t0-1"]
    );
    assert_eq!(callee_transport.applied_candidates().await.len(), FAKE_CANDIDATES_PER_SIDE);
    assert_eq!(caller_transport.applied_before_remote(), 0);
    assert_eq!(callee_transport.applied_before_remote(), 0);
    assert_eq!(caller_transport.tracks().await, vec!["audio-0", "video-0"]);

    for party in [&mut caller, &mut callee] {
        let remote = wait_for_event(&mut party.events, |e| {
            matches!(e, CallEvent::RemoteStream(_))
        })
        .await;
        assert!(remote.is_some(), "Remote stream never surfaced");
    }

    caller.controller.hang_up().await;
    callee.controller.hang_up().await;
}
