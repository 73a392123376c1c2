use tether_client::{CallEvent, ConnectionState, ExitReason, MemoryStore, SessionState};

use crate::integration::{TestParty, create_party, init_tracing};
use crate::utils::{settle, wait_for_event, wait_for_state};

async fn connected_pair(store: &MemoryStore) -> (TestParty, TestParty) {
    let caller = create_party(store);
    let callee = create_party(store);

    let room_id = caller.controller.start().await.expect("Failed to start call");
    callee
        .controller
        .join(&room_id)
        .await
        .expect("Failed to join call");

    for party in [&caller, &callee] {
        let mut state = party.controller.state();
        assert!(
            wait_for_state(&mut state, |s| s.connection_state == ConnectionState::Connected)
                .await,
            "Party never connected"
        );
    }
    (caller, callee)
}

fn status_writes(store: &MemoryStore, room: &str) -> usize {
    store
        .writes_to("rooms", room)
        .iter()
        .filter(|w| w.contains_key("status"))
        .count()
}

#[tokio::test]
async fn test_responder_observes_initiator_hang_up() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut caller, mut callee) = connected_pair(&store).await;
    let room_id = caller.controller.room_id().expect("No room id");

    caller.controller.hang_up().await;

    let exit = wait_for_event(&mut callee.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert_eq!(exit, Some(CallEvent::Exit(ExitReason::RemoteEnded)));

    let mut state = callee.controller.state();
    assert!(wait_for_state(&mut state, |s| s.session_state == SessionState::Ended).await);
    assert!(callee.devices.streams().await[0].all_stopped());
    assert!(callee.transports.only().await.is_closed());

    // The responder's own hang up after the fact writes nothing.
    callee.controller.hang_up().await;
    settle().await;
    assert_eq!(status_writes(&store, room_id.as_str()), 1);

    let exit = wait_for_event(&mut caller.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert_eq!(exit, Some(CallEvent::Exit(ExitReason::HungUp)));
}

#[tokio::test]
async fn test_initiator_observes_responder_hang_up() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut caller, callee) = connected_pair(&store).await;
    let room_id = caller.controller.room_id().expect("No room id");

    callee.controller.hang_up().await;

    let exit = wait_for_event(&mut caller.events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert_eq!(exit, Some(CallEvent::Exit(ExitReason::RemoteEnded)));
    assert!(caller.devices.streams().await[0].all_stopped());
    assert_eq!(status_writes(&store, room_id.as_str()), 1);
}
