use tether_client::{CallError, CallEvent, ConnectionState, ExitReason, MemoryStore, SessionState};

use crate::integration::{TestParty, create_party, init_tracing};
use crate::utils::{wait_for_event, wait_for_state};

#[tokio::test]
async fn test_answered_room_refuses_second_responder() {
    init_tracing();

    let store = MemoryStore::new();
    let caller = create_party(&store);
    let first = create_party(&store);
    let TestParty {
        controller: late,
        events: mut late_events,
        devices: late_devices,
        transports: late_transports,
    } = create_party(&store);

    let room_id = caller.controller.start().await.expect("Failed to start");
    first.controller.join(&room_id).await.expect("Failed to join");

    let err = late.join(&room_id).await.unwrap_err();
    assert!(
        matches!(&err, CallError::NotJoinable(id) if *id == room_id),
        "Unexpected error: {err}"
    );
    assert_eq!(late_devices.calls(), 0, "Media requested for an answered room");
    assert!(late_transports.created().await.is_empty());

    let answer_writes = store
        .writes_to("rooms", room_id.as_str())
        .iter()
        .filter(|fields| fields.contains_key("answer"))
        .count();
    assert_eq!(answer_writes, 1);

    let exit = wait_for_event(&mut late_events, |e| matches!(e, CallEvent::Exit(_))).await;
    assert_eq!(exit, Some(CallEvent::Exit(ExitReason::NotJoinable)));

    let mut caller_state = caller.controller.state();
    assert!(
        wait_for_state(&mut caller_state, |s| {
            s.connection_state == ConnectionState::Connected
        })
        .await,
        "Original pair did not connect"
    );
    assert_ne!(
        first.controller.state().borrow().session_state,
        SessionState::Ended
    );

    caller.controller.hang_up().await;
    first.controller.hang_up().await;
}
