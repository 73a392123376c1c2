use tether_client::{ConnectionState, MemoryStore};

use crate::integration::{create_party, init_tracing};
use crate::utils::{settle, wait_for_state};

#[tokio::test]
async fn test_redelivered_answer_applies_once() {
    init_tracing();

    let store = MemoryStore::new();
    let caller = create_party(&store);
    let callee = create_party(&store);

    let room_id = caller.controller.start().await.expect("Failed to start call");
    callee
        .controller
        .join(&room_id)
        .await
        .expect("Failed to join call");

    let mut state = caller.controller.state();
    assert!(wait_for_state(&mut state, |s| s.connection_state == ConnectionState::Connected).await);

    store.redeliver("rooms", room_id.as_str());
    store.redeliver("rooms", room_id.as_str());
    settle().await;

    let transport = caller.transports.only().await;
    assert_eq!(transport.remote_set_count(), 1);
    assert_eq!(
        caller.controller.state().borrow().connection_state,
        ConnectionState::Connected
    );

    caller.controller.hang_up().await;
}
