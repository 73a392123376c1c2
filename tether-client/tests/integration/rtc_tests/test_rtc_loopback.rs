use std::sync::Arc;
use std::time::Duration;

use tether_client::{
    CallConfig, CallController, ConnectionState, MemoryStore, RtcTransportFactory,
    SampleMediaDevices, TransportConfig,
};

use crate::integration::init_tracing;

/// Timeout for ICE connection establishment over loopback (ms).
const CONNECTION_TIMEOUT_MS: u64 = 10000;

fn rtc_controller(store: &MemoryStore) -> CallController {
    let config = CallConfig {
        transport: TransportConfig::local_only(),
        ..CallConfig::default()
    };
    let (controller, _events) = CallController::new(
        config,
        Arc::new(store.clone()),
        Arc::new(SampleMediaDevices::new()),
        Arc::new(RtcTransportFactory),
    );
    controller
}

#[tokio::test]
#[ignore = "runs real ICE over host sockets"]
async fn test_rtc_peers_connect_over_memory_store() {
    init_tracing();

    let store = MemoryStore::new();
    let caller = rtc_controller(&store);
    let callee = rtc_controller(&store);

    let room_id = caller.start().await.expect("Failed to start call");
    callee.join(&room_id).await.expect("Failed to join call");

    for controller in [&caller, &callee] {
        let mut state = controller.state();
        let connected = tokio::time::timeout(
            Duration::from_millis(CONNECTION_TIMEOUT_MS),
            state.wait_for(|s| s.connection_state == ConnectionState::Connected),
        )
        .await;
        assert!(
            matches!(connected, Ok(Ok(_))),
            "Peer connection not established"
        );
    }

    let doc = store.document("rooms", room_id.as_str()).expect("Room missing");
    assert!(doc["offer"]["sdp"].as_str().unwrap().contains("m=audio"));
    assert!(doc["answer"]["sdp"].as_str().unwrap().contains("m=video"));

    caller.hang_up().await;
    callee.hang_up().await;
}
