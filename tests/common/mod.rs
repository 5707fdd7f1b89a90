//! Shared fixtures for integration tests

use std::sync::Arc;
use std::time::Duration;

use outflight::{ManualClock, PublishTracker, QueueConfig, Transport};

/// Transport that assigns consecutive ids starting at 1
pub struct SequentialTransport {
    next_id: i32,
    pub published: Vec<(String, Vec<u8>, u8, bool)>,
}

impl SequentialTransport {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            published: Vec::new(),
        }
    }
}

impl Transport for SequentialTransport {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: u8, retain: bool) -> i32 {
        self.published
            .push((topic.to_string(), payload.to_vec(), qos, retain));
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Scenario configuration from the acceptance suite:
/// 3 static slots, 3-slot blocks, 2 blocks, 16-byte buffers,
/// 100 ms ack timeout, 500 ms idle timeout.
pub fn scenario_config() -> QueueConfig {
    QueueConfig::new()
        .with_static_slots(3)
        .with_dyn_block_slots(3)
        .with_max_dynamic_blocks(2)
        .with_topic_max(16)
        .with_payload_max(16)
        .with_ack_timeout(Duration::from_millis(100))
        .with_dyn_block_idle_timeout(Duration::from_millis(500))
}

pub fn tracker(config: QueueConfig) -> (PublishTracker, Arc<ManualClock>) {
    init_logging();
    let clock = Arc::new(ManualClock::new());
    let tracker = PublishTracker::with_clock(config, clock.clone()).unwrap();
    (tracker, clock)
}

/// Route tracing output into the captured test output; later calls are no-ops
fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
