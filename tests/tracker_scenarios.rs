//! End-to-end scenarios for the publish-tracking queue

mod common;

use common::{scenario_config, tracker, SequentialTransport};

#[test]
fn steady_state_publish_and_ack() {
    let (mut q, _clock) = tracker(scenario_config());
    let mut transport = SequentialTransport::new();

    assert_eq!(q.publish(&mut transport, "a", b"1", false).unwrap(), 1);
    assert_eq!(q.publish(&mut transport, "b", b"2", false).unwrap(), 2);
    assert_eq!(q.publish(&mut transport, "c", b"3", false).unwrap(), 3);

    assert!(q.on_published(1));
    assert!(q.on_published(2));
    assert!(q.on_published(3));

    assert_eq!(q.occupied(), 0);
    assert_eq!(q.dyn_block_count(), 0);
    let stats = q.stats();
    assert_eq!(stats.max_burst, 3);
    assert_eq!(stats.timeout_count, 0);
}

#[test]
fn burst_overflows_into_one_block() {
    let (mut q, _clock) = tracker(scenario_config());
    let mut transport = SequentialTransport::new();

    for i in 1..=4 {
        assert_eq!(q.publish(&mut transport, "t", b"p", false).unwrap(), i);
    }

    assert_eq!(q.occupied(), 4);
    assert_eq!(q.dyn_block_count(), 1);
    assert_eq!(q.stats().max_burst, 4);
}

#[test]
fn saturated_queue_evicts_the_oldest() {
    // One dynamic block only: capacity 3 + 3 = 6.
    let (mut q, clock) = tracker(scenario_config().with_max_dynamic_blocks(1));
    let mut transport = SequentialTransport::new();

    for i in 1..=6 {
        clock.advance_ms(1);
        assert_eq!(q.publish(&mut transport, "t", b"p", false).unwrap(), i);
    }
    assert_eq!(q.occupied(), 6);

    // Seventh publish: no free slot, no growth headroom; the oldest
    // occupant (id 1) is dropped and its slot reused.
    clock.advance_ms(1);
    assert_eq!(q.publish(&mut transport, "t", b"p", false).unwrap(), 7);
    assert_eq!(q.occupied(), 6);
    assert_eq!(q.stats().max_burst, 6);

    // The evicted message's ack is now late.
    assert!(!q.on_published(1));
    assert_eq!(q.stats().late_ack_count, 1);
    // Its replacement is still tracked.
    assert!(q.on_published(7));
}

#[test]
fn timeout_sweep_frees_overdue_slots() {
    let (mut q, clock) = tracker(scenario_config());
    let mut transport = SequentialTransport::new();

    q.publish(&mut transport, "a", b"1", false).unwrap();
    q.publish(&mut transport, "b", b"2", false).unwrap();

    clock.advance_ms(150);
    q.tick();

    assert_eq!(q.occupied(), 0);
    assert_eq!(q.stats().timeout_count, 2);

    assert!(!q.on_published(1));
    assert!(!q.on_published(2));
    assert_eq!(q.stats().late_ack_count, 2);
}

#[test]
fn idle_block_is_reclaimed_after_quiet_period() {
    let (mut q, clock) = tracker(scenario_config());
    let mut transport = SequentialTransport::new();

    // Four publishes force one dynamic block.
    for _ in 0..4 {
        q.publish(&mut transport, "t", b"p", false).unwrap();
    }
    assert_eq!(q.dyn_block_count(), 1);

    // Free everything; acks keep slots from timing out first.
    for id in 1..=4 {
        assert!(q.on_published(id));
    }

    clock.advance_ms(100);
    q.tick();
    assert_eq!(q.dyn_block_count(), 1);

    clock.advance_ms(500);
    q.tick();
    assert_eq!(q.dyn_block_count(), 0);
}

#[test]
fn provisional_id_rebind_makes_the_ack_match() {
    let (mut q, _clock) = tracker(scenario_config());

    q.track("x", b"y", false, -42).unwrap();
    q.rebind(-42, 17);

    assert!(q.on_published(17));
    assert_eq!(q.occupied(), 0);
    assert_eq!(q.stats().late_ack_count, 0);
}

mod invariants {
    use super::*;

    #[test]
    fn occupancy_never_exceeds_the_resident_ceiling() {
        let config = scenario_config();
        let ceiling = config.max_tracked();
        let (mut q, clock) = tracker(config);
        let mut transport = SequentialTransport::new();

        for _ in 0..40 {
            clock.advance_ms(1);
            q.publish(&mut transport, "t", b"p", false).unwrap();
            assert!(q.occupied() <= ceiling);
        }
        assert_eq!(q.occupied(), ceiling);
        assert_eq!(q.stats().max_burst, ceiling);
    }

    #[test]
    fn settled_ack_is_idempotent_across_ticks() {
        let (mut q, clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        let id = q.publish(&mut transport, "t", b"p", false).unwrap();
        assert!(q.on_published(id));

        let before = q.occupied();
        assert!(!q.on_published(id));
        clock.advance_ms(1_000);
        q.tick();
        assert_eq!(q.occupied(), before);
        assert_eq!(q.stats().timeout_count, 0);
    }

    #[test]
    fn rebind_then_ack_matches_the_original_slot() {
        let (mut q, _clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        let provisional = q.publish(&mut transport, "t", b"p", false).unwrap();
        q.rebind(provisional, 500);

        assert!(!q.on_published(provisional));
        assert!(q.on_published(500));
        assert_eq!(q.occupied(), 0);
    }

    #[test]
    fn counters_are_monotonic_across_activity() {
        let (mut q, clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        let mut last = q.stats();
        for round in 0..10 {
            q.publish(&mut transport, "t", b"payload", false).unwrap();
            if round % 3 == 0 {
                clock.advance_ms(150);
            } else {
                clock.advance_ms(10);
            }
            q.tick();

            let now = q.stats();
            assert!(now.max_burst >= last.max_burst);
            assert!(now.max_payload_len >= last.max_payload_len);
            assert!(now.timeout_count >= last.timeout_count);
            assert!(now.late_ack_count >= last.late_ack_count);
            last = now;
        }
    }

    #[test]
    fn tick_leaves_no_free_block_without_an_idle_stamp() {
        let (mut q, clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        for _ in 0..6 {
            q.publish(&mut transport, "t", b"p", false).unwrap();
        }
        assert_eq!(q.dyn_block_count(), 1);

        // Expire everything, then tick again shortly after: the block is
        // fully free and must already carry its idle stamp, so the second
        // tick cannot restart the idle countdown.
        clock.advance_ms(150);
        q.tick();
        assert_eq!(q.occupied(), 0);
        assert_eq!(q.dyn_block_count(), 1);

        clock.advance_ms(400);
        q.tick();
        assert_eq!(q.dyn_block_count(), 1);

        // 150 + 400 + 101 > 100 (ack) + 500 (idle): reclaimed now.
        clock.advance_ms(101);
        q.tick();
        assert_eq!(q.dyn_block_count(), 0);
    }

    #[test]
    fn clear_all_resets_slots_blocks_and_counters() {
        let (mut q, clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        for _ in 0..5 {
            q.publish(&mut transport, "t", b"p", false).unwrap();
        }
        clock.advance_ms(150);
        q.tick();

        q.clear_all();
        assert_eq!(q.occupied(), 0);
        assert_eq!(q.dyn_block_count(), 0);
        assert_eq!(q.stats(), outflight::QueueStats::default());

        // Idempotent re-initialisation.
        q.clear_all();
        assert_eq!(q.occupied(), 0);
    }
}

mod transport_contract {
    use super::*;

    #[test]
    fn published_frames_carry_qos1_and_the_stored_copies() {
        let (mut q, _clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        q.publish(&mut transport, "sensor/1", b"21.5", true).unwrap();

        let (topic, payload, qos, retain) = &transport.published[0];
        assert_eq!(topic, "sensor/1");
        assert_eq!(payload, b"21.5");
        assert_eq!(*qos, 1);
        assert!(*retain);
    }

    #[test]
    fn clamped_topic_remains_valid_utf8() {
        let (mut q, _clock) = tracker(scenario_config());
        let mut transport = SequentialTransport::new();

        // The 15-byte capacity lands in the middle of the two-byte 'ü';
        // the clamp must back off to the previous boundary.
        let topic = "temperature/aaü";
        q.publish(&mut transport, topic, b"1", false).unwrap();

        let (stored, ..) = &transport.published[0];
        assert_eq!(stored, "temperature/aa");
        assert!(topic.starts_with(stored.as_str()));
    }
}
