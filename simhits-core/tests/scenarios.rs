#![allow(clippy::float_cmp)]
use ndarray::array;
use simhits_core::{
    DataStore, EventFlattening, HitArrayExtractor, SimEvent, SimHit, SimTrack, ValueStore,
};

fn publish(event: &SimEvent, store: &mut DataStore) -> usize {
    HitArrayExtractor::new()
        .extract(event)
        .unwrap()
        .publish(store)
}

#[test]
fn scenario_a_no_tracks_no_hits_is_skipped() {
    let event = SimEvent::new(0);
    let out = HitArrayExtractor::new().extract(&event).unwrap();
    assert!(out.is_skip());

    let mut store = DataStore::new();
    assert_eq!(out.publish(&mut store), 0);
    assert_eq!(store.set_calls(), 0);
    assert!(store.is_empty());
}

#[test]
fn scenario_b_single_track_three_hits() {
    let event = SimEvent::new(1)
        .with_track(SimTrack::new(1.0, 2.0, 3.0, 0.5))
        .with_hit(SimHit::new(10, 2, 1.1))
        .with_hit(SimHit::new(20, 5, 2.2))
        .with_hit(SimHit::new(30, 1, 3.3));

    let mut store = DataStore::new();
    assert_eq!(publish(&event, &mut store), 7);
    assert_eq!(store.set_calls(), 7);

    assert_eq!(store.scalar("x").unwrap(), 1.0);
    assert_eq!(store.scalar("y").unwrap(), 2.0);
    assert_eq!(store.scalar("z").unwrap(), 3.0);
    assert_eq!(store.scalar("edep").unwrap(), 0.5);
    assert_eq!(store.int_array("pmtid").unwrap(), &array![10, 20, 30]);
    assert_eq!(store.int_array("npe").unwrap(), &array![2, 5, 1]);
    assert_eq!(store.float_array("hittime").unwrap(), &array![1.1, 2.2, 3.3]);
}

#[test]
fn scenario_c_tracks_without_hits_withholds_scalars() {
    let event = SimEvent::new(2)
        .with_track(SimTrack::new(1.0, 1.0, 1.0, 1.0))
        .with_track(SimTrack::new(9.0, 9.0, 9.0, 9.9));

    let mut store = DataStore::new();
    assert_eq!(publish(&event, &mut store), 0);
    assert_eq!(store.set_calls(), 0);
    assert!(store.get("x").is_none());
    assert!(store.get("edep").is_none());
}

#[test]
fn scenario_d_last_track_wins() {
    let event = SimEvent::new(3)
        .with_track(SimTrack::new(100.0, 200.0, 300.0, 40.0))
        .with_track(SimTrack::new(-1.0, -2.0, -3.0, 0.25))
        .with_hit(SimHit::new(5, 1, 0.5));

    let mut store = DataStore::new();
    publish(&event, &mut store);

    assert_eq!(store.scalar("x").unwrap(), -1.0);
    assert_eq!(store.scalar("y").unwrap(), -2.0);
    assert_eq!(store.scalar("z").unwrap(), -3.0);
    assert_eq!(store.scalar("edep").unwrap(), 0.25);
}

#[test]
fn arrays_follow_hit_order_for_any_count() {
    for n in 1..50_i32 {
        let mut event = SimEvent::new(n).with_track(SimTrack::new(0.0, 0.0, 0.0, 1.0));
        // Descending pmt ids so any sorting would show up.
        for i in 0..n {
            event = event.with_hit(SimHit::new(1000 - i, i % 7, f64::from(i) * 0.5));
        }

        let mut store = DataStore::new();
        publish(&event, &mut store);

        let pmt_id = store.int_array("pmtid").unwrap();
        let npe = store.int_array("npe").unwrap();
        let hit_time = store.float_array("hittime").unwrap();
        let expected_len = usize::try_from(n).unwrap();
        assert_eq!(pmt_id.len(), expected_len);
        assert_eq!(npe.len(), expected_len);
        assert_eq!(hit_time.len(), expected_len);

        for (i, hit) in event.hits.iter().enumerate() {
            assert_eq!(pmt_id[i], hit.pmt_id);
            assert_eq!(npe[i], hit.npe);
            assert_eq!(hit_time[i], hit.hit_time);
        }
    }
}

#[test]
fn extraction_is_idempotent_and_leaves_input_untouched() {
    let event = SimEvent::new(4)
        .with_track(SimTrack::new(1.5, -2.5, 3.5, 0.75))
        .with_hit(SimHit::new(1, 3, 12.5))
        .with_hit(SimHit::new(2, 4, 13.5));
    let before = event.clone();

    let extractor = HitArrayExtractor::new();
    let first = extractor.extract(&event).unwrap();
    let second = extractor.extract(&event).unwrap();

    assert_eq!(first, second);
    assert_eq!(event, before);

    let a = first.arrays().unwrap();
    let b = second.arrays().unwrap();
    let bits = |v: &[f64]| v.iter().map(|t| t.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a.hit_time), bits(&b.hit_time));
}

#[test]
fn trackless_event_extracts_bitwise_identical() {
    let event = SimEvent::new(5).with_hit(SimHit::new(1, 1, 1.0));

    let extractor = HitArrayExtractor::new();
    let first = extractor.extract(&event).unwrap();
    let second = extractor.extract(&event).unwrap();

    // NaN vertex: IEEE equality fails, the bits agree.
    assert_ne!(first, second);

    let a = first.scalars().unwrap();
    let b = second.scalars().unwrap();
    for (x, y) in [(a.x, b.x), (a.y, b.y), (a.z, b.z), (a.edep, b.edep)] {
        assert!(x.is_nan());
        assert_eq!(x.to_bits(), y.to_bits());
    }
    assert_eq!(first.arrays(), second.arrays());
}
