//! Relay semantics: drop-not-overwrite, no stale takes, and race freedom
//! under a flat-out producer.

use proptest::prelude::*;
use scale_core::mocks::CountingScale;
use scale_core::relay::{self, Deposit, TakeError};
use scale_core::sampler::Sampler;
use scale_traits::Reading;
use std::time::Duration;

proptest! {
    #[test]
    fn n_deposits_without_take_retain_the_first(
        weights in prop::collection::vec(0.0f64..500.0, 2..50),
    ) {
        let (w, r) = relay::channel();
        let outcomes: Vec<Deposit> = weights
            .iter()
            .map(|&kg| w.deposit(Reading::stable(kg)).unwrap())
            .collect();
        prop_assert_eq!(outcomes[0], Deposit::Stored);
        prop_assert!(outcomes[1..].iter().all(|d| *d == Deposit::Dropped));
        prop_assert_eq!(r.try_take(), Some(Reading::stable(weights[0])));
        prop_assert_eq!(r.try_take(), None);
    }
}

#[test]
fn deposit_a_then_b_take_returns_a_and_second_take_waits() {
    let (w, r) = relay::channel();
    let a = Reading::stable(1.25);
    let b = Reading::unstable(7.5);
    w.deposit(a).unwrap();
    w.deposit(b).unwrap();
    assert_eq!(r.take(), Ok(a));
    assert_eq!(r.take_timeout(Duration::from_millis(50)), Err(TakeError::Timeout));
}

#[test]
fn deposit_never_blocks_while_a_reader_is_parked() {
    let (w, r) = relay::channel();
    let waiter = std::thread::spawn(move || r.take());
    std::thread::sleep(Duration::from_millis(10));
    let start = std::time::Instant::now();
    for i in 0..10_000 {
        w.deposit(Reading::stable(f64::from(i))).unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(1));
    let got = waiter.join().unwrap().unwrap();
    assert_eq!(got.weight.fract(), 0.0);
}

#[test]
fn concurrent_readers_each_get_distinct_values() {
    let (w, r) = relay::channel();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let r = r.clone();
            std::thread::spawn(move || r.take_timeout(Duration::from_secs(5)))
        })
        .collect();
    let mut sent = 0u32;
    while sent < 4 {
        if w.deposit(Reading::stable(f64::from(sent))).unwrap() == Deposit::Stored {
            sent += 1;
        }
        std::thread::yield_now();
    }
    let mut got: Vec<u32> = readers
        .into_iter()
        .map(|t| t.join().unwrap().unwrap().weight as u32)
        .collect();
    got.sort_unstable();
    assert_eq!(got, vec![0, 1, 2, 3]);
}

#[test]
fn stress_consumer_sees_only_genuine_increasing_sequence_numbers() {
    let (w, r) = relay::channel();
    let sampler = Sampler::spawn(CountingScale::default(), w, Duration::from_millis(10));

    let mut seen = Vec::with_capacity(300);
    for i in 0..300 {
        let reading = r.take_timeout(Duration::from_secs(5)).expect("producer alive");
        seen.push(reading);
        if i % 50 == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
    let produced = sampler.stats().stored() + sampler.stats().dropped();
    sampler.stop().expect("clean stop");

    for pair in seen.windows(2) {
        assert!(pair[0].weight < pair[1].weight, "out of order: {pair:?}");
    }
    for r in &seen {
        // tag integrity: integral, matches its parity flag, within produced range
        assert_eq!(r.weight.fract(), 0.0);
        let n = r.weight as u64;
        assert_eq!(r.stable, n % 2 == 0);
        assert!(n < produced.max(1) + 1, "value {n} never produced ({produced})");
    }
}
