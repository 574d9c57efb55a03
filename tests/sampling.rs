use dogstatsd::prelude::*;
use dogstatsd::{Sampler, SpyMetricSink, StatsdClient};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

mod utils;
use utils::drain;

const CALLS: usize = 100_000;

fn new_sampled_client(seed: u64) -> (crossbeam_channel::Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    let sampler = Sampler::from_rng(ChaCha8Rng::seed_from_u64(seed));
    let client = StatsdClient::builder(sink).with_sampler(Arc::new(sampler)).build();
    (rx, client)
}

#[test]
fn test_sampling_keeps_about_the_requested_fraction() {
    let (rx, client) = new_sampled_client(1234);

    for _ in 0..CALLS {
        client.increment_with_tags("sampled").with_sample_rate(0.5).send();
    }

    let received = drain(&rx);
    let fraction = received.len() as f64 / CALLS as f64;

    assert!(fraction > 0.48 && fraction < 0.52, "kept fraction {}", fraction);
    assert!(received.iter().all(|m| m == "sampled:1|c|@0.5"));
}

#[test]
fn test_sampling_decision_applies_to_every_name_of_a_call() {
    let (rx, client) = new_sampled_client(99);

    for _ in 0..1_000 {
        client.increment_with_tags(["a", "b"]).with_sample_rate(0.3).send();
    }

    let received = drain(&rx);
    assert_eq!(0, received.len() % 2);
    for pair in received.chunks(2) {
        assert_eq!("a:1|c|@0.3", pair[0]);
        assert_eq!("b:1|c|@0.3", pair[1]);
    }
}

#[test]
fn test_sampling_rate_one_never_annotates() {
    let (rx, client) = new_sampled_client(7);

    for _ in 0..100 {
        client.increment_with_tags("full").with_sample_rate(1.0).with_tag("k", "v").send();
    }

    let received = drain(&rx);
    assert_eq!(100, received.len());
    assert!(received.iter().all(|m| m == "full:1|c|#k:v"));
}

#[test]
fn test_sampling_rate_is_written_before_tags() {
    let (rx, client) = new_sampled_client(42);

    for _ in 0..100 {
        client.gauge_with_tags("g", 5u64).with_tag("k", "v").with_sample_rate(0.9).send();
    }

    let received = drain(&rx);
    assert!(!received.is_empty());
    assert!(received.iter().all(|m| m == "g:5|g|@0.9|#k:v"));
}
