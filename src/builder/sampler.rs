// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2024 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::sample_rate::SampleRate;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

static SHARED: OnceLock<Arc<Sampler>> = OnceLock::new();

/// Decides whether the datagrams of a single metric call are sent.
///
/// A `Sampler` owns one pseudo-random generator. Each call that uses a
/// sample rate below `1.0` draws exactly one value `u` in `[0, 1)` and the
/// whole call (every metric name passed to it) is either kept, when
/// `u <= rate`, or silently dropped.
///
/// Every `StatsdClient` uses the process-wide instance returned by
/// `Sampler::shared()` unless another sampler is injected with
/// `StatsdClientBuilder::with_sampler`. Sharing one instance between
/// clients keeps a single stream of random values for the process.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dogstatsd::prelude::*;
/// use dogstatsd::{NopMetricSink, Sampler, StatsdClient};
///
/// let sampler = Arc::new(Sampler::seed_from_u64(42));
/// let client = StatsdClient::builder(NopMetricSink)
///     .with_sampler(sampler)
///     .build();
///
/// client.increment_with_tags("some.counter")
///     .with_sample_rate(0.1)
///     .send();
/// ```
pub struct Sampler {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Sampler {
    /// Create a sampler seeded from operating system entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a sampler with a deterministic sequence of decisions.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a sampler backed by the given generator.
    pub fn from_rng<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Sampler {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// The process-wide sampler, created on first use.
    pub fn shared() -> Arc<Sampler> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Sampler::new())))
    }

    /// Make one sampling decision at the given rate.
    ///
    /// A rate of `1.0` always keeps and doesn't consume a random value.
    pub fn keep(&self, rate: SampleRate) -> bool {
        if !rate.is_sampled() {
            return true;
        }

        let draw: f64 = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.gen()
        };

        draw <= rate.value()
    }

    /// Apply one sampling decision to all pending payloads of a call.
    ///
    /// Surviving payloads are annotated with `|@<rate>` when the rate is
    /// below `1.0`. If the decision is to drop, nothing is returned.
    pub fn sample(&self, rate: SampleRate, pending: Vec<String>) -> Vec<String> {
        if !rate.is_sampled() {
            return pending;
        }

        if !self.keep(rate) {
            return Vec::new();
        }

        let annotation = format!("|@{}", rate);
        pending
            .into_iter()
            .map(|mut payload| {
                payload.push_str(&annotation);
                payload
            })
            .collect()
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sampler { rng: ... }")
    }
}
