// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2024 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{ErrorKind, MetricError};
use std::fmt;

/// Represents the sample rate of a metric: the probability that a single
/// observation is actually sent to the server.
///
/// > A float between 0 and 1, inclusive. The default is 1, which samples
/// > 100% of the time.
/// > - via [DataDog](https://docs.datadoghq.com/developers/dogstatsd/datagram_shell)
///
/// A rate of `1.0` sends every observation and is never written to the
/// datagram. Lower rates are written as `|@<rate>` using the value exactly
/// as given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate(f64);

impl SampleRate {
    /// Always send, no annotation.
    pub const ALWAYS: SampleRate = SampleRate(1.0);

    pub fn value(&self) -> f64 {
        self.0
    }

    /// True when observations at this rate are probabilistically dropped and
    /// surviving datagrams must carry the rate.
    pub fn is_sampled(&self) -> bool {
        self.0 < 1.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate::ALWAYS
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = MetricError;

    /// Rates of `1.0` or more, and `0.0` (unset), send every observation.
    /// Negative and `NaN` rates are rejected.
    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        if rate.is_nan() || rate < 0.0 {
            Err(MetricError::from((
                ErrorKind::InvalidInput,
                "Sample rate must not be negative or NaN",
            )))
        } else if rate == 0.0 || rate >= 1.0 {
            Ok(SampleRate::ALWAYS)
        } else {
            Ok(SampleRate(rate))
        }
    }
}
