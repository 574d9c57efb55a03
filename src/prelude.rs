// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2017-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of the library for easy glob imports
//!
//! # Example
//!
//! ```
//! use dogstatsd::prelude::*;
//! use dogstatsd::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink(NopMetricSink);
//!
//! client.increment("some.counter");
//! client.timing("some.timer", 23u64);
//! client.gauge("some.gauge", 45u64);
//! client.histogram("some.histogram", 89u64);
//! client.set("some.set", 123i64);
//! client.event("some.event", "happened");
//! ```

pub use crate::client::{Counted, CountedExt, Evented, Gauged, Histogrammed, MetricClient, Setted, Timed};
