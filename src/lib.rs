// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A DogStatsD client for Rust!
//!
//! Send counters, gauges, histograms, sets, timings and events to a
//! [DogStatsD](https://docs.datadoghq.com/developers/dogstatsd/) collector,
//! one UDP datagram per metric.
//!
//! ## Features
//!
//! * Counters, timings, gauges, histograms and sets, each for one metric
//!   name or many at once.
//! * Events with optional priority, event type, aggregation key and tags.
//! * Client-wide tags merged in front of call-site tags.
//! * Client-side sampling with a single decision per call.
//! * Sends over a socket you own, or over an ephemeral socket that is
//!   opened on demand and closed after a second without sends.
//! * Alternate backends via the `MetricSink` trait.
//!
//! Delivery is best effort: UDP has no acknowledgement, nothing is retried,
//! batched or aggregated locally. Metric names and values are not validated.
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! ```rust,no_run
//! use dogstatsd::prelude::*;
//! use dogstatsd::StatsdClient;
//!
//! // Sends to localhost:8125 using an ephemeral socket.
//! let client = StatsdClient::from_udp_host("", 0).unwrap();
//!
//! client.increment("some.counter");
//! client.timing("some.methodCall", 42u64);
//! client.gauge("some.thing", 7u64);
//! client.histogram("some.value", 5.5);
//! client.set("some.users", "user-123");
//! client.event("deploy", "version 1.2.3 is out");
//!
//! client.close();
//! ```
//!
//! ### Tags, Sample Rates, Many Names
//!
//! Every metric method has a `_with_tags` variant returning a `MetricBuilder`.
//! Tags configured on the client are written first.
//!
//! ```rust
//! use dogstatsd::prelude::*;
//! use dogstatsd::{ClientConfig, StatsdClient};
//!
//! let config = ClientConfig::new("127.0.0.1", 8125)
//!     .with_global_tags(["env:prod"]);
//! let client = StatsdClient::from_config(config).unwrap();
//!
//! client.increment_with_tags(["requests", "requests.api"])
//!     .with_tag("method", "GET")
//!     .with_tag_value("canary")
//!     .with_sample_rate(0.25)
//!     .send();
//! // Sent 25% of the time, as two datagrams:
//! // requests:1|c|@0.25|#env:prod,method:GET,canary
//! // requests.api:1|c|@0.25|#env:prod,method:GET,canary
//! ```
//!
//! ### Custom Events
//!
//! ```rust
//! use dogstatsd::prelude::*;
//! use dogstatsd::{EventPriority, EventType, NopMetricSink, StatsdClient};
//!
//! let client = StatsdClient::from_sink(NopMetricSink);
//!
//! client.custom_event("disk full", "/var is at 100%")
//!     .with_priority(EventPriority::Normal)
//!     .with_event_type(EventType::Error)
//!     .with_aggregation_key("disk")
//!     .with_tag("host", "db1")
//!     .send();
//! ```
//!
//! ### Shared Socket
//!
//! A caller supplied socket is used for every send and is never closed by
//! the client: `close()` only drops the client's reference to it.
//!
//! ```rust,no_run
//! use std::net::UdpSocket;
//! use std::sync::Arc;
//! use dogstatsd::prelude::*;
//! use dogstatsd::{ClientConfig, StatsdClient};
//!
//! let socket = Arc::new(UdpSocket::bind("0.0.0.0:0").unwrap());
//! socket.set_nonblocking(true).unwrap();
//!
//! let config = ClientConfig::new("metrics.example.com", 8125)
//!     .with_shared_socket(Arc::clone(&socket));
//! let client = StatsdClient::from_config(config).unwrap();
//!
//! client.increment("some.counter");
//! client.close();
//! ```
//!
//! ### Error Handling
//!
//! The plain metric methods never return errors. Errors from invalid input
//! (such as a negative sample rate) or from the network are given to
//! the client's error handler, which by default logs them at debug level
//! through the `log` crate and discards them. Use `try_send()` on a builder
//! to get them back instead.
//!
//! ```rust
//! use dogstatsd::prelude::*;
//! use dogstatsd::{MetricError, NopMetricSink, StatsdClient};
//!
//! let client = StatsdClient::builder(NopMetricSink)
//!     .with_error_handler(|err: MetricError| eprintln!("metric error: {}", err))
//!     .build();
//!
//! let res = client.gauge_with_tags("some.gauge", 1u64)
//!     .with_sample_rate(-1.0)
//!     .try_send();
//! assert!(res.is_err());
//! ```
//!
//! ### Sampling
//!
//! Each client draws from the process-wide `Sampler::shared()` unless given
//! another one, for example a seeded one in tests.
//!
//! ```rust
//! use std::sync::Arc;
//! use dogstatsd::prelude::*;
//! use dogstatsd::{NopMetricSink, Sampler, StatsdClient};
//!
//! let client = StatsdClient::builder(NopMetricSink)
//!     .with_sampler(Arc::new(Sampler::seed_from_u64(7)))
//!     .build();
//!
//! client.increment_with_tags("some.counter").with_sample_rate(0.5).send();
//! ```

#![forbid(unsafe_code)]

use std::time::Duration;

/// Collector host used when none is given.
pub const DEFAULT_HOST: &str = "localhost";

/// Collector port used when none is given.
pub const DEFAULT_PORT: u16 = 8125;

/// Idle time, in milliseconds, after which an ephemeral socket is closed.
pub const EPHEMERAL_LIFETIME_MS: u64 = 1000;

/// `EPHEMERAL_LIFETIME_MS` as a `Duration`.
pub const EPHEMERAL_LIFETIME: Duration = Duration::from_millis(EPHEMERAL_LIFETIME_MS);

pub use self::builder::{MetricBuilder, SampleRate, Sampler};

pub use self::client::{
    Counted, CountedExt, Evented, Gauged, Histogrammed, MetricClient, Setted, StatsdClient, StatsdClientBuilder, Timed,
};

pub use self::config::ClientConfig;

pub use self::event::{EventBuilder, EventPriority, EventType};

pub use self::sinks::{MetricSink, NopMetricSink, SinkStats, SpyMetricSink, UdpMetricSink, UdpMetricSinkBuilder};

pub use self::types::{ErrorKind, MetricError, MetricResult, StatRef};

mod builder;
mod client;
mod config;
mod event;
pub mod ext;
pub mod prelude;
mod sinks;
mod timer;
mod types;


mod sealed {
    pub trait Sealed {}
}
