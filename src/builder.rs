// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2018 Philip Jenvey <pjenvey@mozilla.com>
// Copyright 2018-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::{MetricBackend, StatsdClient};
use crate::types::{MetricError, MetricResult};
use std::fmt::{self, Write};

pub(crate) mod sample_rate;
pub(crate) mod sampler;
pub(crate) mod tags;

pub use self::sample_rate::SampleRate;
pub use self::sampler::Sampler;
use self::tags::{tag_string, Tag};

/// Type of metric that knows how to display itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetricType {
    Counter,
    Timer,
    Gauge,
    Histogram,
    Set,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Timer => "ms".fmt(f),
            MetricType::Gauge => "g".fmt(f),
            MetricType::Histogram => "h".fmt(f),
            MetricType::Set => "s".fmt(f),
        }
    }
}

/// Holder for metric values that knows how to display itself
///
/// Values are written using their `Display` representation and are not
/// validated: `NaN`, infinities, or arbitrary strings are passed through
/// to the server as-is.
///
/// This type is internal to how the various `To*Value` conversion traits
/// work but is exposed for documentation purposes and advanced use cases.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Str(String),
}

impl MetricValue {
    // Only counter values are checked or negated and those are always
    // signed or float.
    pub(crate) fn is_zero(&self) -> bool {
        match *self {
            MetricValue::Signed(v) => v == 0,
            MetricValue::Float(v) => v == 0.0,
            _ => false,
        }
    }

    pub(crate) fn negate(self) -> MetricValue {
        match self {
            MetricValue::Signed(v) => v
                .checked_neg()
                .map(MetricValue::Signed)
                .unwrap_or_else(|| MetricValue::Unsigned(v.unsigned_abs())),
            MetricValue::Float(v) => MetricValue::Float(-v),
            other => other,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
            MetricValue::Float(v) => v.fmt(f),
            MetricValue::Str(ref v) => v.fmt(f),
        }
    }
}

/// Turns one metric call (one or more names, a value, a type, a sample
/// rate and call-site tags) into wire-ready datagrams.
#[derive(Debug, Clone)]
pub(crate) struct MetricFormatter<'a> {
    stats: Vec<&'a str>,
    val: MetricValue,
    type_: MetricType,
    tags: Vec<Tag<'a>>,
    sample_rate: SampleRate,
}

impl<'a> MetricFormatter<'a> {
    pub(crate) fn counter(stats: Vec<&'a str>, val: MetricValue) -> Self {
        Self::from_val(stats, val, MetricType::Counter)
    }

    pub(crate) fn timer(stats: Vec<&'a str>, val: MetricValue) -> Self {
        Self::from_val(stats, val, MetricType::Timer)
    }

    pub(crate) fn gauge(stats: Vec<&'a str>, val: MetricValue) -> Self {
        Self::from_val(stats, val, MetricType::Gauge)
    }

    pub(crate) fn histogram(stats: Vec<&'a str>, val: MetricValue) -> Self {
        Self::from_val(stats, val, MetricType::Histogram)
    }

    pub(crate) fn set(stats: Vec<&'a str>, val: MetricValue) -> Self {
        Self::from_val(stats, val, MetricType::Set)
    }

    fn from_val(stats: Vec<&'a str>, val: MetricValue, type_: MetricType) -> Self {
        MetricFormatter {
            stats,
            val,
            type_,
            tags: Vec::new(),
            sample_rate: SampleRate::ALWAYS,
        }
    }

    fn with_tag(&mut self, key: &'a str, value: &'a str) {
        self.tags.push((Some(key), value));
    }

    fn with_tag_value(&mut self, value: &'a str) {
        self.tags.push((None, value));
    }

    fn with_sample_rate(&mut self, rate: SampleRate) {
        self.sample_rate = rate;
    }

    fn write_base_metric(&self, stat: &str, value: &str) -> String {
        let size_hint = stat.len() + 1 /* : */ + value.len() + 1 /* | */ + 2 /* type */;
        let mut out = String::with_capacity(size_hint);
        let _ = write!(out, "{}:{}|{}", stat, value, self.type_);
        out
    }

    /// `<name>:<value>|<type>` for every name, before sampling and tags.
    fn pending(&self) -> Vec<String> {
        let value = self.val.to_string();
        self.stats
            .iter()
            .map(|stat| self.write_base_metric(stat, &value))
            .collect()
    }

    /// Build the datagrams for this call: one per name, all sampled with a
    /// single decision, each followed by the merged tag suffix.
    pub(crate) fn format(&self, sampler: &Sampler, global: &[Tag<'_>]) -> Vec<String> {
        let sampled = sampler.sample(self.sample_rate, self.pending());
        if sampled.is_empty() {
            return sampled;
        }

        let tags = tag_string(global, &self.tags);
        sampled
            .into_iter()
            .map(|mut metric| {
                metric.push_str(&tags);
                metric
            })
            .collect()
    }
}

/// Internal state of a `MetricBuilder`
///
/// The builder can either be in the process of formatting a metric to send
/// via a client, be holding on to an error that it will be dealt with when
/// `.try_send()` or `.send()` is finally invoked, or have nothing to send
/// at all (such as incrementing a counter by zero).
#[derive(Debug)]
enum BuilderRepr<'m, 'c> {
    Success(MetricFormatter<'m>, &'c StatsdClient),
    Error(MetricError, &'c StatsdClient),
    Skip,
}

/// Builder for adding tags and a sample rate to in-progress metrics.
///
/// This builder adds tags, key-value pairs or just values, to a metric that
/// was previously constructed by a call to a method on `StatsdClient`. The
/// tags are added to metrics and sent via the client when `MetricBuilder::send()`
/// or `MetricBuilder::try_send()` is invoked. Tags configured on the client are
/// written first, followed by the tags added here, in the order they were added.
///
/// For more information on the exact format used, see the
/// [Datadog docs](https://docs.datadoghq.com/developers/dogstatsd/datagram_shell).
///
/// NOTE: The only way to instantiate an instance of this builder is via methods
/// in the `StatsdClient` client.
///
/// # Examples
///
/// ## `.try_send()`
///
/// ```
/// use dogstatsd::prelude::*;
/// use dogstatsd::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::from_sink(NopMetricSink);
/// let res = client.increment_by_with_tags("some.key", 1)
///    .with_tag("host", "app11.example.com")
///    .with_tag("segment", "23")
///    .with_tag_value("beta")
///    .try_send();
///
/// assert_eq!(
///     vec!["some.key:1|c|#host:app11.example.com,segment:23,beta"],
///     res.unwrap()
/// );
/// ```
///
/// ## `.send()`
///
/// ```
/// use dogstatsd::prelude::*;
/// use dogstatsd::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::builder(NopMetricSink)
///     .with_error_handler(|e| eprintln!("metric error: {}", e))
///     .build();
///
/// client.increment_with_tags(["requests", "requests.api"])
///    .with_sample_rate(0.25)
///    .with_tags(["region:us-east-1", "canary"])
///    .send();
/// ```
///
/// Note that nothing is returned from the `.send()` method. Any errors encountered
/// in this case will be passed to the error handler registered on the client.
#[must_use = "Did you forget to call .send() after adding tags?"]
#[derive(Debug)]
pub struct MetricBuilder<'m, 'c> {
    repr: BuilderRepr<'m, 'c>,
}

impl<'m, 'c> MetricBuilder<'m, 'c> {
    pub(crate) fn from_fmt(formatter: MetricFormatter<'m>, client: &'c StatsdClient) -> Self {
        MetricBuilder {
            repr: BuilderRepr::Success(formatter, client),
        }
    }

    pub(crate) fn from_error(err: MetricError, client: &'c StatsdClient) -> Self {
        MetricBuilder {
            repr: BuilderRepr::Error(err, client),
        }
    }

    pub(crate) fn skip() -> Self {
        MetricBuilder { repr: BuilderRepr::Skip }
    }

    /// Add a key-value tag to this metric.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink(NopMetricSink);
    /// let res = client.increment_with_tags("some.key")
    ///    .with_tag("user", "authenticated")
    ///    .try_send();
    ///
    /// assert_eq!(vec!["some.key:1|c|#user:authenticated"], res.unwrap());
    /// ```
    pub fn with_tag(mut self, key: &'m str, value: &'m str) -> Self {
        if let BuilderRepr::Success(ref mut formatter, _) = self.repr {
            formatter.with_tag(key, value);
        }
        self
    }

    /// Add a value tag to this metric.
    ///
    /// The value is written verbatim so it may be a bare flag (`canary`) or
    /// an already joined `key:value` pair.
    pub fn with_tag_value(mut self, value: &'m str) -> Self {
        if let BuilderRepr::Success(ref mut formatter, _) = self.repr {
            formatter.with_tag_value(value);
        }
        self
    }

    /// Add a sequence of tags, each written verbatim, in order.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink(NopMetricSink);
    /// let res = client.increment_with_tags("x")
    ///    .with_tags(["a:1", "b:2"])
    ///    .try_send();
    ///
    /// assert_eq!(vec!["x:1|c|#a:1,b:2"], res.unwrap());
    /// ```
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = &'m str>,
    {
        if let BuilderRepr::Success(ref mut formatter, _) = self.repr {
            for value in tags {
                formatter.with_tag_value(value);
            }
        }
        self
    }

    /// Send this metric only with the given probability.
    ///
    /// A rate of `1.0` is the default and is not written to the datagram.
    /// Rates above `1.0`, and `0.0`, are treated the same way. A rate between
    /// `0.0` and `1.0` is written as `|@<rate>` on every datagram that survives
    /// sampling. One decision is made per call, covering every metric name of
    /// the call.
    ///
    /// A negative or `NaN` rate results in an `InvalidInput` error when the
    /// metric is sent and nothing being emitted.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink(NopMetricSink);
    /// let res = client.timing_with_tags("some.method", 35u64)
    ///    .with_sample_rate(1.0)
    ///    .try_send();
    ///
    /// assert_eq!(vec!["some.method:35|ms"], res.unwrap());
    /// ```
    pub fn with_sample_rate(self, rate: f64) -> Self {
        let repr = match self.repr {
            BuilderRepr::Success(mut formatter, client) => match SampleRate::try_from(rate) {
                Ok(rate) => {
                    formatter.with_sample_rate(rate);
                    BuilderRepr::Success(formatter, client)
                }
                Err(err) => BuilderRepr::Error(err, client),
            },
            other => other,
        };

        MetricBuilder { repr }
    }

    /// Send the metric using the client that created this builder, returning
    /// every datagram that was emitted.
    ///
    /// The result is empty when the call was sampled out or had nothing to
    /// send. Every datagram is attempted even if an earlier one fails, in
    /// which case the first error is returned.
    ///
    /// Note that the builder is consumed by this method and thus `.try_send()`
    /// can only be called a single time per builder.
    pub fn try_send(self) -> MetricResult<Vec<String>> {
        match self.repr {
            BuilderRepr::Error(err, _) => Err(err),
            BuilderRepr::Skip => Ok(Vec::new()),
            BuilderRepr::Success(ref formatter, client) => {
                let datagrams = formatter.format(client.sampler(), &client.tags());
                let mut first_err = None;

                for datagram in &datagrams {
                    if let Err(e) = client.send_metric(datagram) {
                        first_err.get_or_insert(e);
                    }
                }

                match first_err {
                    Some(err) => Err(err),
                    None => Ok(datagrams),
                }
            }
        }
    }

    /// Send the metric using the client that created this builder, discarding
    /// successful results and invoking the client's error handler for each
    /// error encountered.
    ///
    /// By default, if no handler is given, errors are discarded. If this isn't
    /// desired, a custom handler should be supplied when creating a new
    /// `StatsdClient` instance.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{StatsdClient, MetricError, NopMetricSink};
    ///
    /// fn my_handler(err: MetricError) {
    ///     println!("Metric error: {}", err);
    /// }
    ///
    /// let client = StatsdClient::builder(NopMetricSink)
    ///     .with_error_handler(my_handler)
    ///     .build();
    ///
    /// client.gauge_with_tags("some.key", 7u64)
    ///    .with_tag("region", "us-west-1")
    ///    .send();
    /// ```
    pub fn send(self) {
        match self.repr {
            BuilderRepr::Error(err, client) => client.consume_error(err),
            BuilderRepr::Skip => {}
            BuilderRepr::Success(ref formatter, client) => {
                for datagram in formatter.format(client.sampler(), &client.tags()) {
                    if let Err(e) = client.send_metric(&datagram) {
                        client.consume_error(e);
                    }
                }
            }
        }
    }
}
