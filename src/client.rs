// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder::tags::Tag;
use crate::builder::{MetricBuilder, MetricFormatter, MetricValue, Sampler};
use crate::config::ClientConfig;
use crate::event::{EventBuilder, EventFormatter};
use crate::sealed::Sealed;
use crate::sinks::{MetricSink, SinkStats};
use crate::types::{ErrorKind, MetricError, MetricResult, StatRef};
use log::debug;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Conversion trait for valid values for counters
///
/// This trait must be implemented for any types that are used as counter
/// values (currently `i64` and `f64`). This trait is internal to how
/// values are formatted as part of metrics but is exposed publicly for
/// documentation purposes.
pub trait ToCounterValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToCounterValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToCounterValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

fn duration_to_millis(d: Duration) -> MetricResult<MetricValue> {
    let as_millis = d.as_millis();
    if as_millis > u128::from(u64::MAX) {
        Err(MetricError::from((ErrorKind::InvalidInput, "u64 overflow")))
    } else {
        Ok(MetricValue::Unsigned(as_millis as u64))
    }
}

/// Conversion trait for valid values for timings
///
/// This trait must be implemented for any types that are used as timing
/// values (currently `u64`, `u32`, `f64`, and `Duration`). `Duration`
/// values are converted to whole milliseconds.
pub trait ToTimerValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToTimerValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToTimerValue for u32 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(u64::from(self)))
    }
}

impl ToTimerValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

impl ToTimerValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

/// Conversion trait for valid values for gauges
///
/// This trait must be implemented for any types that are used as gauge
/// values (currently `i64`, `u64`, `f64`, `&str` and `String`). String
/// values are sent verbatim which allows relative gauges like `+5`.
pub trait ToGaugeValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToGaugeValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToGaugeValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToGaugeValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

impl ToGaugeValue for &str {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Str(self.to_string()))
    }
}

impl ToGaugeValue for String {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Str(self))
    }
}

/// Conversion trait for valid values for histograms
///
/// This trait must be implemented for any types that are used as histogram
/// values (currently `i64`, `u64`, `f64`, and `Duration`). `Duration`
/// values are converted to whole milliseconds.
pub trait ToHistogramValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToHistogramValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToHistogramValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToHistogramValue for f64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Float(self))
    }
}

impl ToHistogramValue for Duration {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        duration_to_millis(self)
    }
}

/// Conversion trait for valid values for sets
///
/// This trait must be implemented for any types that are used as set
/// values (currently `i64`, `u64`, `&str` and `String`).
pub trait ToSetValue {
    fn try_to_value(self) -> MetricResult<MetricValue>;
}

impl ToSetValue for i64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Signed(self))
    }
}

impl ToSetValue for u64 {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Unsigned(self))
    }
}

impl ToSetValue for &str {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Str(self.to_string()))
    }
}

impl ToSetValue for String {
    fn try_to_value(self) -> MetricResult<MetricValue> {
        Ok(MetricValue::Str(self))
    }
}

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// A delta of zero sends nothing.
///
/// The following types are valid for counters:
/// * `i64`
/// * `f64`
///
/// Every method accepts one metric name or a sequence of them, see `StatRef`.
pub trait Counted<T>
where
    T: ToCounterValue,
{
    /// Increment the counter by the given amount
    fn increment_by<'a, S>(&'a self, stats: S, value: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.increment_by_with_tags(stats, value).send()
    }

    /// Increment the counter by the given amount and return a `MetricBuilder`
    /// that can be used to add tags or a sample rate to the metric.
    fn increment_by_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;

    /// Decrement the counter by the given amount
    fn decrement_by<'a, S>(&'a self, stats: S, value: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.decrement_by_with_tags(stats, value).send()
    }

    /// Decrement the counter by the given amount and return a `MetricBuilder`
    /// that can be used to add tags or a sample rate to the metric.
    fn decrement_by_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;
}

/// Trait for convenience methods for counters
///
/// This trait specifically implements increment and decrement by one for
/// counters with `i64` types.
pub trait CountedExt: Counted<i64> {
    /// Increment the counter by 1
    fn increment<'a, S>(&'a self, stats: S)
    where
        S: Into<StatRef<'a>>,
    {
        self.increment_with_tags(stats).send()
    }

    /// Increment the counter by 1 and return a `MetricBuilder` that can
    /// be used to add tags or a sample rate to the metric.
    fn increment_with_tags<'a, S>(&'a self, stats: S) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.increment_by_with_tags(stats, 1)
    }

    /// Decrement the counter by 1
    fn decrement<'a, S>(&'a self, stats: S)
    where
        S: Into<StatRef<'a>>,
    {
        self.decrement_with_tags(stats).send()
    }

    /// Decrement the counter by 1 and return a `MetricBuilder` that can
    /// be used to add tags or a sample rate to the metric.
    fn decrement_with_tags<'a, S>(&'a self, stats: S) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.decrement_by_with_tags(stats, 1)
    }
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return. `Duration` values are converted to
/// milliseconds before being recorded.
///
/// The following types are valid for timings:
/// * `u64`
/// * `u32`
/// * `f64`
/// * `Duration`
pub trait Timed<T>
where
    T: ToTimerValue,
{
    /// Record a timing in milliseconds with the given name(s)
    fn timing<'a, S>(&'a self, stats: S, time: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.timing_with_tags(stats, time).send()
    }

    /// Record a timing in milliseconds with the given name(s) and return a
    /// `MetricBuilder` that can be used to add tags or a sample rate.
    fn timing_with_tags<'a, S>(&'a self, stats: S, time: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;
}

/// Trait for recording gauge values.
///
/// Gauge values are an instantaneous measurement of a value determined
/// by the client. They do not change unless changed by the client. Examples
/// include things like load average or how many connections are active.
///
/// The following types are valid for gauges:
/// * `i64`
/// * `u64`
/// * `f64`
/// * `&str` and `String`, sent verbatim
pub trait Gauged<T>
where
    T: ToGaugeValue,
{
    /// Record a gauge value with the given name(s)
    fn gauge<'a, S>(&'a self, stats: S, value: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.gauge_with_tags(stats, value).send()
    }

    /// Record a gauge value with the given name(s) and return a
    /// `MetricBuilder` that can be used to add tags or a sample rate.
    fn gauge_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;
}

/// Trait for recording histogram values.
///
/// Histogram values are positive values that can represent anything, whose
/// statistical distribution is calculated by the server. The values can be
/// timings, amount of some resource consumed, size of HTTP responses in
/// some application, etc. `Duration` values are converted to milliseconds.
///
/// The following types are valid for histograms:
/// * `i64`
/// * `u64`
/// * `f64`
/// * `Duration`
pub trait Histogrammed<T>
where
    T: ToHistogramValue,
{
    /// Record a single histogram value with the given name(s)
    fn histogram<'a, S>(&'a self, stats: S, value: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.histogram_with_tags(stats, value).send()
    }

    /// Record a single histogram value with the given name(s) and return a
    /// `MetricBuilder` that can be used to add tags or a sample rate.
    fn histogram_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;
}

/// Trait for recording set values.
///
/// Sets count the number of unique elements in a group. You can use them to,
/// for example, count the unique visitors to your site.
///
/// The following types are valid for sets:
/// * `i64`
/// * `u64`
/// * `&str` and `String`
pub trait Setted<T>
where
    T: ToSetValue,
{
    /// Record a single set value with the given name(s)
    fn set<'a, S>(&'a self, stats: S, value: T)
    where
        S: Into<StatRef<'a>>,
    {
        self.set_with_tags(stats, value).send()
    }

    /// Record a single set value with the given name(s) and return a
    /// `MetricBuilder` that can be used to add tags or a sample rate.
    fn set_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>;
}

/// Trait for sending events to the Datadog event stream.
///
/// Events are sent as a single datagram and are never sampled.
pub trait Evented {
    /// Send an event with only a title and text.
    ///
    /// No options or tags are written, not even the client-wide tags.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink(NopMetricSink);
    /// client.event("exception", "something bad happened");
    /// ```
    fn event(&self, title: &str, text: &str);

    /// Start an event with the given title and text, returning an
    /// `EventBuilder` to set a priority, event type, aggregation key or tags.
    ///
    /// Client-wide tags are written only if at least one tag is added to
    /// the builder.
    fn custom_event<'a>(&'a self, title: &'a str, text: &'a str) -> EventBuilder<'a, 'a>;
}

/// Trait that encompasses all other traits for sending metrics.
///
/// If you wish to use `StatsdClient` with a generic type this will allow
/// you to reference all the implemented methods for recording metrics,
/// while using a single trait bound.
///
/// ```
/// use dogstatsd::prelude::*;
/// use dogstatsd::{StatsdClient, NopMetricSink};
/// use std::time::Duration;
///
/// fn record<C: MetricClient>(client: &C) {
///     client.increment("some.counter");
///     client.increment_by(["some.counter", "other.counter"], 4);
///     client.decrement("some.counter");
///     client.timing("some.timer", 42u64);
///     client.timing("some.timer", Duration::from_millis(42));
///     client.gauge("some.gauge", 8u64);
///     client.gauge("some.gauge", "+3");
///     client.histogram("some.histogram", 4.5);
///     client.set("some.set", "user-123");
///     client.event("deploy", "version 1.2.3");
/// }
///
/// record(&StatsdClient::from_sink(NopMetricSink));
/// ```
pub trait MetricClient:
    Counted<i64>
    + Counted<f64>
    + CountedExt
    + Timed<u64>
    + Timed<u32>
    + Timed<f64>
    + Timed<Duration>
    + for<'v> Gauged<&'v str>
    + Gauged<String>
    + Gauged<i64>
    + Gauged<u64>
    + Gauged<f64>
    + Histogrammed<i64>
    + Histogrammed<u64>
    + Histogrammed<f64>
    + Histogrammed<Duration>
    + for<'v> Setted<&'v str>
    + Setted<String>
    + Setted<i64>
    + Setted<u64>
    + Evented
{
}

/// Typically internal client methods for sending datagrams and handling errors.
///
/// This trait exposes methods of the client that would normally be internal
/// but may be useful for consumers of the library to extend it in unforeseen
/// ways. Most consumers of the library shouldn't need to make use of this
/// extension point.
///
/// This trait is not exposed in the `prelude` module since it isn't required
/// to use the client for sending metrics. It is only exposed in the `ext`
/// module which is used to encompass advanced extension points for the library.
///
/// NOTE: This is a sealed trait and so it cannot be implemented outside of the
/// library.
///
/// # Example
///
/// ```
/// use dogstatsd::{MetricResult, StatsdClient, NopMetricSink};
/// use dogstatsd::ext::MetricBackend;
///
/// struct ServiceCheckClient {
///     wrapped: StatsdClient,
/// }
///
/// impl ServiceCheckClient {
///     fn send_check(&self, name: &str, status: u8) -> MetricResult<()> {
///         self.wrapped.send_metric(&format!("_sc|{}|{}", name, status))
///     }
///
///     fn send_check_quietly(&self, name: &str, status: u8) {
///         if let Err(e) = self.send_check(name, status) {
///             self.wrapped.consume_error(e);
///         }
///     }
/// }
///
/// let custom = ServiceCheckClient { wrapped: StatsdClient::from_sink(NopMetricSink) };
/// custom.send_check("app.is_ok", 0).unwrap();
/// custom.send_check_quietly("app.is_ok", 0);
/// ```
pub trait MetricBackend: Sealed {
    /// Send a fully formed datagram via the underlying `MetricSink`, verbatim.
    ///
    /// Note that if you simply want to emit standard metrics, you don't need to
    /// use this method.
    fn send_metric(&self, metric: &str) -> MetricResult<()>;

    /// Consume a possible error from attempting to send a metric.
    ///
    /// When callers have elected to quietly send metrics via the `MetricBuilder::send()`
    /// method or one of the plain metric methods, this method will be invoked if an
    /// error is encountered. By default the error is logged at debug level and
    /// discarded.
    fn consume_error(&self, err: MetricError);
}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `StatsClient` struct.
///
/// # Example
///
/// ```
/// use dogstatsd::prelude::*;
/// use dogstatsd::{MetricError, StatsdClient, NopMetricSink};
///
/// fn my_error_handler(err: MetricError) {
///     println!("Metric error! {}", err);
/// }
///
/// let client = StatsdClient::builder(NopMetricSink)
///     .with_error_handler(my_error_handler)
///     .with_tag("environment", "production")
///     .with_tag_value("rust")
///     .build();
///
/// client.increment_by("something", 123);
/// client.increment_by_with_tags("some.counter", 42)
///     .with_tag("region", "us-east-2")
///     .send();
/// ```
pub struct StatsdClientBuilder {
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    tags: Vec<(Option<String>, String)>,
    sampler: Option<Arc<Sampler>>,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder {
            // required
            sink: Box::new(sink),

            // optional with defaults
            errors: Box::new(log_error_handler),
            tags: Vec::new(),
            sampler: None,
        }
    }

    /// Set an error handler to use for metrics sent via `MetricBuilder::send()`
    /// and the plain metric methods.
    ///
    /// The error handler is only invoked when metrics are not able to be sent
    /// correctly. Either due to invalid input, I/O errors encountered when trying
    /// to send them via a `MetricSink`, or some other reason.
    ///
    /// The error handler should consume the error without panicking. The error
    /// may be logged, printed to stderr, discarded, etc. - this is up to the
    /// implementation.
    pub fn with_error_handler<F>(mut self, errors: F) -> Self
    where
        F: Fn(MetricError) + Sync + Send + RefUnwindSafe + 'static,
    {
        self.errors = Box::new(errors);
        self
    }

    /// Add a default tag with key and value to every metric published by the
    /// built [StatsdClient].
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: ToString,
        V: ToString,
    {
        self.tags.push((Some(key.to_string()), value.to_string()));
        self
    }

    /// Add a default tag with only a value to every metric published by the built
    /// [StatsdClient].
    pub fn with_tag_value<K>(mut self, value: K) -> Self
    where
        K: ToString,
    {
        self.tags.push((None, value.to_string()));
        self
    }

    /// Add default tags, each written verbatim, in order.
    pub fn with_global_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(|t| (None, t.into())));
        self
    }

    /// Use the given sampler instead of the process-wide `Sampler::shared()`.
    pub fn with_sampler(mut self, sampler: Arc<Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }
}

/// Client for DogStatsD that implements various traits to record metrics.
///
/// # Traits
///
/// The client is the main entry point for users of this library. It supports
/// several traits for recording metrics of different types.
///
/// * `Counted` and `CountedExt` for emitting counters.
/// * `Timed` for emitting timings.
/// * `Gauged` for emitting gauge values.
/// * `Histogrammed` for emitting histogram values.
/// * `Setted` for emitting set values.
/// * `Evented` for emitting events.
/// * `MetricClient` for a combination of all of the above.
///
/// Each metric method comes in two forms. The plain one (`increment`, `gauge`,
/// ...) sends immediately and never returns an error: failures go to the
/// error handler. The `_with_tags` one returns a `MetricBuilder` to add tags
/// or a sample rate before sending.
///
/// # Sinks
///
/// The client uses some implementation of a `MetricSink` to emit the metrics.
/// `UdpMetricSink` is the one used by `from_config` and `from_udp_host`.
///
/// # Threading
///
/// The `StatsdClient` is designed to work in a multithreaded application. All
/// parts of the client can be shared between threads (i.e. it is `Send` and
/// `Sync`). Wrap it with an `Arc` to share it.
///
/// ``` no_run
/// use std::sync::Arc;
/// use std::thread;
/// use dogstatsd::prelude::*;
/// use dogstatsd::StatsdClient;
///
/// let client = Arc::new(StatsdClient::from_udp_host("localhost", 8125).unwrap());
/// let metric_ref = Arc::clone(&client);
///
/// let t = thread::spawn(move || {
///     metric_ref.increment("request.handler");
/// });
///
/// t.join().unwrap();
/// client.close();
/// ```
pub struct StatsdClient {
    sink: Box<dyn MetricSink + Sync + Send + RefUnwindSafe>,
    errors: Box<dyn Fn(MetricError) + Sync + Send + RefUnwindSafe>,
    tags: Vec<(Option<String>, String)>,
    sampler: Arc<Sampler>,
}

impl StatsdClient {
    /// Create a new client instance that will emit all metrics to the given
    /// `MetricSink` implementation.
    ///
    /// Note that this client will log and then discard errors encountered
    /// when sending metrics via the `MetricBuilder::send()` method.
    ///
    /// # No-op Example
    ///
    /// ```
    /// use dogstatsd::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::from_sink(NopMetricSink);
    /// ```
    ///
    /// # UDP Socket Example
    ///
    /// ```
    /// use std::net::UdpSocket;
    /// use dogstatsd::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
    ///
    /// let host = ("127.0.0.1", DEFAULT_PORT);
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    ///
    /// let sink = UdpMetricSink::from(host, socket).unwrap();
    /// let client = StatsdClient::from_sink(sink);
    /// ```
    pub fn from_sink<T>(sink: T) -> Self
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        Self::builder(sink).build()
    }

    /// Create a new builder with the provided metric sink.
    ///
    /// All other optional customizations can be set by calling methods on
    /// the returned builder. Any customizations that aren't set by the
    /// caller will use defaults:
    ///
    /// * Errors are logged at debug level and discarded.
    /// * No client-wide tags.
    /// * The process-wide `Sampler::shared()` sampler.
    pub fn builder<T>(sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Sync + Send + RefUnwindSafe + 'static,
    {
        StatsdClientBuilder::new(sink)
    }

    /// Create a client sending over UDP as described by the given config.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::prelude::*;
    /// use dogstatsd::{ClientConfig, StatsdClient};
    ///
    /// let config = ClientConfig::new("127.0.0.1", 8125)
    ///     .with_global_tags(["env:dev"]);
    /// let client = StatsdClient::from_config(config).unwrap();
    ///
    /// client.increment("app.started");
    /// client.close();
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if the host can't be resolved.
    pub fn from_config(config: ClientConfig) -> MetricResult<Self> {
        let sink = config.build_sink()?;
        Ok(Self::builder(sink).with_global_tags(config.global_tags).build())
    }

    /// Create a client sending over UDP to the given host and port using
    /// ephemeral sockets. An empty host and port `0` select the defaults.
    pub fn from_udp_host<H>(host: H, port: u16) -> MetricResult<Self>
    where
        H: Into<String>,
    {
        Self::from_config(ClientConfig::new(host, port))
    }

    /// Flush the underlying metric sink.
    pub fn flush(&self) -> MetricResult<()> {
        Ok(self.sink.flush()?)
    }

    /// Release the network resources held by the underlying sink.
    ///
    /// A caller supplied socket is not closed, the client only drops its
    /// reference to it. An ephemeral socket is closed and its idle timer
    /// cancelled. Calling this more than once is fine. Metrics sent after
    /// `close()` open a new ephemeral socket on demand.
    pub fn close(&self) {
        self.sink.close();
    }

    /// I/O telemetry of the underlying sink.
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        StatsdClient {
            sink: builder.sink,
            errors: builder.errors,
            tags: builder.tags,
            sampler: builder.sampler.unwrap_or_else(Sampler::shared),
        }
    }

    pub(crate) fn tags(&self) -> Vec<Tag<'_>> {
        self.tags.iter().map(|(k, v)| (k.as_deref(), v.as_str())).collect()
    }

    pub(crate) fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    fn metric_builder<'a>(
        &'a self,
        stats: StatRef<'a>,
        value: MetricResult<MetricValue>,
        formatter: fn(Vec<&'a str>, MetricValue) -> MetricFormatter<'a>,
    ) -> MetricBuilder<'a, 'a> {
        match value {
            Ok(v) => MetricBuilder::from_fmt(formatter(stats.names(), v), self),
            Err(e) => MetricBuilder::from_error(e, self),
        }
    }

    fn counter_builder<'a>(&'a self, stats: StatRef<'a>, value: MetricResult<MetricValue>) -> MetricBuilder<'a, 'a> {
        if matches!(value, Ok(ref v) if v.is_zero()) {
            return MetricBuilder::skip();
        }
        self.metric_builder(stats, value, MetricFormatter::counter)
    }
}

impl Sealed for StatsdClient {}

impl MetricBackend for StatsdClient {
    fn send_metric(&self, metric: &str) -> MetricResult<()> {
        self.sink.emit(metric)?;
        Ok(())
    }

    fn consume_error(&self, err: MetricError) {
        (self.errors)(err);
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ sink: ..., errors: ..., tags: {:?}, sampler: {:?} }}",
            self.tags, self.sampler,
        )
    }
}

impl<T> Counted<T> for StatsdClient
where
    T: ToCounterValue,
{
    fn increment_by_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.counter_builder(stats.into(), value.try_to_value())
    }

    fn decrement_by_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.counter_builder(stats.into(), value.try_to_value().map(MetricValue::negate))
    }
}

impl CountedExt for StatsdClient {}

impl<T> Timed<T> for StatsdClient
where
    T: ToTimerValue,
{
    fn timing_with_tags<'a, S>(&'a self, stats: S, time: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.metric_builder(stats.into(), time.try_to_value(), MetricFormatter::timer)
    }
}

impl<T> Gauged<T> for StatsdClient
where
    T: ToGaugeValue,
{
    fn gauge_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.metric_builder(stats.into(), value.try_to_value(), MetricFormatter::gauge)
    }
}

impl<T> Histogrammed<T> for StatsdClient
where
    T: ToHistogramValue,
{
    fn histogram_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.metric_builder(stats.into(), value.try_to_value(), MetricFormatter::histogram)
    }
}

impl<T> Setted<T> for StatsdClient
where
    T: ToSetValue,
{
    fn set_with_tags<'a, S>(&'a self, stats: S, value: T) -> MetricBuilder<'a, 'a>
    where
        S: Into<StatRef<'a>>,
    {
        self.metric_builder(stats.into(), value.try_to_value(), MetricFormatter::set)
    }
}

impl Evented for StatsdClient {
    fn event(&self, title: &str, text: &str) {
        let datagram = EventFormatter::new(title, text).format(&[]);
        if let Err(e) = self.send_metric(&datagram) {
            self.consume_error(e);
        }
    }

    fn custom_event<'a>(&'a self, title: &'a str, text: &'a str) -> EventBuilder<'a, 'a> {
        EventBuilder::new(EventFormatter::new(title, text), self)
    }
}

impl MetricClient for StatsdClient {}

#[allow(clippy::needless_pass_by_value)]
fn log_error_handler(err: MetricError) {
    debug!("Discarding metric error: {}", err);
}
