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

use std::fmt::{self, Write};

use crate::builder::tags::{tag_string, Tag};
use crate::client::{MetricBackend, StatsdClient};
use crate::types::MetricResult;

/// The priority of an event. Needed to use
/// [EventBuilder::with_priority](struct.EventBuilder.html#method.with_priority).
///
/// See [Datadog](https://docs.datadoghq.com/developers/dogstatsd/datagram_shell).
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy)]
pub enum EventPriority {
    Normal,
    Low,
}

impl EventPriority {
    pub fn as_str(&self) -> &'static str {
        match *self {
            EventPriority::Normal => "normal",
            EventPriority::Low => "low",
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// The alert type of an event. Needed to use
/// [EventBuilder::with_event_type](struct.EventBuilder.html#method.with_event_type).
///
/// See [Datadog](https://docs.datadoghq.com/developers/dogstatsd/datagram_shell).
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy)]
pub enum EventType {
    Error,
    Warning,
    Info,
    Success,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            EventType::Error => "error",
            EventType::Warning => "warning",
            EventType::Info => "info",
            EventType::Success => "success",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Options for a custom event. Each one that is unset is left out of the
/// datagram entirely.
#[derive(PartialEq, Eq, Debug, Clone)]
pub(crate) struct EventFormatter<'a> {
    title: &'a str,
    text: &'a str,
    priority: Option<EventPriority>,
    event_type: Option<EventType>,
    aggregation_key: Option<&'a str>,
    tags: Vec<Tag<'a>>,
}

impl<'a> EventFormatter<'a> {
    pub(crate) fn new(title: &'a str, text: &'a str) -> Self {
        EventFormatter {
            title,
            text,
            priority: None,
            event_type: None,
            aggregation_key: None,
            tags: Vec::new(),
        }
    }

    fn with_priority(&mut self, priority: EventPriority) {
        self.priority = Some(priority);
    }

    fn with_event_type(&mut self, event_type: EventType) {
        self.event_type = Some(event_type);
    }

    fn with_aggregation_key(&mut self, key: &'a str) {
        self.aggregation_key = Some(key);
    }

    fn with_tag(&mut self, key: &'a str, value: &'a str) {
        self.tags.push((Some(key), value));
    }

    fn with_tag_value(&mut self, value: &'a str) {
        self.tags.push((None, value));
    }

    /// `_e{<title chars>,<text chars>}:<title>|<text>` followed by the
    /// optional `|p:`, `|t:`, `|k:` segments in that order and finally the
    /// tags.
    ///
    /// Client-wide tags are only written when the event has tags of its own.
    pub(crate) fn format(&self, global: &[Tag<'_>]) -> String {
        let mut out = String::with_capacity(16 + self.title.len() + self.text.len());
        let _ = write!(
            out,
            "_e{{{},{}}}:{}|{}",
            self.title.chars().count(),
            self.text.chars().count(),
            self.title,
            self.text
        );

        if let Some(priority) = self.priority {
            let _ = write!(out, "|p:{}", priority);
        }

        if let Some(event_type) = self.event_type {
            let _ = write!(out, "|t:{}", event_type);
        }

        if let Some(key) = self.aggregation_key {
            let _ = write!(out, "|k:{}", key);
        }

        if !self.tags.is_empty() {
            out.push_str(&tag_string(global, &self.tags));
        }

        out
    }
}

/// Builder for customizing an event before sending it.
///
/// Events are never sampled. Priority, event type, aggregation key and tags
/// are all optional and written only when set.
///
/// # Example
///
/// ```
/// use dogstatsd::prelude::*;
/// use dogstatsd::{EventPriority, EventType, NopMetricSink, StatsdClient};
///
/// let client = StatsdClient::from_sink(NopMetricSink);
/// let res = client.custom_event("deploy", "v1.2.3 is out")
///     .with_priority(EventPriority::Low)
///     .with_event_type(EventType::Success)
///     .with_aggregation_key("deploys")
///     .with_tag("service", "api")
///     .try_send();
///
/// assert_eq!(
///     "_e{6,13}:deploy|v1.2.3 is out|p:low|t:success|k:deploys|#service:api",
///     res.unwrap()
/// );
/// ```
#[must_use = "Did you forget to call .send() after customizing the event?"]
#[derive(Debug)]
pub struct EventBuilder<'m, 'c> {
    formatter: EventFormatter<'m>,
    client: &'c StatsdClient,
}

impl<'m, 'c> EventBuilder<'m, 'c> {
    pub(crate) fn new(formatter: EventFormatter<'m>, client: &'c StatsdClient) -> Self {
        EventBuilder { formatter, client }
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.formatter.with_priority(priority);
        self
    }

    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.formatter.with_event_type(event_type);
        self
    }

    /// Group this event with others sharing the same key.
    pub fn with_aggregation_key(mut self, key: &'m str) -> Self {
        self.formatter.with_aggregation_key(key);
        self
    }

    /// Add a key-value tag to this event.
    pub fn with_tag(mut self, key: &'m str, value: &'m str) -> Self {
        self.formatter.with_tag(key, value);
        self
    }

    /// Add a value tag to this event. It is written verbatim.
    pub fn with_tag_value(mut self, value: &'m str) -> Self {
        self.formatter.with_tag_value(value);
        self
    }

    /// Add a sequence of tags, each written verbatim, in order.
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = &'m str>,
    {
        for value in tags {
            self.formatter.with_tag_value(value);
        }
        self
    }

    /// Send the event, returning the datagram that was emitted.
    pub fn try_send(self) -> MetricResult<String> {
        let datagram = self.formatter.format(&self.client.tags());
        self.client.send_metric(&datagram)?;
        Ok(datagram)
    }

    /// Send the event, passing any error to the client's error handler.
    pub fn send(self) {
        let client = self.client;
        if let Err(e) = self.try_send() {
            client.consume_error(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventFormatter, EventPriority, EventType};

    #[test]
    fn test_event_priority_display() {
        assert_eq!("normal", EventPriority::Normal.to_string());
        assert_eq!("low", EventPriority::Low.to_string());
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!("error", EventType::Error.to_string());
        assert_eq!("warning", EventType::Warning.to_string());
        assert_eq!("info", EventType::Info.to_string());
        assert_eq!("success", EventType::Success.to_string());
    }

    #[test]
    fn test_event_formatter_minimal() {
        let fmt = EventFormatter::new("TestTitle", "TestText");
        assert_eq!("_e{9,8}:TestTitle|TestText", fmt.format(&[]));
    }

    #[test]
    fn test_event_formatter_lengths_count_chars() {
        let fmt = EventFormatter::new("héllo", "wörld!");
        assert_eq!("_e{5,6}:héllo|wörld!", fmt.format(&[]));
    }

    #[test]
    fn test_event_formatter_empty_title_and_text() {
        let fmt = EventFormatter::new("", "");
        assert_eq!("_e{0,0}:|", fmt.format(&[]));
    }

    #[test]
    fn test_event_formatter_option_order() {
        let mut fmt = EventFormatter::new("T", "x");
        fmt.with_aggregation_key("testkey");
        fmt.with_event_type(EventType::Success);
        fmt.with_priority(EventPriority::Normal);

        assert_eq!("_e{1,1}:T|x|p:normal|t:success|k:testkey", fmt.format(&[]));
    }

    #[test]
    fn test_event_formatter_tags() {
        let mut fmt = EventFormatter::new("T", "x");
        fmt.with_tag_value("tag1:test");
        fmt.with_tag("tag2", "test2");
        fmt.with_tag_value("tag3");

        assert_eq!("_e{1,1}:T|x|#tag1:test,tag2:test2,tag3", fmt.format(&[]));
    }

    #[test]
    fn test_event_formatter_global_tags_need_local_tags() {
        let global = [(None, "env:prod")];
        let bare = EventFormatter::new("T", "x");
        let mut tagged = EventFormatter::new("T", "x");
        tagged.with_tag_value("a");

        assert_eq!("_e{1,1}:T|x", bare.format(&global));
        assert_eq!("_e{1,1}:T|x|#env:prod,a", tagged.format(&global));
    }
}
