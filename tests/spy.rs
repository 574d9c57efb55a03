use dogstatsd::prelude::*;
use dogstatsd::{EventPriority, EventType, SpyMetricSink, StatsdClient};

mod utils;
use utils::{drain, run_arc_threaded_test, DATAGRAMS_PER_ITERATION, NUM_ITERATIONS, NUM_THREADS};

#[test]
fn test_statsd_client_spy_sink_global_and_local_tags() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(sink).with_tag("a", "1").build();

    client.increment_with_tags("x").with_tag("b", "2").send();

    assert_eq!(vec!["x:1|c|#a:1,b:2"], drain(&rx));
}

#[test]
fn test_statsd_client_spy_sink_every_metric_type() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::from_sink(sink);

    client.increment("requests");
    client.decrement_by("queue", 3);
    client.timing("latency", 125u64);
    client.gauge("workers", 8u64);
    client.gauge("load", "+3");
    client.histogram("size", 4.5);
    client.set("users", "user-1");

    assert_eq!(
        vec![
            "requests:1|c",
            "queue:-3|c",
            "latency:125|ms",
            "workers:8|g",
            "load:+3|g",
            "size:4.5|h",
            "users:user-1|s",
        ],
        drain(&rx)
    );
}

#[test]
fn test_statsd_client_spy_sink_many_names_share_tags() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(sink).with_tag_value("web").build();

    client
        .gauge_with_tags(["pool.size", "pool.max", "pool.size"], 10u64)
        .with_tag("region", "us")
        .send();

    assert_eq!(
        vec!["pool.size:10|g|#web,region:us", "pool.max:10|g|#web,region:us"],
        drain(&rx)
    );
}

#[test]
fn test_statsd_client_spy_sink_simple_event() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(sink).with_tag("env", "test").build();

    client.event("TestTitle", "TestText");

    assert_eq!(vec!["_e{9,8}:TestTitle|TestText"], drain(&rx));
}

#[test]
fn test_statsd_client_spy_sink_event_options() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::from_sink(sink);

    client
        .custom_event("TestTitle", "TestText")
        .with_priority(EventPriority::Normal)
        .with_event_type(EventType::Success)
        .with_aggregation_key("testkey")
        .send();

    assert_eq!(
        vec!["_e{9,8}:TestTitle|TestText|p:normal|t:success|k:testkey"],
        drain(&rx)
    );
}

#[test]
fn test_statsd_client_spy_sink_event_tags() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(sink).with_tag("tag1", "test").build();

    client
        .custom_event("TestTitle", "TestText")
        .with_tag("tag2", "test2")
        .with_tag_value("tag3")
        .send();

    assert_eq!(vec!["_e{9,8}:TestTitle|TestText|#tag1:test,tag2:test2,tag3"], drain(&rx));
}

#[test]
fn test_statsd_client_spy_sink_single_threaded() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::from_sink(sink);
    run_arc_threaded_test(client, 1, 1);

    assert_eq!(DATAGRAMS_PER_ITERATION as usize, drain(&rx).len());
}

#[ignore]
#[test]
fn test_statsd_client_spy_sink_many_threaded() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::from_sink(sink);
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS);

    assert_eq!((NUM_THREADS * NUM_ITERATIONS * DATAGRAMS_PER_ITERATION) as usize, drain(&rx).len());
}
