use criterion::{criterion_group, criterion_main, Criterion};
use dogstatsd::prelude::*;
use dogstatsd::{NopMetricSink, Sampler, StatsdClient, UdpMetricSink, DEFAULT_PORT};
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

fn new_nop_client() -> StatsdClient {
    StatsdClient::from_sink(NopMetricSink)
}

fn new_tagged_nop_client() -> StatsdClient {
    StatsdClient::builder(NopMetricSink)
        .with_tag("env", "bench")
        .with_tag_value("canary")
        .with_sampler(Arc::new(Sampler::seed_from_u64(42)))
        .build()
}

fn new_udp_client() -> StatsdClient {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_nonblocking(true).unwrap();
    let sink = UdpMetricSink::from(("127.0.0.1", DEFAULT_PORT), socket).unwrap();
    StatsdClient::from_sink(sink)
}

fn new_ephemeral_udp_client() -> StatsdClient {
    let sink = UdpMetricSink::ephemeral(("127.0.0.1", DEFAULT_PORT)).unwrap();
    StatsdClient::from_sink(sink)
}

fn benchmark_nop_client(c: &mut Criterion) {
    let mut group = c.benchmark_group("nop");
    let client = new_nop_client();

    group.bench_function("increment", |b| b.iter(|| client.increment("some.counter")));
    group.bench_function("increment_many", |b| {
        b.iter(|| client.increment(["some.counter", "other.counter", "third.counter"]))
    });
    group.bench_function("timing_duration", |b| {
        b.iter(|| client.timing("some.timer", Duration::from_millis(35)))
    });
    group.bench_function("gauge", |b| b.iter(|| client.gauge("some.gauge", 5u64)));
    group.bench_function("histogram", |b| b.iter(|| client.histogram("some.histogram", 4.5)));
    group.bench_function("set", |b| b.iter(|| client.set("some.set", "user-123")));
    group.bench_function("event", |b| b.iter(|| client.event("some.title", "some text")));
    group.finish();
}

fn benchmark_tagged_client(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagged");
    let client = new_tagged_nop_client();

    group.bench_function("increment_with_tags", |b| {
        b.iter(|| {
            client
                .increment_with_tags("some.counter")
                .with_tag("method", "GET")
                .with_tag_value("cached")
                .send()
        })
    });
    group.bench_function("increment_with_sample_rate", |b| {
        b.iter(|| {
            client
                .increment_with_tags("some.counter")
                .with_tag("method", "GET")
                .with_sample_rate(0.5)
                .send()
        })
    });
    group.bench_function("custom_event", |b| {
        b.iter(|| {
            client
                .custom_event("some.title", "some text")
                .with_priority(dogstatsd::EventPriority::Low)
                .with_aggregation_key("some.key")
                .with_tag("host", "web1")
                .send()
        })
    });
    group.finish();
}

fn benchmark_udp_client(c: &mut Criterion) {
    let mut group = c.benchmark_group("udp");
    let shared = new_udp_client();
    let ephemeral = new_ephemeral_udp_client();

    group.bench_function("shared_socket", |b| b.iter(|| shared.increment("some.counter")));
    group.bench_function("ephemeral_socket", |b| b.iter(|| ephemeral.increment("some.counter")));
    group.finish();

    ephemeral.close();
}

criterion_group!(benches, benchmark_nop_client, benchmark_tagged_client, benchmark_udp_client);
criterion_main!(benches);
