use dogstatsd::prelude::*;
use dogstatsd::test::UdpCollector;
use dogstatsd::{ClientConfig, StatsdClient, UdpMetricSink, DEFAULT_PORT};
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

mod utils;
use utils::{run_arc_threaded_test, NUM_ITERATIONS, NUM_THREADS};

const RECV_TIMEOUT: Duration = Duration::from_millis(500);
const TARGET_HOST: (&str, u16) = ("127.0.0.1", DEFAULT_PORT);

fn new_collector() -> UdpCollector {
    UdpCollector::bind(RECV_TIMEOUT).unwrap()
}

fn new_udp_client() -> StatsdClient {
    let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    socket.set_nonblocking(true).unwrap();
    let sink = UdpMetricSink::from(TARGET_HOST, socket).unwrap();
    StatsdClient::from_sink(sink)
}

fn new_ephemeral_udp_client() -> StatsdClient {
    StatsdClient::from_udp_host("127.0.0.1", 0).unwrap()
}

#[test]
fn test_statsd_client_from_config_delivers_datagrams() {
    let collector = new_collector();
    let addr = collector.addr().unwrap();
    let config = ClientConfig::new("127.0.0.1", addr.port()).with_global_tags(["env:test"]);
    let client = StatsdClient::from_config(config).unwrap();

    client.increment_with_tags("x").with_tag("b", "2").send();
    client.timing("y", 12u64);

    assert_eq!("x:1|c|#env:test,b:2", collector.recv().unwrap());
    assert_eq!("y:12|ms|#env:test", collector.recv().unwrap());
    client.close();
}

#[test]
fn test_statsd_client_ephemeral_socket_torn_down_and_recreated() {
    let collector = new_collector();
    let sink = UdpMetricSink::builder(collector.addr().unwrap())
        .unwrap()
        .ephemeral_lifetime(Duration::from_millis(100))
        .build();
    let client = StatsdClient::from_sink(sink.clone());

    assert!(!sink.has_ephemeral_socket());
    client.increment("first");
    assert!(sink.has_ephemeral_socket());
    assert_eq!("first:1|c", collector.recv().unwrap());

    thread::sleep(Duration::from_millis(600));
    assert!(!sink.has_ephemeral_socket());

    client.increment("second");
    assert!(sink.has_ephemeral_socket());
    assert_eq!("second:1|c", collector.recv().unwrap());
    client.close();
    assert!(!sink.has_ephemeral_socket());
}

#[test]
fn test_statsd_client_shared_socket_released_on_close() {
    let collector = new_collector();
    let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
    let config =
        ClientConfig::new("127.0.0.1", collector.addr().unwrap().port()).with_shared_socket(Arc::clone(&socket));
    let client = StatsdClient::from_config(config).unwrap();

    assert_eq!(2, Arc::strong_count(&socket));
    client.gauge("pool", 3u64);
    assert_eq!("pool:3|g", collector.recv().unwrap());

    client.close();
    client.close();
    assert_eq!(1, Arc::strong_count(&socket));
}

#[test]
fn test_statsd_client_send_after_close_uses_ephemeral_socket() {
    let collector = new_collector();
    let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
    let sink = UdpMetricSink::builder(collector.addr().unwrap())
        .unwrap()
        .shared_socket(Arc::clone(&socket))
        .build();
    let client = StatsdClient::from_sink(sink.clone());

    client.close();
    assert!(!sink.has_shared_socket());

    client.set("visitors", "abc");
    assert!(sink.has_ephemeral_socket());
    assert_eq!("visitors:abc|s", collector.recv().unwrap());
    assert_eq!(1, Arc::strong_count(&socket));
    client.close();
}

#[test]
fn test_statsd_client_udp_stats_count_sent_datagrams() {
    let collector = new_collector();
    let client = StatsdClient::from_sink(UdpMetricSink::ephemeral(collector.addr().unwrap()).unwrap());

    client.increment("a");
    client.event("t", "x");

    let received = collector.drain();
    let stats = client.stats();
    assert_eq!(vec!["a:1|c", "_e{1,1}:t|x"], received);
    assert_eq!(2, stats.packets_sent);
    assert_eq!(("a:1|c".len() + "_e{1,1}:t|x".len()) as u64, stats.bytes_sent);
    client.close();
}

#[test]
fn test_statsd_client_udp_sink_single_threaded() {
    let client = new_udp_client();
    run_arc_threaded_test(client, 1, 1);
}

#[test]
fn test_statsd_client_ephemeral_udp_sink_single_threaded() {
    let client = new_ephemeral_udp_client();
    run_arc_threaded_test(client, 1, 1);
}

#[ignore]
#[test]
fn test_statsd_client_udp_sink_many_threaded() {
    let client = new_udp_client();
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS);
}

#[ignore]
#[test]
fn test_statsd_client_ephemeral_udp_sink_many_threaded() {
    let client = new_ephemeral_udp_client();
    run_arc_threaded_test(client, NUM_THREADS, NUM_ITERATIONS);
}
