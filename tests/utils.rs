use crossbeam_channel::Receiver;
use dogstatsd::prelude::*;
use dogstatsd::StatsdClient;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[allow(dead_code)]
pub const NUM_THREADS: u64 = 100;
#[allow(dead_code)]
pub const NUM_ITERATIONS: u64 = 1_000;

// Datagrams sent per iteration of `run_arc_threaded_test`
#[allow(dead_code)]
pub const DATAGRAMS_PER_ITERATION: u64 = 8;

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    local_client.increment_by("some.counter", i as i64 + 1);
                    local_client.timing("some.timer", i);
                    local_client.timing("some.timer", Duration::from_millis(i));
                    local_client.gauge("some.gauge", i);
                    local_client.gauge("some.gauge", i as f64);
                    local_client.histogram("some.histogram", i);
                    local_client.set("some.set", i as i64);
                    local_client.event("some.event", "happened");
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}

#[allow(dead_code)]
pub fn drain(rx: &Receiver<Vec<u8>>) -> Vec<String> {
    rx.try_iter().map(|v| String::from_utf8(v).unwrap()).collect()
}
