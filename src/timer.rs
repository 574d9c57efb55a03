// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::io;
use std::thread;
use std::time::Duration;

/// Deferred, cancellable task run on its own thread.
///
/// The task is invoked once the current wait elapses. It returns `Some(wait)`
/// to be run again after that much more time, or `None` when it is done.
/// Dropping the `IdleTimer` cancels the task: the thread wakes up right
/// away, sees the disconnected channel and exits without running it.
#[derive(Debug)]
pub(crate) struct IdleTimer {
    _cancel: Sender<()>,
}

impl IdleTimer {
    pub(crate) fn spawn<F>(name: &str, initial: Duration, mut task: F) -> io::Result<IdleTimer>
    where
        F: FnMut() -> Option<Duration> + Send + 'static,
    {
        let (tx, rx) = bounded::<()>(0);

        thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut wait = initial;
            loop {
                match rx.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => match task() {
                        Some(next) => wait = next,
                        None => break,
                    },
                    // Nothing is ever sent, any other outcome means cancelled
                    _ => break,
                }
            }
        })?;

        Ok(IdleTimer { _cancel: tx })
    }
}

#[cfg(test)]
mod tests {
    use super::IdleTimer;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    #[test]
    fn test_idle_timer_runs_task() {
        let (tx, rx) = unbounded();
        let _timer = IdleTimer::spawn("test-idle", Duration::from_millis(10), move || {
            let _ = tx.send(());
            None
        })
        .unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_idle_timer_reschedules_until_done() {
        let (tx, rx) = unbounded();
        let mut runs = 0;
        let _timer = IdleTimer::spawn("test-idle", Duration::from_millis(5), move || {
            runs += 1;
            let _ = tx.send(runs);
            if runs < 3 {
                Some(Duration::from_millis(5))
            } else {
                None
            }
        })
        .unwrap();

        let seen: Vec<i32> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(vec![1, 2, 3], seen);
    }

    #[test]
    fn test_idle_timer_drop_cancels() {
        let (tx, rx) = unbounded::<()>();
        let timer = IdleTimer::spawn("test-idle", Duration::from_millis(200), move || {
            let _ = tx.send(());
            None
        })
        .unwrap();

        drop(timer);

        // The task owns the only sender. Once the thread exits without running
        // the task the sender is dropped and the channel disconnects.
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
