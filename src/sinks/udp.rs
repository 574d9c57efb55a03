// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::sinks::core::{MetricSink, SinkStats, SocketStats};
use crate::timer::IdleTimer;
use crate::types::{ErrorKind, MetricError, MetricResult};
use crate::EPHEMERAL_LIFETIME;

const TIMER_THREAD_NAME: &str = "dogstatsd-idle";

/// Attempt to convert anything implementing the `ToSocketAddrs` trait
/// into a concrete `SocketAddr` instance, returning an `InvalidInput`
/// error if the address could not be parsed.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn get_addr<A: ToSocketAddrs>(addr: A) -> MetricResult<SocketAddr> {
    match addr.to_socket_addrs()?.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((
            ErrorKind::InvalidInput,
            "No socket addresses yielded",
        ))),
    }
}

/// Wildcard local address of the same family as the destination.
fn local_addr_for(addr: &SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}

/// Implementation of a `MetricSink` that emits datagrams over UDP.
///
/// The sink sends over one of two sockets:
///
/// * A **shared** socket supplied by the caller. It is used for every send
///   and is never closed by this sink: `close()` only gives up the sink's
///   reference to it, ownership stays with the caller.
/// * An **ephemeral** socket, bound on demand the first time a datagram has
///   to be sent without a shared socket. It is closed once no datagram has
///   been sent on it for the configured lifetime (one second by default)
///   and bound again by the next send. At most one ephemeral socket exists
///   per sink.
///
/// Each datagram is sent when the `.emit()` method is called, in the thread
/// of the caller, using a non-blocking socket. Failed sends are counted as
/// dropped in the sink's stats and returned to the caller.
///
/// Calling `emit` after `close` is allowed: an ephemeral socket is bound
/// again on demand.
///
/// Cloning the sink is cheap and every clone shares the same sockets.
#[derive(Debug, Clone)]
pub struct UdpMetricSink {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    addr: SocketAddr,
    lifetime: Duration,
    shared: Mutex<Option<Arc<UdpSocket>>>,
    ephemeral: Mutex<EphemeralState>,
    stats: SocketStats,
}

#[derive(Debug)]
struct EphemeralState {
    socket: Option<Arc<UdpSocket>>,
    last_used: Instant,
    // Bumped for every new socket so that a timer left over from a previous
    // socket never tears down the current one.
    generation: u64,
    timer: Option<IdleTimer>,
}

impl UdpMetricSink {
    /// Construct a new `UdpMetricSink` that sends over the given socket.
    ///
    /// The address should be the address of the remote DogStatsD server. The
    /// socket should already be bound to a local address with any desired
    /// configuration applied (blocking vs non-blocking, timeouts, etc.).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::net::UdpSocket;
    /// use dogstatsd::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// let host = ("metrics.example.com", DEFAULT_PORT);
    /// let sink = UdpMetricSink::from(host, socket);
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * The host address is otherwise unable to be parsed
    pub fn from<A>(to_addr: A, socket: UdpSocket) -> MetricResult<UdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        Ok(UdpMetricSink::builder(to_addr)?.shared_socket(Arc::new(socket)).build())
    }

    /// Construct a new `UdpMetricSink` that binds an ephemeral socket on demand
    /// and closes it after one second without sends.
    ///
    /// # Example
    ///
    /// ```
    /// use dogstatsd::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = UdpMetricSink::ephemeral(("127.0.0.1", DEFAULT_PORT)).unwrap();
    /// assert!(!sink.has_ephemeral_socket());
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * The host address is otherwise unable to be parsed
    pub fn ephemeral<A>(to_addr: A) -> MetricResult<UdpMetricSink>
    where
        A: ToSocketAddrs,
    {
        Ok(UdpMetricSink::builder(to_addr)?.build())
    }

    /// Creates a `UdpMetricSinkBuilder` to configure a `UdpMetricSink`.
    ///
    /// The address is resolved right away.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::net::UdpSocket;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use dogstatsd::UdpMetricSink;
    ///
    /// let socket = Arc::new(UdpSocket::bind("0.0.0.0:0").unwrap());
    /// let sink = UdpMetricSink::builder(("metrics.example.com", 8125))
    ///     .unwrap()
    ///     .shared_socket(Arc::clone(&socket))
    ///     .ephemeral_lifetime(Duration::from_millis(500))
    ///     .build();
    /// ```
    pub fn builder<A>(to_addr: A) -> MetricResult<UdpMetricSinkBuilder>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        Ok(UdpMetricSinkBuilder {
            addr,
            shared: None,
            lifetime: EPHEMERAL_LIFETIME,
        })
    }

    /// Address datagrams are sent to.
    pub fn addr(&self) -> SocketAddr {
        self.inner.addr
    }

    /// True while this sink holds a caller supplied socket, that is, until
    /// `close()` is called.
    pub fn has_shared_socket(&self) -> bool {
        self.inner.lock_shared().is_some()
    }

    /// True while an ephemeral socket is bound. It is false before the first
    /// send needing one and again after the idle lifetime elapses.
    pub fn has_ephemeral_socket(&self) -> bool {
        self.inner.lock_ephemeral().socket.is_some()
    }
}

impl Inner {
    fn lock_shared(&self) -> MutexGuard<'_, Option<Arc<UdpSocket>>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ephemeral(&self) -> MutexGuard<'_, EphemeralState> {
        self.ephemeral.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(self: &Arc<Self>, buf: &[u8]) -> io::Result<usize> {
        let shared = self.lock_shared().as_ref().map(Arc::clone);
        let socket = match shared {
            Some(socket) => socket,
            None => self.acquire_ephemeral()?,
        };

        socket.send_to(buf, self.addr)
    }

    /// Return the live ephemeral socket, binding one if needed, and mark it
    /// as just used.
    fn acquire_ephemeral(self: &Arc<Self>) -> io::Result<Arc<UdpSocket>> {
        let mut state = self.lock_ephemeral();
        let socket = match state.socket {
            Some(ref socket) => Arc::clone(socket),
            None => self.open_ephemeral(&mut state)?,
        };

        state.last_used = Instant::now();
        Ok(socket)
    }

    fn open_ephemeral(self: &Arc<Self>, state: &mut EphemeralState) -> io::Result<Arc<UdpSocket>> {
        let socket = UdpSocket::bind(local_addr_for(&self.addr))?;
        socket.set_nonblocking(true)?;
        let socket = Arc::new(socket);

        let generation = state.generation.wrapping_add(1);
        let weak = Arc::downgrade(self);
        let timer = IdleTimer::spawn(TIMER_THREAD_NAME, self.lifetime, move || {
            weak.upgrade().and_then(|inner| inner.expire(generation))
        })?;

        state.generation = generation;
        state.socket = Some(Arc::clone(&socket));
        state.timer = Some(timer);
        debug!("Opened ephemeral socket for {}", self.addr);
        Ok(socket)
    }

    /// Idle check run by the timer: close the socket if it hasn't been used
    /// for the whole lifetime, otherwise ask to be woken up when it would be.
    fn expire(&self, generation: u64) -> Option<Duration> {
        let mut state = self.lock_ephemeral();
        if state.generation != generation || state.socket.is_none() {
            return None;
        }

        let idle = state.last_used.elapsed();
        if idle >= self.lifetime {
            state.socket = None;
            state.timer = None;
            debug!("Closed ephemeral socket for {} after {:?} idle", self.addr, idle);
            None
        } else {
            Some(self.lifetime - idle)
        }
    }

    fn close(&self) {
        if self.lock_shared().take().is_some() {
            debug!("Released shared socket for {}", self.addr);
        }

        let mut state = self.lock_ephemeral();
        state.timer = None;
        if state.socket.take().is_some() {
            debug!("Closed ephemeral socket for {}", self.addr);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.close();
    }
}

impl MetricSink for UdpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        let res = self.inner.send(metric.as_bytes());
        match res {
            Ok(n) => trace!("Wrote {} bytes to {}", n, self.inner.addr),
            Err(ref err) => trace!("Got error writing to {}: {}", self.inner.addr, err),
        }
        self.inner.stats.update(res, metric.len())
    }

    fn close(&self) {
        self.inner.close();
    }

    fn stats(&self) -> SinkStats {
        (&self.inner.stats).into()
    }
}

/// Configuration for a `UdpMetricSink`, created by `UdpMetricSink::builder`.
#[must_use]
#[derive(Debug)]
pub struct UdpMetricSinkBuilder {
    addr: SocketAddr,
    shared: Option<Arc<UdpSocket>>,
    lifetime: Duration,
}

impl UdpMetricSinkBuilder {
    /// Send over this caller owned socket instead of ephemeral ones.
    ///
    /// The socket is used as is, so it should already have any desired
    /// configuration (non-blocking, etc.) applied. It is never closed by
    /// the sink.
    pub fn shared_socket(self, socket: Arc<UdpSocket>) -> Self {
        Self {
            shared: Some(socket),
            ..self
        }
    }

    /// How long an ephemeral socket may go without sends before it is closed.
    pub fn ephemeral_lifetime(self, lifetime: Duration) -> Self {
        Self { lifetime, ..self }
    }

    /// Returns a `UdpMetricSink` that uses this configuration.
    ///
    /// No ephemeral socket is bound until the first datagram needs one.
    pub fn build(self) -> UdpMetricSink {
        UdpMetricSink {
            inner: Arc::new(Inner {
                addr: self.addr,
                lifetime: self.lifetime,
                shared: Mutex::new(self.shared),
                ephemeral: Mutex::new(EphemeralState {
                    socket: None,
                    last_used: Instant::now(),
                    generation: 0,
                    timer: None,
                }),
                stats: SocketStats::default(),
            }),
        }
    }
}
