//! Scanner module - sweeps a port range with a bounded pool of workers.
//!
//! Every port of the range is queued up front and the queue is closed before
//! any worker starts. Workers pull ports until the queue is drained, so the
//! number of simultaneous outbound connections never exceeds the worker
//! count. A port check that panics is logged and counted as closed; the worker
//! keeps draining the queue.

pub mod tcp;
pub mod traits;

use crate::types::{resolve_host, Port, PortRange};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use tcp::TcpConnectProber;
pub use traits::{Prober, SharedProber};

/// Shared, pre-filled and closed queue of ports waiting to be probed.
type PortQueue = Mutex<UnboundedReceiver<Port>>;

/// Fans probes for a port range out across a fixed number of workers.
#[derive(Clone)]
pub struct RangeScanner {
    prober: SharedProber,
}

impl RangeScanner {
    /// Create a scanner backed by `prober`.
    pub fn new(prober: SharedProber) -> Self {
        Self { prober }
    }

    /// Resolve `host` and scan every address it resolves to.
    ///
    /// A host that cannot be resolved is indistinguishable from one with
    /// every port closed: the result is empty.
    pub async fn scan_host(&self, host: &str, ports: PortRange, workers: usize) -> Vec<Port> {
        match resolve_host(host).await {
            Ok(targets) => self.scan_addresses(&targets, ports, workers).await,
            Err(e) => {
                debug!(host, error = %e, "host resolution failed, treating all ports as closed");
                Vec::new()
            }
        }
    }

    /// Scan each address in turn and merge the results.
    ///
    /// A port counts as open when any of the addresses accepts it. The
    /// result is ascending and free of duplicates.
    pub async fn scan_addresses(
        &self,
        targets: &[IpAddr],
        ports: PortRange,
        workers: usize,
    ) -> Vec<Port> {
        let mut open = Vec::new();
        for &target in targets {
            open.extend(self.scan_range(target, ports, workers).await);
        }
        open.sort_unstable();
        open.dedup();
        open
    }

    /// Probe every port in `ports` on `target` using exactly `workers`
    /// concurrent workers and return the open ones in ascending order.
    ///
    /// An empty range or a worker count of zero yields no ports.
    pub async fn scan_range(&self, target: IpAddr, ports: PortRange, workers: usize) -> Vec<Port> {
        if ports.is_empty() || workers == 0 {
            return Vec::new();
        }

        let start_time = Instant::now();
        let queue = fill_queue(ports);
        let prober = self.prober.as_ref();

        let mut pool: FuturesUnordered<_> = (0..workers)
            .map(|_| drain(&queue, prober, target))
            .collect();

        let mut open = Vec::new();
        while let Some(found) = pool.next().await {
            open.extend(found);
        }
        open.sort_unstable();

        debug!(
            %target,
            protocol = prober.protocol(),
            range = %ports,
            timeout_ms = prober.timeout().as_millis() as u64,
            workers,
            open = open.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "range scan complete"
        );

        open
    }
}

/// Queue every port of `ports` and close the queue for new entries.
fn fill_queue(ports: PortRange) -> PortQueue {
    let (tx, rx) = mpsc::unbounded_channel();
    for port in ports.iter() {
        if tx.send(port).is_err() {
            break;
        }
    }
    drop(tx);
    Mutex::new(rx)
}

/// One worker: probe ports until the queue is drained.
async fn drain(queue: &PortQueue, prober: &dyn Prober, target: IpAddr) -> Vec<Port> {
    let mut open = Vec::new();

    loop {
        let next = queue.lock().await.recv().await;
        let Some(port) = next else {
            break;
        };

        match AssertUnwindSafe(prober.probe(target, port)).catch_unwind().await {
            Ok(true) => open.push(port),
            Ok(false) => {}
            Err(_) => warn!(%target, %port, "port check panicked, treating port as closed"),
        }
    }

    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// Reports a fixed set of ports as open and records probe concurrency.
    struct FakeProber {
        open: HashSet<u16>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeProber {
        fn new(open: &[u16]) -> Self {
            Self {
                open: open.iter().copied().collect(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        fn protocol(&self) -> &'static str {
            "fake"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, _target: IpAddr, port: Port) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.open.contains(&port.as_u16())
        }
    }

    /// Panics on one port and reports a fixed set of others as open.
    struct PanicOnPort {
        panic_on: u16,
        open: HashSet<u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for PanicOnPort {
        fn protocol(&self) -> &'static str {
            "fake"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, _target: IpAddr, port: Port) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if port.as_u16() == self.panic_on {
                panic!("connection handler blew up on port {port}");
            }
            self.open.contains(&port.as_u16())
        }
    }

    /// Reports ports as open per address.
    struct PerAddressOpen {
        open: HashSet<(IpAddr, u16)>,
    }

    #[async_trait]
    impl Prober for PerAddressOpen {
        fn protocol(&self) -> &'static str {
            "fake"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        async fn probe(&self, target: IpAddr, port: Port) -> bool {
            self.open.contains(&(target, port.as_u16()))
        }
    }

    fn range(start: u16, end: u16) -> PortRange {
        PortRange::new(Port::new(start).unwrap(), Port::new(end).unwrap())
    }

    fn as_u16(ports: &[Port]) -> Vec<u16> {
        ports.iter().map(|p| p.as_u16()).collect()
    }

    #[tokio::test]
    async fn test_scan_finds_open_ports() {
        let prober = Arc::new(FakeProber::new(&[22, 80, 443, 9000]));
        let scanner = RangeScanner::new(prober.clone());

        let open = scanner.scan_range(LOCALHOST, range(1, 1024), 16).await;

        assert_eq!(as_u16(&open), vec![22, 80, 443]);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1024);
    }

    #[tokio::test]
    async fn test_every_port_probed_once() {
        let all: Vec<u16> = (100..=200).collect();
        let prober = Arc::new(FakeProber::new(&all));
        let scanner = RangeScanner::new(prober.clone());

        let open = scanner.scan_range(LOCALHOST, range(100, 200), 7).await;

        assert_eq!(as_u16(&open), all);
        assert_eq!(prober.calls.load(Ordering::SeqCst), all.len());
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let prober = Arc::new(FakeProber::new(&[5]));
        let scanner = RangeScanner::new(prober.clone());

        for workers in [1, 10, 1000] {
            let open = scanner.scan_range(LOCALHOST, range(10, 1), workers).await;
            assert!(open.is_empty());
        }
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_workers_is_empty() {
        let prober = Arc::new(FakeProber::new(&[5]));
        let scanner = RangeScanner::new(prober.clone());

        let open = scanner.scan_range(LOCALHOST, range(1, 10), 0).await;
        assert!(open.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_workers() {
        let prober = Arc::new(FakeProber::new(&[]).with_delay(Duration::from_millis(10)));
        let scanner = RangeScanner::new(prober.clone());

        scanner.scan_range(LOCALHOST, range(1, 40), 4).await;

        let max = prober.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {max} concurrent probes with 4 workers");
        assert!(max >= 2, "workers did not run concurrently");
        assert_eq!(prober.calls.load(Ordering::SeqCst), 40);
    }

    #[tokio::test]
    async fn test_more_workers_than_ports() {
        let prober = Arc::new(FakeProber::new(&[3]));
        let scanner = RangeScanner::new(prober);

        let open = scanner.scan_range(LOCALHOST, range(1, 5), 1000).await;
        assert_eq!(as_u16(&open), vec![3]);
    }

    #[tokio::test]
    async fn test_scan_real_listener() {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let start = port.saturating_sub(3).max(1);
        let end = port.saturating_add(3);

        let scanner = RangeScanner::new(Arc::new(TcpConnectProber::new(Duration::from_secs(1))));
        let open = scanner.scan_range(LOCALHOST, range(start, end), 4).await;

        assert!(as_u16(&open).contains(&port));
        assert!(open.iter().all(|p| (start..=end).contains(&p.as_u16())));
    }

    #[tokio::test]
    async fn test_scan_host_with_ip_literal() {
        let prober = Arc::new(FakeProber::new(&[8080]));
        let scanner = RangeScanner::new(prober);

        let open = scanner.scan_host("127.0.0.1", range(8000, 8100), 8).await;
        assert_eq!(as_u16(&open), vec![8080]);
    }

    #[tokio::test]
    async fn test_scan_host_unresolvable_is_empty() {
        let prober = Arc::new(FakeProber::new(&[80]));
        let scanner = RangeScanner::new(prober.clone());

        let open = scanner.scan_host("", range(1, 100), 8).await;
        assert!(open.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_check_counts_as_closed() {
        let checker = Arc::new(PanicOnPort {
            panic_on: 5,
            open: [3, 7].into_iter().collect(),
            calls: AtomicUsize::new(0),
        });
        let scanner = RangeScanner::new(checker.clone());

        for workers in [1, 2, 16] {
            checker.calls.store(0, Ordering::SeqCst);
            let open = scanner.scan_range(LOCALHOST, range(1, 10), workers).await;

            assert_eq!(as_u16(&open), vec![3, 7], "with {workers} workers");
            assert_eq!(checker.calls.load(Ordering::SeqCst), 10);
        }
    }

    #[tokio::test]
    async fn test_scan_addresses_merges_results() {
        let first = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        let second = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));
        let checker = Arc::new(PerAddressOpen {
            open: [(first, 22), (second, 22), (second, 8080)]
                .into_iter()
                .collect(),
        });
        let scanner = RangeScanner::new(checker);

        let open = scanner
            .scan_addresses(&[first, second], range(1, 9000), 32)
            .await;
        assert_eq!(as_u16(&open), vec![22, 8080]);

        let first_only = scanner.scan_addresses(&[first], range(8000, 8100), 4).await;
        assert!(first_only.is_empty());
    }

    #[tokio::test]
    async fn test_scan_addresses_empty_list() {
        let prober = Arc::new(FakeProber::new(&[80]));
        let scanner = RangeScanner::new(prober.clone());

        let open = scanner.scan_addresses(&[], range(1, 100), 8).await;
        assert!(open.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }
}
