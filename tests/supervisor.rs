//! End-to-end supervision scenarios on a paused clock.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use proxyvisor::{
    CommandSpec, EventKind, ProcessOutput, ProcessRunner, ProxyList, RuntimeError, Supervisor,
    SupervisorConfig, Transport, Unit, UnitError, UnitId, UnitRef,
};

#[derive(Clone, Copy)]
enum Mode {
    /// Fails as soon as it starts.
    FailFast,
    /// Exits cleanly as soon as it starts.
    ExitClean,
    /// Fails after running for the given time.
    FailAfter(Duration),
    /// Never exits.
    RunForever,
}

struct Scripted {
    id: UnitId,
    mode: Mode,
    launches: mpsc::UnboundedSender<(UnitId, Instant)>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Scripted {
    fn new(id: usize, mode: Mode, launches: mpsc::UnboundedSender<(UnitId, Instant)>) -> Arc<Self> {
        Arc::new(Self {
            id: UnitId::new(id),
            mode,
            launches,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Unit for Scripted {
    fn id(&self) -> UnitId {
        self.id
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self) -> Result<(), UnitError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _ = self.launches.send((self.id, Instant::now()));

        let res = match self.mode {
            Mode::FailFast => Err(exited()),
            Mode::ExitClean => Ok(()),
            Mode::FailAfter(d) => {
                tokio::time::sleep(d).await;
                Err(exited())
            }
            Mode::RunForever => std::future::pending().await,
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        res
    }
}

fn exited() -> UnitError {
    UnitError::Exited {
        status: "exit status: 1".into(),
        output: "Connection refused".into(),
    }
}

fn cfg(max_restarts: u32, backoff: Duration) -> SupervisorConfig {
    SupervisorConfig {
        max_restarts,
        backoff,
        ..SupervisorConfig::default()
    }
}

fn start(
    sup: Supervisor,
    units: Vec<UnitRef>,
) -> (CancellationToken, JoinHandle<Result<(), RuntimeError>>) {
    let token = CancellationToken::new();
    let handle = tokio::spawn(sup.run(units, token.clone()));
    (token, handle)
}

/// Collects launch instants of `id` (relative to `t0`) until `n` have been seen.
async fn launches_of(
    rx: &mut mpsc::UnboundedReceiver<(UnitId, Instant)>,
    id: UnitId,
    n: usize,
    t0: Instant,
) -> Vec<Duration> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let (got, at) = rx.recv().await.expect("launch channel open");
        if got == id {
            out.push(at - t0);
        }
    }
    out
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[tokio::test(start_paused = true)]
async fn failing_unit_follows_restart_schedule_while_healthy_unit_runs_once() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let a = Scripted::new(1, Mode::FailFast, tx.clone());
    let b = Scripted::new(2, Mode::RunForever, tx);
    let units: Vec<UnitRef> = vec![a.clone() as UnitRef, b.clone() as UnitRef];

    let t0 = Instant::now();
    let (token, handle) = start(Supervisor::new(cfg(3, secs(120)), Vec::new()), units);

    let got = launches_of(&mut rx, UnitId::new(1), 8, t0).await;
    assert_eq!(
        got,
        vec![
            secs(0),
            secs(0),
            secs(0),
            secs(120),
            secs(120),
            secs(120),
            secs(120),
            secs(240),
        ]
    );

    token.cancel();
    handle.await.expect("join").expect("run");

    // B never exits, so a second launch would leave two executions in flight.
    assert_eq!(b.in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(a.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn every_unit_is_launched_at_startup() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let units: Vec<UnitRef> = (1..=5)
        .map(|i| Scripted::new(i * 10, Mode::RunForever, tx.clone()) as UnitRef)
        .collect();

    let t0 = Instant::now();
    let (token, handle) = start(Supervisor::new(SupervisorConfig::default(), Vec::new()), units);

    let mut seen = Vec::new();
    while seen.len() < 5 {
        let (id, at) = rx.recv().await.expect("launch");
        assert_eq!(at, t0, "startup launches are not delayed");
        seen.push(id.get());
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![10, 20, 30, 40, 50]);

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[tokio::test(start_paused = true)]
async fn clean_exit_counts_as_a_death() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let units: Vec<UnitRef> = vec![Scripted::new(7, Mode::ExitClean, tx) as UnitRef];

    let t0 = Instant::now();
    let (token, handle) = start(Supervisor::new(cfg(3, secs(120)), Vec::new()), units);

    let got = launches_of(&mut rx, UnitId::new(7), 5, t0).await;
    assert_eq!(got, vec![secs(0), secs(0), secs(0), secs(120), secs(120)]);

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[tokio::test(start_paused = true)]
async fn counter_resets_after_each_backoff() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let units: Vec<UnitRef> = vec![Scripted::new(3, Mode::FailFast, tx) as UnitRef];

    let sup = Supervisor::new(cfg(3, secs(120)), Vec::new());
    let mut events = sup.bus().subscribe();
    let (token, handle) = start(sup, units);

    let mut backoffs = Vec::new();
    while backoffs.len() < 3 {
        let ev = events.recv().await.expect("event");
        if ev.kind == EventKind::BackoffScheduled {
            backoffs.push((ev.failures, ev.delay()));
        }
    }
    assert!(backoffs
        .iter()
        .all(|b| *b == (Some(4), Some(secs(120)))));

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[tokio::test(start_paused = true)]
async fn configured_threshold_and_delay_are_honored() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let units: Vec<UnitRef> = vec![Scripted::new(1, Mode::FailFast, tx) as UnitRef];

    let t0 = Instant::now();
    let (token, handle) = start(Supervisor::new(cfg(1, secs(5)), Vec::new()), units);

    let got = launches_of(&mut rx, UnitId::new(1), 5, t0).await;
    assert_eq!(got, vec![secs(0), secs(5), secs(5), secs(10), secs(10)]);

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[tokio::test(start_paused = true)]
async fn at_most_one_execution_per_identity() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let unit = Scripted::new(1, Mode::FailAfter(Duration::from_millis(300)), tx);
    let units: Vec<UnitRef> = vec![unit.clone() as UnitRef];

    let t0 = Instant::now();
    let (token, handle) = start(
        Supervisor::new(cfg(3, Duration::from_millis(50)), Vec::new()),
        units,
    );

    let got = launches_of(&mut rx, UnitId::new(1), 12, t0).await;
    for pair in got.windows(2) {
        assert!(
            pair[1] - pair[0] >= Duration::from_millis(300),
            "launch before previous run ended: {pair:?}"
        );
    }
    assert_eq!(unit.max_in_flight.load(Ordering::SeqCst), 1);

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_relaunching() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let unit = Scripted::new(1, Mode::FailFast, tx);
    let units: Vec<UnitRef> = vec![unit.clone() as UnitRef];

    let t0 = Instant::now();
    let sup = Supervisor::new(cfg(3, secs(120)), Vec::new());
    let mut events = sup.bus().subscribe();
    let (token, handle) = start(sup, units);

    launches_of(&mut rx, UnitId::new(1), 3, t0).await;
    // The fourth death has queued a backoff launch by now.
    tokio::time::sleep(secs(1)).await;
    token.cancel();
    handle.await.expect("join").expect("run");

    let mut saw_shutdown = false;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ShutdownRequested {
            saw_shutdown = true;
        }
    }
    assert!(saw_shutdown);

    tokio::time::sleep(secs(600)).await;
    let mut late = 0;
    while rx.try_recv().is_ok() {
        late += 1;
    }
    assert_eq!(late, 0, "launched after shutdown");
    assert_eq!(unit.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_running_executions() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let unit = Scripted::new(1, Mode::RunForever, tx);
    let units: Vec<UnitRef> = vec![unit.clone() as UnitRef];

    let t0 = Instant::now();
    let (token, handle) = start(Supervisor::new(SupervisorConfig::default(), Vec::new()), units);

    launches_of(&mut rx, UnitId::new(1), 1, t0).await;
    token.cancel();
    handle.await.expect("join").expect("run");

    // The launch task releases its handle on the unit once its execution is dropped.
    tokio::time::sleep(secs(1)).await;
    assert_eq!(Arc::strong_count(&unit), 1);
}

/// Records every command it is asked to run and fails it right away.
struct RecordingRunner {
    commands: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, cmd: &CommandSpec) -> std::io::Result<ProcessOutput> {
        let _ = self.commands.send(cmd.to_string());
        Ok(ProcessOutput {
            success: false,
            status: "exit status: 1".into(),
            output: "2024/01/01 socat[1] E connect(): Connection refused\n".into(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn proxy_list_units_run_their_commands() {
    let content = "# forwards\n8080:db.internal:5432\n\n2222:bastion:22\n";
    let list = ProxyList::parse("proxies.list", content, Transport::Plain).expect("parse");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let units = list.into_units(Arc::new(RecordingRunner { commands: tx }));
    let ids: Vec<usize> = units.iter().map(|u| u.id().get()).collect();
    assert_eq!(ids, vec![2, 4]);

    let (token, handle) = start(Supervisor::new(cfg(3, secs(120)), Vec::new()), units);

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let cmd = rx.recv().await.expect("command");
        if !seen.contains(&cmd) {
            seen.push(cmd);
        }
    }
    seen.sort();
    assert_eq!(
        seen,
        vec![
            "socat tcp-listen:2222,reuseaddr,fork tcp:bastion:22".to_string(),
            "socat tcp-listen:8080,reuseaddr,fork tcp:db.internal:5432".to_string(),
        ]
    );

    token.cancel();
    handle.await.expect("join").expect("run");
}

#[test]
fn malformed_proxy_list_names_file_and_line() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "8080:db:5432").unwrap();
    writeln!(file, "# next one is broken").unwrap();
    writeln!(file, "9090").unwrap();
    file.flush().unwrap();

    let err = ProxyList::load(file.path(), Transport::Plain).unwrap_err();
    assert_eq!(err.as_label(), "config_parse_failed");
    assert_eq!(
        err.to_string(),
        format!("{}: line 3: missing remote host", file.path().display())
    );
}

#[test]
fn non_utf8_proxy_line_names_file_and_line() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"8080:db:5432\n2222:bast\xffion:22\n").unwrap();
    file.flush().unwrap();

    let err = ProxyList::load(file.path(), Transport::Plain).unwrap_err();
    assert_eq!(err.as_label(), "config_parse_failed");
    assert_eq!(
        err.to_string(),
        format!("{}: line 2: not valid UTF-8", file.path().display())
    );
}

#[test]
fn missing_proxy_list_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.list");

    let err = ProxyList::load(&path, Transport::Encrypted).unwrap_err();
    assert_eq!(err.as_label(), "config_read_failed");
    assert!(err.to_string().contains("absent.list"));
}

#[tokio::test]
async fn empty_proxy_list_refuses_to_start() {
    let list = ProxyList::parse("proxies.list", "# nothing yet\n", Transport::Plain).expect("parse");
    assert!(list.is_empty());

    let (tx, _rx) = mpsc::unbounded_channel();
    let units = list.into_units(Arc::new(RecordingRunner { commands: tx }));
    let err = Supervisor::new(SupervisorConfig::default(), Vec::new())
        .run(units, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::NoUnits));
}
