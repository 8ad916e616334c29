//! Connection manager scenarios over a scripted transport
//!
//! The transport double records execs and writes, and feeds the ingest task
//! whatever bytes the test pushes through an in-memory channel.

use async_trait::async_trait;
use itmux_core::command::TmuxCommand;
use itmux_core::error::ClientError;
use itmux_core::manager::{ClipboardSink, ConnectionManager, Credential};
use itmux_core::profile::{CredentialKey, HostProfile, MemoryBlobStore};
use itmux_core::snapshot::{ConnectionPhase, ConnectionSnapshot};
use itmux_core::transport::{
    AuthMethod, ChannelReader, ChannelWriter, SshChannel, SshSession, SshTransport, TransportError,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Default)]
struct TransportLog {
    execs: Mutex<Vec<String>>,
    writes: Mutex<Vec<Vec<u8>>>,
    disconnected: AtomicBool,
}

struct ScriptedTransport {
    feed: Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
    log: Arc<TransportLog>,
    reject_auth: bool,
}

impl ScriptedTransport {
    fn new(feed: mpsc::UnboundedReceiver<Vec<u8>>, log: Arc<TransportLog>) -> Self {
        Self {
            feed: Mutex::new(Some(feed)),
            log,
            reject_auth: false,
        }
    }

    fn rejecting_auth(log: Arc<TransportLog>) -> Self {
        let (_, feed) = mpsc::unbounded_channel();
        Self {
            feed: Mutex::new(Some(feed)),
            log,
            reject_auth: true,
        }
    }
}

#[async_trait]
impl SshTransport for ScriptedTransport {
    async fn open(
        &self,
        _host: &str,
        _port: u16,
        _username: &str,
    ) -> Result<Box<dyn SshSession>, TransportError> {
        let feed = self
            .feed
            .lock()
            .take()
            .ok_or_else(|| TransportError::Connect("transport already used".to_string()))?;
        Ok(Box::new(ScriptedSession {
            feed: Some(feed),
            log: self.log.clone(),
            reject_auth: self.reject_auth,
        }))
    }
}

struct ScriptedSession {
    feed: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    log: Arc<TransportLog>,
    reject_auth: bool,
}

#[async_trait]
impl SshSession for ScriptedSession {
    async fn authenticate(&mut self, _auth: &AuthMethod) -> Result<(), TransportError> {
        if self.reject_auth {
            Err(TransportError::Auth("permission denied".to_string()))
        } else {
            Ok(())
        }
    }

    async fn open_channel(&mut self) -> Result<Box<dyn SshChannel>, TransportError> {
        let feed = self
            .feed
            .take()
            .ok_or_else(|| TransportError::Handshake("channel already open".to_string()))?;
        Ok(Box::new(ScriptedChannel {
            feed,
            log: self.log.clone(),
        }))
    }

    async fn disconnect(&mut self) {
        self.log.disconnected.store(true, Ordering::SeqCst);
    }
}

struct ScriptedChannel {
    feed: mpsc::UnboundedReceiver<Vec<u8>>,
    log: Arc<TransportLog>,
}

#[async_trait]
impl SshChannel for ScriptedChannel {
    async fn exec(&mut self, command: &str) -> Result<(), TransportError> {
        self.log.execs.lock().push(command.to_string());
        Ok(())
    }

    fn split(self: Box<Self>) -> (Box<dyn ChannelReader>, Box<dyn ChannelWriter>) {
        (
            Box::new(ScriptedReader { feed: self.feed }),
            Box::new(ScriptedWriter { log: self.log }),
        )
    }
}

struct ScriptedReader {
    feed: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl ChannelReader for ScriptedReader {
    async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
        // A closed feed is an orderly EOF
        Ok(self.feed.recv().await.unwrap_or_default())
    }
}

struct ScriptedWriter {
    log: Arc<TransportLog>,
}

#[async_trait]
impl ChannelWriter for ScriptedWriter {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.log.writes.lock().push(data.to_vec());
        Ok(())
    }

    async fn close(&mut self) {}
}

struct Fixture {
    manager: ConnectionManager,
    host_id: Uuid,
    feed: mpsc::UnboundedSender<Vec<u8>>,
    log: Arc<TransportLog>,
}

fn fixture() -> Fixture {
    let (feed_tx, feed_rx) = mpsc::unbounded_channel();
    let log = Arc::new(TransportLog::default());
    let transport = Arc::new(ScriptedTransport::new(feed_rx, log.clone()));
    let manager = ConnectionManager::new(
        transport,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(MemoryBlobStore::new()),
    )
    .unwrap();

    let profile = HostProfile::new("dev box", "dev.example.com", "alice");
    let host_id = profile.id;
    manager.add_host(profile).unwrap();

    Fixture {
        manager,
        host_id,
        feed: feed_tx,
        log,
    }
}

async fn wait_for_state(
    manager: &ConnectionManager,
    host_id: Uuid,
    predicate: impl Fn(&ConnectionSnapshot) -> bool,
) -> ConnectionSnapshot {
    tokio::time::timeout(Duration::from_secs(2), async {
        let mut changes = manager.subscribe();
        loop {
            if let Some(snapshot) = manager.host_connection_state(host_id) {
                if predicate(&snapshot) {
                    return snapshot;
                }
            }
            if changes.changed().await.is_err() {
                panic!("change channel closed");
            }
        }
    })
    .await
    .expect("state not reached in time")
}

async fn connect_and_attach(fixture: &Fixture) {
    fixture
        .manager
        .connect(
            fixture.host_id,
            Credential::Password("pw".to_string()),
            Some("itmux"),
        )
        .await
        .unwrap();
    fixture
        .feed
        .send(b"%session-changed $1 itmux\n".to_vec())
        .unwrap();
    wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Connected
    })
    .await;
}

#[tokio::test]
async fn test_connect_runs_tmux_and_reaches_connected() {
    let fixture = fixture();

    fixture
        .manager
        .connect(
            fixture.host_id,
            Credential::Password("pw".to_string()),
            Some("itmux"),
        )
        .await
        .unwrap();

    assert_eq!(
        fixture.log.execs.lock().as_slice(),
        ["tmux -CC new-session -A -s itmux"]
    );
    let snapshot = fixture
        .manager
        .host_connection_state(fixture.host_id)
        .unwrap();
    assert_eq!(snapshot.phase, ConnectionPhase::StartingTmux);

    fixture
        .feed
        .send(b"%session-changed $1 itmux\n".to_vec())
        .unwrap();
    let snapshot = wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Connected
    })
    .await;
    assert_eq!(snapshot.session_name.as_deref(), Some("itmux"));
    assert!(snapshot.connected_at.is_some());
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn test_unknown_host_rejected() {
    let fixture = fixture();
    let err = fixture
        .manager
        .connect(Uuid::new_v4(), Credential::Password("pw".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::HostUnknown(_)));
}

#[tokio::test]
async fn test_auth_failure_leaves_failed_state() {
    let log = Arc::new(TransportLog::default());
    let manager = ConnectionManager::new(
        Arc::new(ScriptedTransport::rejecting_auth(log)),
        Arc::new(MemoryBlobStore::new()),
        Arc::new(MemoryBlobStore::new()),
    )
    .unwrap();
    let profile = HostProfile::new("dev", "dev.example.com", "alice");
    let host_id = profile.id;
    manager.add_host(profile).unwrap();

    let err = manager
        .connect(host_id, Credential::Password("bad".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));

    let snapshot = manager.host_connection_state(host_id).unwrap();
    assert_eq!(snapshot.phase, ConnectionPhase::Failed);
    assert!(snapshot.last_error.unwrap().contains("authentication"));
}

#[tokio::test]
async fn test_missing_key_credential_rejected() {
    let fixture = fixture();
    let err = fixture
        .manager
        .connect(fixture.host_id, Credential::KeyRef(Uuid::new_v4()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::KeyUnavailable));
}

#[tokio::test]
async fn test_key_credential_resolved_from_secure_store() {
    let fixture = fixture();
    let key = CredentialKey::new("laptop", "SHA256:ab", b"pem".to_vec());
    let key_id = key.id;
    fixture.manager.add_credential(key).unwrap();

    fixture
        .manager
        .connect(fixture.host_id, Credential::KeyRef(key_id), Some("itmux"))
        .await
        .unwrap();
    assert_eq!(fixture.log.execs.lock().len(), 1);
}

#[tokio::test]
async fn test_output_builds_pane_snapshot() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture
        .feed
        .send(b"%output %0 hello\\040world\\012\n".to_vec())
        .unwrap();
    wait_for_state(&fixture.manager, fixture.host_id, |s| s.pane_count == 1).await;

    let panes = fixture.manager.panes(fixture.host_id);
    assert_eq!(panes.len(), 1);
    let pane = &panes[0];
    assert_eq!(pane.id, "%0");
    assert_eq!((pane.rows, pane.cols), (24, 80));

    let row0: String = pane.grid[0].iter().map(|cell| cell.c).collect();
    assert_eq!(row0.trim_end(), "hello world");
    assert_eq!((pane.cursor.row, pane.cursor.col), (1, 0));
}

#[tokio::test]
async fn test_layout_scenario() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture
        .feed
        .send(b"%layout-change @3 c3b2,80x24,0,0,1\n".to_vec())
        .unwrap();
    let snapshot =
        wait_for_state(&fixture.manager, fixture.host_id, |s| s.pane_count == 1).await;
    assert_eq!(snapshot.window_count, 1);

    let panes = fixture.manager.panes(fixture.host_id);
    assert_eq!(panes.len(), 1);
    let pane = &panes[0];
    assert_eq!(pane.id, "1");
    assert_eq!(pane.window_id, "@3");
    assert_eq!((pane.rows, pane.cols), (24, 80));
}

#[tokio::test]
async fn test_remote_exit_scenario() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture
        .feed
        .send(b"%output %0 data\n%exit client-detached\n".to_vec())
        .unwrap();
    let snapshot = wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Closed
    })
    .await;

    assert!(snapshot.last_error.unwrap().contains("client-detached"));
    // Registry discarded: every pane grid freed
    assert_eq!(snapshot.pane_count, 0);
    assert!(fixture.manager.panes(fixture.host_id).is_empty());
    assert!(fixture.log.disconnected.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_eof_while_connected_is_remote_exit() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    drop(fixture.feed);
    let snapshot = wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Closed
    })
    .await;
    assert!(snapshot.last_error.unwrap().contains("remote tmux exited"));
}

#[tokio::test]
async fn test_send_requires_connected() {
    let fixture = fixture();

    let err = fixture
        .manager
        .send(fixture.host_id, b"x".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));

    fixture
        .manager
        .connect(
            fixture.host_id,
            Credential::Password("pw".to_string()),
            None,
        )
        .await
        .unwrap();
    // StartingTmux: still not legal to send
    let err = fixture
        .manager
        .send(fixture.host_id, b"x".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));
}

#[tokio::test]
async fn test_send_command_reaches_transport() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture
        .manager
        .send_command(fixture.host_id, TmuxCommand::ListSessions)
        .await
        .unwrap();
    fixture
        .manager
        .send(fixture.host_id, b"raw keystrokes".to_vec())
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let writes = fixture.log.writes.lock();
                if writes.len() >= 2 {
                    assert_eq!(writes[0], b"list-sessions\n");
                    assert_eq!(writes[1], b"raw keystrokes");
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("writes not observed");
}

#[tokio::test]
async fn test_disconnect_idempotent() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture.manager.disconnect(fixture.host_id).await.unwrap();
    fixture.manager.disconnect(fixture.host_id).await.unwrap();

    let snapshot = fixture
        .manager
        .host_connection_state(fixture.host_id)
        .unwrap();
    assert_eq!(snapshot.phase, ConnectionPhase::Closed);
    assert_eq!(snapshot.pane_count, 0);
    assert!(fixture.log.disconnected.load(Ordering::SeqCst));

    let err = fixture
        .manager
        .send(fixture.host_id, b"late".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));
}

#[tokio::test]
async fn test_overlong_frame_closes_connection() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    // One unterminated line past the 4 MiB framer cap
    fixture
        .feed
        .send(vec![b'x'; 5 * 1024 * 1024])
        .unwrap();
    let snapshot = wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Closed
    })
    .await;
    assert!(snapshot.last_error.unwrap().contains("frame limit"));
}

#[tokio::test]
async fn test_clipboard_payload_forwarded() {
    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<(String, Vec<u8>)>>,
    }
    impl ClipboardSink for RecordingSink {
        fn set_clipboard(&self, pane_id: &str, data: &[u8]) {
            self.entries
                .lock()
                .push((pane_id.to_string(), data.to_vec()));
        }
    }

    let fixture = fixture();
    let sink = Arc::new(RecordingSink::default());
    fixture.manager.set_clipboard_sink(sink.clone());
    connect_and_attach(&fixture).await;

    fixture
        .feed
        .send(b"%pane-set-clipboard %2 aGVsbG8=\n".to_vec())
        .unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let entries = sink.entries.lock();
                if !entries.is_empty() {
                    assert_eq!(entries[0], ("%2".to_string(), b"hello".to_vec()));
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("clipboard payload not forwarded");
}

#[tokio::test]
async fn test_unknown_messages_counted_not_fatal() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture
        .feed
        .send(b"%something-new a b c\n%also-new\n".to_vec())
        .unwrap();
    wait_for_state(&fixture.manager, fixture.host_id, |s| {
        s.phase == ConnectionPhase::Connected
    })
    .await;

    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if fixture.manager.unknown_message_count(fixture.host_id) == 2 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("unknown messages not counted");
}

#[tokio::test]
async fn test_window_lifecycle_updates_counts() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture.feed.send(b"%window-add @1 main\n".to_vec()).unwrap();
    wait_for_state(&fixture.manager, fixture.host_id, |s| s.window_count == 1).await;

    fixture.feed.send(b"%window-close @1\n".to_vec()).unwrap();
    wait_for_state(&fixture.manager, fixture.host_id, |s| s.window_count == 0).await;
}

#[tokio::test]
async fn test_remove_host_disconnects_first() {
    let fixture = fixture();
    connect_and_attach(&fixture).await;

    fixture.manager.remove_host(fixture.host_id).await.unwrap();
    assert!(fixture.manager.list_hosts().is_empty());
    assert!(fixture
        .manager
        .host_connection_state(fixture.host_id)
        .is_none());
    assert!(fixture.log.disconnected.load(Ordering::SeqCst));
}
