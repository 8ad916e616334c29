//! Connection manager: host lifecycle, transport glue, event routing
//!
//! The manager owns the process-wide host list and at most one connection
//! per host. Each live connection runs one ingest task that exclusively owns
//! the channel reader, the registry and the pane emulators, so all state
//! mutation for a connection is serialized without locking games; a small
//! writer task drains the outbound queue. The presentation layer only
//! submits commands and reads snapshots.

use crate::command::TmuxCommand;
use crate::control::{layout, ControlMessage, ControlParser};
use crate::error::ClientError;
use crate::profile::{
    unix_millis, BlobStore, CredentialKey, CredentialStore, HostProfile, HostProfileStore,
};
use crate::registry::Registry;
use crate::snapshot::{ConnectionPhase, ConnectionSnapshot, CursorPosition, PaneSnapshot};
use crate::transport::{AuthMethod, ChannelReader, ChannelWriter, SshChannel, SshSession, SshTransport};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Outbound queue depth; a full queue makes `send` await (backpressure)
const OUTBOUND_QUEUE: usize = 64;
/// Bound on each handshake step (open, authenticate, channel, exec)
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);
/// How long disconnect waits before aborting the connection tasks
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Credential selector passed to `connect`
#[derive(Clone)]
pub enum Credential {
    Password(String),
    /// Use the stored credential key with this id
    KeyRef(Uuid),
    PrivateKey {
        pem: Vec<u8>,
        passphrase: Option<String>,
    },
}

// Secrets never appear in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password(_) => f.write_str("Credential::Password([REDACTED])"),
            Credential::KeyRef(id) => f.debug_tuple("Credential::KeyRef").field(id).finish(),
            Credential::PrivateKey { .. } => f.write_str("Credential::PrivateKey([REDACTED])"),
        }
    }
}

/// Presentation-side clipboard collaborator; invoked with no core lock held
pub trait ClipboardSink: Send + Sync {
    fn set_clipboard(&self, pane_id: &str, data: &[u8]);
}

/// Mutable state of one connection, behind the shared lock
struct ConnState {
    phase: ConnectionPhase,
    last_error: Option<String>,
    session_name: Option<String>,
    connected_at: Option<u64>,
    registry: Registry,
    unknown_messages: u64,
}

impl ConnState {
    fn new(phase: ConnectionPhase) -> Self {
        Self {
            phase,
            last_error: None,
            session_name: None,
            connected_at: None,
            registry: Registry::new(),
            unknown_messages: 0,
        }
    }
}

struct ConnShared {
    state: Mutex<ConnState>,
}

/// Handles for a live connection's tasks and queues
struct ConnectionIo {
    outbound: mpsc::Sender<Vec<u8>>,
    shutdown: oneshot::Sender<()>,
    ingest: JoinHandle<()>,
    writer: JoinHandle<()>,
}

struct Connection {
    shared: Arc<ConnShared>,
    io: Option<ConnectionIo>,
}

/// Process-wide owner of host profiles and connections
pub struct ConnectionManager {
    transport: Arc<dyn SshTransport>,
    profiles: HostProfileStore,
    credentials: CredentialStore,
    hosts: Mutex<Vec<HostProfile>>,
    connections: Mutex<HashMap<Uuid, Connection>>,
    clipboard: Mutex<Option<Arc<dyn ClipboardSink>>>,
    changes: Arc<watch::Sender<u64>>,
}

impl ConnectionManager {
    /// Build a manager over a transport and the two blob stores
    /// (plain profile store, secure credential store)
    pub fn new(
        transport: Arc<dyn SshTransport>,
        profile_store: Arc<dyn BlobStore>,
        secure_store: Arc<dyn BlobStore>,
    ) -> Result<Self, ClientError> {
        let profiles = HostProfileStore::new(profile_store);
        let hosts = profiles.load()?;
        let (changes, _) = watch::channel(0);
        Ok(Self {
            transport,
            profiles,
            credentials: CredentialStore::new(secure_store),
            hosts: Mutex::new(hosts),
            connections: Mutex::new(HashMap::new()),
            clipboard: Mutex::new(None),
            changes: Arc::new(changes),
        })
    }

    /// Level-triggered change signal: the generation moves after any
    /// registry or pane mutation; consumers re-read snapshots
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Install the clipboard sink used for `%pane-set-clipboard` payloads.
    /// Applies to connections opened after the call.
    pub fn set_clipboard_sink(&self, sink: Arc<dyn ClipboardSink>) {
        *self.clipboard.lock() = Some(sink);
    }

    fn touch(&self) {
        self.changes.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    // === Host profiles ===

    pub fn add_host(&self, profile: HostProfile) -> Result<(), ClientError> {
        let mut hosts = self.hosts.lock();
        hosts.retain(|h| h.id != profile.id);
        hosts.push(profile);
        self.profiles.save(&hosts)?;
        drop(hosts);
        self.touch();
        Ok(())
    }

    pub fn update_host(&self, profile: HostProfile) -> Result<(), ClientError> {
        let mut hosts = self.hosts.lock();
        let slot = hosts
            .iter_mut()
            .find(|h| h.id == profile.id)
            .ok_or(ClientError::HostUnknown(profile.id))?;
        *slot = profile;
        self.profiles.save(&hosts)?;
        drop(hosts);
        self.touch();
        Ok(())
    }

    /// Remove a host, tearing down any live connection first
    pub async fn remove_host(&self, host_id: Uuid) -> Result<(), ClientError> {
        if !self.hosts.lock().iter().any(|h| h.id == host_id) {
            return Err(ClientError::HostUnknown(host_id));
        }
        self.disconnect(host_id).await?;
        self.connections.lock().remove(&host_id);

        let mut hosts = self.hosts.lock();
        hosts.retain(|h| h.id != host_id);
        self.profiles.save(&hosts)?;
        drop(hosts);
        self.touch();
        Ok(())
    }

    pub fn list_hosts(&self) -> Vec<HostProfile> {
        self.hosts.lock().clone()
    }

    // === Credentials ===

    pub fn add_credential(&self, key: CredentialKey) -> Result<(), ClientError> {
        self.credentials.put(key)?;
        Ok(())
    }

    pub fn remove_credential(&self, id: Uuid) -> Result<(), ClientError> {
        self.credentials.remove(id)?;
        Ok(())
    }

    pub fn list_credentials(&self) -> Result<Vec<CredentialKey>, ClientError> {
        Ok(self.credentials.load()?)
    }

    // === Connection lifecycle ===

    /// Open the transport, authenticate, start tmux in control mode and
    /// spawn the ingest task. Returns once the handshake is done; the
    /// Connected phase follows on the first `%session-changed`.
    pub async fn connect(
        &self,
        host_id: Uuid,
        credential: Credential,
        session_name: Option<&str>,
    ) -> Result<(), ClientError> {
        let profile = self
            .hosts
            .lock()
            .iter()
            .find(|h| h.id == host_id)
            .cloned()
            .ok_or(ClientError::HostUnknown(host_id))?;

        // At most one live connection per host
        if let Some(connection) = self.connections.lock().get(&host_id) {
            let phase = connection.shared.state.lock().phase;
            if matches!(
                phase,
                ConnectionPhase::Connecting
                    | ConnectionPhase::Authenticating
                    | ConnectionPhase::StartingTmux
                    | ConnectionPhase::Connected
            ) {
                return Ok(());
            }
        }

        let auth = self.resolve_credential(&credential)?;
        let session_name = session_name
            .map(str::to_string)
            .unwrap_or_else(|| profile.session_name.clone());

        let shared = Arc::new(ConnShared {
            state: Mutex::new(ConnState::new(ConnectionPhase::Connecting)),
        });
        self.connections.lock().insert(
            host_id,
            Connection {
                shared: shared.clone(),
                io: None,
            },
        );
        self.touch();

        match self.establish(&profile, &auth, &session_name, &shared).await {
            Ok((session, channel)) => {
                let (reader, writer) = channel.split();
                let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
                let (shutdown_tx, shutdown_rx) = oneshot::channel();
                let clipboard = self.clipboard.lock().clone();

                let writer_task = tokio::spawn(writer_loop(writer, outbound_rx));
                let ingest_task = tokio::spawn(ingest_loop(
                    reader,
                    session,
                    shared,
                    shutdown_rx,
                    self.changes.clone(),
                    clipboard,
                ));

                if let Some(connection) = self.connections.lock().get_mut(&host_id) {
                    connection.io = Some(ConnectionIo {
                        outbound: outbound_tx,
                        shutdown: shutdown_tx,
                        ingest: ingest_task,
                        writer: writer_task,
                    });
                }

                let mut hosts = self.hosts.lock();
                if let Some(host) = hosts.iter_mut().find(|h| h.id == host_id) {
                    host.last_connected_at = Some(unix_millis());
                    if let Err(err) = self.profiles.save(&hosts) {
                        warn!(%err, "failed to persist last-connected timestamp");
                    }
                }
                drop(hosts);
                self.touch();
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = shared.state.lock();
                    state.phase = ConnectionPhase::Failed;
                    state.last_error = Some(err.to_string());
                }
                self.touch();
                Err(err)
            }
        }
    }

    async fn establish(
        &self,
        profile: &HostProfile,
        auth: &AuthMethod,
        session_name: &str,
        shared: &Arc<ConnShared>,
    ) -> Result<(Box<dyn SshSession>, Box<dyn SshChannel>), ClientError> {
        let mut session = timeout(
            HANDSHAKE_TIMEOUT,
            self.transport
                .open(&profile.hostname, profile.port, &profile.username),
        )
        .await
        .map_err(|_| ClientError::Timeout)?
        .map_err(ClientError::from)?;

        self.set_phase(shared, ConnectionPhase::Authenticating);
        match timeout(HANDSHAKE_TIMEOUT, session.authenticate(auth)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                session.disconnect().await;
                return Err(err.into());
            }
            Err(_) => {
                session.disconnect().await;
                return Err(ClientError::Timeout);
            }
        }

        self.set_phase(shared, ConnectionPhase::StartingTmux);
        let mut channel = match timeout(HANDSHAKE_TIMEOUT, session.open_channel()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(err)) => {
                session.disconnect().await;
                return Err(err.into());
            }
            Err(_) => {
                session.disconnect().await;
                return Err(ClientError::Timeout);
            }
        };

        let command = format!("tmux -CC new-session -A -s {session_name}");
        if let Err(err) = channel.exec(&command).await {
            session.disconnect().await;
            return Err(err.into());
        }

        Ok((session, channel))
    }

    fn set_phase(&self, shared: &Arc<ConnShared>, phase: ConnectionPhase) {
        shared.state.lock().phase = phase;
        self.touch();
    }

    fn resolve_credential(&self, credential: &Credential) -> Result<AuthMethod, ClientError> {
        match credential {
            Credential::Password(password) => Ok(AuthMethod::Password(password.clone())),
            Credential::PrivateKey { pem, passphrase } => Ok(AuthMethod::PrivateKey {
                pem: pem.clone(),
                passphrase: passphrase.clone(),
            }),
            Credential::KeyRef(id) => {
                let key = self
                    .credentials
                    .get(*id)?
                    .ok_or(ClientError::KeyUnavailable)?;
                if key.private_key.is_empty() {
                    return Err(ClientError::KeyUnavailable);
                }
                Ok(AuthMethod::PrivateKey {
                    pem: key.private_key,
                    passphrase: None,
                })
            }
        }
    }

    /// Enqueue raw bytes for the transport; legal only while Connected
    pub async fn send(&self, host_id: Uuid, bytes: Vec<u8>) -> Result<(), ClientError> {
        let outbound = {
            let connections = self.connections.lock();
            let connection = connections.get(&host_id).ok_or(ClientError::NotConnected)?;
            if connection.shared.state.lock().phase != ConnectionPhase::Connected {
                return Err(ClientError::NotConnected);
            }
            connection
                .io
                .as_ref()
                .ok_or(ClientError::NotConnected)?
                .outbound
                .clone()
        };
        outbound
            .send(bytes)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Serialize a typed tmux command onto the wire
    pub async fn send_command(
        &self,
        host_id: Uuid,
        command: TmuxCommand,
    ) -> Result<(), ClientError> {
        let mut line = command.serialize();
        line.push('\n');
        self.send(host_id, line.into_bytes()).await
    }

    /// Tear down the connection for a host. Idempotent: already-closed and
    /// never-connected hosts return Ok with nothing to do.
    pub async fn disconnect(&self, host_id: Uuid) -> Result<(), ClientError> {
        let io = self
            .connections
            .lock()
            .get_mut(&host_id)
            .and_then(|connection| connection.io.take());

        if let Some(ConnectionIo {
            outbound,
            shutdown,
            ingest,
            writer,
        }) = io
        {
            let _ = shutdown.send(());
            // Dropping the queue ends the writer loop
            drop(outbound);

            let mut ingest = ingest;
            if timeout(SHUTDOWN_GRACE, &mut ingest).await.is_err() {
                ingest.abort();
                let _ = ingest.await;
            }
            let mut writer = writer;
            if timeout(SHUTDOWN_GRACE, &mut writer).await.is_err() {
                writer.abort();
                let _ = writer.await;
            }
        }

        if let Some(connection) = self.connections.lock().get(&host_id) {
            let mut state = connection.shared.state.lock();
            state.phase = ConnectionPhase::Closed;
            state.registry = Registry::new();
        }
        self.touch();
        Ok(())
    }

    // === Snapshots ===

    /// Connection record snapshot for a host; Idle when the host exists but
    /// has never connected, None when the host is unknown
    pub fn host_connection_state(&self, host_id: Uuid) -> Option<ConnectionSnapshot> {
        let connections = self.connections.lock();
        if let Some(connection) = connections.get(&host_id) {
            let state = connection.shared.state.lock();
            return Some(ConnectionSnapshot {
                phase: state.phase,
                last_error: state.last_error.clone(),
                session_name: state.session_name.clone(),
                window_count: state.registry.window_count(),
                pane_count: state.registry.pane_count(),
                connected_at: state.connected_at,
            });
        }
        drop(connections);

        self.hosts
            .lock()
            .iter()
            .any(|h| h.id == host_id)
            .then(|| ConnectionSnapshot {
                phase: ConnectionPhase::Idle,
                last_error: None,
                session_name: None,
                window_count: 0,
                pane_count: 0,
                connected_at: None,
            })
    }

    /// Copy-on-read snapshots of every pane for a host, ordered by window
    /// then pane id
    pub fn panes(&self, host_id: Uuid) -> Vec<PaneSnapshot> {
        let connections = self.connections.lock();
        let Some(connection) = connections.get(&host_id) else {
            return Vec::new();
        };
        let state = connection.shared.state.lock();

        let mut snapshots: Vec<PaneSnapshot> = state
            .registry
            .panes_iter()
            .map(|pane| {
                let cursor = pane.screen.cursor();
                PaneSnapshot {
                    id: pane.id.clone(),
                    window_id: pane.window_id.clone(),
                    rows: pane.rows(),
                    cols: pane.cols(),
                    is_active: pane.active,
                    working_directory: pane.working_directory().map(str::to_string),
                    title: pane.title().to_string(),
                    grid: pane.screen.visible_rows(),
                    cursor: CursorPosition {
                        row: cursor.row,
                        col: cursor.col,
                    },
                }
            })
            .collect();
        snapshots.sort_by(|a, b| (&a.window_id, &a.id).cmp(&(&b.window_id, &b.id)));
        snapshots
    }

    /// Count of unrecognized control messages seen on a connection
    pub fn unknown_message_count(&self, host_id: Uuid) -> u64 {
        self.connections
            .lock()
            .get(&host_id)
            .map(|c| c.shared.state.lock().unknown_messages)
            .unwrap_or(0)
    }
}

/// Drain the outbound queue into the channel writer
async fn writer_loop(mut writer: Box<dyn ChannelWriter>, mut outbound: mpsc::Receiver<Vec<u8>>) {
    while let Some(bytes) = outbound.recv().await {
        if let Err(err) = writer.write(&bytes).await {
            warn!(%err, "outbound write failed");
            break;
        }
    }
    writer.close().await;
}

/// One ingest task per connection: reads the channel, parses control-mode
/// frames, and applies every message to the registry in arrival order.
async fn ingest_loop(
    mut reader: Box<dyn ChannelReader>,
    mut session: Box<dyn SshSession>,
    shared: Arc<ConnShared>,
    mut shutdown: oneshot::Receiver<()>,
    changes: Arc<watch::Sender<u64>>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
) {
    let mut parser = ControlParser::new();

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            result = reader.read() => match result {
                Ok(bytes) if bytes.is_empty() => {
                    // Orderly EOF; while Connected this is a remote exit
                    let mut state = shared.state.lock();
                    if state.phase == ConnectionPhase::Connected {
                        state.last_error = Some(
                            ClientError::RemoteExit("transport closed".to_string()).to_string(),
                        );
                    }
                    break;
                }
                Ok(bytes) => match parser.parse(&bytes) {
                    Ok(messages) => {
                        let exit = dispatch_batch(&shared, messages, clipboard.as_ref());
                        changes.send_modify(|generation| {
                            *generation = generation.wrapping_add(1);
                        });
                        if exit {
                            break;
                        }
                    }
                    Err(err) => {
                        shared.state.lock().last_error = Some(err.to_string());
                        break;
                    }
                },
                Err(err) => {
                    let mut state = shared.state.lock();
                    if state.phase == ConnectionPhase::Connected {
                        state.last_error = Some(ClientError::from(err).to_string());
                    }
                    break;
                }
            }
        }
    }

    session.disconnect().await;
    {
        let mut state = shared.state.lock();
        state.phase = ConnectionPhase::Closed;
        // Dropping the registry frees every pane grid
        state.registry = Registry::new();
    }
    changes.send_modify(|generation| *generation = generation.wrapping_add(1));
}

/// Apply one batch of parsed messages. Mutations run under the state lock
/// with no await points, so a message is applied atomically or not at all.
/// Returns true when the batch ends the connection.
fn dispatch_batch(
    shared: &ConnShared,
    messages: Vec<ControlMessage>,
    clipboard: Option<&Arc<dyn ClipboardSink>>,
) -> bool {
    let mut clipboard_updates: Vec<(String, Vec<u8>)> = Vec::new();
    let mut exit = false;

    {
        let mut state = shared.state.lock();
        for message in messages {
            match message {
                ControlMessage::Output { pane_id, payload } => {
                    state.registry.ensure_pane(&pane_id).screen.process(&payload);
                }
                ControlMessage::LayoutChange { window_id, layout } => {
                    let boxes = layout::parse_layout(&layout);
                    state.registry.apply_layout(&window_id, &layout, &boxes);
                }
                ControlMessage::WindowAdd { window_id, name } => {
                    state.registry.add_window(&window_id, name.as_deref());
                }
                ControlMessage::WindowClose { window_id } => {
                    state.registry.close_window(&window_id);
                }
                ControlMessage::WindowRenamed { window_id, name } => {
                    state.registry.rename_window(&window_id, &name);
                }
                ControlMessage::SessionChanged { session_id, name } => {
                    state.registry.set_session(&session_id, &name);
                    state.session_name = Some(name);
                    if matches!(
                        state.phase,
                        ConnectionPhase::Connecting
                            | ConnectionPhase::Authenticating
                            | ConnectionPhase::StartingTmux
                    ) {
                        state.phase = ConnectionPhase::Connected;
                        if state.connected_at.is_none() {
                            state.connected_at = Some(unix_millis());
                        }
                    }
                }
                ControlMessage::SessionClosed { session_id } => {
                    state.registry.close_session(&session_id);
                }
                ControlMessage::PaneMode { pane_id, mode } => {
                    debug!(pane = %pane_id, ?mode, "pane mode changed");
                }
                ControlMessage::PaneFocusIn { pane_id } => {
                    state.registry.focus_pane(&pane_id, true);
                }
                ControlMessage::PaneFocusOut { pane_id } => {
                    state.registry.focus_pane(&pane_id, false);
                }
                ControlMessage::PaneSetClipboard { pane_id, payload } => {
                    if let Some(data) = payload {
                        clipboard_updates.push((pane_id, data));
                    }
                }
                ControlMessage::Exit { reason } => {
                    let reason = if reason.is_empty() {
                        "server exit".to_string()
                    } else {
                        reason
                    };
                    state.last_error = Some(ClientError::RemoteExit(reason).to_string());
                    exit = true;
                }
                ControlMessage::Features { raw } => {
                    debug!(%raw, "server features");
                }
                ControlMessage::Subscriptions { raw } => {
                    debug!(%raw, "subscription update");
                }
                ControlMessage::Unknown { raw } => {
                    state.unknown_messages += 1;
                    trace!(%raw, "unknown control message");
                }
            }
            if exit {
                break;
            }
        }
    }

    // Clipboard callbacks target the presentation side; never under the lock
    if let Some(sink) = clipboard {
        for (pane_id, data) in clipboard_updates {
            sink.set_clipboard(&pane_id, &data);
        }
    }

    exit
}
