//! WebSocket transport: accept loop, per-connection threads, message
//! dispatch, and fan-out broadcast.
//!
//! One OS thread per connection cooperates over a single shared
//! pipeline. The pipeline mutex is held for the classify-then-stabilize
//! step of one frame only; broadcasting happens after it is released,
//! so a slow subscriber cannot stall frame processing.

mod registry;

pub use registry::{ClientRegistry, ClientSink};

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use tungstenite::{Message, WebSocket};

use crate::gesture::DetectionPipeline;
use crate::protocol::{ClientMessage, ServerMessage};

const ACCEPT_POLL_MS: u64 = 50;
const READ_POLL_MS: u64 = 50;
const HANDSHAKE_TIMEOUT_SECS: u64 = 2;
const FRAME_LOG_INTERVAL: u64 = 30;

/// Production client handle: a WebSocket shared between its reader
/// thread and broadcasting threads.
///
/// The underlying stream carries a short read timeout, so the reader
/// releases the socket lock between polls and broadcast writes can
/// interleave.
pub struct WsClient {
    socket: Mutex<WebSocket<TcpStream>>,
}

enum Inbound {
    Message(String),
    Idle,
    Closed,
}

impl WsClient {
    fn new(socket: WebSocket<TcpStream>) -> Self {
        Self {
            socket: Mutex::new(socket),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, WebSocket<TcpStream>>> {
        self.socket
            .lock()
            .map_err(|_| anyhow!("client socket lock poisoned"))
    }

    fn poll_read(&self) -> Result<Inbound> {
        let mut socket = self.lock()?;
        match socket.read() {
            Ok(Message::Text(text)) => Ok(Inbound::Message(text)),
            Ok(Message::Close(_)) => Ok(Inbound::Closed),
            // Binary frames and control frames carry nothing for us.
            Ok(_) => Ok(Inbound::Idle),
            Err(tungstenite::Error::Io(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                Ok(Inbound::Idle)
            }
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(Inbound::Closed)
            }
            Err(e) => Err(anyhow!("websocket read failed: {}", e)),
        }
    }
}

impl ClientSink for WsClient {
    fn send_text(&self, payload: &str) -> Result<()> {
        let mut socket = self.lock()?;
        socket
            .send(Message::Text(payload.to_string()))
            .map_err(|e| anyhow!("websocket send failed: {}", e))
    }
}

/// The gesture detection/broadcast server.
pub struct GestureServer {
    listen_addr: String,
    pipeline: Arc<Mutex<DetectionPipeline>>,
    registry: Arc<ClientRegistry<WsClient>>,
}

/// Handle to a running server.
#[derive(Debug)]
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn stop(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            join.join()
                .map_err(|_| anyhow!("server accept thread panicked"))?;
        }
        Ok(())
    }
}

impl GestureServer {
    pub fn new(listen_addr: impl Into<String>, pipeline: DetectionPipeline) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            pipeline: Arc::new(Mutex::new(pipeline)),
            registry: Arc::new(ClientRegistry::new()),
        }
    }

    /// Bind the listener and start the accept loop on its own thread.
    ///
    /// Bind failure is the one fatal error here; it propagates to the
    /// caller (and from there to the orchestrator).
    pub fn spawn(self) -> Result<ServerHandle> {
        let listener = TcpListener::bind(&self.listen_addr)?;
        let addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_thread = shutdown.clone();
        let pipeline = self.pipeline;
        let registry = self.registry;
        let join = std::thread::spawn(move || {
            if let Err(err) = accept_loop(listener, pipeline, registry, shutdown_thread) {
                log::error!("gesture server stopped: {}", err);
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown,
            join: Some(join),
        })
    }
}

fn accept_loop(
    listener: TcpListener,
    pipeline: Arc<Mutex<DetectionPipeline>>,
    registry: Arc<ClientRegistry<WsClient>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, peer)) => {
                let pipeline = pipeline.clone();
                let registry = registry.clone();
                let shutdown = shutdown.clone();
                std::thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, peer, pipeline, registry, shutdown)
                    {
                        log::warn!("connection from {} failed: {}", peer, err);
                    }
                });
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    pipeline: Arc<Mutex<DetectionPipeline>>,
    registry: Arc<ClientRegistry<WsClient>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode;
    // the handshake needs blocking reads.
    stream.set_nonblocking(false)?;
    // Bound the handshake: a client that connects and sends nothing
    // must not pin this thread.
    stream.set_read_timeout(Some(Duration::from_secs(HANDSHAKE_TIMEOUT_SECS)))?;
    let websocket =
        tungstenite::accept(stream).map_err(|e| anyhow!("websocket handshake failed: {}", e))?;
    websocket
        .get_ref()
        .set_read_timeout(Some(Duration::from_millis(READ_POLL_MS)))?;

    let client = Arc::new(WsClient::new(websocket));
    let id = registry.register(client.clone())?;
    log::info!("client {} connected from {} ({} connected)", id, peer, registry.len());

    let result = serve_client(id, &client, &pipeline, &registry, &shutdown);

    registry.unregister(id)?;
    log::info!("client {} disconnected ({} connected)", id, registry.len());
    result
}

fn serve_client(
    id: u64,
    client: &Arc<WsClient>,
    pipeline: &Arc<Mutex<DetectionPipeline>>,
    registry: &Arc<ClientRegistry<WsClient>>,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let mut frame_count: u64 = 0;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        match client.poll_read()? {
            Inbound::Idle => continue,
            Inbound::Closed => return Ok(()),
            Inbound::Message(text) => {
                dispatch(id, &text, &mut frame_count, client, pipeline, registry)?
            }
        }
    }
}

fn dispatch(
    id: u64,
    text: &str,
    frame_count: &mut u64,
    client: &Arc<WsClient>,
    pipeline: &Arc<Mutex<DetectionPipeline>>,
    registry: &Arc<ClientRegistry<WsClient>>,
) -> Result<()> {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            // Malformed or unknown message: log, ignore, keep the
            // connection open.
            log::warn!("client {}: ignoring malformed message: {}", id, e);
            return Ok(());
        }
    };

    match message {
        ClientMessage::VideoFrame { frame } => {
            *frame_count += 1;
            let result = {
                let mut pipeline = pipeline
                    .lock()
                    .map_err(|_| anyhow!("pipeline lock poisoned"))?;
                pipeline.process_frame(&frame)
            };
            if *frame_count % FRAME_LOG_INTERVAL == 0 {
                log::debug!("client {} frame {}: {}", id, frame_count, result.debug_info);
            }
            let payload = ServerMessage::GestureDetection { data: result }.to_json()?;
            registry.broadcast(&payload)?;
        }
        ClientMessage::UpdateSettings { stability_frames } => {
            if stability_frames == 0 {
                log::warn!("client {}: ignoring stability_frames=0", id);
                return Ok(());
            }
            let mut pipeline = pipeline
                .lock()
                .map_err(|_| anyhow!("pipeline lock poisoned"))?;
            pipeline.set_required_fist_frames(stability_frames);
        }
        ClientMessage::TestMessage { message } => {
            log::info!("client {}: test message: {}", id, message);
            let payload = ServerMessage::TestResponse {
                message,
                timestamp: now_unix_seconds()?,
            }
            .to_json()?;
            if let Err(e) = client.send_text(&payload) {
                // The reader loop will observe the closed socket next.
                log::warn!("client {}: test response failed: {}", id, e);
            }
        }
    }
    Ok(())
}

fn now_unix_seconds() -> Result<f64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64())
}
