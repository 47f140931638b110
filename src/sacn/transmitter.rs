use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::engine::tracker::ErrorTracker;
use crate::foundation::error::{PixelcastError, PixelcastResult};
use crate::map::universes::UNIVERSE_CHANNELS;
use crate::sacn::packet::{DEFAULT_PRIORITY, SACN_PORT, STREAM_TERMINATED, build_packet};

/// Per-universe sink buffer depth.
const SINK_CAPACITY: usize = 64;

/// Bounded wait for worker tasks on close.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct TransmitterConfig {
    /// 16-byte component identifier carried in every packet.
    pub cid: [u8; 16],
    /// Source name, null-padded to 64 bytes on the wire.
    pub source_name: String,
    pub priority: u8,
    /// Idle universes are re-sent after this interval.
    pub keepalive_interval: Duration,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            cid: rand::random(),
            source_name: "pixelcast".to_string(),
            priority: DEFAULT_PRIORITY,
            keepalive_interval: Duration::from_secs(1),
        }
    }
}

struct UniverseState {
    sequence: u8,
    destinations: Vec<SocketAddr>,
    priority: u8,
    data: Vec<u8>,
    last_sent: Instant,
}

struct Shared {
    socket: UdpSocket,
    universes: Mutex<HashMap<u16, UniverseState>>,
    cid: [u8; 16],
    source_name: String,
    tracker: Arc<ErrorTracker>,
}

impl Shared {
    fn lock_universes(&self) -> std::sync::MutexGuard<'_, HashMap<u16, UniverseState>> {
        self.universes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `data` as the universe's current frame, advance the sequence and
    /// send to every destination. Sequence numbers within a universe are
    /// strictly monotonic modulo 256 across data and keepalive frames alike.
    async fn submit(&self, universe: u16, data: Vec<u8>, options: u8) {
        if data.is_empty() || data.len() > UNIVERSE_CHANNELS {
            tracing::warn!(universe, len = data.len(), "invalid dmx data length");
            return;
        }

        let prepared = {
            let mut universes = self.lock_universes();
            let Some(state) = universes.get_mut(&universe) else {
                return;
            };
            state.data = data;
            state.sequence = state.sequence.wrapping_add(1);
            state.last_sent = Instant::now();
            let packet = build_packet(
                &self.cid,
                &self.source_name,
                state.priority,
                state.sequence,
                options,
                universe,
                &state.data,
            );
            (packet, state.destinations.clone())
        };

        self.send_packet(universe, &prepared.0, &prepared.1).await;
    }

    async fn send_packet(&self, universe: u16, packet: &[u8], destinations: &[SocketAddr]) {
        for destination in destinations {
            if let Err(e) = self.socket.send_to(packet, destination).await {
                if !self.tracker.track_error() {
                    tracing::warn!(universe, %destination, error = %e, "udp send failed");
                }
            }
        }
    }

    /// Re-send the last frame of every universe idle for at least
    /// `interval`, advancing sequences.
    async fn resend_idle(&self, interval: Duration) {
        let now = Instant::now();
        let due: Vec<(u16, Vec<u8>, Vec<SocketAddr>)> = {
            let mut universes = self.lock_universes();
            universes
                .iter_mut()
                .filter(|(_, state)| {
                    !state.data.is_empty()
                        && now.duration_since(state.last_sent) >= interval
                })
                .map(|(&universe, state)| {
                    state.sequence = state.sequence.wrapping_add(1);
                    state.last_sent = now;
                    let packet = build_packet(
                        &self.cid,
                        &self.source_name,
                        state.priority,
                        state.sequence,
                        0,
                        universe,
                        &state.data,
                    );
                    (universe, packet, state.destinations.clone())
                })
                .collect()
        };

        for (universe, packet, destinations) in due {
            self.send_packet(universe, &packet, &destinations).await;
        }
    }
}

/// E1.31 transmitter: one UDP socket, a worker task per activated universe
/// and a keepalive task that keeps receivers seeing periodic traffic.
pub struct Transmitter {
    shared: Arc<Shared>,
    keepalive_interval: Duration,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Transmitter {
    pub async fn new(
        config: TransmitterConfig,
        tracker: Arc<ErrorTracker>,
    ) -> PixelcastResult<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .await
            .map_err(|e| PixelcastError::startup(format!("failed to bind udp socket: {e}")))?;

        let shared = Arc::new(Shared {
            socket,
            universes: Mutex::new(HashMap::new()),
            cid: config.cid,
            source_name: config.source_name,
            tracker,
        });
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let keepalive_shared = shared.clone();
        let interval = config.keepalive_interval;
        let keepalive = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => keepalive_shared.resend_idle(interval).await,
                    _ = shutdown_rx.changed() => return,
                }
            }
        });

        Ok(Self {
            shared,
            keepalive_interval: config.keepalive_interval,
            shutdown,
            tasks: Mutex::new(vec![keepalive]),
        })
    }

    /// Allocate per-universe state and return the sink the render loop feeds
    /// DMX buffers into.
    pub fn activate(&self, universe: u16) -> PixelcastResult<mpsc::Sender<Vec<u8>>> {
        {
            let mut universes = self.shared.lock_universes();
            if universes.contains_key(&universe) {
                return Err(PixelcastError::validation(format!(
                    "universe {universe} already activated"
                )));
            }
            universes.insert(
                universe,
                UniverseState {
                    sequence: 0,
                    destinations: Vec::new(),
                    priority: DEFAULT_PRIORITY,
                    data: Vec::new(),
                    last_sent: Instant::now(),
                },
            );
        }

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(SINK_CAPACITY);
        let shared = self.shared.clone();
        let mut shutdown_rx = self.shutdown.subscribe();
        let worker = tokio::spawn(async move {
            loop {
                tokio::select! {
                    data = rx.recv() => match data {
                        Some(data) => shared.submit(universe, data, 0).await,
                        None => return,
                    },
                    _ = shutdown_rx.changed() => break,
                }
            }
            // Drain frames that were queued before the shutdown signal.
            while let Ok(data) = rx.try_recv() {
                shared.submit(universe, data, 0).await;
            }
        });

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(worker);
        Ok(tx)
    }

    /// Point a universe at `addr:5568`, or at an explicit `host:port`.
    pub async fn set_destination(
        &self,
        universe: u16,
        addr: &str,
        priority: u8,
    ) -> PixelcastResult<()> {
        let target = if addr.contains(':') {
            addr.to_string()
        } else {
            format!("{addr}:{SACN_PORT}")
        };
        let resolved = tokio::net::lookup_host(&target)
            .await
            .map_err(|e| PixelcastError::validation(format!("invalid address {addr}: {e}")))?
            .next()
            .ok_or_else(|| {
                PixelcastError::validation(format!("address {addr} resolved to nothing"))
            })?;

        let mut universes = self.shared.lock_universes();
        let Some(state) = universes.get_mut(&universe) else {
            return Err(PixelcastError::validation(format!(
                "universe {universe} not activated"
            )));
        };
        state.destinations = vec![resolved];
        state.priority = priority;
        Ok(())
    }

    /// The configured keepalive interval.
    pub fn keepalive_interval(&self) -> Duration {
        self.keepalive_interval
    }

    /// Announce stream termination, signal shutdown and wait for workers to
    /// drain, bounded.
    pub async fn close(self) -> PixelcastResult<()> {
        // Final packets carry the stream-terminated option so receivers
        // release the source promptly.
        let terminating: Vec<(u16, Vec<u8>)> = {
            let universes = self.shared.lock_universes();
            universes
                .iter()
                .filter(|(_, state)| !state.data.is_empty())
                .map(|(&universe, state)| (universe, state.data.clone()))
                .collect()
        };
        for (universe, data) in terminating {
            self.shared
                .submit(universe, data, STREAM_TERMINATED)
                .await;
        }

        let _ = self.shutdown.send(true);
        let tasks: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for task in tasks {
            if tokio::time::timeout(CLOSE_TIMEOUT, task).await.is_err() {
                return Err(PixelcastError::send(
                    "transmitter worker did not stop in time",
                ));
            }
        }
        Ok(())
    }
}
