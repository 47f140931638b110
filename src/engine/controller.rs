use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::engine::options::{Options, SharedOptions};
use crate::engine::pattern::{Pattern, SharedColorMask};
use crate::engine::tracker::ErrorTracker;
use crate::engine::transition::{BlendedColorMask, Transition};
use crate::foundation::error::{PixelcastError, PixelcastResult};
use crate::map::pixel::PixelMap;
use crate::map::universes::UniverseIndex;
use crate::params::parameter::UpdateRequest;
use crate::{masks, patterns};

/// Subscriber invoked after each successful frame with the post-composite
/// pixel map.
pub type UpdateCallback = Box<dyn FnMut(&PixelMap) + Send>;

/// Serializable view of the registered patterns and masks, for the HTTP
/// surface.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CatalogSnapshot {
    pub patterns: BTreeMap<String, EntryState>,
    pub color_masks: BTreeMap<String, EntryState>,
    pub active_pattern: String,
    pub active_color_mask: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct EntryState {
    pub label: String,
    pub parameters: serde_json::Value,
}

enum Command {
    UpdatePattern {
        name: String,
        request: UpdateRequest,
        reply: oneshot::Sender<PixelcastResult<()>>,
    },
    SetColorMask {
        name: Option<String>,
        request: Option<UpdateRequest>,
        reply: oneshot::Sender<PixelcastResult<()>>,
    },
    Catalog {
        reply: oneshot::Sender<CatalogSnapshot>,
    },
}

/// Drives frame production at a fixed rate: owns the pixel buffer, the
/// pattern and mask catalogs, the active pattern, and any in-flight
/// cross-fade. Packs each universe's DMX buffer per tick and hands it to the
/// transmitter sinks.
pub struct PixelController {
    pixels: PixelMap,
    index: UniverseIndex,
    patterns: BTreeMap<String, Box<dyn Pattern>>,
    masks: BTreeMap<String, SharedColorMask>,
    current_pattern: String,
    current_mask: Option<String>,
    transition: Option<Transition>,
    options: SharedOptions,
    sinks: HashMap<u16, mpsc::Sender<Vec<u8>>>,
    tracker: Arc<ErrorTracker>,
    on_update: Option<UpdateCallback>,
    fps: u32,
    pattern_tx: mpsc::Sender<String>,
    pattern_rx: mpsc::Receiver<String>,
    mask_tx: mpsc::Sender<Option<String>>,
    mask_rx: mpsc::Receiver<Option<String>>,
    command_tx: mpsc::Sender<Command>,
    command_rx: Option<mpsc::Receiver<Command>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl PixelController {
    pub fn new(
        sinks: HashMap<u16, mpsc::Sender<Vec<u8>>>,
        tracker: Arc<ErrorTracker>,
        fps: u32,
        initial_pattern: &str,
        pixels: PixelMap,
        options: SharedOptions,
    ) -> PixelcastResult<Self> {
        if fps == 0 {
            return Err(PixelcastError::validation("fps must be at least 1"));
        }

        let registered = patterns::register_patterns();
        if !registered.contains_key(initial_pattern) {
            return Err(PixelcastError::unknown_name(format!(
                "initial pattern {initial_pattern}"
            )));
        }

        // Change channels are capacity 1 on purpose: a pending change either
        // gets applied on the next tick or is superseded by a newer intent.
        let (pattern_tx, pattern_rx) = mpsc::channel(1);
        let (mask_tx, mask_rx) = mpsc::channel(1);
        let (command_tx, command_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let index = UniverseIndex::new(&pixels);
        let mut controller = Self {
            pixels,
            index,
            patterns: registered,
            masks: masks::register_color_masks(),
            current_pattern: initial_pattern.to_string(),
            current_mask: Some(masks::DEFAULT_COLOR_MASK.to_string()),
            transition: None,
            options,
            sinks,
            tracker,
            on_update: None,
            fps,
            pattern_tx,
            pattern_rx,
            mask_tx,
            mask_rx,
            command_tx,
            command_rx: Some(command_rx),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        };
        controller.install_mask_on_current();
        Ok(controller)
    }

    /// Register the single frame subscriber. Must be called before `start`.
    pub fn set_update_callback(&mut self, callback: impl FnMut(&PixelMap) + Send + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    /// Begin the tick loop on the runtime and hand back the control surface.
    /// Consuming `self` makes a second `start` unrepresentable.
    pub fn start(self) -> ControllerHandle {
        let pattern_tx = self.pattern_tx.clone();
        let mask_tx = self.mask_tx.clone();
        let command_tx = self.command_tx.clone();
        let shutdown = self.shutdown_tx.clone();

        let mut controller = self;
        let join = tokio::spawn(async move { controller.run().await });

        ControllerHandle {
            pattern_tx,
            mask_tx,
            command_tx,
            shutdown,
            join: Arc::new(tokio::sync::Mutex::new(Some(join))),
        }
    }

    async fn run(&mut self) {
        let Some(mut command_rx) = self.command_rx.take() else {
            return;
        };
        let mut shutdown_rx = self.shutdown_rx.clone();

        let period = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            fps = self.fps,
            pixels = self.pixels.len(),
            pattern = %self.current_pattern,
            "render loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(Instant::now()),
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = shutdown_rx.changed() => break,
            }
        }

        // Answer callers that were already queued before the shutdown signal.
        command_rx.close();
        while let Ok(command) = command_rx.try_recv() {
            self.handle_command(command);
        }
        tracing::info!("render loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::UpdatePattern {
                name,
                request,
                reply,
            } => {
                let _ = reply.send(self.update_pattern(&name, &request));
            }
            Command::SetColorMask {
                name,
                request,
                reply,
            } => {
                let _ = reply.send(self.update_color_mask(name.as_deref(), request.as_ref()));
            }
            Command::Catalog { reply } => {
                let _ = reply.send(self.catalog());
            }
        }
    }

    /// Merge new parameter values into the named pattern. Updating the active
    /// pattern applies in place without opening a transition; any other name
    /// switches to that pattern with its new parameters.
    fn update_pattern(&mut self, name: &str, request: &UpdateRequest) -> PixelcastResult<()> {
        let Some(pattern) = self.patterns.get_mut(name) else {
            return Err(PixelcastError::unknown_name(format!("pattern {name}")));
        };
        pattern.update_parameters(request)?;

        if name == self.current_pattern {
            return Ok(());
        }
        self.request_pattern_change(name)
    }

    fn update_color_mask(
        &mut self,
        name: Option<&str>,
        request: Option<&UpdateRequest>,
    ) -> PixelcastResult<()> {
        let Some(name) = name else {
            return self.request_mask_change(None);
        };
        let Some(mask) = self.masks.get(name) else {
            return Err(PixelcastError::unknown_name(format!("color mask {name}")));
        };
        if let Some(request) = request {
            mask.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .update_parameters(request)?;
        }
        if self.current_mask.as_deref() == Some(name) {
            // Parameter update on the active mask; never a transition.
            return Ok(());
        }
        self.request_mask_change(Some(name.to_string()))
    }

    fn request_pattern_change(&self, name: &str) -> PixelcastResult<()> {
        self.pattern_tx
            .try_send(name.to_string())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    PixelcastError::channel_full("pattern change already pending, try again")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    PixelcastError::send("controller stopped")
                }
            })
    }

    fn request_mask_change(&self, name: Option<String>) -> PixelcastResult<()> {
        self.mask_tx.try_send(name).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                PixelcastError::channel_full("color mask change already pending, try again")
            }
            mpsc::error::TrySendError::Closed(_) => PixelcastError::send("controller stopped"),
        })
    }

    fn catalog(&self) -> CatalogSnapshot {
        let patterns = self
            .patterns
            .iter()
            .map(|(name, pattern)| {
                (
                    name.clone(),
                    EntryState {
                        label: pattern.label().to_string(),
                        parameters: serde_json::to_value(pattern.parameters())
                            .unwrap_or_default(),
                    },
                )
            })
            .collect();
        let color_masks = self
            .masks
            .iter()
            .map(|(name, mask)| {
                let mask = mask.lock().unwrap_or_else(PoisonError::into_inner);
                (
                    name.clone(),
                    EntryState {
                        label: mask.label().to_string(),
                        parameters: serde_json::to_value(mask.parameters()).unwrap_or_default(),
                    },
                )
            })
            .collect();
        CatalogSnapshot {
            patterns,
            color_masks,
            active_pattern: self.current_pattern.clone(),
            active_color_mask: self.current_mask.clone(),
        }
    }

    fn options_snapshot(&self) -> Options {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mask_handle(&self, name: &str) -> Option<SharedColorMask> {
        self.masks.get(name).cloned()
    }

    fn current_mask_handle(&self) -> Option<SharedColorMask> {
        self.current_mask
            .as_deref()
            .and_then(|name| self.mask_handle(name))
    }

    fn install_mask_on_current(&mut self) {
        let mask = self.current_mask_handle();
        if let Some(pattern) = self.patterns.get_mut(&self.current_pattern) {
            pattern.set_color_mask(mask);
        }
    }

    /// One frame. Split from the async loop so tests can drive it with
    /// explicit instants.
    fn tick(&mut self, now: Instant) {
        self.drain_mask_change(now);
        self.drain_pattern_change(now);
        self.render(now);
        self.post_process();
        self.publish();
    }

    fn drain_mask_change(&mut self, now: Instant) {
        let Ok(change) = self.mask_rx.try_recv() else {
            return;
        };
        let Some(name) = change else {
            self.current_mask = None;
            self.install_mask_on_current();
            return;
        };
        if self.current_mask.as_deref() == Some(name.as_str()) {
            return;
        }
        let Some(target) = self.mask_handle(&name) else {
            tracing::warn!(mask = %name, "change requested for unknown color mask, ignoring");
            return;
        };

        let options = self.options_snapshot();
        let source = self.current_mask_handle();
        if options.color_mask_transition_enabled
            && !options.color_mask_transition_duration.is_zero()
            && source.is_some()
        {
            self.transition = Some(Transition {
                source_pattern: self.current_pattern.clone(),
                target_pattern: self.current_pattern.clone(),
                source_mask: source,
                target_mask: Some(target),
                target_mask_name: Some(name),
                started: now,
                duration: options.color_mask_transition_duration,
            });
        } else {
            self.current_mask = Some(name);
            self.install_mask_on_current();
        }
    }

    fn drain_pattern_change(&mut self, now: Instant) {
        let Ok(name) = self.pattern_rx.try_recv() else {
            return;
        };
        // Setting the active pattern to itself is a no-op (unless a fade is
        // in flight, in which case this retargets it).
        if name == self.current_pattern && self.transition.is_none() {
            return;
        }
        if !self.patterns.contains_key(&name) {
            tracing::warn!(pattern = %name, "change requested for unknown pattern, ignoring");
            return;
        }

        let options = self.options_snapshot();
        if options.pattern_transition_enabled && !options.pattern_transition_duration.is_zero() {
            let mask = self.current_mask_handle();
            self.transition = Some(Transition {
                source_pattern: self.current_pattern.clone(),
                target_pattern: name,
                source_mask: mask.clone(),
                target_mask: mask,
                target_mask_name: None,
                started: now,
                duration: options.pattern_transition_duration,
            });
        } else {
            self.transition = None;
            self.current_pattern = name;
            self.install_mask_on_current();
        }
    }

    fn render(&mut self, now: Instant) {
        let Some(fade) = self.transition.take() else {
            self.render_normal();
            return;
        };

        let progress = fade.progress(now);
        if fade.is_mask_fade() {
            self.render_mask_fade(&fade, progress);
        } else {
            self.render_pattern_fade(&fade, progress);
        }

        if progress >= 1.0 {
            self.current_pattern = fade.target_pattern;
            if let Some(name) = fade.target_mask_name {
                self.current_mask = Some(name);
            }
            self.install_mask_on_current();
        } else {
            self.transition = Some(fade);
        }
    }

    fn render_normal(&mut self) {
        if let Some(mask) = self.current_mask_handle() {
            mask.lock().unwrap_or_else(PoisonError::into_inner).update();
        }
        self.install_mask_on_current();
        if let Some(pattern) = self.patterns.get_mut(&self.current_pattern) {
            pattern.update(&mut self.pixels);
        }
    }

    fn render_mask_fade(&mut self, fade: &Transition, progress: f64) {
        let (Some(source), Some(target)) = (fade.source_mask.clone(), fade.target_mask.clone())
        else {
            return;
        };
        source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update();
        target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update();

        let blended: SharedColorMask = Arc::new(StdMutex::new(BlendedColorMask::new(
            source, target, progress,
        )));
        if let Some(pattern) = self.patterns.get_mut(&self.current_pattern) {
            pattern.set_color_mask(Some(blended));
            pattern.update(&mut self.pixels);
        }
    }

    fn render_pattern_fade(&mut self, fade: &Transition, progress: f64) {
        // The target is lifted out of the registry for the duration of the
        // blend so both patterns can be driven in one pass.
        let Some(mut target) = self.patterns.remove(&fade.target_pattern) else {
            return;
        };
        target.set_color_mask(fade.target_mask.clone().or_else(|| self.current_mask_handle()));

        if let Some(source) = self.patterns.get_mut(&fade.source_pattern) {
            target.transition_from(source.as_mut(), progress, &mut self.pixels);
        } else {
            target.update(&mut self.pixels);
        }
        self.patterns.insert(fade.target_pattern.clone(), target);
    }

    fn post_process(&mut self) {
        let options = self.options_snapshot();
        let scale = options.brightness_scale();
        let gamma = options.gamma;
        let identity_gamma = (gamma - 1.0).abs() < f64::EPSILON;

        for pixel in self.pixels.iter_mut() {
            let mut color = pixel.color().scaled(scale);
            if !identity_gamma {
                color = color.gamma(gamma);
            }
            pixel.set_color(color);
        }
    }

    fn publish(&mut self) {
        for (universe, sink) in &self.sinks {
            let data = self.index.pack(*universe, &self.pixels);
            match sink.try_send(data.to_vec()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !self.tracker.track_error() {
                        tracing::warn!(universe, "universe sink full, dropping frame");
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(universe, "universe sink closed");
                }
            }
        }
        if let Some(callback) = self.on_update.as_mut() {
            callback(&self.pixels);
        }
    }
}

/// Cloneable control surface over a running [`PixelController`].
#[derive(Clone)]
pub struct ControllerHandle {
    pattern_tx: mpsc::Sender<String>,
    mask_tx: mpsc::Sender<Option<String>>,
    command_tx: mpsc::Sender<Command>,
    shutdown: Arc<watch::Sender<bool>>,
    join: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl ControllerHandle {
    /// Enqueue a pattern change. Non-blocking; a full change channel reports
    /// [`PixelcastError::ChannelFull`] and the most recent accepted intent
    /// wins.
    pub fn set_pattern(&self, name: &str) -> PixelcastResult<()> {
        self.pattern_tx
            .try_send(name.to_string())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    PixelcastError::channel_full("pattern change already pending, try again")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    PixelcastError::send("controller stopped")
                }
            })
    }

    /// Enqueue a color-mask change (`None` clears the mask). Same semantics
    /// as [`Self::set_pattern`].
    pub fn set_color_mask(&self, name: Option<&str>) -> PixelcastResult<()> {
        self.mask_tx
            .try_send(name.map(str::to_string))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    PixelcastError::channel_full("color mask change already pending, try again")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    PixelcastError::send("controller stopped")
                }
            })
    }

    /// Merge parameter values into the named pattern, switching to it when it
    /// isn't the active one.
    pub async fn update_pattern(
        &self,
        name: &str,
        request: UpdateRequest,
    ) -> PixelcastResult<()> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command::UpdatePattern {
                name: name.to_string(),
                request,
                reply,
            })
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?;
        response
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?
    }

    /// Switch (or parameter-update) the active color mask by name.
    pub async fn update_color_mask(
        &self,
        name: &str,
        request: Option<UpdateRequest>,
    ) -> PixelcastResult<()> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command::SetColorMask {
                name: Some(name.to_string()),
                request,
                reply,
            })
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?;
        response
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?
    }

    /// Clear the active color mask.
    pub async fn clear_color_mask(&self) -> PixelcastResult<()> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command::SetColorMask {
                name: None,
                request: None,
                reply,
            })
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?;
        response
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?
    }

    /// Snapshot the registered patterns and masks.
    pub async fn catalog(&self) -> PixelcastResult<CatalogSnapshot> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command::Catalog { reply })
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))?;
        response
            .await
            .map_err(|_| PixelcastError::send("controller stopped"))
    }

    /// Signal shutdown and wait for the tick loop to drain, bounded.
    pub async fn stop(&self) -> PixelcastResult<()> {
        let _ = self.shutdown.send(true);
        let join = self.join.lock().await.take();
        if let Some(join) = join {
            tokio::time::timeout(Duration::from_secs(5), join)
                .await
                .map_err(|_| PixelcastError::send("render loop did not stop in time"))?
                .map_err(|e| PixelcastError::send(format!("render loop panicked: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/controller.rs"]
mod tests;
