//! pixelcast is a real-time LED pixel rendering engine.
//!
//! It maps a spatial arrangement of addressable pixels onto DMX512 universes,
//! continuously evaluates the active pattern (optionally colorized by a
//! pluggable color mask), scales by a global brightness, packs the result
//! into the E1.31 (sACN) wire format and streams it over UDP to a lighting
//! controller at a fixed frame rate. A WebSocket surface feeds the same pixel
//! state to a visualizer.
//!
//! # Pipeline overview
//!
//! 1. **Tick**: the [`PixelController`] drains pending pattern/mask changes,
//!    then runs the active pattern (or an in-flight cross-fade) over the
//!    shared [`PixelMap`].
//! 2. **Post-process**: brightness and gamma are applied to the buffer, so
//!    the visualizer shows the exact bytes sent.
//! 3. **Pack**: each universe's 512-byte DMX buffer is assembled with
//!    per-pixel channel ordering.
//! 4. **Transmit**: the [`Transmitter`] frames buffers as E1.31, keeps
//!    per-universe sequence numbers and emits keepalive traffic.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Never block the render task**: sinks and subscribers are bounded;
//!   a slow consumer loses frames, not the show.
//! - **No error is fatal past startup**: send failures are counted and
//!   throttled, bad requests bounce off the HTTP layer.
#![forbid(unsafe_code)]

mod engine;
mod foundation;
mod map;
mod params;
mod sacn;

/// Color-mask catalog.
pub mod masks;
/// Pattern catalog.
pub mod patterns;
/// HTTP/WebSocket surface and environment configuration.
pub mod server;

pub use engine::controller::{
    CatalogSnapshot, ControllerHandle, EntryState, PixelController, UpdateCallback,
};
pub use engine::options::{Options, SharedOptions, shared as shared_options};
pub use engine::pattern::{
    ColorMask, MaskCore, Pattern, PatternCore, Phase, SharedColorMask, shared_mask,
};
pub use engine::tracker::ErrorTracker;
pub use engine::transition::{BlendedColorMask, Transition, crossfade};
pub use foundation::color::Color;
pub use foundation::error::{PixelcastError, PixelcastResult};
pub use map::pixel::{ColorOrder, Pixel, PixelMap, PixelType, Point};
pub use map::universes::{UNIVERSE_CHANNELS, UniverseIndex};
pub use params::parameter::{Parameter, Parameters, UpdateRequest};
pub use sacn::packet::{
    ACN_PACKET_IDENTIFIER, DEFAULT_PRIORITY, HEADER_LENGTH, MAX_PACKET_SIZE, SACN_PORT,
    STREAM_TERMINATED, build_packet, flags_and_length,
};
pub use sacn::transmitter::{Transmitter, TransmitterConfig};
pub use server::config::{Config, DEFAULT_FRAMES_PER_SECOND, MAX_FRAMES_PER_SECOND};
pub use server::http::{AppState, FrameSender, frame_channel, router};
