use std::env;

use crate::foundation::error::{PixelcastError, PixelcastResult};

pub const MAX_FRAMES_PER_SECOND: u32 = 120;
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 20;

/// Process configuration from the environment. Missing required variables
/// are startup-fatal.
#[derive(Clone, Debug)]
pub struct Config {
    pub host_address: String,
    pub host_port: u16,
    /// sACN destination host.
    pub controller_address: String,
    pub target_fps: u32,
}

impl Config {
    pub fn from_env() -> PixelcastResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PixelcastResult<Self> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| {
                PixelcastError::startup(format!(
                    "required environment variable {name} is not set"
                ))
            })
        };

        let host_address = required("HOST_ADDRESS")?;
        let host_port = required("HOST_PORT")?
            .parse::<u16>()
            .map_err(|_| PixelcastError::startup("HOST_PORT must be a port number"))?;
        let controller_address = required("CONTROLLER_ADDRESS")?;

        let target_fps = match lookup("TARGET_FRAMES_PER_SECOND") {
            None => DEFAULT_FRAMES_PER_SECOND,
            Some(raw) => {
                let fps = raw.parse::<u32>().map_err(|_| {
                    PixelcastError::startup("TARGET_FRAMES_PER_SECOND must be a positive integer")
                })?;
                if fps == 0 || fps > MAX_FRAMES_PER_SECOND {
                    return Err(PixelcastError::startup(format!(
                        "TARGET_FRAMES_PER_SECOND must be between 1 and {MAX_FRAMES_PER_SECOND}, got {fps}"
                    )));
                }
                fps
            }
        };

        Ok(Self {
            host_address,
            host_port,
            controller_address,
            target_fps,
        })
    }
}
