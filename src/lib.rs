//! # drivehud
//!
//! Telemetry and camera-frame distribution core of an in-vehicle dashboard.
//! A fixed tick drains six typed telemetry channels, a one-byte control
//! channel and the frame channel into one shared scene, derives the display
//! status, wake state and backlight level from it, and hands it to a renderer.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! drivehud = "0.3"  # Default: includes the runtime
//! ```
//!
//! ## Feature Flags
//!
//! - **`runtime`** (default): thread topology, tick loop and the `drivehud` binary
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivehud::prelude::*;
//!
//! let config = drivehud::config::DrivehudConfig::default();
//! let runtime = Runtime::new(config.clone());
//! let channels = runtime.connect_channels(&zmq::Context::new())?;
//! runtime.run(channels, Collaborators::headless(&config))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! | Re-export | Crate |
//! |-----------|-------|
//! | [`config`] | `drivehud-config` |
//! | [`observability`] | `drivehud-observability` |
//! | [`transports`] | `drivehud-transports` |
//! | [`scene`] | `drivehud-scene` |
//! | [`vision`] | `drivehud-vision` |
//! | [`bus`] | `drivehud-bus` |
//! | [`runtime`] | `drivehud-runtime` |

pub use drivehud_bus as bus;
pub use drivehud_config as config;
pub use drivehud_observability as observability;
pub use drivehud_scene as scene;
pub use drivehud_transports as transports;
pub use drivehud_vision as vision;

#[cfg(feature = "runtime")]
pub use drivehud_runtime as runtime;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::bus::{Channel, ChannelSet, DrainReport, Envelope, Event, EventDispatcher};
    pub use crate::scene::{
        Backlight, DisplayPower, IdleSurface, LightSensor, Renderer, Scene, SceneStore, Status,
        StreamKind, TouchInput,
    };
    pub use crate::vision::{FrameChannelClient, VisionConnector};

    #[cfg(feature = "runtime")]
    pub use crate::runtime::{Collaborators, Runtime};
}
