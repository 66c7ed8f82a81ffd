// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! # drivehud-vision
//!
//! Client side of the frame channel: subscribes to the primary and secondary
//! camera streams, maps their shared-memory slot rings, and hands slots back
//! to the producer as newer frames arrive.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drivehud_scene::Scene;
//! use drivehud_vision::FrameChannelClient;
//!
//! let mut scene = Scene::default();
//! let mut client = FrameChannelClient::new();
//! client.connect("/tmp/vision_socket".as_ref())?;
//! client.subscribe()?;
//! client.install(&mut scene);
//!
//! let stream = client.service(&mut scene)?;
//! println!("new {} frame in slot {:?}", stream, client.held_slot(stream));
//! # Ok::<(), drivehud_vision::VisionError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod client;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod ring;

pub use client::{FrameChannelClient, LinkState, PACKET_READ_TIMEOUT};
pub use connector::VisionConnector;
pub use error::{VisionError, VisionResult};
pub use protocol::{StreamBufs, VisionPacket, SLOT_COUNT};
pub use ring::{MappedSlot, SlotRing};
