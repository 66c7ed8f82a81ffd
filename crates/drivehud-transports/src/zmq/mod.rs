// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! ZMQ transport implementations
//!
//! The dashboard only consumes broadcasts, so the client side of
//! publish-subscribe is all that lives here:
//! - **Publish-Subscribe**: PUB (producer processes) → SUB (this crate)
//!
//! ## Example
//!
//! ```no_run
//! use drivehud_transports::zmq::ZmqSub;
//! use drivehud_transports::traits::{Subscriber, Transport};
//!
//! let mut sub = ZmqSub::with_address("tcp://127.0.0.1:8007")?;
//! sub.start()?;
//!
//! if let Some((_topic, data)) = sub.try_receive()? {
//!     println!("Received {} bytes", data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod sub;

pub use sub::ZmqSub;
