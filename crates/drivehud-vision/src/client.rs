// Copyright 2025 drivehud developers
// SPDX-License-Identifier: Apache-2.0

//! Frame Channel Client
//!
//! Owns the IPC stream and both slot rings. Lifecycle:
//! `Disconnected → Connecting → Subscribed → Streaming`, and back to
//! `Disconnected` on any transport fault or protocol violation.

use std::os::unix::io::RawFd;
use std::path::Path;
use std::time::Duration;

use drivehud_scene::{FrameGeometry, Scene, StreamKind};
use drivehud_transports::IpcStream;
use tracing::{debug, info, warn};

use crate::error::{VisionError, VisionResult};
use crate::protocol::{VisionPacket, SLOT_COUNT};
use crate::ring::SlotRing;

/// Longest wait for the rest of a packet once the fd polled readable
pub const PACKET_READ_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Subscribed,
    Streaming,
}

pub struct FrameChannelClient {
    state: LinkState,
    stream: Option<IpcStream>,
    primary: Option<SlotRing>,
    secondary: Option<SlotRing>,
}

impl Default for FrameChannelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameChannelClient {
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            stream: None,
            primary: None,
            secondary: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Open the producer socket; on failure the client stays disconnected
    pub fn connect(&mut self, path: &Path) -> VisionResult<()> {
        let stream = IpcStream::connect(path)?;
        self.attach(stream);
        Ok(())
    }

    /// Use an already connected stream
    pub fn attach(&mut self, stream: IpcStream) {
        self.stream = Some(stream);
        self.primary = None;
        self.secondary = None;
        self.state = LinkState::Connecting;
    }

    /// Request both streams and map their rings
    ///
    /// Replies must arrive in request order. Any failure closes the stream
    /// and leaves the client disconnected.
    pub fn subscribe(&mut self) -> VisionResult<()> {
        match self.try_subscribe() {
            Ok(()) => {
                self.state = LinkState::Subscribed;
                Ok(())
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn try_subscribe(&mut self) -> VisionResult<()> {
        if self.state != LinkState::Connecting {
            return Err(VisionError::NotConnected);
        }
        let stream = self.stream.as_mut().ok_or(VisionError::NotConnected)?;

        for kind in StreamKind::ALL {
            stream.send(&VisionPacket::Subscribe {
                stream: kind,
                tear_buffered: true,
            })?;
        }

        for kind in StreamKind::ALL {
            let bufs = match stream.recv::<VisionPacket>()? {
                VisionPacket::BufferDescriptors(bufs) => bufs,
                other => {
                    return Err(VisionError::UnexpectedReply {
                        expected: format!("BufferDescriptors for {}", kind),
                        got: other.kind().to_string(),
                    })
                }
            };
            if bufs.stream != kind {
                return Err(VisionError::UnexpectedReply {
                    expected: format!("BufferDescriptors for {}", kind),
                    got: format!("BufferDescriptors for {}", bufs.stream),
                });
            }

            let ring = SlotRing::map(&bufs)?;
            debug!(
                "[VISION] {} stream: {}x{} stride {}, {} slots of {} bytes",
                kind,
                bufs.geometry.width,
                bufs.geometry.height,
                bufs.geometry.stride,
                SLOT_COUNT,
                bufs.slot_size
            );
            match kind {
                StreamKind::Primary => self.primary = Some(ring),
                StreamKind::Secondary => self.secondary = Some(ring),
            }
        }

        // Serviced from the tick thread, which must not stall on a half-sent packet
        stream.set_read_timeout(Some(PACKET_READ_TIMEOUT))?;
        Ok(())
    }

    /// Geometry of every mapped stream
    pub fn geometry(&self) -> Vec<(StreamKind, FrameGeometry)> {
        [&self.primary, &self.secondary]
            .into_iter()
            .flatten()
            .map(|ring| (ring.stream(), ring.geometry()))
            .collect()
    }

    /// Publish a fresh connection to the scene: geometry in, stale frames out
    pub fn install(&self, scene: &mut Scene) {
        for (stream, geometry) in self.geometry() {
            scene.frames.set_geometry(stream, geometry);
        }
        scene.frames.clear();
        scene.vision_connected = true;
    }

    /// Descriptor to poll for the next packet
    pub fn raw_fd(&self) -> Option<RawFd> {
        match self.state {
            LinkState::Subscribed | LinkState::Streaming => {
                self.stream.as_ref().map(IpcStream::raw_fd)
            }
            LinkState::Disconnected | LinkState::Connecting => None,
        }
    }

    pub fn held_slot(&self, stream: StreamKind) -> Option<usize> {
        self.ring(stream).and_then(SlotRing::leased)
    }

    pub fn ring(&self, stream: StreamKind) -> Option<&SlotRing> {
        match stream {
            StreamKind::Primary => self.primary.as_ref(),
            StreamKind::Secondary => self.secondary.as_ref(),
        }
    }

    fn ring_mut(&mut self, stream: StreamKind) -> Option<&mut SlotRing> {
        match stream {
            StreamKind::Primary => self.primary.as_mut(),
            StreamKind::Secondary => self.secondary.as_mut(),
        }
    }

    /// Read and apply one producer packet
    ///
    /// Call it only when [`Self::raw_fd`] polled readable; a packet that does
    /// not complete within [`PACKET_READ_TIMEOUT`] ends the connection.
    /// Returns the stream that received a new frame. On error the connection
    /// is torn down and the scene shows no frame.
    pub fn service(&mut self, scene: &mut Scene) -> VisionResult<StreamKind> {
        match self.try_service(scene) {
            Ok(stream) => Ok(stream),
            Err(e) => {
                if e.is_peer_closed() {
                    info!("[VISION] Producer closed the frame channel");
                } else {
                    warn!("[VISION] Frame channel failed: {}", e);
                }
                self.teardown(scene);
                Err(e)
            }
        }
    }

    fn try_service(&mut self, scene: &mut Scene) -> VisionResult<StreamKind> {
        if !matches!(self.state, LinkState::Subscribed | LinkState::Streaming) {
            return Err(VisionError::NotConnected);
        }
        let packet = self
            .stream
            .as_mut()
            .ok_or(VisionError::NotConnected)?
            .recv::<VisionPacket>()?;

        match packet {
            VisionPacket::Acquire { stream, slot } => {
                self.acquire(stream, slot as usize, scene)?;
                self.state = LinkState::Streaming;
                Ok(stream)
            }
            other => Err(VisionError::ProtocolViolation(format!(
                "{} while streaming",
                other.kind()
            ))),
        }
    }

    fn acquire(&mut self, stream: StreamKind, slot: usize, scene: &mut Scene) -> VisionResult<()> {
        let ring = self.ring(stream).ok_or_else(|| {
            VisionError::ProtocolViolation(format!("Acquire for unsubscribed {} stream", stream))
        })?;
        let previous = ring.prepare_acquire(slot)?;

        if let Some(previous) = previous {
            let link = self.stream.as_mut().ok_or(VisionError::NotConnected)?;
            link.send(&VisionPacket::Release {
                stream,
                slot: previous as u32,
            })?;
        }

        let frame = self
            .ring_mut(stream)
            .ok_or(VisionError::NotConnected)?
            .commit_acquire(slot);
        scene.frames.set(stream, Some(frame));
        Ok(())
    }

    /// Drop the connection and every scene reference into it
    ///
    /// Held slots are abandoned without a final release; the producer
    /// reclaims them when it sees the disconnect.
    pub fn teardown(&mut self, scene: &mut Scene) {
        scene.frames.clear();
        scene.vision_connected = false;
        self.close();
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
        }
        self.primary = None;
        self.secondary = None;
        self.state = LinkState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StreamBufs;
    use drivehud_transports::TransportError;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::path::PathBuf;

    struct Producer {
        link: IpcStream,
        raw: UnixStream,
        _dir: tempfile::TempDir,
        handles: Vec<PathBuf>,
    }

    impl Producer {
        fn descriptors(&self, stream: StreamKind) -> VisionPacket {
            VisionPacket::BufferDescriptors(StreamBufs {
                stream,
                slot_count: SLOT_COUNT as u32,
                slot_size: 16,
                shared_handles: self.handles.clone(),
                geometry: FrameGeometry {
                    width: 4,
                    height: 4,
                    stride: 4,
                    ..Default::default()
                },
            })
        }
    }

    fn pair() -> (FrameChannelClient, Producer) {
        let dir = tempfile::tempdir().unwrap();
        let handles = (0..SLOT_COUNT)
            .map(|i| {
                let path = dir.path().join(format!("slot{}", i));
                File::create(&path).unwrap().write_all(&[i as u8; 16]).unwrap();
                path
            })
            .collect();

        let (a, b) = UnixStream::pair().unwrap();
        let raw = b.try_clone().unwrap();
        let mut client = FrameChannelClient::new();
        client.attach(IpcStream::from_stream(a));
        (
            client,
            Producer {
                link: IpcStream::from_stream(b),
                raw,
                _dir: dir,
                handles,
            },
        )
    }

    fn subscribed() -> (FrameChannelClient, Producer) {
        let (mut client, mut producer) = pair();
        producer
            .link
            .send(&producer.descriptors(StreamKind::Primary))
            .unwrap();
        producer
            .link
            .send(&producer.descriptors(StreamKind::Secondary))
            .unwrap();
        client.subscribe().unwrap();

        for kind in StreamKind::ALL {
            assert_eq!(
                producer.link.recv::<VisionPacket>().unwrap(),
                VisionPacket::Subscribe {
                    stream: kind,
                    tear_buffered: true
                }
            );
        }
        (client, producer)
    }

    #[test]
    fn test_subscribe_maps_both_rings() {
        let (client, _producer) = subscribed();
        assert_eq!(client.state(), LinkState::Subscribed);
        assert!(client.raw_fd().is_some());
        assert_eq!(client.geometry().len(), 2);
    }

    #[test]
    fn test_wrong_reply_kind_disconnects() {
        let (mut client, mut producer) = pair();
        producer
            .link
            .send(&VisionPacket::Acquire {
                stream: StreamKind::Primary,
                slot: 0,
            })
            .unwrap();

        let err = client.subscribe().unwrap_err();
        assert!(matches!(err, VisionError::UnexpectedReply { .. }));
        assert_eq!(client.state(), LinkState::Disconnected);
        assert!(client.raw_fd().is_none());
    }

    #[test]
    fn test_out_of_order_replies_disconnect() {
        let (mut client, mut producer) = pair();
        producer
            .link
            .send(&producer.descriptors(StreamKind::Secondary))
            .unwrap();

        assert!(matches!(
            client.subscribe(),
            Err(VisionError::UnexpectedReply { .. })
        ));
        assert_eq!(client.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_eof_during_subscribe_disconnects() {
        let (mut client, mut producer) = pair();
        producer
            .link
            .send(&producer.descriptors(StreamKind::Primary))
            .unwrap();
        drop(producer);

        // Depending on timing the send or the second read fails first
        let err = client.subscribe().unwrap_err();
        assert!(matches!(err, VisionError::Transport(_)));
        assert_eq!(client.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_release_precedes_next_lease() {
        let (mut client, mut producer) = subscribed();
        let mut scene = Scene::default();
        client.install(&mut scene);

        for slot in 0..3 {
            producer
                .link
                .send(&VisionPacket::Acquire {
                    stream: StreamKind::Secondary,
                    slot,
                })
                .unwrap();
            assert_eq!(client.service(&mut scene).unwrap(), StreamKind::Secondary);
        }

        // Releases for 0 and 1 were written before slots 1 and 2 were recorded
        for released in 0..2 {
            assert_eq!(
                producer.link.recv::<VisionPacket>().unwrap(),
                VisionPacket::Release {
                    stream: StreamKind::Secondary,
                    slot: released
                }
            );
        }
        assert_eq!(client.held_slot(StreamKind::Secondary), Some(2));
        assert_eq!(client.held_slot(StreamKind::Primary), None);
        assert_eq!(scene.frames.secondary.as_ref().unwrap().slot(), 2);
        assert_eq!(client.state(), LinkState::Streaming);
    }

    #[test]
    fn test_unexpected_packet_while_streaming_tears_down() {
        let (mut client, mut producer) = subscribed();
        let mut scene = Scene::default();
        client.install(&mut scene);

        producer
            .link
            .send(&VisionPacket::Acquire {
                stream: StreamKind::Primary,
                slot: 0,
            })
            .unwrap();
        client.service(&mut scene).unwrap();

        producer
            .link
            .send(&producer.descriptors(StreamKind::Primary))
            .unwrap();
        assert!(matches!(
            client.service(&mut scene),
            Err(VisionError::ProtocolViolation(_))
        ));
        assert_eq!(client.state(), LinkState::Disconnected);
        assert!(scene.frames.primary.is_none());
        assert!(!scene.vision_connected);
    }

    #[test]
    fn test_reacquire_of_held_slot_is_violation() {
        let (mut client, mut producer) = subscribed();
        let mut scene = Scene::default();
        client.install(&mut scene);

        for _ in 0..2 {
            producer
                .link
                .send(&VisionPacket::Acquire {
                    stream: StreamKind::Primary,
                    slot: 1,
                })
                .unwrap();
        }
        client.service(&mut scene).unwrap();
        assert!(matches!(
            client.service(&mut scene),
            Err(VisionError::SlotStillLeased { slot: 1, .. })
        ));
        assert_eq!(client.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_half_sent_packet_times_out_and_tears_down() {
        let (mut client, mut producer) = subscribed();
        let mut scene = Scene::default();
        client.install(&mut scene);

        producer.raw.write_all(&[12, 0]).unwrap();
        let started = std::time::Instant::now();
        assert!(matches!(
            client.service(&mut scene),
            Err(VisionError::Transport(TransportError::Timeout))
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(client.state(), LinkState::Disconnected);
        assert!(!scene.vision_connected);
    }

    #[test]
    fn test_service_without_connection_fails() {
        let mut client = FrameChannelClient::new();
        let mut scene = Scene::default();
        assert!(matches!(
            client.service(&mut scene),
            Err(VisionError::NotConnected)
        ));
    }
}
