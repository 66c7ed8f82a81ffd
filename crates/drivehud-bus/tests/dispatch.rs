//! Dispatcher behavior over an in-memory channel set

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::Write;
use std::os::unix::io::RawFd;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use drivehud_bus::{
    Channel, ChannelSet, EventDispatcher, Envelope, Event, RadarState, Readiness, ThermalState,
    VehicleState,
};
use drivehud_scene::{
    AlertStatus, FrameGeometry, PowerTransition, Renderer, Scene, Status, StreamKind,
};
use drivehud_transports::{IpcStream, TransportError, TransportResult};
use drivehud_vision::{FrameChannelClient, StreamBufs, VisionPacket, SLOT_COUNT};

#[derive(Default)]
struct FakeChannels {
    queues: HashMap<Channel, VecDeque<Vec<u8>>>,
    fail_poll: bool,
    polls: usize,
}

impl FakeChannels {
    fn push(&mut self, channel: Channel, bytes: Vec<u8>) {
        self.queues.entry(channel).or_default().push_back(bytes);
    }

    fn push_envelope(&mut self, channel: Channel, envelope: &Envelope) {
        self.push(channel, envelope.encode().unwrap());
    }

    fn pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

impl ChannelSet for FakeChannels {
    fn poll(&mut self, frame_fd: Option<RawFd>) -> TransportResult<Readiness> {
        self.polls += 1;
        if self.fail_poll {
            return Err(TransportError::InvalidConfig("poll broken".to_string()));
        }

        let mut ready = Readiness::default();
        for (channel, queue) in &self.queues {
            if !queue.is_empty() {
                ready.set(*channel);
            }
        }
        if let Some(fd) = frame_fd {
            let mut items = [zmq::PollItem::from_fd(fd, zmq::POLLIN)];
            zmq::poll(&mut items, 0)?;
            ready.frame = items[0].is_readable() || items[0].is_error();
        }
        Ok(ready)
    }

    fn recv(&mut self, channel: Channel) -> TransportResult<Option<Vec<u8>>> {
        Ok(self.queues.get_mut(&channel).and_then(VecDeque::pop_front))
    }
}

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(StreamKind, Option<usize>)>,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, _scene: &Scene, _now: u64) {}

    fn frame_ready(&mut self, stream: StreamKind, scene: &Scene) {
        let slot = scene.frames.get(stream).map(|frame| frame.slot());
        self.frames.push((stream, slot));
    }
}

fn vehicle(ts: u64, enabled: bool, alert_status: AlertStatus, text1: &str) -> Envelope {
    Envelope::new(
        ts,
        Event::VehicleState(VehicleState {
            v_ego: 20.0,
            enabled,
            alert_text1: text1.to_string(),
            alert_status,
            ..Default::default()
        }),
    )
}

fn thermal(started: bool) -> Envelope {
    Envelope::new(
        5,
        Event::ThermalState(ThermalState {
            started,
            started_ts: 1,
        }),
    )
}

fn drain(
    dispatcher: &mut EventDispatcher,
    scene: &mut Scene,
    channels: &mut FakeChannels,
) -> drivehud_bus::DrainReport {
    let mut vision = None;
    let mut renderer = RecordingRenderer::default();
    dispatcher.drain(scene, &mut vision, channels, &mut renderer)
}

#[test]
fn drains_everything_queued_in_one_call() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    channels.push_envelope(Channel::VehicleState, &vehicle(1, true, AlertStatus::Normal, ""));
    channels.push_envelope(
        Channel::RadarState,
        &Envelope::new(
            2,
            Event::RadarState(RadarState {
                lead_status: true,
                d_rel: 42.0,
                ..Default::default()
            }),
        ),
    );
    channels.push(Channel::Control, vec![3]);
    channels.push_envelope(Channel::VehicleState, &vehicle(3, true, AlertStatus::Normal, ""));

    let report = drain(&mut dispatcher, &mut scene, &mut channels);

    assert_eq!(channels.pending(), 0);
    assert_eq!(report.iterations, 4);
    assert_eq!(report.envelopes, 3);
    assert_eq!(channels.polls, 5);
    assert!(report.status_changed);
    assert_eq!(scene.status(), Status::Engaged);
    assert!(scene.lead.present);
    assert_eq!(scene.overlay_mode, 3);
    assert_eq!(scene.alert.posted_at, 3);
}

#[test]
fn empty_poll_returns_immediately() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(report, drivehud_bus::DrainReport::default());
    assert_eq!(channels.polls, 1);
}

#[test]
fn malformed_envelope_is_dropped_and_drain_continues() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    channels.push(Channel::ModelOutput, vec![0xDE, 0xAD]);
    channels.push_envelope(
        Channel::VehicleState,
        &vehicle(9, false, AlertStatus::UserPrompt, "KEEP HANDS ON WHEEL"),
    );

    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.envelopes, 1);
    assert_eq!(dispatcher.dropped_total(), 1);
    assert_eq!(scene.status(), Status::Warning);
    assert!(scene.alert_active(9));
}

#[test]
fn control_message_must_be_one_byte() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    channels.push(Channel::Control, vec![7, 7]);
    channels.push(Channel::Control, vec![]);
    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(report.dropped, 2);
    assert_eq!(scene.overlay_mode, 0);

    channels.push(Channel::Control, vec![1]);
    drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(scene.overlay_mode, 1);
}

#[test]
fn redispatch_of_same_envelope_is_idempotent() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();
    let envelope = vehicle(11, true, AlertStatus::Critical, "BRAKE!");

    channels.push_envelope(Channel::VehicleState, &envelope);
    let first = drain(&mut dispatcher, &mut scene, &mut channels);
    let after_first = (scene.vehicle.clone(), scene.alert.clone(), scene.status());

    channels.push_envelope(Channel::VehicleState, &envelope);
    let second = drain(&mut dispatcher, &mut scene, &mut channels);

    assert!(first.status_changed);
    assert!(!second.status_changed);
    assert_eq!(
        (scene.vehicle.clone(), scene.alert.clone(), scene.status()),
        after_first
    );
}

#[test]
fn thermal_stop_overrides_alert_and_start_only_disengages() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    channels.push_envelope(Channel::VehicleState, &vehicle(1, true, AlertStatus::Critical, "X"));
    drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(scene.status(), Status::Alert);

    channels.push_envelope(Channel::ThermalState, &thermal(false));
    assert!(drain(&mut dispatcher, &mut scene, &mut channels).status_changed);
    assert_eq!(scene.status(), Status::Stopped);

    channels.push_envelope(Channel::ThermalState, &thermal(true));
    drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(scene.status(), Status::Disengaged);
}

#[test]
fn activity_channels_wake_but_thermal_does_not() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels::default();

    channels.push_envelope(Channel::ThermalState, &thermal(true));
    channels.push(Channel::Control, vec![0]);
    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert!(!report.activity);
    assert!(!scene.wake.awake);

    channels.push_envelope(Channel::VehicleState, &vehicle(1, false, AlertStatus::Normal, ""));
    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert!(report.activity);
    assert_eq!(report.power, Some(PowerTransition::On));
    assert!(scene.wake.awake);

    // Already awake: countdown resets without another edge
    scene.wake.countdown = 3;
    channels.push_envelope(Channel::VehicleState, &vehicle(2, false, AlertStatus::Normal, ""));
    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(report.power, None);
    assert_eq!(scene.wake.countdown, drivehud_scene::WAKE_TIMEOUT_TICKS);
}

#[test]
fn poll_failure_ends_drain() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let mut channels = FakeChannels {
        fail_poll: true,
        ..Default::default()
    };
    channels.push(Channel::Control, vec![1]);

    let report = drain(&mut dispatcher, &mut scene, &mut channels);
    assert_eq!(report.iterations, 0);
    assert_eq!(channels.pending(), 1);
}

struct Producer {
    link: IpcStream,
    _dir: tempfile::TempDir,
}

fn streaming_client(scene: &mut Scene) -> (FrameChannelClient, Producer) {
    let dir = tempfile::tempdir().unwrap();
    let handles: Vec<PathBuf> = (0..SLOT_COUNT)
        .map(|i| {
            let path = dir.path().join(format!("slot{}", i));
            File::create(&path).unwrap().write_all(&[0u8; 32]).unwrap();
            path
        })
        .collect();

    let (a, b) = UnixStream::pair().unwrap();
    let mut producer = IpcStream::from_stream(b);
    for stream in StreamKind::ALL {
        producer
            .send(&VisionPacket::BufferDescriptors(StreamBufs {
                stream,
                slot_count: SLOT_COUNT as u32,
                slot_size: 32,
                shared_handles: handles.clone(),
                geometry: FrameGeometry::default(),
            }))
            .unwrap();
    }

    let mut client = FrameChannelClient::new();
    client.attach(IpcStream::from_stream(a));
    client.subscribe().unwrap();
    client.install(scene);
    for _ in StreamKind::ALL {
        producer.recv::<VisionPacket>().unwrap();
    }
    (client, Producer { link: producer, _dir: dir })
}

#[test]
fn frames_signal_renderer_only_for_active_view() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let (client, mut producer) = streaming_client(&mut scene);
    let mut vision = Some(client);
    let mut channels = FakeChannels::default();
    let mut renderer = RecordingRenderer::default();

    for (stream, slot) in [
        (StreamKind::Primary, 0),
        (StreamKind::Secondary, 0),
        (StreamKind::Primary, 1),
    ] {
        producer
            .link
            .send(&VisionPacket::Acquire { stream, slot })
            .unwrap();
    }

    let report = dispatcher.drain(&mut scene, &mut vision, &mut channels, &mut renderer);
    assert_eq!(report.frames, 3);
    assert!(!report.activity);
    assert_eq!(
        renderer.frames,
        vec![
            (StreamKind::Primary, Some(0)),
            (StreamKind::Primary, Some(1)),
        ]
    );
    assert_eq!(
        producer.link.recv::<VisionPacket>().unwrap(),
        VisionPacket::Release {
            stream: StreamKind::Primary,
            slot: 0
        }
    );
}

#[test]
fn frame_channel_loss_clears_scene_and_drops_client() {
    let mut dispatcher = EventDispatcher::new();
    let mut scene = Scene::default();
    let (client, mut producer) = streaming_client(&mut scene);
    let mut vision = Some(client);
    let mut channels = FakeChannels::default();
    let mut renderer = RecordingRenderer::default();

    producer
        .link
        .send(&VisionPacket::Acquire {
            stream: StreamKind::Primary,
            slot: 2,
        })
        .unwrap();
    drop(producer);
    channels.push_envelope(Channel::VehicleState, &vehicle(1, true, AlertStatus::Normal, ""));

    let report = dispatcher.drain(&mut scene, &mut vision, &mut channels, &mut renderer);
    assert!(report.vision_lost);
    assert!(vision.is_none());
    assert!(scene.frames.primary.is_none());
    assert!(!scene.vision_connected);
    // Telemetry keeps flowing without the frame channel
    assert_eq!(scene.status(), Status::Engaged);
}
