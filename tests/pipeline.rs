//! Telemetry and frames through the real transports in one drain

use std::os::unix::net::UnixStream;
use std::thread;
use std::time::{Duration, Instant};

use drivehud::bus::{
    CalibrationState, Channel, ChannelSet, Envelope, Event, EventDispatcher, ThermalState,
    VehicleState, ZmqChannelSet, EXTRINSIC_LEN, WARP_LEN,
};
use drivehud::scene::{
    CalibrationStatus, FrameGeometry, PowerTransition, Renderer, Scene, Status, StreamKind,
};
use drivehud::transports::common::{read_frame, write_frame};
use drivehud::transports::{IpcStream, MAX_PACKET_SIZE};
use drivehud::vision::{FrameChannelClient, StreamBufs, VisionPacket, SLOT_COUNT};

#[derive(Default)]
struct Counting {
    draws: usize,
    frames: usize,
}

impl Renderer for Counting {
    fn draw(&mut self, _scene: &Scene, _now: u64) {
        self.draws += 1;
    }

    fn frame_ready(&mut self, _stream: StreamKind, _scene: &Scene) {
        self.frames += 1;
    }
}

fn publisher(context: &zmq::Context, address: &str) -> zmq::Socket {
    let socket = context.socket(zmq::PUB).unwrap();
    socket.bind(address).unwrap();
    socket
}

/// Publish probes until the subscriber sees one, then discard them
fn prime(socket: &zmq::Socket, set: &mut ZmqChannelSet, channel: Channel) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        assert!(Instant::now() < deadline, "{} never subscribed", channel);
        socket.send(&b"probe"[..], 0).unwrap();
        thread::sleep(Duration::from_millis(5));
        if set.poll(None).unwrap().is_ready(channel) {
            break;
        }
    }
    while set.recv(channel).unwrap().is_some() {}
}

fn subscribed_client(dir: &std::path::Path) -> (FrameChannelClient, UnixStream) {
    let handles: Vec<_> = (0..SLOT_COUNT)
        .map(|i| {
            let path = dir.join(format!("slot{}", i));
            std::fs::write(&path, [0u8; 16]).unwrap();
            path
        })
        .collect();

    let (ours, mut producer) = UnixStream::pair().unwrap();
    for stream in StreamKind::ALL {
        let bufs = StreamBufs {
            stream,
            slot_count: SLOT_COUNT as u32,
            slot_size: 16,
            shared_handles: handles.clone(),
            geometry: FrameGeometry::default(),
        };
        write_frame(&mut producer, &VisionPacket::BufferDescriptors(bufs)).unwrap();
    }

    let mut client = FrameChannelClient::new();
    client.attach(IpcStream::from_stream(ours));
    client.subscribe().unwrap();
    for _ in StreamKind::ALL {
        let packet: VisionPacket = read_frame(&mut producer, MAX_PACKET_SIZE).unwrap();
        assert!(matches!(packet, VisionPacket::Subscribe { .. }));
    }
    (client, producer)
}

#[test]
fn one_drain_services_frames_and_every_channel() {
    let context = zmq::Context::new();
    let endpoints = vec![
        (Channel::VehicleState, "inproc://pipeline-vehicle".to_string()),
        (Channel::CalibrationState, "inproc://pipeline-calibration".to_string()),
        (Channel::ThermalState, "inproc://pipeline-thermal".to_string()),
    ];
    let publishers: Vec<zmq::Socket> = endpoints
        .iter()
        .map(|(_, address)| publisher(&context, address))
        .collect();
    let mut set = ZmqChannelSet::connect(&context, &endpoints).unwrap();
    for ((channel, _), socket) in endpoints.iter().zip(&publishers) {
        prime(socket, &mut set, *channel);
    }

    let dir = tempfile::tempdir().unwrap();
    let (client, mut producer) = subscribed_client(dir.path());
    let mut scene = Scene::default();
    client.install(&mut scene);
    let mut vision = Some(client);

    let vehicle = Envelope::new(
        10,
        Event::VehicleState(VehicleState {
            enabled: true,
            ..Default::default()
        }),
    );
    let calibration = Envelope::new(
        11,
        Event::CalibrationState(CalibrationState {
            cal_status: CalibrationStatus::Calibrated,
            cal_perc: 100,
            warp_matrix: vec![0.5; WARP_LEN],
            extrinsic_matrix: vec![0.25; EXTRINSIC_LEN],
        }),
    );
    let thermal = Envelope::new(
        12,
        Event::ThermalState(ThermalState {
            started: false,
            started_ts: 0,
        }),
    );
    for (socket, envelope) in publishers.iter().zip([&vehicle, &calibration, &thermal]) {
        socket.send(envelope.encode().unwrap(), 0).unwrap();
    }
    write_frame(
        &mut producer,
        &VisionPacket::Acquire {
            stream: StreamKind::Primary,
            slot: 1,
        },
    )
    .unwrap();
    thread::sleep(Duration::from_millis(20));

    let mut dispatcher = EventDispatcher::new();
    let mut renderer = Counting::default();
    let report = dispatcher.drain(&mut scene, &mut vision, &mut set, &mut renderer);

    assert_eq!(report.frames, 1);
    assert_eq!(report.envelopes, 3);
    assert_eq!(report.dropped, 0);
    assert!(report.status_changed);
    assert_eq!(report.power, Some(PowerTransition::On));
    assert_eq!(renderer.frames, 1);

    // Thermal is serviced last and stops the drive
    assert_eq!(scene.status(), Status::Stopped);
    assert!(scene.calibration.world_objects_visible);
    assert_eq!(scene.calibration.warp[2], [0.5; 3]);
    assert_eq!(scene.frames.primary.as_ref().map(|f| f.slot()), Some(1));

    // Next acquire hands the previous slot back
    write_frame(
        &mut producer,
        &VisionPacket::Acquire {
            stream: StreamKind::Primary,
            slot: 2,
        },
    )
    .unwrap();
    thread::sleep(Duration::from_millis(5));
    let report = dispatcher.drain(&mut scene, &mut vision, &mut set, &mut renderer);
    assert_eq!(report.frames, 1);
    assert!(!report.activity);

    let release: VisionPacket = read_frame(&mut producer, MAX_PACKET_SIZE).unwrap();
    assert_eq!(
        release,
        VisionPacket::Release {
            stream: StreamKind::Primary,
            slot: 1
        }
    );
}
