//! Subsystem orchestration
//!
//! Wires the receiver threads to the per-frame consumer: one stream
//! listener for body positions and two datagram listeners for telemetry,
//! each publishing into its own latest-value cell. The frame loop calls
//! [`Subsystem::update`] once per frame; it never blocks and never does
//! I/O beyond draining the cells. Shutdown is cooperative with a bounded
//! join so a stuck receiver cannot hang process exit.

use crate::core::{PositionSnapshot, TelemetryFrame};
use crate::kinematics::mount::MountDriver;
use crate::net::error::{NetError, NetResult};
use crate::net::uplink::SelectionUplink;
use crate::net::{position_feed, telemetry};
use crate::scene::camera::{CameraFollower, UnresolvedHook};
use crate::scene::rotation::BodySpin;
use crate::scene::{SceneRegistry, StatusSink};
use crate::sync::{latest_channel, LatestReceiver, RunFlag};
use crate::utils::config::SystemConfig;
use std::net::UdpSocket;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Running sync core: three receiver threads plus the consumer-side state.
pub struct Subsystem {
    flag: RunFlag,
    threads: Vec<(&'static str, JoinHandle<()>)>,
    positions: LatestReceiver<PositionSnapshot>,
    mount_telemetry: LatestReceiver<TelemetryFrame>,
    camera_telemetry: LatestReceiver<TelemetryFrame>,
    uplink: SelectionUplink,
    mount: MountDriver,
    follower: CameraFollower,
    spins: Vec<BodySpin>,
    sim_hours_per_real_second: f64,
    /// Last telemetry frame seen; persists between polls so the driver
    /// always works against the most recent known state.
    last_mount_frame: TelemetryFrame,
    mount_port: u16,
    camera_port: u16,
    join_timeout: Duration,
}

fn bind_telemetry(port: u16, read_timeout: Duration) -> NetResult<UdpSocket> {
    let endpoint = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&endpoint).map_err(|e| NetError::Bind {
        endpoint: endpoint.clone(),
        message: e.to_string(),
    })?;
    socket
        .set_read_timeout(Some(read_timeout))
        .map_err(|e| NetError::Socket {
            endpoint,
            message: e.to_string(),
        })?;
    Ok(socket)
}

impl Subsystem {
    /// Bind the local sockets and spawn the receiver threads.
    ///
    /// The scene is only inspected here (known body names, initial mount
    /// orientation); ownership of it stays with the caller's frame loop.
    pub fn start(config: &SystemConfig, scene: &SceneRegistry) -> NetResult<Self> {
        let flag = RunFlag::new();
        let read_timeout = Duration::from_millis(config.network.read_timeout_ms);
        let mut threads = Vec::new();

        let (position_tx, positions) = latest_channel();
        {
            let endpoint = config.network.position_endpoint();
            let scale = config.feed.position_scale;
            let known = scene.known_names();
            let flag = flag.clone();
            threads.push((
                "position feed",
                thread::spawn(move || {
                    position_feed::run_position_feed(
                        endpoint,
                        scale,
                        known,
                        read_timeout,
                        position_tx,
                        flag,
                    )
                }),
            ));
        }

        let mount_socket = bind_telemetry(config.network.mount_telemetry_port, read_timeout)?;
        let mount_port = mount_socket
            .local_addr()
            .map_err(|e| NetError::Socket {
                endpoint: "mount telemetry".to_string(),
                message: e.to_string(),
            })?
            .port();
        let (mount_tx, mount_telemetry) = latest_channel();
        {
            let flag = flag.clone();
            threads.push((
                "mount telemetry",
                thread::spawn(move || {
                    telemetry::run_telemetry_receiver("mount telemetry", mount_socket, mount_tx, flag)
                }),
            ));
        }

        let camera_socket = bind_telemetry(config.network.camera_telemetry_port, read_timeout)?;
        let camera_port = camera_socket
            .local_addr()
            .map_err(|e| NetError::Socket {
                endpoint: "camera telemetry".to_string(),
                message: e.to_string(),
            })?
            .port();
        let (camera_tx, camera_telemetry) = latest_channel();
        {
            let flag = flag.clone();
            threads.push((
                "camera telemetry",
                thread::spawn(move || {
                    telemetry::run_telemetry_receiver(
                        "camera telemetry",
                        camera_socket,
                        camera_tx,
                        flag,
                    )
                }),
            ));
        }

        let uplink = SelectionUplink::new(config.network.selection_endpoint())?;
        log::info!(
            "sync core started: positions from {}, telemetry on ports {}/{}, selections to {}",
            config.network.position_endpoint(),
            mount_port,
            camera_port,
            uplink.target()
        );

        Ok(Self {
            flag,
            threads,
            positions,
            mount_telemetry,
            camera_telemetry,
            uplink,
            mount: MountDriver::new(&config.kinematics, scene),
            follower: CameraFollower::new(&config.camera, &config.feed.reference_body),
            spins: config.rotation.bodies.clone(),
            sim_hours_per_real_second: config.rotation.sim_hours_per_real_second,
            last_mount_frame: TelemetryFrame::default(),
            mount_port,
            camera_port,
            join_timeout: Duration::from_millis(config.network.join_timeout_ms),
        })
    }

    /// Actual mount telemetry port after binding (differs from the
    /// configured one when it was 0).
    pub fn mount_telemetry_port(&self) -> u16 {
        self.mount_port
    }

    /// Actual camera telemetry port after binding.
    pub fn camera_telemetry_port(&self) -> u16 {
        self.camera_port
    }

    /// Advance one frame. Non-blocking: drains the hand-off cells, applies
    /// the latest body positions, slews the mount, eases the camera and
    /// spins the bodies.
    pub fn update(&mut self, scene: &mut SceneRegistry, dt_seconds: f64, status: &mut dyn StatusSink) {
        if let Some(snapshot) = self.positions.poll() {
            for (name, position) in &snapshot.bodies {
                if let Some(transform) = scene.get_mut(name) {
                    transform.position = *position;
                }
            }
        }

        if let Some(frame) = self.mount_telemetry.poll() {
            self.last_mount_frame = frame;
        }
        let text = self.mount.update(scene, &self.last_mount_frame, dt_seconds);
        status.display(&text);

        if let Some(frame) = self.camera_telemetry.poll() {
            self.follower.note_telemetry(&frame);
        }
        self.follower.update(scene, dt_seconds);

        for spin in &self.spins {
            spin.step(scene, self.sim_hours_per_real_second, dt_seconds);
        }
    }

    /// Handle a UI selection event.
    pub fn select_target(&mut self, scene: &SceneRegistry, name: &str) {
        self.follower.select(scene, name, &self.uplink);
    }

    /// Manually re-center the camera on the current target.
    pub fn teleport_camera(&mut self, scene: &mut SceneRegistry) {
        self.follower.teleport(scene);
    }

    /// Observe selections that resolve to nothing (silent no-ops).
    pub fn set_unresolved_selection_hook(&mut self, hook: UnresolvedHook) {
        self.follower.set_unresolved_hook(hook);
    }

    /// Stop the receivers and join them, each within the configured
    /// timeout. A thread that misses the deadline is logged and abandoned
    /// rather than blocking process exit.
    pub fn shutdown(mut self) {
        self.flag.stop();
        for (name, handle) in self.threads.drain(..) {
            let deadline = Instant::now() + self.join_timeout;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                if handle.join().is_err() {
                    log::error!("{} thread panicked", name);
                }
            } else {
                log::warn!("{} thread did not stop within the join timeout, abandoning it", name);
            }
        }
        log::info!("sync core stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RecordingSink, Transform};
    use nalgebra::Vector3;
    use std::io::Write;
    use std::net::{TcpListener, UdpSocket};

    fn test_config(position_port: u16) -> SystemConfig {
        let mut config = SystemConfig::default();
        config.network.host = "127.0.0.1".to_string();
        config.network.position_port = position_port;
        // OS-assigned ports so tests never collide.
        config.network.mount_telemetry_port = 0;
        config.network.camera_telemetry_port = 0;
        config.network.read_timeout_ms = 50;
        config.network.join_timeout_ms = 1000;
        config
    }

    fn test_scene() -> SceneRegistry {
        let mut scene = SceneRegistry::new();
        for name in ["Earth", "Mars", "Ankara"] {
            scene.register(name, Transform::with_scale(1.0));
        }
        scene.register("telescope", Transform::default());
        scene.register("azimuth_cylinder", Transform::default());
        scene.register("altitude_cylinder", Transform::default());
        scene.register("telescope_camera", Transform::default());
        scene
    }

    #[test]
    fn test_end_to_end_feed_telemetry_and_motion() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = test_config(listener.local_addr().unwrap().port());
        let mut scene = test_scene();
        let mut subsystem = Subsystem::start(&config, &scene).unwrap();

        let (mut producer, _) = listener.accept().unwrap();
        producer
            .write_all(b"{\"positions\":{\"Earth\":{\"x\":1.0,\"y\":2.0,\"z\":3.0}}}\n")
            .unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender
            .send_to(
                b"AZ:45.0 ALT:30.0",
                ("127.0.0.1", subsystem.mount_telemetry_port()),
            )
            .unwrap();

        let mut sink = RecordingSink::new();
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            subsystem.update(&mut scene, 0.05, &mut sink);
            let positioned =
                scene.position("earth") == Some(Vector3::new(10.0, 20.0, 30.0));
            let moving = scene.get("telescope").unwrap().yaw_deg > 0.0;
            if positioned && moving {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(scene.position("earth"), Some(Vector3::new(10.0, 20.0, 30.0)));
        let yaw = scene.get("telescope").unwrap().yaw_deg;
        assert!(yaw > 0.0 && yaw <= 45.0, "yaw = {}", yaw);
        assert!(sink.last().unwrap().contains("45.0°"));

        subsystem.shutdown();
    }

    #[test]
    fn test_status_shows_error_text_until_telemetry_arrives() {
        // No producer listening: the feed thread logs and exits, the rest
        // of the subsystem keeps rendering.
        let config = test_config(1);
        let mut scene = test_scene();
        let mut subsystem = Subsystem::start(&config, &scene).unwrap();

        let mut sink = RecordingSink::new();
        subsystem.update(&mut scene, 0.1, &mut sink);
        assert_eq!(
            sink.last(),
            Some(crate::core::constants::WAITING_FOR_TELEMETRY)
        );
        assert_eq!(scene.get("telescope").unwrap().yaw_deg, 0.0);

        subsystem.shutdown();
    }

    #[test]
    fn test_shutdown_is_bounded_while_receivers_are_blocked() {
        let config = test_config(1);
        let scene = test_scene();
        let subsystem = Subsystem::start(&config, &scene).unwrap();

        let started = Instant::now();
        subsystem.shutdown();
        // Receivers wake at the read timeout (50 ms) and the join deadline
        // is 1 s per thread; well under the bound even on a slow machine.
        assert!(
            started.elapsed() < Duration::from_secs(4),
            "shutdown took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_selection_reaches_the_upstream_port() {
        let upstream = UdpSocket::bind("127.0.0.1:0").unwrap();
        upstream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = test_config(listener.local_addr().unwrap().port());
        config.network.selection_port = upstream.local_addr().unwrap().port();

        let scene = test_scene();
        let mut subsystem = Subsystem::start(&config, &scene).unwrap();
        subsystem.select_target(&scene, "mars");

        let mut buf = [0u8; 32];
        let (len, _) = upstream.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"Mars");

        subsystem.shutdown();
    }

    #[test]
    fn test_body_spin_advances_each_frame() {
        let config = test_config(1);
        let mut scene = test_scene();
        let mut subsystem = Subsystem::start(&config, &scene).unwrap();

        let before = scene.get("earth").unwrap().spin_deg;
        let mut sink = RecordingSink::new();
        subsystem.update(&mut scene, 1.0, &mut sink);
        let after = scene.get("earth").unwrap().spin_deg;
        assert!(after > before, "spin did not advance: {} -> {}", before, after);

        subsystem.shutdown();
    }
}
