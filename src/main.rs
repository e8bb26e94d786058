use skybridge::{SceneRegistry, StatusSink, Subsystem, SystemConfig, Transform};
use std::env;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

/// Bodies the reference producer emits, plus the observer site.
const BODIES: [&str; 15] = [
    "Sun", "Mercury", "Venus", "Earth", "Moon", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune",
    "Polaris", "Antares", "Capella", "Spica", "Ankara",
];

/// Status sink printing to stdout, deduplicating repeated readouts.
struct StdoutStatus {
    last: String,
}

impl StatusSink for StdoutStatus {
    fn display(&mut self, text: &str) {
        if text != self.last {
            println!("{}", text);
            self.last = text.to_string();
        }
    }
}

fn build_scene(config: &SystemConfig) -> SceneRegistry {
    let mut scene = SceneRegistry::new();
    for name in BODIES {
        scene.register(name, Transform::with_scale(1.0));
    }
    scene.register(&config.kinematics.mount_body, Transform::default());
    scene.register(&config.kinematics.azimuth_cylinder, Transform::default());
    scene.register(&config.kinematics.altitude_cylinder, Transform::default());
    scene.register(&config.camera.camera_name, Transform::default());
    scene
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match SystemConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => SystemConfig::default(),
    };

    let mut scene = build_scene(&config);
    let mut subsystem = match Subsystem::start(&config, &scene) {
        Ok(subsystem) => subsystem,
        Err(e) => {
            eprintln!("failed to start sync core: {}", e);
            process::exit(1);
        }
    };
    subsystem.set_unresolved_selection_hook(Box::new(|name| {
        log::warn!("selection '{}' is not a known scene object", name);
    }));

    // Optional initial target, e.g. `skybridge config.json Mars`.
    if let Some(target) = args.get(2) {
        subsystem.select_target(&scene, target);
    }

    let mut status = StdoutStatus {
        last: String::new(),
    };
    let frame = Duration::from_millis(16);
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let dt = (now - last).as_secs_f64();
        last = now;

        subsystem.update(&mut scene, dt, &mut status);
        thread::sleep(frame);
    }
}
