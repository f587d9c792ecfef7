use std::{io::Read, path::PathBuf};

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_time::{Delay, Duration, Timer};
use mwb_core::{
    mk_static,
    utils::{
        controllers::{self, DriveMixer, Supervisor},
        sensors::{DistanceSensor, NO_ECHO_CM},
        sim::{self, SimOutput},
        DriveConfig, SupervisorConfig,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON file with `drive` and/or `supervisor` sections
    #[clap(long)]
    config: Option<PathBuf>,
    /// forward cruise speed (fraction of max)
    #[clap(long)]
    cruise_speed: Option<f32>,
    /// obstacle distance threshold in cm
    #[clap(long)]
    threshold: Option<f32>,
    /// start in the driving state instead of waiting for `i`
    #[clap(long)]
    autostart: bool,
    /// print the effective configuration as JSON and exit
    #[clap(long)]
    dump_config: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SimConfig {
    drive: DriveConfig,
    supervisor: SupervisorConfig,
}

/// Synthetic wall that closes in on the robot a few centimeters per tick and jumps
/// back out once it has been reached, with an occasional missing echo.
struct ApproachingWall {
    distance: f32,
    start: f32,
    step: f32,
    reads: u32,
}

impl ApproachingWall {
    fn new(start: f32) -> Self {
        Self {
            distance: start,
            start,
            step: 4.0,
            reads: 0,
        }
    }
}

impl DistanceSensor for ApproachingWall {
    fn read_distance_cm(&mut self) -> f32 {
        self.reads += 1;
        if self.reads % 7 == 0 {
            return NO_ECHO_CM;
        }
        let d = self.distance;
        self.distance = if d <= self.step { self.start } else { d - self.step };
        d
    }
}

#[embassy_executor::task]
async fn control_task(
    mut supervisor: Supervisor,
    mut mixer: DriveMixer<SimOutput>,
    mut sensor: ApproachingWall,
    period: Duration,
) -> ! {
    let mut delay = Delay;
    loop {
        let command = controllers::next_command();
        match supervisor.tick(&mut mixer, &mut sensor, &mut delay, command) {
            Ok(report) => {
                if let Some(cmd) = report.command {
                    info!(?cmd, state = ?report.state, "command applied");
                }
                debug!(
                    state = ?report.state,
                    distance_cm = ?report.distance_cm,
                    avoided = report.avoided,
                    wheels = ?mixer.snapshot(),
                    "tick"
                );
            }
            Err(e) => error!(?e, "hardware fault during tick"),
        }
        Timer::after(period).await;
    }
}

/// Forward stdin bytes to the command channel from a plain thread.
fn spawn_stdin_reader() {
    std::thread::spawn(|| {
        for byte in std::io::stdin().bytes() {
            match byte {
                Ok(b) => {
                    controllers::submit(b);
                }
                Err(e) => {
                    warn!(?e, "stdin closed");
                    break;
                }
            }
        }
    });
}

fn load_config(opts: &Opts) -> Result<SimConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &opts.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    if let Some(speed) = opts.cruise_speed {
        cfg.supervisor.cruise_speed = speed;
    }
    if let Some(threshold) = opts.threshold {
        cfg.supervisor.near_threshold_cm = threshold;
    }
    Ok(cfg)
}

#[embassy_executor::task]
async fn main_task(
    spawner: Spawner,
    cfg: SimConfig,
    autostart: bool,
) {
    let mixer = match DriveMixer::from_config(&cfg.drive, sim::outputs(&cfg.drive)) {
        Ok(mixer) => mixer,
        Err(e) => {
            error!(?e, "invalid motor mapping");
            std::process::exit(1);
        }
    };
    let supervisor = Supervisor::new(cfg.supervisor);

    if autostart {
        controllers::submit(b'i');
    }
    spawn_stdin_reader();

    info!("Auto-drive with obstacle avoidance: `i` to go, `o` to stop");
    spawner
        .spawn(control_task(
            supervisor,
            mixer,
            ApproachingWall::new(60.0),
            cfg.supervisor.tick_period(),
        ))
        .unwrap();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let cfg = match load_config(&opts) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if opts.dump_config {
        match serde_json::to_string_pretty(&cfg) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("failed to serialize configuration: {}", e),
        }
        return;
    }

    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, cfg, opts.autostart)).unwrap();
    });
}
