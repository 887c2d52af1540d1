use vive_bridge::openvr_adaptor::OpenVrRuntime;
use vive_bridge::poller::Poller;
use vive_bridge::session::TrackingSession;

use anyhow::{ensure, Context, Result};
use log::*;
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::thread::sleep;
use std::time::Duration;

#[derive(Debug)]
struct Options {
    interval_ms: u64,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        interval_ms: 100,
        json: false,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--interval-ms" => {
                options.interval_ms = args
                    .next()
                    .context("--interval-ms needs a value")?
                    .parse()
                    .context("--interval-ms needs milliseconds")?;
                ensure!(options.interval_ms > 0, "--interval-ms must be non-zero");
            }
            "--json" => options.json = true,
            other => warn!("ignoring unknown argument {}", other),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    let options = parse_args(std::env::args().skip(1))?;

    let runtime = OpenVrRuntime::new()?;
    let poller = Poller::start(
        TrackingSession::new(runtime),
        Duration::from_millis(options.interval_ms),
    );
    info!("polling every {} ms", options.interval_ms);

    let mut last_cycle = 0;
    let mut last_status = String::new();
    loop {
        sleep(Duration::from_millis(options.interval_ms));
        let snapshot = poller.latest();
        if snapshot.cycles == last_cycle {
            continue;
        }
        last_cycle = snapshot.cycles;
        if options.json {
            for device in &snapshot.devices {
                println!("{}", device.to_json()?);
            }
        } else if snapshot.status != last_status {
            info!("{}", snapshot.status);
            last_status = snapshot.status;
        }
    }
}
