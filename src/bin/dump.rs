use std::time::SystemTime;

use anyhow::Result;

use clap::Parser;
use colored::{Colorize, ColoredString};
use futures::StreamExt;
use kelvinator_ir::{
    climate::ClimateState,
    config::Port,
    protocol::{codec::RxFrame, command::KelvinatorCommand, kelvinator::{ClimateIrCodec, Kelvinator}}
};
use tracing_subscriber::EnvFilter;
use url::Url;


/// Print every Kelvinator command seen by an IR transceiver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path[?baud=N] or tcp+raw://host:port URLs supported
    port: Url,
}

fn delta_ms(time: Option<SystemTime>) -> u128 {
    time.and_then(|time| time.elapsed().ok())
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

fn describe(state: &ClimateState, cmd: Option<&KelvinatorCommand>) -> String {
    let fan = state.fan_mode.map(|fan| fan.to_string()).unwrap_or_default();
    let extras = cmd.map(|cmd| format!(" light={} swing_v={} turbo={}", cmd.light, *cmd.swing_v, cmd.turbo))
        .unwrap_or_default();

    format!("mode={:<9} temp={:>4} fan={fan:<6}{extras}", state.mode.to_string(), state.target_temperature)
}

fn coloured(powered: bool, line: String) -> ColoredString {
    if powered {
        line.on_green().bright_white()
    } else {
        line.on_blue().bright_white()
    }
}


#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut framed = Port::open(&args.port).await?.framed();

    let codec = Kelvinator::new();
    let mut state = ClimateState::default();

    let start_time = SystemTime::now();
    let mut last_frame_time: Option<SystemTime> = None;

    while let Some(frame) = framed.next().await {
        let start_delta_ms = delta_ms(Some(start_time));
        let last_frame_delta_ms = delta_ms(last_frame_time);
        last_frame_time = Some(SystemTime::now());

        let data = match frame? {
            RxFrame::Command(data) => data,
            RxFrame::Corrupted(bytes) => {
                let line = format!("[{start_delta_ms:8}, {last_frame_delta_ms:8}] corrupted frame: {bytes:02x?}");
                println!("{}", line.on_red().bright_white());
                continue;
            },
        };

        let update = match codec.decode(&data.data) {
            Ok(update) => update,
            Err(err) => {
                println!("[{start_delta_ms:8}, {last_frame_delta_ms:8}] {err}");
                continue;
            }
        };

        update.apply(&mut state);

        let cmd = KelvinatorCommand::from_words([data.data[0], data.data[1]]).ok();
        let powered = cmd.as_ref().map(|cmd| cmd.power).unwrap_or(false);

        let line = format!("[{start_delta_ms:8}, {last_frame_delta_ms:8}] {:02x?} {}", data.bytes(), describe(&state, cmd.as_ref()));

        println!("{}", coloured(powered, line));
    }

    Ok(())
}
