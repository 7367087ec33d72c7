use anyhow::{Result, Context};

use clap::Parser;
use futures::SinkExt;
use kelvinator_ir::{
    climate::{ClimateCall, ClimateMode, FanMode, SwingMode, ClimateState},
    config::Port,
    controller::{ClimateIr, RecordingTransmitter},
    protocol::kelvinator::Kelvinator
};
use tracing_subscriber::EnvFilter;
use url::Url;


/// Send a command to a Kelvinator air conditioner via an IR transceiver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port the IR transceiver is attached to
    ///
    /// either serial:///device/path[?baud=N] or tcp+raw://host:port URLs supported
    port: Url,

    /// off, auto, heat_cool, cool, dry, fan_only or heat
    #[arg(long)]
    mode: ClimateMode,

    /// Target temperature in degrees C (16-30)
    #[arg(long)]
    temperature: Option<f32>,

    /// auto, low, medium or high
    #[arg(long)]
    fan: Option<FanMode>,

    /// off or vertical
    #[arg(long)]
    swing: Option<SwingMode>,

    /// Turn the display light off
    #[arg(long)]
    no_light: bool,

    /// Include the vertical swing position in the command
    #[arg(long)]
    transmit_swing: bool,

    /// Print the command without sending it
    #[arg(long)]
    dry_run: bool,
}


#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let codec = Kelvinator::new().with_swing(args.transmit_swing);
    let mut climate = ClimateIr::new(codec, RecordingTransmitter::default());

    climate.set_light(!args.no_light);

    let mut call = ClimateCall::new().with_mode(args.mode);
    call.target_temperature = args.temperature;
    call.fan_mode = args.fan;
    call.swing_mode = args.swing;

    climate.control(call)?;

    let ClimateState { mode, target_temperature, fan_mode, swing_mode, light } = climate.state();
    println!("mode={mode} temperature={target_temperature} fan={} swing={swing_mode} light={light}",
        fan_mode.map(|fan| fan.to_string()).unwrap_or_else(|| "unset".to_string()));

    let frames = climate.transmitter().sent.clone();

    for data in frames.iter() {
        println!("{:02x?}", data.bytes());
    }

    if args.dry_run {
        return Ok(())
    }

    let mut framed = Port::open(&args.port).await?.framed();

    for data in frames {
        framed.send(data).await
            .with_context(|| format!("failed to send to {}", args.port))?;
    }

    Ok(())
}
