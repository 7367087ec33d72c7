//! Translation between [`ClimateState`] and [`KelvinatorCommand`].

use thiserror::Error;
use tracing::debug;

use crate::climate::{ClimateCall, ClimateMode, ClimateState, FanMode, StateUpdate, SwingMode, TEMPERATURE_AUTO, TEMPERATURE_MIN};

use super::checksum::{ChecksumError, KelvinatorData};
use super::command::{BasicFan, KelvinatorCommand, Mode, VerticalSwing};


#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("expected at least {expected} data words, got {actual}")]
    TooShort {
        expected: usize,
        actual: usize
    },
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
    #[error("unpack failed: {0:?}")]
    Packing(packed_struct::PackingError),
}

impl From<packed_struct::PackingError> for DecodeError {
    fn from(err: packed_struct::PackingError) -> Self {
        DecodeError::Packing(err)
    }
}


impl From<ClimateMode> for Mode {
    fn from(value: ClimateMode) -> Self {
        match value {
            ClimateMode::Cool => Self::Cool,
            ClimateMode::Dry => Self::Dry,
            ClimateMode::FanOnly => Self::Fan,
            ClimateMode::Heat => Self::Heat,
            // the mode field still needs a value when powered off
            ClimateMode::HeatCool | ClimateMode::Auto | ClimateMode::Off => Self::Auto,
        }
    }
}

impl From<Mode> for ClimateMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Auto => Self::HeatCool,
            Mode::Cool => Self::Cool,
            Mode::Dry => Self::Dry,
            Mode::Fan => Self::FanOnly,
            Mode::Heat => Self::Heat,
        }
    }
}

impl From<Option<FanMode>> for BasicFan {
    fn from(value: Option<FanMode>) -> Self {
        match value {
            None | Some(FanMode::Auto) => Self::Auto,
            Some(FanMode::High) => Self::Max,
            Some(FanMode::Medium) => Self::Medium,
            Some(FanMode::Low) => Self::Min,
        }
    }
}

impl From<BasicFan> for FanMode {
    fn from(value: BasicFan) -> Self {
        match value {
            BasicFan::Auto => Self::Auto,
            BasicFan::Max => Self::High,
            BasicFan::Medium => Self::Medium,
            BasicFan::Min => Self::Low,
        }
    }
}

impl From<SwingMode> for VerticalSwing {
    fn from(value: SwingMode) -> Self {
        match value {
            SwingMode::Off => Self::Off,
            SwingMode::Vertical => Self::Auto,
        }
    }
}


/// An IR climate protocol.
///
/// The external climate controller calls `adjust_call` before merging a user
/// request, `encode` to produce the payload to transmit, and `decode` for
/// every payload received.
pub trait ClimateIrCodec {
    fn encode(&self, state: &ClimateState) -> KelvinatorData;

    fn decode(&self, data: &[u64]) -> Result<StateUpdate, DecodeError>;

    fn adjust_call(&self, state: &ClimateState, call: &mut ClimateCall);
}


/// Kelvinator (and rebadged Gree) air conditioners.
#[derive(Clone, Copy, Debug, Default)]
pub struct Kelvinator {
    /// Transmit the vertical swing position.
    ///
    /// Off by default: existing installations only ever sent swing off.
    pub transmit_swing: bool,
}

impl Kelvinator {
    /// Number of data words needed to decode a command.
    pub const MIN_WORDS: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_swing(mut self, transmit_swing: bool) -> Self {
        self.transmit_swing = transmit_swing;
        self
    }

    /// Build the (unchecksummed) command for `state`.
    pub fn command(&self, state: &ClimateState) -> KelvinatorCommand {
        let mut cmd = KelvinatorCommand::default();

        cmd.power = state.mode != ClimateMode::Off;
        cmd.set_mode(state.mode.into());
        cmd.set_temp(temperature_offset(state.target_temperature));
        cmd.light = state.light;
        cmd.set_basic_fan(state.fan_mode.into());

        if self.transmit_swing {
            cmd.set_swing_v(state.swing_mode.into());
        }

        cmd.mirror_header();
        cmd.write_markers();

        cmd
    }
}

/// Whole degrees above the minimum; fractions are dropped.
fn temperature_offset(temperature: f32) -> u8 {
    (temperature - TEMPERATURE_MIN as f32) as u8
}

impl ClimateIrCodec for Kelvinator {
    fn encode(&self, state: &ClimateState) -> KelvinatorData {
        let cmd = self.command(state);

        let mut data = KelvinatorData::from(cmd.to_words());
        data.apply_checksum();

        data
    }

    fn decode(&self, data: &[u64]) -> Result<StateUpdate, DecodeError> {
        if data.len() < Self::MIN_WORDS {
            return Err(DecodeError::TooShort { expected: Self::MIN_WORDS, actual: data.len() })
        }

        let words = [data[0], data[1]];
        KelvinatorData::from(words).validate_checksum()?;

        let cmd = KelvinatorCommand::from_words(words)?;

        let mode = if cmd.power {
            cmd.mode().map(ClimateMode::from)
        } else {
            Some(ClimateMode::Off)
        };

        if cmd.power && mode.is_none() {
            debug!("unknown mode {}, keeping previous mode", *cmd.mode);
        }

        Ok(StateUpdate {
            mode,
            target_temperature: (cmd.temp() + TEMPERATURE_MIN) as f32,
            fan_mode: cmd.basic_fan().map(FanMode::from).unwrap_or(FanMode::Auto),
        })
    }

    fn adjust_call(&self, state: &ClimateState, call: &mut ClimateCall) {
        let mode = if let Some(mode) = call.mode { mode } else { return };

        // swing resets after the unit is powered off
        if mode == ClimateMode::Off {
            call.swing_mode = Some(SwingMode::Off);
        }

        // the unit ignores the setpoint in auto and fan only modes
        if matches!(mode, ClimateMode::Auto | ClimateMode::FanOnly) {
            let auto = TEMPERATURE_AUTO as f32;
            let target = call.target_temperature.unwrap_or(state.target_temperature);

            if target != auto {
                debug!("Resetting temperature to {TEMPERATURE_AUTO} degrees.");
            }

            call.target_temperature = Some(auto);
        }
    }
}
