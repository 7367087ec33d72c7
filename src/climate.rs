//! Device-agnostic climate state.
//!
//! This is the model the codec reads from when transmitting and writes into
//! when a command is received. The codec never keeps its own copy.

use strum_macros::{Display, EnumIter, EnumString};

pub const TEMPERATURE_MIN: u8 = 16;
pub const TEMPERATURE_MAX: u8 = 30;

/// Setpoint the unit forces in auto and fan-only modes.
pub const TEMPERATURE_AUTO: u8 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ClimateMode {
    Off,
    Auto,
    HeatCool,
    Cool,
    Dry,
    FanOnly,
    Heat
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FanMode {
    Auto,
    Low,
    Medium,
    High
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SwingMode {
    Off,
    Vertical
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClimateState {
    pub mode: ClimateMode,

    /// Degrees Celsius. The unit only understands whole degrees.
    pub target_temperature: f32,

    /// `None` means "not set", which the unit treats as auto.
    pub fan_mode: Option<FanMode>,

    pub swing_mode: SwingMode,

    /// Front panel display light.
    pub light: bool,
}

impl Default for ClimateState {
    fn default() -> Self {
        Self {
            mode: ClimateMode::Off,
            target_temperature: TEMPERATURE_AUTO as f32,
            fan_mode: Some(FanMode::Auto),
            swing_mode: SwingMode::Off,
            light: true,
        }
    }
}

/// A partial change requested by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClimateCall {
    pub mode: Option<ClimateMode>,
    pub target_temperature: Option<f32>,
    pub fan_mode: Option<FanMode>,
    pub swing_mode: Option<SwingMode>,
}

impl ClimateCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ClimateMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_target_temperature(mut self, temperature: f32) -> Self {
        self.target_temperature = Some(temperature);
        self
    }

    pub fn with_fan_mode(mut self, fan_mode: FanMode) -> Self {
        self.fan_mode = Some(fan_mode);
        self
    }

    pub fn with_swing_mode(mut self, swing_mode: SwingMode) -> Self {
        self.swing_mode = Some(swing_mode);
        self
    }

    /// Merge the requested fields into `state`.
    ///
    /// Temperatures are clamped to the range the unit accepts.
    pub fn apply(&self, state: &mut ClimateState) {
        if let Some(mode) = self.mode {
            state.mode = mode;
        }

        if let Some(temperature) = self.target_temperature {
            state.target_temperature = temperature.clamp(TEMPERATURE_MIN as f32, TEMPERATURE_MAX as f32);
        }

        if let Some(fan_mode) = self.fan_mode {
            state.fan_mode = Some(fan_mode);
        }

        if let Some(swing_mode) = self.swing_mode {
            state.swing_mode = swing_mode;
        }
    }
}

/// Fields recovered from a received command.
#[derive(Clone, Debug, PartialEq)]
pub struct StateUpdate {
    /// `None` when the unit reported a mode we don't recognise;
    /// the previous mode is kept in that case.
    pub mode: Option<ClimateMode>,

    pub target_temperature: f32,

    pub fan_mode: FanMode,
}

impl StateUpdate {
    pub fn apply(&self, state: &mut ClimateState) {
        if let Some(mode) = self.mode {
            state.mode = mode;
        }

        state.target_temperature = self.target_temperature;
        state.fan_mode = Some(self.fan_mode);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("fan_only".parse::<ClimateMode>().unwrap(), ClimateMode::FanOnly);
        assert_eq!("heat_cool".parse::<ClimateMode>().unwrap(), ClimateMode::HeatCool);
        assert_eq!("high".parse::<FanMode>().unwrap(), FanMode::High);
        assert_eq!("vertical".parse::<SwingMode>().unwrap(), SwingMode::Vertical);
        assert!("turbo".parse::<FanMode>().is_err());

        assert_eq!(ClimateMode::FanOnly.to_string(), "fan_only");
    }

    #[test]
    fn test_call_apply() {
        let mut state = ClimateState::default();

        ClimateCall::new()
            .with_mode(ClimateMode::Cool)
            .with_target_temperature(40.0)
            .with_fan_mode(FanMode::Low)
            .apply(&mut state);

        assert_eq!(state.mode, ClimateMode::Cool);
        assert_eq!(state.target_temperature, 30.0);
        assert_eq!(state.fan_mode, Some(FanMode::Low));
        assert_eq!(state.swing_mode, SwingMode::Off);

        ClimateCall::new().with_target_temperature(10.0).apply(&mut state);
        assert_eq!(state.target_temperature, 16.0);
    }

    #[test]
    fn test_update_keeps_mode_when_unknown() {
        let mut state = ClimateState {
            mode: ClimateMode::Heat,
            ..Default::default()
        };

        StateUpdate {
            mode: None,
            target_temperature: 21.0,
            fan_mode: FanMode::Medium
        }.apply(&mut state);

        assert_eq!(state.mode, ClimateMode::Heat);
        assert_eq!(state.target_temperature, 21.0);
        assert_eq!(state.fan_mode, Some(FanMode::Medium));
    }
}
