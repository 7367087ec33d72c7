use tracing::debug;

use crate::climate::{ClimateCall, ClimateState};
use crate::protocol::checksum::KelvinatorData;
use crate::protocol::kelvinator::ClimateIrCodec;


/// Something that can put a payload on the air.
pub trait Transmitter {
    type Error: std::error::Error + Send + Sync + 'static;

    fn transmit(&mut self, data: &KelvinatorData) -> Result<(), Self::Error>;
}

/// Collects transmitted payloads in memory.
#[derive(Debug, Default)]
pub struct RecordingTransmitter {
    pub sent: Vec<KelvinatorData>,
}

impl Transmitter for RecordingTransmitter {
    type Error = std::convert::Infallible;

    fn transmit(&mut self, data: &KelvinatorData) -> Result<(), Self::Error> {
        self.sent.push(data.clone());
        Ok(())
    }
}


type PublishFn = Box<dyn FnMut(&ClimateState) + Send>;

/// Holds the climate state for one IR controlled unit and drives a codec
/// and a transmitter from it.
pub struct ClimateIr<C, T> {
    codec: C,
    transmitter: T,
    state: ClimateState,
    on_publish: Option<PublishFn>,
}

impl<C, T> ClimateIr<C, T> where
    C: ClimateIrCodec,
    T: Transmitter
{
    pub fn new(codec: C, transmitter: T) -> Self {
        Self::with_state(codec, transmitter, ClimateState::default())
    }

    pub fn with_state(codec: C, transmitter: T, state: ClimateState) -> Self {
        Self {
            codec,
            transmitter,
            state,
            on_publish: None,
        }
    }

    /// Called with the new state whenever a received command changes it.
    pub fn on_publish<F>(&mut self, callback: F) where
        F: FnMut(&ClimateState) + Send + 'static
    {
        self.on_publish = Some(Box::new(callback));
    }

    pub fn state(&self) -> &ClimateState {
        &self.state
    }

    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    pub fn set_light(&mut self, enabled: bool) {
        self.state.light = enabled;
    }

    /// Apply a user request and send the resulting state to the unit.
    pub fn control(&mut self, mut call: ClimateCall) -> Result<(), T::Error> {
        self.codec.adjust_call(&self.state, &mut call);
        call.apply(&mut self.state);

        self.transmit_state()
    }

    pub fn transmit_state(&mut self) -> Result<(), T::Error> {
        let data = self.codec.encode(&self.state);
        data.log();

        self.transmitter.transmit(&data)
    }

    /// Feed a received payload through the codec.
    ///
    /// Returns `false`, leaving the state untouched, if the payload
    /// isn't a valid command for this protocol.
    pub fn on_receive(&mut self, data: &[u64]) -> bool {
        let update = match self.codec.decode(data) {
            Ok(update) => update,
            Err(err) => {
                debug!("ignoring received data: {err}");
                return false
            }
        };

        KelvinatorData::new(data.to_vec()).log();

        update.apply(&mut self.state);
        self.publish_state();

        true
    }

    fn publish_state(&mut self) {
        match self.on_publish.as_mut() {
            Some(callback) => callback(&self.state),
            None => debug!("state changed: {:?}", self.state),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::climate::{ClimateMode, FanMode, SwingMode};
    use crate::protocol::kelvinator::Kelvinator;

    use super::*;

    fn controller() -> ClimateIr<Kelvinator, RecordingTransmitter> {
        ClimateIr::new(Kelvinator::new(), RecordingTransmitter::default())
    }

    #[test]
    fn test_control_transmits() {
        let mut climate = controller();

        climate.control(ClimateCall::new()
            .with_mode(ClimateMode::Cool)
            .with_target_temperature(24.0)
            .with_fan_mode(FanMode::High)
        ).unwrap();

        let sent = &climate.transmitter().sent;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].validate_checksum().is_ok());

        let update = Kelvinator::new().decode(&sent[0].data).unwrap();
        assert_eq!(update.mode, Some(ClimateMode::Cool));
        assert_eq!(update.target_temperature, 24.0);
        assert_eq!(update.fan_mode, FanMode::High);
    }

    #[test]
    fn test_control_business_rules() {
        let mut climate = ClimateIr::with_state(Kelvinator::new(), RecordingTransmitter::default(), ClimateState {
            mode: ClimateMode::Cool,
            target_temperature: 19.0,
            swing_mode: SwingMode::Vertical,
            ..Default::default()
        });

        climate.control(ClimateCall::new().with_mode(ClimateMode::FanOnly)).unwrap();
        assert_eq!(climate.state().target_temperature, 25.0);
        assert_eq!(climate.state().swing_mode, SwingMode::Vertical);

        climate.control(ClimateCall::new().with_mode(ClimateMode::Off)).unwrap();
        assert_eq!(climate.state().swing_mode, SwingMode::Off);
        assert_eq!(climate.state().mode, ClimateMode::Off);

        assert_eq!(climate.transmitter().sent.len(), 2);
    }

    #[test]
    fn test_set_light() {
        let mut climate = controller();

        climate.set_light(false);
        climate.transmit_state().unwrap();

        let bytes = climate.transmitter().sent[0].bytes();
        assert_eq!(bytes[2] & 0x20, 0);

        climate.set_light(true);
        climate.transmit_state().unwrap();

        let bytes = climate.transmitter().sent[1].bytes();
        assert_eq!(bytes[2] & 0x20, 0x20);
    }

    #[test]
    fn test_on_receive_publishes() {
        let published = Arc::new(Mutex::new(Vec::new()));

        let mut climate = controller();
        climate.on_publish({
            let published = published.clone();
            move |state| published.lock().unwrap().push(state.clone())
        });

        let data = Kelvinator::new().encode(&ClimateState {
            mode: ClimateMode::Heat,
            target_temperature: 27.0,
            fan_mode: Some(FanMode::Medium),
            ..Default::default()
        });

        assert!(climate.on_receive(&data.data));
        assert_eq!(climate.state().mode, ClimateMode::Heat);
        assert_eq!(climate.state().target_temperature, 27.0);
        assert_eq!(climate.state().fan_mode, Some(FanMode::Medium));

        let published = published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(&published[0], climate.state());
    }

    #[test]
    fn test_on_receive_rejects_without_mutation() {
        let mut climate = controller();
        let before = climate.state().clone();

        assert!(!climate.on_receive(&[]));

        let data = Kelvinator::new().encode(&ClimateState {
            mode: ClimateMode::Heat,
            ..Default::default()
        });
        assert!(!climate.on_receive(&data.data[..1]));

        let mut corrupted = data.data.clone();
        corrupted[1] ^= 0x0400;
        assert!(!climate.on_receive(&corrupted));

        assert_eq!(climate.state(), &before);
    }
}
