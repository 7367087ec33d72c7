use packed_struct::prelude::*;
use packed_struct::PackingError;

pub const FRAME_SIZE: usize = 16;
pub const BLOCK_SIZE: usize = 8;

/// Fixed value of byte 3 (end of the first command block).
pub const BLOCK1_MARKER: u8 = 0x50;

/// Fixed value of byte 11 (end of the second command block).
pub const BLOCK2_MARKER: u8 = 0x70;

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Auto = 0,
    Cool = 1,
    Dry = 2,
    Fan = 3,
    Heat = 4
}

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasicFan {
    Auto = 0,
    Min = 1,
    Medium = 2,
    Max = 3
}

#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalSwing {
    Off = 0b0000,
    Auto = 0b0001,
    // the unit also supports fixed positions (0b0010..=0b0110) and
    // partial sweeps (0b0111, 0b1001, 0b1011); not modelled.
}


/// A complete 16 byte Kelvinator IR command.
///
/// Two 8 byte blocks, each ending in a nibble checksum. Bytes 8-10 repeat
/// bytes 0-2. Bit ranges are msb0 (bit 0 is the most significant bit of
/// byte 0), so a field in the low nibble of byte 1 lives at bits 12..=15.
///
/// Enum-valued fields are kept as raw integers so that a command with
/// unknown values still unpacks; use the typed accessors to interpret them.
#[derive(PackedStruct, Clone, Copy, Debug, Default)]
#[packed_struct(bit_numbering="msb0", size_bytes="16")]
pub struct KelvinatorCommand {
    // byte 0

    /// Sleep modes 1 & 3
    #[packed_field(bits="0")]
    pub sleep: bool,

    #[packed_field(bits="1")]
    pub swing_auto: bool,

    #[packed_field(bits="2:3")]
    pub basic_fan: Integer<u8, packed_bits::Bits::<2>>,

    #[packed_field(bits="4")]
    pub power: bool,

    #[packed_field(bits="5:7")]
    pub mode: Integer<u8, packed_bits::Bits::<3>>,

    // byte 1

    #[packed_field(bits="8:11")]
    pub unknown_byte1_high: Integer<u8, packed_bits::Bits::<4>>,

    /// Setpoint, degrees C above `TEMPERATURE_MIN`
    #[packed_field(bits="12:15")]
    pub temp: Integer<u8, packed_bits::Bits::<4>>,

    // byte 2

    #[packed_field(bits="16")]
    pub x_fan: bool,

    #[packed_field(bits="17")]
    pub ion_filter: bool,

    #[packed_field(bits="18")]
    pub light: bool,

    #[packed_field(bits="19")]
    pub turbo: bool,

    #[packed_field(bits="20:23")]
    pub unknown_byte2_low: Integer<u8, packed_bits::Bits::<4>>,

    // byte 3

    #[packed_field(bytes="3")]
    pub block1_marker: u8,

    // byte 4

    #[packed_field(bits="32:34")]
    pub unknown_byte4_high: Integer<u8, packed_bits::Bits::<3>>,

    #[packed_field(bits="35")]
    pub swing_h: bool,

    #[packed_field(bits="36:39")]
    pub swing_v: Integer<u8, packed_bits::Bits::<4>>,

    // bytes 5-6

    /// Timer related. Zero unless a timer is set.
    #[packed_field(bytes="5..=6")]
    pub timer: [u8; 2],

    // byte 7

    #[packed_field(bits="56:59")]
    pub sum1: Integer<u8, packed_bits::Bits::<4>>,

    #[packed_field(bits="60:63")]
    pub timer_low: Integer<u8, packed_bits::Bits::<4>>,

    // bytes 8-10

    /// Repeat of bytes 0-2
    #[packed_field(bytes="8..=10")]
    pub repeat: [u8; 3],

    // byte 11

    #[packed_field(bytes="11")]
    pub block2_marker: u8,

    // byte 12

    #[packed_field(bits="96")]
    pub quiet: bool,

    /// Sleep mode 3
    #[packed_field(bits="97:102")]
    pub sleep3: Integer<u8, packed_bits::Bits::<6>>,

    /// Sleep mode 2
    #[packed_field(bits="103")]
    pub sleep2: bool,

    // byte 13

    #[packed_field(bytes="13")]
    pub sleep3_ext: u8,

    // byte 14

    #[packed_field(bits="112")]
    pub unknown_bit112: bool,

    /// Extended fan speed (0-5), unused by the basic fan control
    #[packed_field(bits="113:115")]
    pub fan: Integer<u8, packed_bits::Bits::<3>>,

    #[packed_field(bits="116:119")]
    pub sleep3_low: Integer<u8, packed_bits::Bits::<4>>,

    // byte 15

    #[packed_field(bits="120:123")]
    pub sum2: Integer<u8, packed_bits::Bits::<4>>,

    #[packed_field(bits="124:127")]
    pub unknown_byte15_low: Integer<u8, packed_bits::Bits::<4>>,
}

impl KelvinatorCommand {
    pub fn from_bytes(bytes: &[u8; FRAME_SIZE]) -> Result<Self, PackingError> {
        Self::unpack(bytes)
    }

    /// Load a command from the two transport data words.
    ///
    /// Each word carries one block, least significant byte first.
    pub fn from_words(words: [u64; 2]) -> Result<Self, PackingError> {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[..BLOCK_SIZE].copy_from_slice(&words[0].to_le_bytes());
        bytes[BLOCK_SIZE..].copy_from_slice(&words[1].to_le_bytes());

        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        // every field is a bool, a byte or a width-checked `Integer`
        self.pack().expect("pack KelvinatorCommand")
    }

    pub fn to_words(&self) -> [u64; 2] {
        let bytes = self.to_bytes();

        let mut block1 = [0u8; BLOCK_SIZE];
        let mut block2 = [0u8; BLOCK_SIZE];
        block1.copy_from_slice(&bytes[..BLOCK_SIZE]);
        block2.copy_from_slice(&bytes[BLOCK_SIZE..]);

        [u64::from_le_bytes(block1), u64::from_le_bytes(block2)]
    }

    pub fn mode(&self) -> Option<Mode> {
        Mode::from_primitive(*self.mode)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode.to_primitive().into();
    }

    pub fn basic_fan(&self) -> Option<BasicFan> {
        BasicFan::from_primitive(*self.basic_fan)
    }

    pub fn set_basic_fan(&mut self, fan: BasicFan) {
        self.basic_fan = fan.to_primitive().into();
    }

    pub fn swing_v(&self) -> Option<VerticalSwing> {
        VerticalSwing::from_primitive(*self.swing_v)
    }

    pub fn set_swing_v(&mut self, swing: VerticalSwing) {
        self.swing_v = swing.to_primitive().into();
    }

    pub fn temp(&self) -> u8 {
        *self.temp
    }

    /// Only the low nibble is kept.
    pub fn set_temp(&mut self, temp: u8) {
        self.temp = (temp & 0x0f).into();
    }

    pub fn sum1(&self) -> u8 {
        *self.sum1
    }

    pub fn sum2(&self) -> u8 {
        *self.sum2
    }

    /// Copy the mode/power/fan/temperature/light block (bytes 0-2)
    /// into bytes 8-10.
    pub fn mirror_header(&mut self) {
        let bytes = self.to_bytes();
        self.repeat.copy_from_slice(&bytes[0..3]);
    }

    pub fn write_markers(&mut self) {
        self.block1_marker = BLOCK1_MARKER;
        self.block2_marker = BLOCK2_MARKER;
    }
}
