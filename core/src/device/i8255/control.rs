//! Control register decoding.
//!
//! Bit 7 of a control byte selects the format:
//!
//! | Bit 7 | Format             | Effect                                   |
//! |-------|--------------------|------------------------------------------|
//! | 1     | Mode definition    | Replaces mode/direction configuration    |
//! | 0     | Bit set/reset (BSR)| Sets or resets one bit of the Port C latch |
//!
//! Mode definition layout:
//!
//! | Bit | Meaning                                        |
//! |-----|------------------------------------------------|
//! | 6-5 | Group A mode (00 = 0, 01 = 1, 1x = 2)          |
//! | 4   | Port A direction (1 = input)                   |
//! | 3   | Port C upper (PC7-4) direction (1 = input)     |
//! | 2   | Group B mode (0 = 0, 1 = 1)                    |
//! | 1   | Port B direction (1 = input)                   |
//! | 0   | Port C lower (PC3-0) direction (1 = input)     |
//!
//! BSR layout: bits 3-1 select the Port C bit, bit 0 is the new value.

use super::{PORT_C, Ppi8255};

const MODE_SET_FLAG: u8 = 0x80;
const BSR_VALUE: u8 = 0x01;

/// Operating mode of a port group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Basic input/output, no handshake.
    #[default]
    Mode0,
    /// Strobed input.
    Mode1Input,
    /// Strobed output.
    Mode1Output,
    /// Bidirectional bus (Port A only).
    Mode2,
}

impl Mode {
    pub fn is_mode1(self) -> bool {
        matches!(self, Mode::Mode1Input | Mode::Mode1Output)
    }
}

/// Which control-word format a write applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFormat {
    Standard,
    Bsr,
}

/// Full mode/direction configuration carried by a mode-definition byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeConfig {
    pub mode_a: Mode,
    pub mode_b: Mode,
    pub port_a_input: bool,
    pub port_b_input: bool,
    pub port_c_upper_input: bool,
    pub port_c_lower_input: bool,
}

impl ModeConfig {
    /// Power-on configuration: every port input, both groups in Mode 0 (0x9B).
    pub const POWER_ON: Self = Self {
        mode_a: Mode::Mode0,
        mode_b: Mode::Mode0,
        port_a_input: true,
        port_b_input: true,
        port_c_upper_input: true,
        port_c_lower_input: true,
    };

    /// Decode the configuration bits of `byte`. Bit 7 is not checked.
    ///
    /// Mode 1 resolves to input or output from the direction bit of the
    /// same byte.
    pub fn decode(byte: u8) -> Self {
        let port_c_lower_input = byte & 0x01 != 0;
        let port_b_input = byte & 0x02 != 0;
        let mode_b_bit = byte & 0x04 != 0;
        let port_c_upper_input = byte & 0x08 != 0;
        let port_a_input = byte & 0x10 != 0;
        let mode_a_bits = (byte >> 5) & 0x03;

        let mode_a = match mode_a_bits {
            0b00 => Mode::Mode0,
            0b01 if port_a_input => Mode::Mode1Input,
            0b01 => Mode::Mode1Output,
            _ => Mode::Mode2,
        };
        let mode_b = match (mode_b_bit, port_b_input) {
            (false, _) => Mode::Mode0,
            (true, true) => Mode::Mode1Input,
            (true, false) => Mode::Mode1Output,
        };

        Self {
            mode_a,
            mode_b,
            port_a_input,
            port_b_input,
            port_c_upper_input,
            port_c_lower_input,
        }
    }

    /// Build the mode-definition byte for this configuration.
    ///
    /// A Mode 1 group encodes its direction from the mode itself, so
    /// `decode(encode(c))` reproduces the mode even when the direction flag
    /// disagrees. Group B has no Mode 2 and encodes it as Mode 0.
    pub fn encode(&self) -> u8 {
        let (mode_a_bits, port_a_input) = match self.mode_a {
            Mode::Mode0 => (0b00, self.port_a_input),
            Mode::Mode1Input => (0b01, true),
            Mode::Mode1Output => (0b01, false),
            Mode::Mode2 => (0b10, self.port_a_input),
        };
        let (mode_b_bit, port_b_input) = match self.mode_b {
            Mode::Mode1Input => (true, true),
            Mode::Mode1Output => (true, false),
            Mode::Mode0 | Mode::Mode2 => (false, self.port_b_input),
        };

        MODE_SET_FLAG
            | (mode_a_bits << 5)
            | (u8::from(port_a_input) << 4)
            | (u8::from(self.port_c_upper_input) << 3)
            | (u8::from(mode_b_bit) << 2)
            | (u8::from(port_b_input) << 1)
            | u8::from(self.port_c_lower_input)
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::POWER_ON
    }
}

/// A decoded control-register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord {
    Standard(ModeConfig),
    /// Set (`set = true`) or reset Port C bit `bit` (0-7).
    Bsr { bit: u8, set: bool },
}

impl ControlWord {
    pub fn decode(byte: u8) -> Self {
        if byte & MODE_SET_FLAG == 0 {
            ControlWord::Bsr {
                bit: (byte >> 1) & 0x07,
                set: byte & BSR_VALUE != 0,
            }
        } else {
            ControlWord::Standard(ModeConfig::decode(byte))
        }
    }

    /// Build a BSR byte. `bit` is masked to 0-7.
    pub fn bsr(bit: u8, set: bool) -> u8 {
        ((bit & 0x07) << 1) | u8::from(set)
    }

    pub fn format(&self) -> ControlFormat {
        match self {
            ControlWord::Standard(_) => ControlFormat::Standard,
            ControlWord::Bsr { .. } => ControlFormat::Bsr,
        }
    }
}

impl<U> Ppi8255<U> {
    /// Apply a byte written to the control register.
    ///
    /// A BSR byte touches only one bit of the Port C latch; the Port C output
    /// is left as it was. A mode-definition byte replaces the whole
    /// configuration; each group whose mode changes has its handshake
    /// flip-flops cleared, and every flag that falls fires its callback.
    pub fn decode_control(&mut self, byte: u8) -> ControlFormat {
        let word = ControlWord::decode(byte);
        match word {
            ControlWord::Bsr { bit, set } => {
                let mask = 1u8 << bit;
                if set {
                    self.latches[PORT_C] |= mask;
                } else {
                    self.latches[PORT_C] &= !mask;
                }
            }
            ControlWord::Standard(config) => {
                let previous = self.config;
                self.control = byte;
                self.config = config;
                self.reset_handshake(previous);
            }
        }
        word.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_config_encodes_to_9b() {
        assert_eq!(ModeConfig::POWER_ON.encode(), 0x9B);
        assert_eq!(ModeConfig::decode(0x9B), ModeConfig::POWER_ON);
    }

    #[test]
    fn mode1_direction_comes_from_same_byte() {
        // 0xB0: group A mode 1, PA input
        assert_eq!(ModeConfig::decode(0xB0).mode_a, Mode::Mode1Input);
        // 0xA0: group A mode 1, PA output
        assert_eq!(ModeConfig::decode(0xA0).mode_a, Mode::Mode1Output);
        // 0x86: group B mode 1, PB input
        assert_eq!(ModeConfig::decode(0x86).mode_b, Mode::Mode1Input);
        // 0x84: group B mode 1, PB output
        assert_eq!(ModeConfig::decode(0x84).mode_b, Mode::Mode1Output);
    }

    #[test]
    fn mode2_selected_by_either_high_mode_bit() {
        assert_eq!(ModeConfig::decode(0xC0).mode_a, Mode::Mode2);
        assert_eq!(ModeConfig::decode(0xE0).mode_a, Mode::Mode2);
        assert_eq!(ModeConfig::decode(0xD0).mode_a, Mode::Mode2);
    }

    #[test]
    fn every_mode_byte_survives_reencoding() {
        for byte in 0x80..=0xFFu8 {
            let config = ModeConfig::decode(byte);
            // Mode 2 encodes as 0b10 regardless of the don't-care bit 5
            let expected = if config.mode_a == Mode::Mode2 {
                byte & !0x20
            } else {
                byte
            };
            assert_eq!(config.encode(), expected, "byte 0x{byte:02X}");
        }
    }

    #[test]
    fn bsr_decoding() {
        assert_eq!(
            ControlWord::decode(0x05),
            ControlWord::Bsr { bit: 2, set: true }
        );
        assert_eq!(
            ControlWord::decode(0x0E),
            ControlWord::Bsr { bit: 7, set: false }
        );
        assert_eq!(ControlWord::bsr(2, true), 0x05);
        assert_eq!(ControlWord::bsr(7, false), 0x0E);
    }

    #[test]
    fn format_follows_bit7() {
        assert_eq!(ControlWord::decode(0x7F).format(), ControlFormat::Bsr);
        assert_eq!(ControlWord::decode(0x80).format(), ControlFormat::Standard);
    }
}
