//! Intel 8255 Programmable Peripheral Interface (PPI)
//!
//! Three 8-bit ports (A, B, C) and a control register, addressed by A1:A0:
//!
//! | Offset | Read                        | Write                      |
//! |--------|-----------------------------|----------------------------|
//! | 0      | Port A                      | Port A                     |
//! | 1      | Port B                      | Port B                     |
//! | 2      | Port C                      | Port C                     |
//! | 3      | invalid (0xFF)              | Control word (mode or BSR) |
//!
//! Ports are split into two groups: group A is Port A plus the upper half of
//! Port C, group B is Port B plus the lower half. Group A supports Modes 0, 1
//! and 2; group B supports Modes 0 and 1. Mode 1 adds a strobe/acknowledge
//! handshake with IBF, OBF and INTR flip-flops per group; the board wires
//! those signals through a [`Callbacks`] set.
//!
//! Every data-port access passes through an access policy first (see
//! [`Ppi8255::check_access`]). Illegal reads return 0xFF and illegal writes
//! only reach the latch, never the output pins.

mod access;
mod control;
mod handshake;
mod signals;
mod state;

pub use access::{Access, Op};
pub use control::{ControlFormat, ControlWord, Mode, ModeConfig};
pub use handshake::{Group, Handshake};
pub use signals::{Callbacks, DataCallback, LineCallback};
pub use state::PpiState;

use crate::core::IoDevice;

pub(crate) const PORT_A: usize = 0;
pub(crate) const PORT_B: usize = 1;
pub(crate) const PORT_C: usize = 2;
const CONTROL: u8 = 3;

/// Value returned by illegal or unmapped reads.
pub const OPEN_BUS: u8 = 0xFF;

pub(crate) fn port_name(port: usize) -> char {
    match port {
        PORT_A => 'A',
        PORT_B => 'B',
        PORT_C => 'C',
        _ => '?',
    }
}

/// Intel 8255 PPI with user context `U` handed to every signal callback.
pub struct Ppi8255<U = ()> {
    pub(crate) latches: [u8; 3], // Last value written per port
    pub(crate) outputs: [u8; 3], // Levels driven on output pins
    pub(crate) inputs: [u8; 3],  // Levels supplied by external hardware
    pub(crate) control: u8,      // Last mode-definition byte (diagnostic)
    pub(crate) config: ModeConfig,
    pub(crate) handshake: [Handshake; 2],

    pub(crate) callbacks: Callbacks<U>,
    pub(crate) user: U,
}

impl<U: Default> Ppi8255<U> {
    /// Create a PPI in its power-on state with no callbacks installed.
    pub fn new() -> Self {
        Self::with_callbacks(Callbacks::none(), U::default())
    }
}

impl<U: Default> Default for Ppi8255<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> Ppi8255<U> {
    /// Create a PPI in its power-on state wired to `callbacks`.
    pub fn with_callbacks(callbacks: Callbacks<U>, user: U) -> Self {
        Self {
            latches: [0; 3],
            outputs: [0; 3],
            inputs: [0; 3],
            control: ModeConfig::POWER_ON.encode(),
            config: ModeConfig::POWER_ON,
            handshake: [Handshake::default(); 2],
            callbacks,
            user,
        }
    }

    /// Return to the power-on state and install a new callback set and user
    /// context. `None` installs a set with every callback absent.
    ///
    /// Power-on: all latches and pins zero, control word 0x9B (every port
    /// input, both groups Mode 0), all handshake flip-flops clear.
    pub fn init(&mut self, callbacks: Option<Callbacks<U>>, user: U) {
        *self = Self::with_callbacks(callbacks.unwrap_or_default(), user);
    }

    /// Bus read from register `offset` (masked to 0-3).
    ///
    /// Data ports go through the access policy: Ok returns the pin levels,
    /// Warn returns the output latch, Illegal/Unknown return 0xFF. The
    /// control register is write-only and always reads 0xFF.
    pub fn read(&mut self, offset: u8) -> u8 {
        let port = offset & 0x03;
        if port == CONTROL {
            return OPEN_BUS;
        }
        match self.check_access(port, Op::Read) {
            Access::Ok => self.pins(port as usize),
            Access::Warn => self.latches[port as usize],
            Access::Illegal | Access::Unknown => OPEN_BUS,
        }
    }

    /// Bus write of `data` to register `offset` (masked to 0-3).
    ///
    /// A data-port write always lands in the port latch, even when the
    /// access policy rejects it; only legal writes reach the output pins.
    /// Offset 3 goes to the control-word decoder.
    pub fn write(&mut self, offset: u8, data: u8) {
        let port = offset & 0x03;
        if port == CONTROL {
            let format = self.decode_control(data);
            log::debug!(
                "PPI control write 0x{data:02X} ({format:?}): mode_a={:?} mode_b={:?}",
                self.config.mode_a,
                self.config.mode_b
            );
            return;
        }
        let p = port as usize;
        self.latches[p] = data;
        match self.check_access(port, Op::Write) {
            Access::Ok | Access::Warn => self.outputs[p] = data,
            Access::Illegal | Access::Unknown => {}
        }
    }

    /// Set the levels external hardware drives onto a port's pins
    /// (`port` masked to 0-3; 3 is ignored).
    pub fn set_input(&mut self, port: u8, data: u8) {
        if let Some(input) = self.inputs.get_mut((port & 0x03) as usize) {
            *input = data;
        }
    }

    // Pin levels seen by a legal read: input pins for input-direction bits,
    // the driven output for output-direction bits. Mode 2 is bidirectional
    // and always reads the input side.
    fn pins(&self, port: usize) -> u8 {
        let c = &self.config;
        match port {
            PORT_A if c.mode_a == Mode::Mode2 || c.port_a_input => self.inputs[PORT_A],
            PORT_A => self.outputs[PORT_A],
            PORT_B if c.port_b_input => self.inputs[PORT_B],
            PORT_B => self.outputs[PORT_B],
            _ => {
                let upper = if c.port_c_upper_input {
                    self.inputs[PORT_C]
                } else {
                    self.outputs[PORT_C]
                };
                let lower = if c.port_c_lower_input {
                    self.inputs[PORT_C]
                } else {
                    self.outputs[PORT_C]
                };
                (upper & 0xF0) | (lower & 0x0F)
            }
        }
    }

    /// Output latch of `port` (masked to 0-3; 3 reads as 0xFF).
    pub fn latch(&self, port: u8) -> u8 {
        self.latches
            .get((port & 0x03) as usize)
            .copied()
            .unwrap_or(OPEN_BUS)
    }

    /// Level driven on the output pins of `port` (masked to 0-3; 3 reads as 0xFF).
    pub fn output(&self, port: u8) -> u8 {
        self.outputs
            .get((port & 0x03) as usize)
            .copied()
            .unwrap_or(OPEN_BUS)
    }

    /// Level supplied on the input pins of `port` (masked to 0-3; 3 reads as 0xFF).
    pub fn input(&self, port: u8) -> u8 {
        self.inputs
            .get((port & 0x03) as usize)
            .copied()
            .unwrap_or(OPEN_BUS)
    }

    /// Last mode-definition byte written (BSR writes are not recorded).
    pub fn control_word(&self) -> u8 {
        self.control
    }

    pub fn config(&self) -> ModeConfig {
        self.config
    }

    pub fn mode_a(&self) -> Mode {
        self.config.mode_a
    }

    pub fn mode_b(&self) -> Mode {
        self.config.mode_b
    }

    pub fn port_a_input(&self) -> bool {
        self.config.port_a_input
    }

    pub fn port_b_input(&self) -> bool {
        self.config.port_b_input
    }

    pub fn port_c_upper_input(&self) -> bool {
        self.config.port_c_upper_input
    }

    pub fn port_c_lower_input(&self) -> bool {
        self.config.port_c_lower_input
    }

    /// Handshake flip-flops of `group`.
    pub fn handshake_state(&self, group: Group) -> Handshake {
        self.handshake[group.index()]
    }

    /// INTR output of `group`.
    pub fn intr(&self, group: Group) -> bool {
        self.handshake[group.index()].intr
    }

    pub fn user(&self) -> &U {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut U {
        &mut self.user
    }

    pub fn callbacks(&self) -> &Callbacks<U> {
        &self.callbacks
    }

    pub fn snapshot(&self) -> PpiState {
        PpiState {
            latches: self.latches,
            outputs: self.outputs,
            inputs: self.inputs,
            control: self.control,
            config: self.config,
            handshake: self.handshake,
        }
    }

    /// Load every register and flip-flop from `state`. Fires no callbacks.
    pub fn restore(&mut self, state: &PpiState) {
        self.latches = state.latches;
        self.outputs = state.outputs;
        self.inputs = state.inputs;
        self.control = state.control;
        self.config = state.config;
        self.handshake = state.handshake;
    }
}

impl<U> IoDevice for Ppi8255<U> {
    fn register_count(&self) -> u8 {
        4
    }

    fn io_read(&mut self, offset: u8) -> u8 {
        self.read(offset)
    }

    fn io_write(&mut self, offset: u8, data: u8) {
        self.write(offset, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_state() {
        let ppi: Ppi8255 = Ppi8255::new();
        let state = ppi.snapshot();
        assert_eq!(state.latches, [0; 3]);
        assert_eq!(state.outputs, [0; 3]);
        assert_eq!(state.inputs, [0; 3]);
        assert_eq!(state.control, 0x9B);
        assert_eq!(state.config, ModeConfig::POWER_ON);
        assert_eq!(state.handshake, [Handshake::default(); 2]);
    }

    #[test]
    fn control_register_reads_open_bus() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        assert_eq!(ppi.read(3), 0xFF);
        ppi.write(3, 0x80);
        assert_eq!(ppi.read(3), 0xFF);
    }

    #[test]
    fn offset_is_masked_to_two_bits() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0x80);
        ppi.write(4, 0x42); // aliases Port A
        assert_eq!(ppi.output(0), 0x42);
        assert_eq!(ppi.read(8), 0x42);
        ppi.write(7, 0x9B); // aliases control
        assert_eq!(ppi.control_word(), 0x9B);
    }

    #[test]
    fn port_c_read_mixes_nibbles_by_direction() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0x88); // C upper input, C lower output
        ppi.write(2, 0x5A);
        ppi.set_input(2, 0xC3);
        assert_eq!(ppi.read(2), 0xCA);
    }

    #[test]
    fn restore_round_trips_snapshot() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xB0);
        ppi.set_input(0, 0x77);
        ppi.external_strobe(0);
        let saved = ppi.snapshot();

        let mut other: Ppi8255 = Ppi8255::new();
        other.restore(&saved);
        assert_eq!(other.snapshot(), saved);
        assert_eq!(other.mode_a(), Mode::Mode1Input);
    }

    #[test]
    fn init_resets_and_replaces_user() {
        let mut ppi: Ppi8255<u32> = Ppi8255::with_callbacks(Callbacks::none(), 7);
        ppi.write(3, 0x80);
        ppi.write(0, 0x12);
        ppi.init(None, 9);
        assert_eq!(*ppi.user(), 9);
        assert_eq!(ppi.output(0), 0);
        assert_eq!(ppi.control_word(), 0x9B);
    }
}
