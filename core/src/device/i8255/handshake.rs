//! Mode 1 handshake flip-flops.
//!
//! One instance per port group. All transitions for both groups go through
//! [`Ppi8255::handshake`], which encodes the table below:
//!
//! | Mode         | Trigger       | IBF | OBF | INTR | Signals (in order)          |
//! |--------------|---------------|-----|-----|------|-----------------------------|
//! | Mode 1 in    | STB (IBF = 0) | 1   | -   | 1    | ibf(1), intr(1)             |
//! | Mode 1 in    | CPU read      | 0   | -   | 0    | ibf(0), intr(0)             |
//! | Mode 1 out   | CPU write     | -   | 0   | 1    | obf(0, output), intr(1)     |
//! | Mode 1 out   | ACK           | -   | 1   | 0    | obf(1, 0xFF), intr(0)       |
//!
//! Any other mode/trigger pair leaves the flip-flops untouched. Mode 2
//! handshake is not modelled; its IBF/OBF gating in the access policy reads
//! flags that only a mode change resets.

use super::Ppi8255;
use super::control::{Mode, ModeConfig};

/// Port group: A (Port A + PC7-3) or B (Port B + PC2-0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Group {
    A = 0,
    B = 1,
}

impl Group {
    /// Map a raw group number onto A/B, taken modulo 2.
    pub fn from_raw(raw: u8) -> Self {
        if raw & 0x01 == 0 { Group::A } else { Group::B }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Handshake state of one port group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handshake {
    /// Input buffer full
    pub ibf: bool,
    /// Output buffer full
    pub obf: bool,
    /// Interrupt request
    pub intr: bool,
    /// STB line currently asserted (diagnostic only)
    pub strobe_active: bool,
    /// ACK line currently asserted (diagnostic only)
    pub ack_active: bool,
}

/// Event driving a handshake transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Strobe,
    CpuRead,
    CpuWrite,
    Acknowledge,
}

impl<U> Ppi8255<U> {
    pub(crate) fn group_mode(&self, group: Group) -> Mode {
        match group {
            Group::A => self.config.mode_a,
            Group::B => self.config.mode_b,
        }
    }

    // A group whose mode changed drops its flip-flops and reports every flag
    // that falls, buffer-full before interrupt. A group rewritten with the
    // same mode keeps its handshake state.
    pub(crate) fn reset_handshake(&mut self, previous: ModeConfig) {
        for group in [Group::A, Group::B] {
            let before = match group {
                Group::A => previous.mode_a,
                Group::B => previous.mode_b,
            };
            if self.group_mode(group) == before {
                continue;
            }
            let g = group.index();
            let old = self.handshake[g];
            let hs = &mut self.handshake[g];
            hs.ibf = false;
            hs.obf = false;
            hs.intr = false;

            if old.ibf {
                self.callbacks.ibf(group, false, &mut self.user);
            }
            if old.obf {
                self.callbacks
                    .obf(group, false, self.outputs[g], &mut self.user);
            }
            if old.intr {
                self.callbacks.intr(group, false, &mut self.user);
            }
            log::trace!("PPI group {group:?} left {before:?}: handshake cleared");
        }
    }

    /// Run one handshake transition for `group`.
    ///
    /// Flip-flops are updated before any signal fires, and the buffer-full
    /// signal always precedes the interrupt signal.
    pub(crate) fn handshake(&mut self, group: Group, trigger: Trigger) {
        let g = group.index();
        match (self.group_mode(group), trigger) {
            (Mode::Mode1Input, Trigger::Strobe) => {
                if self.handshake[g].ibf {
                    return;
                }
                self.latches[g] = self.inputs[g];
                self.set_input_flags(group, true);
            }
            (Mode::Mode1Input, Trigger::CpuRead) => {
                self.set_input_flags(group, false);
            }
            (Mode::Mode1Output, Trigger::CpuWrite) => {
                self.outputs[g] = self.latches[g];
                let hs = &mut self.handshake[g];
                hs.obf = false;
                hs.intr = true;
                self.callbacks
                    .obf(group, false, self.outputs[g], &mut self.user);
                self.callbacks.intr(group, true, &mut self.user);
            }
            (Mode::Mode1Output, Trigger::Acknowledge) => {
                let hs = &mut self.handshake[g];
                hs.obf = true;
                hs.intr = false;
                self.callbacks.obf(group, true, 0xFF, &mut self.user);
                self.callbacks.intr(group, false, &mut self.user);
            }
            _ => return,
        }
        log::trace!(
            "PPI group {group:?} {trigger:?}: ibf={} obf={} intr={}",
            self.handshake[g].ibf,
            self.handshake[g].obf,
            self.handshake[g].intr
        );
    }

    // Strobed input sets IBF and INTR together; a CPU read clears both.
    fn set_input_flags(&mut self, group: Group, level: bool) {
        let hs = &mut self.handshake[group.index()];
        hs.ibf = level;
        hs.intr = level;
        self.callbacks.ibf(group, level, &mut self.user);
        self.callbacks.intr(group, level, &mut self.user);
    }

    /// Pulse the STB input of `group` (taken modulo 2).
    ///
    /// In Mode 1 input with the buffer empty, the port's input pins are
    /// latched and IBF/INTR are raised. Ignored while the buffer is full and
    /// in every other mode.
    pub fn external_strobe(&mut self, group: u8) {
        self.handshake(Group::from_raw(group), Trigger::Strobe);
    }

    /// Pulse the ACK input of `group` (taken modulo 2).
    ///
    /// In Mode 1 output this marks the output buffer full (consumed by the
    /// peripheral) and drops INTR. Ignored in every other mode.
    pub fn external_ack(&mut self, group: u8) {
        self.handshake(Group::from_raw(group), Trigger::Acknowledge);
    }

    /// Drive the STB line of `group` (active low).
    ///
    /// Every level change is reported through `strobe_changed`. A falling
    /// edge then behaves exactly like [`external_strobe`](Self::external_strobe).
    pub fn set_strobe_line(&mut self, group: u8, level: bool) {
        let group = Group::from_raw(group);
        let asserted = !level;
        if self.handshake[group.index()].strobe_active == asserted {
            return;
        }
        self.handshake[group.index()].strobe_active = asserted;
        self.callbacks.strobe(group, level, &mut self.user);
        if asserted {
            self.handshake(group, Trigger::Strobe);
        }
    }

    /// Drive the ACK line of `group` (active low).
    ///
    /// Every level change is reported through `ack_changed`. A falling edge
    /// then behaves exactly like [`external_ack`](Self::external_ack).
    pub fn set_ack_line(&mut self, group: u8, level: bool) {
        let group = Group::from_raw(group);
        let asserted = !level;
        if self.handshake[group.index()].ack_active == asserted {
            return;
        }
        self.handshake[group.index()].ack_active = asserted;
        self.callbacks.ack(group, level, &mut self.user);
        if asserted {
            self.handshake(group, Trigger::Acknowledge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_taken_modulo_two() {
        assert_eq!(Group::from_raw(0), Group::A);
        assert_eq!(Group::from_raw(1), Group::B);
        assert_eq!(Group::from_raw(2), Group::A);
        assert_eq!(Group::from_raw(0xFF), Group::B);
    }

    #[test]
    fn strobe_ignored_outside_mode1_input() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.set_input(0, 0x5A);
        ppi.external_strobe(0);
        assert_eq!(ppi.handshake_state(Group::A), Handshake::default());
        assert_eq!(ppi.latch(0), 0x00);
    }

    #[test]
    fn mode_change_clears_flip_flops() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xB6); // A mode 1 in, B mode 1 in
        ppi.external_strobe(0);
        ppi.external_strobe(1);
        assert!(ppi.handshake_state(Group::A).ibf);
        assert!(ppi.handshake_state(Group::B).ibf);

        ppi.write(3, 0x9B);
        assert!(!ppi.handshake_state(Group::A).ibf);
        assert!(!ppi.handshake_state(Group::A).intr);
        assert!(!ppi.handshake_state(Group::B).ibf);
        assert!(!ppi.handshake_state(Group::B).intr);
    }

    #[test]
    fn same_mode_rewrite_keeps_flip_flops() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xB0);
        ppi.external_strobe(0);
        ppi.write(3, 0xB0);
        assert!(ppi.handshake_state(Group::A).ibf);
        assert!(ppi.intr(Group::A));
    }

    #[test]
    fn repeated_line_level_is_not_an_edge() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xB0);
        ppi.set_input(0, 0x11);
        ppi.set_strobe_line(0, false);
        assert_eq!(ppi.latch(0), 0x11);

        // CPU read empties the buffer; holding STB low must not re-latch
        ppi.read(0);
        ppi.set_input(0, 0x22);
        ppi.set_strobe_line(0, false);
        assert!(!ppi.handshake_state(Group::A).ibf);
        assert_eq!(ppi.latch(0), 0x11);

        ppi.set_strobe_line(0, true);
        ppi.set_strobe_line(0, false);
        assert_eq!(ppi.latch(0), 0x22);
    }
}
