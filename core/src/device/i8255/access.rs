use super::control::Mode;
use super::handshake::{Group, Trigger};
use super::{PORT_A, PORT_B, PORT_C, Ppi8255, port_name};

/// Direction of a data-port access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
}

/// Outcome of the access policy for one data-port access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Perform the transfer.
    Ok,
    /// Permitted, but a read only returns the output latch.
    Warn,
    /// Suppressed: reads return 0xFF, writes leave the output unchanged.
    Illegal,
    /// Invalid port index or undefined mode.
    Unknown,
}

impl<U> Ppi8255<U> {
    /// Decide whether `op` on data port `port` (0 = A, 1 = B, 2 = C) is legal.
    ///
    /// Legal Mode 1 accesses drive the handshake as a side effect: a read in
    /// Mode 1 input clears IBF/INTR, a write in Mode 1 output copies the latch
    /// to the output and raises INTR.
    ///
    /// Mode 0 writes to a port whose direction is input are Illegal, as are
    /// Port C writes when both nibbles are input.
    pub fn check_access(&mut self, port: u8, op: Op) -> Access {
        match port as usize {
            PORT_A => self.check_group_port(Group::A, op),
            PORT_B => self.check_group_port(Group::B, op),
            PORT_C => {
                if op == Op::Write
                    && self.config.port_c_upper_input
                    && self.config.port_c_lower_input
                {
                    log::warn!("Illegal: write to Port C while configured as full input");
                    return Access::Illegal;
                }
                Access::Ok
            }
            _ => {
                log::warn!("Invalid port {port}");
                Access::Unknown
            }
        }
    }

    fn check_group_port(&mut self, group: Group, op: Op) -> Access {
        let port = group.index();
        let name = port_name(port);
        match (self.group_mode(group), op) {
            (Mode::Mode0, Op::Read) => Access::Ok,
            (Mode::Mode0, Op::Write) => {
                if self.port_is_input(group) {
                    log::warn!("Illegal: write to Port {name} while configured as input");
                    Access::Illegal
                } else {
                    Access::Ok
                }
            }
            (Mode::Mode1Input, Op::Write) => {
                log::warn!("Illegal: write to Port {name} while in Mode 1 input");
                Access::Illegal
            }
            (Mode::Mode1Input, Op::Read) => {
                self.handshake(group, Trigger::CpuRead);
                Access::Ok
            }
            (Mode::Mode1Output, Op::Read) => {
                log::warn!("Warning: read from Port {name} in Mode 1 output returns latch only");
                Access::Warn
            }
            (Mode::Mode1Output, Op::Write) => {
                self.handshake(group, Trigger::CpuWrite);
                Access::Ok
            }
            (Mode::Mode2, _) if group == Group::B => Access::Unknown,
            (Mode::Mode2, Op::Write) => {
                if self.handshake[port].obf {
                    log::warn!("Illegal: write to Port A ignored while OBF=1 in Mode 2");
                    Access::Illegal
                } else {
                    Access::Ok
                }
            }
            (Mode::Mode2, Op::Read) => {
                if self.handshake[port].ibf {
                    Access::Ok
                } else {
                    log::warn!("Illegal: read from Port A ignored while IBF=0 in Mode 2");
                    Access::Illegal
                }
            }
        }
    }

    fn port_is_input(&self, group: Group) -> bool {
        match group {
            Group::A => self.config.port_a_input,
            Group::B => self.config.port_b_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::i8255::handshake::Handshake;

    #[test]
    fn invalid_port_is_unknown() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        assert_eq!(ppi.check_access(3, Op::Read), Access::Unknown);
        assert_eq!(ppi.check_access(0xFF, Op::Write), Access::Unknown);
    }

    #[test]
    fn mode2_on_port_b_is_unknown() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.config.mode_b = Mode::Mode2;
        assert_eq!(ppi.check_access(1, Op::Read), Access::Unknown);
        assert_eq!(ppi.check_access(1, Op::Write), Access::Unknown);
    }

    #[test]
    fn mode2_gates_on_buffer_flags() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xC0);

        // IBF=0 after the mode write: reads illegal, writes allowed
        assert_eq!(ppi.check_access(0, Op::Read), Access::Illegal);
        assert_eq!(ppi.check_access(0, Op::Write), Access::Ok);

        ppi.handshake[0] = Handshake {
            ibf: true,
            obf: true,
            ..Handshake::default()
        };
        assert_eq!(ppi.check_access(0, Op::Read), Access::Ok);
        assert_eq!(ppi.check_access(0, Op::Write), Access::Illegal);
    }

    #[test]
    fn port_c_write_needs_one_output_nibble() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        assert_eq!(ppi.check_access(2, Op::Write), Access::Illegal);
        assert_eq!(ppi.check_access(2, Op::Read), Access::Ok);

        ppi.write(3, 0x92); // both C nibbles output
        assert_eq!(ppi.check_access(2, Op::Write), Access::Ok);

        ppi.write(3, 0x98); // C upper in, lower out
        assert_eq!(ppi.check_access(2, Op::Write), Access::Ok);

        ppi.write(3, 0x91); // C upper out, lower in
        assert_eq!(ppi.check_access(2, Op::Write), Access::Ok);
    }

    #[test]
    fn mode1_output_read_warns() {
        let mut ppi: Ppi8255 = Ppi8255::new();
        ppi.write(3, 0xA4); // A mode 1 out, B mode 1 out
        assert_eq!(ppi.check_access(0, Op::Read), Access::Warn);
        assert_eq!(ppi.check_access(1, Op::Read), Access::Warn);
    }
}
