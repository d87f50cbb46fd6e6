//! Replays a script against a fresh chip and renders one line per step,
//! followed by the signals that step fired.

use std::fmt::Write as _;

use i8255_core::device::i8255::{Group, Handshake, Ppi8255, PpiState};
use i8255_validation::{SignalLog, Step, apply_step, recording_ppi};

use crate::script::Script;

/// Result of replaying a script.
pub struct Report {
    pub lines: Vec<String>,
    /// Read steps whose `expect` did not match.
    pub failures: usize,
}

pub fn run(script: &Script, show_state: bool) -> Report {
    let mut ppi = recording_ppi();
    let mut lines = Vec::new();
    let mut failures = 0;

    if let Some(name) = &script.name {
        lines.push(format!("== {name}"));
    }

    for (index, step) in script.steps.iter().enumerate() {
        let value = apply_step(&mut ppi, step);
        let mut line = format!("#{index:03} {}", describe(step));

        if let (Some(actual), Step::Read { expect, .. }) = (value, step) {
            let _ = write!(line, " -> 0x{actual:02X}");
            if let Some(expected) = *expect
                && expected != actual
            {
                let _ = write!(line, "  MISMATCH (expected 0x{expected:02X})");
                log::error!("step {index}: read 0x{actual:02X}, expected 0x{expected:02X}");
                failures += 1;
            }
        }
        lines.push(line);

        for event in std::mem::take(ppi.user_mut()) {
            lines.push(format!("       {event}"));
        }
        if show_state {
            lines.push(format!("       {}", render_state(&ppi)));
        }
    }

    Report { lines, failures }
}

fn register_name(port: u8) -> &'static str {
    match port & 0x03 {
        0 => "A",
        1 => "B",
        2 => "C",
        _ => "CTRL",
    }
}

fn describe(step: &Step) -> String {
    match *step {
        Step::Write { port, value } => format!("write {} <- 0x{value:02X}", register_name(port)),
        Step::Read { port, .. } => format!("read  {}", register_name(port)),
        Step::Input { port, value } => format!("input {} = 0x{value:02X}", register_name(port)),
        Step::Strobe { group } => format!("STB pulse {:?}", Group::from_raw(group)),
        Step::Ack { group } => format!("ACK pulse {:?}", Group::from_raw(group)),
        Step::StrobeLine { group, level } => {
            format!("STB {:?} = {}", Group::from_raw(group), u8::from(level))
        }
        Step::AckLine { group, level } => {
            format!("ACK {:?} = {}", Group::from_raw(group), u8::from(level))
        }
    }
}

fn render_handshake(hs: &Handshake) -> String {
    format!(
        "ibf={} obf={} intr={}",
        u8::from(hs.ibf),
        u8::from(hs.obf),
        u8::from(hs.intr)
    )
}

fn render_state(ppi: &Ppi8255<SignalLog>) -> String {
    let PpiState {
        latches,
        outputs,
        inputs,
        control,
        config,
        handshake,
    } = ppi.snapshot();
    format!(
        "ctrl=0x{control:02X} A:{:?} B:{:?} latch={latches:02X?} out={outputs:02X?} in={inputs:02X?} | A {} | B {}",
        config.mode_a,
        config.mode_b,
        render_handshake(&handshake[0]),
        render_handshake(&handshake[1]),
    )
}
