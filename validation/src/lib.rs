use std::path::Path;

use i8255_core::device::i8255::{Callbacks, Group, Ppi8255, PpiState};
use rand::Rng;
use serde::{Deserialize, Serialize};

// --- Step vocabulary shared by vectors and scripts ---

/// One host-side action against the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Bus write to register `port` (0-3).
    Write { port: u8, value: u8 },
    /// Bus read from register `port` (0-3). `expect` is checked by scripts.
    Read {
        port: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<u8>,
    },
    /// External hardware drives `value` onto the pins of `port`.
    Input { port: u8, value: u8 },
    /// STB pulse on `group`.
    Strobe { group: u8 },
    /// ACK pulse on `group`.
    Ack { group: u8 },
    /// Drive the STB line of `group` to `level`.
    StrobeLine { group: u8, level: bool },
    /// Drive the ACK line of `group` to `level`.
    AckLine { group: u8, level: bool },
}

/// Apply `step` to `ppi`. Returns the byte read for [`Step::Read`].
pub fn apply_step<U>(ppi: &mut Ppi8255<U>, step: &Step) -> Option<u8> {
    match *step {
        Step::Write { port, value } => ppi.write(port, value),
        Step::Read { port, .. } => return Some(ppi.read(port)),
        Step::Input { port, value } => ppi.set_input(port, value),
        Step::Strobe { group } => ppi.external_strobe(group),
        Step::Ack { group } => ppi.external_ack(group),
        Step::StrobeLine { group, level } => ppi.set_strobe_line(group, level),
        Step::AckLine { group, level } => ppi.set_ack_line(group, level),
    }
    None
}

// --- Signal recording ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Strobe,
    Ack,
    Ibf,
    Obf,
    Intr,
}

/// One callback invocation, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub signal: Signal,
    pub group: Group,
    pub level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<u8>,
}

impl SignalEvent {
    fn line(signal: Signal, group: Group, level: bool) -> Self {
        Self {
            signal,
            group,
            level,
            data: None,
        }
    }
}

impl std::fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?})={}", self.signal, self.group, u8::from(self.level))?;
        if let Some(data) = self.data {
            write!(f, " data=0x{data:02X}")?;
        }
        Ok(())
    }
}

/// User context that records every signal the chip fires.
pub type SignalLog = Vec<SignalEvent>;

/// Callback set that appends to a [`SignalLog`] user context.
pub fn recording_callbacks() -> Callbacks<SignalLog> {
    Callbacks {
        strobe_changed: Some(|group, level, log: &mut SignalLog| {
            log.push(SignalEvent::line(Signal::Strobe, group, level))
        }),
        ack_changed: Some(|group, level, log: &mut SignalLog| {
            log.push(SignalEvent::line(Signal::Ack, group, level))
        }),
        ibf_changed: Some(|group, level, log: &mut SignalLog| {
            log.push(SignalEvent::line(Signal::Ibf, group, level))
        }),
        obf_changed: Some(|group, level, data, log: &mut SignalLog| {
            log.push(SignalEvent {
                signal: Signal::Obf,
                group,
                level,
                data: Some(data),
            })
        }),
        intr_changed: Some(|group, level, log: &mut SignalLog| {
            log.push(SignalEvent::line(Signal::Intr, group, level))
        }),
    }
}

pub fn recording_ppi() -> Ppi8255<SignalLog> {
    Ppi8255::with_callbacks(recording_callbacks(), SignalLog::new())
}

// --- JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Starting state; power-on when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<PpiState>,
    pub steps: Vec<Step>,
    /// Value returned by each read step, in order.
    pub reads: Vec<u8>,
    #[serde(rename = "final")]
    pub final_state: PpiState,
    pub signals: Vec<SignalEvent>,
}

/// A replayed vector diverged from its recorded outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub case: String,
    pub what: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: expected {}, got {}",
            self.case, self.what, self.expected, self.actual
        )
    }
}

impl std::error::Error for Mismatch {}

#[derive(Debug)]
pub enum VectorError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for VectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid test vector JSON: {e}"),
        }
    }
}

impl std::error::Error for VectorError {}

impl From<std::io::Error> for VectorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub fn load_vectors(path: &Path) -> Result<Vec<TestCase>, VectorError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub fn save_vectors(path: &Path, cases: &[TestCase]) -> Result<(), VectorError> {
    let json = serde_json::to_string_pretty(cases)?;
    std::fs::write(path, json)?;
    Ok(())
}

// --- Replay ---

struct Outcome {
    reads: Vec<u8>,
    final_state: PpiState,
    signals: Vec<SignalEvent>,
}

fn run(initial: Option<&PpiState>, steps: &[Step]) -> Outcome {
    let mut ppi = recording_ppi();
    if let Some(state) = initial {
        ppi.restore(state);
    }
    let reads = steps
        .iter()
        .filter_map(|step| apply_step(&mut ppi, step))
        .collect();
    Outcome {
        reads,
        final_state: ppi.snapshot(),
        signals: std::mem::take(ppi.user_mut()),
    }
}

/// Run `steps` on a fresh chip and record the outcome as a test vector.
pub fn record(name: impl Into<String>, initial: Option<PpiState>, steps: Vec<Step>) -> TestCase {
    let outcome = run(initial.as_ref(), &steps);
    TestCase {
        name: name.into(),
        initial,
        steps,
        reads: outcome.reads,
        final_state: outcome.final_state,
        signals: outcome.signals,
    }
}

/// Replay a vector and compare reads, signals, and final state.
pub fn replay(tc: &TestCase) -> Result<(), Mismatch> {
    let outcome = run(tc.initial.as_ref(), &tc.steps);
    let mismatch = |what: String, expected: String, actual: String| Mismatch {
        case: tc.name.clone(),
        what,
        expected,
        actual,
    };

    if outcome.reads.len() != tc.reads.len() {
        return Err(mismatch(
            "read count".into(),
            tc.reads.len().to_string(),
            outcome.reads.len().to_string(),
        ));
    }
    for (i, (&expected, &actual)) in tc.reads.iter().zip(&outcome.reads).enumerate() {
        if expected != actual {
            return Err(mismatch(
                format!("read {i}"),
                format!("0x{expected:02X}"),
                format!("0x{actual:02X}"),
            ));
        }
    }

    if outcome.signals != tc.signals {
        let render = |events: &[SignalEvent]| {
            events
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        return Err(mismatch(
            "signals".into(),
            format!("[{}]", render(&tc.signals)),
            format!("[{}]", render(&outcome.signals)),
        ));
    }

    if outcome.final_state != tc.final_state {
        return Err(mismatch(
            "final state".into(),
            format!("{:?}", tc.final_state),
            format!("{:?}", outcome.final_state),
        ));
    }
    Ok(())
}

// --- Random step generation ---

/// Control bytes that exercise every mode combination the chip supports.
const INTERESTING_CONTROL: &[u8] = &[
    0x80, // all output, mode 0
    0x9B, // all input, mode 0
    0xB0, // A mode 1 in
    0xA0, // A mode 1 out
    0x86, // B mode 1 in
    0x84, // B mode 1 out
    0xB6, // A mode 1 in, B mode 1 in
    0xA4, // A mode 1 out, B mode 1 out
    0xB4, // A mode 1 in, B mode 1 out
    0xA6, // A mode 1 out, B mode 1 in
    0xC0, // A mode 2
    0x88, // C upper in, everything else out
];

fn random_control<R: Rng>(rng: &mut R) -> u8 {
    match rng.gen_range(0..4) {
        0 => rng.r#gen::<u8>() | 0x80,
        1 => rng.r#gen::<u8>() & 0x0F, // BSR
        _ => INTERESTING_CONTROL[rng.gen_range(0..INTERESTING_CONTROL.len())],
    }
}

fn random_step<R: Rng>(rng: &mut R) -> Step {
    let port = rng.gen_range(0..3);
    let group = rng.gen_range(0..2);
    match rng.gen_range(0..10) {
        0 => Step::Write {
            port: 3,
            value: random_control(rng),
        },
        1 | 2 => Step::Write {
            port,
            value: rng.r#gen(),
        },
        3 | 4 => Step::Read {
            port: rng.gen_range(0..4),
            expect: None,
        },
        5 => Step::Input {
            port,
            value: rng.r#gen(),
        },
        6 => Step::Strobe { group },
        7 => Step::Ack { group },
        8 => Step::StrobeLine {
            group,
            level: rng.gen_bool(0.5),
        },
        _ => Step::AckLine {
            group,
            level: rng.gen_bool(0.5),
        },
    }
}

/// A random step sequence that always starts with a control write.
pub fn random_steps<R: Rng>(rng: &mut R, len: usize) -> Vec<Step> {
    let mut steps = Vec::with_capacity(len + 1);
    steps.push(Step::Write {
        port: 3,
        value: INTERESTING_CONTROL[rng.gen_range(0..INTERESTING_CONTROL.len())],
    });
    steps.extend((0..len).map(|_| random_step(rng)));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn recorded_case_replays_cleanly() {
        let mut rng = StdRng::seed_from_u64(0x8255);
        for i in 0..50 {
            let steps = random_steps(&mut rng, 40);
            let tc = record(format!("seeded {i}"), None, steps);
            assert_eq!(replay(&tc), Ok(()));
        }
    }

    #[test]
    fn replay_reports_first_bad_read() {
        let mut tc = record(
            "bad read",
            None,
            vec![
                Step::Write {
                    port: 3,
                    value: 0x80,
                },
                Step::Write {
                    port: 0,
                    value: 0x42,
                },
                Step::Read {
                    port: 0,
                    expect: None,
                },
            ],
        );
        tc.reads[0] = 0x43;
        let err = replay(&tc).unwrap_err();
        assert_eq!(err.what, "read 0");
        assert_eq!(err.expected, "0x43");
        assert_eq!(err.actual, "0x42");
    }

    #[test]
    fn replay_detects_signal_divergence() {
        let mut tc = record(
            "signals",
            None,
            vec![
                Step::Write {
                    port: 3,
                    value: 0xA0,
                },
                Step::Write {
                    port: 0,
                    value: 0x01,
                },
            ],
        );
        assert_eq!(tc.signals.len(), 2);
        tc.signals.swap(0, 1);
        assert_eq!(replay(&tc).unwrap_err().what, "signals");
    }

    #[test]
    fn steps_parse_from_json() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[{"op":"write","port":3,"value":176},
                {"op":"strobe_line","group":0,"level":false},
                {"op":"read","port":0,"expect":90}]"#,
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Write {
                    port: 3,
                    value: 0xB0
                },
                Step::StrobeLine {
                    group: 0,
                    level: false
                },
                Step::Read {
                    port: 0,
                    expect: Some(0x5A)
                },
            ]
        );
    }

    #[test]
    fn initial_state_is_restored_before_steps() {
        let mut seed = recording_ppi();
        seed.write(3, 0xB0);
        seed.set_input(0, 0x33);
        seed.external_strobe(0);
        let initial = seed.snapshot();

        let tc = record(
            "from initial",
            Some(initial),
            vec![Step::Read {
                port: 0,
                expect: None,
            }],
        );
        assert_eq!(tc.reads, vec![0x33]);
        assert!(!tc.final_state.handshake[0].ibf);
    }
}
