//! TOML trace scripts: an optional `name` and an ordered `[[step]]` array
//! using the same step vocabulary as the validation vectors.

use std::path::Path;

use i8255_validation::Step;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

#[derive(Debug)]
pub enum ScriptError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),

    /// The file is not valid TOML or does not match the script layout.
    Parse(toml::de::Error),

    /// A step addresses a port or group the chip does not have.
    InvalidStep { index: usize, reason: String },
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "invalid script: {e}"),
            Self::InvalidStep { index, reason } => write!(f, "step {index}: {reason}"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ScriptError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let script: Script = toml::from_str(text)?;
        for (index, step) in script.steps.iter().enumerate() {
            check_step(step).map_err(|reason| ScriptError::InvalidStep { index, reason })?;
        }
        Ok(script)
    }
}

// The chip masks out-of-range ports itself; scripts reject them so a typo
// does not silently alias onto another register.
fn check_step(step: &Step) -> Result<(), String> {
    match *step {
        Step::Write { port, .. } | Step::Read { port, .. } if port > 3 => {
            Err(format!("register {port} out of range 0-3"))
        }
        Step::Input { port, .. } if port > 2 => Err(format!("input port {port} out of range 0-2")),
        Step::Strobe { group }
        | Step::Ack { group }
        | Step::StrobeLine { group, .. }
        | Step::AckLine { group, .. }
            if group > 1 =>
        {
            Err(format!("group {group} out of range 0-1"))
        }
        _ => Ok(()),
    }
}
