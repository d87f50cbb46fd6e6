//! Device state snapshot

use super::control::ModeConfig;
use super::handshake::Handshake;

/// Plain-value copy of every register and flip-flop of a [`Ppi8255`].
///
/// Does not include the callback set or the user context.
///
/// [`Ppi8255`]: super::Ppi8255
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PpiState {
    pub latches: [u8; 3], // Output latches A, B, C
    pub outputs: [u8; 3], // Driven output pins A, B, C
    pub inputs: [u8; 3],  // External input pins A, B, C
    pub control: u8,      // Last mode-definition byte
    pub config: ModeConfig,
    pub handshake: [Handshake; 2], // Group A, group B
}
