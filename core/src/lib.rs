pub mod core;
pub mod device;

pub mod prelude {
    pub use crate::core::IoDevice;
    pub use crate::device::i8255::{
        Access, Callbacks, ControlFormat, ControlWord, Group, Handshake, Mode, ModeConfig, Op,
        Ppi8255, PpiState,
    };
}
