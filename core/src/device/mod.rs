pub mod i8255;

pub use i8255::Ppi8255;
