pub mod io;

pub use io::IoDevice;
