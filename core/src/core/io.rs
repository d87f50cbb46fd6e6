/// Register-level interface for a memory- or port-mapped peripheral.
///
/// The host bus decodes its own address space and hands the device a
/// register offset relative to the device's base address. Devices mask the
/// offset to their own register count, so out-of-range offsets alias.
pub trait IoDevice {
    /// Number of addressable registers (offsets `0..register_count()`).
    fn register_count(&self) -> u8;

    /// Read the register at `offset`.
    fn io_read(&mut self, offset: u8) -> u8;

    /// Write `data` to the register at `offset`.
    fn io_write(&mut self, offset: u8, data: u8);
}
