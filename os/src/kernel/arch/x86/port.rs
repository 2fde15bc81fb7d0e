//! Byte-wide port I/O.

pub const PIC_MASTER_COMMAND: u16 = 0x20;
pub const PIC_MASTER_DATA: u16 = 0x21;
pub const PIC_SLAVE_COMMAND: u16 = 0xA0;
pub const PIC_SLAVE_DATA: u16 = 0xA1;
pub const COM1: u16 = 0x3F8;

/// Access to the I/O port space.
///
/// The PIC programmer and the serial logger only talk to hardware through
/// this trait, so both can be driven by an emulated device in tests.
pub trait PortIo {
    /// Read one byte from `port`.
    ///
    /// # Safety
    /// Reading a device register can have side effects on the device.
    unsafe fn read_byte(&mut self, port: u16) -> u8;

    /// Write one byte to `port`.
    ///
    /// # Safety
    /// The caller must know what the device at `port` does with `value`.
    unsafe fn write_byte(&mut self, port: u16, value: u8);
}

/// The real port space, via `in`/`out`.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct IoPorts;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for IoPorts {
    #[inline(always)]
    unsafe fn read_byte(&mut self, port: u16) -> u8 {
        let value: u8;
        core::arch::asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
        value
    }

    #[inline(always)]
    unsafe fn write_byte(&mut self, port: u16, value: u8) {
        core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
    }
}
