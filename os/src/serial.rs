//! Serial port (COM1 @ 0x3F8) for debug output, and the `log` backend on top of it.

use core::fmt::{self, Write as _};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

use crate::kernel::arch::x86::port::{PortIo, COM1};

const IER_OFF: u16 = 1;
const LCR_OFF: u16 = 3;
const LCR_8N1: u8 = 0x03;
const MCR_OFF: u16 = 4;
const MCR_DTR_RTS: u8 = 0x03;
const LSR_OFF: u16 = 5;
const LSR_THRE: u8 = 0x20;

/// A 16550-compatible UART driven by polling.
pub struct SerialPort<P: PortIo> {
    base: u16,
    ports: P,
}

impl<P: PortIo> SerialPort<P> {
    /// # Safety
    /// `base` must be the I/O base of a UART reachable through `ports`.
    pub const unsafe fn new(base: u16, ports: P) -> Self {
        Self { base, ports }
    }

    /// Configure 8n1 with interrupts off. Safe to call once at boot.
    pub fn init(&mut self) {
        unsafe {
            self.ports.write_byte(self.base + IER_OFF, 0x00);
            self.ports.write_byte(self.base + LCR_OFF, LCR_8N1);
            self.ports.write_byte(self.base + MCR_OFF, MCR_DTR_RTS);
        }
    }

    fn is_transmit_empty(&mut self) -> bool {
        unsafe { (self.ports.read_byte(self.base + LSR_OFF) & LSR_THRE) != 0 }
    }

    /// Write one byte. Blocks until THR empty.
    pub fn write_byte(&mut self, b: u8) {
        while !self.is_transmit_empty() {
            core::hint::spin_loop();
        }
        unsafe { self.ports.write_byte(self.base, b) }
    }

    /// Write a string, translating `\n` to `\r\n`.
    pub fn write_str(&mut self, s: &str) {
        for b in s.bytes() {
            if b == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(b);
        }
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }
}

impl<P: PortIo> fmt::Write for SerialPort<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        SerialPort::write_str(self, s);
        Ok(())
    }
}

/// `log` backend writing one line per record to a UART.
pub struct SerialLogger<P: PortIo> {
    port: Mutex<SerialPort<P>>,
}

impl<P: PortIo> SerialLogger<P> {
    pub const fn new(port: SerialPort<P>) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }

    /// Install `self` as the global logger, then configure the UART.
    ///
    /// The UART is left untouched when another logger is already
    /// installed, since it may belong to that logger.
    pub fn register(&'static self, level: LevelFilter) -> Result<(), SetLoggerError>
    where
        P: Send + 'static,
    {
        log::set_logger(self)?;
        self.port.lock().init();
        log::set_max_level(level);
        Ok(())
    }
}

impl<P: PortIo + Send> Log for SerialLogger<P> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut port = self.port.lock();
        let _ = writeln!(port, "[{:<5}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use logger::init_logging;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod logger {
    use log::{LevelFilter, SetLoggerError};

    use super::{SerialLogger, SerialPort, COM1};
    use crate::kernel::arch::x86::port::IoPorts;

    // SAFETY: COM1 is the standard PC UART.
    static LOGGER: SerialLogger<IoPorts> =
        SerialLogger::new(unsafe { SerialPort::new(COM1, IoPorts) });

    /// Route `log` output to COM1, initializing the port on success.
    pub fn init_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
        LOGGER.register(level)
    }
}
