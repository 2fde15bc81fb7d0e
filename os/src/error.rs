//! Error types for the checked table helpers
//!
//! The boot path itself never fails: its inputs are fixed at compile time
//! and a bad table shows up as a CPU fault, not as a value. These errors
//! are returned only by the checked helpers that accept caller-chosen
//! indices or vector offsets.

/// Descriptor table and PIC configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Table slot index past the end of the table
    SlotOutOfRange {
        /// The requested slot
        index: usize,
        /// Number of slots in the table
        capacity: usize,
    },

    /// IRQ line number above 15
    IrqOutOfRange(u8),

    /// PIC offset would route IRQs onto a CPU exception vector (0..32)
    ReservedVector(u8),

    /// PIC offset is not a multiple of 8
    ///
    /// The 8259 ignores the low three bits of ICW2, so an unaligned
    /// offset would silently shift every IRQ.
    MisalignedOffset(u8),

    /// Master and slave vector ranges overlap
    OverlappingOffsets {
        /// Master PIC vector offset
        master: u8,
        /// Slave PIC vector offset
        slave: u8,
    },
}

impl TableError {
    /// Returns a human-readable description of the error
    pub fn description(&self) -> &'static str {
        match self {
            Self::SlotOutOfRange { .. } => "descriptor slot out of range",
            Self::IrqOutOfRange(_) => "IRQ line out of range",
            Self::ReservedVector(_) => "PIC offset overlaps CPU exception vectors",
            Self::MisalignedOffset(_) => "PIC offset is not a multiple of 8",
            Self::OverlappingOffsets { .. } => "master and slave PIC vectors overlap",
        }
    }
}

/// Convenience type alias for Results with TableError
pub type TableResult<T> = Result<T, TableError>;

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SlotOutOfRange { index, capacity } => write!(
                f,
                "{}: index {} (table holds {})",
                self.description(),
                index,
                capacity
            ),
            Self::IrqOutOfRange(irq) => write!(f, "{}: IRQ {}", self.description(), irq),
            Self::ReservedVector(offset) | Self::MisalignedOffset(offset) => {
                write!(f, "{}: offset 0x{:02x}", self.description(), offset)
            }
            Self::OverlappingOffsets { master, slave } => write!(
                f,
                "{}: master 0x{:02x}, slave 0x{:02x}",
                self.description(),
                master,
                slave
            ),
        }
    }
}
