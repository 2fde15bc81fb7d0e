//! 8259 PIC (Programmable Interrupt Controller).
//!
//! Remap IRQ 0–15 to IDT vectors 32–47 (0x20–0x2F), keeping whatever
//! interrupt masks were programmed before the remap.

use log::{debug, trace};

use super::port::{PortIo, PIC_MASTER_COMMAND, PIC_MASTER_DATA, PIC_SLAVE_COMMAND, PIC_SLAVE_DATA};
use crate::error::{TableError, TableResult};

const ICW1_INIT: u8 = 0x11; // edge triggered, cascade, ICW4 follows
const ICW4_8086: u8 = 0x01;
const MASTER_CASCADE: u8 = 0x04; // IR2 has slave
const SLAVE_CASCADE: u8 = 0x02; // connected to master's IR2
const EOI: u8 = 0x20;

pub const PIC_1_OFFSET: u8 = 0x20;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// Lines per controller.
pub const IRQ_LINES: u8 = 8;

/// First vector not reserved for CPU exceptions.
const FIRST_FREE_VECTOR: u8 = 32;

/// Interrupt mask registers of both controllers, bit set = line disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PicMasks {
    pub master: u8,
    pub slave: u8,
}

/// Master/slave 8259 pair wired in the standard PC cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedPics {
    master_offset: u8,
    slave_offset: u8,
}

impl ChainedPics {
    /// The fixed PC layout: master at 0x20, slave at 0x28.
    pub const fn new() -> Self {
        Self {
            master_offset: PIC_1_OFFSET,
            slave_offset: PIC_2_OFFSET,
        }
    }

    /// Custom offsets, rejected if they would collide with exception
    /// vectors, with each other, or are not 8-aligned.
    pub fn try_new(master_offset: u8, slave_offset: u8) -> TableResult<Self> {
        for offset in [master_offset, slave_offset] {
            if offset % IRQ_LINES != 0 {
                return Err(TableError::MisalignedOffset(offset));
            }
            if offset < FIRST_FREE_VECTOR {
                return Err(TableError::ReservedVector(offset));
            }
        }
        if master_offset == slave_offset {
            return Err(TableError::OverlappingOffsets {
                master: master_offset,
                slave: slave_offset,
            });
        }
        Ok(Self {
            master_offset,
            slave_offset,
        })
    }

    pub const fn master_offset(&self) -> u8 {
        self.master_offset
    }

    pub const fn slave_offset(&self) -> u8 {
        self.slave_offset
    }

    /// Vector raised for `irq` (0..16).
    pub fn irq_vector(&self, irq: u8) -> TableResult<u8> {
        match irq {
            0..=7 => Ok(self.master_offset + irq),
            8..=15 => Ok(self.slave_offset + (irq - IRQ_LINES)),
            _ => Err(TableError::IrqOutOfRange(irq)),
        }
    }

    fn master_handles(&self, vector: u8) -> bool {
        (self.master_offset..self.master_offset + IRQ_LINES).contains(&vector)
    }

    fn slave_handles(&self, vector: u8) -> bool {
        (self.slave_offset..self.slave_offset + IRQ_LINES).contains(&vector)
    }

    /// Whether `vector` is raised by one of the two controllers.
    pub fn handles_interrupt(&self, vector: u8) -> bool {
        self.master_handles(vector) || self.slave_handles(vector)
    }

    /// Reinitialize both controllers with this pair's offsets.
    ///
    /// Returns the masks that were saved before the init sequence and
    /// written back after it.
    ///
    /// # Safety
    /// `ports` must reach the PIC pair, and interrupts must be disabled:
    /// until the sequence completes IRQs may fire on stale vectors.
    pub unsafe fn initialize<P: PortIo>(&self, ports: &mut P) -> PicMasks {
        let masks = self.read_masks(ports);
        trace!("pic: saved masks {:#04x}/{:#04x}", masks.master, masks.slave);

        // Start initialization
        ports.write_byte(PIC_MASTER_COMMAND, ICW1_INIT);
        ports.write_byte(PIC_SLAVE_COMMAND, ICW1_INIT);

        // Remap vectors
        ports.write_byte(PIC_MASTER_DATA, self.master_offset);
        ports.write_byte(PIC_SLAVE_DATA, self.slave_offset);

        // Setup cascade
        ports.write_byte(PIC_MASTER_DATA, MASTER_CASCADE);
        ports.write_byte(PIC_SLAVE_DATA, SLAVE_CASCADE);

        // 8086 mode
        ports.write_byte(PIC_MASTER_DATA, ICW4_8086);
        ports.write_byte(PIC_SLAVE_DATA, ICW4_8086);

        self.write_masks(ports, masks);

        debug!(
            "pic: remapped IRQ 0-7 to {:#04x}, IRQ 8-15 to {:#04x}",
            self.master_offset, self.slave_offset
        );
        masks
    }

    /// Read both interrupt mask registers.
    ///
    /// # Safety
    /// `ports` must reach the PIC pair and no init sequence may be in flight.
    pub unsafe fn read_masks<P: PortIo>(&self, ports: &mut P) -> PicMasks {
        PicMasks {
            master: ports.read_byte(PIC_MASTER_DATA),
            slave: ports.read_byte(PIC_SLAVE_DATA),
        }
    }

    /// Write both interrupt mask registers.
    ///
    /// # Safety
    /// Unmasking a line whose vector has no gate lets the CPU fault on it.
    pub unsafe fn write_masks<P: PortIo>(&self, ports: &mut P, masks: PicMasks) {
        ports.write_byte(PIC_MASTER_DATA, masks.master);
        ports.write_byte(PIC_SLAVE_DATA, masks.slave);
    }

    /// Acknowledge `vector` so the controller can deliver the next IRQ.
    ///
    /// Vectors that do not belong to the pair are ignored.
    ///
    /// # Safety
    /// Acknowledging an interrupt that is not in service confuses the
    /// controller's priority logic.
    pub unsafe fn notify_end_of_interrupt<P: PortIo>(&self, ports: &mut P, vector: u8) {
        if !self.handles_interrupt(vector) {
            return;
        }
        if self.slave_handles(vector) {
            ports.write_byte(PIC_SLAVE_COMMAND, EOI);
        }
        ports.write_byte(PIC_MASTER_COMMAND, EOI);
    }
}

impl Default for ChainedPics {
    fn default() -> Self {
        Self::new()
    }
}
