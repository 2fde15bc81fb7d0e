//! Interrupt Descriptor Table (IDT)
//!
//! | Vector | Source                        |
//! |--------|-------------------------------|
//! | 0-31   | CPU exceptions (`isr0..31`)   |
//! | 32-39  | master PIC, IRQ 0-7           |
//! | 40-47  | slave PIC, IRQ 8-15           |
//! | 48-255 | not present                   |

pub mod gate;
pub mod handlers;

use log::{debug, trace};

pub use gate::{GateFlags, GateType, InterruptGate};
pub use handlers::{HandlerTable, EXCEPTION_COUNT, IRQ_COUNT};

use super::activation::{DescriptorTable, DescriptorTablePointer, TableHandle, TableLoader};
use super::arch::x86::pic::ChainedPics;
use super::arch::x86::port::PortIo;
use super::gdt::KERNEL_CODE_SELECTOR;
use crate::config::Config;

/// Number of IDT slots.
pub const IDT_ENTRIES: usize = 256;

/// The 256-slot interrupt table.
#[repr(C, align(8))]
#[derive(Debug, Clone)]
pub struct InterruptDescriptorTable {
    entries: [InterruptGate; IDT_ENTRIES],
}

impl InterruptDescriptorTable {
    /// A table with no present gates.
    pub const fn new() -> Self {
        Self {
            entries: [InterruptGate::MISSING; IDT_ENTRIES],
        }
    }

    /// Mark every vector not present.
    pub fn clear(&mut self) {
        self.entries.fill(InterruptGate::MISSING);
    }

    pub fn set_gate(&mut self, vector: u8, gate: InterruptGate) {
        self.entries[usize::from(vector)] = gate;
    }

    pub fn gate(&self, vector: u8) -> &InterruptGate {
        &self.entries[usize::from(vector)]
    }

    pub fn entries(&self) -> &[InterruptGate; IDT_ENTRIES] {
        &self.entries
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|gate| gate.is_present()).count()
    }

    /// Clear the table, install the exception gates, remap the PIC pair,
    /// then install one gate per IRQ line.
    ///
    /// # Safety
    /// `ports` must reach the PIC pair and interrupts must be disabled.
    pub unsafe fn build<P: PortIo>(
        &mut self,
        handlers: &HandlerTable,
        pics: &ChainedPics,
        ports: &mut P,
        config: &Config,
    ) -> TableHandle<'_, Self> {
        let flags = GateFlags::new(GateType::Interrupt32, config.gate_privilege);

        self.clear();

        for (vector, &handler) in handlers.exceptions.iter().enumerate() {
            self.install(vector as u8, handler, flags);
        }

        pics.initialize(ports);

        for (line, &handler) in handlers.irqs.iter().enumerate() {
            let vector = if line < 8 {
                pics.master_offset() + line as u8
            } else {
                pics.slave_offset() + (line - 8) as u8
            };
            self.install(vector, handler, flags);
        }

        let handle = TableHandle::new(&*self);
        let pointer = handle.pointer();
        let (base, limit) = (pointer.base, pointer.limit);
        debug!(
            "idt: {} gates present (flags {:#04x}) at {:#010x}, limit {:#06x}",
            self.present_count(),
            flags.bits(),
            base,
            limit
        );
        handle
    }

    fn install(&mut self, vector: u8, handler: u32, flags: GateFlags) {
        trace!("idt[{}] -> {:#010x}", vector, handler);
        self.set_gate(vector, InterruptGate::new(handler, KERNEL_CODE_SELECTOR, flags));
    }
}

impl Default for InterruptDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorTable for InterruptDescriptorTable {
    type Entry = InterruptGate;
    const ENTRIES: usize = IDT_ENTRIES;

    unsafe fn load<L: TableLoader>(loader: &mut L, pointer: &DescriptorTablePointer) {
        loader.load_idt(pointer);
    }

    fn as_ptr(&self) -> *const InterruptGate {
        self.entries.as_ptr()
    }
}

#[cfg(test)]
mod tests;
