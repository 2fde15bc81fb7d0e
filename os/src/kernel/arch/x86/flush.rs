//! Table activation through the assembly flush routines.
//!
//! `gdt_flush` runs `lgdt`, far-jumps to reload CS with the kernel code
//! selector and reloads DS/ES/FS/GS/SS with the kernel data selector.
//! `idt_flush` runs `lidt`. Both take the linear address of the pointer
//! record.

use crate::kernel::activation::{DescriptorTablePointer, TableLoader};

extern "C" {
    fn gdt_flush(pointer: u32);
    fn idt_flush(pointer: u32);
}

/// Loads tables with the external flush routines.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlushLoader;

impl TableLoader for FlushLoader {
    unsafe fn load_gdt(&mut self, pointer: &DescriptorTablePointer) {
        gdt_flush(pointer as *const DescriptorTablePointer as u32);
    }

    unsafe fn load_idt(&mut self, pointer: &DescriptorTablePointer) {
        idt_flush(pointer as *const DescriptorTablePointer as u32);
    }
}
