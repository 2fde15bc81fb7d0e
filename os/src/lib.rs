//! Protected-mode descriptor tables for early boot.
//!
//! Builds the five-entry flat GDT and the 256-entry IDT, remaps the legacy
//! 8259 pair onto vectors 0x20..0x30, and hands both tables to the CPU.
//! Everything runs once, on the boot thread, with interrupts masked.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod kernel;
pub mod serial;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{TableError, TableResult};
pub use kernel::activation::{DescriptorTable, DescriptorTablePointer, TableHandle, TableLoader};
pub use kernel::arch::x86::pic::{ChainedPics, PicMasks};
pub use kernel::arch::x86::port::PortIo;
pub use kernel::gdt::{GlobalDescriptorTable, SegmentDescriptor};
pub use kernel::idt::{HandlerTable, InterruptDescriptorTable, InterruptGate};
pub use kernel::{live_tables, DescriptorTables};

#[cfg(all(target_arch = "x86", target_os = "none"))]
pub use kernel::init_descriptor_tables;
