pub mod activation;
pub mod arch;
pub mod gdt;
pub mod idt;
mod storage;

pub use storage::live_tables;

use log::info;

use crate::config::Config;
use activation::TableLoader;
use arch::x86::pic::ChainedPics;
use arch::x86::port::PortIo;
use gdt::GlobalDescriptorTable;
use idt::{HandlerTable, InterruptDescriptorTable};

/// Both boot tables, owned together so they can live in one static.
#[derive(Debug, Clone)]
pub struct DescriptorTables {
    pub gdt: GlobalDescriptorTable,
    pub idt: InterruptDescriptorTable,
}

impl DescriptorTables {
    pub const fn new() -> Self {
        Self {
            gdt: GlobalDescriptorTable::new(),
            idt: InterruptDescriptorTable::new(),
        }
    }

    /// Build and activate the GDT, then build the IDT (remapping the PIC
    /// pair on the way) and activate it.
    ///
    /// # Safety
    /// Interrupts must be disabled, `ports` must reach the PIC pair, every
    /// address in `handlers` must be a valid entry point, and `self` must
    /// stay in place for as long as the CPU uses the tables.
    pub unsafe fn init<P: PortIo, L: TableLoader>(
        &mut self,
        ports: &mut P,
        loader: &mut L,
        handlers: &HandlerTable,
        config: &Config,
    ) {
        self.gdt.build().activate(loader);
        info!("GDT loaded");

        self.idt
            .build(handlers, &ChainedPics::new(), ports, config)
            .activate(loader);
        info!("IDT loaded; IRQ 0-15 at vectors 0x20-0x2f");
    }
}

impl Default for DescriptorTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Build and load the GDT and IDT and remap the PIC pair.
///
/// Call once, early in boot, before interrupts are enabled. Later calls
/// return the tables that are already live without touching the hardware.
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub fn init_descriptor_tables() -> &'static DescriptorTables {
    use arch::x86::flush::FlushLoader;
    use arch::x86::port::IoPorts;
    use idt::handlers::trampolines;

    storage::install(|tables| {
        let config = Config::new();
        // Fails only if the kernel installed its own logger first.
        let _ = crate::serial::init_logging(config.log_level);

        let handlers = trampolines::handler_table();
        // SAFETY: the tables live in a static, the trampolines are linked
        // in, and the boot thread has not enabled interrupts yet.
        unsafe {
            tables.init(&mut IoPorts, &mut FlushLoader, &handlers, &config);
        }
    })
}
