//! Entry points installed in the IDT
//!
//! The handlers themselves are assembly trampolines that save CPU state
//! and call into the dispatcher; the table only needs their addresses.

/// CPU exception vectors, 0..32.
pub const EXCEPTION_COUNT: usize = 32;

/// PIC IRQ lines, 0..16.
pub const IRQ_COUNT: usize = 16;

/// Addresses of the 48 installed entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerTable {
    /// `isr0..isr31`, indexed by vector.
    pub exceptions: [u32; EXCEPTION_COUNT],
    /// `irq0..irq15`, indexed by IRQ line.
    pub irqs: [u32; IRQ_COUNT],
}

impl HandlerTable {
    /// Build from a function of the installed vector (0..48).
    pub fn from_fn(mut address: impl FnMut(u8) -> u32) -> Self {
        let mut exceptions = [0; EXCEPTION_COUNT];
        for (vector, slot) in exceptions.iter_mut().enumerate() {
            *slot = address(vector as u8);
        }
        let mut irqs = [0; IRQ_COUNT];
        for (line, slot) in irqs.iter_mut().enumerate() {
            *slot = address((EXCEPTION_COUNT + line) as u8);
        }
        Self { exceptions, irqs }
    }
}

/// Trampolines linked in from the assembly stubs.
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod trampolines {
    use super::HandlerTable;

    macro_rules! entry_points {
        ($table:ident: $($name:ident),* $(,)?) => {
            extern "C" {
                $(fn $name();)*
            }

            static $table: &[unsafe extern "C" fn()] = &[$($name),*];
        };
    }

    entry_points!(EXCEPTION_STUBS:
        isr0, isr1, isr2, isr3, isr4, isr5, isr6, isr7,
        isr8, isr9, isr10, isr11, isr12, isr13, isr14, isr15,
        isr16, isr17, isr18, isr19, isr20, isr21, isr22, isr23,
        isr24, isr25, isr26, isr27, isr28, isr29, isr30, isr31,
    );

    entry_points!(IRQ_STUBS:
        irq0, irq1, irq2, irq3, irq4, irq5, irq6, irq7,
        irq8, irq9, irq10, irq11, irq12, irq13, irq14, irq15,
    );

    /// Link-time addresses of `isr0..isr31` and `irq0..irq15`.
    pub fn handler_table() -> HandlerTable {
        HandlerTable::from_fn(|vector| {
            let vector = usize::from(vector);
            let stub = match EXCEPTION_STUBS.get(vector) {
                Some(stub) => *stub,
                None => IRQ_STUBS[vector - EXCEPTION_STUBS.len()],
            };
            stub as usize as u32
        })
    }
}
