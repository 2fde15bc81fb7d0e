//! Handing a built table to the CPU.
//!
//! A table is inert until its pointer record is loaded with `lgdt`/`lidt`.
//! The only way to obtain a pointer record is `build()`, which returns a
//! [`TableHandle`]; the handle borrows the table, so the table cannot be
//! edited between building and activation.

use core::marker::PhantomData;
use core::mem::size_of;

/// Operand of `lgdt`/`lidt`: size minus one, then the linear base.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorTablePointer {
    pub limit: u16,
    pub base: u32,
}

/// Issues the CPU instruction that makes a table live.
pub trait TableLoader {
    /// # Safety
    /// The table behind `pointer` must stay in place and unmodified for as
    /// long as the CPU uses it, and its code/data descriptors must match
    /// the selectors the loader reloads.
    unsafe fn load_gdt(&mut self, pointer: &DescriptorTablePointer);

    /// # Safety
    /// The table behind `pointer` must stay in place for as long as the
    /// CPU uses it, and every present gate must point at a valid handler.
    unsafe fn load_idt(&mut self, pointer: &DescriptorTablePointer);
}

/// A fixed-size hardware descriptor table.
pub trait DescriptorTable {
    type Entry;
    const ENTRIES: usize;

    /// Hand `pointer` to the matching load instruction.
    ///
    /// # Safety
    /// See [`TableLoader`].
    unsafe fn load<L: TableLoader>(loader: &mut L, pointer: &DescriptorTablePointer);

    /// Address of the first entry.
    fn as_ptr(&self) -> *const Self::Entry;

    fn limit() -> u16 {
        (Self::ENTRIES * size_of::<Self::Entry>() - 1) as u16
    }
}

/// Proof that a table has been built, carrying its pointer record.
#[must_use = "a built table does nothing until it is activated"]
pub struct TableHandle<'t, T: DescriptorTable> {
    pointer: DescriptorTablePointer,
    _table: PhantomData<&'t T>,
}

impl<'t, T: DescriptorTable> TableHandle<'t, T> {
    pub(crate) fn new(table: &'t T) -> Self {
        Self {
            pointer: DescriptorTablePointer {
                limit: T::limit(),
                base: table.as_ptr() as usize as u32,
            },
            _table: PhantomData,
        }
    }

    pub fn pointer(&self) -> DescriptorTablePointer {
        self.pointer
    }

    /// Make the table live.
    ///
    /// # Safety
    /// The table must outlive its use by the CPU, which for a boot table
    /// means it lives in static storage. Interrupts must be disabled.
    pub unsafe fn activate<L: TableLoader>(self, loader: &mut L) {
        let pointer = self.pointer;
        T::load(loader, &pointer);
    }
}
