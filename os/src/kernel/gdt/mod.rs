//! Global Descriptor Table (GDT)
//!
//! A flat 32-bit protected-mode layout: every segment starts at 0 and
//! spans 4 GiB, so segmentation only carries privilege.
//!
//! | Slot | Selector | Segment          |
//! |------|----------|------------------|
//! | 0    | 0x00     | null             |
//! | 1    | 0x08     | kernel code      |
//! | 2    | 0x10     | kernel data      |
//! | 3    | 0x1B     | user code (DPL3) |
//! | 4    | 0x23     | user data (DPL3) |

pub mod descriptor;

use log::{debug, trace};
use x86_64::structures::gdt::SegmentSelector;
use x86_64::PrivilegeLevel;

pub use descriptor::{SegmentAccess, SegmentDescriptor, SegmentFlags};

use super::activation::{DescriptorTable, DescriptorTablePointer, TableHandle, TableLoader};
use crate::error::{TableError, TableResult};

/// Number of GDT slots.
pub const GDT_ENTRIES: usize = 5;

pub const KERNEL_CODE_SELECTOR: SegmentSelector = SegmentSelector::new(1, PrivilegeLevel::Ring0);
pub const KERNEL_DATA_SELECTOR: SegmentSelector = SegmentSelector::new(2, PrivilegeLevel::Ring0);
pub const USER_CODE_SELECTOR: SegmentSelector = SegmentSelector::new(3, PrivilegeLevel::Ring3);
pub const USER_DATA_SELECTOR: SegmentSelector = SegmentSelector::new(4, PrivilegeLevel::Ring3);

/// `(base, limit, access, granularity)` for each slot, in slot order.
pub const FLAT_LAYOUT: [(u32, u32, u8, u8); GDT_ENTRIES] = [
    (0, 0, 0, 0),
    (0, 0xFFFF_FFFF, 0x9A, 0xCF),
    (0, 0xFFFF_FFFF, 0x92, 0xCF),
    (0, 0xFFFF_FFFF, 0xFA, 0xCF),
    (0, 0xFFFF_FFFF, 0xF2, 0xCF),
];

/// The five-slot segment table.
#[repr(C, align(8))]
#[derive(Debug, Clone)]
pub struct GlobalDescriptorTable {
    entries: [SegmentDescriptor; GDT_ENTRIES],
}

impl GlobalDescriptorTable {
    /// An all-null table.
    pub const fn new() -> Self {
        Self {
            entries: [SegmentDescriptor::NULL; GDT_ENTRIES],
        }
    }

    /// Overwrite slot `index`.
    ///
    /// # Panics
    /// If `index` is not below [`GDT_ENTRIES`].
    pub fn set(&mut self, index: usize, descriptor: SegmentDescriptor) {
        self.entries[index] = descriptor;
    }

    pub fn try_set(&mut self, index: usize, descriptor: SegmentDescriptor) -> TableResult<()> {
        let slot = self.entries.get_mut(index).ok_or(TableError::SlotOutOfRange {
            index,
            capacity: GDT_ENTRIES,
        })?;
        *slot = descriptor;
        Ok(())
    }

    pub fn entry(&self, index: usize) -> Option<&SegmentDescriptor> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[SegmentDescriptor; GDT_ENTRIES] {
        &self.entries
    }

    /// Write the flat layout into every slot.
    pub fn build(&mut self) -> TableHandle<'_, Self> {
        for (index, &(base, limit, access, granularity)) in FLAT_LAYOUT.iter().enumerate() {
            self.set(index, SegmentDescriptor::new(base, limit, access, granularity));
            trace!("gdt[{}] = {:#018x}", index, self.entries[index].to_bits());
        }

        let handle = TableHandle::new(&*self);
        let pointer = handle.pointer();
        let (base, limit) = (pointer.base, pointer.limit);
        debug!("gdt: {} descriptors at {:#010x}, limit {:#06x}", GDT_ENTRIES, base, limit);
        handle
    }
}

impl Default for GlobalDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorTable for GlobalDescriptorTable {
    type Entry = SegmentDescriptor;
    const ENTRIES: usize = GDT_ENTRIES;

    unsafe fn load<L: TableLoader>(loader: &mut L, pointer: &DescriptorTablePointer) {
        loader.load_gdt(pointer);
    }

    fn as_ptr(&self) -> *const SegmentDescriptor {
        self.entries.as_ptr()
    }
}
