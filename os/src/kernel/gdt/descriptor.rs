//! Segment descriptor encoding
//!
//! The hardware splits both the base and the limit of a segment across
//! non-contiguous fields, so a descriptor is kept in its exact in-memory
//! layout and converted to and from logical values here.

use bitflags::bitflags;
use x86_64::PrivilegeLevel;

bitflags! {
    /// Access byte of a code or data segment descriptor.
    ///
    /// Bits 5 and 6 hold the descriptor privilege level and are handled
    /// by [`SegmentAccess::with_privilege`] rather than as flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentAccess: u8 {
        const ACCESSED = 1 << 0;
        /// Readable for code segments, writable for data segments.
        const READ_WRITE = 1 << 1;
        /// Conforming for code, expand-down for data.
        const CONFORMING = 1 << 2;
        const EXECUTABLE = 1 << 3;
        /// Set for code/data, clear for system descriptors.
        const DESCRIPTOR_TYPE = 1 << 4;
        const DPL_LOW = 1 << 5;
        const DPL_HIGH = 1 << 6;
        const PRESENT = 1 << 7;
    }
}

const DPL_SHIFT: u8 = 5;
const DPL_MASK: u8 = 0b11 << DPL_SHIFT;

impl SegmentAccess {
    pub const KERNEL_CODE: Self = Self::code(PrivilegeLevel::Ring0);
    pub const KERNEL_DATA: Self = Self::data(PrivilegeLevel::Ring0);
    pub const USER_CODE: Self = Self::code(PrivilegeLevel::Ring3);
    pub const USER_DATA: Self = Self::data(PrivilegeLevel::Ring3);

    /// Present, executable, readable.
    pub const fn code(ring: PrivilegeLevel) -> Self {
        Self::from_bits_retain(
            Self::PRESENT.bits()
                | Self::DESCRIPTOR_TYPE.bits()
                | Self::EXECUTABLE.bits()
                | Self::READ_WRITE.bits(),
        )
        .with_privilege(ring)
    }

    /// Present, writable.
    pub const fn data(ring: PrivilegeLevel) -> Self {
        Self::from_bits_retain(
            Self::PRESENT.bits() | Self::DESCRIPTOR_TYPE.bits() | Self::READ_WRITE.bits(),
        )
        .with_privilege(ring)
    }

    pub const fn with_privilege(self, ring: PrivilegeLevel) -> Self {
        Self::from_bits_retain((self.bits() & !DPL_MASK) | ((ring as u8) << DPL_SHIFT))
    }

    pub fn privilege(self) -> PrivilegeLevel {
        PrivilegeLevel::from_u16(u16::from((self.bits() & DPL_MASK) >> DPL_SHIFT))
    }
}

bitflags! {
    /// Upper nibble of the granularity byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u8 {
        /// Free for system software.
        const AVAILABLE = 1 << 4;
        const LONG_MODE = 1 << 5;
        /// 32-bit default operand size.
        const SIZE_32 = 1 << 6;
        /// Limit counts 4 KiB pages instead of bytes.
        const GRANULARITY = 1 << 7;
    }
}

impl SegmentFlags {
    /// 32-bit segment, page granular: 0xC0.
    pub const FLAT_32: Self =
        Self::from_bits_retain(Self::SIZE_32.bits() | Self::GRANULARITY.bits());
}

/// Largest limit the 20-bit field can hold.
pub const MAX_LIMIT: u32 = 0xF_FFFF;

/// One GDT slot, in the exact layout the CPU reads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub limit_low: u16,
    pub base_low: u16,
    pub base_middle: u8,
    pub access: u8,
    /// Flags in the high nibble, limit bits 16..19 in the low nibble.
    pub granularity: u8,
    pub base_high: u8,
}

impl SegmentDescriptor {
    /// All-zero descriptor required in slot 0.
    pub const NULL: Self = Self {
        limit_low: 0,
        base_low: 0,
        base_middle: 0,
        access: 0,
        granularity: 0,
        base_high: 0,
    };

    /// Pack a segment from its logical fields.
    ///
    /// Only bits 0..20 of `limit` and the high nibble of `granularity`
    /// are stored; the rest is dropped, as the hardware format has no
    /// room for it.
    pub const fn new(base: u32, limit: u32, access: u8, granularity: u8) -> Self {
        Self {
            limit_low: (limit & 0xFFFF) as u16,
            base_low: (base & 0xFFFF) as u16,
            base_middle: ((base >> 16) & 0xFF) as u8,
            access,
            granularity: ((limit >> 16) & 0x0F) as u8 | (granularity & 0xF0),
            base_high: ((base >> 24) & 0xFF) as u8,
        }
    }

    /// Typed form of [`SegmentDescriptor::new`].
    pub const fn segment(base: u32, limit: u32, access: SegmentAccess, flags: SegmentFlags) -> Self {
        Self::new(base, limit, access.bits(), flags.bits())
    }

    /// Flat 4 GiB segment with the given access rights.
    pub const fn flat(access: SegmentAccess) -> Self {
        Self::segment(0, u32::MAX, access, SegmentFlags::FLAT_32)
    }

    pub const fn base(&self) -> u32 {
        self.base_low as u32 | (self.base_middle as u32) << 16 | (self.base_high as u32) << 24
    }

    /// The 20-bit limit, before granularity scaling.
    pub const fn limit(&self) -> u32 {
        self.limit_low as u32 | ((self.granularity & 0x0F) as u32) << 16
    }

    /// Segment size in bytes minus one, after granularity scaling.
    pub fn byte_limit(&self) -> u32 {
        if self.flags().contains(SegmentFlags::GRANULARITY) {
            (self.limit() << 12) | 0xFFF
        } else {
            self.limit()
        }
    }

    pub const fn access(&self) -> SegmentAccess {
        SegmentAccess::from_bits_retain(self.access)
    }

    pub const fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_truncate(self.granularity)
    }

    pub const fn is_present(&self) -> bool {
        self.access & SegmentAccess::PRESENT.bits() != 0
    }

    /// The descriptor as the 64-bit value the CPU sees in memory.
    pub const fn to_bits(&self) -> u64 {
        self.limit_low as u64
            | (self.base_low as u64) << 16
            | (self.base_middle as u64) << 32
            | (self.access as u64) << 40
            | (self.granularity as u64) << 48
            | (self.base_high as u64) << 56
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self {
            limit_low: bits as u16,
            base_low: (bits >> 16) as u16,
            base_middle: (bits >> 32) as u8,
            access: (bits >> 40) as u8,
            granularity: (bits >> 48) as u8,
            base_high: (bits >> 56) as u8,
        }
    }
}

impl Default for SegmentDescriptor {
    fn default() -> Self {
        Self::NULL
    }
}
