//! Interrupt gate encoding

use bitflags::bitflags;
use x86_64::structures::gdt::SegmentSelector;
use x86_64::PrivilegeLevel;

/// Gate type nibble of the flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GateType {
    Task = 0x5,
    Interrupt16 = 0x6,
    Trap16 = 0x7,
    Interrupt32 = 0xE,
    Trap32 = 0xF,
}

impl GateType {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x0F {
            0x5 => Some(Self::Task),
            0x6 => Some(Self::Interrupt16),
            0x7 => Some(Self::Trap16),
            0xE => Some(Self::Interrupt32),
            0xF => Some(Self::Trap32),
            _ => None,
        }
    }
}

bitflags! {
    /// Flags byte of a gate.
    ///
    /// The low nibble holds the [`GateType`] and bits 5 and 6 hold the
    /// descriptor privilege level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GateFlags: u8 {
        const GATE_TYPE = 0x0F;
        /// Must be clear for interrupt and trap gates.
        const STORAGE_SEGMENT = 1 << 4;
        const DPL_LOW = 1 << 5;
        const DPL_HIGH = 1 << 6;
        const PRESENT = 1 << 7;
    }
}

const DPL_SHIFT: u8 = 5;
const DPL_MASK: u8 = 0b11 << DPL_SHIFT;

impl GateFlags {
    /// Present, ring 0, 32-bit interrupt gate.
    pub const INTERRUPT_RING0: Self = Self::new(GateType::Interrupt32, PrivilegeLevel::Ring0);

    /// A present gate of `gate_type` callable from `ring` and below.
    pub const fn new(gate_type: GateType, ring: PrivilegeLevel) -> Self {
        Self::from_bits_retain(Self::PRESENT.bits() | gate_type as u8).with_privilege(ring)
    }

    pub const fn with_privilege(self, ring: PrivilegeLevel) -> Self {
        Self::from_bits_retain((self.bits() & !DPL_MASK) | ((ring as u8) << DPL_SHIFT))
    }

    pub const fn is_present(self) -> bool {
        self.contains(Self::PRESENT)
    }

    pub fn privilege(self) -> PrivilegeLevel {
        PrivilegeLevel::from_u16(u16::from((self.bits() & DPL_MASK) >> DPL_SHIFT))
    }

    pub const fn gate_type(self) -> Option<GateType> {
        GateType::from_bits(self.bits())
    }
}

/// One IDT slot, in the exact layout the CPU reads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptGate {
    pub offset_low: u16,
    pub selector: u16,
    /// Reserved, must be zero.
    pub zero: u8,
    pub flags: u8,
    pub offset_high: u16,
}

impl InterruptGate {
    /// Not present; the CPU raises #NP (or #GP) if this vector fires.
    pub const MISSING: Self = Self {
        offset_low: 0,
        selector: 0,
        zero: 0,
        flags: 0,
        offset_high: 0,
    };

    pub const fn new(handler: u32, selector: SegmentSelector, flags: GateFlags) -> Self {
        Self {
            offset_low: (handler & 0xFFFF) as u16,
            selector: selector.0,
            zero: 0,
            flags: flags.bits(),
            offset_high: ((handler >> 16) & 0xFFFF) as u16,
        }
    }

    /// Entry point address.
    pub const fn handler(&self) -> u32 {
        self.offset_low as u32 | (self.offset_high as u32) << 16
    }

    pub const fn selector(&self) -> SegmentSelector {
        SegmentSelector(self.selector)
    }

    pub const fn flags(&self) -> GateFlags {
        GateFlags::from_bits_retain(self.flags)
    }

    pub const fn is_present(&self) -> bool {
        self.flags().is_present()
    }

    pub const fn to_bits(&self) -> u64 {
        self.offset_low as u64
            | (self.selector as u64) << 16
            | (self.zero as u64) << 32
            | (self.flags as u64) << 40
            | (self.offset_high as u64) << 48
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self {
            offset_low: bits as u16,
            selector: (bits >> 16) as u16,
            zero: (bits >> 32) as u8,
            flags: (bits >> 40) as u8,
            offset_high: (bits >> 48) as u16,
        }
    }
}

impl Default for InterruptGate {
    fn default() -> Self {
        Self::MISSING
    }
}
