use core::mem::size_of;

use x86_64::PrivilegeLevel;

use super::*;
use crate::testing::{EmulatedPorts, Event, RecordingLoader};

fn sample_handlers() -> HandlerTable {
    HandlerTable::from_fn(|vector| 0x0010_0000 + 0x0001_0010 * u32::from(vector))
}

fn built_table(config: &Config) -> InterruptDescriptorTable {
    let mut idt = InterruptDescriptorTable::new();
    let mut ports = EmulatedPorts::new(0xFF, 0xFF);
    let _ = unsafe { idt.build(&sample_handlers(), &ChainedPics::new(), &mut ports, config) };
    idt
}

#[test]
fn gate_is_eight_bytes() {
    assert_eq!(size_of::<InterruptGate>(), 8);
    assert_eq!(size_of::<InterruptDescriptorTable>(), IDT_ENTRIES * 8);
}

#[test]
fn exactly_forty_eight_gates_are_present() {
    let idt = built_table(&Config::new().with_gate_privilege(PrivilegeLevel::Ring0));

    assert_eq!(idt.present_count(), 48);
    for (vector, gate) in idt.entries().iter().enumerate() {
        if vector < 48 {
            assert!(gate.is_present(), "vector {} missing", vector);
        } else {
            assert_eq!(gate.to_bits(), 0, "vector {} not zeroed", vector);
        }
    }
}

#[test]
fn installed_gates_point_at_their_handlers() {
    let handlers = sample_handlers();
    let idt = built_table(&Config::new());

    for vector in 0..EXCEPTION_COUNT {
        let gate = idt.gate(vector as u8);
        assert_eq!(gate.handler(), handlers.exceptions[vector]);
        assert_eq!(gate.selector(), KERNEL_CODE_SELECTOR);
        assert_eq!(gate.zero, 0);
    }
    for line in 0..IRQ_COUNT {
        let gate = idt.gate((EXCEPTION_COUNT + line) as u8);
        assert_eq!(gate.handler(), handlers.irqs[line]);
        assert_eq!(gate.selector().0, 0x08);
    }
}

#[test]
fn last_exception_is_a_ring0_interrupt_gate() {
    let idt = built_table(&Config::new().with_gate_privilege(PrivilegeLevel::Ring0));

    let gate = idt.gate(31);
    assert!(gate.is_present());
    assert_eq!(gate.flags, 0x8E);
    assert_eq!(gate.flags().gate_type(), Some(GateType::Interrupt32));
    assert_eq!(gate.flags().privilege(), PrivilegeLevel::Ring0);
    assert!(!idt.gate(48).is_present());
}

#[test]
fn user_gate_privilege_sets_dpl3() {
    let idt = built_table(&Config::new().with_gate_privilege(PrivilegeLevel::Ring3));

    assert_eq!(idt.gate(0).flags, 0xEE);
    assert_eq!(idt.gate(47).flags().privilege(), PrivilegeLevel::Ring3);
    assert_eq!(idt.present_count(), 48);
}

#[test]
fn stale_gates_are_cleared_on_rebuild() {
    let mut idt = InterruptDescriptorTable::new();
    idt.set_gate(
        0x80,
        InterruptGate::new(0xDEAD_BEEF, KERNEL_CODE_SELECTOR, GateFlags::INTERRUPT_RING0),
    );
    let mut ports = EmulatedPorts::new(0, 0);
    let _ = unsafe { idt.build(&sample_handlers(), &ChainedPics::new(), &mut ports, &Config::new()) };

    assert_eq!(idt.gate(0x80), &InterruptGate::MISSING);
    assert_eq!(idt.present_count(), 48);
}

#[test]
fn build_remaps_the_pics() {
    let mut idt = InterruptDescriptorTable::new();
    let mut ports = EmulatedPorts::new(0xFA, 0xEF);
    let _ = unsafe { idt.build(&sample_handlers(), &ChainedPics::new(), &mut ports, &Config::new()) };

    assert_eq!(ports.master.offset, 0x20);
    assert_eq!(ports.slave.offset, 0x28);
    assert_eq!(ports.master.mask, 0xFA);
    assert_eq!(ports.slave.mask, 0xEF);
}

#[test]
fn irq_gates_follow_custom_offsets() {
    let handlers = sample_handlers();
    let pics = ChainedPics::try_new(0x50, 0x60).unwrap();
    let mut idt = InterruptDescriptorTable::new();
    let mut ports = EmulatedPorts::new(0, 0);
    let _ = unsafe { idt.build(&handlers, &pics, &mut ports, &Config::new()) };

    assert_eq!(idt.gate(0x50).handler(), handlers.irqs[0]);
    assert_eq!(idt.gate(0x67).handler(), handlers.irqs[15]);
    assert!(!idt.gate(0x20).is_present());
    assert_eq!(ports.slave.offset, 0x60);
}

#[test]
fn gate_bits_round_trip() {
    let gate = InterruptGate::new(0xC010_2345, KERNEL_CODE_SELECTOR, GateFlags::INTERRUPT_RING0);
    assert_eq!(gate.offset_low, 0x2345);
    assert_eq!(gate.offset_high, 0xC010);
    assert_eq!(gate.to_bits(), 0xC010_8E00_0008_2345);
    assert_eq!(InterruptGate::from_bits(gate.to_bits()), gate);
}

#[test]
fn gate_flags_decode_the_flags_byte() {
    let user_trap = GateFlags::new(GateType::Trap32, PrivilegeLevel::Ring3);
    assert_eq!(user_trap.bits(), 0xEF);
    assert!(user_trap.contains(GateFlags::PRESENT | GateFlags::DPL_LOW | GateFlags::DPL_HIGH));
    assert!(!user_trap.contains(GateFlags::STORAGE_SEGMENT));
    assert_eq!(user_trap.gate_type(), Some(GateType::Trap32));

    let lowered = user_trap.with_privilege(PrivilegeLevel::Ring0);
    assert_eq!(lowered.bits(), 0x8F);
    assert_eq!(lowered.privilege(), PrivilegeLevel::Ring0);

    assert_eq!(GateFlags::INTERRUPT_RING0.bits(), 0x8E);
    assert!(!InterruptGate::MISSING.flags().is_present());
    assert_eq!(GateFlags::empty().gate_type(), None);
}

#[test]
fn pointer_covers_all_vectors() {
    let mut idt = InterruptDescriptorTable::new();
    let mut ports = EmulatedPorts::new(0, 0);
    let mut loader = RecordingLoader::default();
    let handle = unsafe { idt.build(&sample_handlers(), &ChainedPics::new(), &mut ports, &Config::new()) };
    let pointer = handle.pointer();
    unsafe { handle.activate(&mut loader) };

    let limit = pointer.limit;
    assert_eq!(limit, 2047);
    let base = pointer.base;
    assert_eq!(base, idt.entries().as_ptr() as usize as u32);
    assert_eq!(loader.loads(), [Event::LoadIdt(pointer)]);
}
