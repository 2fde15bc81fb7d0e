//! Emulated hardware for host tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::kernel::activation::{DescriptorTablePointer, TableLoader};
use crate::kernel::arch::x86::port::{
    PortIo, COM1, PIC_MASTER_COMMAND, PIC_MASTER_DATA, PIC_SLAVE_COMMAND, PIC_SLAVE_DATA,
};

const LSR_THRE: u8 = 0x20;

/// Something observable that happened during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Read { port: u16, value: u8 },
    Write { port: u16, value: u8 },
    LoadGdt(DescriptorTablePointer),
    LoadIdt(DescriptorTablePointer),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitStep {
    Ready,
    Offset,
    Cascade,
    Mode,
}

/// One 8259 as far as software can tell.
#[derive(Debug, Clone)]
pub struct Emulated8259 {
    pub mask: u8,
    pub offset: u8,
    pub cascade: u8,
    pub mode: u8,
    pub eoi_count: usize,
    expects_icw4: bool,
    single: bool,
    step: InitStep,
}

impl Emulated8259 {
    pub fn new(mask: u8) -> Self {
        Self {
            mask,
            offset: 0,
            cascade: 0,
            mode: 0,
            eoi_count: 0,
            expects_icw4: false,
            single: false,
            step: InitStep::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.step == InitStep::Ready
    }

    fn command(&mut self, value: u8) {
        if value & 0x10 != 0 {
            // ICW1 clears the mask register and restarts the init sequence.
            self.mask = 0;
            self.expects_icw4 = value & 0x01 != 0;
            self.single = value & 0x02 != 0;
            self.step = InitStep::Offset;
        } else if value == 0x20 {
            self.eoi_count += 1;
        }
    }

    fn data_write(&mut self, value: u8) {
        self.step = match self.step {
            InitStep::Offset => {
                self.offset = value & 0xF8;
                if !self.single {
                    InitStep::Cascade
                } else if self.expects_icw4 {
                    InitStep::Mode
                } else {
                    InitStep::Ready
                }
            }
            InitStep::Cascade => {
                self.cascade = value;
                if self.expects_icw4 {
                    InitStep::Mode
                } else {
                    InitStep::Ready
                }
            }
            InitStep::Mode => {
                self.mode = value;
                InitStep::Ready
            }
            InitStep::Ready => {
                self.mask = value;
                InitStep::Ready
            }
        };
    }
}

/// Master/slave PIC pair plus a COM1 transmit sink.
pub struct EmulatedPorts {
    pub master: Emulated8259,
    pub slave: Emulated8259,
    pub serial: Vec<u8>,
    journal: Journal,
}

impl EmulatedPorts {
    pub fn new(master_mask: u8, slave_mask: u8) -> Self {
        Self::with_journal(master_mask, slave_mask, Journal::default())
    }

    pub fn with_journal(master_mask: u8, slave_mask: u8, journal: Journal) -> Self {
        Self {
            master: Emulated8259::new(master_mask),
            slave: Emulated8259::new(slave_mask),
            serial: Vec::new(),
            journal,
        }
    }

    /// Every port write, in order.
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::Write { port, value } => Some((port, value)),
                _ => None,
            })
            .collect()
    }
}

impl PortIo for EmulatedPorts {
    unsafe fn read_byte(&mut self, port: u16) -> u8 {
        let value = match port {
            PIC_MASTER_DATA => self.master.mask,
            PIC_SLAVE_DATA => self.slave.mask,
            p if p == COM1 + 5 => LSR_THRE,
            _ => 0xFF,
        };
        self.journal.borrow_mut().push(Event::Read { port, value });
        value
    }

    unsafe fn write_byte(&mut self, port: u16, value: u8) {
        match port {
            PIC_MASTER_COMMAND => self.master.command(value),
            PIC_SLAVE_COMMAND => self.slave.command(value),
            PIC_MASTER_DATA => self.master.data_write(value),
            PIC_SLAVE_DATA => self.slave.data_write(value),
            COM1 => self.serial.push(value),
            _ => {}
        }
        self.journal.borrow_mut().push(Event::Write { port, value });
    }
}

/// Records load requests instead of executing `lgdt`/`lidt`.
#[derive(Default)]
pub struct RecordingLoader {
    journal: Journal,
}

impl RecordingLoader {
    pub fn with_journal(journal: Journal) -> Self {
        Self { journal }
    }

    pub fn loads(&self) -> Vec<Event> {
        self.journal
            .borrow()
            .iter()
            .copied()
            .filter(|event| matches!(event, Event::LoadGdt(_) | Event::LoadIdt(_)))
            .collect()
    }
}

impl TableLoader for RecordingLoader {
    unsafe fn load_gdt(&mut self, pointer: &DescriptorTablePointer) {
        self.journal.borrow_mut().push(Event::LoadGdt(*pointer));
    }

    unsafe fn load_idt(&mut self, pointer: &DescriptorTablePointer) {
        self.journal.borrow_mut().push(Event::LoadIdt(*pointer));
    }
}
