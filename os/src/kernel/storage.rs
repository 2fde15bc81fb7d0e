//! Global storage for the descriptor tables

use spin::{Mutex, MutexGuard, Once};

use super::DescriptorTables;

/// Backing storage. Lives in a static so the addresses handed to
/// `lgdt`/`lidt` stay valid for the lifetime of the kernel.
static TABLES: Mutex<DescriptorTables> = Mutex::new(DescriptorTables::new());

/// Published once the tables are live. Shared access only.
static LIVE: Once<&'static DescriptorTables> = Once::new();

/// Run `init` on the static tables exactly once, then freeze them.
///
/// The lock taken for `init` is never released, so nothing can obtain a
/// mutable reference to the tables after activation. Later calls return
/// the already-published tables without running `init`.
#[cfg_attr(not(all(target_arch = "x86", target_os = "none")), allow(dead_code))]
pub(crate) fn install<F>(init: F) -> &'static DescriptorTables
where
    F: FnOnce(&mut DescriptorTables),
{
    *LIVE.call_once(|| {
        let mut tables = TABLES.lock();
        init(&mut tables);
        let frozen: &'static DescriptorTables = MutexGuard::leak(tables);
        frozen
    })
}

/// The tables the CPU is using, once [`install`] has run.
pub fn live_tables() -> Option<&'static DescriptorTables> {
    LIVE.get().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::kernel::idt::HandlerTable;
    use crate::testing::{EmulatedPorts, RecordingLoader};

    // The statics are process-wide, so everything that touches them lives
    // in this one test.
    #[test]
    fn installed_tables_are_frozen() {
        assert!(live_tables().is_none());
        {
            let tables = TABLES.lock();
            assert_eq!(tables.idt.present_count(), 0);
            assert!(tables.gdt.entries().iter().all(|entry| entry.to_bits() == 0));
        }

        let mut ports = EmulatedPorts::new(0, 0);
        let mut loader = RecordingLoader::default();
        let handlers = HandlerTable::from_fn(|vector| 0x0020_0000 + u32::from(vector) * 16);
        let live = install(|tables| unsafe {
            tables.init(&mut ports, &mut loader, &handlers, &Config::new())
        });

        assert_eq!(live.idt.present_count(), 48);
        assert_eq!(loader.loads().len(), 2);
        assert!(TABLES.try_lock().is_none());
        assert!(core::ptr::eq(live_tables().unwrap(), live));

        let again = install(|tables| tables.idt.clear());
        assert!(core::ptr::eq(again, live));
        assert_eq!(again.idt.present_count(), 48);
    }
}
