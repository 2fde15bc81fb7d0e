//! x86 hardware plumbing: port I/O, the 8259 pair and the table loaders.

#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod flush;
pub mod pic;
pub mod port;
