//! # Platform-Specific Implementations
//!
//! Live access to the process the tracer is loaded into.
//!
//! Each platform module provides a type implementing both
//! [`MemoryReader`](crate::memory::MemoryReader) and
//! [`ModuleHost`](crate::symbols::ModuleHost) for the current process:
//!
//! - **Linux**: a `/proc/self/maps` snapshot for regions and module paths, including
//!   32-bit PE processes running under Wine
//!   - See: [proc_pid_maps(5) man page](https://man7.org/linux/man-pages/man5/proc_pid_maps.5.html)

#[cfg(target_os = "linux")]
pub mod linux;
