//! # Typed x86-64 Control Registers and MSRs
//!
//! Bitfield snapshots of the control and model-specific registers that
//! drive address translation: [`Cr3`] (table root), [`Cr4`] (paging-mode
//! flags) and [`Efer`] (long mode / NX), plus raw [`Msr`] access.
//!
//! A register access is two independent steps: load a snapshot, mutate the
//! working copy through the bitfield setters, store it back. There is no
//! read-modify-write locking here, and storing a register that governs the
//! executing code's own translation state takes effect exactly when issued;
//! both are the caller's responsibility.
//!
//! Register values are per-core. Snapshots must not be cached across
//! logical processors; re-load instead.
//!
//! The actual `mov crN`/`rdmsr`/`wrmsr` issuance is behind the `asm`
//! feature (and `x86_64`), so the layouts build and test anywhere.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod cr3;
mod cr4;
mod efer;
mod msr;

pub use cr3::Cr3;
pub use cr4::Cr4;
pub use efer::Efer;
pub use msr::Msr;

/// Load a privileged register as a typed snapshot.
pub trait LoadRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety
    /// requirements; every register in this crate requires CPL0.
    unsafe fn load_unsafe() -> Self;
}

/// Commit a snapshot's raw bit pattern back to a privileged register.
pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety
    /// requirements; every register in this crate requires CPL0, and the
    /// written value must be architecturally valid (reserved bits zero),
    /// or the store faults.
    unsafe fn store_unsafe(self);
}
