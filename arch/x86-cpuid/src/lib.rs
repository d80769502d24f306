//! # Typed CPUID Queries
//!
//! A descriptor-driven view over the x86 `CPUID` instruction.
//!
//! Every supported leaf/subleaf pair is described by a type implementing
//! [`CpuidLeaf`]: the type names the selector, the vendors it applies to,
//! and how the four raw output registers are to be read. [`query`] is the
//! single dispatch point; which descriptor was queried is the *only* thing
//! that binds a [`CpuidResult`] to an interpretation — nothing is inferred
//! from the data itself.
//!
//! ## Caller obligations
//!
//! `CPUID` has no failure signal: an unsupported leaf returns whatever the
//! hardware returns (often all zeros), and a vendor-specific descriptor
//! applied to the other vendor's data yields silently wrong field values.
//! This crate does **not** enforce the gates; callers must
//!
//! 1. query [`HighestLeafAndVendor`] (and [`HighestExtendedLeaf`]) first,
//! 2. check the descriptor's leaf against [`CpuidRanges`], and
//! 3. branch on [`CpuVendor`] before trusting a vendor-specific layout
//!    (see [`CpuidLeaf::VENDORS`]).
//!
//! Results are per-logical-processor: on heterogeneous parts or when the
//! thread may migrate, re-query rather than caching across cores.
//!
//! ## Example (on hardware, `asm` feature)
//!
//! ```rust,no_run
//! use x86_cpuid::{query, CpuVendor, HighestLeafAndVendor, IntelFeatureInformation};
//!
//! let basic = unsafe { query::<HighestLeafAndVendor>() };
//! if basic.vendor() == CpuVendor::Intel && basic.max_leaf >= 1 {
//!     let features = unsafe { query::<IntelFeatureInformation>() };
//!     let _ = features.ecx.sse42();
//! }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod brand;
mod features;
mod ranges;
mod vendor;

pub use brand::{BrandString, BrandStringPart0, BrandStringPart1, BrandStringPart2};
pub use features::{
    AmdFeatureEcx, AmdFeatureEdx, AmdFeatureInformation, IntelFeatureEcx, IntelFeatureEdx,
    IntelFeatureInformation, MiscInfo, VersionInfo,
};
pub use ranges::{CpuidRanges, HighestExtendedLeaf, HighestLeafAndVendor};
pub use vendor::{CpuVendor, VendorId, VendorSet};

/// The four output registers of one `CPUID` invocation.
///
/// Immutable once produced; carries no information about which leaf
/// produced it. Interpretation is established by the [`CpuidLeaf`]
/// descriptor used to request it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(C)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// A CPUID leaf descriptor: selector, vendor applicability, and the field
/// layout of the four output registers.
///
/// Implementations are plain data constructors: [`interpret`](Self::interpret)
/// must not issue instructions, so layouts stay testable against synthetic
/// [`CpuidResult`] values on any host.
pub trait CpuidLeaf: Sized {
    /// Leaf selector (EAX input).
    const LEAF: u32;

    /// Subleaf selector (ECX input).
    const SUBLEAF: u32 = 0;

    /// Vendors on which this layout is architecturally defined.
    ///
    /// Applying a descriptor outside this set is a caller error that
    /// produces silently wrong field values, exactly as on hardware.
    const VENDORS: VendorSet = VendorSet::ANY;

    /// Apply this descriptor's field layout to a raw result.
    fn interpret(raw: CpuidResult) -> Self;
}

/// Execute `CPUID` with the given leaf and subleaf.
///
/// RBX is callee-saved in the SysV ABI and LLVM reserves it, so the result
/// is moved out through a scratch register.
///
/// # Safety
/// Must run on a CPU where `CPUID` is available (all 64-bit parts).
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline(always)]
#[allow(clippy::inline_always)]
#[must_use]
pub unsafe fn cpuid(leaf: u32, subleaf: u32) -> CpuidResult {
    let mut eax = leaf;
    let ebx;
    let mut ecx = subleaf;
    let edx;
    unsafe {
        core::arch::asm!(
            "push rbx",
            "cpuid",
            "mov {ebx_out:e}, ebx",
            "pop rbx",
            ebx_out = lateout(reg) ebx,
            inlateout("eax") eax,
            inlateout("ecx") ecx,
            lateout("edx") edx,
            options(nomem, preserves_flags),
        );
    }
    CpuidResult { eax, ebx, ecx, edx }
}

/// Issue the descriptor's leaf/subleaf and return its typed view.
///
/// Deterministic for a fixed logical processor, leaf and subleaf; not
/// guaranteed identical across cores.
///
/// # Safety
/// Must run on a CPU where `CPUID` is available. The caller is responsible
/// for the max-leaf and vendor gating described in the crate docs; this
/// function performs neither.
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[inline]
#[must_use]
pub unsafe fn query<L: CpuidLeaf>() -> L {
    L::interpret(unsafe { cpuid(L::LEAF, L::SUBLEAF) })
}
