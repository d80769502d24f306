/// Identifies a **Model-Specific Register (MSR)** by its architectural
/// index, as used by `rdmsr`/`wrmsr`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msr(pub u32);

impl Msr {
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Read the 64-bit value of this MSR.
    ///
    /// # Safety
    /// Executes the privileged `rdmsr` instruction: requires CPL0, and the
    /// index must name an MSR that exists on the current CPU (invalid
    /// indices raise #GP). Values are per-core; do not cache across cores.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[inline]
    #[must_use]
    #[doc(alias = "rdmsr")]
    pub unsafe fn load_raw(self) -> u64 {
        let lo: u32;
        let hi: u32;
        let index = self.raw();
        unsafe {
            core::arch::asm!(
                "rdmsr",
                in("ecx") index,
                out("eax") lo,
                out("edx") hi,
                options(nomem, nostack, preserves_flags)
            );
        }
        (u64::from(hi) << 32) | u64::from(lo)
    }

    /// Write a 64-bit value to this MSR.
    ///
    /// The write takes effect exactly when issued; there is no compensating
    /// action afterwards.
    ///
    /// # Safety
    /// Executes the privileged `wrmsr` instruction: requires CPL0, the MSR
    /// must exist and be writable, and the value must respect the MSR's
    /// reserved bits (violations raise #GP).
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    #[doc(alias = "wrmsr")]
    pub unsafe fn store_raw(self, val: u64) {
        let lo = (val & 0xFFFF_FFFF) as u32;
        let hi = (val >> 32) as u32;
        let index = self.raw();
        unsafe {
            core::arch::asm!(
                "wrmsr",
                in("ecx") index,
                in("eax") lo,
                in("edx") hi,
                options(nostack, preserves_flags)
            );
        }
    }
}
