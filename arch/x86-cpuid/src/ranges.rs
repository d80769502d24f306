use crate::vendor::{CpuVendor, VendorId};
use crate::{CpuidLeaf, CpuidResult};

/// CPUID.00H — highest supported basic leaf and the vendor-ID string.
///
/// EAX reports the highest basic leaf; EBX/EDX/ECX carry the 12 vendor-ID
/// bytes (`"GenuineIntel"`, `"AuthenticAMD"`, ...). This is the mandatory
/// first query: every other descriptor is only meaningful once gated
/// against [`max_leaf`](Self::max_leaf) and [`vendor`](Self::vendor).
#[derive(Copy, Clone, Debug)]
pub struct HighestLeafAndVendor {
    /// Highest basic leaf supported by this logical processor.
    pub max_leaf: u32,
    /// The 12-byte vendor-ID string.
    pub vendor_id: VendorId,
}

impl CpuidLeaf for HighestLeafAndVendor {
    const LEAF: u32 = 0x0;

    fn interpret(raw: CpuidResult) -> Self {
        Self {
            max_leaf: raw.eax,
            vendor_id: VendorId::from_registers(raw.ebx, raw.edx, raw.ecx),
        }
    }
}

impl HighestLeafAndVendor {
    #[must_use]
    pub const fn vendor(&self) -> CpuVendor {
        self.vendor_id.vendor()
    }

    #[must_use]
    pub const fn is_intel(&self) -> bool {
        matches!(self.vendor(), CpuVendor::Intel)
    }

    #[must_use]
    pub const fn is_amd(&self) -> bool {
        matches!(self.vendor(), CpuVendor::Amd)
    }
}

/// CPUID.8000_0000H — highest supported extended leaf.
///
/// Gates the extended range (brand string, extended features).
#[derive(Copy, Clone, Debug)]
pub struct HighestExtendedLeaf {
    /// Highest extended leaf supported (≥ `0x8000_0000` when the range
    /// exists at all).
    pub max_extended: u32,
}

impl CpuidLeaf for HighestExtendedLeaf {
    const LEAF: u32 = 0x8000_0000;

    fn interpret(raw: CpuidResult) -> Self {
        Self {
            max_extended: raw.eax,
        }
    }
}

/// Supported leaf ranges and vendor of the executing logical processor.
///
/// Pairs the two range leaves so callers have one place to apply the
/// max-leaf gate before decoding anything else.
#[derive(Copy, Clone, Debug)]
pub struct CpuidRanges {
    pub max_basic: u32,
    pub max_extended: u32,
    pub vendor: CpuVendor,
}

impl CpuidRanges {
    /// Query both range leaves on the executing core.
    ///
    /// # Safety
    /// Must run on a CPU where `CPUID` is available.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[must_use]
    pub unsafe fn read() -> Self {
        let basic = unsafe { crate::query::<HighestLeafAndVendor>() };
        let extended = unsafe { crate::query::<HighestExtendedLeaf>() };
        Self::from_leaves(&basic, &extended)
    }

    #[must_use]
    pub const fn from_leaves(
        basic: &HighestLeafAndVendor,
        extended: &HighestExtendedLeaf,
    ) -> Self {
        Self {
            max_basic: basic.max_leaf,
            max_extended: extended.max_extended,
            vendor: basic.vendor(),
        }
    }

    /// Whether the basic `leaf` is reported present.
    #[inline]
    #[must_use]
    pub const fn has_basic(&self, leaf: u32) -> bool {
        leaf <= self.max_basic
    }

    /// Whether the extended `leaf` is reported present.
    #[inline]
    #[must_use]
    pub const fn has_extended(&self, leaf: u32) -> bool {
        leaf >= 0x8000_0000 && leaf <= self.max_extended
    }

    /// Whether `L` passes both the range gate and the vendor gate on this
    /// processor. This is the check the query engine itself never performs.
    #[inline]
    #[must_use]
    pub const fn supports<L: CpuidLeaf>(&self) -> bool {
        let in_range = if L::LEAF >= 0x8000_0000 {
            self.has_extended(L::LEAF)
        } else {
            self.has_basic(L::LEAF)
        };
        in_range && L::VENDORS.contains(self.vendor)
    }
}
