use core::fmt;

/// CPU vendor, derived from the 12 vendor-ID bytes of leaf 0.
///
/// Vendor identity is decided by the exact ID string and by nothing else.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CpuVendor {
    Intel,
    Amd,
    Unknown,
}

impl CpuVendor {
    /// Classify a 12-byte vendor-ID string.
    #[must_use]
    pub const fn from_id_bytes(bytes: &[u8; 12]) -> Self {
        match bytes {
            b"GenuineIntel" => Self::Intel,
            b"AuthenticAMD" => Self::Amd,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intel => "Intel",
            Self::Amd => "AMD",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of vendors a leaf descriptor is architecturally defined on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VendorSet(u8);

impl VendorSet {
    const INTEL_BIT: u8 = 1 << 0;
    const AMD_BIT: u8 = 1 << 1;
    const UNKNOWN_BIT: u8 = 1 << 2;

    /// Intel-only layouts (e.g. Intel's leaf-1 feature bits).
    pub const INTEL: Self = Self(Self::INTEL_BIT);

    /// AMD-only layouts.
    pub const AMD: Self = Self(Self::AMD_BIT);

    /// Vendor-neutral leaves (leaf 0, brand string, ...).
    pub const ANY: Self = Self(Self::INTEL_BIT | Self::AMD_BIT | Self::UNKNOWN_BIT);

    #[must_use]
    pub const fn contains(self, vendor: CpuVendor) -> bool {
        let bit = match vendor {
            CpuVendor::Intel => Self::INTEL_BIT,
            CpuVendor::Amd => Self::AMD_BIT,
            CpuVendor::Unknown => Self::UNKNOWN_BIT,
        };
        self.0 & bit != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// The 12-byte vendor-ID string from leaf 0 (EBX‖EDX‖ECX, in that order).
///
/// Always exactly 12 bytes on real hardware; treated as a fixed-capacity
/// buffer and rendered empty if the bytes are not printable UTF-8.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct VendorId([u8; 12]);

impl VendorId {
    /// Assemble from the three ID registers in architectural order.
    ///
    /// Each register contributes its four bytes in natural (little-endian)
    /// order; the concatenation reads as ASCII.
    #[must_use]
    pub const fn from_registers(ebx: u32, edx: u32, ecx: u32) -> Self {
        let mut bytes = [0u8; 12];
        let parts = [ebx.to_le_bytes(), edx.to_le_bytes(), ecx.to_le_bytes()];
        let mut part = 0;
        while part < 3 {
            let mut i = 0;
            while i < 4 {
                bytes[part * 4 + i] = parts[part][i];
                i += 1;
            }
            part += 1;
        }
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("")
    }

    #[must_use]
    pub const fn vendor(&self) -> CpuVendor {
        CpuVendor::from_id_bytes(&self.0)
    }
}

impl fmt::Debug for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VendorId({:?})", self.as_str())
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
