use crate::{CpuidLeaf, CpuidResult};
use core::fmt;

/// Capacity of the processor brand string: three leaves of 16 bytes each.
pub const BRAND_STRING_CAPACITY: usize = 48;

/// The 16 bytes of one brand-string leaf, in architectural order
/// (EAX, EBX, ECX, EDX, each little-endian).
const fn part_bytes(raw: CpuidResult) -> [u8; 16] {
    let regs = [
        raw.eax.to_le_bytes(),
        raw.ebx.to_le_bytes(),
        raw.ecx.to_le_bytes(),
        raw.edx.to_le_bytes(),
    ];
    let mut bytes = [0u8; 16];
    let mut reg = 0;
    while reg < 4 {
        let mut i = 0;
        while i < 4 {
            bytes[reg * 4 + i] = regs[reg][i];
            i += 1;
        }
        reg += 1;
    }
    bytes
}

/// CPUID.8000_0002H — processor brand string, bytes 0..16.
#[derive(Copy, Clone, Debug)]
pub struct BrandStringPart0 {
    raw: CpuidResult,
}

/// CPUID.8000_0003H — processor brand string, bytes 16..32.
#[derive(Copy, Clone, Debug)]
pub struct BrandStringPart1 {
    raw: CpuidResult,
}

/// CPUID.8000_0004H — processor brand string, bytes 32..48.
#[derive(Copy, Clone, Debug)]
pub struct BrandStringPart2 {
    raw: CpuidResult,
}

impl CpuidLeaf for BrandStringPart0 {
    const LEAF: u32 = 0x8000_0002;

    fn interpret(raw: CpuidResult) -> Self {
        Self { raw }
    }
}

impl CpuidLeaf for BrandStringPart1 {
    const LEAF: u32 = 0x8000_0003;

    fn interpret(raw: CpuidResult) -> Self {
        Self { raw }
    }
}

impl CpuidLeaf for BrandStringPart2 {
    const LEAF: u32 = 0x8000_0004;

    fn interpret(raw: CpuidResult) -> Self {
        Self { raw }
    }
}

impl BrandStringPart0 {
    #[must_use]
    pub const fn bytes(&self) -> [u8; 16] {
        part_bytes(self.raw)
    }
}

impl BrandStringPart1 {
    #[must_use]
    pub const fn bytes(&self) -> [u8; 16] {
        part_bytes(self.raw)
    }
}

impl BrandStringPart2 {
    #[must_use]
    pub const fn bytes(&self) -> [u8; 16] {
        part_bytes(self.raw)
    }
}

/// The processor brand string: 48 bytes assembled from the three brand
/// leaves in ascending leaf order, NUL-terminated when shorter.
///
/// Hardware pads the tail with NUL bytes; [`as_str`](Self::as_str) stops at
/// the first one. The buffer is trusted like any other CPUID output: the
/// three parts must come from leaves `0x8000_0002..=0x8000_0004` of the
/// same logical processor, queried in that order.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct BrandString {
    bytes: [u8; BRAND_STRING_CAPACITY],
}

impl BrandString {
    /// Concatenate the three parts byte-for-byte.
    #[must_use]
    pub const fn from_parts(
        p0: &BrandStringPart0,
        p1: &BrandStringPart1,
        p2: &BrandStringPart2,
    ) -> Self {
        let parts = [p0.bytes(), p1.bytes(), p2.bytes()];
        let mut bytes = [0u8; BRAND_STRING_CAPACITY];
        let mut part = 0;
        while part < 3 {
            let mut i = 0;
            while i < 16 {
                bytes[part * 16 + i] = parts[part][i];
                i += 1;
            }
            part += 1;
        }
        Self { bytes }
    }

    /// Query all three brand leaves on the executing core and assemble.
    ///
    /// # Safety
    /// Must run on a CPU where `CPUID` is available; the caller must have
    /// checked that the extended range reaches `0x8000_0004`.
    #[cfg(all(feature = "asm", target_arch = "x86_64"))]
    #[must_use]
    pub unsafe fn read() -> Self {
        let p0 = unsafe { crate::query::<BrandStringPart0>() };
        let p1 = unsafe { crate::query::<BrandStringPart1>() };
        let p2 = unsafe { crate::query::<BrandStringPart2>() };
        Self::from_parts(&p0, &p1, &p2)
    }

    /// The full 48-byte buffer, including any NUL padding.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BRAND_STRING_CAPACITY] {
        &self.bytes
    }

    /// Length up to (excluding) the first NUL byte.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(BRAND_STRING_CAPACITY)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The brand string up to the first NUL; empty if the bytes are not
    /// valid UTF-8 (only possible with garbage leaf data).
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len()]).unwrap_or("")
    }
}

impl fmt::Debug for BrandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BrandString({:?})", self.as_str())
    }
}

impl fmt::Display for BrandString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(bytes: &[u8; 16]) -> CpuidResult {
        let reg = |i: usize| {
            u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        CpuidResult {
            eax: reg(0),
            ebx: reg(4),
            ecx: reg(8),
            edx: reg(12),
        }
    }

    #[test]
    fn concatenation_preserves_leaf_order() {
        let p0 = BrandStringPart0::interpret(raw(b"Intel(R) Core(TM"));
        let p1 = BrandStringPart1::interpret(raw(b") i7-9750H CPU @"));
        let p2 = BrandStringPart2::interpret(raw(b" 2.60GHz\0\0\0\0\0\0\0\0"));
        let brand = BrandString::from_parts(&p0, &p1, &p2);
        assert_eq!(brand.as_str(), "Intel(R) Core(TM) i7-9750H CPU @ 2.60GHz");
        assert_eq!(brand.len(), 40);
        assert!(brand.len() <= BRAND_STRING_CAPACITY);
    }

    #[test]
    fn full_capacity_without_terminator() {
        let p0 = BrandStringPart0::interpret(raw(b"0123456789abcdef"));
        let p1 = BrandStringPart1::interpret(raw(b"0123456789abcdef"));
        let p2 = BrandStringPart2::interpret(raw(b"0123456789abcdef"));
        let brand = BrandString::from_parts(&p0, &p1, &p2);
        assert_eq!(brand.len(), BRAND_STRING_CAPACITY);
        assert_eq!(brand.as_str().len(), BRAND_STRING_CAPACITY);
    }

    #[test]
    fn garbage_bytes_render_empty() {
        let p0 = BrandStringPart0::interpret(CpuidResult {
            eax: 0xFFFF_FFFF,
            ebx: 0xFFFF_FFFF,
            ecx: 0xFFFF_FFFF,
            edx: 0xFFFF_FFFF,
        });
        let p1 = BrandStringPart1::interpret(raw(&[0u8; 16]));
        let p2 = BrandStringPart2::interpret(raw(&[0u8; 16]));
        let brand = BrandString::from_parts(&p0, &p1, &p2);
        assert_eq!(brand.as_str(), "");
    }
}
