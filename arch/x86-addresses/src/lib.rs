//! # Typed x86-64 Address Primitives
//!
//! Zero-cost newtypes that keep physical and virtual addresses from mixing
//! at compile time, plus the page-granularity vocabulary shared by the
//! CPUID, register and page-walk crates.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] | Machine bus address. |
//! | [`VirtualAddress`] | Address as seen through the MMU. |
//! | [`PageFrame`] | Physical 4 KiB frame *number* (address >> 12). |
//! | [`PageSize`] | Leaf granularity: 4 KiB, 2 MiB or 1 GiB. |
//!
//! All types are `#[repr(transparent)]` over `u64` and `const`-friendly.

#![cfg_attr(not(any(test, doctest)), no_std)]

use core::fmt;
use core::ops::Add;

/// A **physical** memory address (machine bus address).
///
/// Newtype over `u64` to prevent mixing with virtual addresses.
/// No alignment guarantees by itself; when stored in page-table entries the
/// low 12/21/30 bits must be zero depending on the leaf size.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

/// A **virtual** memory address (subject to page-table translation).
///
/// Newtype over `u64` to prevent mixing with physical addresses.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

/// A physical 4 KiB page-frame **number**: a [`PhysicalAddress`] with its
/// low 12 offset bits removed.
///
/// This is the currency of page-table entries and of CR3: both store frame
/// numbers, never byte addresses.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageFrame(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The 4 KiB frame containing this address (offset bits discarded).
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PageFrame {
        PageFrame::new(self.0 >> PageSize::Size4K.shift())
    }

    /// Offset of this address within its page of size `size`.
    #[inline]
    #[must_use]
    pub const fn offset_in(self, size: PageSize) -> u64 {
        self.0 & (size.bytes() - 1)
    }

    /// Whether the address is aligned to `size`.
    #[inline]
    #[must_use]
    pub const fn is_aligned(self, size: PageSize) -> bool {
        self.offset_in(size) == 0
    }
}

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl PageFrame {
    /// Create a frame from its raw number (physical address >> 12).
    #[inline]
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Frame containing `addr`. The address does not need to be aligned;
    /// offset bits are discarded.
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: PhysicalAddress) -> Self {
        addr.frame()
    }

    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        self.0
    }

    /// Physical byte address of the frame base (number << 12).
    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new(self.0 << PageSize::Size4K.shift())
    }
}

/// Supported x86-64 leaf page sizes.
///
/// 4 KiB pages are mapped through the PT level; 2 MiB and 1 GiB are large
/// pages that terminate the walk early at PD or PDPT (PS bit set).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PageSize {
    /// 4 KiB page mapped by a PTE (PT leaf).
    Size4K,
    /// 2 MiB page mapped by a PDE with `PS=1` (PD leaf).
    Size2M,
    /// 1 GiB page mapped by a PDPTE with `PS=1` (PDPT leaf).
    Size1G,
}

impl PageSize {
    /// log2 of the page size: the number of low address bits that form the
    /// in-page offset (12, 21 or 30).
    #[inline]
    #[must_use]
    pub const fn shift(self) -> u32 {
        match self {
            Self::Size4K => 12,
            Self::Size2M => 21,
            Self::Size1G => 30,
        }
    }

    /// Page size in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> u64 {
        1u64 << self.shift()
    }

    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size4K => "4K",
            Self::Size2M => "2M",
            Self::Size1G => "1G",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;

    #[inline]
    fn add(self, rhs: u64) -> Self {
        Self(self.0 + rhs)
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;

    #[inline]
    fn add(self, rhs: u64) -> Self {
        Self(self.0 + rhs)
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalAddress({:#018x})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualAddress({:#018x})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Debug for PageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageFrame({:#x})", self.0)
    }
}

impl fmt::Display for PageFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {:#x}", self.0)
    }
}

/// Align `x` down to the nearest multiple of `a`.
///
/// `a` must be a non-zero power of two; no runtime checks are performed.
///
/// ```rust
/// # use x86_addresses::align_down;
/// assert_eq!(align_down(4095, 4096), 0);
/// assert_eq!(align_down(4096, 4096), 4096);
/// ```
#[inline]
#[must_use]
pub const fn align_down(x: u64, a: u64) -> u64 {
    x & !(a - 1)
}

/// Align `x` up to the nearest multiple of `a`.
///
/// `a` must be a non-zero power of two and `x + (a - 1)` must not overflow.
///
/// ```rust
/// # use x86_addresses::align_up;
/// assert_eq!(align_up(1, 4096), 4096);
/// assert_eq!(align_up(4096, 4096), 4096);
/// ```
#[inline]
#[must_use]
pub const fn align_up(x: u64, a: u64) -> u64 {
    (x + a - 1) & !(a - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip() {
        let pa = PhysicalAddress::new(0x0000_0008_1234_5678);
        let frame = pa.frame();
        assert_eq!(frame.number(), 0x0000_0008_1234_5678 >> 12);
        assert_eq!(frame.base().as_u64(), 0x0000_0008_1234_5000);
    }

    #[test]
    fn page_size_shifts() {
        assert_eq!(PageSize::Size4K.shift(), 12);
        assert_eq!(PageSize::Size2M.shift(), 21);
        assert_eq!(PageSize::Size1G.shift(), 30);
        assert_eq!(PageSize::Size2M.bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn offsets_and_alignment() {
        let pa = PhysicalAddress::new(0x4020_1234);
        assert_eq!(pa.offset_in(PageSize::Size4K), 0x234);
        assert_eq!(pa.offset_in(PageSize::Size2M), 0x0020_1234);
        assert!(PhysicalAddress::new(0x8000_0000).is_aligned(PageSize::Size1G));
        assert!(!pa.is_aligned(PageSize::Size4K));
    }

    #[test]
    fn align_helpers() {
        assert_eq!(align_down(0x12345, 16), 0x12340);
        assert_eq!(align_up(0x12345, 16), 0x12350);
        assert_eq!(align_down(0, 4096), 0);
        assert_eq!(align_up(0, 4096), 0);
    }
}
