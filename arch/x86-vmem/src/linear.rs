use core::fmt;
use x86_addresses::{PageSize, VirtualAddress};
use x86_registers::{Cr4, Efer};

/// Long-mode paging depth: how many table levels a walk traverses and how
/// many linear-address bits are significant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PagingMode {
    /// 4-level paging: 48-bit linear addresses, PML4 root.
    Level4,
    /// 5-level paging (CR4.LA57): 57-bit linear addresses, PML5 root.
    Level5,
}

impl PagingMode {
    /// Number of table levels a complete walk traverses.
    #[inline]
    #[must_use]
    pub const fn table_levels(self) -> u32 {
        match self {
            Self::Level4 => 4,
            Self::Level5 => 5,
        }
    }

    /// Number of significant linear-address bits (index fields + offset).
    #[inline]
    #[must_use]
    pub const fn linear_address_bits(self) -> u32 {
        match self {
            Self::Level4 => 48,
            Self::Level5 => 57,
        }
    }

    /// The level CR3's root frame points at.
    #[inline]
    #[must_use]
    pub const fn root_level(self) -> TableLevel {
        match self {
            Self::Level4 => TableLevel::Pml4,
            Self::Level5 => TableLevel::Pml5,
        }
    }

    /// Derive the active paging mode from control-register snapshots.
    ///
    /// `None` when long-mode paging is not active (EFER.LMA clear or
    /// CR4.PAE clear); otherwise CR4.LA57 selects the depth. The snapshots
    /// must come from the executing core.
    #[must_use]
    pub const fn from_control(cr4: Cr4, efer: Efer) -> Option<Self> {
        if !efer.lma() || !cr4.pae() {
            return None;
        }
        Some(if cr4.la57() {
            Self::Level5
        } else {
            Self::Level4
        })
    }
}

/// One level of the translation tree, leaf-most ([`Pt`](Self::Pt)) to
/// root-most ([`Pml5`](Self::Pml5)).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TableLevel {
    /// Page table: entries always map 4 KiB pages.
    Pt,
    /// Page directory: entries map 2 MiB pages (`PS=1`) or point to a PT.
    Pd,
    /// Page-directory-pointer table: 1 GiB pages (`PS=1`) or a PD.
    Pdpt,
    /// Page-map level 4: always points to a PDPT.
    Pml4,
    /// Page-map level 5 (LA57 only): always points to a PML4.
    Pml5,
}

impl TableLevel {
    /// Depth counted from the leaf: PT = 1 … PML5 = 5.
    #[inline]
    #[must_use]
    pub const fn depth(self) -> u32 {
        match self {
            Self::Pt => 1,
            Self::Pd => 2,
            Self::Pdpt => 3,
            Self::Pml4 => 4,
            Self::Pml5 => 5,
        }
    }

    /// Bit position of this level's 9-bit index field within a linear
    /// address: 12 + 9·(depth − 1).
    #[inline]
    #[must_use]
    pub const fn index_shift(self) -> u32 {
        12 + 9 * (self.depth() - 1)
    }

    /// The next level toward the leaf; `None` at PT.
    #[inline]
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Pt => None,
            Self::Pd => Some(Self::Pt),
            Self::Pdpt => Some(Self::Pd),
            Self::Pml4 => Some(Self::Pdpt),
            Self::Pml5 => Some(Self::Pml4),
        }
    }

    /// Page size mapped by a `PS=1` entry at this level.
    ///
    /// `None` where the architecture defines no PS bit: at PT (bit 7 is
    /// PAT there) and at the root levels. The walker never asks those
    /// levels for a leaf flag.
    #[inline]
    #[must_use]
    pub const fn large_page_size(self) -> Option<PageSize> {
        match self {
            Self::Pd => Some(PageSize::Size2M),
            Self::Pdpt => Some(PageSize::Size1G),
            Self::Pt | Self::Pml4 | Self::Pml5 => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pt => "PT",
            Self::Pd => "PD",
            Self::Pdpt => "PDPT",
            Self::Pml4 => "PML4",
            Self::Pml5 => "PML5",
        }
    }
}

impl fmt::Display for TableLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 9-bit index into one page table (0..512).
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TableIndex(usize);

impl TableIndex {
    /// Construct an index; values are masked to 9 bits.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index & 0x1FF)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A linear (virtual) address tagged with the [`PagingMode`] that governs
/// its decomposition.
///
/// Decomposition is pure shift-and-mask and lossless: the per-level
/// indices and the page offset reconstruct the low
/// [`linear_address_bits`](PagingMode::linear_address_bits) of the
/// original bit pattern exactly.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LinearAddress {
    raw: u64,
    mode: PagingMode,
}

impl LinearAddress {
    #[inline]
    #[must_use]
    pub const fn new(mode: PagingMode, address: VirtualAddress) -> Self {
        Self {
            raw: address.as_u64(),
            mode,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_u64(mode: PagingMode, raw: u64) -> Self {
        Self { raw, mode }
    }

    /// The original bit pattern, untouched.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.raw
    }

    #[inline]
    #[must_use]
    pub const fn mode(self) -> PagingMode {
        self.mode
    }

    /// This address's index into the table at `level`.
    ///
    /// Meaningful for the levels of this address's mode; asking a 4-level
    /// address for its PML5 index reads bits beyond bit 47.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn table_index(self, level: TableLevel) -> TableIndex {
        TableIndex::new(((self.raw >> level.index_shift()) & 0x1FF) as usize)
    }

    /// The final 12-bit in-page offset.
    #[inline]
    #[must_use]
    pub const fn page_offset(self) -> u64 {
        self.raw & 0xFFF
    }

    /// All address bits below a leaf of the given size, verbatim.
    ///
    /// For a 2 MiB leaf this is the PT index plus the page offset; for a
    /// 1 GiB leaf, the PD and PT indices plus the offset.
    #[inline]
    #[must_use]
    pub const fn low_bits(self, size: PageSize) -> u64 {
        self.raw & (size.bytes() - 1)
    }
}

impl fmt::Display for LinearAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_shifts() {
        assert_eq!(TableLevel::Pt.index_shift(), 12);
        assert_eq!(TableLevel::Pd.index_shift(), 21);
        assert_eq!(TableLevel::Pdpt.index_shift(), 30);
        assert_eq!(TableLevel::Pml4.index_shift(), 39);
        assert_eq!(TableLevel::Pml5.index_shift(), 48);
    }

    #[test]
    fn large_pages_only_below_the_root() {
        assert_eq!(TableLevel::Pd.large_page_size(), Some(PageSize::Size2M));
        assert_eq!(TableLevel::Pdpt.large_page_size(), Some(PageSize::Size1G));
        assert_eq!(TableLevel::Pt.large_page_size(), None);
        assert_eq!(TableLevel::Pml4.large_page_size(), None);
        assert_eq!(TableLevel::Pml5.large_page_size(), None);
    }

    #[test]
    fn decomposition_is_lossless_4_level() {
        for raw in [
            0u64,
            0x0000_7FFF_F800_0000,
            0x0000_8888_0123_4567,
            0x0000_FFFF_FFFF_FFFF,
            0xFFFF_8000_1234_5678, // canonical high half; low 48 preserved
        ] {
            let la = LinearAddress::from_u64(PagingMode::Level4, raw);
            let rebuilt = ((la.table_index(TableLevel::Pml4).as_usize() as u64) << 39)
                | ((la.table_index(TableLevel::Pdpt).as_usize() as u64) << 30)
                | ((la.table_index(TableLevel::Pd).as_usize() as u64) << 21)
                | ((la.table_index(TableLevel::Pt).as_usize() as u64) << 12)
                | la.page_offset();
            assert_eq!(rebuilt, raw & 0x0000_FFFF_FFFF_FFFF);
        }
    }

    #[test]
    fn decomposition_is_lossless_5_level() {
        let raw = 0x01FF_8888_0123_4567u64;
        let la = LinearAddress::from_u64(PagingMode::Level5, raw);
        let rebuilt = ((la.table_index(TableLevel::Pml5).as_usize() as u64) << 48)
            | ((la.table_index(TableLevel::Pml4).as_usize() as u64) << 39)
            | ((la.table_index(TableLevel::Pdpt).as_usize() as u64) << 30)
            | ((la.table_index(TableLevel::Pd).as_usize() as u64) << 21)
            | ((la.table_index(TableLevel::Pt).as_usize() as u64) << 12)
            | la.page_offset();
        assert_eq!(rebuilt, raw & 0x01FF_FFFF_FFFF_FFFF);
    }

    #[test]
    fn low_bits_per_leaf_size() {
        let la = LinearAddress::from_u64(PagingMode::Level4, 0x0000_7FFF_F812_3456);
        assert_eq!(la.page_offset(), 0x456);
        assert_eq!(la.low_bits(PageSize::Size4K), 0x456);
        assert_eq!(la.low_bits(PageSize::Size2M), 0x12_3456);
        assert_eq!(la.low_bits(PageSize::Size1G), 0x3812_3456);
    }

    #[test]
    fn mode_from_control_registers() {
        let efer_long = Efer::new().with_lma(true);
        let cr4_pae = Cr4::new().with_pae(true);
        assert_eq!(
            PagingMode::from_control(cr4_pae, efer_long),
            Some(PagingMode::Level4)
        );
        assert_eq!(
            PagingMode::from_control(cr4_pae.with_la57(true), efer_long),
            Some(PagingMode::Level5)
        );
        assert_eq!(PagingMode::from_control(cr4_pae, Efer::new()), None);
        assert_eq!(PagingMode::from_control(Cr4::new(), efer_long), None);
    }

    #[test]
    fn index_is_masked_to_nine_bits() {
        assert_eq!(TableIndex::new(0x3FF).as_usize(), 0x1FF);
        assert_eq!(TableIndex::new(511).as_usize(), 511);
    }
}
