use crate::linear::TableIndex;
use bitfield_struct::bitfield;
use x86_addresses::{PageFrame, PhysicalAddress};

/// Entries per page table at every level (512 × 8 bytes = 4 KiB).
pub const ENTRY_COUNT: usize = 512;

/// One 64-bit x86-64 page-table entry, as the superset of all four levels
/// (PML4E/PML5E, PDPTE, PDE, PTE).
///
/// An entry either points at the next-level table or, where the level
/// defines a PS bit, maps a large page directly. Which reading applies is
/// decided by the walk, not by the entry:
///
/// - any interpretation is valid only while [`present`](Self::present) is
///   set;
/// - [`page_size`](Self::page_size) is meaningful only at PDPT and PD
///   (see [`TableLevel::large_page_size`](crate::TableLevel::large_page_size));
///   at PT the same bit is PAT, at the root levels it is reserved;
/// - [`dirty`](Self::dirty) and [`global`](Self::global) apply to leaf
///   entries only.
///
/// Reserved-bit well-formedness is not checked anywhere in this crate;
/// entries are interpreted the way hardware interprets them.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct PageTableEntry {
    /// Present (P, bit 0): the entry is valid.
    pub present: bool,

    /// Writable (RW, bit 1).
    pub writable: bool,

    /// User/supervisor (US, bit 2): user-mode access allowed when set.
    pub user: bool,

    /// Page write-through (PWT, bit 3).
    pub write_through: bool,

    /// Page cache disable (PCD, bit 4).
    pub cache_disable: bool,

    /// Accessed (A, bit 5): set by the CPU on first access.
    pub accessed: bool,

    /// Dirty (D, bit 6): set by the CPU on first write; leaf only.
    pub dirty: bool,

    /// Page size (PS, bit 7): large-page leaf at PDPT/PD; PAT at PT.
    pub page_size: bool,

    /// Global (G, bit 8): TLB entry survives CR3 reloads; leaf only.
    pub global: bool,

    /// Bits 11:9 — available to the OS.
    #[bits(3)]
    pub os_available_low: u8,

    /// Bits 51:12 — physical frame number.
    ///
    /// Non-leaf: the 4 KiB frame of the next-level table. Leaf: the page's
    /// frame; for 2 MiB/1 GiB leaves the low 9/18 bits of this field are
    /// zero by alignment (trusted, not validated).
    #[bits(40)]
    pub frame_number: u64,

    /// Bits 58:52 — available to the OS.
    #[bits(7)]
    pub os_available_high: u8,

    /// Bits 62:59 — protection key (PKU), or OS use without PKU.
    #[bits(4)]
    pub protection_key: u8,

    /// No-execute (NX, bit 63): requires EFER.NXE.
    pub no_execute: bool,
}

impl PageTableEntry {
    /// The next-level table's frame. Meaningful for present non-leaf
    /// entries.
    #[inline]
    #[must_use]
    pub const fn next_table_frame(self) -> PageFrame {
        PageFrame::new(self.frame_number())
    }

    /// Physical base address encoded by the frame field (frame × 4 KiB).
    ///
    /// For a well-formed large leaf the result is 2 MiB/1 GiB aligned
    /// because the field's low bits are zero.
    #[inline]
    #[must_use]
    pub const fn leaf_base(self) -> PhysicalAddress {
        PageFrame::new(self.frame_number()).base()
    }

    /// A present, writable link to the next-level table.
    #[inline]
    #[must_use]
    pub const fn table_link(next: PageFrame) -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_frame_number(next.number())
    }
}

/// One 4 KiB-aligned page table of [`ENTRY_COUNT`] entries.
///
/// The same shape serves every level; the level only decides how the
/// entries are read.
#[repr(C, align(4096))]
#[derive(Copy, Clone, Debug)]
pub struct PageTable {
    entries: [PageTableEntry; ENTRY_COUNT],
}

impl PageTable {
    /// A table with every entry zeroed (nothing present).
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: [PageTableEntry::new(); ENTRY_COUNT],
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, index: TableIndex) -> PageTableEntry {
        self.entries[index.as_usize()]
    }

    #[inline]
    pub const fn set(&mut self, index: TableIndex, entry: PageTableEntry) {
        self.entries[index.as_usize()] = entry;
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::empty()
    }
}
