use crate::entry::{PageTable, PageTableEntry};
use crate::linear::LinearAddress;
use log::trace;
use thiserror::Error;
use x86_addresses::{PageFrame, PageSize, PhysicalAddress};

/// The external frame→table facility: turns a physical frame number into
/// an inspectable page table.
///
/// How a frame becomes addressable (identity map, higher-half direct map,
/// temporary window) is entirely the implementor's business; the walker
/// only ever asks for 4 KiB table frames handed to it by CR3 or by
/// non-leaf entries.
pub trait TableSource {
    /// Failure to make a frame addressable. This is an infrastructure
    /// problem, not an absent mapping, and the walker propagates it as
    /// such.
    type Error;

    /// The page table stored in `frame`.
    ///
    /// # Errors
    /// When the frame cannot currently be made addressable.
    fn table(&self, frame: PageFrame) -> Result<&PageTable, Self::Error>;
}

/// A resolved translation: where the linear address lands and through
/// which leaf.
///
/// The leaf entry is surfaced verbatim so callers can judge permission and
/// attribute bits themselves; the walker does not evaluate them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Mapping {
    /// The translated physical address.
    pub physical: PhysicalAddress,
    /// Granularity of the leaf that terminated the walk.
    pub size: PageSize,
    /// The leaf entry, untouched (present, permissions, attributes).
    pub entry: PageTableEntry,
}

/// Outcome of a page-table walk.
///
/// `NotMapped` is a first-class result, not an error: it is what a clear
/// present bit at any level means. Infrastructure failures travel in the
/// `Err` channel of [`translate`] instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Translation {
    /// The walk reached a leaf; the address is mapped.
    Resolved(Mapping),
    /// A non-present entry ended the walk; the address is not mapped.
    NotMapped,
}

impl Translation {
    #[inline]
    #[must_use]
    pub const fn resolved(self) -> Option<Mapping> {
        match self {
            Self::Resolved(mapping) => Some(mapping),
            Self::NotMapped => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_not_mapped(self) -> bool {
        matches!(self, Self::NotMapped)
    }
}

/// Walk the table tree from `root` and translate `address`.
///
/// Mirrors the MMU, level by level from the root toward the leaf:
///
/// 1. index the current table with the address's field for this level;
/// 2. a clear present bit yields [`Translation::NotMapped`];
/// 3. at PT the entry is a 4 KiB leaf: physical = frame base | page
///    offset;
/// 4. at PD/PDPT a set PS bit is a 2 MiB/1 GiB leaf: physical = leaf base
///    | the address's low bits below that granularity, verbatim (the root
///    levels have no PS bit and are never asked);
/// 5. otherwise descend into the entry's next-table frame.
///
/// No permission or reserved-bit checks; the leaf entry travels in the
/// result. Bounded by the mode's depth, deterministic for fixed inputs,
/// never retried.
///
/// `root` comes from CR3 (see `Cr3::root_frame`) and must be the root of a
/// tree matching `address`'s [`PagingMode`](crate::PagingMode).
///
/// # Errors
/// Propagates the [`TableSource`] failure when an intermediate table
/// frame cannot be made addressable. This is distinct from
/// [`Translation::NotMapped`].
pub fn translate<S: TableSource>(
    source: &S,
    root: PageFrame,
    address: LinearAddress,
) -> Result<Translation, S::Error> {
    let mut frame = root;
    let mut level = address.mode().root_level();

    loop {
        let table = source.table(frame)?;
        let index = address.table_index(level);
        let entry = table.get(index);
        trace!("{level}[{index}] = {:#018x}", entry.into_bits());

        if !entry.present() {
            trace!("{address}: not mapped at {level}");
            return Ok(Translation::NotMapped);
        }

        let Some(child) = level.child() else {
            // PT: always a 4 KiB leaf.
            let physical =
                PhysicalAddress::new(entry.leaf_base().as_u64() | address.page_offset());
            trace!("{address} -> {physical} (4K)");
            return Ok(Translation::Resolved(Mapping {
                physical,
                size: PageSize::Size4K,
                entry,
            }));
        };

        if let Some(size) = level.large_page_size()
            && entry.page_size()
        {
            let physical =
                PhysicalAddress::new(entry.leaf_base().as_u64() | address.low_bits(size));
            trace!("{address} -> {physical} ({size})");
            return Ok(Translation::Resolved(Mapping {
                physical,
                size,
                entry,
            }));
        }

        frame = entry.next_table_frame();
        level = child;
    }
}

/// A [`TableSource`] backed by caller-registered `(frame, table)` pairs.
///
/// Suitable for fixtures and for pre-boot environments where the handful
/// of live tables is known up front. Lookup is a linear scan.
#[derive(Copy, Clone, Debug)]
pub struct MappedTables<'a> {
    tables: &'a [(PageFrame, &'a PageTable)],
}

/// No table is registered for the requested frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("no page table registered for {0}")]
pub struct UnknownFrame(pub PageFrame);

impl<'a> MappedTables<'a> {
    #[inline]
    #[must_use]
    pub const fn new(tables: &'a [(PageFrame, &'a PageTable)]) -> Self {
        Self { tables }
    }
}

impl TableSource for MappedTables<'_> {
    type Error = UnknownFrame;

    fn table(&self, frame: PageFrame) -> Result<&PageTable, UnknownFrame> {
        self.tables
            .iter()
            .find(|(f, _)| *f == frame)
            .map(|(_, table)| *table)
            .ok_or(UnknownFrame(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{PagingMode, TableLevel};

    const PML4_FRAME: PageFrame = PageFrame::new(0x100);
    const PDPT_FRAME: PageFrame = PageFrame::new(0x101);
    const PD_FRAME: PageFrame = PageFrame::new(0x102);
    const PT_FRAME: PageFrame = PageFrame::new(0x103);

    fn la(raw: u64) -> LinearAddress {
        LinearAddress::from_u64(PagingMode::Level4, raw)
    }

    fn large_leaf(base: u64) -> PageTableEntry {
        PageTableEntry::new()
            .with_present(true)
            .with_writable(true)
            .with_page_size(true)
            .with_frame_number(base >> 12)
    }

    fn leaf_4k(base: u64) -> PageTableEntry {
        PageTableEntry::new()
            .with_present(true)
            .with_frame_number(base >> 12)
    }

    /// A full 4-level tree for one address, down to a 4 KiB page at
    /// `page_base`.
    struct Fixture {
        pml4: PageTable,
        pdpt: PageTable,
        pd: PageTable,
        pt: PageTable,
    }

    impl Fixture {
        fn for_address(address: LinearAddress, page_base: u64) -> Self {
            let mut pml4 = PageTable::empty();
            let mut pdpt = PageTable::empty();
            let mut pd = PageTable::empty();
            let mut pt = PageTable::empty();
            pml4.set(
                address.table_index(TableLevel::Pml4),
                PageTableEntry::table_link(PDPT_FRAME),
            );
            pdpt.set(
                address.table_index(TableLevel::Pdpt),
                PageTableEntry::table_link(PD_FRAME),
            );
            pd.set(
                address.table_index(TableLevel::Pd),
                PageTableEntry::table_link(PT_FRAME),
            );
            pt.set(address.table_index(TableLevel::Pt), leaf_4k(page_base));
            Self { pml4, pdpt, pd, pt }
        }

        fn sources(&self) -> [(PageFrame, &PageTable); 4] {
            [
                (PML4_FRAME, &self.pml4),
                (PDPT_FRAME, &self.pdpt),
                (PD_FRAME, &self.pd),
                (PT_FRAME, &self.pt),
            ]
        }
    }

    #[test]
    fn resolves_4k_leaf_preserving_low_12_bits() {
        let address = la(0x0000_7FFF_F812_3456);
        let fixture = Fixture::for_address(address, 0x0000_0001_2340_0000);
        let tables = fixture.sources();
        let source = MappedTables::new(&tables);

        let mapping = translate(&source, PML4_FRAME, address)
            .unwrap()
            .resolved()
            .unwrap();
        assert_eq!(mapping.size, PageSize::Size4K);
        assert_eq!(mapping.physical.as_u64(), 0x0000_0001_2340_0456);
        assert_eq!(mapping.physical.as_u64() & 0xFFF, address.as_u64() & 0xFFF);
    }

    #[test]
    fn resolves_2m_leaf_preserving_low_21_bits() {
        let address = la(0x0000_7FFF_F812_3456);
        let mut fixture = Fixture::for_address(address, 0);
        fixture.pd.set(
            address.table_index(TableLevel::Pd),
            large_leaf(0x0000_0002_4060_0000),
        );
        let tables = fixture.sources();
        let source = MappedTables::new(&tables);

        let mapping = translate(&source, PML4_FRAME, address)
            .unwrap()
            .resolved()
            .unwrap();
        assert_eq!(mapping.size, PageSize::Size2M);
        assert_eq!(mapping.physical.as_u64(), 0x0000_0002_4072_3456);
        assert_eq!(
            mapping.physical.as_u64() & 0x1F_FFFF,
            address.as_u64() & 0x1F_FFFF
        );
    }

    /// The worked scenario: PML4E present and non-leaf, PDPTE has PS set,
    /// so the result is (PDPTE frame << 30) | (address & 0x3FFF_FFFF).
    #[test]
    fn resolves_1g_leaf_preserving_low_30_bits() {
        let address = la(0x0000_7FFF_F800_0000);
        let mut fixture = Fixture::for_address(address, 0);
        fixture.pdpt.set(
            address.table_index(TableLevel::Pdpt),
            large_leaf(0x8000_0000),
        );
        let tables = fixture.sources();
        let source = MappedTables::new(&tables);

        let mapping = translate(&source, PML4_FRAME, address)
            .unwrap()
            .resolved()
            .unwrap();
        assert_eq!(mapping.size, PageSize::Size1G);
        assert_eq!(
            mapping.physical.as_u64(),
            0x8000_0000 | (address.as_u64() & 0x3FFF_FFFF)
        );
        assert_eq!(mapping.physical.as_u64(), 0xB800_0000);
        assert!(mapping.entry.writable());
    }

    #[test]
    fn non_present_yields_not_mapped_at_every_level() {
        let address = la(0x0000_7FFF_F812_3456);
        for clear_level in [
            TableLevel::Pml4,
            TableLevel::Pdpt,
            TableLevel::Pd,
            TableLevel::Pt,
        ] {
            let mut fixture = Fixture::for_address(address, 0x1000);
            let table = match clear_level {
                TableLevel::Pml4 => &mut fixture.pml4,
                TableLevel::Pdpt => &mut fixture.pdpt,
                TableLevel::Pd => &mut fixture.pd,
                _ => &mut fixture.pt,
            };
            // Deeper tables stay fully populated; they must not matter.
            table.set(
                address.table_index(clear_level),
                PageTableEntry::new().with_frame_number(0xDEAD),
            );
            let tables = fixture.sources();
            let source = MappedTables::new(&tables);

            let outcome = translate(&source, PML4_FRAME, address).unwrap();
            assert!(outcome.is_not_mapped(), "expected NotMapped at {clear_level}");
        }
    }

    #[test]
    fn repeated_walks_are_deterministic() {
        let address = la(0x0000_7FFF_F812_3456);
        let fixture = Fixture::for_address(address, 0x5555_0000);
        let tables = fixture.sources();
        let source = MappedTables::new(&tables);

        let first = translate(&source, PML4_FRAME, address).unwrap();
        for _ in 0..16 {
            assert_eq!(translate(&source, PML4_FRAME, address).unwrap(), first);
        }
    }

    #[test]
    fn source_failure_is_not_not_mapped() {
        let address = la(0x0000_7FFF_F812_3456);
        let fixture = Fixture::for_address(address, 0x1000);
        // Register everything except the PT frame: the PD entry points at
        // a frame the source cannot produce.
        let tables = [
            (PML4_FRAME, &fixture.pml4),
            (PDPT_FRAME, &fixture.pdpt),
            (PD_FRAME, &fixture.pd),
        ];
        let source = MappedTables::new(&tables);

        let err = translate(&source, PML4_FRAME, address).unwrap_err();
        assert_eq!(err, UnknownFrame(PT_FRAME));
    }

    #[test]
    fn walk_starts_at_the_root_frame_given() {
        let address = la(0x0000_7FFF_F812_3456);
        let fixture = Fixture::for_address(address, 0x1000);
        let tables = fixture.sources();
        let source = MappedTables::new(&tables);

        // A root frame nobody registered fails immediately.
        let err = translate(&source, PageFrame::new(0x999), address).unwrap_err();
        assert_eq!(err, UnknownFrame(PageFrame::new(0x999)));
    }
}
