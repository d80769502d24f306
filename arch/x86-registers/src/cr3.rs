use crate::{LoadRegisterUnsafe, StoreRegisterUnsafe};
use bitfield_struct::bitfield;
use x86_addresses::{PageFrame, PhysicalAddress};

/// CR3 — root-pointer register (IA-32e, PCID disabled).
///
/// Holds the physical frame of the root page table (PML4, or PML5 when
/// LA57 is set) and cache-control flags for accesses to it. This snapshot
/// assumes CR4.PCIDE = 0; with PCID enabled, bits 0–11 change meaning to
/// the process-context identifier instead.
#[bitfield(u64)]
pub struct Cr3 {
    /// Bits 2:0 — Reserved (must be 0).
    #[bits(3)]
    _rsv0_2: u8,

    /// Bit 3 — PWT: write-through caching for root-table accesses.
    pub pwt: bool,

    /// Bit 4 — PCD: cache disable for root-table accesses.
    pub pcd: bool,

    /// Bits 11:5 — Reserved (must be 0 when written).
    #[bits(7)]
    _rsv5_11: u8,

    /// Bits 51:12 — physical frame number of the root table.
    #[bits(40)]
    root_frame_number: u64,

    /// Bits 63:52 — Reserved.
    #[bits(12)]
    _rsv52_63: u16,
}

impl Cr3 {
    /// Build a CR3 value from the root table's physical frame and flags.
    #[must_use]
    pub const fn from_root_frame(frame: PageFrame, pwt: bool, pcd: bool) -> Self {
        Self::new()
            .with_pwt(pwt)
            .with_pcd(pcd)
            .with_root_frame_number(frame.number())
    }

    /// Physical frame of the root page table.
    #[must_use]
    pub const fn root_frame(&self) -> PageFrame {
        PageFrame::new(self.root_frame_number())
    }

    /// Physical base address of the root page table (4 KiB aligned).
    #[must_use]
    pub const fn root_phys(&self) -> PhysicalAddress {
        self.root_frame().base()
    }

    /// The process-context identifier in bits 11:0.
    ///
    /// Meaningful only when CR4.PCIDE = 1; with PCID disabled those bits
    /// are the PWT/PCD flags and reserved zeros exposed above.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn pcid(&self) -> u16 {
        (self.into_bits() & 0xFFF) as u16
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl LoadRegisterUnsafe for Cr3 {
    unsafe fn load_unsafe() -> Self {
        let cr3: u64;
        unsafe {
            core::arch::asm!("mov {}, cr3", out(reg) cr3, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(cr3)
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl StoreRegisterUnsafe for Cr3 {
    unsafe fn store_unsafe(self) {
        let cr3 = self.into_bits();
        unsafe {
            core::arch::asm!("mov cr3, {}", in(reg) cr3, options(nostack, preserves_flags));
        }
    }
}
