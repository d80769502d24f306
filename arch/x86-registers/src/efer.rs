use crate::msr::Msr;
use crate::{LoadRegisterUnsafe, StoreRegisterUnsafe};
use bitfield_struct::bitfield;

/// `IA32_EFER` (MSR `0xC000_0080`) — Extended Feature Enable Register.
///
/// Holds the long-mode enables consumed by paging-mode detection
/// ([`lme`](Self::lme), [`lma`](Self::lma), [`nxe`](Self::nxe)) plus
/// `SYSCALL` and AMD virtualization enables.
#[bitfield(u64, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct Efer {
    /// Bit 0 — SCE: System Call Extensions (SYSCALL/SYSRET).
    pub sce: bool,

    /// Bits 7:1 — Reserved.
    #[bits(7)]
    _rsv1_7: u8,

    /// Bit 8 — LME: Long Mode Enable.
    pub lme: bool,

    /// Bit 9 — Reserved.
    _rsv9: bool,

    /// Bit 10 — LMA: Long Mode Active (read-only; set by hardware when
    /// long mode and paging are both on).
    pub lma: bool,

    /// Bit 11 — NXE: No-Execute Enable (activates the NX page-table bit).
    pub nxe: bool,

    /// Bit 12 — SVME: Secure Virtual Machine Enable (AMD SVM).
    pub svme: bool,

    /// Bit 13 — LMSLE: Long Mode Segment Limit Enable (AMD).
    pub lmsle: bool,

    /// Bit 14 — FFXSR: Fast FXSAVE/FXRSTOR (AMD).
    pub ffxsr: bool,

    /// Bit 15 — TCE: Translation Cache Extension (AMD).
    pub tce: bool,

    /// Bits 63:16 — Reserved.
    #[bits(48)]
    _rsv16_63: u64,
}

impl Efer {
    /// MSR index of `IA32_EFER`.
    pub const MSR: Msr = Msr::new(0xC000_0080);
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl LoadRegisterUnsafe for Efer {
    unsafe fn load_unsafe() -> Self {
        Self::from_bits(unsafe { Self::MSR.load_raw() })
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl StoreRegisterUnsafe for Efer {
    unsafe fn store_unsafe(self) {
        unsafe { Self::MSR.store_raw(self.into_bits()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_mode_bits() {
        let efer = Efer::new().with_lme(true).with_lma(true).with_nxe(true);
        assert_eq!(efer.into_bits(), (1 << 8) | (1 << 10) | (1 << 11));
    }

    #[test]
    fn msr_index() {
        assert_eq!(Efer::MSR.raw(), 0xC000_0080);
    }
}
