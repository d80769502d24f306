use crate::{LoadRegisterUnsafe, StoreRegisterUnsafe};
use bitfield_struct::bitfield;

/// CR4 — mode-control register (x86-64).
///
/// Carries the paging-mode enables consumed by the translation layer
/// ([`pae`](Self::pae), [`la57`](Self::la57), [`pcide`](Self::pcide)) next
/// to the remaining architecturally defined protection and state-management
/// flags. Only the low bits are defined; the rest are reserved and must be
/// written as read.
#[bitfield(u64, order = Lsb)]
pub struct Cr4 {
    /// Bit 0 — VME: Virtual-8086 Mode Extensions.
    pub vme: bool,

    /// Bit 1 — PVI: Protected-Mode Virtual Interrupts.
    pub pvi: bool,

    /// Bit 2 — TSD: Time Stamp Disable (RDTSC is CPL0-only when set).
    pub tsd: bool,

    /// Bit 3 — DE: Debugging Extensions.
    pub de: bool,

    /// Bit 4 — PSE: Page Size Extensions (32-bit paging only).
    pub pse: bool,

    /// Bit 5 — PAE: Physical Address Extension.
    ///
    /// Required for any long-mode paging.
    pub pae: bool,

    /// Bit 6 — MCE: Machine-Check Enable.
    pub mce: bool,

    /// Bit 7 — PGE: Page Global Enable.
    pub pge: bool,

    /// Bit 8 — PCE: Performance-Monitoring Counter Enable.
    pub pce: bool,

    /// Bit 9 — OSFXSR: OS supports FXSAVE/FXRSTOR.
    pub osfxsr: bool,

    /// Bit 10 — OSXMMEXCPT: OS supports unmasked SIMD FP exceptions.
    pub osxmmexcpt: bool,

    /// Bit 11 — UMIP: User-Mode Instruction Prevention.
    pub umip: bool,

    /// Bit 12 — LA57: 57-bit linear addresses (5-level paging).
    pub la57: bool,

    /// Bit 13 — VMXE: VMX Enable (Intel VT-x).
    pub vmxe: bool,

    /// Bit 14 — SMXE: SMX Enable.
    pub smxe: bool,

    /// Bit 15 — Reserved (must be 0).
    _rsv15: bool,

    /// Bit 16 — FSGSBASE: RDFSBASE/WRFSBASE etc. enable.
    pub fsgsbase: bool,

    /// Bit 17 — PCIDE: Process-Context Identifiers enable.
    ///
    /// Changes the meaning of CR3 bits 11:0.
    pub pcide: bool,

    /// Bit 18 — OSXSAVE: XSAVE and extended states enable.
    pub osxsave: bool,

    /// Bit 19 — KL: Key Locker enable.
    pub kl: bool,

    /// Bit 20 — SMEP: Supervisor-Mode Execution Prevention.
    pub smep: bool,

    /// Bit 21 — SMAP: Supervisor-Mode Access Prevention.
    pub smap: bool,

    /// Bit 22 — PKE: Protection Keys for user pages.
    pub pke: bool,

    /// Bit 23 — CET: Control-flow Enforcement.
    pub cet: bool,

    /// Bit 24 — PKS: Protection Keys for supervisor pages.
    pub pks: bool,

    /// Bits 63:25 — Reserved.
    #[bits(39)]
    _rsv25_63: u64,
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl LoadRegisterUnsafe for Cr4 {
    unsafe fn load_unsafe() -> Self {
        let cr4: u64;
        unsafe {
            core::arch::asm!("mov {}, cr4", out(reg) cr4, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(cr4)
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl StoreRegisterUnsafe for Cr4 {
    unsafe fn store_unsafe(self) {
        let cr4 = self.into_bits();
        unsafe {
            core::arch::asm!("mov cr4, {}", in(reg) cr4, options(nostack, preserves_flags));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_mode_bits() {
        let cr4 = Cr4::new().with_pae(true).with_la57(true);
        assert_eq!(cr4.into_bits(), (1 << 5) | (1 << 12));
    }

    #[test]
    fn snapshot_mutation_is_local() {
        let cr4 = Cr4::from_bits(1 << 5);
        let modified = cr4.with_smep(true);
        assert!(!cr4.smep());
        assert!(modified.smep());
        assert!(modified.pae());
    }
}
