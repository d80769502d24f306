use crate::vendor::VendorSet;
use crate::{CpuidLeaf, CpuidResult};
use bitfield_struct::bitfield;

/// CPUID.01H:EAX — version information (stepping/model/family).
///
/// The raw fields are identical on Intel and AMD; the *effective* family
/// and model require the extended-field composition below.
#[bitfield(u32)]
pub struct VersionInfo {
    /// Stepping ID (bits 3:0).
    #[bits(4)]
    pub stepping: u8,
    /// Base model (bits 7:4).
    #[bits(4)]
    pub model: u8,
    /// Base family (bits 11:8).
    #[bits(4)]
    pub family: u8,
    /// Processor type (bits 13:12).
    #[bits(2)]
    pub cpu_type: u8,
    /// Reserved (bits 15:14).
    #[bits(2)]
    _rsv14_15: u8,
    /// Extended model (bits 19:16).
    #[bits(4)]
    pub ext_model: u8,
    /// Extended family (bits 27:20).
    #[bits(8)]
    pub ext_family: u16,
    /// Reserved (bits 31:28).
    #[bits(4)]
    _rsv28_31: u8,
}

impl VersionInfo {
    /// Effective family: base + extended when the base family is `0x0F`.
    #[inline]
    #[must_use]
    pub fn effective_family(self) -> u16 {
        let fam = u16::from(self.family());
        if fam == 0x0F {
            fam + self.ext_family()
        } else {
            fam
        }
    }

    /// Effective model: extended model extends the base for families
    /// `0x06` and `0x0F`.
    #[inline]
    #[must_use]
    pub const fn effective_model(self) -> u8 {
        let fam = self.family();
        let base = self.model();
        if fam == 0x06 || fam == 0x0F {
            base | (self.ext_model() << 4)
        } else {
            base
        }
    }
}

/// CPUID.01H:EBX — brand index, CLFLUSH line size, logical count, APIC ID.
#[bitfield(u32)]
pub struct MiscInfo {
    /// Brand index (bits 7:0).
    #[bits(8)]
    pub brand_index: u8,
    /// CLFLUSH line size in 8-byte quantities (bits 15:8).
    #[bits(8)]
    pub clflush_size: u8,
    /// Maximum number of addressable logical processor IDs (bits 23:16).
    /// Legacy; superseded by the topology leaves.
    #[bits(8)]
    pub logical_processor_count: u8,
    /// Initial APIC ID of the executing logical processor (bits 31:24).
    #[bits(8)]
    pub initial_apic_id: u8,
}

/// CPUID.01H:ECX feature flags as defined by Intel.
///
/// Reference: Intel SDM Vol. 2A, CPUID leaf 01H, ECX layout.
#[bitfield(u32)]
pub struct IntelFeatureEcx {
    /// Bit 0 — SSE3.
    pub sse3: bool,
    /// Bit 1 — PCLMULQDQ.
    pub pclmulqdq: bool,
    /// Bit 2 — DTES64: 64-bit debug store area.
    pub dtes64: bool,
    /// Bit 3 — MONITOR/MWAIT.
    pub monitor: bool,
    /// Bit 4 — DS-CPL: CPL-qualified debug store.
    pub ds_cpl: bool,
    /// Bit 5 — VMX: Virtual Machine Extensions (VT-x).
    pub vmx: bool,
    /// Bit 6 — SMX: Safer Mode Extensions.
    pub smx: bool,
    /// Bit 7 — EST: Enhanced SpeedStep.
    pub est: bool,
    /// Bit 8 — TM2: Thermal Monitor 2.
    pub tm2: bool,
    /// Bit 9 — SSSE3.
    pub ssse3: bool,
    /// Bit 10 — CNXT-ID: L1 context ID.
    pub cnxt_id: bool,
    /// Bit 11 — SDBG: silicon debug.
    pub sdbg: bool,
    /// Bit 12 — FMA.
    pub fma: bool,
    /// Bit 13 — CMPXCHG16B.
    pub cmpxchg16b: bool,
    /// Bit 14 — `xTPR` update control.
    pub xtpr: bool,
    /// Bit 15 — PDCM: perfmon and debug capability.
    pub pdcm: bool,
    /// Bit 16 — Reserved.
    _rsv16: bool,
    /// Bit 17 — PCID: process-context identifiers.
    pub pcid: bool,
    /// Bit 18 — DCA: direct cache access.
    pub dca: bool,
    /// Bit 19 — SSE4.1.
    pub sse41: bool,
    /// Bit 20 — SSE4.2.
    pub sse42: bool,
    /// Bit 21 — `x2APIC`.
    pub x2apic: bool,
    /// Bit 22 — MOVBE.
    pub movbe: bool,
    /// Bit 23 — POPCNT.
    pub popcnt: bool,
    /// Bit 24 — TSC-deadline timer.
    pub tsc_deadline: bool,
    /// Bit 25 — AES-NI.
    pub aes: bool,
    /// Bit 26 — XSAVE.
    pub xsave: bool,
    /// Bit 27 — OSXSAVE: XSAVE enabled by the OS.
    pub osxsave: bool,
    /// Bit 28 — AVX.
    pub avx: bool,
    /// Bit 29 — F16C.
    pub f16c: bool,
    /// Bit 30 — RDRAND.
    pub rdrand: bool,
    /// Bit 31 — Hypervisor present (set by VMMs, always 0 on bare metal).
    pub hypervisor: bool,
}

/// CPUID.01H:EDX feature flags as defined by Intel.
#[bitfield(u32)]
pub struct IntelFeatureEdx {
    /// Bit 0 — FPU on chip.
    pub fpu: bool,
    /// Bit 1 — VME: virtual-8086 mode enhancements.
    pub vme: bool,
    /// Bit 2 — DE: debugging extensions.
    pub de: bool,
    /// Bit 3 — PSE: page size extension.
    pub pse: bool,
    /// Bit 4 — TSC.
    pub tsc: bool,
    /// Bit 5 — MSR: RDMSR/WRMSR.
    pub msr: bool,
    /// Bit 6 — PAE: physical address extension.
    pub pae: bool,
    /// Bit 7 — MCE: machine-check exception.
    pub mce: bool,
    /// Bit 8 — CMPXCHG8B.
    pub cx8: bool,
    /// Bit 9 — APIC on chip.
    pub apic: bool,
    /// Bit 10 — Reserved.
    _rsv10: bool,
    /// Bit 11 — SEP: SYSENTER/SYSEXIT.
    pub sep: bool,
    /// Bit 12 — MTRR.
    pub mtrr: bool,
    /// Bit 13 — PGE: global pages.
    pub pge: bool,
    /// Bit 14 — MCA: machine-check architecture.
    pub mca: bool,
    /// Bit 15 — CMOV.
    pub cmov: bool,
    /// Bit 16 — PAT: page attribute table.
    pub pat: bool,
    /// Bit 17 — PSE-36.
    pub pse36: bool,
    /// Bit 18 — PSN: processor serial number.
    pub psn: bool,
    /// Bit 19 — CLFSH: CLFLUSH.
    pub clfsh: bool,
    /// Bit 20 — Reserved.
    _rsv20: bool,
    /// Bit 21 — DS: debug store.
    pub ds: bool,
    /// Bit 22 — ACPI: thermal monitor and clock control.
    pub acpi: bool,
    /// Bit 23 — MMX.
    pub mmx: bool,
    /// Bit 24 — FXSR: FXSAVE/FXRSTOR.
    pub fxsr: bool,
    /// Bit 25 — SSE.
    pub sse: bool,
    /// Bit 26 — SSE2.
    pub sse2: bool,
    /// Bit 27 — SS: self-snoop.
    pub ss: bool,
    /// Bit 28 — HTT: max APIC IDs field is valid.
    pub htt: bool,
    /// Bit 29 — TM: thermal monitor.
    pub tm: bool,
    /// Bit 30 — Reserved.
    _rsv30: bool,
    /// Bit 31 — PBE: pending break enable.
    pub pbe: bool,
}

/// CPUID.01H:ECX feature flags as defined by AMD.
///
/// Structurally close to Intel's layout but with the Intel-only bits
/// (VMX, SMX, EST, DS, ...) reserved. SVM is reported in AMD's extended
/// leaf space, not here.
///
/// Reference: AMD APM Vol. 3, CPUID Fn0000_0001.
#[bitfield(u32)]
pub struct AmdFeatureEcx {
    /// Bit 0 — SSE3.
    pub sse3: bool,
    /// Bit 1 — PCLMULQDQ.
    pub pclmulqdq: bool,
    /// Bit 2 — Reserved.
    _rsv2: bool,
    /// Bit 3 — MONITOR/MWAIT.
    pub monitor: bool,
    /// Bits 8:4 — Reserved.
    #[bits(5)]
    _rsv4_8: u8,
    /// Bit 9 — SSSE3.
    pub ssse3: bool,
    /// Bits 11:10 — Reserved.
    #[bits(2)]
    _rsv10_11: u8,
    /// Bit 12 — FMA.
    pub fma: bool,
    /// Bit 13 — CMPXCHG16B.
    pub cmpxchg16b: bool,
    /// Bits 18:14 — Reserved.
    #[bits(5)]
    _rsv14_18: u8,
    /// Bit 19 — SSE4.1.
    pub sse41: bool,
    /// Bit 20 — SSE4.2.
    pub sse42: bool,
    /// Bit 21 — `x2APIC`.
    pub x2apic: bool,
    /// Bit 22 — MOVBE.
    pub movbe: bool,
    /// Bit 23 — POPCNT.
    pub popcnt: bool,
    /// Bit 24 — Reserved.
    _rsv24: bool,
    /// Bit 25 — AES-NI.
    pub aes: bool,
    /// Bit 26 — XSAVE.
    pub xsave: bool,
    /// Bit 27 — OSXSAVE: XSAVE enabled by the OS.
    pub osxsave: bool,
    /// Bit 28 — AVX.
    pub avx: bool,
    /// Bit 29 — F16C.
    pub f16c: bool,
    /// Bit 30 — RDRAND.
    pub rdrand: bool,
    /// Bit 31 — Reserved for hypervisor use (RAZ on bare metal).
    pub hypervisor: bool,
}

/// CPUID.01H:EDX feature flags as defined by AMD.
#[bitfield(u32)]
pub struct AmdFeatureEdx {
    /// Bit 0 — FPU on chip.
    pub fpu: bool,
    /// Bit 1 — VME: virtual-8086 mode enhancements.
    pub vme: bool,
    /// Bit 2 — DE: debugging extensions.
    pub de: bool,
    /// Bit 3 — PSE: page size extension.
    pub pse: bool,
    /// Bit 4 — TSC.
    pub tsc: bool,
    /// Bit 5 — MSR: RDMSR/WRMSR.
    pub msr: bool,
    /// Bit 6 — PAE: physical address extension.
    pub pae: bool,
    /// Bit 7 — MCE: machine-check exception.
    pub mce: bool,
    /// Bit 8 — CMPXCHG8B.
    pub cx8: bool,
    /// Bit 9 — APIC on chip.
    pub apic: bool,
    /// Bit 10 — Reserved.
    _rsv10: bool,
    /// Bit 11 — SYSENTER/SYSEXIT.
    pub sep: bool,
    /// Bit 12 — MTRR.
    pub mtrr: bool,
    /// Bit 13 — PGE: global pages.
    pub pge: bool,
    /// Bit 14 — MCA: machine-check architecture.
    pub mca: bool,
    /// Bit 15 — CMOV.
    pub cmov: bool,
    /// Bit 16 — PAT: page attribute table.
    pub pat: bool,
    /// Bit 17 — PSE-36.
    pub pse36: bool,
    /// Bit 18 — Reserved (no processor serial number on AMD).
    _rsv18: bool,
    /// Bit 19 — CLFSH: CLFLUSH.
    pub clfsh: bool,
    /// Bits 22:20 — Reserved.
    #[bits(3)]
    _rsv20_22: u8,
    /// Bit 23 — MMX.
    pub mmx: bool,
    /// Bit 24 — FXSR: FXSAVE/FXRSTOR.
    pub fxsr: bool,
    /// Bit 25 — SSE.
    pub sse: bool,
    /// Bit 26 — SSE2.
    pub sse2: bool,
    /// Bit 27 — Reserved.
    _rsv27: bool,
    /// Bit 28 — HTT: max APIC IDs field is valid.
    pub htt: bool,
    /// Bits 31:29 — Reserved.
    #[bits(3)]
    _rsv29_31: u8,
}

/// CPUID.01H interpreted with Intel's feature layout.
///
/// Only meaningful on a `GenuineIntel` part with `max_leaf >= 1`; querying
/// it elsewhere yields silently wrong values (see the crate docs).
#[derive(Copy, Clone, Debug)]
pub struct IntelFeatureInformation {
    pub version: VersionInfo,
    pub misc: MiscInfo,
    pub ecx: IntelFeatureEcx,
    pub edx: IntelFeatureEdx,
}

impl CpuidLeaf for IntelFeatureInformation {
    const LEAF: u32 = 0x1;
    const VENDORS: VendorSet = VendorSet::INTEL;

    fn interpret(raw: CpuidResult) -> Self {
        Self {
            version: VersionInfo::from_bits(raw.eax),
            misc: MiscInfo::from_bits(raw.ebx),
            ecx: IntelFeatureEcx::from_bits(raw.ecx),
            edx: IntelFeatureEdx::from_bits(raw.edx),
        }
    }
}

impl IntelFeatureInformation {
    /// AVX state can actually be used: the feature exists, XSAVE exists,
    /// and the OS has enabled it.
    #[inline]
    #[must_use]
    pub const fn avx_usable(&self) -> bool {
        self.ecx.avx() && self.ecx.xsave() && self.ecx.osxsave()
    }
}

/// CPUID.01H interpreted with AMD's feature layout.
///
/// Only meaningful on an `AuthenticAMD` part with `max_leaf >= 1`.
#[derive(Copy, Clone, Debug)]
pub struct AmdFeatureInformation {
    pub version: VersionInfo,
    pub misc: MiscInfo,
    pub ecx: AmdFeatureEcx,
    pub edx: AmdFeatureEdx,
}

impl CpuidLeaf for AmdFeatureInformation {
    const LEAF: u32 = 0x1;
    const VENDORS: VendorSet = VendorSet::AMD;

    fn interpret(raw: CpuidResult) -> Self {
        Self {
            version: VersionInfo::from_bits(raw.eax),
            misc: MiscInfo::from_bits(raw.ebx),
            ecx: AmdFeatureEcx::from_bits(raw.ecx),
            edx: AmdFeatureEdx::from_bits(raw.edx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_sse_bit_positions() {
        let f = IntelFeatureInformation::interpret(CpuidResult {
            eax: 0,
            ebx: 0,
            ecx: (1 << 0) | (1 << 9) | (1 << 19) | (1 << 20),
            edx: (1 << 25) | (1 << 26),
        });
        assert!(f.ecx.sse3());
        assert!(f.ecx.ssse3());
        assert!(f.ecx.sse41());
        assert!(f.ecx.sse42());
        assert!(f.edx.sse());
        assert!(f.edx.sse2());
        assert!(!f.ecx.vmx());
    }

    #[test]
    fn amd_layout_reserves_vmx_bit() {
        // Bit 5 is VMX on Intel; on AMD it is reserved and must not be
        // visible through any named accessor.
        let f = AmdFeatureInformation::interpret(CpuidResult {
            eax: 0,
            ebx: 0,
            ecx: 1 << 5,
            edx: 0,
        });
        assert!(!f.ecx.sse3());
        assert!(!f.ecx.monitor());
        assert_eq!(f.ecx.into_bits(), 1 << 5);
    }

    #[test]
    fn effective_family_and_model() {
        // Family 0x0F, ext family 0x01 => effective 0x10 (AMD K10 style).
        let v = VersionInfo::from_bits(0x0010_0F62);
        assert_eq!(v.family(), 0x0F);
        assert_eq!(v.effective_family(), 0x10);
        // Family 0x06: model extends (Intel style).
        let v = VersionInfo::from_bits(0x0009_06EA);
        assert_eq!(v.effective_family(), 0x06);
        assert_eq!(v.effective_model(), 0x9E);
        assert_eq!(v.stepping(), 0xA);
    }

    #[test]
    fn misc_info_fields() {
        let m = MiscInfo::from_bits(0x1F08_0800);
        assert_eq!(m.brand_index(), 0);
        assert_eq!(m.clflush_size(), 8);
        assert_eq!(m.logical_processor_count(), 8);
        assert_eq!(m.initial_apic_id(), 0x1F);
    }

    #[test]
    fn avx_usable_requires_os_enablement() {
        let mut ecx = IntelFeatureEcx::new().with_avx(true).with_xsave(true);
        let f = |ecx| IntelFeatureInformation {
            version: VersionInfo::new(),
            misc: MiscInfo::new(),
            ecx,
            edx: IntelFeatureEdx::new(),
        };
        assert!(!f(ecx).avx_usable());
        ecx.set_osxsave(true);
        assert!(f(ecx).avx_usable());
    }
}
