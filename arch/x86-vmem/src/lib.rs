//! # x86-64 Linear Addresses and Page-Table Walking
//!
//! Hardware-faithful decoding of long-mode address translation: decompose
//! a linear address into per-level table indices, then walk a table tree
//! from a root frame to a leaf exactly the way the MMU does.
//!
//! ## The walk
//!
//! A 48-bit linear address in 4-level mode splits into five fields:
//!
//! ```text
//! | 47‒39 | 38‒30 | 29‒21 | 20‒12 | 11‒0   |
//! |  PML4 |  PDPT |   PD  |   PT  | offset |
//! ```
//!
//! Each 9-bit field indexes one of 512 entries in a 4 KiB table. An entry
//! either points at the next table or terminates the walk:
//!
//! - a **PTE** always maps a 4 KiB page,
//! - a **PDE** with `PS=1` maps a 2 MiB page,
//! - a **PDPTE** with `PS=1` maps a 1 GiB page,
//! - a **PML4E** (or PML5E) never maps a page — there is no PS bit to ask
//!   for at the root, and [`TableLevel::large_page_size`] encodes that.
//!
//! 5-level mode ([`PagingMode::Level5`], CR4.LA57) prepends one more
//! 9-bit field for 57 significant bits; nothing else changes.
//!
//! ## What this crate does *not* do
//!
//! It never touches memory: intermediate tables are fetched through the
//! caller-supplied [`TableSource`], mirroring hardware's physical reads.
//! It performs no permission checks (the leaf entry is surfaced in
//! [`Mapping`] for the caller to judge) and no reserved-bit validation —
//! table contents are trusted exactly as the MMU trusts them. A clear
//! present bit is the expected [`Translation::NotMapped`] outcome; a
//! failing [`TableSource`] lookup is an error, and the two are never
//! conflated.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod entry;
mod linear;
mod walk;

pub use entry::{ENTRY_COUNT, PageTable, PageTableEntry};
pub use linear::{LinearAddress, PagingMode, TableIndex, TableLevel};
pub use walk::{Mapping, MappedTables, TableSource, Translation, UnknownFrame, translate};
