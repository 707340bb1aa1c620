//! Emulated machine state as seen by the display
//!
//! The CPU core runs on the other context and owns all of this. The status
//! pages only read it through `MachineView`; `AtomicMachine` is a lock-free
//! implementation the core can update while the display is reading.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use bitflags::bitflags;

use crate::constants::{ADDR_SPACE, COMMON_SIZE, ROM_START, SEGMENT_SIZE};

/// Emulated CPU variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CpuKind {
    Z80 = 1,
    I8080 = 2,
}

impl CpuKind {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(CpuKind::Z80),
            2 => Some(CpuKind::I8080),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CpuKind::Z80 => "Z80",
            CpuKind::I8080 => "8080",
        }
    }
}

/// CPU registers. Primed Z80 registers carry a trailing underscore.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    A_,
    F_,
    B_,
    C_,
    D_,
    E_,
    H_,
    L_,
    I,
    R,
    /// Bit 7 of R as last loaded by `LD R,A`.
    R_,
    /// Interrupt flip-flops, IFF1 in bit 0 and IFF2 in bit 1.
    IFF,
    SP,
    PC,
    IX,
    IY,
}

const REG_COUNT: usize = Reg::IY as usize + 1;

bitflags! {
    /// Bits of the F register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuFlags: u8 {
        const S = 0x80;
        const Z = 0x40;
        const H = 0x10;
        const P = 0x04;
        const N = 0x02;
        const C = 0x01;
    }
}

bitflags! {
    /// 8080-style status byte latched at the start of each machine cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CpuBus: u8 {
        const MEMR = 0x80;
        const INP = 0x40;
        const M1 = 0x20;
        const OUT = 0x10;
        const HLTA = 0x08;
        const STACK = 0x04;
        const WO = 0x02;
        const INTA = 0x01;
    }
}

/// Front panel signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSource {
    /// Programmed output port (inverted on the panel).
    Output,
    Iff,
    CpuRun,
    Wait,
    BusRequest,
    Bus,
    Data,
    Address,
}

const PANEL_COUNT: usize = PanelSource::Address as usize + 1;

/// Read side of the machine state consumed by the status pages.
pub trait MachineView: Sync {
    fn cpu(&self) -> CpuKind;

    fn register(&self, reg: Reg) -> u16;

    fn panel(&self, source: PanelSource) -> u16;

    /// Number of memory banks; bank 0 is the CPU's 64K view.
    fn bank_count(&self) -> usize;

    fn memory_len(&self, bank: usize) -> usize;

    /// Byte at `addr` of `bank`, 0 outside the bank.
    fn read_memory(&self, bank: usize, addr: usize) -> u8;

    /// Little-endian 32-bit word starting at `addr`.
    fn read_word(&self, bank: usize, addr: usize) -> u32 {
        u32::from_le_bytes([
            self.read_memory(bank, addr),
            self.read_memory(bank, addr + 1),
            self.read_memory(bank, addr + 2),
            self.read_memory(bank, addr + 3),
        ])
    }

    /// Measured emulation speed in Hz.
    fn cpu_freq_hz(&self) -> u32;
}

/// Memory access used by the disk controller and the code loader.
pub trait DmaMemory {
    fn dma_read(&self, addr: u16) -> u8;

    fn dma_write(&self, addr: u16, data: u8);
}

/// Machine state held in atomics.
///
/// Memory is a shared common segment at the top of the address space and
/// `segments` switchable 48K segments below it. The page at `ROM_START`
/// becomes read-only once a boot ROM is loaded.
pub struct AtomicMachine {
    cpu: AtomicU8,
    regs: [AtomicU16; REG_COUNT],
    panel: [AtomicU16; PANEL_COUNT],
    freq: AtomicU32,
    selected: AtomicU8,
    rom_protect: AtomicBool,
    segments: Vec<Vec<AtomicU8>>,
    common: Vec<AtomicU8>,
}

#[allow(clippy::declare_interior_mutable_const)]
const ZERO_U16: AtomicU16 = AtomicU16::new(0);

fn zeroed(len: usize) -> Vec<AtomicU8> {
    (0..len).map(|_| AtomicU8::new(0)).collect()
}

impl AtomicMachine {
    pub fn new(cpu: CpuKind, segments: usize) -> Self {
        Self {
            cpu: AtomicU8::new(cpu as u8),
            regs: [ZERO_U16; REG_COUNT],
            panel: [ZERO_U16; PANEL_COUNT],
            freq: AtomicU32::new(0),
            selected: AtomicU8::new(0),
            rom_protect: AtomicBool::new(false),
            segments: (0..segments.max(1)).map(|_| zeroed(SEGMENT_SIZE)).collect(),
            common: zeroed(COMMON_SIZE),
        }
    }

    pub fn set_cpu(&self, cpu: CpuKind) {
        self.cpu.store(cpu as u8, Ordering::Relaxed);
    }

    pub fn set_register(&self, reg: Reg, value: u16) {
        self.regs[reg as usize].store(value, Ordering::Relaxed);
    }

    pub fn set_panel(&self, source: PanelSource, value: u16) {
        self.panel[source as usize].store(value, Ordering::Relaxed);
    }

    pub fn set_cpu_freq(&self, hz: u32) {
        self.freq.store(hz, Ordering::Relaxed);
    }

    pub fn segments(&self) -> usize {
        self.segments.len()
    }

    /// Switch the segment mapped below the common area. Out-of-range
    /// segments are ignored.
    pub fn select_bank(&self, segment: u8) {
        if (segment as usize) < self.segments.len() {
            self.selected.store(segment, Ordering::Relaxed);
        } else {
            log::warn!("select of missing memory segment {}", segment);
        }
    }

    fn cell(&self, addr: u16) -> &AtomicU8 {
        let addr = addr as usize;
        if addr >= SEGMENT_SIZE {
            &self.common[addr - SEGMENT_SIZE]
        } else {
            let seg = self.selected.load(Ordering::Relaxed) as usize;
            &self.segments[seg.min(self.segments.len() - 1)][addr]
        }
    }

    pub fn getmem(&self, addr: u16) -> u8 {
        self.cell(addr).load(Ordering::Relaxed)
    }

    /// Write to the current view. Writes into a loaded boot ROM are dropped.
    pub fn putmem(&self, addr: u16, data: u8) {
        if addr >= ROM_START && self.rom_protect.load(Ordering::Relaxed) {
            return;
        }
        self.cell(addr).store(data, Ordering::Relaxed);
    }

    /// Copy a boot ROM to `ROM_START` and write-protect it.
    pub fn load_boot_rom(&self, rom: &[u8]) {
        let room = ADDR_SPACE - ROM_START as usize;
        if rom.len() > room {
            log::warn!("boot ROM truncated from {} to {} bytes", rom.len(), room);
        }
        self.rom_protect.store(false, Ordering::Relaxed);
        for (i, &b) in rom.iter().take(room).enumerate() {
            self.putmem(ROM_START + i as u16, b);
        }
        self.rom_protect.store(true, Ordering::Relaxed);
    }
}

impl MachineView for AtomicMachine {
    fn cpu(&self) -> CpuKind {
        CpuKind::from_raw(self.cpu.load(Ordering::Relaxed)).unwrap_or(CpuKind::Z80)
    }

    fn register(&self, reg: Reg) -> u16 {
        self.regs[reg as usize].load(Ordering::Relaxed)
    }

    fn panel(&self, source: PanelSource) -> u16 {
        self.panel[source as usize].load(Ordering::Relaxed)
    }

    fn bank_count(&self) -> usize {
        self.segments.len()
    }

    fn memory_len(&self, bank: usize) -> usize {
        match bank {
            0 => ADDR_SPACE,
            b if b < self.segments.len() => SEGMENT_SIZE,
            _ => 0,
        }
    }

    fn read_memory(&self, bank: usize, addr: usize) -> u8 {
        match bank {
            0 if addr < ADDR_SPACE => self.getmem(addr as u16),
            b if b < self.segments.len() && addr < SEGMENT_SIZE => {
                self.segments[b][addr].load(Ordering::Relaxed)
            }
            _ => 0,
        }
    }

    fn cpu_freq_hz(&self) -> u32 {
        self.freq.load(Ordering::Relaxed)
    }
}

impl DmaMemory for AtomicMachine {
    fn dma_read(&self, addr: u16) -> u8 {
        self.getmem(addr)
    }

    fn dma_write(&self, addr: u16, data: u8) {
        self.putmem(addr, data);
    }
}
