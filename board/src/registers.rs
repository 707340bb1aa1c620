//! Register page layouts
//!
//! One static table per CPU variant. Each cell names a grid position, an
//! optional label and where its value comes from. Byte and word values are
//! drawn right to left ending at `col`; labels sit left of the value.
//!
//! Z80 (10x20 font, 23 columns):
//!
//! ```text
//! AF  A F | BC   B C | DE   D E
//! HL  H L | SP  xxxx | PC  xxxx
//! AF' A F | BC'  B C | DE'  D E
//! HL' H L | IX  xxxx | IY  xxxx
//! F SZHPNC | IF 12 | IR   I R
//! ```

use embedded_graphics::mono_font::MonoFont;

use crate::draw::FONT_LARGE;
use crate::machine::{CpuFlags, CpuKind, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegKind {
    /// Two hex digits.
    Byte(Reg),
    /// Four hex digits.
    Word(Reg),
    /// Flag bit of F, one glyph colored by state.
    Flag { glyph: char, mask: u8 },
    /// Interrupt flip-flop glyph, set when all `mask` bits of IFF are set.
    Interrupt { glyph: char, mask: u8 },
    /// Z80 refresh register, bit 7 from R'.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegCell {
    pub col: i32,
    pub row: i32,
    pub label: Option<&'static str>,
    pub kind: RegKind,
}

impl RegCell {
    /// Column of the first label character.
    pub fn label_col(&self) -> i32 {
        match self.kind {
            RegKind::Word(_) => self.col - 6,
            RegKind::Interrupt { .. } => self.col - 3,
            _ => self.col - 4,
        }
    }

    /// Number of value glyphs ending at `col`.
    pub fn width(&self) -> i32 {
        match self.kind {
            RegKind::Word(_) => 4,
            RegKind::Byte(_) | RegKind::Refresh => 2,
            RegKind::Flag { .. } | RegKind::Interrupt { .. } => 1,
        }
    }
}

/// Line in grid units: column, row, length.
pub type GridLine = (i32, i32, i32);

pub struct RegisterPage {
    pub font: &'static MonoFont<'static>,
    pub xoff: i32,
    pub yoff: i32,
    pub spc: i32,
    /// `None` fits as many columns as the canvas allows.
    pub cols: Option<i32>,
    pub rows: i32,
    pub vlines: &'static [GridLine],
    pub hlines: &'static [GridLine],
    pub cells: &'static [RegCell],
}

const fn cell(col: i32, row: i32, label: Option<&'static str>, kind: RegKind) -> RegCell {
    RegCell { col, row, label, kind }
}

const fn flag(col: i32, row: i32, label: Option<&'static str>, glyph: char, f: CpuFlags) -> RegCell {
    cell(col, row, label, RegKind::Flag { glyph, mask: f.bits() })
}

#[cfg(feature = "z80")]
pub static Z80_REGISTERS: RegisterPage = RegisterPage {
    font: FONT_LARGE,
    xoff: 5,
    yoff: 0,
    spc: 3,
    cols: None,
    rows: 5,
    vlines: &[(7, 0, 4), (10, 4, 1), (15, 0, 5)],
    hlines: &[(0, 1, 23), (0, 2, 23), (0, 3, 23), (0, 4, 23), (0, 5, 23)],
    cells: &[
        cell(4, 0, Some("AF"), RegKind::Byte(Reg::A)),
        cell(6, 0, None, RegKind::Byte(Reg::F)),
        cell(12, 0, Some("BC"), RegKind::Byte(Reg::B)),
        cell(14, 0, None, RegKind::Byte(Reg::C)),
        cell(20, 0, Some("DE"), RegKind::Byte(Reg::D)),
        cell(22, 0, None, RegKind::Byte(Reg::E)),
        cell(4, 1, Some("HL"), RegKind::Byte(Reg::H)),
        cell(6, 1, None, RegKind::Byte(Reg::L)),
        cell(14, 1, Some("SP"), RegKind::Word(Reg::SP)),
        cell(22, 1, Some("PC"), RegKind::Word(Reg::PC)),
        cell(4, 2, Some("AF'"), RegKind::Byte(Reg::A_)),
        cell(6, 2, None, RegKind::Byte(Reg::F_)),
        cell(12, 2, Some("BC'"), RegKind::Byte(Reg::B_)),
        cell(14, 2, None, RegKind::Byte(Reg::C_)),
        cell(20, 2, Some("DE'"), RegKind::Byte(Reg::D_)),
        cell(22, 2, None, RegKind::Byte(Reg::E_)),
        cell(4, 3, Some("HL'"), RegKind::Byte(Reg::H_)),
        cell(6, 3, None, RegKind::Byte(Reg::L_)),
        cell(14, 3, Some("IX"), RegKind::Word(Reg::IX)),
        cell(22, 3, Some("IY"), RegKind::Word(Reg::IY)),
        flag(3, 4, None, 'S', CpuFlags::S),
        flag(4, 4, Some("F"), 'Z', CpuFlags::Z),
        flag(5, 4, None, 'H', CpuFlags::H),
        flag(6, 4, None, 'P', CpuFlags::P),
        flag(7, 4, None, 'N', CpuFlags::N),
        flag(8, 4, None, 'C', CpuFlags::C),
        cell(13, 4, None, RegKind::Interrupt { glyph: '1', mask: 1 }),
        cell(14, 4, Some("IF"), RegKind::Interrupt { glyph: '2', mask: 2 }),
        cell(20, 4, Some("IR"), RegKind::Byte(Reg::I)),
        cell(22, 4, None, RegKind::Refresh),
    ],
};

#[cfg(feature = "i8080")]
pub static I8080_REGISTERS: RegisterPage = RegisterPage {
    font: FONT_LARGE,
    xoff: 40,
    yoff: 0,
    spc: 8,
    cols: Some(16),
    rows: 4,
    vlines: &[(8, 0, 4)],
    hlines: &[(0, 1, 16), (0, 2, 16), (0, 3, 16), (0, 4, 16)],
    cells: &[
        cell(4, 0, Some("AF"), RegKind::Byte(Reg::A)),
        cell(6, 0, None, RegKind::Byte(Reg::F)),
        cell(13, 0, Some("BC"), RegKind::Byte(Reg::B)),
        cell(15, 0, None, RegKind::Byte(Reg::C)),
        cell(4, 1, Some("DE"), RegKind::Byte(Reg::D)),
        cell(6, 1, None, RegKind::Byte(Reg::E)),
        cell(13, 1, Some("HL"), RegKind::Byte(Reg::H)),
        cell(15, 1, None, RegKind::Byte(Reg::L)),
        cell(6, 2, Some("SP"), RegKind::Word(Reg::SP)),
        cell(15, 2, Some("PC"), RegKind::Word(Reg::PC)),
        flag(3, 3, None, 'S', CpuFlags::S),
        flag(4, 3, Some("F"), 'Z', CpuFlags::Z),
        flag(5, 3, None, 'H', CpuFlags::H),
        flag(6, 3, None, 'P', CpuFlags::P),
        flag(7, 3, None, 'C', CpuFlags::C),
        cell(15, 3, Some("IF"), RegKind::Interrupt { glyph: '1', mask: 3 }),
    ],
};

/// Layout for a CPU variant, `None` if its table is not built in.
pub fn table(cpu: CpuKind) -> Option<&'static RegisterPage> {
    match cpu {
        #[cfg(feature = "z80")]
        CpuKind::Z80 => Some(&Z80_REGISTERS),
        #[cfg(feature = "i8080")]
        CpuKind::I8080 => Some(&I8080_REGISTERS),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
