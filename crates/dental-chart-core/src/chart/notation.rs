//! Canonical (1-32) to FDI two-digit tooth notation.
//!
//! Canonical numbers run around the mouth starting at the upper right third
//! molar: 1-8 upper right, 9-16 upper left, 17-24 lower left, 25-32 lower right.
//! FDI codes are quadrant digit + position from the midline (11-18, 21-28,
//! 31-38, 41-48). The table is only for display and diagram input; storage and
//! backend calls always use canonical numbers.

use crate::models::is_canonical;

/// FDI code for canonical tooth `n` at index `n - 1`.
const CANONICAL_TO_FDI: [u8; 32] = [
    // Upper right quadrant (1-8 -> 18..11)
    18, 17, 16, 15, 14, 13, 12, 11,
    // Upper left quadrant (9-16 -> 21..28)
    21, 22, 23, 24, 25, 26, 27, 28,
    // Lower left quadrant (17-24 -> 31..38)
    31, 32, 33, 34, 35, 36, 37, 38,
    // Lower right quadrant (25-32 -> 41..48)
    41, 42, 43, 44, 45, 46, 47, 48,
];

/// Canonical number indexed by FDI code; 0 marks an unmapped code.
const FDI_TO_CANONICAL: [u8; 49] = invert(&CANONICAL_TO_FDI);

const fn invert(table: &[u8; 32]) -> [u8; 49] {
    let mut out = [0u8; 49];
    let mut i = 0;
    while i < table.len() {
        out[table[i] as usize] = (i + 1) as u8;
        i += 1;
    }
    out
}

/// Upper jaw in diagram order (patient's right to left: FDI 18..11, 21..28).
pub const UPPER_JAW: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];

/// Lower jaw in diagram order (patient's right to left: FDI 48..41, 31..38).
pub const LOWER_JAW: [u8; 16] = [32, 31, 30, 29, 28, 27, 26, 25, 17, 18, 19, 20, 21, 22, 23, 24];

/// FDI code for a canonical tooth number. Numbers outside 1-32 pass through.
pub fn to_fdi(tooth_number: u8) -> u8 {
    if is_canonical(tooth_number) {
        CANONICAL_TO_FDI[(tooth_number - 1) as usize]
    } else {
        tooth_number
    }
}

/// Canonical tooth number for an FDI code. Unmapped codes pass through.
pub fn from_fdi(fdi: u8) -> u8 {
    match FDI_TO_CANONICAL.get(fdi as usize) {
        Some(&canonical) if canonical != 0 => canonical,
        _ => fdi,
    }
}

/// Whether `fdi` is one of the 32 permanent-tooth FDI codes.
pub fn is_valid_fdi(fdi: u8) -> bool {
    matches!(FDI_TO_CANONICAL.get(fdi as usize), Some(&c) if c != 0)
}

/// Dental quadrant, named from the patient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Quadrant {
    /// Quadrant of a canonical tooth number.
    pub fn of(tooth_number: u8) -> Option<Self> {
        if !is_canonical(tooth_number) {
            return None;
        }
        Self::of_fdi(to_fdi(tooth_number))
    }

    /// Quadrant of an FDI code (its first digit).
    pub fn of_fdi(fdi: u8) -> Option<Self> {
        if !is_valid_fdi(fdi) {
            return None;
        }
        match fdi / 10 {
            1 => Some(Quadrant::UpperRight),
            2 => Some(Quadrant::UpperLeft),
            3 => Some(Quadrant::LowerLeft),
            4 => Some(Quadrant::LowerRight),
            _ => None,
        }
    }

    pub fn is_upper(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::UpperLeft)
    }
}
