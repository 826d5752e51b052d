//! Bundled fixed-input machines
//!
//! Machines 1 to 3 have 80 rules, 4 to 6 have 240. Indices are 1-based and
//! anything outside `1..=6` selects machine 6.

use super::{MachineError, MachineSpec};

const BUNDLED: [&str; 6] = [
    include_str!("../../machines/input1.txt"),
    include_str!("../../machines/input2.txt"),
    include_str!("../../machines/input3.txt"),
    include_str!("../../machines/input4.txt"),
    include_str!("../../machines/input5.txt"),
    include_str!("../../machines/input6.txt"),
];

/// Number of bundled machines
pub const COUNT: usize = BUNDLED.len();

/// Index used when none (or an invalid one) is given
pub const DEFAULT_INDEX: usize = COUNT;

/// Clamp a requested index to a valid 1-based one
pub fn resolve_index(index: usize) -> usize {
    if (1..=COUNT).contains(&index) {
        index
    } else {
        DEFAULT_INDEX
    }
}

/// Raw text of a bundled machine
pub fn text(index: usize) -> &'static str {
    BUNDLED[resolve_index(index) - 1]
}

/// Decode a bundled machine
pub fn load(index: usize) -> Result<MachineSpec, MachineError> {
    text(index).parse()
}
