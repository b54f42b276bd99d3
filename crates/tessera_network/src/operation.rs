//! Boolean operations carried by network vertices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation performed by a logic-network vertex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Operation {
    /// Constant logic 0. Unique per network.
    Zero,
    /// Constant logic 1. Unique per network.
    One,
    /// Primary input port.
    Pi,
    /// Primary output port.
    Po,
    /// Buffer (identity).
    Buf,
    /// Inverter.
    Not,
    /// 2-input conjunction.
    And,
    /// 2-input disjunction.
    Or,
    /// 2-input exclusive disjunction. Decomposed before placement.
    Xor,
    /// 3-input majority.
    Maj,
    /// 1-to-2 fan-out.
    F1O2,
    /// 1-to-3 fan-out.
    F1O3,
    /// Auxiliary balance wire (1-in/1-out).
    W,
}

/// All operations in a fixed census order.
pub const ALL_OPERATIONS: [Operation; 13] = [
    Operation::Zero,
    Operation::One,
    Operation::Pi,
    Operation::Po,
    Operation::Buf,
    Operation::Not,
    Operation::And,
    Operation::Or,
    Operation::Xor,
    Operation::Maj,
    Operation::F1O2,
    Operation::F1O3,
    Operation::W,
];

impl Operation {
    /// Returns the required fan-in of this operation.
    pub const fn num_inputs(self) -> usize {
        match self {
            Operation::Zero | Operation::One | Operation::Pi => 0,
            Operation::Po
            | Operation::Buf
            | Operation::Not
            | Operation::F1O2
            | Operation::F1O3
            | Operation::W => 1,
            Operation::And | Operation::Or | Operation::Xor => 2,
            Operation::Maj => 3,
        }
    }

    /// Returns the maximum fan-out of this operation after normalization, or
    /// `None` if it is unbounded (constants fan out freely).
    pub const fn max_outputs(self) -> Option<usize> {
        match self {
            Operation::Zero | Operation::One => None,
            Operation::Po => Some(0),
            Operation::F1O2 => Some(2),
            Operation::F1O3 => Some(3),
            _ => Some(1),
        }
    }

    /// Returns `true` for explicit I/O port operations.
    pub const fn is_io(self) -> bool {
        matches!(self, Operation::Pi | Operation::Po)
    }

    /// Returns `true` for the constant operations.
    pub const fn is_const(self) -> bool {
        matches!(self, Operation::Zero | Operation::One)
    }

    /// Returns `true` for fan-out operations.
    pub const fn is_fanout(self) -> bool {
        matches!(self, Operation::F1O2 | Operation::F1O3)
    }

    /// Returns the census index of this operation.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the single glyph used by textual layout dumps.
    pub const fn glyph(self) -> &'static str {
        match self {
            Operation::Zero => "0",
            Operation::One => "1",
            Operation::Pi => "I",
            Operation::Po => "O",
            Operation::Buf => "B",
            Operation::Not => "¬",
            Operation::And => "&",
            Operation::Or => "|",
            Operation::Xor => "^",
            Operation::Maj => "M",
            Operation::F1O2 | Operation::F1O3 => "F",
            Operation::W => "=",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Zero => "ZERO",
            Operation::One => "ONE",
            Operation::Pi => "PI",
            Operation::Po => "PO",
            Operation::Buf => "BUF",
            Operation::Not => "NOT",
            Operation::And => "AND",
            Operation::Or => "OR",
            Operation::Xor => "XOR",
            Operation::Maj => "MAJ",
            Operation::F1O2 => "F1O2",
            Operation::F1O3 => "F1O3",
            Operation::W => "W",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arities() {
        assert_eq!(Operation::Pi.num_inputs(), 0);
        assert_eq!(Operation::Not.num_inputs(), 1);
        assert_eq!(Operation::And.num_inputs(), 2);
        assert_eq!(Operation::Xor.num_inputs(), 2);
        assert_eq!(Operation::Maj.num_inputs(), 3);
        assert_eq!(Operation::W.num_inputs(), 1);
        assert_eq!(Operation::F1O2.num_inputs(), 1);
    }

    #[test]
    fn fanout_bounds() {
        assert_eq!(Operation::F1O2.max_outputs(), Some(2));
        assert_eq!(Operation::F1O3.max_outputs(), Some(3));
        assert_eq!(Operation::And.max_outputs(), Some(1));
        assert_eq!(Operation::Po.max_outputs(), Some(0));
        assert_eq!(Operation::Zero.max_outputs(), None);
    }

    #[test]
    fn classification() {
        assert!(Operation::Pi.is_io());
        assert!(Operation::Po.is_io());
        assert!(!Operation::And.is_io());
        assert!(Operation::Zero.is_const());
        assert!(Operation::One.is_const());
        assert!(!Operation::Buf.is_const());
        assert!(Operation::F1O2.is_fanout());
        assert!(!Operation::W.is_fanout());
    }

    #[test]
    fn census_order_is_consistent() {
        for (i, op) in ALL_OPERATIONS.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }

    #[test]
    fn glyphs_are_single_width() {
        for op in ALL_OPERATIONS {
            assert_eq!(op.glyph().chars().count(), 1);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Operation::And.to_string(), "AND");
        assert_eq!(Operation::F1O2.to_string(), "F1O2");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Operation::Maj).unwrap();
        let restored: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Operation::Maj);
    }
}
