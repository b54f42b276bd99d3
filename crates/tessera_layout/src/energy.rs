//! Energy dissipation estimation.
//!
//! Implements an additive energy model for QCA circuits with per-element
//! dissipation values for a slow (25 GHz) and a fast (100 GHz) clock.
//! Inverters are split into straight and bent variants, distinguished by
//! whether a NOT tile's input and output directions are opposites.

use crate::layout::GateLayout;
use serde::{Deserialize, Serialize};
use tessera_network::Operation;

/// Energy dissipation values in meV, slow (25 GHz) and fast (100 GHz).
pub mod dissipation {
    /// Slow energy of a wire tile.
    pub const WIRE_SLOW: f64 = 0.09;
    /// Fast energy of a wire tile.
    pub const WIRE_FAST: f64 = 0.82;
    /// Slow energy of a fan-out.
    pub const FANOUT_SLOW: f64 = 0.12;
    /// Fast energy of a fan-out.
    pub const FANOUT_FAST: f64 = 1.42;
    /// Slow energy of a straight inverter.
    pub const INVERTER_STRAIGHT_SLOW: f64 = 0.13;
    /// Fast energy of a straight inverter.
    pub const INVERTER_STRAIGHT_FAST: f64 = 1.19;
    /// Slow energy of a bent inverter.
    pub const INVERTER_BENT_SLOW: f64 = 0.10;
    /// Fast energy of a bent inverter.
    pub const INVERTER_BENT_FAST: f64 = 0.84;
    /// Slow energy of a crossing.
    pub const CROSSING_SLOW: f64 = 0.28;
    /// Fast energy of a crossing.
    pub const CROSSING_FAST: f64 = 2.57;
    /// Slow energy of a conjunction.
    pub const AND_SLOW: f64 = 0.47;
    /// Fast energy of a conjunction.
    pub const AND_FAST: f64 = 1.39;
    /// Slow energy of a disjunction.
    pub const OR_SLOW: f64 = 0.47;
    /// Fast energy of a disjunction.
    pub const OR_FAST: f64 = 1.39;
    /// Slow energy of a majority gate.
    pub const MAJORITY_SLOW: f64 = 0.65;
    /// Fast energy of a majority gate.
    pub const MAJORITY_FAST: f64 = 1.68;
}

/// Energy dissipation of a layout in meV at slow and fast clocking.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyInfo {
    /// Dissipation at 25 GHz.
    pub slow: f64,
    /// Dissipation at 100 GHz.
    pub fast: f64,
}

impl GateLayout {
    /// Estimates the layout's energy dissipation.
    ///
    /// Wire tiles contribute the base wire energy (a crossing replaces its
    /// two stacked wire tiles by a single crossing element), and gates
    /// contribute per their operation.
    pub fn energy(&self) -> EnergyInfo {
        use dissipation::*;

        let num_wires = self.wire_count();
        let num_crossings = self.crossing_count();
        let plain_wires = num_wires.saturating_sub(num_crossings * 2);

        let mut slow = plain_wires as f64 * WIRE_SLOW;
        let mut fast = plain_wires as f64 * WIRE_FAST;

        slow += num_crossings as f64 * CROSSING_SLOW;
        fast += num_crossings as f64 * CROSSING_FAST;

        let mut inv_straight = 0usize;
        let mut inv_bent = 0usize;
        let mut ands = 0usize;
        let mut ors = 0usize;
        let mut majs = 0usize;
        let mut fan_outs = 0usize;

        for t in self.grid().tiles() {
            let Some(v) = self.get_vertex(t) else {
                continue;
            };
            match self.network().op(v) {
                Operation::Not => {
                    if self.tile_inp_dirs(t) == self.tile_out_dirs(t).opposite() {
                        inv_straight += 1;
                    } else {
                        inv_bent += 1;
                    }
                }
                Operation::And => ands += 1,
                Operation::Or => ors += 1,
                Operation::Maj => majs += 1,
                Operation::F1O2 | Operation::F1O3 => fan_outs += 1,
                _ => {}
            }
        }

        slow += inv_straight as f64 * INVERTER_STRAIGHT_SLOW + inv_bent as f64 * INVERTER_BENT_SLOW;
        fast += inv_straight as f64 * INVERTER_STRAIGHT_FAST + inv_bent as f64 * INVERTER_BENT_FAST;

        slow += ands as f64 * AND_SLOW + ors as f64 * OR_SLOW + majs as f64 * MAJORITY_SLOW;
        fast += ands as f64 * AND_FAST + ors as f64 * OR_FAST + majs as f64 * MAJORITY_FAST;

        slow += fan_outs as f64 * FANOUT_SLOW;
        fast += fan_outs as f64 * FANOUT_FAST;

        EnergyInfo { slow, fast }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_grid::{ClockingScheme, Directions, Tile};
    use tessera_network::LogicNetwork;

    #[test]
    fn empty_layout_has_no_energy() {
        let n = Arc::new(LogicNetwork::new("empty"));
        let l = GateLayout::new(2, 2, 2, ClockingScheme::twoddwave_4(), n);
        assert_eq!(l.energy(), EnergyInfo::default());
    }

    #[test]
    fn straight_vs_bent_inverter() {
        let mut n = LogicNetwork::new("inv");
        let a = n.create_pi("a");
        let g = n.create_not(a);
        let mut l = GateLayout::new(3, 3, 2, ClockingScheme::twoddwave_4(), Arc::new(n));

        let t = Tile::new(1, 1, 0);
        l.assign_vertex(t, g, false, false);
        l.assign_tile_inp_dir(t, Directions::W);
        l.assign_tile_out_dir(t, Directions::E);
        let straight = l.energy();
        assert!((straight.slow - dissipation::INVERTER_STRAIGHT_SLOW).abs() < 1e-9);
        assert!((straight.fast - dissipation::INVERTER_STRAIGHT_FAST).abs() < 1e-9);

        // bend the output south
        l.assign_vertex(t, g, false, false);
        l.assign_tile_inp_dir(t, Directions::W);
        l.assign_tile_out_dir(t, Directions::S);
        let bent = l.energy();
        assert!((bent.slow - dissipation::INVERTER_BENT_SLOW).abs() < 1e-9);
        assert!((bent.fast - dissipation::INVERTER_BENT_FAST).abs() < 1e-9);
    }

    #[test]
    fn wires_and_crossings() {
        let mut n = LogicNetwork::new("wires");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        let e1 = n.get_edge(a, g).unwrap();
        let e2 = n.get_edge(b, g).unwrap();
        let mut l = GateLayout::new(4, 4, 2, ClockingScheme::twoddwave_4(), Arc::new(n));

        l.assign_edge(Tile::new(0, 0, 0), e1);
        l.assign_edge(Tile::new(1, 0, 0), e1);
        let plain = l.energy();
        assert!((plain.slow - 2.0 * dissipation::WIRE_SLOW).abs() < 1e-9);

        // stack e2 on top of the second wire tile: a crossing
        l.assign_edge(Tile::new(1, 0, 1), e2);
        let crossed = l.energy();
        let expected = dissipation::WIRE_SLOW + dissipation::CROSSING_SLOW;
        assert!((crossed.slow - expected).abs() < 1e-9);
    }

    #[test]
    fn gate_census_is_additive() {
        let mut n = LogicNetwork::new("gates");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let c = n.create_pi("c");
        let g1 = n.create_and(a, b);
        let g2 = n.create_or(b, c);
        let g3 = n.create_maj(a, b, c);
        let mut l = GateLayout::new(4, 4, 2, ClockingScheme::twoddwave_4(), Arc::new(n));
        l.assign_vertex(Tile::new(0, 0, 0), g1, false, false);
        l.assign_vertex(Tile::new(1, 0, 0), g2, false, false);
        l.assign_vertex(Tile::new(2, 0, 0), g3, false, false);

        let e = l.energy();
        let slow = dissipation::AND_SLOW + dissipation::OR_SLOW + dissipation::MAJORITY_SLOW;
        let fast = dissipation::AND_FAST + dissipation::OR_FAST + dissipation::MAJORITY_FAST;
        assert!((e.slow - slow).abs() < 1e-9);
        assert!((e.fast - fast).abs() < 1e-9);
    }

    #[test]
    fn serde_roundtrip() {
        let e = EnergyInfo {
            slow: 1.25,
            fast: 9.5,
        };
        let json = serde_json::to_string(&e).unwrap();
        let restored: EnergyInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(e, restored);
    }
}
