//! Clocking schemes for tile-based FCN layouts.
//!
//! A clocking scheme assigns every tile a clock phase in `0..phases`.
//! Regular schemes store a small periodic cutout from which all other
//! positions are extrapolated by modular indexing; open (irregular) schemes
//! carry no cutout and leave phase assignment to the layout or the solver.

use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// A clock phase in `0..phases`.
pub type Phase = usize;

/// A clocking scheme: a named periodic cutout of clock phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockingScheme {
    /// Name of the scheme, e.g. `"2DDWAVE4"`.
    pub name: String,
    /// Periodic cutout of phases, `cutout[row][column]`. Empty for open
    /// schemes.
    pub cutout: Vec<Vec<Phase>>,
    /// Number of distinct clock phases in the scheme.
    pub phases: usize,
    /// `true` if the scheme is regular, i.e. fully determined by the cutout.
    pub regular: bool,
}

impl ClockingScheme {
    /// Creates a clocking scheme from a cutout.
    pub fn new(
        name: impl Into<String>,
        cutout: Vec<Vec<Phase>>,
        phases: usize,
        regular: bool,
    ) -> Self {
        ClockingScheme {
            name: name.into(),
            cutout,
            phases,
            regular,
        }
    }

    /// Returns the phase of tile `t`, or `None` for irregular schemes.
    ///
    /// Clocking is identical across layers, so only the ground projection of
    /// `t` matters.
    pub fn phase_of(&self, t: Tile) -> Option<Phase> {
        if !self.regular || self.cutout.is_empty() {
            return None;
        }
        let row = &self.cutout[t.y % self.cutout.len()];
        Some(row[t.x % row.len()])
    }

    /// Pre-defined open clocking with 3 phases.
    pub fn open_3() -> Self {
        ClockingScheme::new("OPEN3", vec![], 3, false)
    }

    /// Pre-defined open clocking with 4 phases.
    pub fn open_4() -> Self {
        ClockingScheme::new("OPEN4", vec![], 4, false)
    }

    /// 3-phase adoption of the 2DDWave clocking.
    pub fn twoddwave_3() -> Self {
        ClockingScheme::new(
            "2DDWAVE3",
            vec![vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]],
            3,
            true,
        )
    }

    /// The original 4-phase 2DDWave clocking: phases increase towards the
    /// south-east so that information flows diagonally.
    pub fn twoddwave_4() -> Self {
        ClockingScheme::new(
            "2DDWAVE4",
            vec![
                vec![0, 1, 2, 3],
                vec![1, 2, 3, 0],
                vec![2, 3, 0, 1],
                vec![3, 0, 1, 2],
            ],
            4,
            true,
        )
    }

    /// The USE clocking (universal, scalable, efficient; 4 phases).
    pub fn use_4() -> Self {
        ClockingScheme::new(
            "USE",
            vec![
                vec![0, 1, 2, 3],
                vec![3, 2, 1, 0],
                vec![2, 3, 0, 1],
                vec![1, 0, 3, 2],
            ],
            4,
            true,
        )
    }

    /// The RES clocking (4 phases).
    pub fn res_4() -> Self {
        ClockingScheme::new(
            "RES",
            vec![
                vec![3, 0, 1, 2],
                vec![0, 1, 0, 3],
                vec![1, 2, 3, 0],
                vec![0, 3, 2, 1],
            ],
            4,
            true,
        )
    }

    /// The BANCS clocking (bidirectional alternating; 3 phases, 6×3 cutout).
    pub fn bancs_3() -> Self {
        ClockingScheme::new(
            "BANCS",
            vec![
                vec![0, 1, 2],
                vec![2, 1, 0],
                vec![2, 0, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![0, 2, 1],
            ],
            3,
            true,
        )
    }

    /// 3-phase column-striped ToPoliNano clocking for iNML layouts.
    pub fn topolinano_3() -> Self {
        ClockingScheme::new(
            "TOPOLINANO3",
            vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]],
            3,
            true,
        )
    }

    /// 4-phase column-striped ToPoliNano clocking for iNML layouts.
    pub fn topolinano_4() -> Self {
        ClockingScheme::new(
            "TOPOLINANO4",
            vec![
                vec![0, 1, 2, 3],
                vec![0, 1, 2, 3],
                vec![0, 1, 2, 3],
                vec![0, 1, 2, 3],
            ],
            4,
            true,
        )
    }
}

/// Looks up a clocking scheme by name, case-insensitively.
///
/// Recognized names and aliases: `OPEN3`, `OPEN4`/`OPEN`, `2DDWAVE3`/`DIAG3`,
/// `2DDWAVE4`/`DIAG4`/`2DDWAVE`, `USE`, `RES`, `BANCS`,
/// `TOPOLINANO3`/`TOPOLINANO`, `TOPOLINANO4`. Returns `None` for anything
/// else.
pub fn lookup_clocking(name: &str) -> Option<ClockingScheme> {
    match name.to_uppercase().as_str() {
        "OPEN3" => Some(ClockingScheme::open_3()),
        "OPEN4" | "OPEN" => Some(ClockingScheme::open_4()),
        "2DDWAVE3" | "DIAG3" => Some(ClockingScheme::twoddwave_3()),
        "2DDWAVE4" | "DIAG4" | "2DDWAVE" => Some(ClockingScheme::twoddwave_4()),
        "USE" => Some(ClockingScheme::use_4()),
        "RES" => Some(ClockingScheme::res_4()),
        "BANCS" => Some(ClockingScheme::bancs_3()),
        "TOPOLINANO3" | "TOPOLINANO" => Some(ClockingScheme::topolinano_3()),
        "TOPOLINANO4" => Some(ClockingScheme::topolinano_4()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_clocking("use").unwrap().name, "USE");
        assert_eq!(lookup_clocking("2ddWave4").unwrap().name, "2DDWAVE4");
        assert_eq!(lookup_clocking("BANCS").unwrap().name, "BANCS");
    }

    #[test]
    fn lookup_aliases() {
        assert_eq!(lookup_clocking("open").unwrap().name, "OPEN4");
        assert_eq!(lookup_clocking("diag3").unwrap().name, "2DDWAVE3");
        assert_eq!(lookup_clocking("diag4").unwrap().name, "2DDWAVE4");
        assert_eq!(lookup_clocking("2ddwave").unwrap().name, "2DDWAVE4");
        assert_eq!(lookup_clocking("topolinano").unwrap().name, "TOPOLINANO3");
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(lookup_clocking("RINGROAD").is_none());
        assert!(lookup_clocking("use3").is_none());
        assert!(lookup_clocking("").is_none());
    }

    #[test]
    fn open_schemes_have_no_phase() {
        let open = ClockingScheme::open_4();
        assert!(!open.regular);
        assert_eq!(open.phases, 4);
        assert_eq!(open.phase_of(Tile::new(0, 0, 0)), None);
    }

    #[test]
    fn twoddwave_4_phase_lookup() {
        let s = ClockingScheme::twoddwave_4();
        assert_eq!(s.phase_of(Tile::new(0, 0, 0)), Some(0));
        assert_eq!(s.phase_of(Tile::new(1, 0, 0)), Some(1));
        assert_eq!(s.phase_of(Tile::new(0, 1, 0)), Some(1));
        assert_eq!(s.phase_of(Tile::new(3, 3, 0)), Some(2));
        // periodic extension
        assert_eq!(s.phase_of(Tile::new(4, 0, 0)), Some(0));
        assert_eq!(s.phase_of(Tile::new(5, 6, 0)), Some(3));
    }

    #[test]
    fn phase_ignores_layer() {
        let s = ClockingScheme::use_4();
        assert_eq!(
            s.phase_of(Tile::new(2, 1, 0)),
            s.phase_of(Tile::new(2, 1, 1))
        );
    }

    #[test]
    fn bancs_cutout_is_six_by_three() {
        let s = ClockingScheme::bancs_3();
        assert_eq!(s.cutout.len(), 6);
        assert!(s.cutout.iter().all(|row| row.len() == 3));
        assert_eq!(s.phases, 3);
        // wraps vertically after six rows
        assert_eq!(
            s.phase_of(Tile::new(0, 6, 0)),
            s.phase_of(Tile::new(0, 0, 0))
        );
    }

    #[test]
    fn topolinano_is_column_striped() {
        let s = ClockingScheme::topolinano_4();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(s.phase_of(Tile::new(x, y, 0)), Some(x % 4));
            }
        }
    }

    #[test]
    fn regular_schemes_cover_all_phases() {
        for name in ["2DDWAVE3", "2DDWAVE4", "USE", "RES", "BANCS"] {
            let s = lookup_clocking(name).unwrap();
            let mut seen = vec![false; s.phases];
            for row in &s.cutout {
                for &p in row {
                    seen[p] = true;
                }
            }
            assert!(seen.iter().all(|&b| b), "{name} misses a phase");
        }
    }

    #[test]
    fn serde_roundtrip() {
        let s = ClockingScheme::res_4();
        let json = serde_json::to_string(&s).unwrap();
        let restored: ClockingScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }
}
