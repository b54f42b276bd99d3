//! Textual layout dumps.
//!
//! Renders a layout as a glyph matrix with direction arrows between tiles.
//! Primarily a debugging aid; large layouts become unwieldy. Only one
//! crossing layer is represented (a wire above a wire prints as `+`).

use crate::layout::GateLayout;
use std::fmt::Write as _;
use tessera_grid::{Directions, Tile};
use tessera_network::Operation;

/// Escape sequence for primary-input glyphs (green).
const INP_COLOR: &str = "\u{1b}[38;5;28m";
/// Escape sequence for primary-output glyphs (red).
const OUT_COLOR: &str = "\u{1b}[38;5;166m";
/// Escape sequence for latch tiles (yellow on black).
const LATCH_COLOR: &str = "\u{1b}[48;5;232;38;5;226m";
/// Escape sequence resetting all attributes.
const COLOR_RESET: &str = "\u{1b}[0m";
/// Background colors per clock phase (white to dark grey).
const CLOCK_COLORS: [&str; 4] = [
    "\u{1b}[48;5;255;38;5;232m",
    "\u{1b}[48;5;248;38;5;232m",
    "\u{1b}[48;5;240;38;5;255m",
    "\u{1b}[48;5;236;38;5;255m",
];

impl GateLayout {
    /// Renders the layout as text.
    ///
    /// Each tile prints as a single operation glyph with arrows
    /// (`→ ← ↑ ↓ ↔ ↕`) marking outgoing directions between rows and columns.
    /// `io_color` highlights PI/PO tiles and latches with ANSI escapes;
    /// `clk_color` adds a background color per clock phase.
    pub fn dump(&self, io_color: bool, clk_color: bool) -> String {
        let mut out = String::new();

        if self.grid().area() == 0 {
            out.push_str("∅\n");
            return out;
        }

        let num_cols = self.x();
        let num_rows = self.y();

        let mut ops = vec![vec![String::from(" "); num_cols]; num_rows];
        let mut x_dirs = vec![vec![" "; num_cols + 1]; num_rows];
        let mut y_dirs = vec![vec![" "; num_cols]; num_rows + 1];

        for i in 0..num_rows {
            for j in 0..num_cols {
                let t1 = Tile::new(j, i, 0);
                let t2 = self.grid().above(t1);
                let above_op = t2.and_then(|t| self.get_op(t));

                // a wire above a wire indicates a crossing
                ops[i][j] = if self.get_op(t1) == Some(Operation::W) && above_op == Some(Operation::W)
                {
                    "+".to_string()
                } else {
                    self.get_op(t1).map(|o| o.glyph().to_string()).unwrap_or_else(|| "▢".to_string())
                };

                let out_dir =
                    |t: Option<Tile>, d: Directions| t.is_some_and(|t| self.is_tile_out_dir(t, d));
                let east_nbr_ground = self.grid().east(t1);
                let east_nbr_above = east_nbr_ground.and_then(|t| self.grid().above(t));
                let north_nbr_ground = self.grid().north(t1);
                let north_nbr_above = north_nbr_ground.and_then(|t| self.grid().above(t));

                let east_out = out_dir(Some(t1), Directions::E) || out_dir(t2, Directions::E);
                let east_back = out_dir(east_nbr_ground, Directions::W)
                    || out_dir(east_nbr_above, Directions::W);
                if east_out && east_back {
                    x_dirs[i][j] = "↔";
                } else if east_out {
                    x_dirs[i][j] = "→";
                } else if east_back {
                    x_dirs[i][j] = "←";
                }

                let north_out = out_dir(Some(t1), Directions::N) || out_dir(t2, Directions::N);
                let north_south = out_dir(north_nbr_ground, Directions::S)
                    || out_dir(north_nbr_above, Directions::S);
                if north_out && north_south {
                    y_dirs[i][j] = "↕";
                } else if north_out {
                    y_dirs[i][j] = "↑";
                } else if north_south {
                    y_dirs[i][j] = "↓";
                }
            }
        }

        for (i, row) in ops.iter().enumerate() {
            for d in &y_dirs[i] {
                let _ = write!(out, "{d} ");
            }
            out.push('\n');

            for (j, o) in row.iter().enumerate() {
                let t = Tile::new(j, i, 0);
                let mut colored = false;

                if clk_color {
                    if let Some(p) = self.phase_of(t) {
                        if p < CLOCK_COLORS.len() {
                            out.push_str(CLOCK_COLORS[p]);
                            colored = true;
                        }
                    }
                }
                if io_color && self.latch(t) > 0 {
                    out.push_str(LATCH_COLOR);
                    colored = true;
                }
                if io_color && self.is_pi(t) {
                    out.push_str(INP_COLOR);
                    colored = true;
                } else if io_color && self.is_po(t) {
                    out.push_str(OUT_COLOR);
                    colored = true;
                }

                out.push_str(o);
                if colored {
                    out.push_str(COLOR_RESET);
                }
                out.push_str(x_dirs[i][j]);
            }
            out.push('\n');
        }

        if io_color || clk_color {
            out.push_str("\nLegend: ");
            if clk_color {
                for (p, color) in CLOCK_COLORS.iter().enumerate().take(self.num_phases()) {
                    let _ = write!(out, "{color}{p}{COLOR_RESET}, ");
                }
            }
            if io_color {
                let _ = write!(
                    out,
                    "{LATCH_COLOR}L{COLOR_RESET}, {INP_COLOR}I{COLOR_RESET}, {OUT_COLOR}O{COLOR_RESET}"
                );
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_grid::ClockingScheme;
    use tessera_network::LogicNetwork;

    fn chain_layout() -> GateLayout {
        let mut n = LogicNetwork::new("chain");
        let a = n.create_pi("a");
        let g = n.create_not(a);
        let y = n.create_po(g, "y");
        let mut l = GateLayout::new(3, 1, 2, ClockingScheme::twoddwave_4(), Arc::new(n));
        l.assign_vertex(Tile::new(0, 0, 0), a, true, false);
        l.assign_vertex(Tile::new(1, 0, 0), g, false, false);
        l.assign_vertex(Tile::new(2, 0, 0), y, false, true);
        l.assign_tile_out_dir(Tile::new(0, 0, 0), Directions::E);
        l.assign_tile_inp_dir(Tile::new(1, 0, 0), Directions::W);
        l.assign_tile_out_dir(Tile::new(1, 0, 0), Directions::E);
        l.assign_tile_inp_dir(Tile::new(2, 0, 0), Directions::W);
        l
    }

    #[test]
    fn plain_dump_shows_glyphs_and_arrows() {
        let l = chain_layout();
        let dump = l.dump(false, false);
        assert!(dump.contains('I'));
        assert!(dump.contains('¬'));
        assert!(dump.contains('O'));
        assert!(dump.contains('→'));
        assert!(!dump.contains("\u{1b}["));
    }

    #[test]
    fn io_color_adds_escapes_and_legend() {
        let l = chain_layout();
        let dump = l.dump(true, false);
        assert!(dump.contains(INP_COLOR));
        assert!(dump.contains(OUT_COLOR));
        assert!(dump.contains("Legend"));
    }

    #[test]
    fn clock_color_covers_phases() {
        let l = chain_layout();
        let dump = l.dump(false, true);
        assert!(dump.contains(CLOCK_COLORS[0]));
        assert!(dump.contains("Legend"));
    }

    #[test]
    fn crossing_prints_as_plus() {
        let mut n = LogicNetwork::new("cross");
        let a = n.create_pi("a");
        let b = n.create_pi("b");
        let g = n.create_and(a, b);
        let e1 = n.get_edge(a, g).unwrap();
        let e2 = n.get_edge(b, g).unwrap();
        let mut l = GateLayout::new(2, 2, 2, ClockingScheme::twoddwave_4(), Arc::new(n));
        l.assign_edge(Tile::new(0, 0, 0), e1);
        l.assign_edge(Tile::new(0, 0, 1), e2);
        let dump = l.dump(false, false);
        assert!(dump.contains('+'));
    }

    #[test]
    fn free_tiles_print_as_boxes() {
        let n = Arc::new(LogicNetwork::new("empty"));
        let l = GateLayout::new(2, 2, 2, ClockingScheme::open_4(), n);
        let dump = l.dump(false, false);
        assert_eq!(dump.matches('▢').count(), 4);
    }
}
