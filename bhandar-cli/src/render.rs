//! Plain-text rendering of the rack.

use std::fmt::Write;

use bhandar::store::MaintenanceStatus;
use bhandar::{GridCell, OperationSequencer};

/// Draw the grid with one character per cell.
///
/// `T` trolley, `x` leg destination, `+` planned path, `o` origin,
/// `*` footprint in progress, `#` stored box, `.` free.
pub fn render_rack(seq: &OperationSequencer) -> String {
    let rack = seq.rack();
    let agent = seq.agent_position();
    let origin = seq.origin();
    let marked = seq.marked_cells();
    let path: Vec<GridCell> = seq.remaining_steps().collect();
    let goal = seq.current_goal();

    let mut out = String::new();
    let _ = write!(out, "    ");
    for col in 0..rack.cols() {
        let _ = write!(out, "{}", col % 10);
    }
    out.push('\n');

    for row in 0..rack.rows() {
        let _ = write!(out, "{:>3} ", row);
        for col in 0..rack.cols() {
            let cell = GridCell::new(row, col);
            let ch = if cell == agent {
                'T'
            } else if goal == Some(cell) {
                'x'
            } else if path.contains(&cell) {
                '+'
            } else if marked.contains(&cell) {
                '*'
            } else if rack.box_at(cell).is_some() {
                '#'
            } else if cell == origin {
                'o'
            } else {
                '.'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// One-paragraph summary of occupancy and maintenance.
pub fn render_summary(seq: &OperationSequencer, counters: Option<MaintenanceStatus>) -> String {
    let stats = seq.rack().stats();
    let mut out = format!(
        "Phase: {}  Trolley: {}\nBoxes: {}  Occupied: {}/{} ({:.1}%)",
        seq.phase().as_str(),
        seq.agent_position(),
        stats.boxes,
        stats.occupied_cells,
        stats.total_cells,
        stats.utilisation() * 100.0
    );
    if let Some(c) = counters {
        let _ = write!(
            out,
            "\nCycles today: {}  Total: {}  Until check: {}{}",
            c.cycles_today,
            c.cycles_total,
            c.cycles_until_check.max(0),
            if c.check_due() { "  (maintenance due)" } else { "" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhandar::{MemoryLedger, MemorySnapshots, Rack};

    fn sequencer(rows: usize, cols: usize) -> OperationSequencer {
        OperationSequencer::new(
            Rack::new(rows, cols),
            GridCell::new(rows - 1, 0),
            Box::new(MemoryLedger::default()),
            Box::new(MemorySnapshots::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_render_idle_rack() {
        let seq = sequencer(2, 3);
        assert_eq!(render_rack(&seq), "    012\n  0 ...\n  1 T..\n");
    }

    #[test]
    fn test_render_planned_path() {
        let mut seq = sequencer(1, 4);
        seq.request_move_to(GridCell::new(0, 3)).unwrap();
        assert_eq!(render_rack(&seq), "    0123\n  0 T++x\n");

        seq.tick().unwrap();
        assert_eq!(render_rack(&seq), "    0123\n  0 oT+x\n");
    }
}
