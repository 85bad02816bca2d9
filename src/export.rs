use std::io::{self, Write};

use crate::bounds::Bounds;
use crate::ifs::IfsPoint;
use crate::turtle::GeometryPoint;

pub fn write_ifs_csv<W: Write>(out: &mut W, points: &[IfsPoint]) -> io::Result<()> {
    writeln!(out, "x,y,matrix_num")?;
    for p in points {
        writeln!(out, "{},{},{}", p.x, p.y, p.matrix_num)?;
    }
    Ok(())
}

pub fn write_geometry_csv<W: Write>(out: &mut W, points: &[GeometryPoint]) -> io::Result<()> {
    writeln!(out, "x,y,depth,paintable")?;
    for p in points {
        writeln!(out, "{},{},{},{}", p.x, p.y, p.depth, p.paintable)?;
    }
    Ok(())
}

/// Points emitted per rule index.
pub fn matrix_histogram(points: &[IfsPoint], rule_count: usize) -> Vec<usize> {
    let mut counts = vec![0usize; rule_count];
    for p in points {
        if let Some(slot) = counts.get_mut(p.matrix_num) {
            *slot += 1;
        }
    }
    counts
}

pub fn write_ifs_summary<W: Write>(
    out: &mut W,
    points: &[IfsPoint],
    bounds: Bounds,
    rule_count: usize,
) -> io::Result<()> {
    writeln!(out, "points: {}", points.len())?;
    write_bounds(out, bounds)?;
    for (idx, n) in matrix_histogram(points, rule_count).iter().enumerate() {
        let share = if points.is_empty() { 0.0 } else { *n as f64 / points.len() as f64 };
        writeln!(out, "matrix {idx}: {n} ({:.2}%)", share * 100.0)?;
    }
    Ok(())
}

pub fn write_geometry_summary<W: Write>(
    out: &mut W,
    instructions: usize,
    points: &[GeometryPoint],
    bounds: Bounds,
) -> io::Result<()> {
    let paintable = points.iter().filter(|p| p.paintable).count();
    let max_depth = points.iter().map(|p| p.depth).max().unwrap_or(0);
    writeln!(out, "instructions: {instructions}")?;
    writeln!(out, "points: {} ({paintable} paintable)", points.len())?;
    writeln!(out, "max depth: {max_depth}")?;
    write_bounds(out, bounds)
}

fn write_bounds<W: Write>(out: &mut W, bounds: Bounds) -> io::Result<()> {
    if bounds.is_empty() {
        return writeln!(out, "bounds: empty");
    }
    writeln!(
        out,
        "bounds: x [{:.3}, {:.3}] y [{:.3}, {:.3}] ({:.3} x {:.3})",
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y,
        bounds.width(),
        bounds.height()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_csv_has_header_and_rows() {
        let pts = [
            GeometryPoint { x: 0.0, y: 0.0, depth: 0, paintable: false },
            GeometryPoint { x: 1.5, y: -2.0, depth: 1, paintable: true },
        ];
        let mut buf = Vec::new();
        write_geometry_csv(&mut buf, &pts).expect("write to vec");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "x,y,depth,paintable\n0,0,0,false\n1.5,-2,1,true\n");
    }

    #[test]
    fn histogram_counts_rule_indices() {
        let pts = [
            IfsPoint { x: 0.0, y: 0.0, matrix_num: 1 },
            IfsPoint { x: 0.0, y: 0.0, matrix_num: 1 },
            IfsPoint { x: 0.0, y: 0.0, matrix_num: 0 },
        ];
        assert_eq!(matrix_histogram(&pts, 3), vec![1, 2, 0]);
    }

    #[test]
    fn empty_bounds_summary() {
        let mut buf = Vec::new();
        write_ifs_summary(&mut buf, &[], Bounds::empty(), 1).expect("write to vec");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("bounds: empty"));
        assert!(text.contains("matrix 0: 0 (0.00%)"));
    }
}
