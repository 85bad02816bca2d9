use crate::error::{FractalError, FractalResult};
use crate::grammar::RuleTable;
use crate::ifs::{AffineRule, IfsParams, Transform};
use crate::lsystem::LSystemParams;

#[derive(Debug, Clone)]
pub struct IfsPreset {
    pub name: &'static str,
    pub params: IfsParams,
}

#[derive(Debug, Clone)]
pub struct LSystemPreset {
    pub name: &'static str,
    pub params: LSystemParams,
}

pub fn ifs_presets() -> Vec<IfsPreset> {
    vec![
        IfsPreset {
            name: "Barnsley Fern",
            params: IfsParams::new(vec![
                AffineRule::affine(0.0, 0.0, 0.0, 0.16, 0.0, 0.0, 0.01),
                AffineRule::affine(0.85, 0.04, -0.04, 0.85, 0.0, 1.6, 0.85),
                AffineRule::affine(0.2, -0.26, 0.23, 0.22, 0.0, 1.6, 0.07),
                AffineRule::affine(-0.15, 0.28, 0.26, 0.24, 0.0, 0.44, 0.07),
            ]),
        },
        IfsPreset {
            name: "Sierpinski Triangle",
            params: IfsParams::new(vec![
                AffineRule::affine(0.5, 0.0, 0.0, 0.5, 0.0, 0.0, 1.0),
                AffineRule::affine(0.5, 0.0, 0.0, 0.5, 0.5, 0.0, 1.0),
                AffineRule::affine(0.5, 0.0, 0.0, 0.5, 0.25, 0.5, 1.0),
            ]),
        },
        IfsPreset {
            name: "Radial Spiral",
            params: IfsParams {
                transform: Transform::Radial,
                ..IfsParams::new(vec![
                    AffineRule::radial(0.92, 0.92, 0.35, 0.0, 0.0, 0.9),
                    AffineRule::radial(0.3, 0.3, 0.0, 1.0, 0.0, 0.1),
                ])
            },
        },
    ]
}

pub fn lsystem_presets() -> Vec<LSystemPreset> {
    vec![
        LSystemPreset {
            name: "Pythagorean Tree",
            params: LSystemParams::new("FX", rules(&[('X', ">[-FX]+FX<")]), 10, 100.0, 50.0)
                .with_length_scale(0.7),
        },
        LSystemPreset {
            name: "L Tree",
            params: LSystemParams::new(
                "X",
                rules(&[('F', "FF"), ('X', "F+[[X]-X]-F[-FX]+X")]),
                6,
                6.0,
                22.5,
            ),
        },
        LSystemPreset {
            name: "L Tree 2",
            params: LSystemParams::new("F", rules(&[('F', ">FF+[+F-F-F]-[-F+F+F]<")]), 5, 20.0, 22.5)
                .with_length_scale(0.7),
        },
    ]
}

fn rules(entries: &[(char, &str)]) -> RuleTable {
    entries.iter().copied().collect()
}

/// Index, exact name, or name substring (case-insensitive). `None` picks the first.
pub fn resolve(selection: Option<&str>, names: &[&str]) -> FractalResult<usize> {
    if names.is_empty() {
        return Err(FractalError::config("no presets available"));
    }
    let Some(raw) = selection else {
        return Ok(0);
    };

    if let Ok(idx) = raw.trim().parse::<usize>() {
        if idx < names.len() {
            return Ok(idx);
        }
        return Err(FractalError::config(format!(
            "preset index {idx} out of range (0..{})",
            names.len() - 1
        )));
    }

    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Ok(0);
    }
    if let Some(idx) = names.iter().position(|n| n.to_ascii_lowercase() == needle) {
        return Ok(idx);
    }
    if let Some(idx) = names
        .iter()
        .position(|n| n.to_ascii_lowercase().contains(&needle))
    {
        return Ok(idx);
    }
    Err(FractalError::config(format!("preset '{raw}' not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_index_and_name() {
        let names = ["L Tree", "L Tree 2", "Pythagorean Tree"];
        assert_eq!(resolve(None, &names).expect("default"), 0);
        assert_eq!(resolve(Some("2"), &names).expect("index"), 2);
        assert_eq!(resolve(Some("l tree 2"), &names).expect("exact"), 1);
        assert_eq!(resolve(Some("pyth"), &names).expect("substring"), 2);
        assert!(resolve(Some("3"), &names).is_err());
        assert!(resolve(Some("koch"), &names).is_err());
    }

    #[test]
    fn exact_name_wins_over_earlier_substring() {
        let names = ["L Tree 2", "L Tree"];
        assert_eq!(resolve(Some("L Tree"), &names).expect("exact"), 1);
    }
}
