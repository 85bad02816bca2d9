use std::path::Path;

use crate::error::{FractalError, FractalResult};
use crate::grammar::RuleTable;
use crate::ifs::{AffineRule, IfsParams, Transform};
use crate::lsystem::LSystemParams;
use crate::turtle::DistanceScope;

/// A generator described in a `key value` text file.
#[derive(Debug, Clone)]
pub enum Definition {
    LSystem(LSystemParams),
    Ifs(IfsParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    LSystem,
    Ifs,
}

#[derive(Default)]
struct Fields {
    kind: Option<Kind>,
    axiom: Option<String>,
    rules: RuleTable,
    iterations: Option<usize>,
    distance: Option<f64>,
    angle: Option<f64>,
    length_scale: Option<f64>,
    distance_scope: Option<DistanceScope>,
    transform: Option<Transform>,
    density: Option<f64>,
    matrices: Vec<(usize, Vec<f64>)>,
}

impl Definition {
    pub fn parse(text: &str) -> FractalResult<Self> {
        let mut fields = Fields::default();

        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (key, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((k, r)) => (k, r.trim()),
                None => (trimmed, ""),
            };

            match key {
                "kind" => {
                    fields.kind = Some(match rest {
                        "lsystem" | "l-system" => Kind::LSystem,
                        "ifs" => Kind::Ifs,
                        _ => {
                            return Err(FractalError::definition(
                                line_no,
                                format!("unknown kind '{rest}' (expected lsystem or ifs)"),
                            ));
                        }
                    });
                }
                "axiom" => {
                    if rest.is_empty() {
                        return Err(FractalError::definition(line_no, "axiom must not be empty"));
                    }
                    fields.axiom = Some(rest.to_string());
                }
                "rule" => {
                    let (symbol, replacement) = parse_rule(rest, line_no)?;
                    if fields.rules.insert(symbol, replacement).is_some() {
                        return Err(FractalError::definition(
                            line_no,
                            format!("duplicate rule for '{symbol}'"),
                        ));
                    }
                }
                "iterations" => {
                    fields.iterations = Some(rest.parse::<usize>().map_err(|_| {
                        FractalError::definition(line_no, "iterations must be a non-negative integer")
                    })?);
                }
                "distance" => fields.distance = Some(parse_f64(rest, line_no, "distance")?),
                "angle" => fields.angle = Some(parse_f64(rest, line_no, "angle")?),
                "length_scale" => fields.length_scale = Some(parse_f64(rest, line_no, "length_scale")?),
                "density" => fields.density = Some(parse_f64(rest, line_no, "density")?),
                "distance_scope" => {
                    fields.distance_scope = Some(match rest {
                        "legacy" => DistanceScope::Legacy,
                        "scoped" => DistanceScope::Scoped,
                        _ => {
                            return Err(FractalError::definition(
                                line_no,
                                "distance_scope must be legacy or scoped",
                            ));
                        }
                    });
                }
                "transform" => {
                    fields.transform = Some(match rest {
                        "affine" => Transform::Affine,
                        "radial" => Transform::Radial,
                        _ => {
                            return Err(FractalError::definition(
                                line_no,
                                "transform must be affine or radial",
                            ));
                        }
                    });
                }
                "matrix" => {
                    let values = rest
                        .split_whitespace()
                        .map(|tok| parse_f64(tok, line_no, "matrix"))
                        .collect::<FractalResult<Vec<_>>>()?;
                    fields.matrices.push((line_no, values));
                }
                _ => {
                    return Err(FractalError::definition(
                        line_no,
                        format!("unknown key '{key}'"),
                    ));
                }
            }
        }

        match fields.kind {
            Some(Kind::LSystem) => fields.into_lsystem().map(Self::LSystem),
            Some(Kind::Ifs) => fields.into_ifs().map(Self::Ifs),
            None => Err(FractalError::config("missing required field: kind")),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> FractalResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| FractalError::Io(e.to_string()))?;
        Self::parse(&text)
    }
}

impl Fields {
    fn into_lsystem(self) -> FractalResult<LSystemParams> {
        let axiom = self.axiom.ok_or_else(|| missing("axiom"))?;
        let iterations = self.iterations.ok_or_else(|| missing("iterations"))?;
        let distance = self.distance.ok_or_else(|| missing("distance"))?;
        let angle = self.angle.ok_or_else(|| missing("angle"))?;
        Ok(LSystemParams::new(axiom, self.rules, iterations, distance, angle)
            .with_length_scale(self.length_scale.unwrap_or(1.0))
            .with_distance_scope(self.distance_scope.unwrap_or_default()))
    }

    fn into_ifs(self) -> FractalResult<IfsParams> {
        let transform = self.transform.unwrap_or_default();
        let mut rules = Vec::with_capacity(self.matrices.len());
        for (line, v) in self.matrices {
            let rule = match (transform, v.as_slice()) {
                (Transform::Radial, &[a, b, t, e, f, p]) => AffineRule::radial(a, b, t, e, f, p),
                (Transform::Radial, _) => {
                    return Err(FractalError::definition(line, "radial matrix expects: a b t e f p"));
                }
                (_, &[a, b, c, d, e, f, p]) => AffineRule::affine(a, b, c, d, e, f, p),
                _ => {
                    return Err(FractalError::definition(line, "affine matrix expects: a b c d e f p"));
                }
            };
            rules.push(rule);
        }
        if rules.is_empty() {
            return Err(missing("matrix"));
        }

        let mut params = IfsParams::new(rules);
        params.transform = transform;
        if let Some(density) = self.density {
            params.density = density;
        }
        if let Some(iterations) = self.iterations {
            params.iterations = iterations;
        }
        Ok(params)
    }
}

fn missing(field: &str) -> FractalError {
    FractalError::config(format!("missing required field: {field}"))
}

fn parse_rule(rest: &str, line: usize) -> FractalResult<(char, String)> {
    let (lhs, rhs) = match rest.split_once(char::is_whitespace) {
        Some((l, r)) => (l, r.trim()),
        None => (rest, ""),
    };
    let mut chars = lhs.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok((symbol, rhs.to_string())),
        _ => Err(FractalError::definition(
            line,
            "rule expects: rule <symbol> <replacement>",
        )),
    }
}

fn parse_f64(raw: &str, line: usize, field: &str) -> FractalResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FractalError::definition(
            line,
            format!("{field} expects a finite number, got '{raw}'"),
        )),
    }
}
