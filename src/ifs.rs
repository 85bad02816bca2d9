use crate::bounds::Bounds;
use crate::error::{FractalError, FractalResult};
use crate::limits::{CancelToken, Limits, Progress, check_cancel};
use crate::rng::RandomSource;

pub const DEFAULT_DENSITY: f64 = 50.0;
pub const DEFAULT_ITERATIONS: usize = 100_000;

/// One weighted map of the system. Affine maps read `a b c d e f`; radial
/// maps read `a b t e f` where `t` is a rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AffineRule {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub t: f64,
    pub p: f64,
}

impl AffineRule {
    pub const fn affine(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, p: f64) -> Self {
        Self { a, b, c, d, e, f, t: 0.0, p }
    }

    pub const fn radial(a: f64, b: f64, t: f64, e: f64, f: f64, p: f64) -> Self {
        Self { a, b, c: 0.0, d: 0.0, e, f, t, p }
    }

    fn coefficients(&self) -> [f64; 7] {
        [self.a, self.b, self.c, self.d, self.e, self.f, self.t]
    }
}

/// User-supplied equation: maps the running point through a rule.
pub type Equation = fn(f64, f64, &AffineRule) -> (f64, f64);

#[derive(Debug, Clone, Copy, Default)]
pub enum Transform {
    #[default]
    Affine,
    Radial,
    Custom(Equation),
}

impl Transform {
    pub fn apply(&self, x: f64, y: f64, rule: &AffineRule) -> (f64, f64) {
        match self {
            Self::Affine => affine(x, y, rule),
            Self::Radial => radial(x, y, rule),
            Self::Custom(eq) => eq(x, y, rule),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Affine => "affine",
            Self::Radial => "radial",
            Self::Custom(_) => "custom",
        }
    }
}

pub fn affine(x: f64, y: f64, m: &AffineRule) -> (f64, f64) {
    (x * m.a + y * m.b + m.e, x * m.c + y * m.d + m.f)
}

pub fn radial(x: f64, y: f64, m: &AffineRule) -> (f64, f64) {
    let (sin, cos) = m.t.sin_cos();
    (
        x * m.a * cos - y * m.b * sin + m.e,
        x * m.a * sin + y * m.b * cos + m.f,
    )
}

#[derive(Debug, Clone)]
pub struct IfsParams {
    pub rules: Vec<AffineRule>,
    pub density: f64,
    pub iterations: usize,
    pub transform: Transform,
}

impl IfsParams {
    pub fn new(rules: Vec<AffineRule>) -> Self {
        Self {
            rules,
            density: DEFAULT_DENSITY,
            iterations: DEFAULT_ITERATIONS,
            transform: Transform::Affine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfsPoint {
    pub x: f64,
    pub y: f64,
    /// Index of the rule that produced this point.
    pub matrix_num: usize,
}

/// Chaos-game generator over a fixed, weighted rule set.
#[derive(Debug)]
pub struct Ifs<R: RandomSource> {
    rules: Vec<AffineRule>,
    total_weight: f64,
    density: f64,
    iterations: usize,
    transform: Transform,
    rng: R,
    cursor: (f64, f64),
    points: Vec<IfsPoint>,
    bounds: Bounds,
}

impl<R: RandomSource> Ifs<R> {
    pub fn new(params: IfsParams, rng: R) -> FractalResult<Self> {
        Self::with_limits(params, rng, Limits::default())
    }

    pub fn with_limits(params: IfsParams, rng: R, limits: Limits) -> FractalResult<Self> {
        let IfsParams {
            rules,
            density,
            iterations,
            transform,
        } = params;

        if rules.is_empty() {
            return Err(FractalError::config("IFS needs at least one rule"));
        }
        for (idx, rule) in rules.iter().enumerate() {
            if rule.coefficients().iter().any(|v| !v.is_finite()) {
                return Err(FractalError::config(format!(
                    "rule #{idx} has a non-finite coefficient"
                )));
            }
            if !rule.p.is_finite() || rule.p < 0.0 {
                return Err(FractalError::config(format!(
                    "rule #{idx} weight must be finite and >= 0, got {}",
                    rule.p
                )));
            }
        }
        let total_weight: f64 = rules.iter().map(|r| r.p).sum();
        if total_weight <= 0.0 || !total_weight.is_finite() {
            return Err(FractalError::config(format!(
                "total rule weight must be > 0, got {total_weight}"
            )));
        }
        if !density.is_finite() {
            return Err(FractalError::config("density must be finite"));
        }
        limits.check_iterations(iterations as u64)?;

        tracing::debug!(
            rules = rules.len(),
            total_weight,
            density,
            iterations,
            transform = transform.name(),
            "ifs configured"
        );

        Ok(Self {
            rules,
            total_weight,
            density,
            iterations,
            transform,
            rng,
            cursor: (0.0, 0.0),
            points: Vec::new(),
            bounds: Bounds::empty(),
        })
    }

    pub fn rules(&self) -> &[AffineRule] {
        &self.rules
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn points(&self) -> &[IfsPoint] {
        &self.points
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn into_points(self) -> Vec<IfsPoint> {
        self.points
    }

    /// Weighted pick over the rules. Falls back to rule 0 when rounding
    /// leaves the draw unmatched after the full scan.
    pub fn select_rule(&mut self) -> usize {
        let mut r = self.rng.next_unit() * self.total_weight;
        for (idx, rule) in self.rules.iter().enumerate() {
            if r < rule.p {
                return idx;
            }
            r -= rule.p;
        }
        tracing::warn!(residual = r, "rule selection exhausted, using rule 0");
        0
    }

    /// Drops any previous output and rewinds to the origin. The random
    /// stream is not rewound.
    pub fn reset(&mut self) {
        self.cursor = (0.0, 0.0);
        self.points.clear();
        self.bounds = Bounds::empty();
    }

    pub fn run(&mut self) {
        self.run_with(|_, _| {});
    }

    pub fn run_with<F>(&mut self, mut on_point: F)
    where
        F: FnMut(&IfsPoint, usize),
    {
        self.reset();
        self.points.reserve(self.iterations);
        let remaining = self.iterations;
        self.step_many(remaining, &mut on_point);
        tracing::debug!(points = self.points.len(), bounds = ?self.bounds, "ifs run complete");
    }

    /// Runs at most `budget` iterations, checking `cancel` first.
    pub fn advance<F>(
        &mut self,
        budget: usize,
        cancel: Option<&CancelToken>,
        mut on_point: F,
    ) -> FractalResult<Progress>
    where
        F: FnMut(&IfsPoint, usize),
    {
        let done = self.points.len();
        if done >= self.iterations {
            return Ok(Progress::Done);
        }
        check_cancel(cancel, done)?;
        let steps = budget.min(self.iterations - done);
        self.step_many(steps, &mut on_point);
        Ok(Progress::from_counts(self.points.len(), self.iterations))
    }

    fn step_many<F>(&mut self, steps: usize, on_point: &mut F)
    where
        F: FnMut(&IfsPoint, usize),
    {
        for _ in 0..steps {
            let matrix_num = self.select_rule();
            let (x, y) = self
                .transform
                .apply(self.cursor.0, self.cursor.1, &self.rules[matrix_num]);
            self.cursor = (x, y);

            let point = IfsPoint {
                x: x * self.density,
                y: y * self.density,
                matrix_num,
            };
            self.bounds.include(point.x, point.y);
            let step = self.points.len();
            self.points.push(point);
            on_point(&point, step);
        }
    }
}
