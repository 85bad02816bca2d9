use crate::bounds::Bounds;
use crate::error::FractalResult;
use crate::grammar::{self, RuleTable};
use crate::limits::{CancelToken, Limits, Progress};
use crate::turtle::{DistanceScope, GeometryPoint, Turtle, TurtleConfig};

/// Heading modulus of the position-only system, in degrees.
pub const POSITION_TURN_MODULUS: f64 = 360.0;
/// Heading modulus of the depth-tracking system. Narrower than a full turn,
/// which folds every branch into one quadrant.
pub const TIME_TURN_MODULUS: f64 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LSystemParams {
    pub axiom: String,
    pub rules: RuleTable,
    pub iterations: usize,
    pub distance: f64,
    pub angle: f64,
    pub length_scale: f64,
    pub distance_scope: DistanceScope,
}

impl LSystemParams {
    pub fn new(axiom: impl Into<String>, rules: RuleTable, iterations: usize, distance: f64, angle: f64) -> Self {
        Self {
            axiom: axiom.into(),
            rules,
            iterations,
            distance,
            angle,
            length_scale: 1.0,
            distance_scope: DistanceScope::Legacy,
        }
    }

    pub fn with_length_scale(mut self, length_scale: f64) -> Self {
        self.length_scale = length_scale;
        self
    }

    pub fn with_distance_scope(mut self, scope: DistanceScope) -> Self {
        self.distance_scope = scope;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Position only; every point reports depth 0.
    Position,
    /// Points also carry the branch depth, incremented on `[`.
    Time,
}

impl Variant {
    pub fn turn_modulus(self) -> f64 {
        match self {
            Self::Position => POSITION_TURN_MODULUS,
            Self::Time => TIME_TURN_MODULUS,
        }
    }

    pub fn tracks_depth(self) -> bool {
        matches!(self, Self::Time)
    }
}

/// Grammar expansion plus turtle execution behind one `run`.
#[derive(Debug, Clone)]
pub struct LSystem {
    variant: Variant,
    instructions: String,
    turtle: Turtle,
}

impl LSystem {
    pub fn position(params: &LSystemParams) -> FractalResult<Self> {
        Self::with_limits(Variant::Position, params, &Limits::default())
    }

    pub fn time(params: &LSystemParams) -> FractalResult<Self> {
        Self::with_limits(Variant::Time, params, &Limits::default())
    }

    /// Expands the grammar up front, so oversized grammars fail here.
    pub fn with_limits(variant: Variant, params: &LSystemParams, limits: &Limits) -> FractalResult<Self> {
        let config = TurtleConfig {
            distance: params.distance,
            angle: params.angle,
            length_scale: params.length_scale,
            turn_modulus: variant.turn_modulus(),
            track_depth: variant.tracks_depth(),
            distance_scope: params.distance_scope,
        };
        config.validate()?;
        let instructions = grammar::expand(&params.axiom, &params.rules, params.iterations, limits)?;
        let turtle = Turtle::new(config, &instructions)?;
        tracing::debug!(
            ?variant,
            axiom = %params.axiom,
            iterations = params.iterations,
            symbols = turtle.program_len(),
            "l-system configured"
        );
        Ok(Self {
            variant,
            instructions,
            turtle,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn points(&self) -> &[GeometryPoint] {
        self.turtle.points()
    }

    pub fn bounds(&self) -> Bounds {
        self.turtle.bounds()
    }

    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    pub fn into_points(self) -> Vec<GeometryPoint> {
        self.turtle.into_points()
    }

    pub fn run(&mut self) -> FractalResult<()> {
        self.turtle.run()
    }

    pub fn run_with<F>(&mut self, on_point: F) -> FractalResult<()>
    where
        F: FnMut(&GeometryPoint, usize),
    {
        self.turtle.run_with(on_point)
    }

    pub fn advance<F>(
        &mut self,
        budget: usize,
        cancel: Option<&CancelToken>,
        on_point: F,
    ) -> FractalResult<Progress>
    where
        F: FnMut(&GeometryPoint, usize),
    {
        self.turtle.advance(budget, cancel, on_point)
    }

    pub fn reset(&mut self) {
        self.turtle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FractalError;

    fn pythagorean() -> LSystemParams {
        LSystemParams::new("FX", [('X', ">[-FX]+FX<")].into_iter().collect(), 10, 100.0, 50.0)
            .with_length_scale(0.7)
    }

    #[test]
    fn variants_use_distinct_moduli() {
        let params = LSystemParams::new("-----", RuleTable::new(), 0, 1.0, 50.0);
        let mut plain = LSystem::position(&params).expect("valid");
        let mut time = LSystem::time(&params).expect("valid");
        plain.run().expect("run");
        time.run().expect("run");
        assert_eq!(plain.turtle().state().heading, 250.0 % 360.0);
        assert_eq!(time.turtle().state().heading, 250.0 % 90.0);
        assert_eq!(time.turtle().config().turn_modulus, TIME_TURN_MODULUS);
    }

    #[test]
    fn pythagorean_tree_stays_in_bounds() {
        let mut tree = LSystem::time(&pythagorean()).expect("valid");
        tree.run().expect("balanced grammar");
        let bounds = tree.bounds();
        assert!(tree.points().len() > 1);
        for p in tree.points().iter().filter(|p| p.paintable) {
            assert!(bounds.contains(p.x, p.y), "{p:?} outside {bounds:?}");
        }
    }

    #[test]
    fn expansion_errors_surface_at_construction() {
        let limits = Limits {
            max_instructions: 100,
            ..Limits::default()
        };
        let err = LSystem::with_limits(Variant::Position, &pythagorean(), &limits).expect_err("too long");
        assert!(matches!(err, FractalError::ResourceExceeded { .. }));
    }

    #[test]
    fn unbalanced_grammar_fails_on_first_bad_pop() {
        let params = LSystemParams::new("F]", RuleTable::new(), 0, 1.0, 10.0);
        let mut sys = LSystem::position(&params).expect("constructs");
        assert_eq!(sys.run(), Err(FractalError::StackUnderflow { position: 1 }));
    }

    #[test]
    fn instructions_are_exposed() {
        let params = LSystemParams::new("FX", [('X', "+FX")].into_iter().collect(), 2, 1.0, 10.0);
        let sys = LSystem::position(&params).expect("valid");
        assert_eq!(sys.instructions(), "F+F+FX");
    }
}
