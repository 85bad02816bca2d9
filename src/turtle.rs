use std::f64::consts::PI;

use crate::bounds::Bounds;
use crate::error::{FractalError, FractalResult};
use crate::limits::{CancelToken, Progress, check_cancel};

const RAD_FACTOR: f64 = PI / 180.0;
/// Positions are kept to three decimals after every move.
const POSITION_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Forward,
    Backward,
    TurnRight,
    TurnLeft,
    Push,
    Pop,
    Shrink,
    Grow,
    Ignore,
}

impl Command {
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            'F' => Self::Forward,
            'B' => Self::Backward,
            '+' => Self::TurnRight,
            '-' => Self::TurnLeft,
            '[' => Self::Push,
            ']' => Self::Pop,
            '>' => Self::Shrink,
            '<' => Self::Grow,
            _ => Self::Ignore,
        }
    }
}

/// Whether `>`/`<` scaling survives a `]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceScope {
    /// Scaling persists across pops, so sibling branches inherit it.
    #[default]
    Legacy,
    /// Segment length is saved by `[` and restored by `]` like the heading.
    Scoped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleConfig {
    pub distance: f64,
    /// Turn step in degrees.
    pub angle: f64,
    pub length_scale: f64,
    pub turn_modulus: f64,
    pub track_depth: bool,
    pub distance_scope: DistanceScope,
}

impl TurtleConfig {
    pub fn validate(&self) -> FractalResult<()> {
        for (name, v) in [
            ("distance", self.distance),
            ("angle", self.angle),
            ("length_scale", self.length_scale),
        ] {
            if !v.is_finite() {
                return Err(FractalError::config(format!("{name} must be finite, got {v}")));
            }
        }
        if self.length_scale == 0.0 {
            return Err(FractalError::config("length_scale must be non-zero"));
        }
        if !self.turn_modulus.is_finite() || self.turn_modulus <= 0.0 {
            return Err(FractalError::config(format!(
                "turn modulus must be > 0, got {}",
                self.turn_modulus
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurtleState {
    pub x: f64,
    pub y: f64,
    /// Degrees.
    pub heading: f64,
    pub depth: u32,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPoint {
    pub x: f64,
    pub y: f64,
    pub depth: u32,
    /// False for the origin seed and for every stack-restore point.
    pub paintable: bool,
}

/// Interprets an instruction string as turtle commands.
#[derive(Debug, Clone)]
pub struct Turtle {
    config: TurtleConfig,
    program: Vec<Command>,
    pc: usize,
    state: TurtleState,
    stack: Vec<TurtleState>,
    points: Vec<GeometryPoint>,
    bounds: Bounds,
}

impl Turtle {
    pub fn new(config: TurtleConfig, instructions: &str) -> FractalResult<Self> {
        config.validate()?;
        let program = instructions.chars().map(Command::from_symbol).collect();
        let mut turtle = Self {
            config,
            program,
            pc: 0,
            state: initial_state(&config),
            stack: Vec::new(),
            points: Vec::new(),
            bounds: Bounds::empty(),
        };
        turtle.reset();
        Ok(turtle)
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn program_len(&self) -> usize {
        self.program.len()
    }

    pub fn points(&self) -> &[GeometryPoint] {
        &self.points
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn into_points(self) -> Vec<GeometryPoint> {
        self.points
    }

    /// Back to the origin with an empty stack and the configured distance.
    /// The output is reseeded with the non-paintable origin.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.state = initial_state(&self.config);
        self.stack.clear();
        self.points.clear();
        self.bounds = Bounds::empty();
        self.points.push(GeometryPoint {
            x: 0.0,
            y: 0.0,
            depth: 0,
            paintable: false,
        });
        self.bounds.include(0.0, 0.0);
    }

    pub fn run(&mut self) -> FractalResult<()> {
        self.run_with(|_, _| {})
    }

    pub fn run_with<F>(&mut self, on_point: F) -> FractalResult<()>
    where
        F: FnMut(&GeometryPoint, usize),
    {
        self.reset();
        self.advance(usize::MAX, None, on_point)?;
        tracing::debug!(
            symbols = self.program.len(),
            points = self.points.len(),
            bounds = ?self.bounds,
            "turtle run complete"
        );
        Ok(())
    }

    /// Executes at most `budget` symbols, checking `cancel` first. On a
    /// stack underflow the cursor stays on the offending `]`.
    pub fn advance<F>(
        &mut self,
        budget: usize,
        cancel: Option<&CancelToken>,
        mut on_point: F,
    ) -> FractalResult<Progress>
    where
        F: FnMut(&GeometryPoint, usize),
    {
        let total = self.program.len();
        if self.pc >= total {
            return Ok(Progress::Done);
        }
        check_cancel(cancel, self.pc)?;

        let end = self.pc.saturating_add(budget).min(total);
        while self.pc < end {
            let position = self.pc;
            if let Some(point) = self.execute(self.program[position], position)? {
                on_point(&point, position);
            }
            self.pc += 1;
        }
        Ok(Progress::from_counts(self.pc, total))
    }

    /// Applies one command, returning the point it emitted, if any.
    pub fn execute(&mut self, cmd: Command, position: usize) -> FractalResult<Option<GeometryPoint>> {
        let point = match cmd {
            Command::Forward => Some(self.advance_by(-self.state.distance)),
            Command::Backward => Some(self.advance_by(self.state.distance)),
            Command::TurnRight => {
                self.state.heading = (self.state.heading - self.config.angle) % self.config.turn_modulus;
                None
            }
            Command::TurnLeft => {
                self.state.heading = (self.state.heading + self.config.angle) % self.config.turn_modulus;
                None
            }
            Command::Push => {
                if self.config.track_depth {
                    self.state.depth += 1;
                }
                self.stack.push(self.state);
                None
            }
            Command::Pop => Some(self.restore(position)?),
            Command::Shrink => {
                self.state.distance *= self.config.length_scale;
                None
            }
            Command::Grow => {
                self.state.distance /= self.config.length_scale;
                None
            }
            Command::Ignore => None,
        };
        Ok(point)
    }

    fn advance_by(&mut self, signed_distance: f64) -> GeometryPoint {
        let (sin, cos) = (self.state.heading * RAD_FACTOR).sin_cos();
        self.state.x = round_position(self.state.x + sin * signed_distance);
        self.state.y = round_position(self.state.y + cos * signed_distance);
        self.emit(true)
    }

    fn restore(&mut self, position: usize) -> FractalResult<GeometryPoint> {
        let saved = self
            .stack
            .pop()
            .ok_or(FractalError::StackUnderflow { position })?;
        let distance = self.state.distance;
        self.state = saved;
        if self.config.distance_scope == DistanceScope::Legacy {
            self.state.distance = distance;
        }
        Ok(self.emit(false))
    }

    fn emit(&mut self, paintable: bool) -> GeometryPoint {
        let point = GeometryPoint {
            x: self.state.x,
            y: self.state.y,
            depth: self.state.depth,
            paintable,
        };
        self.bounds.include(point.x, point.y);
        self.points.push(point);
        point
    }
}

fn initial_state(config: &TurtleConfig) -> TurtleState {
    TurtleState {
        x: 0.0,
        y: 0.0,
        heading: 0.0,
        depth: 0,
        distance: config.distance,
    }
}

// Half-way values round toward +inf.
fn round_position(v: f64) -> f64 {
    (v * POSITION_SCALE + 0.5).floor() / POSITION_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(modulus: f64, track_depth: bool) -> TurtleConfig {
        TurtleConfig {
            distance: 10.0,
            angle: 90.0,
            length_scale: 0.5,
            turn_modulus: modulus,
            track_depth,
            distance_scope: DistanceScope::Legacy,
        }
    }

    fn run(cfg: TurtleConfig, program: &str) -> Turtle {
        let mut turtle = Turtle::new(cfg, program).expect("valid config");
        turtle.run().expect("balanced program");
        turtle
    }

    #[test]
    fn symbol_dispatch() {
        let cmds: Vec<Command> = "FB+-[]><X".chars().map(Command::from_symbol).collect();
        assert_eq!(
            cmds,
            vec![
                Command::Forward,
                Command::Backward,
                Command::TurnRight,
                Command::TurnLeft,
                Command::Push,
                Command::Pop,
                Command::Shrink,
                Command::Grow,
                Command::Ignore,
            ]
        );
    }

    #[test]
    fn forward_moves_toward_negative_y_at_heading_zero() {
        let t = run(config(360.0, false), "FB");
        let pts = t.points();
        assert_eq!(pts.len(), 3);
        assert!(!pts[0].paintable);
        assert_eq!((pts[1].x, pts[1].y, pts[1].paintable), (0.0, -10.0, true));
        assert_eq!((pts[2].x, pts[2].y), (0.0, 0.0));
    }

    #[test]
    fn left_turn_then_forward_moves_negative_x() {
        let t = run(config(360.0, false), "-F");
        let p = t.points()[1];
        assert_eq!((p.x, p.y), (-10.0, 0.0));
    }

    #[test]
    fn positions_are_rounded_to_three_decimals() {
        let mut cfg = config(360.0, false);
        cfg.angle = 30.0;
        let t = run(cfg, "-F");
        // -sin(30deg) * 10 and -cos(30deg) * 10
        let p = t.points()[1];
        assert_eq!(p.x, -5.0);
        assert_eq!(p.y, -8.66);
        assert_eq!(round_position(-0.0005), 0.0);
        assert_eq!(round_position(0.0005), 0.001);
    }

    #[test]
    fn pop_restores_position_and_emits_unpaintable_point() {
        let t = run(config(360.0, false), "[F]F");
        let pts = t.points();
        assert_eq!(pts.len(), 4);
        assert_eq!((pts[2].x, pts[2].y, pts[2].paintable), (0.0, 0.0, false));
        assert!(pts[3].paintable);
        assert_eq!(t.stack_depth(), 0);
    }

    #[test]
    fn empty_stack_pop_is_an_error() {
        let mut turtle = Turtle::new(config(360.0, false), "F]F").expect("valid config");
        let err = turtle.run().expect_err("unbalanced");
        assert_eq!(err, FractalError::StackUnderflow { position: 1 });
        assert_eq!(turtle.points().len(), 2);
    }

    #[test]
    fn depth_increments_before_push_and_is_restored_on_pop() {
        let t = run(config(90.0, true), "[F[F]]F");
        let depths: Vec<u32> = t.points().iter().map(|p| p.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1, 1]);
    }

    #[test]
    fn position_only_turtle_keeps_depth_zero() {
        let t = run(config(360.0, false), "[F[F]]F");
        assert!(t.points().iter().all(|p| p.depth == 0));
    }

    #[test]
    fn legacy_distance_survives_pop() {
        let t = run(config(360.0, false), "[>F]F");
        assert_eq!(t.points().last().map(|p| p.y), Some(-5.0));
    }

    #[test]
    fn scoped_distance_is_restored_on_pop() {
        let mut cfg = config(360.0, false);
        cfg.distance_scope = DistanceScope::Scoped;
        let t = run(cfg, "[>F]F");
        assert_eq!(t.points().last().map(|p| p.y), Some(-10.0));
    }

    #[test]
    fn grow_divides_by_length_scale() {
        let t = run(config(360.0, false), "<F");
        assert_eq!(t.points()[1].y, -20.0);
    }

    #[test]
    fn callback_sees_symbol_positions() {
        let mut turtle = Turtle::new(config(360.0, false), "X+F[F]").expect("valid config");
        let mut seen = Vec::new();
        turtle
            .run_with(|p, i| seen.push((i, p.paintable)))
            .expect("balanced");
        assert_eq!(seen, vec![(2, true), (4, true), (5, false)]);
    }

    #[test]
    fn rerun_resets_state() {
        let mut turtle = Turtle::new(config(360.0, false), ">F+F").expect("valid config");
        turtle.run().expect("first run");
        let first = turtle.points().to_vec();
        turtle.run().expect("second run");
        assert_eq!(turtle.points(), first.as_slice());
    }

    #[test]
    fn rejects_zero_length_scale() {
        let mut cfg = config(360.0, false);
        cfg.length_scale = 0.0;
        assert!(matches!(
            Turtle::new(cfg, "F"),
            Err(FractalError::Configuration { .. })
        ));
    }
}
