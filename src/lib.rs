pub mod app;
pub mod bounds;
pub mod config;
pub mod definition;
pub mod error;
pub mod export;
pub mod grammar;
pub mod ifs;
pub mod limits;
pub mod lsystem;
pub mod presets;
pub mod rng;
pub mod turtle;

pub use bounds::Bounds;
pub use error::{FractalError, FractalResult};
pub use grammar::RuleTable;
pub use ifs::{AffineRule, Ifs, IfsParams, IfsPoint, Transform};
pub use limits::{CancelToken, Limits, Progress};
pub use lsystem::{LSystem, LSystemParams, POSITION_TURN_MODULUS, TIME_TURN_MODULUS, Variant};
pub use rng::RandomSource;
pub use turtle::{Command, DistanceScope, GeometryPoint, Turtle, TurtleConfig, TurtleState};
