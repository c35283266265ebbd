//! Simulated host for the robot turn scheduler.
//!
//! Provides a toy two-team world, a metered capability handle per robot, a
//! demo strategy for every role, and a tick driver that resumes each live
//! robot once per round. Scenarios can inject illegal actions, runtime
//! faults, panics and compute overruns into chosen roles, so the
//! scheduler's failure boundary can be exercised end to end.
//!
//! # Example
//!
//! ```bash
//! # Run the built-in chaos scenario and print JSON metrics
//! cargo run -p robo_headless -- run --builtin chaos --json
//!
//! # Run a scenario file for 50 rounds
//! cargo run -p robo_headless -- run --scenario scenarios/skirmish.ron --rounds 50
//!
//! # Validate a scheduler config
//! cargo run -p robo_headless -- check-config scheduler.ron
//! ```

pub mod batch;
pub mod controller;
pub mod driver;
pub mod metrics;
pub mod scenario;
pub mod strategies;
pub mod world;

pub use batch::{run_sweep, BatchResults};
pub use controller::SimController;
pub use driver::HostDriver;
pub use metrics::{BatchSummary, MatchMetrics, RoleMetrics};
pub use scenario::{RobotPlacement, Scenario, ScenarioError};
pub use strategies::{demo_registry, SabotageMode, SabotageRule};
pub use world::SimWorld;
