//! Formation templates: the block language, its probability expressions,
//! and the planner that turns a difficulty budget into timed spawn events.

pub mod expr;
pub mod parser;
pub mod planner;

pub use parser::{parse_definitions, ColorSpec, FormationTemplate, MemberSpec};
pub use planner::{FormationEvent, FormationPlanner, WavePlan};
