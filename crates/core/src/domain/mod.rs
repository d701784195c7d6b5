mod debate;
mod evidence;
mod issue;
mod simulation;

pub use debate::*;
pub use evidence::*;
pub use issue::*;
pub use simulation::*;
