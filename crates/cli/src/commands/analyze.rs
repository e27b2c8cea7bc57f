use std::path::Path;

use skinsafe_core::config::LoadOptions;
use skinsafe_core::{Routine, RoutineSafetyEngine};

use crate::commands::{build_engine, read_input, CommandResult};

pub fn run(options: &LoadOptions, routine_path: &Path) -> CommandResult {
    let routine = match read_input::<Routine>("analyze", "routine", routine_path) {
        Ok(routine) => routine,
        Err(failure) => return failure,
    };
    let engine = match build_engine("analyze", options) {
        Ok(engine) => engine,
        Err(failure) => return failure,
    };

    CommandResult::success("analyze", engine.analyze(&routine))
}
