use std::path::Path;

use skinsafe_core::config::LoadOptions;
use skinsafe_core::{ProductInput, Routine, RoutineSafetyEngine};

use crate::commands::{build_engine, read_input, CommandResult};

pub fn run(options: &LoadOptions, routine_path: &Path, product_path: &Path) -> CommandResult {
    let routine = match read_input::<Routine>("check-addition", "routine", routine_path) {
        Ok(routine) => routine,
        Err(failure) => return failure,
    };
    let product = match read_input::<ProductInput>("check-addition", "product", product_path) {
        Ok(product) => product,
        Err(failure) => return failure,
    };
    let engine = match build_engine("check-addition", options) {
        Ok(engine) => engine,
        Err(failure) => return failure,
    };

    CommandResult::success("check-addition", engine.check_addition(&product, &routine))
}
