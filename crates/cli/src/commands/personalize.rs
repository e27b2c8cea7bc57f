use std::path::Path;

use skinsafe_core::config::LoadOptions;
use skinsafe_core::{ProductInput, RoutineSafetyEngine, UserProfile};

use crate::commands::{build_engine, read_input, CommandResult};

pub fn run(options: &LoadOptions, profile_path: &Path, product_path: &Path) -> CommandResult {
    let profile = match read_input::<UserProfile>("personalize", "profile", profile_path) {
        Ok(profile) => profile,
        Err(failure) => return failure,
    };
    let product = match read_input::<ProductInput>("personalize", "product", product_path) {
        Ok(product) => product,
        Err(failure) => return failure,
    };
    let engine = match build_engine("personalize", options) {
        Ok(engine) => engine,
        Err(failure) => return failure,
    };

    CommandResult::success("personalize", engine.personalize(&profile, &product))
}
