use std::process::ExitCode;

fn main() -> ExitCode {
    skinsafe_cli::run()
}
