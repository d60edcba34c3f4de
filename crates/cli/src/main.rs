use std::process::ExitCode;

fn main() -> ExitCode {
    reach_cli::run()
}
