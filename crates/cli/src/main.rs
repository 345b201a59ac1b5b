use std::process::ExitCode;

fn main() -> ExitCode {
    elogie_cli::run()
}
