use std::process::ExitCode;

fn main() -> ExitCode {
    match better_commit::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
