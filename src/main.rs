use std::process::ExitCode;

fn main() -> ExitCode {
    match diagnova_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("diagnova: {e}");
            ExitCode::FAILURE
        }
    }
}
