use std::process::ExitCode;

use covidsim::runner::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(world) => match serde_json::to_string(&world.snapshot()) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("{error}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
