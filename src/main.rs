use std::process::ExitCode;

use tiered_resistance::runner;

fn main() -> ExitCode {
    match runner::run() {
        Ok(model) => match serde_json::to_string_pretty(&model.final_state()) {
            Ok(final_state) => {
                println!("{final_state}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("error: {error}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
