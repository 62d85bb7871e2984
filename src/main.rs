//! goalplan CLI binary
//!
//! All logic is in the library; main.rs only invokes cli::run().

fn main() {
    // cli::run() prints its own errors; main only maps the exit code
    if let Err(code) = goalplan::cli::run() {
        std::process::exit(code.as_i32());
    }
}
