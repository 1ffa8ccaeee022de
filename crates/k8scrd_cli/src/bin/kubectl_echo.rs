//! Stand-in for `kubectl` when trying the provider without a cluster.
//!
//! Reads the document from stdin and prints a JSON report with the command
//! line, the input, and its BLAKE3 digest. Exits with status 1 when no
//! input was given, like `kubectl apply` does.

use std::io::{self, Read};
use std::process::ExitCode;

use serde::Serialize;

#[derive(Serialize)]
struct Report {
    commandline: String,
    input: String,
    output: String,
}

fn main() -> ExitCode {
    let mut input = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut input) {
        eprintln!("error: reading standard input: {}", e);
        return ExitCode::from(1);
    }

    if input.iter().all(u8::is_ascii_whitespace) {
        eprintln!("error: no objects passed to apply");
        return ExitCode::from(1);
    }

    let report = Report {
        commandline: std::env::args().collect::<Vec<_>>().join(" "),
        input: String::from_utf8_lossy(&input).into_owned(),
        output: blake3::hash(&input).to_hex().to_string(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
