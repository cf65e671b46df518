//! Print the OpenAPI document as JSON.

use std::process::ExitCode;

use pointsboard::doc::ApiDoc;
use utoipa::OpenApi;

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command-line tool writes the document to stdout"
)]
fn main() -> ExitCode {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("failed to serialise OpenAPI document: {error}");
            ExitCode::FAILURE
        }
    }
}
