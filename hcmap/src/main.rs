//! hcmap CLI - build the Tech and Ops headcount sheet
//!
//! ```bash
//! hcmap        # reads Raw Data/raw_input.xlsx + Raw Data/mapping.xlsx, writes Output/
//! ```
//!
//! Paths and sheet names come from `HCMAP_*` environment variables (or a
//! `.env` file) and default to the standard layout; see [`hcmap::config`].

use hcmap::logs::log_error;
use hcmap::{run, PipelineConfig, PipelineError, RunReport};

fn main() {
    match execute() {
        Ok(report) => {
            eprintln!("\n✨ Done!");
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Cannot render run report: {}", e),
            }
        }
        Err(e) => {
            log_error(format!("Aborted, no output written: {}", e));
            eprintln!("❌ Error [{}]: {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}

fn execute() -> Result<RunReport, PipelineError> {
    let config = PipelineConfig::from_env()?;
    run(&config)
}
