//! Optional post-processing hook: the macro-enabling conversion step runs as
//! an external command after the workbook file is finalized. The hook fails
//! independently — a broken converter never fails the report run.

use std::path::Path;
use std::process::Command;

/// Run the configured hook command with `{path}` substituted for the
/// finished report. Whitespace-split template; no shell involved.
pub fn run_hook(command: Option<&str>, report: &Path) {
    let Some(template) = command else {
        return;
    };

    let report_str = report.display().to_string();
    let mut parts = template
        .split_whitespace()
        .map(|part| if part == "{path}" { report_str.clone() } else { part.to_string() });

    let Some(program) = parts.next() else {
        return;
    };
    let args: Vec<String> = parts.collect();

    match Command::new(&program).args(&args).output() {
        Ok(output) if output.status.success() => {
            eprintln!("postprocess: '{program}' completed");
        }
        Ok(output) => {
            eprintln!(
                "postprocess: '{program}' failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            );
        }
        Err(e) => {
            eprintln!("postprocess: cannot run '{program}': {e}");
        }
    }
}
