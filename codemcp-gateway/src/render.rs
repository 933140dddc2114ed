//! Tool output rendering

use codemcp_common::ExecuteResponse;

/// Formats an execution result as the single text block handed back to
/// the caller: stdout first, an `Errors:` section when stderr is
/// non-empty, and a trailing `Exit code:` line when the code is non-zero.
/// The block is trimmed so interpreter newlines do not pad the output.
pub fn render_output(response: &ExecuteResponse) -> String {
    let mut output = response.stdout.clone();

    if !response.stderr.is_empty() {
        output.push_str("\n\nErrors:\n");
        output.push_str(&response.stderr);
    }

    if response.exit_code != 0 {
        output.push_str(&format!("\n\nExit code: {}", response.exit_code));
    }

    output.trim().to_string()
}
