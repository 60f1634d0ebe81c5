//! Recovers a bare shell command from decorated model output.
//!
//! Models regularly wrap their answer in inline code or a fenced block even
//! when told not to. [`sanitize_command`] removes exactly one such layer.

const FENCE: &str = "```";
const LANGUAGE_TAGS: [&str; 2] = ["bash", "sh"];

/// Strips one layer of markdown code decoration from `raw`.
///
/// A triple-backtick fence is checked first (with an optional `bash`/`sh`
/// tag line), then a single pair of backticks. Anything else is returned
/// trimmed.
///
/// # Example
///
/// ```
/// use ia_shell::sanitizer::sanitize_command;
///
/// assert_eq!(sanitize_command("`ls -la`"), "ls -la");
/// assert_eq!(sanitize_command("```bash\ndate\n```"), "date");
/// assert_eq!(sanitize_command("  pwd \n"), "pwd");
/// ```
pub fn sanitize_command(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.len() >= 2 * FENCE.len() && trimmed.starts_with(FENCE) && trimmed.ends_with(FENCE) {
        let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
        return strip_language_tag(inner).trim().to_string();
    }

    if trimmed.len() >= 2 && trimmed.starts_with('`') && trimmed.ends_with('`') {
        return trimmed[1..trimmed.len() - 1].trim().to_string();
    }

    trimmed.to_string()
}

fn strip_language_tag(body: &str) -> &str {
    for tag in LANGUAGE_TAGS {
        if let Some(rest) = body.strip_prefix(tag) {
            if let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
                return rest;
            }
        }
    }
    body
}
