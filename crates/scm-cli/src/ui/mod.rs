//! Plain-text terminal output helpers.

/// Uniform status-line printer for command output.
///
/// Errors go to stderr; everything else to stdout.
#[derive(Debug, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn info(&self, msg: &str) {
        println!("  {msg}");
    }

    pub fn success(&self, msg: &str) {
        println!("✓ {msg}");
    }

    pub fn warn(&self, msg: &str) {
        println!("! {msg}");
    }

    pub fn error(&self, msg: &str) {
        eprintln!("✗ {msg}");
    }

    /// Aligned `name  version  description` row for list output.
    pub fn row(&self, name: &str, version: &str, description: &str) {
        println!("  {name:<32} {version:<10} {description}");
    }
}
