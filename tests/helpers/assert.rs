use std::path::Path;

use snapbox::{Assert, Substitutions};

/// Assert that replaces the report's output directory with `[OUTPUT]`.
pub fn assert(output_dir: &Path) -> Assert {
    let mut substitutions = Substitutions::default();
    substitutions
        .insert("[OUTPUT]", output_dir.display().to_string())
        .unwrap();
    Assert::new().substitutions(substitutions)
}
