//! Local file names for downloaded artifacts.

/// Suffix appended to the sanitized package name.
pub const ARTIFACT_SUFFIX: &str = "_installer";

const NAME_MAX: usize = 255;

/// File name an artifact for `package_name` is stored under, or None when
/// nothing usable survives sanitization.
pub fn artifact_file_name(package_name: &str) -> Option<String> {
    let stem = sanitize_package_name(package_name);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}{}", stem, ARTIFACT_SUFFIX))
}

/// Reduces a package name to a single safe path component.
///
/// - Keeps ASCII alphanumerics, `.`, `-`, `+`; everything else becomes `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores, so `..` and hidden names vanish
/// - Limits length so the suffixed name fits Linux NAME_MAX
pub fn sanitize_package_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let keep = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+';
        if keep {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let max = NAME_MAX - ARTIFACT_SUFFIX.len();
    // Output is ASCII, so any byte index is a char boundary.
    trimmed[..trimmed.len().min(max)].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(
            artifact_file_name("Mozilla.Firefox-esr").as_deref(),
            Some("Mozilla.Firefox-esr_installer")
        );
    }

    #[test]
    fn path_separators_cannot_escape() {
        assert_eq!(sanitize_package_name("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_package_name("a\\b/c"), "a_b_c");
        assert_eq!(sanitize_package_name("/abs"), "abs");
    }

    #[test]
    fn collapses_and_trims() {
        assert_eq!(sanitize_package_name("  my   tool  "), "my_tool");
        assert_eq!(sanitize_package_name(".hidden."), "hidden");
        assert_eq!(sanitize_package_name("name\x00\x07x"), "name_x");
        assert_eq!(sanitize_package_name("caf\u{e9}"), "caf");
    }

    #[test]
    fn unusable_names_are_rejected() {
        assert!(artifact_file_name("..").is_none());
        assert!(artifact_file_name("///").is_none());
        assert!(artifact_file_name("").is_none());
    }

    #[test]
    fn long_names_fit_name_max() {
        let name = artifact_file_name(&"x".repeat(1000)).unwrap();
        assert_eq!(name.len(), NAME_MAX);
        assert!(name.ends_with(ARTIFACT_SUFFIX));
    }
}
