use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Numbered build-space line whose name carries the `_D` suffix of a
/// development build space.
static DEVELOPMENT_BUILD_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d+[ \t]+(\S+_D)[ \t]*\r?$").expect("build space pattern")
});

/// Names of the development build spaces listed in build-space tool output.
/// Other lines are ignored.
pub fn parse_build_spaces(output: &str) -> BTreeSet<String> {
    DEVELOPMENT_BUILD_SPACE
        .captures_iter(output)
        .map(|captures| captures[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_development_build_spaces() {
        let output = "12  DI0_Example_D\n7  DI0_Example1_D\ngarbage\n";

        let expected: BTreeSet<String> = ["DI0_Example_D", "DI0_Example1_D"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(parse_build_spaces(output), expected);
    }

    #[test]
    fn test_skips_other_build_space_kinds() {
        let output = "\
Build spaces on server:
1  DI0_Example_C
2  DI0_Example_D
3  DI0_Example_D trailing words
";

        let spaces = parse_build_spaces(output);
        assert_eq!(spaces.len(), 1);
        assert!(spaces.contains("DI0_Example_D"));
    }

    #[test]
    fn test_handles_windows_line_endings() {
        let spaces = parse_build_spaces("1  DI0_Example_D\r\n2  DI1_Other_D\r\n");

        assert_eq!(spaces.len(), 2);
    }
}
