//! Ludolph message markup
//!
//! Replies are written in the bot's lightweight markup and rendered by the
//! chat transport:
//! - `**bold**`
//! - `__italic__`
//! - `^^small^^`
//! - `[[color:red]]text[[/color]]`

/// Bold text
pub fn bold(text: impl std::fmt::Display) -> String {
    format!("**{}**", text)
}

/// Italic text
pub fn italic(text: impl std::fmt::Display) -> String {
    format!("__{}__", text)
}

/// Small text
pub fn small(text: impl std::fmt::Display) -> String {
    format!("^^{}^^", text)
}

/// Red text
pub fn red(text: impl std::fmt::Display) -> String {
    color("red", text)
}

/// Green text
pub fn green(text: impl std::fmt::Display) -> String {
    color("green", text)
}

fn color(name: &str, text: impl std::fmt::Display) -> String {
    format!("[[color:{}]]{}[[/color]]", name, text)
}

/// Render markup as plain text (console output, logs)
pub fn strip(text: &str) -> String {
    let mut out = text
        .replace("**", "")
        .replace("__", "")
        .replace("^^", "")
        .replace("[[/color]]", "");

    while let Some(start) = out.find("[[color:") {
        match out[start..].find("]]") {
            Some(end) => out.replace_range(start..start + end + 2, ""),
            None => break,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_wrappers() {
        assert_eq!(bold(42), "**42**");
        assert_eq!(italic("note"), "__note__");
        assert_eq!(small("age"), "^^age^^");
        assert_eq!(red("Z"), "[[color:red]]Z[[/color]]");
        assert_eq!(green("Z"), "[[color:green]]Z[[/color]]");
    }

    #[test]
    fn test_strip() {
        let text = format!("{}\t{} {}", bold("10"), red("Z"), small(italic("x")));
        assert_eq!(strip(&text), "10\tZ x");
    }

    #[test]
    fn test_strip_unterminated_color() {
        assert_eq!(strip("[[color:red"), "[[color:red");
    }
}
