use once_cell::sync::OnceCell;
use regex::Regex;

static SPACE_RUNS: OnceCell<Regex> = OnceCell::new();

fn space_runs() -> &'static Regex {
    SPACE_RUNS.get_or_init(|| Regex::new(r"\s{2,}").expect("Invalid whitespace regex"))
}

/// Strip comments and whitespace noise from every raw source line.
///
/// The output has one entry per input line so diagnostics can keep using
/// 1-based source line numbers; lines that normalize to nothing stay as
/// empty strings.
pub fn normalize_lines<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|line| normalize_line(line.as_ref()))
        .collect()
}

fn normalize_line(line: &str) -> String {
    let line = match line.find(';') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let line = line.trim().replace('\t', " ");

    space_runs().replace_all(&line, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_noise() {
        let raw = [
            "  LD Rx, $0F ; load the mask",
            "\tJP\t\tloop",
            "   ; nothing but a comment",
            "RET",
        ];

        let cleaned = normalize_lines(&raw);

        assert_eq!(cleaned[0], "LD Rx, $0F");
        assert_eq!(cleaned[1], "JP loop");
        assert_eq!(cleaned[2], "");
        assert_eq!(cleaned[3], "RET");
    }

    #[test]
    fn keeps_line_count() {
        let raw = ["", "; gone", "CLS", ""];

        assert_eq!(normalize_lines(&raw).len(), raw.len());
    }
}
