use crate::models::{DiffKind, DiffSpan};

/// Render spans in `git diff --word-diff=plain` style: `[-removed-]{+added+}`
pub fn render_inline(spans: &[DiffSpan]) -> String {
    let mut output = String::new();

    for span in spans {
        match span.kind {
            DiffKind::Unchanged => output.push_str(&span.value),
            DiffKind::Removed => {
                output.push_str("[-");
                output.push_str(&span.value);
                output.push_str("-]");
            }
            DiffKind::Added => {
                output.push_str("{+");
                output.push_str(&span.value);
                output.push_str("+}");
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_words;

    #[test]
    fn test_render_inline() {
        let spans = diff_words("return 1 }", "return 2 }");
        assert_eq!(render_inline(&spans), "return [-1-]{+2+} }");
    }

    #[test]
    fn test_render_unchanged_is_verbatim() {
        let spans = diff_words("same\ntext", "same\ntext");
        assert_eq!(render_inline(&spans), "same\ntext");
    }
}
