use lazy_static::lazy_static;
use regex::Regex;

/// Tokens that mark a bracket group as display math rather than prose.
const MATH_TOKENS: &[&str] = &[
    "\\frac",
    "\\sqrt",
    "\\sum",
    "\\int",
    "\\det",
    "\\begin{",
    "\\lambda",
    "\\Delta",
    "\\boxed",
    "\\Rightarrow",
    "\\pm",
];

lazy_static! {
    static ref BACKSLASH_COMMAND: Regex = Regex::new(r"\\[a-zA-Z]+").unwrap();
    // A \begin{...} row that ends in a lone backslash is missing half its row
    // separator.
    static ref BEGIN_ROW_BREAK: Regex =
        Regex::new(r"(\\begin\{[^}\n]+\}[^\n]*[^\\\n])\\(\n)").unwrap();
    static ref END_ROW_BREAK: Regex = Regex::new(r"([^\\])\\\s*(\\end\{)").unwrap();
    static ref COMMAND_GAP: Regex = Regex::new(r"(\d|\\[a-zA-Z]+)[ \t]+(\\[a-zA-Z])").unwrap();
    static ref RIGHTARROW_DUP: Regex =
        Regex::new(r"(?:\\Rightarrow\s*;\s*)+\\Rightarrow").unwrap();
    static ref STRAY_ROW_SEMI: Regex = Regex::new(r"\\\s*;\s*\\([^a-zA-Z\\]|$)").unwrap();
    static ref SEMI_SEMI: Regex = Regex::new(r";;").unwrap();
    static ref MATRIX_ROW: Regex =
        Regex::new(r"(?m)^([ \t]*)(\d+)[ \t]+(\d+)[ \t]+(\d+)[ \t]*$").unwrap();
    static ref LAMBDA_EQ: Regex = Regex::new(r"\(\\lambda[ \t]*=[ \t]*(-?\d+)\)").unwrap();
    static ref BOXED: Regex = Regex::new(r"\\boxed\{[ \t]*([^{}]*?)[ \t]*\}").unwrap();
}

/// Normalize model-generated markdown before rendering: convert bracket math
/// into display-math delimiters and repair common malformed LaTeX sequences.
///
/// Total over arbitrary text. The repair rules are ordered heuristics, not a
/// LaTeX parser: later rules assume earlier ones already ran, and prose that
/// happens to look like math may be rewritten. A second pass is a no-op.
pub fn normalize(input: &str) -> String {
    let text = convert_bracket_math(input);
    let text = BEGIN_ROW_BREAK.replace_all(&text, "${1}\\\\${2}");
    let text = END_ROW_BREAK.replace_all(&text, "${1}\\\\ ${2}");
    let text = collapse_command_gaps(&text);
    let text = RIGHTARROW_DUP.replace_all(&text, "\\Rightarrow");
    let text = STRAY_ROW_SEMI.replace_all(&text, "\\\\${1}");
    let text = SEMI_SEMI.replace_all(&text, ", ");
    let text = MATRIX_ROW.replace_all(&text, "${1}${2} & ${3} & ${4}");
    let text = LAMBDA_EQ.replace_all(&text, "(\\lambda=${1})");
    let text = BOXED.replace_all(&text, "\\boxed{${1}}");
    text.into_owned()
}

// Adjacent gaps share their command token (`2 \frac \sqrt`), so a single
// non-overlapping pass can leave some behind. Every pass only deletes
// whitespace, so repeating until stable terminates.
fn collapse_command_gaps(text: &str) -> String {
    let mut text = text.to_string();
    loop {
        let next = COMMAND_GAP.replace_all(&text, "${1}${2}");
        if next == text {
            return text;
        }
        text = next.into_owned();
    }
}

fn looks_like_math(interior: &str) -> bool {
    MATH_TOKENS.iter().any(|token| interior.contains(token)) || BACKSLASH_COMMAND.is_match(interior)
}

/// Rewrite `[ X ]` as `\[ X \]` when the interior looks like LaTeX. Markdown
/// links, plain bracketed prose, and groups already preceded by a backslash
/// are left untouched. Unbalanced brackets pass through unchanged.
fn convert_bracket_math(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len() + 8);
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' && (i == 0 || bytes[i - 1] != b'\\') {
            // Find the matching close bracket, tracking nesting
            let mut depth = 1usize;
            let mut j = i + 1;
            while j < bytes.len() && depth > 0 {
                match bytes[j] {
                    b'[' => depth += 1,
                    b']' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }

            if depth == 0 {
                let interior = &input[i + 1..j - 1];
                let is_link = bytes.get(j) == Some(&b'(');
                if !is_link && looks_like_math(interior) {
                    out.push_str("\\[");
                    out.push_str(interior);
                    out.push_str("\\]");
                } else {
                    out.push_str(&input[i..j]);
                }
                i = j;
                continue;
            }
        }

        let ch = input[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}
