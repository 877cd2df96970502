// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Brings raw text into the shape the vocabulary expects.
//
// The vocabulary is lowercase-only (base set is a-z, 0-9,
// space), so anything uppercase would otherwise fall through to
// the padding index. Whitespace variants collapse to a plain
// space for the same reason.
//
// Two entry points:
//   normalise() - character mapping only. Used on prediction
//                 input, where a trailing space is meaningful
//                 and must survive.
//   clean()     - normalise() plus per-line space collapsing,
//                 trimming and blank-line removal. Used on
//                 training corpora where each line is one text.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase and map whitespace/control characters to a space.
    /// Newlines are kept so callers can still split on lines.
    pub fn normalise(&self, text: &str) -> String {
        text.chars()
            .flat_map(char::to_lowercase)
            .map(|c| match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' | '\u{3000}' => ' ',
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect()
    }

    /// Normalise, then collapse runs of spaces, trim each line and
    /// drop lines that end up empty.
    pub fn clean(&self, text: &str) -> String {
        self.normalise(text)
            .lines()
            .map(|line| {
                let mut out        = String::with_capacity(line.len());
                let mut last_space = false;
                for c in line.chars() {
                    if c == ' ' {
                        if !last_space {
                            out.push(' ');
                        }
                        last_space = true;
                    } else {
                        out.push(c);
                        last_space = false;
                    }
                }
                out.trim().to_string()
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
