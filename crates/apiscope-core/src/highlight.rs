//! Decorative token classifier for displayed code snippets
//!
//! Splits arbitrary text into display tokens and guesses a style for each.
//! This is not a lexer: it never fails, never validates, and its only
//! guarantee is that the tokens concatenate back to the input.
//!
//! Split points:
//! - whitespace runs
//! - quoted strings (`"..."` or `'...'`, no escapes, may span lines)
//! - line comments starting with `#`, or `//` at the start of a word
//! - the punctuation characters `( ) [ ] { } , : .`

use serde::Serialize;

/// Keywords merged across the snippet languages (Python, JavaScript, shell).
const KEYWORDS: &[&str] = &[
    "import", "from", "class", "def", "return", "if", "else", "elif", "try", "except", "finally",
    "raise", "with", "as", "pass", "None", "True", "False", "is", "in", "not", "and", "or", "for",
    "while", "lambda", "yield", "const", "let", "var", "function", "async", "await", "new",
    "throw", "catch", "export", "console",
];

/// Well-known call names that get their own colour.
const BUILTINS: &[&str] = &[
    "requests", "print", "fetch", "console", "log", "error", "super",
];

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', ':', '.'];

/// Display style for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    Keyword,
    /// `self` / `this`
    SelfRef,
    /// TitleCase word, guessed to be a class name
    TypeName,
    String,
    Number,
    Comment,
    Builtin,
    /// `-x`, `--flag`, or `curl`
    Flag,
    Plain,
}

impl StyleTag {
    /// Classify one token. First match wins.
    pub fn of(token: &str) -> Self {
        if KEYWORDS.contains(&token) {
            Self::Keyword
        } else if token == "self" || token == "this" {
            Self::SelfRef
        } else if is_title_case(token) {
            Self::TypeName
        } else if token.starts_with(['"', '\'']) {
            Self::String
        } else if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            Self::Number
        } else if token.starts_with('#') || token.starts_with("//") {
            Self::Comment
        } else if BUILTINS.contains(&token) {
            Self::Builtin
        } else if token.starts_with('-') || token == "curl" {
            Self::Flag
        } else {
            Self::Plain
        }
    }

    /// Suggested foreground colour as `0xRRGGBB` (dark background theme).
    #[must_use]
    pub const fn rgb(self) -> u32 {
        match self {
            Self::Keyword => 0xc586c0,
            Self::SelfRef | Self::Flag => 0x569cd6,
            Self::TypeName => 0xdcdcaa,
            Self::String => 0xce9178,
            Self::Number => 0xb5cea8,
            Self::Comment => 0x6a9955,
            Self::Builtin => 0x4ec9b0,
            Self::Plain => 0xd4d4d4,
        }
    }
}

/// A slice of the input and its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub text: &'a str,
    pub tag: StyleTag,
}

/// Split `code` into styled tokens covering every character exactly once.
pub fn classify(code: &str) -> Vec<Token<'_>> {
    split(code)
        .into_iter()
        .map(|text| Token {
            text,
            tag: StyleTag::of(text),
        })
        .collect()
}

fn split(code: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut word_start = 0;
    let mut pos = 0;

    while let Some(c) = code[pos..].chars().next() {
        match separator_len(code, pos, c) {
            Some(len) => {
                if word_start < pos {
                    pieces.push(&code[word_start..pos]);
                }
                pieces.push(&code[pos..pos + len]);
                pos += len;
                word_start = pos;
            }
            None => pos += c.len_utf8(),
        }
    }
    if word_start < code.len() {
        pieces.push(&code[word_start..]);
    }
    pieces
}

/// Byte length of the separator token starting at `pos`, if one does.
fn separator_len(code: &str, pos: usize, c: char) -> Option<usize> {
    let rest = &code[pos..];
    if c.is_whitespace() {
        return Some(rest.find(|ch: char| !ch.is_whitespace()).unwrap_or(rest.len()));
    }
    match c {
        // An unterminated quote is an ordinary character.
        '"' | '\'' => rest[1..].find(c).map(|close| close + 2),
        '#' => Some(line_len(rest)),
        '/' if rest.starts_with("//") && starts_word(code, pos) => Some(line_len(rest)),
        _ if PUNCTUATION.contains(&c) => Some(1),
        _ => None,
    }
}

fn line_len(rest: &str) -> usize {
    rest.find('\n').unwrap_or(rest.len())
}

/// `//` only opens a comment where a word could begin, so URLs survive.
fn starts_word(code: &str, pos: usize) -> bool {
    code[..pos]
        .chars()
        .next_back()
        .is_none_or(|prev| prev.is_whitespace())
}

fn is_title_case(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(code: &str) -> Vec<(&str, StyleTag)> {
        classify(code).into_iter().map(|t| (t.text, t.tag)).collect()
    }

    fn tag_of<'a>(tokens: &[(&'a str, StyleTag)], text: &str) -> StyleTag {
        tokens
            .iter()
            .find(|(t, _)| *t == text)
            .map(|(_, tag)| *tag)
            .unwrap_or_else(|| panic!("no token {text:?} in {tokens:?}"))
    }

    #[test]
    fn def_is_keyword_and_lowercase_name_is_plain() {
        use StyleTag::*;
        assert_eq!(
            tags("def foo():"),
            vec![
                ("def", Keyword),
                (" ", Plain),
                ("foo", Plain),
                ("(", Plain),
                (")", Plain),
                (":", Plain),
            ]
        );
    }

    #[test]
    fn python_snippet() {
        let code = "import requests\n\nclass Client:\n    def get(self, id):\n        return requests.get(f\"{self.base}/users/{id}\")  # fetch\n";
        let t = tags(code);
        assert_eq!(tag_of(&t, "import"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "requests"), StyleTag::Builtin);
        assert_eq!(tag_of(&t, "Client"), StyleTag::TypeName);
        assert_eq!(tag_of(&t, "self"), StyleTag::SelfRef);
        assert_eq!(tag_of(&t, "\"{self.base}/users/{id}\""), StyleTag::String);
        assert_eq!(tag_of(&t, "# fetch"), StyleTag::Comment);
        // The `f` prefix is split off the string literal.
        assert_eq!(tag_of(&t, "f"), StyleTag::Plain);
    }

    #[test]
    fn javascript_snippet() {
        let code = "const res = await fetch('https://api.x.com/users/42');\n// done\nconsole.log(this.data);";
        let t = tags(code);
        assert_eq!(tag_of(&t, "const"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "await"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "fetch"), StyleTag::Builtin);
        assert_eq!(tag_of(&t, "'https://api.x.com/users/42'"), StyleTag::String);
        assert_eq!(tag_of(&t, "// done"), StyleTag::Comment);
        // Keyword precedence beats the builtin list.
        assert_eq!(tag_of(&t, "console"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "log"), StyleTag::Builtin);
        assert_eq!(tag_of(&t, "this"), StyleTag::SelfRef);
        // `;` is not in the punctuation set, so it forms its own word.
        assert_eq!(tag_of(&t, ";"), StyleTag::Plain);
    }

    #[test]
    fn curl_snippet() {
        let code = "curl -X GET \"https://api.x.com/users/42\" \\\n  --header 'Accept: */*'";
        let t = tags(code);
        assert_eq!(tag_of(&t, "curl"), StyleTag::Flag);
        assert_eq!(tag_of(&t, "-X"), StyleTag::Flag);
        assert_eq!(tag_of(&t, "GET"), StyleTag::TypeName);
        assert_eq!(tag_of(&t, "--header"), StyleTag::Flag);
        assert_eq!(tag_of(&t, "'Accept: */*'"), StyleTag::String);
    }

    #[test]
    fn unquoted_url_does_not_swallow_the_line() {
        let t = tags("curl https://api.x.com/v1 -v");
        assert_eq!(tag_of(&t, "https"), StyleTag::Plain);
        assert_eq!(tag_of(&t, "com/v1"), StyleTag::Plain);
        assert_eq!(tag_of(&t, "-v"), StyleTag::Flag);
        // The word itself still looks like a comment to the classifier.
        assert_eq!(tag_of(&t, "//api"), StyleTag::Comment);
    }

    #[test]
    fn digits_and_mixed() {
        let t = tags("x = 42 + 4a2 + 3.14");
        assert_eq!(tag_of(&t, "42"), StyleTag::Number);
        assert_eq!(tag_of(&t, "4a2"), StyleTag::Plain);
        assert_eq!(tag_of(&t, "3"), StyleTag::Number);
        assert_eq!(tag_of(&t, "14"), StyleTag::Number);
    }

    #[test]
    fn keywords_take_precedence_over_title_case() {
        let t = tags("None True False Foo_1");
        assert_eq!(tag_of(&t, "None"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "True"), StyleTag::Keyword);
        assert_eq!(tag_of(&t, "Foo_1"), StyleTag::TypeName);
    }

    #[test]
    fn comment_runs_to_end_of_line_only() {
        let t = tags("a # one\nb");
        assert_eq!(
            t,
            vec![
                ("a", StyleTag::Plain),
                (" ", StyleTag::Plain),
                ("# one", StyleTag::Comment),
                ("\n", StyleTag::Plain),
                ("b", StyleTag::Plain),
            ]
        );
    }

    #[test]
    fn quotes_inside_comment_stay_in_comment() {
        let t = tags("# it's \"quoted\"\nx");
        assert_eq!(t[0], ("# it's \"quoted\"", StyleTag::Comment));
    }

    #[test]
    fn string_spans_lines_and_ignores_escapes() {
        let t = tags("\"a\nb\\\" c\"");
        assert_eq!(t[0], ("\"a\nb\\\"", StyleTag::String));
        assert_eq!(t[1], (" ", StyleTag::Plain));
    }

    #[test]
    fn unterminated_quote_stays_in_word() {
        let t = tags("it's fine");
        assert_eq!(t[0], ("it's", StyleTag::Plain));
        let t = tags("\"open");
        assert_eq!(t, vec![("\"open", StyleTag::String)]);
    }

    #[test]
    fn empty_input_gives_no_tokens() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let code = "print('héllo 世界') # ✓";
        let joined: String = classify(code).iter().map(|t| t.text).collect();
        assert_eq!(joined, code);
    }

    #[test]
    fn palette_distinguishes_main_tags() {
        assert_ne!(StyleTag::Keyword.rgb(), StyleTag::Plain.rgb());
        assert_eq!(StyleTag::SelfRef.rgb(), StyleTag::Flag.rgb());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_text(code in any::<String>()) {
            let joined: String = classify(&code).iter().map(|t| t.text).collect();
            prop_assert_eq!(joined, code);
        }

        #[test]
        fn round_trip_code_like_text(code in "[a-zA-Z0-9 \t\n#/\"'(){}\\[\\],:.\\-_=;]{0,120}") {
            let tokens = classify(&code);
            prop_assert!(tokens.iter().all(|t| !t.text.is_empty()));
            let joined: String = tokens.iter().map(|t| t.text).collect();
            prop_assert_eq!(joined, code);
        }
    }
}
