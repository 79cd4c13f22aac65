//! Block comment removal.
//!
//! Block comments are blanked in place so that every byte offset and every
//! line break of the input survives. Line comments and strings pass through
//! untouched; they are only tracked so that `/*` inside them is not treated
//! as a comment opener.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Default,
    SawSlash,
    LineComment,
    BlockComment,
    BlockCommentClosing,
    InString,
    InStringEscape,
}

/// Replace the body of every `/* ... */` comment with spaces.
///
/// The output has the same byte length as `source` and newlines at the same
/// offsets. A multi-byte character inside a comment becomes as many spaces as
/// it has bytes. Unterminated comments and strings simply run to the end of
/// the input.
pub fn strip_block_comments(source: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(source.len());
    let mut state = State::Default;

    for ch in source.chars() {
        let blank = match state {
            State::Default => {
                match ch {
                    '/' => state = State::SawSlash,
                    '"' => state = State::InString,
                    _ => {}
                }
                false
            }
            State::SawSlash => match ch {
                '/' => {
                    state = State::LineComment;
                    false
                }
                '*' => {
                    state = State::BlockComment;
                    // The opening slash was already emitted.
                    if let Some(last) = out.last_mut() {
                        *last = b' ';
                    }
                    true
                }
                '"' => {
                    state = State::InString;
                    false
                }
                _ => {
                    state = State::Default;
                    false
                }
            },
            State::LineComment => {
                if ch == '\n' {
                    state = State::Default;
                }
                false
            }
            State::BlockComment => {
                if ch == '*' {
                    state = State::BlockCommentClosing;
                }
                true
            }
            State::BlockCommentClosing => {
                match ch {
                    '*' => {}
                    '/' => state = State::Default,
                    _ => state = State::BlockComment,
                }
                true
            }
            State::InString => {
                match ch {
                    '"' | '\n' => state = State::Default,
                    '\\' => state = State::InStringEscape,
                    _ => {}
                }
                false
            }
            State::InStringEscape => {
                state = if ch == '\n' {
                    State::Default
                } else {
                    State::InString
                };
                false
            }
        };

        if blank && ch != '\n' {
            out.extend(std::iter::repeat_n(b' ', ch.len_utf8()));
        } else {
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }

    // Only whole characters were replaced by ASCII spaces.
    String::from_utf8(out).unwrap_or_default()
}
