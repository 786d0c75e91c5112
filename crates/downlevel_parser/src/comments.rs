use std::borrow::Cow;

/// Blanks out `/* */` and `//` comments so that tags inside them do not
/// confuse the region scan. The replacement is length-preserving (every
/// non-newline byte becomes a space), so all offsets of the returned
/// text are valid in the original.
///
/// Only comment openers followed by whitespace are recognized, which
/// keeps `https://...` URLs inside attribute values intact.
pub fn strip_comments(input: &str) -> Cow<'_, str> {
    if !input.contains("/*") && !input.contains("//") {
        return Cow::Borrowed(input);
    }

    let mut bytes = input.as_bytes().to_vec();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'/'
            && bytes[i + 1] == b'*'
            && matches!(bytes.get(i + 2), Some(c) if c.is_ascii_whitespace())
        {
            // Unterminated comments are left as-is
            let Some(end) = find_block_comment_end(&bytes, i + 3) else {
                i += 2;
                continue;
            };

            blank_out(&mut bytes[i..end]);
            i = end;
        } else if bytes[i] == b'/'
            && bytes[i + 1] == b'/'
            && matches!(bytes.get(i + 2), Some(b' ') | Some(b'\t'))
        {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j] != b'\n' && bytes[j] != b'\r' {
                j += 1;
            }

            blank_out(&mut bytes[i..j]);
            i = j;
        } else {
            i += 1;
        }
    }

    // The scan only blanks whole characters (`*/` and newlines are ASCII
    // and can never appear inside a multi-byte sequence)
    match String::from_utf8(bytes) {
        Ok(stripped) => Cow::Owned(stripped),
        Err(_) => Cow::Borrowed(input),
    }
}

fn find_block_comment_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut j = from;
    while j + 1 < bytes.len() {
        if bytes[j] == b'*' && bytes[j + 1] == b'/' {
            return Some(j + 2);
        }
        j += 1;
    }
    None
}

fn blank_out(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        if *b != b'\n' && *b != b'\r' {
            *b = b' ';
        }
    }
}
