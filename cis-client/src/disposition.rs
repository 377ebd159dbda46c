//! Content-Disposition filename extraction
//!
//! Handles the `filename` parameter (token or quoted-string) and the
//! extended `filename*` parameter (`charset'language'percent-encoded`).
//! When both are present the extended form wins.

/// Extract the filename from a Content-Disposition header value
///
/// Returns `None` when neither parameter yields a usable name.
pub fn filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for (name, value) in parameters(header) {
        match name.as_str() {
            "filename" => plain = Some(value),
            "filename*" => extended = decode_extended(&value),
            _ => {}
        }
    }

    extended
        .and_then(|name| safe_file_name(&name))
        .or_else(|| plain.and_then(|name| safe_file_name(&name)))
}

/// Reduce a server-supplied name to its final path component
///
/// Rejects names that would not stay inside the download directory.
pub fn safe_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();

    match last {
        "" | "." | ".." => None,
        other => Some(other.to_string()),
    }
}

/// Split the header into lowercase parameter names and unquoted values
fn parameters(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = header.chars().peekable();

    // Skip the disposition type
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
    }

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ';').is_some() {}

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && *c != ';') {
            name.push(c);
        }
        if name.trim().is_empty() && chars.peek().is_none() {
            break;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}

            if chars.next_if_eq(&'"').is_some() {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '"' => break,
                        other => value.push(other),
                    }
                }
                // Drop anything between the closing quote and the next ';'
                while chars.next_if(|c| *c != ';').is_some() {}
            } else {
                while let Some(c) = chars.next_if(|c| *c != ';') {
                    value.push(c);
                }
                value = value.trim().to_string();
            }
        }

        let name = name.trim().to_ascii_lowercase();
        if !name.is_empty() {
            params.push((name, value));
        }

        if chars.peek().is_none() {
            break;
        }
    }

    params
}

/// Decode an RFC 5987 extended value
fn decode_extended(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    let bytes = percent_decode(encoded)?;

    let decoded = if charset.eq_ignore_ascii_case("iso-8859-1") {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    Some(decoded)
}

fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            filename("attachment; filename=\"result.zip\""),
            Some("result.zip".to_string())
        );
    }

    #[test]
    fn test_token_filename() {
        assert_eq!(
            filename("attachment; filename=result.pdf"),
            Some("result.pdf".to_string())
        );
    }

    #[test]
    fn test_quoted_filename_with_separator_and_escapes() {
        assert_eq!(
            filename(r#"attachment; filename="a; \"b\".txt"; size=10"#),
            Some("a; \"b\".txt".to_string())
        );
    }

    #[test]
    fn test_extended_filename_wins() {
        assert_eq!(
            filename("attachment; filename=\"fallback.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"),
            Some("résumé.pdf".to_string())
        );
    }

    #[test]
    fn test_unusable_extended_filename_falls_back_to_plain() {
        assert_eq!(
            filename("attachment; filename=\"report.pdf\"; filename*=UTF-8''%2E%2E"),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            filename("attachment; filename*=UTF-8''; filename=report.pdf"),
            Some("report.pdf".to_string())
        );
    }

    #[test]
    fn test_extended_latin1_filename() {
        assert_eq!(
            filename("attachment; filename*=iso-8859-1'en'%A3%20rates.txt"),
            Some("£ rates.txt".to_string())
        );
    }

    #[test]
    fn test_parameter_names_are_case_insensitive() {
        assert_eq!(
            filename("attachment; FileName=\"Out.csv\""),
            Some("Out.csv".to_string())
        );
    }

    #[test]
    fn test_missing_filename() {
        assert_eq!(filename("attachment"), None);
        assert_eq!(filename("inline; size=42"), None);
        assert_eq!(filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_path_components_are_stripped() {
        assert_eq!(
            filename("attachment; filename=\"../../etc/passwd\""),
            Some("passwd".to_string())
        );
        assert_eq!(
            filename(r"attachment; filename=C:\temp\out.zip"),
            Some("out.zip".to_string())
        );
        assert_eq!(filename("attachment; filename=\"..\""), None);
    }
}
