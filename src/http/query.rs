use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes escaped inside the query portion. `&`, `=` and `%` stay as they
/// are so argument separators and already escaped sequences survive.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Appends raw query arguments to `url`.
///
/// Without a `?` trailing slashes are dropped and `?args` is appended,
/// otherwise `&args` is appended.
pub(crate) fn merge_query(url: &str, args: &str) -> String {
    if args.is_empty() {
        return url.to_owned();
    }
    if url.contains('?') {
        format!("{}&{}", url, args)
    } else {
        format!("{}?{}", url.trim_end_matches('/'), args)
    }
}

/// Percent-escapes everything after the first `?`, leaving scheme, host and
/// path untouched.
pub(crate) fn escape_query(url: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) => format!("{}?{}", base, utf8_percent_encode(query, QUERY)),
        None => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_without_query_strips_trailing_slash() {
        assert_eq!(
            merge_query("http://host/path/", "a=1&b=2"),
            "http://host/path?a=1&b=2"
        );
        assert_eq!(merge_query("http://host//", "a=1"), "http://host?a=1");
    }

    #[test]
    fn merge_with_query_appends_arguments() {
        assert_eq!(
            merge_query("http://host/path?x=1", "a=1&b=2"),
            "http://host/path?x=1&a=1&b=2"
        );
    }

    #[test]
    fn merge_with_empty_args_is_identity() {
        assert_eq!(merge_query("http://host/path/", ""), "http://host/path/");
    }

    #[test]
    fn escape_touches_query_only() {
        assert_eq!(
            escape_query("https://example.com/api/items?lang=en&search=escape this path"),
            "https://example.com/api/items?lang=en&search=escape%20this%20path"
        );
        assert_eq!(
            escape_query("https://example.com/my path/items"),
            "https://example.com/my path/items"
        );
    }

    #[test]
    fn escape_keeps_existing_sequences() {
        assert_eq!(
            escape_query("http://host/?q=a%20b&r=<x>"),
            "http://host/?q=a%20b&r=%3Cx%3E"
        );
    }

    #[test]
    fn escape_encodes_non_ascii() {
        assert_eq!(escape_query("http://host/?name=jé"), "http://host/?name=j%C3%A9");
    }
}
