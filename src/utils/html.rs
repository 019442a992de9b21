use ammonia;

/// Clean user-submitted comment text using the ammonia library.
///
/// Whitelist-based sanitization: safe inline tags survive, <script>/<iframe>
/// and event-handler attributes do not. Comment text is stored sanitized and
/// served verbatim, so this is the single choke point against stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
