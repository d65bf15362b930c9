//! Text helpers for safe HTML output.

/// Escapes HTML metacharacters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their entity equivalents so the
/// result is safe to interpolate into HTML attribute or element content.
///
/// # Examples
///
/// ```
/// use trellis_core::utils::escape_html;
///
/// assert_eq!(escape_html("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
/// assert_eq!(escape_html("a \"b\" 'c'"), "a &quot;b&quot; &#x27;c&#x27;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sanitizes untrusted user input for HTML display: trims surrounding
/// whitespace, then escapes HTML metacharacters (quotes included).
///
/// # Examples
///
/// ```
/// use trellis_core::utils::sanitize;
///
/// assert_eq!(sanitize("  <script>x</script>  "), "&lt;script&gt;x&lt;/script&gt;");
/// ```
pub fn sanitize(input: &str) -> String {
    escape_html(input.trim())
}
