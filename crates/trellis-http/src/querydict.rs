//! Query string dictionary for HTTP request parameters.
//!
//! [`QueryDict`] holds decoded GET or POST parameters. Keys keep their first
//! appearance order and may carry multiple values; [`QueryDict::get`] returns
//! the last value for a key, matching how most form backends resolve
//! repeated fields.

use percent_encoding::percent_decode_str;

/// A dictionary of query string or form parameters.
///
/// # Examples
///
/// ```
/// use trellis_http::QueryDict;
///
/// let qd = QueryDict::parse("color=red&color=blue&size=large");
/// assert_eq!(qd.get("color"), Some("blue"));
/// assert_eq!(
///     qd.get_list("color"),
///     Some(&vec!["red".to_string(), "blue".to_string()])
/// );
/// assert_eq!(qd.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDict {
    data: Vec<(String, Vec<String>)>,
}

impl QueryDict {
    /// Creates a new, empty `QueryDict`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded string (e.g. `"key1=val1&key2=val2"`).
    ///
    /// Handles percent-encoding and `+`-as-space (form encoding), and
    /// supports multiple values per key.
    pub fn parse(encoded: &str) -> Self {
        let mut dict = Self::new();

        for pair in encoded.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .find('=')
                .map_or((pair, ""), |eq| (&pair[..eq], &pair[eq + 1..]));
            dict.append(&form_decode(key), &form_decode(value));
        }

        dict
    }

    /// Returns the last value for the given key, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_list(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if absent.
    pub fn get_list(&self, key: &str) -> Option<&Vec<String>> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.iter().any(|(k, _)| k == key)
    }

    /// Appends a value for the given key.
    pub fn append(&mut self, key: &str, value: &str) {
        if let Some((_, values)) = self.data.iter_mut().find(|(k, _)| k == key) {
            values.push(value.to_string());
        } else {
            self.data.push((key.to_string(), vec![value.to_string()]));
        }
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over `(key, values)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vec<String>)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Decodes a form-encoded component: `+` becomes a space, then
/// percent-escapes are decoded (lossily for invalid UTF-8).
fn form_decode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}
