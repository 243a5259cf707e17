//! Browser query-string state: the `q` search and the `exact` flag.

use url::form_urlencoded;

/// Search state carried in the address bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: String,
    pub exact: bool,
}

impl SearchParams {
    /// Parse from a full URL, a `?query` string, or a bare `a=b&c=d` string.
    ///
    /// `exact` is true for `"true"` or `"1"` in any casing.
    pub fn parse(input: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query_part(input).as_bytes()) {
            match key.as_ref() {
                "q" => params.q = value.into_owned(),
                "exact" => {
                    let value = value.to_lowercase();
                    params.exact = value == "true" || value == "1";
                }
                _ => {}
            }
        }
        params
    }

    /// Query string to put back in the address bar: `?q=...`, or empty when
    /// there is no search.
    pub fn to_query_string(&self) -> String {
        if self.q.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("q", &self.q);
        if self.exact {
            serializer.append_pair("exact", "true");
        }
        format!("?{}", serializer.finish())
    }
}

/// The undecoded value of `key` in `input`'s query string.
pub fn raw_query_value<'a>(input: &'a str, key: &str) -> Option<&'a str> {
    query_part(input).split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == key).then_some(v)
    })
}

fn query_part(input: &str) -> &str {
    let without_fragment = input.split('#').next().unwrap_or("");
    match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None if without_fragment.contains('=') => without_fragment,
        None => "",
    }
}
