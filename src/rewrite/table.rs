//! Literal URL substitution table.

/// Vendor URLs found inside the tracking scripts, paired with the proxy path
/// that serves the same resource. Quoted entries come first.
const VENDOR_URLS: &[(&str, &str)] = &[
    ("\"https://k.clarity.ms/collect\"", "/ms/p"),
    ("\"https://a.clarity.ms/collect\"", "/ms/p"),
    ("https://c.clarity.ms/c.gif", "/ms/i.gif"),
    ("https://k.clarity.ms/collect", "/ms/p"),
    ("https://a.clarity.ms/collect", "/ms/p"),
    ("https://scripts.clarity.ms/", "/ms/j/"),
    ("https://c.clarity.ms/", "/ms/c/"),
];

/// One literal replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Ordered set of literal replacements derived from the proxy domain.
#[derive(Debug, Clone)]
pub struct RewriteTable {
    replacements: Vec<Replacement>,
}

impl RewriteTable {
    /// Build the table for a normalized proxy domain (no trailing slash).
    pub fn new(proxy_domain: &str) -> Self {
        let replacements = VENDOR_URLS
            .iter()
            .map(|(from, path)| {
                let to = if from.starts_with('"') {
                    format!("\"{}{}\"", proxy_domain, path)
                } else {
                    format!("{}{}", proxy_domain, path)
                };
                Replacement {
                    from: (*from).to_string(),
                    to,
                }
            })
            .collect();

        Self { replacements }
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Replace every occurrence of every source literal, in table order.
    pub fn apply(&self, body: &[u8]) -> Vec<u8> {
        let mut out = body.to_vec();
        for r in &self.replacements {
            out = replace_all(&out, r.from.as_bytes(), r.to.as_bytes());
        }
        out
    }
}

/// Byte-level global literal replacement. Leaves invalid UTF-8 untouched.
fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() || haystack.len() < from.len() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "https://analytics.example.com";

    fn rewrite(input: &str) -> String {
        String::from_utf8(RewriteTable::new(DOMAIN).apply(input.as_bytes())).unwrap()
    }

    #[test]
    fn test_pixel_replaced_everywhere() {
        let out = rewrite("a='https://c.clarity.ms/c.gif';b=1;c=\"x\"+'https://c.clarity.ms/c.gif?x'");
        assert_eq!(
            out,
            "a='https://analytics.example.com/ms/i.gif';b=1;c=\"x\"+'https://analytics.example.com/ms/i.gif?x'"
        );
        assert!(!out.contains("clarity.ms"));
    }

    #[test]
    fn test_quoted_collect_keeps_quotes() {
        assert_eq!(
            rewrite(r#"u="https://k.clarity.ms/collect";"#),
            r#"u="https://analytics.example.com/ms/p";"#
        );
        assert_eq!(
            rewrite(r#"["https://a.clarity.ms/collect",x+"https://k.clarity.ms/collect/v2"]"#),
            r#"["https://analytics.example.com/ms/p",x+"https://analytics.example.com/ms/p/v2"]"#
        );
    }

    #[test]
    fn test_hosts() {
        assert_eq!(
            rewrite("s='https://scripts.clarity.ms/'+v+'/clarity.js';c='https://c.clarity.ms/s/0.7.1/clarity.js'"),
            "s='https://analytics.example.com/ms/j/'+v+'/clarity.js';c='https://analytics.example.com/ms/c/s/0.7.1/clarity.js'"
        );
    }

    #[test]
    fn test_pixel_wins_over_cdn_prefix() {
        assert_eq!(rewrite("https://c.clarity.ms/c.gif"), "https://analytics.example.com/ms/i.gif");
    }

    #[test]
    fn test_idempotent() {
        let input = r#"x="https://k.clarity.ms/collect";y='https://c.clarity.ms/c.gif';z='https://scripts.clarity.ms/a.js'"#;
        let once = rewrite(input);
        let twice = rewrite(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_untouched_content() {
        assert_eq!(rewrite(""), "");
        assert_eq!(rewrite("console.log('https://www.clarity.ms/tag/abc')"), "console.log('https://www.clarity.ms/tag/abc')");
    }

    #[test]
    fn test_non_utf8_preserved() {
        let table = RewriteTable::new(DOMAIN);
        let mut input = vec![0xff, 0xfe];
        input.extend_from_slice(b"https://c.clarity.ms/c.gif");
        input.push(0x80);

        let mut expected = vec![0xff, 0xfe];
        expected.extend_from_slice(b"https://analytics.example.com/ms/i.gif");
        expected.push(0x80);

        assert_eq!(table.apply(&input), expected);
    }

    #[test]
    fn test_table_shape() {
        let table = RewriteTable::new(DOMAIN);
        assert_eq!(table.replacements().len(), 7);
        assert_eq!(table.replacements()[0].to, "\"https://analytics.example.com/ms/p\"");
    }
}
