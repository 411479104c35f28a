//! XML text helpers

/// Wrap text in a CDATA section, splitting any `]]>` it contains.
pub fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

/// XML-escape a string for element content or attribute values.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Replace tabs with four spaces; browsers render tabs inconsistently inside `<pre>`.
pub fn expand_tabs(s: &str) -> String {
    s.replace('\t', "    ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdata() {
        assert_eq!(cdata("<b>x</b>"), "<![CDATA[<b>x</b>]]>");
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("Quiz"), "Quiz");
        assert_eq!(xml_escape("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
        assert_eq!(xml_escape("\"q\""), "&quot;q&quot;");
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tx\ty"), "    x    y");
    }
}
