//! HTML page boilerplate around the assembled report fragments.
//!
//! Everything here is presentation glue: the static header with the
//! stylesheet, the collapsible-section toggle script, escaping for
//! log-derived text, and the footer identifying when, where and by whom
//! the report was generated.

use std::borrow::Cow;

/// Fixed name of the generated report in the output directory.
pub const OUTPUT_FILE: &str = "asan_summary.html";

/// Fixed name of the optional machine-readable summary.
pub const JSON_OUTPUT_FILE: &str = "asan_summary.json";

/// Static page header: document start, title and stylesheet.
pub const PAGE_HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>AddressSanitizer summary</title>
<style>
body { font-family: sans-serif; }
h4 { margin-bottom: 0.2em; }
.collapsible {
  background-color: #eee;
  cursor: pointer;
  padding: 10px;
  width: 100%;
  border: none;
  text-align: left;
  font-size: 15px;
}
.active, .collapsible:hover { background-color: #ccc; }
.content { display: none; padding: 0 18px; }
.ok { color: green; }
pre { background-color: #f4f4f4; padding: 4px; }
pre.direct { background-color: #ffb366; }
pre.grown { background-color: #ffff99; }
pre.error { background-color: #ff9999; }
pre.warning { background-color: #e0e0e0; }
.footer { color: #666; font-size: 12px; }
</style>
</head>
<body>
<h1>AddressSanitizer summary</h1>
"#;

/// Script wiring every collapsible button to its content panel.
const TOGGLE_SCRIPT: &str = r#"<script>
var coll = document.getElementsByClassName("collapsible");
for (var i = 0; i < coll.length; i++) {
  coll[i].addEventListener("click", function() {
    this.classList.toggle("active");
    var content = this.nextElementSibling;
    content.style.display = content.style.display === "block" ? "none" : "block";
  });
}
</script>
"#;

/// Closing boilerplate: toggle script plus the generation footer.
pub fn page_footer() -> String {
    format!(
        "{}<p class=\"footer\">Generated {} by {} {} ({}@{})</p>\n</body>\n</html>\n",
        TOGGLE_SCRIPT,
        chrono::Local::now().to_rfc2822(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        user_name(),
        host_name(),
    )
}

/// Escape log-derived text for embedding in HTML.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}

fn user_name() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

fn host_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::fs::read_to_string("/etc/hostname").map(|s| s.trim().to_string()))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert!(matches!(escape("    #0 0x55 in malloc"), Cow::Borrowed(_)));
    }

    #[test]
    fn escape_replaces_markup_characters() {
        assert_eq!(
            escape("std::vector<int> &v"),
            "std::vector&lt;int&gt; &amp;v"
        );
    }

    #[test]
    fn footer_names_the_tool() {
        let footer = page_footer();
        assert!(footer.contains(env!("CARGO_PKG_NAME")));
        assert!(footer.contains(env!("CARGO_PKG_VERSION")));
        assert!(footer.ends_with("</html>\n"));
    }
}
