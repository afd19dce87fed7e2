use once_cell::sync::Lazy;
use regex::Regex;

// 包括未闭合的结尾标签
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*(>|$)").unwrap());

/// 去掉富文本中的 HTML 标签并还原常见实体，只用于纯文本展示和搜索比较
pub fn strip_markup(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return html.to_string();
    }

    let stripped = TAG_RE.replace_all(html, "");
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// 搜索比较用的规范化文本
pub fn search_key(text: &str) -> String {
    strip_markup(text).to_lowercase()
}
