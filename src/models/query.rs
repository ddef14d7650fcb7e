use std::fmt;

/// 文件名和 URL 中替换不安全字符所用的占位符
pub const PLACEHOLDER: char = '+';

/// 一个待处理的查询：原始文本 + 规范化后的 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    token: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let token = normalize(&raw);
        Self { raw, token }
    }

    /// 原始查询文本
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 规范化 token，同时用于搜索和文件命名
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// 把查询转换成文件系统和 URL 都安全的 token
///
/// 连续空白折叠为一个占位符，然后 `[A-Za-z0-9_-]` 以外的每个字符都替换为占位符。
/// 占位符本身也在允许集之外，所以再次规范化结果不变。
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(PLACEHOLDER);
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push(PLACEHOLDER);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_whitespace_runs() {
        assert_eq!(normalize("red  panda"), "red+panda");
        assert_eq!(normalize("a \t\n b"), "a+b");
        assert_eq!(normalize(" cat "), "+cat+");
    }

    #[test]
    fn test_normalize_replaces_unsafe_characters() {
        assert_eq!(normalize("978-0-13-468599-1"), "978-0-13-468599-1");
        assert_eq!(normalize("what's up?"), "what+s+up+");
        assert_eq!(normalize("a/b\\c"), "a+b+c");
        assert_eq!(normalize("snake_case"), "snake_case");
        assert_eq!(normalize("café"), "caf+");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "cat",
            "red  panda",
            "  leading and trailing  ",
            "c++ & rust",
            "日本語 テキスト",
            "tab\tseparated\nlines",
            "+++",
            "a + b",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_query_keeps_raw_and_token() {
        let query = Query::new("hot dog");
        assert_eq!(query.raw(), "hot dog");
        assert_eq!(query.token(), "hot+dog");
        assert_eq!(query.to_string(), "hot dog");
    }
}
