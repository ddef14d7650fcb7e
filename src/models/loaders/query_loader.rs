use crate::error::ConfigError;
use crate::models::query::Query;
use std::path::Path;
use tokio::fs;

/// 解析查询列表：逗号和/或换行分隔，去除首尾空白，丢弃空项，保持顺序
pub fn parse_queries(content: &str) -> Vec<Query> {
    content
        .split(|c: char| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Query::new)
        .collect()
}

/// 从文件读取查询列表
pub async fn load_queries_from_file(path: &Path) -> Result<Vec<Query>, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::QueriesFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let queries = parse_queries(&content);
    tracing::info!("✓ 从 {} 读取到 {} 个查询", path.display(), queries.len());
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries_mixed_separators() {
        let queries = parse_queries("cat, dog\nred panda,,\r\n  \n9780134685991");
        let raw: Vec<&str> = queries.iter().map(|q| q.raw()).collect();
        assert_eq!(raw, vec!["cat", "dog", "red panda", "9780134685991"]);
        assert_eq!(queries[2].token(), "red+panda");
    }

    #[test]
    fn test_parse_queries_empty_input() {
        assert!(parse_queries("").is_empty());
        assert!(parse_queries(" ,\n, ").is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_queries_from_file(&dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::QueriesFileUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        std::fs::write(&path, "cat,dog\nbird\n").unwrap();

        let queries = load_queries_from_file(&path).await.unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[2].raw(), "bird");
    }
}
