//! 查询处理上下文
//!
//! 封装"我正在处理第几个查询"这一信息，仅用于日志

use std::fmt::Display;

/// 查询处理上下文
#[derive(Debug, Clone)]
pub struct QueryCtx {
    /// 查询序号（从1开始）
    pub position: usize,

    /// 查询总数
    pub total: usize,

    /// 规范化 token
    pub token: String,
}

impl QueryCtx {
    pub fn new(position: usize, total: usize, token: impl Into<String>) -> Self {
        Self {
            position,
            total,
            token: token.into(),
        }
    }

    /// 是否为最后一个查询
    pub fn is_last(&self) -> bool {
        self.position >= self.total
    }
}

impl Display for QueryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[查询 {}/{} {}]", self.position, self.total, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_last() {
        let ctx = QueryCtx::new(2, 2, "red+panda");
        assert_eq!(ctx.to_string(), "[查询 2/2 red+panda]");
        assert!(ctx.is_last());
        assert!(!QueryCtx::new(1, 2, "cat").is_last());
    }
}
