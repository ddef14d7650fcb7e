//! 候选图片
//!
//! 定位器返回的图片只有两种形态：可下载的远程地址，或内联在 data URL 里的编码数据。

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AcquireError, AcquireResult};

/// 一张候选图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCandidate {
    /// 需要通过网络下载的远程图片
    RemoteReference { url: String },
    /// 内联图片，`payload` 为 base64 编码文本，保存时才解码
    InlineData { mime_type: String, payload: String },
}

fn data_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^data:([A-Za-z0-9.+/-]+);base64,(.+)$").expect("data URL 正则无效")
    })
}

impl ImageCandidate {
    /// 根据图片元素的 `src` 属性构造候选图片
    ///
    /// - `data:<mime>;base64,<payload>` → `InlineData`
    /// - `http(s)://...` → `RemoteReference`
    /// - 结构不对的 `data:` → 解码错误
    /// - 其他（空、`about:blank` 等）→ 未找到
    pub fn from_src(src: &str, query: &str, index: usize) -> AcquireResult<Self> {
        let src = src.trim();

        if src.starts_with("data:") {
            let caps = data_url_regex()
                .captures(src)
                .ok_or_else(|| AcquireError::decode("data URL 结构无效"))?;
            return Ok(ImageCandidate::InlineData {
                mime_type: caps[1].to_string(),
                payload: caps[2].to_string(),
            });
        }

        if src.starts_with("http://") || src.starts_with("https://") {
            return Ok(ImageCandidate::RemoteReference {
                url: src.to_string(),
            });
        }

        Err(AcquireError::NotFound {
            query: query.to_string(),
            index,
        })
    }

    /// 用于日志的简短描述
    pub fn kind(&self) -> &'static str {
        match self {
            ImageCandidate::RemoteReference { .. } => "远程图片",
            ImageCandidate::InlineData { .. } => "内联图片",
        }
    }
}
