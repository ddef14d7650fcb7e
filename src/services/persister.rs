//! 图片保存服务 - 业务能力层
//!
//! 把定位到的候选图片（远程地址或内联数据）写入输出目录，文件名为 `<token>.<扩展名>`。
//!
//! ## 写入规则
//! - 扩展名只来自声明的 MIME 类型（响应头或 data URL），从不看 URL 路径
//! - 数据先完整读入内存，再写入同目录下的临时文件，最后 rename 成目标文件名
//! - 失败时不会留下空文件或半截文件

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{AcquireError, AcquireResult, ConfigError};
use crate::models::ImageCandidate;
use crate::services::existing::find_artifacts;
use crate::utils::logging::truncate_text;

/// 内联数据解码器：与浏览器一致，填充 `=` 可有可无
const INLINE_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// 无法判断格式时使用的扩展名
pub const DEFAULT_EXTENSION: &str = "jpeg";

/// 根据 MIME 类型推断扩展名
///
/// 非 `image/*`、缺失或子类型包含非字母数字字符时返回 [`DEFAULT_EXTENSION`]。
pub fn extension_for_mime(mime: Option<&str>) -> String {
    let Some(mime) = mime else {
        return DEFAULT_EXTENSION.to_string();
    };

    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let Some((top, sub)) = essence.split_once('/') else {
        return DEFAULT_EXTENSION.to_string();
    };
    if top != "image" {
        return DEFAULT_EXTENSION.to_string();
    }

    // svg+xml → svg
    let sub = sub.split('+').next().unwrap_or_default();
    let sub = match sub {
        "x-icon" | "vnd.microsoft.icon" => "ico",
        other => other,
    };

    if sub.is_empty() || !sub.chars().all(|c| c.is_ascii_alphanumeric()) {
        return DEFAULT_EXTENSION.to_string();
    }
    sub.to_string()
}

/// 确保输出目录存在（递归创建），路径已存在但不是目录时报错
pub fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    if path.exists() && !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// 图片保存服务
///
/// 持有一个复用的 HTTP 客户端，下载超时在客户端层面设置。
pub struct ImagePersister {
    client: reqwest::Client,
}

impl ImagePersister {
    /// 创建新的保存服务
    pub fn new(download_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()
            .context("无法创建 HTTP 客户端")?;
        Ok(Self { client })
    }

    /// 保存候选图片，返回最终文件路径
    ///
    /// # 参数
    /// - `candidate`: 候选图片（被消费）
    /// - `dest_dir`: 输出目录，不存在时创建
    /// - `file_stem`: 文件名（不含扩展名），即规范化 token
    pub async fn persist(
        &self,
        candidate: ImageCandidate,
        dest_dir: &Path,
        file_stem: &str,
    ) -> AcquireResult<PathBuf> {
        let (bytes, extension) = match candidate {
            ImageCandidate::RemoteReference { url } => self.download(&url).await?,
            ImageCandidate::InlineData { mime_type, payload } => decode_inline(&mime_type, &payload)?,
        };

        std::fs::create_dir_all(dest_dir).map_err(|source| AcquireError::Write {
            path: dest_dir.to_path_buf(),
            source,
        })?;

        let target = dest_dir.join(format!("{}.{}", file_stem, extension));
        write_atomically(dest_dir, &target, &bytes)?;
        remove_stale_artifacts(dest_dir, file_stem, &target);

        debug!("已保存 {} ({} 字节)", target.display(), bytes.len());
        Ok(target)
    }

    /// 下载远程图片，返回 (数据, 扩展名)
    async fn download(&self, url: &str) -> AcquireResult<(Vec<u8>, String)> {
        debug!("下载图片: {}", truncate_text(url, 120));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::download(url, format!("HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AcquireError::download(url, e))?;

        if bytes.is_empty() {
            return Err(AcquireError::download(url, "响应内容为空"));
        }

        Ok((bytes.to_vec(), extension_for_mime(content_type.as_deref())))
    }
}

/// 解码内联图片，返回 (数据, 扩展名)
fn decode_inline(mime_type: &str, payload: &str) -> AcquireResult<(Vec<u8>, String)> {
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = INLINE_DECODER
        .decode(cleaned.as_bytes())
        .map_err(AcquireError::decode)?;

    if bytes.is_empty() {
        return Err(AcquireError::decode("内联图片数据为空"));
    }

    Ok((bytes, extension_for_mime(Some(mime_type))))
}

fn write_atomically(dest_dir: &Path, target: &Path, bytes: &[u8]) -> AcquireResult<()> {
    let write_err = |source: std::io::Error| AcquireError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(".tmp")
        .tempfile_in(dest_dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(target).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// 删除同一 token 的其他扩展名文件，保证每个 token 只有一个图片
fn remove_stale_artifacts(dest_dir: &Path, file_stem: &str, keep: &Path) {
    for stale in find_artifacts(dest_dir, file_stem) {
        if stale == keep {
            continue;
        }
        if let Err(e) = std::fs::remove_file(&stale) {
            warn!("删除旧文件失败 {}: {}", stale.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime(Some("image/png")), "png");
        assert_eq!(extension_for_mime(Some("image/jpeg")), "jpeg");
        assert_eq!(extension_for_mime(Some("IMAGE/WebP; charset=binary")), "webp");
        assert_eq!(extension_for_mime(Some("image/svg+xml")), "svg");
        assert_eq!(extension_for_mime(Some("image/x-icon")), "ico");
        assert_eq!(extension_for_mime(Some("application/octet-stream")), "jpeg");
        assert_eq!(extension_for_mime(Some("image/")), "jpeg");
        assert_eq!(extension_for_mime(Some("image/../../etc")), "jpeg");
        assert_eq!(extension_for_mime(Some("garbage")), "jpeg");
        assert_eq!(extension_for_mime(None), "jpeg");
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_dir(&file),
            Err(ConfigError::NotADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn test_persist_inline_png() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ImagePersister::new(Duration::from_secs(5)).unwrap();
        let candidate = ImageCandidate::InlineData {
            mime_type: "image/png".to_string(),
            payload: general_purpose::STANDARD.encode(b"\x89PNG fake"),
        };

        let path = persister
            .persist(candidate, &dir.path().join("out"), "cat")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("out").join("cat.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_persist_inline_without_padding() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ImagePersister::new(Duration::from_secs(5)).unwrap();
        let candidate = ImageCandidate::InlineData {
            mime_type: "image/gif".to_string(),
            payload: "YWJjZA".to_string(),
        };

        let path = persister.persist(candidate, dir.path(), "cat").await.unwrap();

        assert_eq!(path, dir.path().join("cat.gif"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abcd");
    }

    #[tokio::test]
    async fn test_persist_malformed_inline_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let persister = ImagePersister::new(Duration::from_secs(5)).unwrap();
        let candidate = ImageCandidate::InlineData {
            mime_type: "image/png".to_string(),
            payload: "!!!not base64!!!".to_string(),
        };

        let err = persister.persist(candidate, dir.path(), "cat").await.unwrap_err();
        assert!(matches!(err, AcquireError::Decode { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_persist_replaces_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.gif"), b"old").unwrap();
        let persister = ImagePersister::new(Duration::from_secs(5)).unwrap();
        let candidate = ImageCandidate::InlineData {
            mime_type: "image/jpeg".to_string(),
            payload: general_purpose::STANDARD.encode(b"new"),
        };

        persister.persist(candidate, dir.path(), "cat").await.unwrap();

        let artifacts = find_artifacts(dir.path(), "cat");
        assert_eq!(artifacts, vec![dir.path().join("cat.jpeg")]);
    }
}
