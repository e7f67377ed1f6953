//! 教案导出
//!
//! `Document` 直接生成纯文本；PDF 和 PNG 依赖外部光栅化实现（[`SnapshotRenderer`]）。
//! 每次导出只尝试一次，失败返回 `ExportFailed`。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::lesnote::error::ClientError;
use crate::lesnote::notes::models::LessonNote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
    Document,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Document => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
            ExportFormat::Document => "text/plain; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Document => "document",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "png" | "image" => Ok(ExportFormat::Png),
            "document" | "doc" | "txt" => Ok(ExportFormat::Document),
            other => Err(format!("不支持的导出格式: {}", other)),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 光栅化接口：把教案渲染成图片，再把图片嵌入 PDF
pub trait SnapshotRenderer: Send + Sync {
    fn render_png(&self, note: &LessonNote) -> anyhow::Result<Vec<u8>>;

    /// 生成一页 PDF：顶部文字标题，下方为图片
    fn render_pdf(&self, header: &str, png: &[u8]) -> anyhow::Result<Vec<u8>>;
}

#[derive(Clone, Default)]
pub struct NoteExporter {
    renderer: Option<Arc<dyn SnapshotRenderer>>,
}

impl NoteExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(renderer: Arc<dyn SnapshotRenderer>) -> Self {
        Self {
            renderer: Some(renderer),
        }
    }

    pub fn export(&self, note: &LessonNote, format: ExportFormat) -> Result<ExportedFile, ClientError> {
        let bytes = match format {
            ExportFormat::Document => render_document(note).into_bytes(),
            ExportFormat::Png => self.renderer(format)?.render_png(note).map_err(failed)?,
            ExportFormat::Pdf => {
                let renderer = self.renderer(format)?;
                let png = renderer.render_png(note).map_err(failed)?;
                renderer.render_pdf(&header_line(note), &png).map_err(failed)?
            }
        };
        let file = ExportedFile {
            file_name: format!("{}.{}", slugify(&note.title), format.extension()),
            mime_type: format.mime_type(),
            bytes,
        };
        info!(
            "[Export] 📄 导出教案 {} 为 {} ({} 字节)",
            note.id,
            format,
            file.bytes.len()
        );
        Ok(file)
    }

    /// 写入目录，返回文件完整路径
    pub async fn write_to(&self, dir: &Path, file: &ExportedFile) -> Result<PathBuf, ClientError> {
        tokio::fs::create_dir_all(dir).await.map_err(failed)?;
        let path = dir.join(&file.file_name);
        tokio::fs::write(&path, &file.bytes).await.map_err(failed)?;
        Ok(path)
    }

    fn renderer(&self, format: ExportFormat) -> Result<&Arc<dyn SnapshotRenderer>, ClientError> {
        self.renderer.as_ref().ok_or_else(|| {
            warn!("[Export] 未配置渲染器，无法导出 {}", format);
            ClientError::ExportFailed(format!("no renderer is configured for {} export", format))
        })
    }
}

fn failed(e: impl fmt::Display) -> ClientError {
    warn!("[Export] 导出失败: {}", e);
    ClientError::ExportFailed(e.to_string())
}

fn header_line(note: &LessonNote) -> String {
    let mut parts = vec![note.class_name.as_str(), note.subject_name.as_str()];
    if let Some(theme) = note.theme_name.as_deref() {
        parts.push(theme);
    }
    if let Some(topic) = note.topic_name.as_deref() {
        parts.push(topic);
    }
    let scope = parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    if scope.is_empty() {
        note.title.clone()
    } else {
        format!("{} ({})", note.title, scope)
    }
}

/// 纯文本文档：标题、分类、创建时间、正文
pub fn render_document(note: &LessonNote) -> String {
    let mut out = String::new();
    out.push_str(note.title.trim());
    out.push('\n');
    out.push_str(&"=".repeat(note.title.trim().chars().count().max(3)));
    out.push_str("\n\n");

    let fields = [
        ("Class", Some(note.class_name.as_str())),
        ("Subject", Some(note.subject_name.as_str())),
        ("Theme", note.theme_name.as_deref()),
        ("Topic", note.topic_name.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            out.push_str(&format!("{}: {}\n", label, value.trim()));
        }
    }
    if let Some(created) = note.created_at {
        out.push_str(&format!("Created: {}\n", created.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push('\n');
    out.push_str(note.content.trim());
    out.push('\n');
    out
}

/// 标题转文件名：小写字母数字，其余字符合并为 `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "lesson-note".to_string()
    } else {
        slug.to_string()
    }
}
