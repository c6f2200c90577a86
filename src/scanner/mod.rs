use crate::error::{PneumoScanError, Result};
use image::ImageFormat;
use pneumoscan_common::ImageFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `sniff_mime_type` が受け付ける形式の拡張子（大文字小文字は区別しない）
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// アップロード上限（10MB）
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// 画像ファイルを読み込む。中身から形式を判定し、画像以外は拒否する。
pub fn load_image(path: &Path) -> Result<ImageFile> {
    if !path.is_file() {
        return Err(PneumoScanError::FileNotFound(path.display().to_string()));
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(PneumoScanError::FileTooLarge {
            path: path.display().to_string(),
            size,
        });
    }

    let bytes = std::fs::read(path)?;
    let mime_type = sniff_mime_type(&bytes)
        .ok_or_else(|| PneumoScanError::InvalidImage(path.display().to_string()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ImageFile::new(file_name, mime_type, bytes))
}

/// 先頭バイトから画像のMIMEタイプを判定
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// フォルダ直下の画像を名前順に列挙（一括スキャン用）
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(PneumoScanError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}
