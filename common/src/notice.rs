//! ユーザー向けの一時通知

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn analysis_complete() -> Self {
        Self::info("Analysis Complete", "Your X-ray has been analyzed successfully")
    }

    pub fn analysis_failed() -> Self {
        Self::error(
            "Analysis Failed",
            "Unable to connect to the API. Please ensure the inference server is running.",
        )
    }

    pub fn report_downloaded() -> Self {
        Self::info("Report Downloaded", "Your PDF report has been generated successfully")
    }

    pub fn report_failed() -> Self {
        Self::error("Report Failed", "The PDF report could not be written")
    }

    pub fn invalid_file_type() -> Self {
        Self::error(
            "Invalid file type",
            "Please upload a valid image file (JPG, PNG, GIF, BMP, WebP)",
        )
    }

    pub fn file_too_large() -> Self {
        Self::error("File too large", "Please upload an image smaller than 10 MB")
    }

    pub fn history_cleared() -> Self {
        Self::info("History Cleared", "All scan history has been removed")
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
