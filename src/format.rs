//! 대상 형식 모듈
//!
//! 대상 형식별 오피스 저장 형식 코드, 출력 확장자, 내보내기 필터를 정의합니다.

use std::fmt;
use std::path::Path;

/// 변환 가능한 입력 파일 확장자 (소문자)
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "docm", "dot", "dotx", "dotm", "rtf", "odt", "wpd", "wps", "txt",
];

/// 변환 대상 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetFormat {
    /// 기본 문서 형식 (docx)
    #[default]
    Document,
    Pdf,
    Xps,
    Html,
    Rtf,
}

impl TargetFormat {
    /// 모든 대상 형식
    pub fn all() -> [TargetFormat; 5] {
        [
            TargetFormat::Document,
            TargetFormat::Pdf,
            TargetFormat::Xps,
            TargetFormat::Html,
            TargetFormat::Rtf,
        ]
    }

    /// 워드 프로세서의 저장 형식 코드
    pub fn format_code(self) -> u32 {
        match self {
            TargetFormat::Document => 16,
            TargetFormat::Pdf => 17,
            TargetFormat::Xps => 18,
            TargetFormat::Html => 8,
            TargetFormat::Rtf => 6,
        }
    }

    /// 출력 파일 확장자 (점 제외)
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Document => "docx",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Xps => "xps",
            TargetFormat::Html => "html",
            TargetFormat::Rtf => "rtf",
        }
    }

    /// 헤드리스 오피스의 `--convert-to` 필터
    ///
    /// 오피스가 내보낼 수 없는 형식은 `None`입니다.
    pub fn export_filter(self) -> Option<&'static str> {
        match self {
            TargetFormat::Document => Some("docx:MS Word 2007 XML"),
            TargetFormat::Pdf => Some("pdf:writer_pdf_Export"),
            TargetFormat::Xps => None,
            TargetFormat::Html => Some("html:HTML (StarWriter)"),
            TargetFormat::Rtf => Some("rtf:Rich Text Format"),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Document => write!(f, "Document"),
            TargetFormat::Pdf => write!(f, "PDF"),
            TargetFormat::Xps => write!(f, "XPS"),
            TargetFormat::Html => write!(f, "HTML"),
            TargetFormat::Rtf => write!(f, "RTF"),
        }
    }
}

/// 파일 확장자가 변환 가능한 입력 형식인지 확인
///
/// # Examples
/// ```
/// use std::path::Path;
/// use wconvert::format::is_supported_input;
///
/// assert!(is_supported_input(Path::new("report.DOC")));
/// assert!(!is_supported_input(Path::new("image.png")));
/// ```
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table() {
        assert_eq!(TargetFormat::Document.format_code(), 16);
        assert_eq!(TargetFormat::Pdf.format_code(), 17);
        assert_eq!(TargetFormat::Xps.format_code(), 18);
        assert_eq!(TargetFormat::Html.format_code(), 8);
        assert_eq!(TargetFormat::Rtf.format_code(), 6);

        assert_eq!(TargetFormat::Document.extension(), "docx");
        assert_eq!(TargetFormat::Html.extension(), "html");
    }

    #[test]
    fn test_xps_has_no_office_filter() {
        assert!(TargetFormat::Xps.export_filter().is_none());
        for format in TargetFormat::all() {
            if let Some(filter) = format.export_filter() {
                assert!(filter.starts_with(format.extension()));
            }
        }
    }

    #[test]
    fn test_is_supported_input() {
        assert!(is_supported_input(Path::new("a.doc")));
        assert!(is_supported_input(Path::new("dir/b.Dot")));
        assert!(is_supported_input(Path::new("c.rtf")));
        assert!(!is_supported_input(Path::new("d.pdf")));
        assert!(!is_supported_input(Path::new("noext")));
    }
}
