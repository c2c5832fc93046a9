//! 원본 탐색 모듈
//!
//! 원본 경로(파일 또는 폴더)에서 변환할 파일 목록을 수집합니다.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};
use crate::format::is_supported_input;
use crate::pattern::PatternMatcher;

/// 탐색 옵션
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 원본 파일 또는 폴더
    pub source: PathBuf,
    /// 폴더 모드 포함 필터
    pub include: Option<String>,
    /// 하위 폴더 탐색 여부
    pub recurse: bool,
    /// 최대 탐색 깊이 (recurse일 때만 사용)
    pub max_depth: Option<usize>,
}

impl ScanOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            include: None,
            recurse: false,
            max_depth: None,
        }
    }

    pub fn with_include(mut self, include: Option<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// 원본 경로 유효성 검사
///
/// 단일 파일이 지원하지 않는 형식이면 `UnsupportedExtension`을 반환합니다.
pub fn validate_source(source: &Path) -> Result<()> {
    if !source.exists() {
        return Err(ConvertError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }

    if source.is_file() {
        if !is_supported_input(source) {
            return Err(ConvertError::UnsupportedExtension {
                path: source.to_path_buf(),
            });
        }
    } else if !source.is_dir() {
        return Err(ConvertError::InvalidSource {
            path: source.to_path_buf(),
        });
    }

    Ok(())
}

/// 변환 대상 파일 수집
///
/// 단일 파일이면 그 파일만, 폴더면 포함 필터와 일치하는 파일을 이름 순으로
/// 반환합니다. 지원하지 않는 확장자도 목록에 남겨 두며, 변환 단계에서
/// 건너뜀으로 집계됩니다.
pub fn collect_sources(options: &ScanOptions) -> Result<Vec<PathBuf>> {
    validate_source(&options.source)?;

    if options.source.is_file() {
        return Ok(vec![options.source.clone()]);
    }

    let matcher = PatternMatcher::new(options.include.clone())?;

    let depth = if options.recurse {
        options.max_depth.unwrap_or(usize::MAX)
    } else {
        1
    };

    let files: Vec<PathBuf> = WalkDir::new(&options.source)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|s| matcher.matches(s))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    debug!(
        source = %options.source.display(),
        count = files.len(),
        "원본 파일 수집 완료"
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"{\\rtf1}").unwrap();
        path
    }

    #[test]
    fn test_collect_with_include() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.doc");
        touch(temp_dir.path(), "b.docx");
        touch(temp_dir.path(), "c.rtf");
        touch(temp_dir.path(), "notes.txt");

        let options = ScanOptions::new(temp_dir.path()).with_include(Some("*.doc*".to_string()));
        let files = collect_sources(&options).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.doc"));
        assert!(files[1].ends_with("b.docx"));
    }

    #[test]
    fn test_collect_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "only.rtf");

        let files = collect_sources(&ScanOptions::new(&path)).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_single_file_unsupported() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "picture.png");

        let result = collect_sources(&ScanOptions::new(&path));
        assert!(matches!(
            result,
            Err(ConvertError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_missing_source() {
        let result = collect_sources(&ScanOptions::new("/nonexistent/wconvert/source"));
        assert!(matches!(result, Err(ConvertError::SourceNotFound { .. })));
    }

    #[test]
    fn test_recurse_and_depth() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        let deep = sub.join("deep");
        fs::create_dir_all(&deep).unwrap();
        touch(temp_dir.path(), "root.doc");
        touch(&sub, "level1.doc");
        touch(&deep, "level2.doc");

        let flat = collect_sources(&ScanOptions::new(temp_dir.path())).unwrap();
        assert_eq!(flat.len(), 1);

        let all = collect_sources(&ScanOptions::new(temp_dir.path()).with_recurse(true)).unwrap();
        assert_eq!(all.len(), 3);

        // max_depth = 2: 루트와 한 단계 아래까지
        let limited = collect_sources(
            &ScanOptions::new(temp_dir.path())
                .with_recurse(true)
                .with_max_depth(Some(2)),
        )
        .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
