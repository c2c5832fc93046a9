//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 포함 필터(파일 이름 필터링)를 담당합니다.

use glob::{MatchOptions, Pattern};

use crate::error::{ConvertError, Result};

/// 포함 필터 기본값
pub const DEFAULT_INCLUDE: &str = "*.doc*";

/// 컴파일된 패턴 매처
#[derive(Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 파일 매칭)
    ///
    /// # Examples
    /// ```
    /// use wconvert::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("*.doc".to_string())).unwrap();
    /// assert!(matcher.matches("report.DOC"));
    /// assert!(!matcher.matches("report.rtf"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| ConvertError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (대소문자 무시)
    pub fn matches(&self, file_name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        match &self.pattern {
            Some(p) => p.matches_with(file_name, options),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}
