//! 에러 타입 정의 모듈
//!
//! wconvert에서 발생할 수 있는 모든 에러 타입과 종료 코드를 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// 프로세스 종료 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// 모든 변환 성공
    Success,
    /// 오피스 프로그램을 사용할 수 없음
    ApplicationUnavailable,
    /// 하나 이상의 파일 저장 실패
    SaveFailed,
    /// 원본 경로가 존재하지 않음
    SourceNotFound,
    /// 변환할 수 없는 파일
    InvalidFile,
    /// 그 밖의 치명적 오류
    Critical,
}

impl ExitStatus {
    /// 프로세스 종료 코드
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ApplicationUnavailable => 1,
            ExitStatus::SaveFailed => 2,
            ExitStatus::SourceNotFound => 3,
            ExitStatus::InvalidFile => 4,
            ExitStatus::Critical => 5,
        }
    }
}

/// wconvert에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 원본 경로가 존재하지 않음
    #[error("원본 경로를 찾을 수 없습니다: {path}")]
    SourceNotFound { path: PathBuf },

    /// 원본이 파일도 폴더도 아님
    #[error("원본 경로가 파일이나 폴더가 아닙니다: {path}")]
    InvalidSource { path: PathBuf },

    /// 지원하지 않는 확장자
    #[error("지원하지 않는 파일 형식입니다: {path}")]
    UnsupportedExtension { path: PathBuf },

    /// 출력 파일이 이미 존재 (덮어쓰기 비활성)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 같은 실행에서 다른 원본이 이미 이 출력 경로를 사용함
    #[error("다른 원본 파일과 출력 경로가 겹칩니다: {path}")]
    OutputCollision { path: PathBuf },

    /// 출력 경로가 입력 경로와 같음
    #[error("출력 파일이 원본 파일과 같습니다: {path}")]
    SameAsInput { path: PathBuf },

    /// 오피스 프로그램 실행 불가
    #[error("오피스 프로그램을 사용할 수 없습니다: {reason}")]
    ApplicationUnavailable { reason: String },

    /// 문서 열기 실패
    #[error("문서를 열 수 없습니다 ({file}): {reason}")]
    OpenFailed { file: PathBuf, reason: String },

    /// 다른 이름으로 저장 실패
    #[error("저장 실패 ({file}): {reason}")]
    SaveFailed { file: PathBuf, reason: String },

    /// 대상 형식을 백엔드가 지원하지 않음
    #[error("{format} 형식은 이 오피스 프로그램에서 지원되지 않습니다")]
    FormatUnsupported { format: String },

    /// 파일 시스템 작업 실패
    #[error("파일 작업 실패 ({path}): {reason}")]
    Io { path: PathBuf, reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

impl ConvertError {
    /// 이 에러로 실행이 중단될 때의 종료 상태
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            ConvertError::SourceNotFound { .. } => ExitStatus::SourceNotFound,
            ConvertError::InvalidSource { .. } | ConvertError::UnsupportedExtension { .. } => {
                ExitStatus::InvalidFile
            }
            ConvertError::ApplicationUnavailable { .. } => ExitStatus::ApplicationUnavailable,
            ConvertError::OutputExists { .. }
            | ConvertError::OutputCollision { .. }
            | ConvertError::SameAsInput { .. }
            | ConvertError::OpenFailed { .. }
            | ConvertError::SaveFailed { .. }
            | ConvertError::FormatUnsupported { .. } => ExitStatus::SaveFailed,
            ConvertError::Io { .. } | ConvertError::InvalidPattern { .. } => ExitStatus::Critical,
        }
    }

    /// 배치 전체를 중단해야 하는 에러인지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::ApplicationUnavailable { .. })
    }
}

/// wconvert 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;
