//! wconvert - WORD DOCUMENT BATCH CONVERTER
//!
//! 레거시 워드 문서(.doc, .dot, .rtf 등)를 외부 오피스 프로그램의
//! "다른 이름으로 저장" 기능으로 일괄 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 📄 **다양한 출력 형식**: docx, pdf, xps, html, rtf
//! - ♻️ **인스턴스 재사용**: 배치 전체에서 오피스 인스턴스 하나만 실행
//! - 🛡️ **출력 보호**: 기존 출력 파일은 `--overwrite` 없이는 건드리지 않음
//! - 🔍 **패턴 필터링**: glob 형식의 포함 필터
//! - 📈 **상세 통계**: 변환/실패/건너뜀 수, 입출력 용량
//! - 🧾 **JSON 리포트**: 파일별 결과 기록
//!
//! 문서 변환 자체는 [`automation::Application`] 구현이 담당하며, 기본 구현은
//! 헤드리스 오피스 프로세스를 실행하는 [`office::OfficeLauncher`]입니다.
//!
//! # 예제
//!
//! ```bash
//! # 폴더의 .doc* 파일을 docx로
//! wconvert ./legacy
//!
//! # 인스턴스 하나로 PDF 변환
//! wconvert ./legacy --format pdf --reuse-instance
//! ```

pub mod automation;
pub mod cli;
pub mod converter;
pub mod error;
pub mod format;
pub mod office;
pub mod pattern;
pub mod report;
pub mod scan;
pub mod stats;

// Re-exports for convenient access
pub use automation::{
    Application, DocumentId, Launcher, OpenDocument, SaveOutcome, SaveState, Session,
};
pub use cli::{Args, FormatArg};
pub use converter::{output_path_for, ConvertOptions, ConvertResult, Converter, FileStatus};
pub use error::{ConvertError, ExitStatus, Result};
pub use format::{is_supported_input, TargetFormat};
pub use office::OfficeLauncher;
pub use pattern::PatternMatcher;
pub use report::RunReport;
pub use scan::{collect_sources, ScanOptions};
pub use stats::{format_bytes, Statistics};
