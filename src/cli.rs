//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::converter::ConvertOptions;
use crate::format::TargetFormat;
use crate::pattern::DEFAULT_INCLUDE;
use crate::scan::ScanOptions;

/// 대상 형식 인자
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum FormatArg {
    /// 기본 문서 형식 (.docx)
    #[default]
    Document,
    /// PDF (.pdf)
    Pdf,
    /// XPS (.xps)
    Xps,
    /// HTML (.html)
    Html,
    /// RTF (.rtf)
    Rtf,
}

impl From<FormatArg> for TargetFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Document => TargetFormat::Document,
            FormatArg::Pdf => TargetFormat::Pdf,
            FormatArg::Xps => TargetFormat::Xps,
            FormatArg::Html => TargetFormat::Html,
            FormatArg::Rtf => TargetFormat::Rtf,
        }
    }
}

impl std::fmt::Display for FormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", TargetFormat::from(*self))
    }
}

/// wconvert CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "wconvert",
    author = "YourName <your@email.com>",
    version,
    about = "WORD DOCUMENT BATCH CONVERTER - 레거시 워드 문서를 오피스 프로그램으로 일괄 변환하는 CLI 도구",
    long_about = r#"
WORD DOCUMENT BATCH CONVERTER
=============================

지정된 파일 또는 폴더의 워드 문서(.doc, .dot, .rtf 등)를
오피스 프로그램의 "다른 이름으로 저장" 기능으로 변환합니다.

특징:
  • docx / pdf / xps / html / rtf 출력
  • 인스턴스 재사용으로 대량 변환 가속
  • 기존 출력 파일 보호 (--overwrite로 덮어쓰기)
  • 상세한 오류 보고 및 JSON 리포트

종료 코드:
  0 성공, 1 오피스 사용 불가, 2 저장 실패,
  3 원본 없음, 4 잘못된 파일, 5 치명적 오류

예제:
  wconvert ./legacy
  wconvert ./legacy --format pdf --reuse-instance
  wconvert ./legacy --include "*.rtf" --format document --overwrite
  wconvert ./letter.dot --format html -o ./out
"#
)]
pub struct Args {
    /// 변환할 파일 또는 폴더 경로
    pub source: PathBuf,

    /// 폴더 모드 파일 이름 필터 (glob 형식, 예: "*.doc", "*.rtf")
    #[arg(short, long, default_value = DEFAULT_INCLUDE)]
    pub include: String,

    /// 대상 형식
    #[arg(short, long, value_enum, default_value_t = FormatArg::Document)]
    pub format: FormatArg,

    /// 기존 출력 파일 덮어쓰기
    #[arg(long)]
    pub overwrite: bool,

    /// 모든 파일에 오피스 인스턴스 하나를 재사용
    #[arg(long)]
    pub reuse_instance: bool,

    /// 헤더, 진행률, 통계 출력 생략
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 하위 폴더까지 탐색
    #[arg(short, long)]
    pub recurse: bool,

    /// 최대 폴더 탐색 깊이 (--recurse와 함께 사용)
    #[arg(long, requires = "recurse")]
    pub max_depth: Option<usize>,

    /// 출력 폴더 (기본값: 원본 파일과 같은 폴더)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// JSON 실행 리포트 파일 경로
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// 오피스 실행 파일 경로 (기본값: PATH의 soffice)
    #[arg(long, env = "WCONVERT_OFFICE")]
    pub office: Option<PathBuf>,
}

impl Args {
    /// 대상 형식
    pub fn target_format(&self) -> TargetFormat {
        self.format.into()
    }

    /// 탐색 옵션 생성
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(&self.source)
            .with_include(Some(self.include.clone()))
            .with_recurse(self.recurse)
            .with_max_depth(self.max_depth)
    }

    /// 변환 옵션 생성
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::new(self.target_format())
            .with_overwrite(self.overwrite)
            .with_reuse_instance(self.reuse_instance)
            .with_output_dir(self.output_dir.clone())
            .with_source_root(Some(self.source.clone()))
    }
}
