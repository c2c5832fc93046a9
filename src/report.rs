//! 실행 리포트 모듈
//!
//! 배치 실행 결과를 JSON 파일로 기록합니다.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::converter::ConvertResult;
use crate::error::{ConvertError, Result};
use crate::format::TargetFormat;
use crate::stats::Statistics;

/// JSON 실행 리포트
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub source: &'a Path,
    pub format: String,
    pub format_code: u32,
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed_ms: u128,
    pub exit_code: u8,
    pub files: &'a [ConvertResult],
}

impl<'a> RunReport<'a> {
    /// 통계와 파일별 결과로 리포트 생성
    pub fn from_results(
        source: &'a Path,
        format: TargetFormat,
        stats: &Statistics,
        files: &'a [ConvertResult],
    ) -> Self {
        Self {
            source,
            format: format.to_string(),
            format_code: format.format_code(),
            total: stats.total_files,
            converted: stats.get_converted_count(),
            failed: stats.get_failed_count(),
            skipped: stats.get_skipped_count(),
            elapsed_ms: stats.elapsed().as_millis(),
            exit_code: stats.exit_status().code(),
            files,
        }
    }

    /// 리포트를 JSON 파일로 저장
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let io_err = |reason: String| ConvertError::Io {
            path: PathBuf::from(path),
            reason,
        };

        let file = File::create(path).map_err(|e| io_err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| io_err(e.to_string()))?;
        writeln!(writer).map_err(|e| io_err(e.to_string()))?;
        writer.flush().map_err(|e| io_err(e.to_string()))
    }
}
