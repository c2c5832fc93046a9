//! 통계 및 유틸리티 모듈
//!
//! 변환 통계 수집 및 포맷팅을 담당합니다.
//! 배치는 한 스레드에서 순서대로 처리되므로 카운터는 `Cell`로 충분합니다.

use colored::{ColoredString, Colorize};
use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::converter::{ConvertOptions, ConvertResult, FileStatus};
use crate::error::ExitStatus;

/// 변환 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    converted: Cell<usize>,
    failed: Cell<usize>,
    skipped: Cell<usize>,
    /// 변환된 원본의 총 크기
    bytes_read: Cell<u64>,
    /// 생성된 출력의 총 크기
    bytes_written: Cell<u64>,
    start_time: Option<Instant>,
}

fn bump<T: Copy + std::ops::Add<Output = T>>(cell: &Cell<T>, by: T) {
    cell.set(cell.get() + by);
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 처리 결과 반영
    pub fn record(&self, result: &ConvertResult) {
        match result.status {
            FileStatus::Converted => {
                self.increment_converted();
                self.add_bytes_read(result.file_size);
                self.add_bytes_written(result.output_size);
            }
            FileStatus::Failed => self.increment_failed(),
            FileStatus::Skipped => self.increment_skipped(),
        }
    }

    pub fn increment_converted(&self) {
        bump(&self.converted, 1);
    }

    pub fn increment_failed(&self) {
        bump(&self.failed, 1);
    }

    pub fn increment_skipped(&self) {
        bump(&self.skipped, 1);
    }

    pub fn add_bytes_read(&self, bytes: u64) {
        bump(&self.bytes_read, bytes);
    }

    pub fn add_bytes_written(&self, bytes: u64) {
        bump(&self.bytes_written, bytes);
    }

    pub fn get_converted_count(&self) -> usize {
        self.converted.get()
    }

    pub fn get_failed_count(&self) -> usize {
        self.failed.get()
    }

    pub fn get_skipped_count(&self) -> usize {
        self.skipped.get()
    }

    pub fn get_bytes_read(&self) -> u64 {
        self.bytes_read.get()
    }

    pub fn get_bytes_written(&self) -> u64 {
        self.bytes_written.get()
    }

    /// 변환을 시도한 파일 수 (건너뜀 제외)
    pub fn attempted(&self) -> usize {
        self.get_converted_count() + self.get_failed_count()
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 실행 결과에 따른 종료 상태
    pub fn exit_status(&self) -> ExitStatus {
        if self.get_failed_count() > 0 {
            ExitStatus::SaveFailed
        } else {
            ExitStatus::Success
        }
    }

    /// 요약 표의 항목들 (아이콘, 이름, 값)
    pub fn summary_rows(
        &self,
        options: &ConvertOptions,
    ) -> Vec<(ColoredString, &'static str, String)> {
        let format = options.format;
        let mut rows = vec![
            (
                "📄".bright_green(),
                "대상 형식",
                format!(
                    "{} (.{}, 코드 {})",
                    format,
                    format.extension(),
                    format.format_code()
                ),
            ),
            (
                "🖥️".bright_cyan(),
                "인스턴스",
                if options.reuse_instance {
                    "배치 전체 재사용".to_string()
                } else {
                    "파일마다 새로 실행".to_string()
                },
            ),
            ("📁".bright_cyan(), "전체 파일", self.total_files.to_string()),
            (
                "✅".bright_green(),
                "변환",
                self.get_converted_count().to_string().green().to_string(),
            ),
        ];

        let failed = self.get_failed_count();
        let failed_value = if failed > 0 {
            failed.to_string().red()
        } else {
            "0".green()
        };
        rows.push(("❌".bright_red(), "실패", failed_value.to_string()));

        let skipped = self.get_skipped_count();
        if skipped > 0 {
            rows.push((
                "⏭️".bright_yellow(),
                "건너뜀",
                skipped.to_string().yellow().to_string(),
            ));
        }

        let (read, written) = (self.get_bytes_read(), self.get_bytes_written());
        let mut sizes = format!("{} → {}", format_bytes(read), format_bytes(written));
        if read > 0 {
            sizes.push_str(&format!(" ({:.0}%)", written as f64 / read as f64 * 100.0));
        }
        rows.push(("📦".bright_magenta(), "문서 용량", sizes));

        if let Some(dir) = &options.output_dir {
            rows.push(("📂".bright_white(), "출력 폴더", dir.display().to_string()));
        }

        rows.push(("⏱️".bright_cyan(), "처리 시간", format_duration(self.elapsed())));
        rows
    }

    /// 변환 통계 요약 출력
    pub fn print_summary(&self, options: &ConvertOptions) {
        let rule = "═".repeat(50).bright_blue();
        println!("\n{}", rule);
        println!("{}", " 📊 변환 결과".bright_white().bold());
        println!("{}", rule);
        for (icon, label, value) in self.summary_rows(options) {
            println!("  {} {:<10} {}", icon, label, value);
        }
        println!("{}", rule);
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use wconvert::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0 => format!("{}ms", duration.subsec_millis()),
        1..=59 => format!("{:.3}초", duration.as_secs_f64()),
        60..=3599 => format!("{}분 {}초", secs / 60, secs % 60),
        _ => format!("{}시간 {}분", secs / 3600, secs % 3600 / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TargetFormat;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 * 1024), "5120.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_record_results() {
        let stats = Statistics::new(3);

        stats.record(&ConvertResult::converted(
            PathBuf::from("a.doc"),
            PathBuf::from("a.pdf"),
            100,
            40,
        ));
        stats.record(&ConvertResult::failed(
            PathBuf::from("b.doc"),
            None,
            "저장 실패".to_string(),
            50,
        ));
        stats.record(&ConvertResult::skipped(
            PathBuf::from("c.png"),
            "형식".to_string(),
            10,
        ));

        assert_eq!(stats.get_converted_count(), 1);
        assert_eq!(stats.get_failed_count(), 1);
        assert_eq!(stats.get_skipped_count(), 1);
        assert_eq!(stats.attempted(), 2);
        assert_eq!(stats.get_bytes_read(), 100);
        assert_eq!(stats.get_bytes_written(), 40);
        assert_eq!(stats.exit_status(), ExitStatus::SaveFailed);
    }

    #[test]
    fn test_exit_status_success_with_skips() {
        let stats = Statistics::new(2);
        stats.increment_converted();
        stats.increment_skipped();
        assert_eq!(stats.exit_status(), ExitStatus::Success);
    }

    #[test]
    fn test_summary_rows_describe_run() {
        let stats = Statistics::new(2);
        stats.record(&ConvertResult::converted(
            PathBuf::from("a.doc"),
            PathBuf::from("a.pdf"),
            200,
            100,
        ));

        let options = ConvertOptions::new(TargetFormat::Pdf).with_reuse_instance(true);
        let rows = stats.summary_rows(&options);
        let value = |label: &str| {
            rows.iter()
                .find(|(_, l, _)| *l == label)
                .map(|(_, _, v)| v.clone())
        };

        assert_eq!(value("대상 형식").as_deref(), Some("PDF (.pdf, 코드 17)"));
        assert_eq!(value("인스턴스").as_deref(), Some("배치 전체 재사용"));
        assert_eq!(value("문서 용량").as_deref(), Some("200 B → 100 B (50%)"));
        assert!(value("건너뜀").is_none());
        assert!(value("출력 폴더").is_none());

        let per_file = stats.summary_rows(&ConvertOptions::new(TargetFormat::Rtf));
        assert!(per_file
            .iter()
            .any(|(_, l, v)| *l == "인스턴스" && v == "파일마다 새로 실행"));
    }
}
