//! wconvert - WORD DOCUMENT BATCH CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use wconvert::{
    cli::Args,
    converter::{output_path_for, ConvertResult, Converter, FileStatus},
    error::{ConvertError, ExitStatus},
    format::is_supported_input,
    office::OfficeLauncher,
    report::RunReport,
    scan::collect_sources,
    stats::Statistics,
};

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args);

    match run(&args) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            let status = e
                .downcast_ref::<ConvertError>()
                .map(ConvertError::exit_status)
                .unwrap_or(ExitStatus::Critical);
            eprintln!("{} {:#}", "❌".bright_red(), e);
            ExitCode::from(status.code())
        }
    }
}

/// 로깅 초기화 (RUST_LOG가 있으면 우선)
fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_level(args))),
        )
        .with_writer(io::stderr)
        .init();
}

/// 옵션에 따른 기본 로그 레벨
fn default_log_level(args: &Args) -> &'static str {
    if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    }
}

/// 전체 실행
fn run(args: &Args) -> Result<ExitStatus> {
    // 원본 확인 및 파일 수집
    let files = collect_sources(&args.scan_options())?;

    if !args.quiet {
        print_header(args);
    }

    if files.is_empty() {
        if !args.quiet {
            println!("{}", "⚠️ 변환할 파일이 없습니다.".yellow());
        }
        return Ok(ExitStatus::Success);
    }

    if !args.quiet {
        println!(
            "  {} 발견된 파일 수: {}",
            "📋".bright_white(),
            files.len().to_string().bright_green()
        );
    }

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(args, &files);
        return Ok(ExitStatus::Success);
    }

    // 오피스 실행 파일 확인
    let launcher = OfficeLauncher::locate(args.office.as_deref())?;
    tracing::debug!(program = %launcher.program().display(), "오피스 실행 파일");

    run_conversion(args, &launcher, files)
}

/// 변환 모드 실행
fn run_conversion(
    args: &Args,
    launcher: &OfficeLauncher,
    files: Vec<PathBuf>,
) -> Result<ExitStatus> {
    let stats = Statistics::new(files.len());
    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        println!("\n{}", "⚡ 변환 중...".bright_cyan());
        create_progress_bar(files.len())
    };

    let options = args.convert_options();
    let converter = Converter::new(launcher, options.clone());
    let results = converter.run(&files, &stats, |result| {
        pb.inc(1);
        if args.verbose {
            pb.println(format_result_line(result));
        }
    })?;

    pb.finish_with_message("완료!");

    let errors: Vec<(PathBuf, String)> = results
        .iter()
        .filter(|r| r.status == FileStatus::Failed)
        .map(|r| (r.path.clone(), r.error.clone().unwrap_or_default()))
        .collect();

    if !args.quiet {
        print_errors(&errors, args.verbose);
    }

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)
            .with_context(|| format!("에러 로그 작성 실패: {:?}", log_path))?;
        if !args.quiet {
            println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);
        }
    }

    // JSON 리포트 작성
    if let Some(ref report_path) = args.report {
        RunReport::from_results(&args.source, args.target_format(), &stats, &results)
            .write_to(report_path)?;
        if !args.quiet {
            println!("{} 리포트 저장: {:?}", "🧾".bright_cyan(), report_path);
        }
    }

    let status = stats.exit_status();

    if !args.quiet {
        stats.print_summary(&options);

        if status == ExitStatus::Success {
            println!("\n{} 변환 완료!\n", "✅".bright_green());
        } else {
            println!(
                "\n{} {} 개의 파일을 변환하지 못했습니다.\n",
                "⚠️".bright_yellow(),
                stats.get_failed_count().to_string().red()
            );
        }
    }

    Ok(status)
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 WORD DOCUMENT BATCH CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 원본: {:?}", "📂".bright_cyan(), args.source);

    if args.source.is_dir() {
        println!("  {} 포함 필터: {}", "🔍".bright_magenta(), args.include);
    }

    println!("  {} 대상 형식: {}", "📄".bright_green(), args.format);

    if let Some(ref dir) = args.output_dir {
        println!("  {} 출력 폴더: {:?}", "📁".bright_green(), dir);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.overwrite {
        println!("  {} {}", "⚠️".bright_yellow(), "기존 출력 덮어쓰기".yellow());
    }

    if args.reuse_instance {
        println!("  {} {}", "♻️".bright_cyan(), "인스턴스 재사용".cyan());
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(args: &Args, files: &[PathBuf]) {
    println!("\n{}", "📋 변환 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        let name = path.file_name().unwrap_or_default();
        if is_supported_input(path) {
            let output = output_path_for(
                path,
                args.target_format(),
                args.output_dir.as_deref(),
                Some(&args.source),
            );
            println!("  {}. {:?} → {:?}", i + 1, name, output);
        } else {
            println!("  {}. {:?} {}", i + 1, name, "(건너뜀)".dimmed());
        }
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 파일별 결과 한 줄
fn format_result_line(result: &ConvertResult) -> String {
    let name = result.path.file_name().unwrap_or_default();
    match result.status {
        FileStatus::Converted => format!("  {} {:?}", "✓".green(), name),
        FileStatus::Skipped => format!("  {} {:?}", "-".yellow(), name),
        FileStatus::Failed => format!("  {} {:?}", "✗".red(), name),
    }
}

/// 에러 목록 출력
fn print_errors(errors: &[(PathBuf, String)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 변환 실패 파일:".bright_red());
    for (path, error) in errors {
        println!("  {} {:?}", "•".red(), path.file_name().unwrap_or_default());
        if verbose {
            println!("    {}", error.dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[(PathBuf, String)]) -> Result<()> {
    let mut log_file = File::create(log_path)?;

    writeln!(log_file, "wconvert 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for (path, error) in errors {
        writeln!(log_file, "\n파일: {:?}", path)?;
        writeln!(log_file, "에러: {}", error)?;
    }

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
