//! 문서 변환 모듈
//!
//! 개별 파일의 출력 경로 결정, 기존 출력 처리, 오피스 저장 호출과
//! 파일 단위 순차 배치 실행을 담당합니다.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::automation::{Application, Launcher, SaveOutcome, SaveState, Session};
use crate::error::{ConvertError, Result};
use crate::format::{is_supported_input, TargetFormat};
use crate::stats::Statistics;

/// 파일 처리 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Converted,
    Skipped,
    Failed,
}

/// 파일 처리 결과
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    /// 원본 파일 경로
    pub path: PathBuf,
    /// 출력 파일 경로 (결정된 경우)
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    /// 건너뜀/실패 사유
    pub error: Option<String>,
    /// 원본 파일 크기
    pub file_size: u64,
    /// 출력 파일 크기
    pub output_size: u64,
}

impl ConvertResult {
    /// 변환 성공 결과 생성
    pub fn converted(path: PathBuf, output: PathBuf, file_size: u64, output_size: u64) -> Self {
        Self {
            path,
            output: Some(output),
            status: FileStatus::Converted,
            error: None,
            file_size,
            output_size,
        }
    }

    /// 건너뜀 결과 생성
    pub fn skipped(path: PathBuf, reason: String, file_size: u64) -> Self {
        Self {
            path,
            output: None,
            status: FileStatus::Skipped,
            error: Some(reason),
            file_size,
            output_size: 0,
        }
    }

    /// 실패 결과 생성
    pub fn failed(path: PathBuf, output: Option<PathBuf>, error: String, file_size: u64) -> Self {
        Self {
            path,
            output,
            status: FileStatus::Failed,
            error: Some(error),
            file_size,
            output_size: 0,
        }
    }

    pub fn is_converted(&self) -> bool {
        self.status == FileStatus::Converted
    }
}

/// 변환 옵션
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// 대상 형식
    pub format: TargetFormat,
    /// 기존 출력 파일 덮어쓰기
    pub overwrite: bool,
    /// 배치 전체에서 인스턴스 하나를 재사용
    pub reuse_instance: bool,
    /// 출력 폴더 (None이면 원본 옆)
    pub output_dir: Option<PathBuf>,
    /// 출력 폴더 아래에 하위 폴더 구조를 재현할 기준 폴더
    pub source_root: Option<PathBuf>,
}

impl ConvertOptions {
    pub fn new(format: TargetFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_reuse_instance(mut self, reuse_instance: bool) -> Self {
        self.reuse_instance = reuse_instance;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_source_root(mut self, source_root: Option<PathBuf>) -> Self {
        self.source_root = source_root;
        self
    }
}

/// 출력 파일 경로 결정
///
/// 원본 확장자를 대상 형식의 확장자로 바꿉니다. `output_dir`이 주어지면
/// 그 폴더 아래로 옮기며, 원본이 `source_root` 하위 폴더에 있으면 같은
/// 상대 경로를 유지합니다.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use wconvert::converter::output_path_for;
/// use wconvert::format::TargetFormat;
///
/// let out = output_path_for(Path::new("docs/letter.doc"), TargetFormat::Pdf, None, None);
/// assert_eq!(out, PathBuf::from("docs/letter.pdf"));
///
/// let out = output_path_for(
///     Path::new("docs/2019/letter.doc"),
///     TargetFormat::Pdf,
///     Some(Path::new("out")),
///     Some(Path::new("docs")),
/// );
/// assert_eq!(out, PathBuf::from("out/2019/letter.pdf"));
/// ```
pub fn output_path_for(
    input: &Path,
    format: TargetFormat,
    output_dir: Option<&Path>,
    source_root: Option<&Path>,
) -> PathBuf {
    let renamed = input.with_extension(format.extension());
    let (dir, name) = match (output_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => return renamed,
    };

    let relative = source_root
        .and_then(|root| input.parent()?.strip_prefix(root).ok())
        .filter(|rel| !rel.as_os_str().is_empty());

    match relative {
        Some(rel) => dir.join(rel).join(name),
        None => dir.join(name),
    }
}

/// 저장 전 단계의 결과
enum Prepared {
    /// 저장할 준비가 됨
    Ready { output: PathBuf, file_size: u64 },
    /// 저장 없이 결과가 정해짐 (건너뜀 또는 실패)
    Done(ConvertResult),
}

/// 순차 배치 변환기
pub struct Converter<'a, L: Launcher> {
    launcher: &'a L,
    options: ConvertOptions,
    /// 이번 실행에서 이미 배정된 출력 경로
    claimed: RefCell<HashSet<PathBuf>>,
}

impl<'a, L: Launcher> Converter<'a, L> {
    pub fn new(launcher: &'a L, options: ConvertOptions) -> Self {
        Self {
            launcher,
            options,
            claimed: RefCell::new(HashSet::new()),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// 파일 목록 전체 변환
    ///
    /// 파일 단위 실패는 결과에 기록하고 계속 진행합니다. 오피스를 사용할 수
    /// 없게 되면 즉시 중단하고 에러를 반환하며, 그때까지 시작된 인스턴스는
    /// 모두 해제됩니다.
    ///
    /// 인스턴스 재사용 시 백엔드가 미뤄 둔 저장은 목록을 모두 연 뒤 한 번에
    /// 처리되므로, 그 파일들의 `on_file` 호출은 배치 끝에 몰려서 옵니다.
    /// 반환되는 결과는 항상 `files` 순서입니다.
    pub fn run<F>(
        &self,
        files: &[PathBuf],
        stats: &Statistics,
        mut on_file: F,
    ) -> Result<Vec<ConvertResult>>
    where
        F: FnMut(&ConvertResult),
    {
        if let Some(dir) = &self.options.output_dir {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }

        let mut report = |result: &ConvertResult| {
            stats.record(result);
            on_file(result);
        };

        if !self.options.reuse_instance || files.is_empty() {
            let mut results = Vec::with_capacity(files.len());
            for path in files {
                let result = self.convert_file(None, path)?;
                report(&result);
                results.push(result);
            }
            return Ok(results);
        }

        let format = self.options.format;
        let mut session = Session::start(self.launcher)?;
        let mut results: Vec<Option<ConvertResult>> = Vec::with_capacity(files.len());
        let mut queued = Vec::new();

        for path in files {
            let (output, file_size) = match self.prepare(path) {
                Prepared::Ready { output, file_size } => (output, file_size),
                Prepared::Done(result) => {
                    report(&result);
                    results.push(Some(result));
                    continue;
                }
            };

            match save_with(&mut session, path, &output, format) {
                Ok(SaveState::Pending) => {
                    queued.push((results.len(), path, output, file_size));
                    results.push(None);
                }
                saved => {
                    let result = self.finish(path, output, file_size, saved.map(|_| ()))?;
                    report(&result);
                    results.push(Some(result));
                }
            }
        }

        let mut outcomes = session.flush()?;
        for (index, path, output, file_size) in queued {
            let saved = take_outcome(&mut outcomes, path, &output);
            let result = self.finish(path, output, file_size, saved)?;
            report(&result);
            results[index] = Some(result);
        }
        session.close();

        Ok(results.into_iter().flatten().collect())
    }

    /// 단일 파일 변환
    ///
    /// `shared`가 None이면 이 파일만을 위한 인스턴스를 시작하고 끝나면 해제합니다.
    /// 백엔드가 저장을 미루면 바로 flush하여 결과를 확정합니다.
    /// 반환되는 에러는 배치를 중단해야 하는 경우뿐입니다.
    pub fn convert_file(
        &self,
        shared: Option<&mut Session<L::App>>,
        path: &Path,
    ) -> Result<ConvertResult> {
        let (output, file_size) = match self.prepare(path) {
            Prepared::Ready { output, file_size } => (output, file_size),
            Prepared::Done(result) => return Ok(result),
        };

        let format = self.options.format;
        let saved = match shared {
            Some(session) => save_now(session, path, &output, format),
            None => {
                let mut session = Session::start(self.launcher)?;
                let saved = save_now(&mut session, path, &output, format);
                session.close();
                saved
            }
        };

        self.finish(path, output, file_size, saved)
    }

    /// 형식 확인과 출력 경로 준비
    fn prepare(&self, path: &Path) -> Prepared {
        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        if !is_supported_input(path) {
            let reason = ConvertError::UnsupportedExtension {
                path: path.to_path_buf(),
            }
            .to_string();
            warn!(file = %path.display(), "지원하지 않는 형식, 건너뜀");
            return Prepared::Done(ConvertResult::skipped(path.to_path_buf(), reason, file_size));
        }

        match self.prepare_output(path) {
            Ok(output) => Prepared::Ready { output, file_size },
            Err(e) => {
                warn!(file = %path.display(), error = %e, "출력 준비 실패");
                Prepared::Done(ConvertResult::failed(
                    path.to_path_buf(),
                    None,
                    e.to_string(),
                    file_size,
                ))
            }
        }
    }

    /// 출력 경로 결정 및 기존 파일 처리
    fn prepare_output(&self, input: &Path) -> Result<PathBuf> {
        let output = output_path_for(
            input,
            self.options.format,
            self.options.output_dir.as_deref(),
            self.options.source_root.as_deref(),
        );

        if output == input {
            return Err(ConvertError::SameAsInput { path: output });
        }

        // 이번 실행에서 만든 출력은 덮어쓰기 대상이 아님
        if !self.claimed.borrow_mut().insert(output.clone()) {
            return Err(ConvertError::OutputCollision { path: output });
        }

        if output.exists() {
            if same_file(input, &output) {
                return Err(ConvertError::SameAsInput { path: output });
            }
            if !self.options.overwrite {
                return Err(ConvertError::OutputExists { path: output });
            }
            fs::remove_file(&output).map_err(|e| io_error(&output, e))?;
            debug!(output = %output.display(), "기존 출력 파일 삭제");
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        Ok(output)
    }

    /// 저장 결과 확정
    fn finish(
        &self,
        path: &Path,
        output: PathBuf,
        file_size: u64,
        saved: Result<()>,
    ) -> Result<ConvertResult> {
        match saved.and_then(|()| verify_output(path, &output)) {
            Ok(output_size) => {
                debug!(file = %path.display(), output = %output.display(), "변환 완료");
                Ok(ConvertResult::converted(
                    path.to_path_buf(),
                    output,
                    file_size,
                    output_size,
                ))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "변환 실패");
                Ok(ConvertResult::failed(
                    path.to_path_buf(),
                    Some(output),
                    e.to_string(),
                    file_size,
                ))
            }
        }
    }
}

/// 문서를 열어 저장하고 닫기
fn save_with<A: Application>(
    session: &mut Session<A>,
    input: &Path,
    output: &Path,
    format: TargetFormat,
) -> Result<SaveState> {
    let mut doc = session.open(input)?;
    doc.save_as(output, format)
}

/// 저장이 미뤄졌으면 바로 flush하여 결과 확정
fn save_now<A: Application>(
    session: &mut Session<A>,
    input: &Path,
    output: &Path,
    format: TargetFormat,
) -> Result<()> {
    match save_with(session, input, output, format)? {
        SaveState::Done => Ok(()),
        SaveState::Pending => {
            let mut outcomes = session.flush()?;
            take_outcome(&mut outcomes, input, output)
        }
    }
}

/// flush 결과에서 해당 저장 요청의 결과 꺼내기
fn take_outcome(outcomes: &mut Vec<SaveOutcome>, input: &Path, output: &Path) -> Result<()> {
    match outcomes
        .iter()
        .position(|o| o.input == input && o.output == output)
    {
        Some(i) => outcomes.swap_remove(i).result,
        None => Err(ConvertError::SaveFailed {
            file: input.to_path_buf(),
            reason: "저장 요청이 처리되지 않았습니다".to_string(),
        }),
    }
}

/// 저장 후 출력 파일 존재 확인
fn verify_output(input: &Path, output: &Path) -> Result<u64> {
    match fs::metadata(output) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        _ => Err(ConvertError::SaveFailed {
            file: input.to_path_buf(),
            reason: format!("출력 파일이 생성되지 않았습니다: {}", output.display()),
        }),
    }
}

fn io_error(path: &Path, e: std::io::Error) -> ConvertError {
    ConvertError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// 대소문자를 구분하지 않는 파일 시스템에서 같은 파일인지 확인
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
