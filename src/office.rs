//! 헤드리스 오피스 백엔드 모듈
//!
//! `soffice`(LibreOffice)를 헤드리스 모드로 실행하여 문서를 변환합니다.
//!
//! 저장 요청은 인스턴스 안에 쌓아 두었다가 flush 시 `--convert-to` 프로세스
//! 하나로 모두 변환합니다. 인스턴스 재사용 모드에서는 배치 전체가 오피스
//! 프로세스 하나로 처리됩니다. 인스턴스마다 전용 사용자 프로필과 작업 폴더를
//! 사용하며, 인스턴스가 종료되면 둘 다 삭제됩니다.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::automation::{Application, DocumentId, Launcher, SaveOutcome, SaveState};
use crate::error::{ConvertError, Result};
use crate::format::TargetFormat;

/// PATH에서 찾아볼 실행 파일 이름
const OFFICE_CANDIDATES: &[&str] = &["soffice", "libreoffice"];

/// 헤드리스 오피스 인스턴스 실행기
#[derive(Debug, Clone)]
pub struct OfficeLauncher {
    program: PathBuf,
}

impl OfficeLauncher {
    /// 지정된 실행 파일로 실행기 생성 (존재 여부는 확인하지 않음)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 오피스 실행 파일 찾기
    ///
    /// `explicit`이 주어지면 그 경로(또는 PATH 상의 이름)를, 아니면
    /// `soffice`, `libreoffice` 순으로 PATH에서 찾습니다.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(program) = explicit {
            if program.is_file() {
                return Ok(Self::new(program));
            }
            return which::which(program).map(Self::new).map_err(|e| {
                ConvertError::ApplicationUnavailable {
                    reason: format!("{}: {}", program.display(), e),
                }
            });
        }

        OFFICE_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
            .ok_or_else(|| ConvertError::ApplicationUnavailable {
                reason: "PATH에서 soffice/libreoffice를 찾을 수 없습니다".to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Launcher for OfficeLauncher {
    type App = OfficeApplication;

    /// 프로필과 작업 폴더 준비 (오피스 프로세스는 flush 때 실행)
    fn launch(&self) -> Result<OfficeApplication> {
        if !self.program.is_file() {
            return Err(ConvertError::ApplicationUnavailable {
                reason: format!("실행 파일이 없습니다: {}", self.program.display()),
            });
        }

        let unavailable = |e: std::io::Error| ConvertError::ApplicationUnavailable {
            reason: format!("작업 폴더 생성 실패: {}", e),
        };
        let profile = tempfile::Builder::new()
            .prefix("wconvert-profile-")
            .tempdir()
            .map_err(unavailable)?;
        let work = tempfile::Builder::new()
            .prefix("wconvert-work-")
            .tempdir()
            .map_err(unavailable)?;

        debug!(
            program = %self.program.display(),
            profile = %profile.path().display(),
            "오피스 인스턴스 준비"
        );

        Ok(OfficeApplication {
            program: self.program.clone(),
            dirs: Some(InstanceDirs { profile, work }),
            documents: HashMap::new(),
            pending: Vec::new(),
            next_id: 0,
            processes: 0,
        })
    }
}

/// 인스턴스 전용 임시 폴더
struct InstanceDirs {
    profile: TempDir,
    /// 복사된 입력(`in-*`)과 변환 결과(`out/`)
    work: TempDir,
}

/// 열린 문서: 원본 경로와 작업 폴더에 복사된 입력
struct OpenedDocument {
    input: PathBuf,
    staged: PathBuf,
}

/// flush를 기다리는 저장 요청
struct PendingSave {
    input: PathBuf,
    staged: PathBuf,
    output: PathBuf,
    format: TargetFormat,
}

/// 실행된 헤드리스 오피스 인스턴스
pub struct OfficeApplication {
    program: PathBuf,
    dirs: Option<InstanceDirs>,
    documents: HashMap<DocumentId, OpenedDocument>,
    pending: Vec<PendingSave>,
    next_id: u64,
    processes: usize,
}

impl OfficeApplication {
    /// 지금까지 실행한 오피스 프로세스 수
    pub fn processes_spawned(&self) -> usize {
        self.processes
    }

    fn dirs(&self) -> Result<&InstanceDirs> {
        self.dirs
            .as_ref()
            .ok_or_else(|| ConvertError::ApplicationUnavailable {
                reason: "이미 종료된 인스턴스입니다".to_string(),
            })
    }

    /// 같은 형식의 요청을 프로세스 하나로 변환하고 결과를 최종 위치로 이동
    fn convert_group(
        &mut self,
        format: TargetFormat,
        group: Vec<PendingSave>,
    ) -> Result<Vec<SaveOutcome>> {
        let filter = format
            .export_filter()
            .ok_or_else(|| ConvertError::FormatUnsupported {
                format: format.to_string(),
            })?;

        let dirs = self.dirs()?;
        let out_dir = dirs.work.path().join("out");
        fs::create_dir_all(&out_dir).map_err(|e| ConvertError::Io {
            path: out_dir.clone(),
            reason: e.to_string(),
        })?;

        let output = Command::new(&self.program)
            .arg(format!(
                "-env:UserInstallation={}",
                file_url(dirs.profile.path())
            ))
            .args(["--headless", "--invisible", "--norestore", "--nologo"])
            .arg("--convert-to")
            .arg(filter)
            .arg("--outdir")
            .arg(&out_dir)
            .args(group.iter().map(|p| &p.staged))
            .output()
            .map_err(|e| ConvertError::ApplicationUnavailable {
                reason: format!("{} 실행 실패: {}", self.program.display(), e),
            })?;
        self.processes += 1;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(
            files = group.len(),
            status = ?output.status.code(),
            "오피스 변환 프로세스 종료"
        );

        let outcomes = group
            .into_iter()
            .map(|save| {
                let stem = save.staged.file_stem().unwrap_or_default().to_string_lossy();
                let produced = out_dir.join(format!("{}.{}", stem, format.extension()));

                let result = if produced.is_file() {
                    move_file(&produced, &save.output)
                } else {
                    let reason = if output.status.success() || stderr.is_empty() {
                        "오피스가 출력 파일을 만들지 않았습니다".to_string()
                    } else {
                        stderr.clone()
                    };
                    Err(ConvertError::SaveFailed {
                        file: save.input.clone(),
                        reason,
                    })
                };
                let _ = fs::remove_file(&save.staged);

                SaveOutcome {
                    input: save.input,
                    output: save.output,
                    result,
                }
            })
            .collect();

        Ok(outcomes)
    }
}

impl Application for OfficeApplication {
    fn open_document(&mut self, path: &Path) -> Result<DocumentId> {
        let id = DocumentId(self.next_id);

        // 입력마다 고유한 이름으로 복사하여 같은 이름의 파일끼리 출력이 겹치지 않게 함
        let ext = path.extension().unwrap_or_default().to_string_lossy();
        let staged = self.dirs()?.work.path().join(format!("in-{}.{}", id.0, ext));
        fs::copy(path, &staged).map_err(|e| ConvertError::OpenFailed {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.next_id += 1;
        self.documents.insert(
            id,
            OpenedDocument {
                input: path.to_path_buf(),
                staged,
            },
        );
        Ok(id)
    }

    fn save_document(
        &mut self,
        doc: DocumentId,
        output: &Path,
        format: TargetFormat,
    ) -> Result<SaveState> {
        let opened = self
            .documents
            .get(&doc)
            .ok_or_else(|| ConvertError::SaveFailed {
                file: output.to_path_buf(),
                reason: format!("열려 있지 않은 문서입니다 (#{})", doc.0),
            })?;

        if format.export_filter().is_none() {
            return Err(ConvertError::FormatUnsupported {
                format: format.to_string(),
            });
        }

        self.pending.push(PendingSave {
            input: opened.input.clone(),
            staged: opened.staged.clone(),
            output: output.to_path_buf(),
            format,
        });
        Ok(SaveState::Pending)
    }

    fn flush(&mut self) -> Result<Vec<SaveOutcome>> {
        let mut groups: Vec<(TargetFormat, Vec<PendingSave>)> = Vec::new();
        for save in self.pending.drain(..) {
            match groups.iter_mut().find(|(f, _)| *f == save.format) {
                Some((_, group)) => group.push(save),
                None => groups.push((save.format, vec![save])),
            }
        }

        let mut outcomes = Vec::new();
        for (format, group) in groups {
            outcomes.extend(self.convert_group(format, group)?);
        }
        Ok(outcomes)
    }

    fn close_document(&mut self, doc: DocumentId) {
        // 대기 중인 저장이 복사본을 쓰므로 여기서는 목록에서만 제거
        self.documents.remove(&doc);
    }

    fn quit(&mut self) {
        if !self.pending.is_empty() {
            warn!(pending = self.pending.len(), "처리되지 않은 저장 요청을 버립니다");
            self.pending.clear();
        }
        self.documents.clear();
        if let Some(dirs) = self.dirs.take() {
            for dir in [dirs.profile, dirs.work] {
                let path = dir.path().to_path_buf();
                if let Err(e) = dir.close() {
                    warn!(dir = %path.display(), error = %e, "임시 폴더 삭제 실패");
                }
            }
        }
        debug!(processes = self.processes, "오피스 인스턴스 정리");
    }
}

/// 파일 이동 (다른 파일 시스템이면 복사 후 삭제)
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| ConvertError::Io {
        path: to.to_path_buf(),
        reason: e.to_string(),
    })?;
    // 작업 폴더는 quit 시 정리되므로 원본 삭제 실패는 무시
    let _ = fs::remove_file(from);
    Ok(())
}

/// 로컬 경로를 `file://` URL로 변환
fn file_url(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{}", s)
    } else {
        format!("file:///{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/tmp/profile")), "file:///tmp/profile");
        assert_eq!(
            file_url(Path::new("C:\\Temp\\profile")),
            "file:///C:/Temp/profile"
        );
    }

    #[test]
    fn test_locate_missing_program() {
        let result = OfficeLauncher::locate(Some(Path::new("/nonexistent/bin/soffice-missing")));
        assert!(matches!(
            result,
            Err(ConvertError::ApplicationUnavailable { .. })
        ));
    }

    #[test]
    fn test_launch_missing_program() {
        let launcher = OfficeLauncher::new("/nonexistent/bin/soffice-missing");
        let result = launcher.launch();
        assert!(matches!(
            result,
            Err(ConvertError::ApplicationUnavailable { .. })
        ));
    }

    #[test]
    fn test_move_file() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, b"%PDF").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"%PDF");
    }

    /// 가짜 soffice 스크립트로 실제 프로세스 실행 경로를 검사
    #[cfg(unix)]
    mod stub_office {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// 호출마다 로그에 한 줄을 남기고, 내용에 "broken"이 없는 입력만 변환하는 스크립트
        fn write_stub(dir: &Path, exit_code: i32) -> (PathBuf, PathBuf) {
            let log = dir.join("calls.log");
            let script = dir.join("soffice");
            let body = format!(
                r#"#!/bin/sh
echo "$*" >> '{log}'
outdir=""
ext=""
while [ $# -gt 0 ]; do
  case "$1" in
    --convert-to) shift; ext="${{1%%:*}}" ;;
    --outdir) shift; outdir="$1" ;;
    -*) ;;
    *)
      if ! grep -q broken "$1"; then
        name=$(basename "$1")
        printf 'converted' > "$outdir/${{name%.*}}.$ext"
      fi
      ;;
  esac
  shift
done
exit {exit_code}
"#,
                log = log.display(),
                exit_code = exit_code
            );
            fs::write(&script, body).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            (script, log)
        }

        fn calls(log: &Path) -> Vec<String> {
            fs::read_to_string(log)
                .map(|s| s.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }

        #[test]
        fn test_launch_spawns_nothing() {
            let dir = TempDir::new().unwrap();
            let (script, log) = write_stub(dir.path(), 0);

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            assert!(app.flush().unwrap().is_empty());
            app.quit();

            assert!(calls(&log).is_empty());
            assert_eq!(app.processes_spawned(), 0);
        }

        #[test]
        fn test_queued_saves_share_one_process() {
            let dir = TempDir::new().unwrap();
            let (script, log) = write_stub(dir.path(), 0);
            let docs = dir.path().join("docs");
            let sub = docs.join("sub");
            fs::create_dir_all(&sub).unwrap();

            // 이름이 같은 두 파일도 출력이 섞이지 않아야 함
            let inputs = [docs.join("a.doc"), sub.join("a.doc"), docs.join("b.dot")];
            for (i, input) in inputs.iter().enumerate() {
                fs::write(input, format!("document {}", i)).unwrap();
            }
            let outputs = [docs.join("a.pdf"), sub.join("a.pdf"), docs.join("b.pdf")];

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            for (input, output) in inputs.iter().zip(&outputs) {
                let id = app.open_document(input).unwrap();
                let state = app.save_document(id, output, TargetFormat::Pdf).unwrap();
                assert_eq!(state, SaveState::Pending);
                app.close_document(id);
            }
            assert!(calls(&log).is_empty());

            let outcomes = app.flush().unwrap();
            app.quit();

            assert_eq!(outcomes.len(), 3);
            assert!(outcomes.iter().all(|o| o.result.is_ok()));
            for output in &outputs {
                assert_eq!(fs::read_to_string(output).unwrap(), "converted");
            }

            let calls = calls(&log);
            assert_eq!(calls.len(), 1);
            assert!(calls[0].contains("--convert-to pdf:writer_pdf_Export"));
            assert!(calls[0].contains("-env:UserInstallation=file://"));
            assert_eq!(app.processes_spawned(), 1);
        }

        #[test]
        fn test_missing_output_is_save_failure() {
            let dir = TempDir::new().unwrap();
            let (script, _log) = write_stub(dir.path(), 0);
            let good = dir.path().join("good.doc");
            let bad = dir.path().join("bad.doc");
            fs::write(&good, "fine").unwrap();
            fs::write(&bad, "broken").unwrap();

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            for input in [&good, &bad] {
                let id = app.open_document(input).unwrap();
                app.save_document(id, &input.with_extension("rtf"), TargetFormat::Rtf)
                    .unwrap();
                app.close_document(id);
            }
            let outcomes = app.flush().unwrap();
            app.quit();

            let good_outcome = outcomes.iter().find(|o| o.input == good).unwrap();
            assert!(good_outcome.result.is_ok());
            assert!(dir.path().join("good.rtf").is_file());

            let bad_outcome = outcomes.iter().find(|o| o.input == bad).unwrap();
            assert!(matches!(
                bad_outcome.result,
                Err(ConvertError::SaveFailed { .. })
            ));
            assert!(!dir.path().join("bad.rtf").exists());
        }

        #[test]
        fn test_nonzero_exit_is_save_failure() {
            let dir = TempDir::new().unwrap();
            let (script, log) = write_stub(dir.path(), 3);
            let input = dir.path().join("memo.doc");
            fs::write(&input, "broken").unwrap();

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            let id = app.open_document(&input).unwrap();
            app.save_document(id, &dir.path().join("memo.html"), TargetFormat::Html)
                .unwrap();
            app.close_document(id);
            let outcomes = app.flush().unwrap();
            app.quit();

            assert_eq!(calls(&log).len(), 1);
            assert!(matches!(
                outcomes[0].result,
                Err(ConvertError::SaveFailed { .. })
            ));
        }

        #[test]
        fn test_xps_rejected_without_spawning() {
            let dir = TempDir::new().unwrap();
            let (script, log) = write_stub(dir.path(), 0);
            let input = dir.path().join("memo.doc");
            fs::write(&input, "text").unwrap();

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            let id = app.open_document(&input).unwrap();
            let result = app.save_document(id, &dir.path().join("memo.xps"), TargetFormat::Xps);
            app.close_document(id);
            assert!(app.flush().unwrap().is_empty());
            app.quit();

            assert!(matches!(
                result,
                Err(ConvertError::FormatUnsupported { .. })
            ));
            assert!(calls(&log).is_empty());
        }

        #[test]
        fn test_open_missing_file_fails() {
            let dir = TempDir::new().unwrap();
            let (script, _log) = write_stub(dir.path(), 0);

            let mut app = OfficeLauncher::new(&script).launch().unwrap();
            let result = app.open_document(&dir.path().join("absent.doc"));
            app.quit();

            assert!(matches!(result, Err(ConvertError::OpenFailed { .. })));
        }
    }
}
