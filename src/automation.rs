//! 오피스 자동화 인터페이스 모듈
//!
//! 외부 워드 프로세서를 열기/저장/닫기 단위로 조작하기 위한 트레이트와,
//! 프로그램 인스턴스 및 문서 핸들의 해제를 보장하는 가드를 정의합니다.
//!
//! - [`Session`]은 실행된 인스턴스를 소유하며 drop 시 정확히 한 번 종료합니다.
//! - [`OpenDocument`]는 열린 문서를 소유하며 저장 성공 여부와 관계없이
//!   drop 시 닫습니다.
//!
//! 백엔드는 저장 요청을 바로 처리하거나([`SaveState::Done`]) 모아 두었다가
//! [`Session::flush`]에서 한 번에 처리할 수 있습니다([`SaveState::Pending`]).

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::format::TargetFormat;

/// 프로그램 인스턴스 안에서 열린 문서 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// 저장 요청 처리 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// 출력 파일이 이미 기록됨
    Done,
    /// flush 시 기록됨
    Pending,
}

/// flush로 처리된 저장 요청 하나의 결과
#[derive(Debug)]
pub struct SaveOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<()>,
}

/// 실행 중인 워드 프로세서 인스턴스
pub trait Application {
    /// 문서 열기
    fn open_document(&mut self, path: &Path) -> Result<DocumentId>;

    /// 열린 문서를 대상 형식으로 저장
    fn save_document(
        &mut self,
        doc: DocumentId,
        output: &Path,
        format: TargetFormat,
    ) -> Result<SaveState>;

    /// 대기 중인 저장 요청 일괄 처리
    ///
    /// `Err`는 인스턴스 자체를 쓸 수 없을 때만 반환하며, 파일별 실패는
    /// 각 [`SaveOutcome`]에 담깁니다.
    fn flush(&mut self) -> Result<Vec<SaveOutcome>> {
        Ok(Vec::new())
    }

    /// 문서 닫기 (저장하지 않음)
    fn close_document(&mut self, doc: DocumentId);

    /// 인스턴스 종료
    fn quit(&mut self);
}

/// 워드 프로세서 인스턴스를 실행하는 팩토리
pub trait Launcher {
    type App: Application;

    /// 새 인스턴스 실행
    ///
    /// 프로그램을 사용할 수 없으면 `ApplicationUnavailable`을 반환해야 합니다.
    fn launch(&self) -> Result<Self::App>;
}

/// 실행된 인스턴스의 수명 가드
pub struct Session<A: Application> {
    app: A,
}

impl<A: Application> Session<A> {
    /// 인스턴스를 실행하여 세션 시작
    pub fn start<L>(launcher: &L) -> Result<Self>
    where
        L: Launcher<App = A>,
    {
        let app = launcher.launch()?;
        info!("오피스 인스턴스 시작");
        Ok(Self { app })
    }

    /// 문서 열기
    pub fn open(&mut self, path: &Path) -> Result<OpenDocument<'_, A>> {
        let id = self.app.open_document(path)?;
        debug!(file = %path.display(), "문서 열림");
        Ok(OpenDocument {
            app: &mut self.app,
            id,
        })
    }

    /// 대기 중인 저장 요청 처리
    pub fn flush(&mut self) -> Result<Vec<SaveOutcome>> {
        let outcomes = self.app.flush()?;
        if !outcomes.is_empty() {
            debug!(count = outcomes.len(), "대기 중인 저장 처리 완료");
        }
        Ok(outcomes)
    }

    /// 세션을 명시적으로 종료
    pub fn close(self) {
        drop(self);
    }
}

impl<A: Application> Drop for Session<A> {
    fn drop(&mut self) {
        self.app.quit();
        info!("오피스 인스턴스 종료");
    }
}

/// 열린 문서의 수명 가드
pub struct OpenDocument<'a, A: Application> {
    app: &'a mut A,
    id: DocumentId,
}

impl<A: Application> OpenDocument<'_, A> {
    /// 다른 이름으로 저장
    pub fn save_as(&mut self, output: &Path, format: TargetFormat) -> Result<SaveState> {
        self.app.save_document(self.id, output, format)
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }
}

impl<A: Application> Drop for OpenDocument<'_, A> {
    fn drop(&mut self) {
        self.app.close_document(self.id);
        debug!(doc = self.id.0, "문서 닫힘");
    }
}
