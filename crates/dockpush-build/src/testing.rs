//! テスト用のインメモリエンジン

use crate::engine::{Engine, EngineError, ProgressStream};
use crate::error::{StepError, StepResult};
use crate::request::BuildRequest;
use async_trait::async_trait;
use dockpush_config::ImageReference;
use std::sync::Mutex;

/// 呼び出しに対する応答
#[derive(Clone)]
pub(crate) enum Reply {
    /// 進捗ストリームとしてそのまま返す
    Lines(&'static str),
    /// リクエスト自体を拒否する
    Reject,
    /// 応答しない
    Hang,
}

#[derive(Debug, Clone)]
pub(crate) enum Call {
    Build {
        request: BuildRequest,
        context: Vec<u8>,
    },
    Push {
        image: ImageReference,
        auth_token: String,
    },
}

pub(crate) struct FakeEngine {
    build: Reply,
    push: Reply,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeEngine {
    pub fn new(build: Reply, push: Reply) -> Self {
        Self {
            build,
            push,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Push { .. }))
            .count()
    }

    async fn reply(reply: &Reply) -> StepResult<ProgressStream> {
        match reply {
            Reply::Lines(text) => Ok(Box::pin(std::io::Cursor::new(text.as_bytes().to_vec()))),
            Reply::Reject => Err(StepError::Engine(EngineError::DockerResponseServerError {
                status_code: 500,
                message: "rejected".to_string(),
            })),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn build_image(
        &self,
        request: &BuildRequest,
        context: Vec<u8>,
    ) -> StepResult<ProgressStream> {
        self.calls.lock().unwrap().push(Call::Build {
            request: request.clone(),
            context,
        });
        Self::reply(&self.build).await
    }

    async fn push_image(
        &self,
        image: &ImageReference,
        auth_token: &str,
    ) -> StepResult<ProgressStream> {
        self.calls.lock().unwrap().push(Call::Push {
            image: image.clone(),
            auth_token: auth_token.to_string(),
        });
        Self::reply(&self.push).await
    }
}

pub(crate) const BUILD_OK: &str = "{\"stream\":\"Step 1/1 : FROM alpine\\n\"}\n\
                                   {\"stream\":\"Successfully tagged octocat/app:v1\\n\"}\n";

pub(crate) const PUSH_OK: &str = "{\"status\":\"Preparing\"}\n\
                                  {\"status\":\"Pushed\"}\n\
                                  {\"status\":\"v1: digest: sha256:abc size: 528\"}\n";

pub(crate) const BUILD_FAILED: &str = "{\"stream\":\"Step 1/2 : FROM alpine\\n\"}\n\
     {\"error\":\"The command '/bin/sh -c exit 1' returned a non-zero code: 1\",\
     \"errorDetail\":{\"message\":\"The command '/bin/sh -c exit 1' returned a non-zero code: 1\"}}\n";

pub(crate) const PUSH_DENIED: &str = "{\"status\":\"Preparing\"}\n\
     {\"error\":\"denied: requested access to the resource is denied\",\
     \"errorDetail\":{\"message\":\"denied: requested access to the resource is denied\"}}\n";

/// 常に書き込みに失敗する出力先
pub(crate) struct ClosedSink;

impl std::io::Write for ClosedSink {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
