use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// ビルド・プッシュの各ステップで発生するエラー
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Failed to archive build context: {0}")]
    Archive(#[source] std::io::Error),

    #[error("Failed to encode registry auth: {0}")]
    Auth(#[from] serde_json::Error),

    #[error("{0}")]
    Engine(#[from] bollard::errors::Error),

    /// 進捗ストリーム最終行のエラーシグナル（メッセージはそのまま）
    #[error("{0}")]
    Signal(String),

    #[error("Failed to read progress stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl StepError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StepError::Timeout(_))
    }
}

/// 実行全体を中断させるエラー
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Docker connection error: {0}")]
    Connection(#[source] bollard::errors::Error),

    #[error("Build failed: {0}")]
    Build(#[source] StepError),

    #[error("Push failed: {0}")]
    Push(#[source] StepError),
}

impl PublishError {
    /// エラー種別ごとのプロセス終了コード
    ///
    /// 設定エラー (2) は呼び出し側で扱う。
    pub fn exit_code(&self) -> u8 {
        match self {
            PublishError::Connection(_) => 3,
            PublishError::Build(_) => 4,
            PublishError::Push(_) => 5,
        }
    }
}

pub type StepResult<T> = std::result::Result<T, StepError>;
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_message_is_verbatim() {
        let err = StepError::Signal("COPY failed: no such file".to_string());
        assert_eq!(err.to_string(), "COPY failed: no such file");
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let connection = PublishError::Connection(bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "down".to_string(),
        });
        let build = PublishError::Build(StepError::Signal("x".to_string()));
        let push = PublishError::Push(StepError::Timeout(Duration::from_secs(120)));

        assert_eq!(connection.exit_code(), 3);
        assert_eq!(build.exit_code(), 4);
        assert_eq!(push.exit_code(), 5);
    }

    #[test]
    fn test_timeout_display() {
        let err = PublishError::Push(StepError::Timeout(Duration::from_secs(120)));
        assert_eq!(err.to_string(), "Push failed: Timed out after 120s");
    }
}
