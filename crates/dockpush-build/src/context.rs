use crate::error::{StepError, StepResult};
use std::path::Path;
use tar::Builder;

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストを非圧縮の tar アーカイブとして作成
    ///
    /// ディレクトリ全体をそのまま含める（除外ルールは適用しない）。
    pub fn create_context(context_path: &Path) -> StepResult<Vec<u8>> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        if !context_path.is_dir() {
            return Err(StepError::ContextNotFound(context_path.to_path_buf()));
        }

        let mut tar = Builder::new(Vec::new());
        // シンボリックリンクはリンクのまま格納する
        tar.follow_symlinks(false);

        tar.append_dir_all(".", context_path)
            .map_err(StepError::Archive)?;

        let archive_data = tar.into_inner().map_err(StepError::Archive)?;

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is large ({}MB); the whole directory is sent to the engine",
                size / 1024 / 1024
            );
        }
    }
}
