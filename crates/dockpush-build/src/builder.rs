use crate::context::ContextBuilder;
use crate::engine::Engine;
use crate::error::{StepError, StepResult};
use crate::progress::read_progress;
use crate::request::BuildRequest;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

/// ビルド・プッシュそれぞれの制限時間
pub const STEP_TIMEOUT: Duration = Duration::from_secs(120);

pub struct ImageBuilder<'a, E: ?Sized> {
    engine: &'a E,
    timeout: Duration,
}

impl<'a, E: Engine + ?Sized> ImageBuilder<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            timeout: STEP_TIMEOUT,
        }
    }

    /// イメージをビルド
    ///
    /// ビルド出力は届いた順に `out` へ書き出す。制限時間はアーカイブ作成後、
    /// リクエスト送信から進捗ストリームを読み終えるまで。
    pub async fn build<W: Write + ?Sized>(
        &self,
        request: &BuildRequest,
        out: &mut W,
    ) -> StepResult<()> {
        tracing::info!("Building image: {}", request.image);
        if let Err(e) = writeln!(
            out,
            "{} {}",
            "→ Building".blue(),
            request.image.to_string().cyan()
        ) {
            tracing::warn!("Failed to write step header: {}", e);
        }

        let context = ContextBuilder::create_context(&request.context_path)?;

        tokio::time::timeout(self.timeout, async {
            let progress = self.engine.build_image(request, context).await?;
            read_progress(progress, out).await
        })
        .await
        .map_err(|_| StepError::Timeout(self.timeout))??;

        tracing::info!("Successfully built: {}", request.image);
        Ok(())
    }
}
