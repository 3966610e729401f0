//! イメージプッシュ処理
//!
//! ビルドしたイメージをコンテナレジストリにプッシュします。

use crate::builder::STEP_TIMEOUT;
use crate::engine::Engine;
use crate::error::{StepError, StepResult};
use crate::progress::read_progress;
use crate::request::PushRequest;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher<'a, E: ?Sized> {
    engine: &'a E,
    timeout: Duration,
}

impl<'a, E: Engine + ?Sized> ImagePusher<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            timeout: STEP_TIMEOUT,
        }
    }

    /// イメージをレジストリにプッシュ
    ///
    /// 認証情報はトークンにエンコードしてプッシュ呼び出しに添付する。
    pub async fn push<W: Write + ?Sized>(
        &self,
        request: &PushRequest,
        out: &mut W,
    ) -> StepResult<()> {
        let auth_token = request.auth.encode()?;

        tracing::info!(
            "Pushing image: {} (registry: {})",
            request.image,
            request.auth.serveraddress
        );
        if let Err(e) = writeln!(
            out,
            "{} {}",
            "→ Pushing".blue(),
            request.image.to_string().cyan()
        ) {
            tracing::warn!("Failed to write step header: {}", e);
        }

        tokio::time::timeout(self.timeout, async {
            let progress = self.engine.push_image(&request.image, &auth_token).await?;
            read_progress(progress, out).await
        })
        .await
        .map_err(|_| StepError::Timeout(self.timeout))??;

        tracing::info!("Successfully pushed: {}", request.image);
        Ok(())
    }
}
