//! 接続 → ビルド → プッシュの実行
//!
//! 各ステップは前のステップが成功した場合にのみ実行する。再試行はしない。

use crate::builder::ImageBuilder;
use crate::engine::{Engine, EngineError};
use crate::error::{PublishError, Result};
use crate::pusher::ImagePusher;
use crate::request::{BuildRequest, PushRequest};
use dockpush_config::{ImageReference, PublishConfig};
use std::future::Future;
use std::io::Write;

/// エンジンに接続してからビルドとプッシュを行う
///
/// 接続に失敗した場合はビルドもプッシュも行わない。
pub async fn run<E, F, Fut, W>(
    connect: F,
    config: &PublishConfig,
    out: &mut W,
) -> Result<ImageReference>
where
    E: Engine,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<E, EngineError>>,
    W: Write + ?Sized,
{
    let engine = connect().await.map_err(PublishError::Connection)?;
    publish(&engine, config, out).await
}

/// ビルドしてからプッシュする
pub async fn publish<E, W>(
    engine: &E,
    config: &PublishConfig,
    out: &mut W,
) -> Result<ImageReference>
where
    E: Engine + ?Sized,
    W: Write + ?Sized,
{
    let build = BuildRequest::from_config(config);
    ImageBuilder::new(engine)
        .build(&build, out)
        .await
        .map_err(PublishError::Build)?;

    let push = PushRequest::from_config(config);
    ImagePusher::new(engine)
        .push(&push, out)
        .await
        .map_err(PublishError::Push)?;

    Ok(push.image)
}
