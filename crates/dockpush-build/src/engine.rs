//! イメージビルドエンジンとの接続
//!
//! ビルドとプッシュの応答は、どちらも改行区切り JSON の進捗ストリームとして
//! 扱う。`DockerEngine` は bollard がデコードしたレコードを JSON 行に戻して渡す。

use crate::auth::RegistryAuth;
use crate::error::{StepError, StepResult};
use crate::request::BuildRequest;
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::models::{BuildInfo, PushImageInfo};
use bytes::Bytes;
use dockpush_config::ImageReference;
use futures_util::stream::{self, Stream, StreamExt};
use http_body_util::{Either, Full};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::io::StreamReader;

/// 改行区切り JSON の進捗ストリーム
pub type ProgressStream = Pin<Box<dyn AsyncBufRead + Send>>;

pub type EngineError = bollard::errors::Error;

/// エンジンから届く1行（改行込み）
type LineResult = Result<Bytes, EngineError>;

/// 送信側が詰まったときに生成タスクを待たせる行数
const LINE_BUFFER: usize = 64;

/// イメージのビルドとプッシュを実行するエンジン
#[async_trait]
pub trait Engine: Send + Sync {
    /// ビルドを開始し、進捗ストリームを返す
    ///
    /// `context` は tar アーカイブ。リクエスト自体が拒否された場合は `Err`。
    async fn build_image(
        &self,
        request: &BuildRequest,
        context: Vec<u8>,
    ) -> StepResult<ProgressStream>;

    /// プッシュを開始し、進捗ストリームを返す
    ///
    /// `auth_token` は URL-safe base64 でエンコードされた認証情報。
    /// 解釈できないトークンは送信前に `StepError::Auth` になる。
    async fn push_image(
        &self,
        image: &ImageReference,
        auth_token: &str,
    ) -> StepResult<ProgressStream>;
}

/// Docker Engine API (bollard) によるエンジン
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// 環境変数 (`DOCKER_HOST` など) から接続し、API バージョンをネゴシエートする
    pub async fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_defaults()?;
        let docker = docker.negotiate_version().await?;

        tracing::info!("Connected to Docker engine (API {:?})", docker.client_version());
        Ok(Self { docker })
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn build_image(
        &self,
        request: &BuildRequest,
        context: Vec<u8>,
    ) -> StepResult<ProgressStream> {
        let tag = request.image.to_string();
        let options = bollard::query_parameters::BuildImageOptionsBuilder::default()
            .dockerfile(&request.dockerfile)
            .t(&tag)
            .rm(request.remove_intermediate)
            .build();

        tracing::debug!("Build options: {:?}", options);

        let docker = self.docker.clone();
        let body = Full::new(Bytes::from(context));
        let lines = spawn_lines(move |tx| async move {
            let stream = docker.build_image(options, None, Some(Either::Left(body)));
            forward(stream, tx, build_info_line).await;
        });

        into_progress_stream(lines).await
    }

    async fn push_image(
        &self,
        image: &ImageReference,
        auth_token: &str,
    ) -> StepResult<ProgressStream> {
        let credentials: DockerCredentials = RegistryAuth::decode(auth_token)?.into();

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: image.tag().to_string(),
        };

        let docker = self.docker.clone();
        let repository = image.repository();
        let lines = spawn_lines(move |tx| async move {
            #[allow(deprecated)]
            let stream = docker.push_image(&repository, Some(options), Some(credentials));
            forward(stream, tx, push_info_line).await;
        });

        into_progress_stream(lines).await
    }
}

/// 破棄されると生成タスクを止める
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// エンジン呼び出しを専用タスクで進め、届いた行を順に流す
///
/// 返したストリームが破棄される（タイムアウトなど）と、実行中の呼び出しも
/// タスクごと中断される。
fn spawn_lines<F, Fut>(produce: F) -> impl Stream<Item = LineResult> + Send + 'static
where
    F: FnOnce(mpsc::Sender<LineResult>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let task = AbortOnDrop(tokio::spawn(produce(tx)));

    stream::unfold((rx, task), |(mut rx, task)| async move {
        let line = rx.recv().await?;
        Some((line, (rx, task)))
    })
}

/// bollard のレコードを JSON 行にして送る（受け手がいなくなったら止める）
async fn forward<S, T>(stream: S, tx: mpsc::Sender<LineResult>, to_line: fn(&T) -> Bytes)
where
    S: Stream<Item = Result<T, EngineError>>,
{
    let mut stream = Box::pin(stream);
    while let Some(item) = stream.next().await {
        if tx.send(item.map(|record| to_line(&record))).await.is_err() {
            break;
        }
    }
}

/// 行ストリームを進捗ストリームに変換
///
/// 最初の要素が転送エラーならリクエストが受け付けられなかったものとして返す。
/// ストリーム途中で bollard が切り出したエラーレコードは、エラーシグナル行に
/// 戻して最終行として流す。
async fn into_progress_stream<S>(lines: S) -> StepResult<ProgressStream>
where
    S: Stream<Item = LineResult> + Send + 'static,
{
    let mut lines = Box::pin(lines);

    let first = match lines.next().await {
        Some(Err(e)) if !matches!(e, EngineError::DockerStreamError { .. }) => {
            return Err(StepError::Engine(e));
        }
        first => first,
    };

    // エラー（シグナル行・読み取りエラー）を流したらそこで終わる
    let lines = stream::iter(first)
        .chain(lines)
        .scan(false, |done, item| {
            if *done {
                return futures_util::future::ready(None);
            }
            let line = match item {
                Ok(line) => Ok(line),
                Err(EngineError::DockerStreamError { error }) => {
                    *done = true;
                    Ok(error_line(&error))
                }
                Err(e) => {
                    *done = true;
                    Err(std::io::Error::other(e))
                }
            };
            futures_util::future::ready(Some(line))
        });

    Ok(Box::pin(StreamReader::new(lines)))
}

/// 進捗レコードを JSON 1行に戻す
///
/// `error` があれば `errorDetail.message` も付ける（無ければ `error` と同じ文言）。
fn record_line(
    fields: &[(&str, Option<&str>)],
    error: Option<&str>,
    error_message: Option<&str>,
) -> Bytes {
    let mut record = Map::new();
    for (key, value) in fields {
        if let Some(value) = value {
            record.insert(key.to_string(), json!(value));
        }
    }
    if let Some(error) = error {
        record.insert("error".to_string(), json!(error));
        record.insert(
            "errorDetail".to_string(),
            json!({ "message": error_message.unwrap_or(error) }),
        );
    }
    Bytes::from(format!("{}\n", Value::Object(record)))
}

fn build_info_line(info: &BuildInfo) -> Bytes {
    record_line(
        &[
            ("stream", info.stream.as_deref()),
            ("status", info.status.as_deref()),
        ],
        info.error.as_deref(),
        info.error_detail
            .as_ref()
            .and_then(|detail| detail.message.as_deref()),
    )
}

fn push_info_line(info: &PushImageInfo) -> Bytes {
    record_line(
        &[
            ("status", info.status.as_deref()),
            ("progress", info.progress.as_deref()),
        ],
        info.error.as_deref(),
        None,
    )
}

fn error_line(error: &str) -> Bytes {
    record_line(&[], Some(error), None)
}
