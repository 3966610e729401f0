//! 進捗ストリームの読み取り
//!
//! Docker Engine はビルドやプッシュの進捗を改行区切りの JSON で返す。
//! 転送自体が成功していても、最終行が `{"error": ..., "errorDetail": {...}}`
//! の形であれば操作は失敗している。

use crate::error::{StepError, StepResult};
use futures_util::stream::{self, StreamExt};
use serde::Deserialize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// 最終行に現れるエラーシグナル
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLine {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_detail: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}

impl ErrorLine {
    /// 1行をエラーシグナルとして解釈する
    ///
    /// JSON として壊れている行や `error` が空の行はシグナルなし (`None`)。
    pub fn parse(line: &str) -> Option<String> {
        serde_json::from_str::<ErrorLine>(line)
            .ok()
            .map(|line| line.error)
            .filter(|error| !error.is_empty())
    }
}

#[derive(Default)]
struct Scan {
    last_line: Option<Vec<u8>>,
    read_error: Option<std::io::Error>,
}

/// 進捗ストリームを最後まで読み、各行を `out` にそのまま出力する
///
/// 行は `\n` 区切りのバイト列として扱い、末尾の `\r` は取り除く。UTF-8 として
/// 不正なバイトを含む行もそのまま出力する。保持するのは直近の1行だけ。読み終えたら
/// （または読み取りエラーで止まったら）最終行をエラーシグナルとして判定し、
/// その後に読み取りエラーを判定する。
pub async fn read_progress<R, W>(reader: R, out: &mut W) -> StepResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + ?Sized,
{
    // 読み取りエラーの後は続けない
    let lines = stream::unfold(Some(reader.split(b'\n')), |state| async move {
        let mut segments = state?;
        match segments.next_segment().await {
            Ok(Some(mut line)) => {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Some((Ok(line), Some(segments)))
            }
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    });

    let scan = lines
        .fold(Scan::default(), |mut scan, item| {
            match item {
                Ok(line) => {
                    if let Err(e) = out.write_all(&line).and_then(|()| out.write_all(b"\n")) {
                        tracing::warn!("Failed to echo progress line: {}", e);
                    }
                    scan.last_line = Some(line);
                }
                Err(e) => scan.read_error = Some(e),
            }
            futures_util::future::ready(scan)
        })
        .await;

    if let Some(message) = scan
        .last_line
        .as_deref()
        .and_then(|line| ErrorLine::parse(&String::from_utf8_lossy(line)))
    {
        return Err(StepError::Signal(message));
    }

    if let Some(e) = scan.read_error {
        return Err(StepError::Read(e));
    }

    Ok(())
}
