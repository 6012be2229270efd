//! Line-delimited JSON request loop.
//!
//! Each input line is one judgment request; each output line is the compact
//! `HandlerResponse` for it, in input order. Blank lines are skipped. A line
//! that is not UTF-8 gets a `MALFORMED_REQUEST` envelope like any other bad
//! request. The loop ends at EOF.

use anyhow::{Context, Result};
use judgment::{HandlerResponse, JudgeAgent, JudgeError, UNKNOWN_TRAINING_ID};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Counters for one serve session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub handled: usize,
    pub errors: usize,
}

pub async fn serve<R, W>(agent: &JudgeAgent, mut reader: R, mut writer: W) -> Result<ServeStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = ServeStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read request line")?;
        if read == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                agent.handle_str(line)
            }
            Err(err) => {
                warn!(error = %err, "Request line is not valid UTF-8");
                let err = JudgeError::MalformedRequest {
                    message: format!("request line is not valid UTF-8: {err}"),
                };
                HandlerResponse::error(&err, UNKNOWN_TRAINING_ID)
            }
        };
        stats.handled += 1;
        if !response.is_success() {
            stats.errors += 1;
        }
        debug!(status = response.status_code, "Request handled");

        let mut out = serde_json::to_vec(&response).context("Failed to encode response")?;
        out.push(b'\n');
        writer
            .write_all(&out)
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
    }

    info!(
        handled = stats.handled,
        errors = stats.errors,
        "Input closed, serve loop finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_serve_answers_each_line_in_order() {
        let input = concat!(
            r#"{"training_id":"a","task_type":"clustering","evaluation_results":{"silhouette_score":0.9}}"#,
            "\n\n",
            r#"{"training_id":"b","task_type":"ranking","evaluation_results":{}}"#,
            "\n",
            "not json\n",
            r#"{"training_id":"c","task_type":"regression","evaluation_results":{"rmse":20.0},"retry_count":3,"max_retries":3}"#,
            "\n",
        );
        let mut output = Vec::new();

        let stats = serve(&JudgeAgent::default(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(stats, ServeStats { handled: 4, errors: 2 });

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["body"]["next_action"]["action"], "deploy");
        assert_eq!(responses[1]["body"]["code"], "UNSUPPORTED_TASK_TYPE");
        assert_eq!(responses[1]["body"]["training_id"], "b");
        assert_eq!(responses[2]["body"]["training_id"], "unknown");
        assert_eq!(responses[3]["body"]["next_action"]["action"], "abort");
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8_line() {
        let mut input = b"\xff\xfe\n".to_vec();
        input.extend_from_slice(
            br#"{"training_id":"after","task_type":"clustering","evaluation_results":{"silhouette_score":0.9}}"#,
        );
        input.push(b'\n');
        let mut output = Vec::new();

        let stats = serve(&JudgeAgent::default(), &input[..], &mut output)
            .await
            .unwrap();
        assert_eq!(stats, ServeStats { handled: 2, errors: 1 });

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["status_code"], 500);
        assert_eq!(responses[0]["body"]["code"], "MALFORMED_REQUEST");
        assert_eq!(responses[0]["body"]["training_id"], "unknown");
        assert_eq!(responses[1]["body"]["training_id"], "after");
        assert_eq!(responses[1]["body"]["next_action"]["action"], "deploy");
    }

    #[tokio::test]
    async fn test_serve_last_line_without_newline() {
        let input = r#"{"training_id":"tail","task_type":"clustering","evaluation_results":{}}"#;
        let mut output = Vec::new();
        let stats = serve(&JudgeAgent::default(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(stats, ServeStats { handled: 1, errors: 0 });
        assert!(String::from_utf8(output).unwrap().ends_with('\n'));
    }

    #[tokio::test]
    async fn test_serve_empty_input() {
        let mut output = Vec::new();
        let stats = serve(&JudgeAgent::default(), &b""[..], &mut output)
            .await
            .unwrap();
        assert_eq!(stats, ServeStats::default());
        assert!(output.is_empty());
    }
}
