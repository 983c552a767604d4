//! 從生成服務的原始文字中取出組合建議的 JSON 陣列。
//!
//! 服務偶爾會在陣列前後加上 code fence 或說明文字。解析規則：
//! 1. 去掉每行開頭的 ```（含語言標記）與結尾的 ```，保留同一行的其他內容；
//! 2. 依序嘗試每個 `[` 開始的平衡區段（會略過字串內的括號），第一個能解析成建議清單者勝出；
//!    解析失敗的區段整段跳過，不再嘗試其內部的陣列；
//! 3. 都不行時，退回「第一個 `[` 到最後一個 `]`」的區段。

use crate::domain::model::BundleProposal;
use crate::utils::error::{BundleError, Result};

pub fn parse_proposals(raw: &str) -> Result<Vec<BundleProposal>> {
    let text = strip_code_fences(raw);

    let mut last_error = None;
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('[') {
        let start = pos + offset;
        let Some(span) = balanced_span(&text[start..]) else {
            break;
        };
        match serde_json::from_str::<Vec<BundleProposal>>(span) {
            Ok(proposals) => return Ok(proposals),
            Err(e) => last_error = Some(e),
        }
        pos = start + span.len();
    }

    let (Some(first), Some(last)) = (text.find('['), text.rfind(']')) else {
        return Err(BundleError::ParseError {
            message: "no JSON array found in response".to_string(),
        });
    };
    if last < first {
        return Err(BundleError::ParseError {
            message: "no JSON array found in response".to_string(),
        });
    }

    serde_json::from_str::<Vec<BundleProposal>>(&text[first..=last]).map_err(|e| {
        BundleError::ParseError {
            message: last_error.map(|le| le.to_string()).unwrap_or_else(|| e.to_string()),
        }
    })
}

/// 失敗時記錄錯誤並回傳空清單
pub fn parse_proposals_lenient(raw: &str) -> Vec<BundleProposal> {
    match parse_proposals(raw) {
        Ok(proposals) => {
            tracing::debug!("Parsed {} bundle proposals", proposals.len());
            proposals
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            Vec::new()
        }
    }
}

fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .map(strip_fence_markers)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_fence_markers(line: &str) -> &str {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("```") {
        line = rest
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim_start();
    }
    if let Some(rest) = line.strip_suffix("```") {
        line = rest.trim_end();
    }
    line
}

/// `text` 必須以 `[` 開頭；回傳到對應 `]` 為止的區段
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
