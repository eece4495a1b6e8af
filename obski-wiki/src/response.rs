//! MediaWiki response decoding.
//!
//! `opensearch` answers with a four-element array `[query, titles,
//! descriptions, links]`; `parse` answers with `{"parse": {"text": ...}}` or an
//! `{"error": {...}}` object. Both are walked as loose JSON so that missing
//! optional parts degrade instead of failing the whole lookup.

use obski_core::{ApiError, ArticleContent, SearchHit};
use serde_json::Value;

/// Decode an `opensearch` body into search hits.
pub fn parse_opensearch_response(body: &str) -> Result<Vec<SearchHit>, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode {
        message: format!("opensearch response is not JSON: {}", e),
    })?;

    let parts = value.as_array().ok_or_else(|| ApiError::Decode {
        message: "opensearch response is not an array".to_string(),
    })?;

    let column = |index: usize| -> Vec<&str> {
        parts
            .get(index)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(|v| v.as_str().unwrap_or("")).collect())
            .unwrap_or_default()
    };

    let titles = column(1);
    let descriptions = column(2);
    let links = column(3);

    Ok(titles
        .iter()
        .enumerate()
        .filter(|(_, title)| !title.is_empty())
        .map(|(i, title)| SearchHit {
            title: title.to_string(),
            description: descriptions.get(i).copied().unwrap_or("").to_string(),
            link: links.get(i).copied().unwrap_or("").to_string(),
        })
        .collect())
}

/// Decode a `parse` body into article markup or an unavailable signal.
pub fn parse_article_response(body: &str) -> Result<ArticleContent, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode {
        message: format!("parse response is not JSON: {}", e),
    })?;

    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(|v| v.as_str()).unwrap_or("error");
        let info = error.get("info").and_then(|v| v.as_str()).unwrap_or("");
        let reason = if info.is_empty() {
            code.to_string()
        } else {
            format!("{}: {}", code, info)
        };
        return Ok(ArticleContent::Unavailable { reason });
    }

    let Some(parse) = value.get("parse") else {
        return Ok(ArticleContent::Unavailable {
            reason: "response has no parse payload".to_string(),
        });
    };

    // formatversion=1 wraps the markup as {"*": html}; formatversion=2 inlines it.
    let markup = match parse.get("text") {
        Some(Value::String(html)) => Some(html.as_str()),
        Some(text) => text.get("*").and_then(|v| v.as_str()),
        None => None,
    };

    Ok(match markup {
        Some(html) if !html.trim().is_empty() => ArticleContent::Markup(html.to_string()),
        _ => ArticleContent::Unavailable {
            reason: "parse payload has no text".to_string(),
        },
    })
}
