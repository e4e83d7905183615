//! Work schedule lookup.
//!
//! `days_off` and `ilegal_dates` are stored as text. Rows written by the
//! current service hold a JSON array; older rows hold a bracketed list of
//! quoted literals such as `['2024-03-01', '2024-03-08']`. Both are decoded
//! by a strict parser that only ever produces a list of strings.

use std::{iter::Peekable, str::CharIndices, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    response::Json,
};
use thiserror::Error;

use crate::{
    auth::AuthenticatedWorker,
    db::{ScaleResponse, WorkerStore},
    error::AppError,
    web::PathParam,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleFormatError {
    #[error("schedule list must be enclosed in brackets")]
    NotAList,

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unsupported escape sequence \\{0}")]
    InvalidEscape(char),
}

/// Decodes one stored schedule column. NULL or blank text is an empty list.
pub fn parse_date_list(raw: Option<&str>) -> Result<Vec<String>, ScheduleFormatError> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(text) => text,
    };

    if let Ok(list) = serde_json::from_str::<Vec<String>>(text) {
        return Ok(list);
    }

    parse_literal_list(text)
}

// ['a', "b", ] - quoted literals only, optional trailing comma
fn parse_literal_list(text: &str) -> Result<Vec<String>, ScheduleFormatError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or(ScheduleFormatError::NotAList)?;

    let mut items = Vec::new();
    let mut chars = inner.char_indices().peekable();

    loop {
        skip_whitespace(&mut chars);

        let Some(&(offset, quote)) = chars.peek() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(ScheduleFormatError::UnexpectedCharacter {
                found: quote,
                offset,
            });
        }
        chars.next();
        items.push(read_quoted(&mut chars, quote)?);

        skip_whitespace(&mut chars);
        match chars.next() {
            None => break,
            Some((_, ',')) => continue,
            Some((offset, found)) => {
                return Err(ScheduleFormatError::UnexpectedCharacter { found, offset })
            }
        }
    }

    Ok(items)
}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
}

fn read_quoted(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
) -> Result<String, ScheduleFormatError> {
    let mut value = String::new();

    loop {
        match chars.next() {
            None => return Err(ScheduleFormatError::UnterminatedString),
            Some((_, c)) if c == quote => return Ok(value),
            Some((_, '\\')) => match chars.next() {
                Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                Some((_, other)) => return Err(ScheduleFormatError::InvalidEscape(other)),
                None => return Err(ScheduleFormatError::UnterminatedString),
            },
            Some((_, c)) => value.push(c),
        }
    }
}

/// Schedule of one worker at one subsidiary; no row means both lists are empty.
pub async fn get_worker_scale(
    store: &dyn WorkerStore,
    subsidiarie_id: i32,
    worker_id: i32,
) -> Result<ScaleResponse, AppError> {
    let Some(scale) = store.find_scale(subsidiarie_id, worker_id).await? else {
        return Ok(ScaleResponse::default());
    };

    let decode = |column: &str, raw: Option<&str>| {
        parse_date_list(raw).with_context(|| {
            format!(
                "invalid {} for worker {} at subsidiary {}",
                column, worker_id, subsidiarie_id
            )
        })
    };

    Ok(ScaleResponse {
        days_off: decode("days_off", scale.days_off.as_deref())?,
        ilegal_dates: decode("ilegal_dates", scale.ilegal_dates.as_deref())?,
    })
}

/// POST /eusou/subsidiaries/:subsidiarie_id/workers/:worker_id/scales
pub async fn scales_handler(
    auth: AuthenticatedWorker,
    State(store): State<Arc<dyn WorkerStore>>,
    PathParam((subsidiarie_id, worker_id)): PathParam<(i32, i32)>,
) -> Result<Json<ScaleResponse>, AppError> {
    auth.ensure_owner(worker_id)?;

    let scale = get_worker_scale(store.as_ref(), subsidiarie_id, worker_id).await?;
    Ok(Json(scale))
}
