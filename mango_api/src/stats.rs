//! Decoder for statistics exports.
//!
//! The result endpoint returns one call per line, fields separated by `;`,
//! no header row, columns in [`StatsField::ALL`] order. The first column is
//! itself a list of recording ids rendered as `[id,id,...]`.

use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};

use crate::request::StatsField;
use crate::types::Call;
use crate::Error;

/// What to do with a numeric column that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericPolicy {
    /// Fail the whole decode.
    #[default]
    Strict,
    /// Substitute zero and keep going. Matches older clients of this API.
    ZeroFill,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub numeric_policy: NumericPolicy,
}

/// Decodes an export with the default (strict) options.
pub fn decode_calls(body: &[u8]) -> Result<Vec<Call>, Error> {
    decode_calls_with(body, &DecodeOptions::default())
}

/// Decodes an export. Rows come back in the order the provider sent them.
pub fn decode_calls_with(body: &[u8], options: &DecodeOptions) -> Result<Vec<Call>, Error> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut calls = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            tracing::error!("Failed to read statistics CSV: {}", e);
            Error::MalformedResponse(format!("CSV read error: {}", e))
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(i as u64 + 1);
        calls.push(decode_row(&record, line, options)?);
    }

    tracing::debug!("Decoded {} calls", calls.len());
    Ok(calls)
}

fn decode_row(record: &StringRecord, line: u64, options: &DecodeOptions) -> Result<Call, Error> {
    let expected = StatsField::ALL.len();
    if record.len() < expected {
        return Err(Error::MalformedRecord {
            line,
            reason: format!("expected {} fields, found {}", expected, record.len()),
        });
    }

    let field = |f: StatsField| &record[f.index()];
    let timestamp = |f: StatsField| parse_timestamp(field(f), f, line, options.numeric_policy);

    let records = parse_record_list(field(StatsField::Records)).map_err(|reason| {
        Error::MalformedRecord {
            line,
            reason: format!("{}: {}", StatsField::Records, reason),
        }
    })?;

    Ok(Call {
        records,
        start: timestamp(StatsField::Start)?,
        finish: timestamp(StatsField::Finish)?,
        answer: timestamp(StatsField::Answer)?,
        from_extension: field(StatsField::FromExtension).to_string(),
        from_number: field(StatsField::FromNumber).to_string(),
        to_extension: field(StatsField::ToExtension).to_string(),
        to_number: field(StatsField::ToNumber).to_string(),
        disconnect_reason: parse_number::<i32>(
            field(StatsField::DisconnectReason),
            StatsField::DisconnectReason,
            line,
            options.numeric_policy,
        )?,
        line_number: field(StatsField::LineNumber).to_string(),
        location: field(StatsField::Location).to_string(),
        entry_id: field(StatsField::EntryId).to_string(),
    })
}

/// Only `answer` may be blank (the provider leaves it empty for missed
/// calls); any other blank or unparseable column goes through the policy.
fn parse_number<T>(value: &str, field: StatsField, line: u64, policy: NumericPolicy) -> Result<T, Error>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    let value = value.trim();
    if value.is_empty() {
        if field == StatsField::Answer {
            return Ok(T::default());
        }
        return apply_policy(policy, line, format!("{} is empty", field));
    }
    match value.parse::<T>() {
        Ok(n) => Ok(n),
        Err(e) => apply_policy(policy, line, format!("{} {:?}: {}", field, value, e)),
    }
}

/// Unix seconds; negative values are rejected like any other bad number.
fn parse_timestamp(value: &str, field: StatsField, line: u64, policy: NumericPolicy) -> Result<i64, Error> {
    let ts = parse_number::<i64>(value, field, line, policy)?;
    if ts < 0 {
        return apply_policy(policy, line, format!("{} {} is negative", field, ts));
    }
    Ok(ts)
}

fn apply_policy<T: Default>(policy: NumericPolicy, line: u64, reason: String) -> Result<T, Error> {
    match policy {
        NumericPolicy::Strict => Err(Error::MalformedRecord { line, reason }),
        NumericPolicy::ZeroFill => {
            tracing::warn!("line {}: {}, using 0", line, reason);
            Ok(T::default())
        }
    }
}

/// Parses the recordings column.
///
/// Grammar: `'[' (token (',' token)*)? ']'`, where a token is any run of
/// characters other than `,`. Whitespace around the whole value is ignored;
/// tokens are returned as-is.
pub fn parse_record_list(value: &str) -> Result<Vec<String>, String> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("expected a bracketed list, got {:?}", value))?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str =
        "[rec1,rec2];1700000000;1700000070;1700000010;101;74951234567;;79161234567;1100;74950000000;ext;entry-1";

    #[test]
    fn parses_numeric_list() {
        assert_eq!(parse_record_list("[1,2,3]").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn parses_single_and_empty_lists() {
        assert_eq!(parse_record_list("[abc]").unwrap(), vec!["abc"]);
        assert!(parse_record_list("[]").unwrap().is_empty());
        assert!(parse_record_list(" [] ").unwrap().is_empty());
    }

    #[test]
    fn recovers_rendered_lists() {
        let lists: Vec<Vec<&str>> = vec![
            vec![],
            vec!["x"],
            vec!["MToxMDA6MTIz", "MToxMDA6NDU2"],
            vec!["1", "", "3"],
        ];
        for list in lists {
            let rendered = format!("[{}]", list.join(","));
            assert_eq!(parse_record_list(&rendered).unwrap(), list, "{}", rendered);
        }
    }

    #[test]
    fn rejects_unbracketed_list() {
        assert!(parse_record_list("").is_err());
        assert!(parse_record_list("[").is_err());
        assert!(parse_record_list("]").is_err());
        assert!(parse_record_list("1,2,3").is_err());
        assert!(parse_record_list("[1,2,3").is_err());
    }

    #[test]
    fn decodes_full_row_positionally() {
        let calls = decode_calls(ROW.as_bytes()).unwrap();
        assert_eq!(calls.len(), 1);
        let c = &calls[0];
        assert_eq!(c.records, vec!["rec1", "rec2"]);
        assert_eq!(c.start, 1_700_000_000);
        assert_eq!(c.finish, 1_700_000_070);
        assert_eq!(c.answer, 1_700_000_010);
        assert_eq!(c.from_extension, "101");
        assert_eq!(c.from_number, "74951234567");
        assert_eq!(c.to_extension, "");
        assert_eq!(c.to_number, "79161234567");
        assert_eq!(c.disconnect_reason, 1100);
        assert_eq!(c.line_number, "74950000000");
        assert_eq!(c.location, "ext");
        assert_eq!(c.entry_id, "entry-1");
    }

    #[test]
    fn short_row_fails() {
        let short = "[1];1;2;3;101;a;b;c;1100;line;ext";
        let err = decode_calls(short.as_bytes()).unwrap_err();
        match err {
            Error::MalformedRecord { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("found 11"), "{}", reason);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn preserves_row_order() {
        let body = format!(
            "{}\n{}\n",
            ROW,
            ROW.replace("entry-1", "entry-2").replace("1700000000", "1600000000")
        );
        let calls = decode_calls(body.as_bytes()).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].entry_id, "entry-1");
        assert_eq!(calls[1].entry_id, "entry-2");
        assert_eq!(calls[1].start, 1_600_000_000);
    }

    #[test]
    fn empty_body_decodes_to_nothing() {
        assert!(decode_calls(b"").unwrap().is_empty());
    }

    #[test]
    fn blank_answer_is_zero() {
        let row = ROW.replace(";1700000010;", ";;");
        let calls = decode_calls(row.as_bytes()).unwrap();
        assert_eq!(calls[0].answer, 0);
        assert!(!calls[0].was_answered());
    }

    #[test]
    fn strict_policy_rejects_bad_number() {
        let row = ROW.replace("1700000070", "soon");
        let err = decode_calls(row.as_bytes()).unwrap_err();
        match err {
            Error::MalformedRecord { reason, .. } => assert!(reason.contains("finish")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_fill_policy_substitutes_zero() {
        let row = ROW.replace("1700000070", "soon").replace(";1100;", ";x;");
        let options = DecodeOptions {
            numeric_policy: NumericPolicy::ZeroFill,
        };
        let calls = decode_calls_with(row.as_bytes(), &options).unwrap();
        assert_eq!(calls[0].finish, 0);
        assert_eq!(calls[0].disconnect_reason, 0);
        assert_eq!(calls[0].start, 1_700_000_000);
    }

    #[test]
    fn bad_list_fails_even_with_zero_fill() {
        let row = ROW.replace("[rec1,rec2]", "rec1");
        let options = DecodeOptions {
            numeric_policy: NumericPolicy::ZeroFill,
        };
        assert!(matches!(
            decode_calls_with(row.as_bytes(), &options),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn strict_policy_rejects_negative_timestamp() {
        let row = "[1];-100;-50;-1;101;a;;c;1100;line;ext;e";
        match decode_calls(row.as_bytes()).unwrap_err() {
            Error::MalformedRecord { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("start -100 is negative"), "{}", reason);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_fill_policy_clears_negative_timestamps() {
        let row = "[1];-100;-50;-1;101;a;;c;1100;line;ext;e";
        let options = DecodeOptions {
            numeric_policy: NumericPolicy::ZeroFill,
        };
        let calls = decode_calls_with(row.as_bytes(), &options).unwrap();
        assert_eq!((calls[0].start, calls[0].finish, calls[0].answer), (0, 0, 0));
        assert_eq!(calls[0].disconnect_reason, 1100);
    }

    #[test]
    fn strict_policy_rejects_blank_start() {
        let row = "[1];;;;101;a;;c;;line;ext;e";
        match decode_calls(row.as_bytes()).unwrap_err() {
            Error::MalformedRecord { reason, .. } => {
                assert!(reason.contains("start is empty"), "{}", reason)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strict_policy_rejects_blank_disconnect_reason() {
        let row = ROW.replace(";1100;", ";;");
        assert!(matches!(
            decode_calls(row.as_bytes()),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn zero_fill_policy_fills_blank_columns() {
        let row = "[1];;;;101;a;;c;;line;ext;e";
        let options = DecodeOptions {
            numeric_policy: NumericPolicy::ZeroFill,
        };
        let calls = decode_calls_with(row.as_bytes(), &options).unwrap();
        assert_eq!(calls[0].start, 0);
        assert_eq!(calls[0].finish, 0);
        assert_eq!(calls[0].disconnect_reason, 0);
    }

    #[test]
    fn invalid_utf8_body_is_rejected() {
        // location column in cp1251 instead of UTF-8
        let mut body = b"[1];1;2;3;101;a;;c;1100;line;".to_vec();
        body.extend_from_slice(&[0xCC, 0xF1, 0xEA]);
        body.extend_from_slice(b";e\n");
        assert!(matches!(
            decode_calls(&body),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn error_line_points_at_bad_row() {
        let body = format!("{}\n[1];1;2;3\n", ROW);
        match decode_calls(body.as_bytes()).unwrap_err() {
            Error::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
