use agentcore_core::errors::ToolError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

use super::Tool;

#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentTime;

#[async_trait]
impl Tool for CurrentTime {
    fn name(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        "Get the current date and time as an ISO 8601 timestamp in UTC, an IANA timezone or a fixed UTC offset."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "`UTC` (default), an IANA zone such as `America/New_York`, or a fixed offset such as `+05:30`"
                }
            }
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let timezone = match input.get("timezone") {
            None | Some(Value::Null) => "UTC",
            Some(value) => value.as_str().ok_or_else(|| {
                ToolError::InvalidArgument("The 'timezone' parameter must be a string".to_string())
            })?,
        };

        let iso_time = format_time(Utc::now(), timezone)?;
        Ok(json!({ "timezone": timezone, "iso_time": iso_time }))
    }
}

/// Named zones take precedence over the fixed-offset forms.
pub fn format_time(now: DateTime<Utc>, timezone: &str) -> Result<String, ToolError> {
    if let Ok(zone) = timezone.trim().parse::<Tz>() {
        return Ok(now.with_timezone(&zone).to_rfc3339());
    }
    let offset = parse_offset(timezone)?;
    Ok(now.with_timezone(&offset).to_rfc3339())
}

fn parse_offset(timezone: &str) -> Result<FixedOffset, ToolError> {
    let trimmed = timezone.trim();
    if matches!(trimmed.to_ascii_uppercase().as_str(), "UTC" | "Z" | "GMT") {
        return FixedOffset::east_opt(0).ok_or_else(|| unsupported(timezone));
    }

    let (sign, digits) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(unsupported(timezone));
    };
    let digits = digits.replace(':', "");
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(unsupported(timezone));
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok(), Some(0)),
        4 => (digits[..2].parse::<i32>().ok(), digits[2..].parse::<i32>().ok()),
        _ => (None, None),
    };
    let (Some(hours), Some(minutes)) = (hours, minutes) else {
        return Err(unsupported(timezone));
    };
    if hours > 23 || minutes > 59 {
        return Err(unsupported(timezone));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(|| unsupported(timezone))
}

fn unsupported(timezone: &str) -> ToolError {
    ToolError::InvalidArgument(format!(
        "unsupported timezone `{timezone}` (expected UTC, an IANA zone or an offset like +05:30)"
    ))
}
