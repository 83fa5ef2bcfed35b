use nextask_core::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (space or `T`) and bare `YYYY-MM-DD`.
/// Values without an offset are read in `offset`; bare dates mean midnight.
pub fn parse_due(raw: &str, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("due date is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let normalized = trimmed.replacen('T', " ", 1);
    let with_seconds = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day] [hour]:[minute]");

    if let Ok(parsed) = PrimitiveDateTime::parse(&normalized, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(&normalized, without_seconds))
    {
        return Ok(parsed.assume_offset(offset));
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_offset(offset))
        .map_err(|_| {
            AppError::validation(format!(
                "'{trimmed}' is not a date; use YYYY-MM-DD, YYYY-MM-DD HH:MM or RFC 3339"
            ))
        })
}
