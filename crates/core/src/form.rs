//! Book submission form: raw values, cleaning and field-level errors.
//!
//! A submitted form is cleaned in two passes. The first pass trims every
//! value, rejects blanks and parses the typed fields (price, date, ISBN).
//! The second pass runs the `validator` constraints declared on
//! [`BookDraft`]. Errors from both passes are collected per field so the
//! form can be re-rendered with every problem at once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

pub const FIELD_TITLE: &str = "title";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_PUBLICATION_DATE: &str = "publication_date";
pub const FIELD_ISBN: &str = "isbn";

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Digits allowed before the decimal point (`NUMERIC(10, 2)`).
pub const PRICE_MAX_WHOLE_DIGITS: usize = 8;

/// Digits allowed after the decimal point.
pub const PRICE_DECIMAL_PLACES: usize = 2;

/// Accepted `publication_date` input formats, tried in order.
///
/// `%Y` must be written with four digits and `%y` with two.
pub const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_NUMBER: &str = "Enter a number.";
pub const MSG_INVALID_DATE: &str = "Enter a valid date.";
pub const MSG_INVALID_ISBN: &str = "Enter a valid ISBN-10 or ISBN-13.";
pub const MSG_NEGATIVE_PRICE: &str = "Ensure this value is greater than or equal to 0.";
pub const MSG_DUPLICATE_ISBN: &str = "Book with this Isbn already exists.";

// ---------------------------------------------------------------------------
// Raw form
// ---------------------------------------------------------------------------

/// Raw, unvalidated values as submitted by the browser.
///
/// Every field is a string so a malformed number or date never fails
/// extraction; it becomes a field error instead. Missing fields arrive as
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub price: String,
    pub publication_date: String,
    pub isbn: String,
}

/// Validated values for a book, ready to be inserted or to replace an
/// existing row.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct BookDraft {
    #[validate(length(max = 200))]
    pub title: String,
    #[validate(length(max = 100))]
    pub author: String,
    pub price_cents: i64,
    pub publication_date: NaiveDate,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
}

impl BookForm {
    /// Build a form pre-filled from stored values, as shown on the edit page.
    pub fn from_values(
        title: &str,
        author: &str,
        price_cents: i64,
        publication_date: NaiveDate,
        isbn: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            price: format_price(price_cents),
            publication_date: publication_date.format("%Y-%m-%d").to_string(),
            isbn: isbn.to_string(),
        }
    }

    /// Clean and validate the submitted values.
    ///
    /// Returns the typed [`BookDraft`] or every field error found.
    pub fn clean(&self) -> Result<BookDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(&mut errors, FIELD_TITLE, &self.title);
        let author = required(&mut errors, FIELD_AUTHOR, &self.author);

        let price_cents = required(&mut errors, FIELD_PRICE, &self.price).and_then(|raw| {
            parse_price(raw)
                .map_err(|msg| errors.add(FIELD_PRICE, msg))
                .ok()
        });

        let publication_date = required(&mut errors, FIELD_PUBLICATION_DATE, &self.publication_date)
            .and_then(|raw| match parse_date(raw) {
                Some(date) => Some(date),
                None => {
                    errors.add(FIELD_PUBLICATION_DATE, MSG_INVALID_DATE);
                    None
                }
            });

        let isbn = required(&mut errors, FIELD_ISBN, &self.isbn).map(normalize_isbn);

        // Placeholders stand in for fields that already failed; their
        // validator errors are discarded below.
        let draft = BookDraft {
            title: title.unwrap_or_default().to_string(),
            author: author.unwrap_or_default().to_string(),
            price_cents: price_cents.unwrap_or_default(),
            publication_date: publication_date.unwrap_or(NaiveDate::MIN),
            isbn: isbn.unwrap_or_default(),
        };

        if let Err(validation) = draft.validate() {
            errors.merge_validation(&validation);
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

/// Trim `raw` and record a "required" error when nothing is left.
fn required<'a>(errors: &mut FieldErrors, field: &str, raw: &'a str) -> Option<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, MSG_REQUIRED);
        None
    } else {
        Some(trimmed)
    }
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Validation messages keyed by field name.
///
/// Serializes as a plain object (`{"title": ["..."]}`) so templates can look
/// up `errors.title` directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Fold `validator` errors in, skipping fields that already failed
    /// parsing.
    fn merge_validation(&mut self, validation: &ValidationErrors) {
        for (field, field_errors) in validation.field_errors() {
            let field = field.to_string();
            if self.has(&field) {
                continue;
            }
            for err in field_errors.iter() {
                self.add(&field, validation_message(err));
            }
        }
    }
}

/// User-facing text for a `validator` error.
fn validation_message(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    match (&*err.code, err.params.get("max"), err.params.get("value")) {
        ("length", Some(max), Some(serde_json::Value::String(value))) => format!(
            "Ensure this value has at most {max} characters (it has {}).",
            value.chars().count()
        ),
        (code, _, _) => format!("Invalid value ({code})."),
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Parse a decimal price (`"12"`, `"12.5"`, `"12.50"`, `".99"`) into cents.
///
/// Returns the user-facing message on failure.
pub fn parse_price(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(MSG_INVALID_NUMBER.to_string());
    }

    if fraction.len() > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }

    let significant = whole.trim_start_matches('0');
    if significant.len() > PRICE_MAX_WHOLE_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_WHOLE_DIGITS} digits \
             before the decimal point."
        ));
    }

    // Both parts are bounded digit strings at this point.
    let whole_value: i64 = if significant.is_empty() {
        0
    } else {
        significant.parse().map_err(|_| MSG_INVALID_NUMBER.to_string())?
    };
    let fraction_value: i64 = format!("{fraction:0<width$}", width = PRICE_DECIMAL_PLACES)
        .parse()
        .map_err(|_| MSG_INVALID_NUMBER.to_string())?;

    let cents = whole_value * 100 + fraction_value;
    if negative && cents > 0 {
        return Err(MSG_NEGATIVE_PRICE.to_string());
    }
    Ok(cents)
}

/// Render cents as a two-decimal amount (`1299` -> `"12.99"`).
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// Parse a publication date in any of [`DATE_INPUT_FORMATS`].
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .filter(|fmt| year_width_matches(raw, fmt))
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// chrono reads `%Y` with any number of digits, so `"03/14/20"` would
/// otherwise become the year 20.
fn year_width_matches(raw: &str, fmt: &str) -> bool {
    let sep = if fmt.contains('/') { '/' } else { '-' };
    let width = |spec: &str| match spec {
        "%Y" => Some(4),
        "%y" => Some(2),
        _ => None,
    };
    fmt.split(sep)
        .zip(raw.split(sep))
        .all(|(spec, value)| width(spec).is_none_or(|w| value.len() == w))
}

// ---------------------------------------------------------------------------
// ISBN
// ---------------------------------------------------------------------------

/// Strip hyphens and spaces and upper-case a trailing `x`.
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Check an already-normalized ISBN-10 or ISBN-13, including its check digit.
pub fn is_valid_isbn(isbn: &str) -> bool {
    match isbn.len() {
        10 => is_valid_isbn10(isbn),
        13 => is_valid_isbn13(isbn),
        _ => false,
    }
}

fn is_valid_isbn10(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let digit = match (i, c) {
            (9, 'X') => 10,
            (_, c) => match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            },
        };
        sum += (10 - i as u32) * digit;
    }
    sum % 11 == 0
}

fn is_valid_isbn13(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        sum += if i % 2 == 0 { digit } else { digit * 3 };
    }
    sum % 10 == 0
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if is_valid_isbn(isbn) {
        Ok(())
    } else {
        Err(ValidationError::new("isbn").with_message(MSG_INVALID_ISBN.into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
