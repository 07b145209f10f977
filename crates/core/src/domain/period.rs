use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDateTime, TimeDelta, TimeZone};
use thiserror::Error;

/// Local wall-clock timestamp without an offset, the form Mixpanel selectors compare against.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

impl PeriodUnit {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "sec" | "secs" | "second" | "seconds" => Some(Self::Second),
            "min" | "mins" | "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            "week" | "weeks" => Some(Self::Week),
            "fortnight" | "fortnights" => Some(Self::Fortnight),
            "month" | "months" => Some(Self::Month),
            "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    /// Units measured as elapsed time rather than on the local wall clock.
    fn is_elapsed(self) -> bool {
        matches!(self, Self::Second | Self::Minute | Self::Hour)
    }

    /// Fixed length in seconds; `None` for calendar units.
    fn fixed_seconds(self) -> Option<i64> {
        match self {
            Self::Second => Some(1),
            Self::Minute => Some(60),
            Self::Hour => Some(3_600),
            Self::Day => Some(86_400),
            Self::Week => Some(7 * 86_400),
            Self::Fortnight => Some(14 * 86_400),
            Self::Month | Self::Year => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodTerm {
    pub amount: u32,
    pub unit: PeriodUnit,
}

/// A relative span such as `1 week`, `15 minutes` or `2 hours 30 mins`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelativePeriod {
    terms: Vec<PeriodTerm>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("time period is empty")]
    Empty,
    #[error("unknown time unit `{0}`")]
    UnknownUnit(String),
    #[error("amount `{0}` is not followed by a time unit")]
    MissingUnit(String),
    #[error("amount `{0}` is out of range")]
    OutOfRange(String),
    #[error("time period reaches outside the supported calendar range")]
    Overflow,
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Number(String),
    Word(String),
}

impl RelativePeriod {
    pub fn terms(&self) -> &[PeriodTerm] {
        &self.terms
    }

    /// Time `self` before `now`, rendered on `now`'s local wall clock.
    ///
    /// Second, minute and hour terms are subtracted from the absolute instant so they span
    /// real elapsed time across DST changes; the remaining terms move the local wall clock.
    pub fn cutoff_before<Z: TimeZone>(&self, now: &DateTime<Z>) -> Result<NaiveDateTime, PeriodError> {
        let mut instant = now.clone();
        for term in self.terms.iter().filter(|term| term.unit.is_elapsed()) {
            let delta = term.fixed_delta()?.ok_or(PeriodError::Overflow)?;
            instant = instant.checked_sub_signed(delta).ok_or(PeriodError::Overflow)?;
        }

        let mut local = instant.naive_local();
        for term in self.terms.iter().filter(|term| !term.unit.is_elapsed()) {
            local = match term.fixed_delta()? {
                Some(delta) => local.checked_sub_signed(delta).ok_or(PeriodError::Overflow)?,
                None => {
                    let months = match term.unit {
                        PeriodUnit::Year => {
                            term.amount.checked_mul(12).ok_or(PeriodError::Overflow)?
                        }
                        _ => term.amount,
                    };
                    local.checked_sub_months(Months::new(months)).ok_or(PeriodError::Overflow)?
                }
            };
        }

        Ok(local)
    }
}

impl PeriodTerm {
    fn fixed_delta(&self) -> Result<Option<TimeDelta>, PeriodError> {
        let Some(unit_seconds) = self.unit.fixed_seconds() else {
            return Ok(None);
        };
        let seconds =
            unit_seconds.checked_mul(i64::from(self.amount)).ok_or(PeriodError::Overflow)?;
        TimeDelta::try_seconds(seconds).map(Some).ok_or(PeriodError::Overflow)
    }
}

impl FromStr for RelativePeriod {
    type Err = PeriodError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        let mut pending: Option<(u32, String)> = None;

        for token in tokenize(input)? {
            match token {
                Token::Number(raw) => {
                    if let Some((_, previous)) = pending.take() {
                        return Err(PeriodError::MissingUnit(previous));
                    }
                    let amount =
                        raw.parse::<u32>().map_err(|_| PeriodError::OutOfRange(raw.clone()))?;
                    pending = Some((amount, raw));
                }
                Token::Word(word) => {
                    if pending.is_none() && matches!(word.as_str(), "a" | "an") {
                        pending = Some((1, word));
                        continue;
                    }
                    if pending.is_none() && word == "and" {
                        continue;
                    }

                    let unit = PeriodUnit::parse(&word).ok_or(PeriodError::UnknownUnit(word))?;
                    let amount = pending.take().map(|(amount, _)| amount).unwrap_or(1);
                    terms.push(PeriodTerm { amount, unit });
                }
            }
        }

        if let Some((_, raw)) = pending {
            return Err(PeriodError::MissingUnit(raw));
        }
        if terms.is_empty() {
            return Err(PeriodError::Empty);
        }

        Ok(Self { terms })
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, PeriodError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() || ch == ',' || ch == '+' {
            chars.next();
        } else if ch.is_ascii_digit() {
            let mut number = String::new();
            while let Some(&digit) = chars.peek().filter(|next| next.is_ascii_digit()) {
                number.push(digit);
                chars.next();
            }
            tokens.push(Token::Number(number));
        } else if ch.is_alphabetic() {
            let mut word = String::new();
            while let Some(&letter) = chars.peek().filter(|next| next.is_alphabetic()) {
                word.extend(letter.to_lowercase());
                chars.next();
            }
            tokens.push(Token::Word(word));
        } else {
            return Err(PeriodError::UnknownUnit(ch.to_string()));
        }
    }

    Ok(tokens)
}

pub fn format_local_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}
