//! Recursive-descent parser over the token stream produced by
//! `lexer::lex`. The grammar's three `at`-clause shapes (day, hour,
//! minute) and two `retry`-clause shapes (plural, singular) are
//! disambiguated with a couple of tokens of lookahead rather than
//! generic backtracking — each shape is distinguishable from the
//! tokens immediately following the keyword that introduces it.

use chrono::Weekday;

use crate::entry::{AtClause, AtPart, DayValue, Frequency, FrequencyUnit, RetryClause, RetryUnit, TaskEntry};
use crate::error::{ParseError, Result};
use crate::lexer::{lex, Token, TokenKind};

pub fn parse_schedule(source: &str) -> Result<Vec<TaskEntry>> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut entries = Vec::new();
    while parser.pos < parser.tokens.len() {
        entries.push(parser.parse_entry()?);
    }
    Ok(entries)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.position)
            .unwrap_or_else(|| self.tokens.last().map(|t| t.position + 1).unwrap_or(0))
    }

    fn advance(&mut self) -> Result<Token> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| {
            ParseError::syntax(self.position(), "unexpected end of input")
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_word(&mut self, expected: &str) -> Result<usize> {
        let position = self.position();
        let token = self.advance()?;
        match &token.kind {
            TokenKind::Word(w) if w.eq_ignore_ascii_case(expected) => Ok(position),
            _ => Err(ParseError::syntax(position, format!("expected '{expected}'"))),
        }
    }

    /// True (and consumes) if the next token is `word`, without erroring otherwise.
    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(0), Some(TokenKind::Word(w)) if w.eq_ignore_ascii_case(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_number(&mut self) -> Result<(u32, usize)> {
        let position = self.position();
        let token = self.advance()?;
        match token.kind {
            TokenKind::Number(n) => Ok((n, position)),
            _ => Err(ParseError::syntax(position, "expected a number")),
        }
    }

    fn expect_separator(&mut self) -> Result<()> {
        let position = self.position();
        let token = self.advance()?;
        match token.kind {
            TokenKind::Colon | TokenKind::Dot => Ok(()),
            _ => Err(ParseError::syntax(position, "expected ':' or '.'")),
        }
    }

    fn expect_quoted_string(&mut self) -> Result<String> {
        let position = self.position();
        let token = self.advance()?;
        match token.kind {
            TokenKind::QuotedString(s) => Ok(s),
            _ => Err(ParseError::syntax(position, "expected a quoted command")),
        }
    }

    fn expect_semicolon(&mut self) -> Result<()> {
        let position = self.position();
        let token = self.advance()?;
        match token.kind {
            TokenKind::Semicolon => Ok(()),
            _ => Err(ParseError::syntax(position, "expected ';'")),
        }
    }

    fn parse_entry(&mut self) -> Result<TaskEntry> {
        self.expect_word("run")?;
        let command = self.expect_quoted_string()?;
        self.expect_word("every")?;
        let frequency = self.parse_frequency()?;
        let at = self.parse_at_clause()?;
        let retry = self.parse_retry_clause()?;
        self.expect_semicolon()?;
        Ok(TaskEntry { command, frequency, at, retry })
    }

    fn parse_frequency(&mut self) -> Result<Frequency> {
        // frequency_plural: uint unit-plural. frequency_singular: unit-singular (count defaults to 1).
        if matches!(self.peek(0), Some(TokenKind::Number(_))) {
            let (count, _) = self.expect_number()?;
            let unit = self.expect_frequency_unit(FREQUENCY_PLURAL)?;
            Ok(Frequency { count, unit })
        } else {
            let unit = self.expect_frequency_unit(FREQUENCY_SINGULAR)?;
            Ok(Frequency { count: 1, unit })
        }
    }

    fn expect_frequency_unit(&mut self, table: &[(&str, FrequencyUnit)]) -> Result<FrequencyUnit> {
        let position = self.position();
        let token = self.advance()?;
        match &token.kind {
            TokenKind::Word(w) => table
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(w))
                .map(|(_, unit)| *unit)
                .ok_or_else(|| ParseError::syntax(position, format!("'{w}' is not a recognized frequency unit"))),
            _ => Err(ParseError::syntax(position, "expected a frequency unit")),
        }
    }

    fn parse_at_clause(&mut self) -> Result<AtClause> {
        if !self.eat_word("at") {
            return Ok(AtClause::None);
        }

        let day = if let Some(weekday) = self.peek_weekday() {
            self.pos += 1;
            DayValue::Weekday(weekday)
        } else if matches!(self.peek(0), Some(TokenKind::Number(_)))
            && matches!(self.peek(1), Some(TokenKind::Number(_)))
        {
            // at_day, integer form: day hour ( : | . ) minute
            let (day, position) = self.expect_number()?;
            validate_range(position, "day-of-month", day, 1, 31)?;
            DayValue::MonthDay(day)
        } else {
            DayValue::Unspecified
        };

        match day {
            DayValue::Weekday(_) | DayValue::MonthDay(_) => {
                let (hour, hour_pos) = self.expect_number()?;
                validate_range(hour_pos, "hour", hour, 0, 24)?;
                self.expect_separator()?;
                let (minute, minute_pos) = self.expect_number()?;
                validate_range(minute_pos, "minute", minute, 0, 59)?;
                Ok(AtClause::Present(AtPart { day, hour, minute }))
            }
            DayValue::Unspecified => {
                // at_hour: hour ( : | . ) minute, or at_minute: bare minute.
                let (first, first_pos) = self.expect_number()?;
                if matches!(self.peek(0), Some(TokenKind::Colon) | Some(TokenKind::Dot)) {
                    validate_range(first_pos, "hour", first, 0, 24)?;
                    self.expect_separator()?;
                    let (minute, minute_pos) = self.expect_number()?;
                    validate_range(minute_pos, "minute", minute, 0, 59)?;
                    Ok(AtClause::Present(AtPart { day: DayValue::Unspecified, hour: first, minute }))
                } else {
                    validate_range(first_pos, "minute", first, 0, 59)?;
                    Ok(AtClause::Present(AtPart { day: DayValue::Unspecified, hour: 0, minute: first }))
                }
            }
        }
    }

    fn peek_weekday(&self) -> Option<Weekday> {
        match self.peek(0) {
            Some(TokenKind::Word(w)) => WEEKDAYS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(w))
                .map(|(_, day)| *day),
            _ => None,
        }
    }

    fn parse_retry_clause(&mut self) -> Result<RetryClause> {
        if !(self.eat_word("retry") && self.eat_word("after")) {
            return Ok(RetryClause::none());
        }

        if matches!(self.peek(0), Some(TokenKind::Number(_))) {
            // retry_plural: uint unit-plural [times]
            let (count, _) = self.expect_number()?;
            let unit = self.expect_retry_unit(RETRY_PLURAL)?;
            let retries_count = self.parse_retry_times()?;
            Ok(RetryClause { retry_time_count: count, retry_time_unit: unit, retries_count })
        } else {
            // retry_singular: [a|an] unit-singular [times], count implicitly 1
            self.eat_word("a") || self.eat_word("an");
            let unit = self.expect_retry_unit(RETRY_SINGULAR)?;
            let retries_count = self.parse_retry_times()?;
            Ok(RetryClause { retry_time_count: 1, retry_time_unit: unit, retries_count })
        }
    }

    fn expect_retry_unit(&mut self, table: &[(&str, RetryUnit)]) -> Result<RetryUnit> {
        let position = self.position();
        let token = self.advance()?;
        match &token.kind {
            TokenKind::Word(w) => table
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(w))
                .map(|(_, unit)| *unit)
                .ok_or_else(|| ParseError::syntax(position, format!("'{w}' is not a recognized retry unit"))),
            _ => Err(ParseError::syntax(position, "expected a retry time unit")),
        }
    }

    /// `[N times]`, defaulting to 1 when the clause is present but this
    /// optional suffix is omitted (matches `retry_times_placeholder`).
    fn parse_retry_times(&mut self) -> Result<u32> {
        if matches!(self.peek(0), Some(TokenKind::Number(_))) {
            let (count, _) = self.expect_number()?;
            if !(self.eat_word("time") || self.eat_word("times")) {
                return Err(ParseError::syntax(self.position(), "expected 'time' or 'times'"));
            }
            Ok(count)
        } else {
            Ok(1)
        }
    }
}

fn validate_range(position: usize, what: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        Err(ParseError::syntax(position, format!("{what} {value} is out of range [{min}, {max}]")))
    } else {
        Ok(())
    }
}

const FREQUENCY_PLURAL: &[(&str, FrequencyUnit)] = &[
    ("minutes", FrequencyUnit::Minutes),
    ("hours", FrequencyUnit::Hours),
    ("days", FrequencyUnit::Days),
    ("weeks", FrequencyUnit::Weeks),
    ("months", FrequencyUnit::Months),
];

const FREQUENCY_SINGULAR: &[(&str, FrequencyUnit)] = &[
    ("minute", FrequencyUnit::Minutes),
    ("hour", FrequencyUnit::Hours),
    ("day", FrequencyUnit::Days),
    ("week", FrequencyUnit::Weeks),
    ("month", FrequencyUnit::Months),
];

const RETRY_PLURAL: &[(&str, RetryUnit)] = &[
    ("seconds", RetryUnit::Seconds),
    ("minutes", RetryUnit::Minutes),
    ("hours", RetryUnit::Hours),
    ("days", RetryUnit::Days),
];

const RETRY_SINGULAR: &[(&str, RetryUnit)] = &[
    ("second", RetryUnit::Seconds),
    ("minute", RetryUnit::Minutes),
    ("hour", RetryUnit::Hours),
    ("day", RetryUnit::Days),
];

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];
