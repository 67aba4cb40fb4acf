//! OnigRegExp - single pattern facade over `OnigScanner`

use crate::cache::{default_cache, SharedPatternCache};
use crate::error::ScanError;
use crate::text::{OnigString, ScanInput};

use super::{OnigCapture, OnigScanner};

/// Source of an `OnigRegExp`.
///
/// `Literal` keeps the legacy behavior where a boolean was accepted in place
/// of a pattern: no scanner is built and only `test` gives an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegExpSource {
    Pattern(String),
    Literal(bool),
}

impl From<&str> for RegExpSource {
    fn from(pattern: &str) -> Self {
        RegExpSource::Pattern(pattern.to_string())
    }
}

impl From<String> for RegExpSource {
    fn from(pattern: String) -> Self {
        RegExpSource::Pattern(pattern)
    }
}

impl From<bool> for RegExpSource {
    fn from(value: bool) -> Self {
        RegExpSource::Literal(value)
    }
}

/// Subject of `OnigRegExp::test_sync`
#[derive(Debug, Clone)]
pub enum TestSubject<'a> {
    Text(ScanInput<'a>),
    /// Legacy path: compared by value against a `RegExpSource::Literal`
    Literal(bool),
}

impl<'a> From<ScanInput<'a>> for TestSubject<'a> {
    fn from(input: ScanInput<'a>) -> Self {
        TestSubject::Text(input)
    }
}

impl<'a> From<&'a OnigString> for TestSubject<'a> {
    fn from(text: &'a OnigString) -> Self {
        TestSubject::Text(ScanInput::Borrowed(text))
    }
}

impl From<OnigString> for TestSubject<'_> {
    fn from(text: OnigString) -> Self {
        TestSubject::Text(ScanInput::Owned(text))
    }
}

impl From<&str> for TestSubject<'_> {
    fn from(text: &str) -> Self {
        TestSubject::Text(text.into())
    }
}

impl From<String> for TestSubject<'_> {
    fn from(text: String) -> Self {
        TestSubject::Text(text.into())
    }
}

impl TestSubject<'_> {
    pub fn literal(value: bool) -> Self {
        TestSubject::Literal(value)
    }
}

#[derive(Debug)]
pub struct OnigRegExp {
    source: RegExpSource,
    scanner: Option<OnigScanner>,
}

impl OnigRegExp {
    pub fn new(source: impl Into<RegExpSource>) -> Self {
        Self::with_cache(source, default_cache())
    }

    pub fn with_cache(source: impl Into<RegExpSource>, cache: SharedPatternCache) -> Self {
        let source = source.into();
        let scanner = match &source {
            RegExpSource::Pattern(pattern) => Some(OnigScanner::with_cache(&[pattern.as_str()], cache)),
            RegExpSource::Literal(_) => None,
        };
        Self { source, scanner }
    }

    pub fn source(&self) -> &RegExpSource {
        &self.source
    }

    /// Search from `start_position` (UTF-16 units). Each capture carries the
    /// text it matched; `Ok(None)` means no match.
    pub fn search_sync<'a>(
        &self,
        input: impl Into<ScanInput<'a>>,
        start_position: usize,
    ) -> Result<Option<Vec<OnigCapture>>, ScanError> {
        let scanner = self.scanner()?;
        let input = input.into();
        let Some(found) = scanner.find_next_match_sync(input.as_onig_string(), start_position)? else {
            return Ok(None);
        };

        let text = input.as_onig_string();
        let captures = found
            .capture_indices
            .into_iter()
            .map(|capture| OnigCapture {
                matched: text.substring(capture.start, capture.end),
                index: capture.index,
                start: capture.start,
                end: capture.end,
                length: capture.length,
            })
            .collect();
        Ok(Some(captures))
    }

    /// Callback form of `search_sync`; the callback runs before this returns
    pub fn search<'a, F>(&self, input: impl Into<ScanInput<'a>>, start_position: usize, callback: F)
    where
        F: FnOnce(Result<Option<Vec<OnigCapture>>, ScanError>),
    {
        callback(self.search_sync(input, start_position));
    }

    /// True if the pattern matches anywhere in the text.
    ///
    /// When either side is a boolean literal the two are compared by value
    /// instead, so a literal never equals text.
    pub fn test_sync<'a>(&self, subject: impl Into<TestSubject<'a>>) -> Result<bool, ScanError> {
        match (&self.source, subject.into()) {
            (RegExpSource::Literal(a), TestSubject::Literal(b)) => Ok(*a == b),
            (RegExpSource::Literal(_), TestSubject::Text(_)) => Ok(false),
            (RegExpSource::Pattern(_), TestSubject::Literal(_)) => Ok(false),
            (RegExpSource::Pattern(_), TestSubject::Text(input)) => {
                Ok(self.search_sync(input.as_onig_string(), 0)?.is_some())
            }
        }
    }

    pub fn test<'a, F>(&self, subject: impl Into<TestSubject<'a>>, callback: F)
    where
        F: FnOnce(Result<bool, ScanError>),
    {
        callback(self.test_sync(subject));
    }

    fn scanner(&self) -> Result<&OnigScanner, ScanError> {
        self.scanner.as_ref().ok_or_else(|| {
            ScanError::InvalidArgument("regular expression source is not a pattern string".to_string())
        })
    }
}
