pub mod offset_table;
pub mod onig_string;
pub mod position;

pub use offset_table::*;
pub use onig_string::*;
pub use position::*;

/// Text handed to a scanner: either raw text to wrap, or a prebuilt
/// `OnigString` whose encoding is reused across searches.
#[derive(Debug, Clone)]
pub enum ScanInput<'a> {
    Owned(OnigString),
    Borrowed(&'a OnigString),
}

impl ScanInput<'_> {
    pub fn as_onig_string(&self) -> &OnigString {
        match self {
            ScanInput::Owned(text) => text,
            ScanInput::Borrowed(text) => text,
        }
    }
}

impl<'a> From<&'a OnigString> for ScanInput<'a> {
    fn from(text: &'a OnigString) -> Self {
        ScanInput::Borrowed(text)
    }
}

impl From<OnigString> for ScanInput<'_> {
    fn from(text: OnigString) -> Self {
        ScanInput::Owned(text)
    }
}

impl From<&str> for ScanInput<'_> {
    fn from(text: &str) -> Self {
        ScanInput::Owned(OnigString::from(text))
    }
}

impl From<&String> for ScanInput<'_> {
    fn from(text: &String) -> Self {
        ScanInput::Owned(OnigString::from(text))
    }
}

impl From<String> for ScanInput<'_> {
    fn from(text: String) -> Self {
        ScanInput::Owned(OnigString::from(text))
    }
}

impl From<Vec<u16>> for ScanInput<'_> {
    fn from(units: Vec<u16>) -> Self {
        ScanInput::Owned(OnigString::from_utf16(units))
    }
}
