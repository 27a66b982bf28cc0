//! Ordered, case-normalizing header map.
//!
//! Names are folded to lowercase when stored, lookups ignore ASCII case, and a name that
//! occurs more than once keeps its first position while its values are joined with `", "`.

use std::fmt;

use crate::codec::HeaderDecoder;
use crate::protocol::ParseError;

/// A mapping from lowercase header name to value, iterated in first-seen order.
///
/// The same type is used for request headers, response headers and trailers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    #[inline]
    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(stored, _)| stored.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Adds a value, merging with an existing value of the same name as `"old, new"`.
    pub fn append<N, V>(&mut self, name: N, value: V)
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        let name = name.as_ref();
        let value = value.into();
        match self.position(name) {
            Some(index) => {
                let existing = &mut self.entries[index].1;
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    /// Replaces the value for `name`, keeping its position if it already exists.
    pub fn set<N, V>(&mut self, name: N, value: V)
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        let name = name.as_ref();
        let value = value.into();
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses at most one field-line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the header section is finished:
    ///
    /// - `(0, false)`: no CRLF yet, more data is needed
    /// - `(2, true)`: the empty line terminating the section
    /// - `(n, false)`: one field-line of `n` bytes (CRLF included) was merged into `self`
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        HeaderDecoder::decode_field_line(data, self)
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
