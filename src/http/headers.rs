use crate::error::RequestError;

/// Ordered list of header key/value pairs.
///
/// Order is preserved and decides the order in which headers are written onto
/// a request. Duplicate keys are kept; how they collapse is decided when the
/// set is applied to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    pairs: Vec<(String, String)>,
}

impl HeaderSet {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Builds a header set from a flat `key, value, key, value, ...` list.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MalformedHeaderList`] when the list has an odd
    /// number of entries.
    pub fn build<S>(flat: &[S]) -> Result<Self, RequestError>
    where
        S: AsRef<str>,
    {
        if flat.len() % 2 != 0 {
            return Err(RequestError::MalformedHeaderList { len: flat.len() });
        }
        let pairs = flat
            .chunks_exact(2)
            .filter_map(|chunk| match chunk {
                [key, value] => Some((key.as_ref().to_owned(), value.as_ref().to_owned())),
                _ => None,
            })
            .collect();
        Ok(Self { pairs })
    }

    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Parses `Key: Value` lines, as written in plan files.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidHeaderLine`] for a line without a `:`.
    pub fn parse_lines<S>(lines: &[S]) -> Result<Self, RequestError>
    where
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for line in lines {
            let line = line.as_ref();
            let (key, value) =
                line.split_once(':')
                    .ok_or_else(|| RequestError::InvalidHeaderLine {
                        line: line.to_owned(),
                    })?;
            set.push(key.trim(), value.trim());
        }
        Ok(set)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends every pair of `other` after the pairs already present.
    pub fn extend(&mut self, other: &HeaderSet) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(key))
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
