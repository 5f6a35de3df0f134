//! Query-string encoding for GET parameters.
//!
//! Each parameter record writes its fields into a [`Query`] explicitly.
//! Fields the remote API treats as optional are written with the
//! `*_nonzero` / `*_nonempty` helpers, which drop the key entirely when the
//! value is the type's zero value.

use url::form_urlencoded;

/// Ordered list of query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always writes `key=value`.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Writes `key=value` unless `value` is zero.
    pub fn push_nonzero(&mut self, key: &str, value: i64) -> &mut Self {
        if value != 0 {
            self.push(key, value);
        }
        self
    }

    /// Writes `key=value` unless `value` is empty.
    pub fn push_nonempty(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `application/x-www-form-urlencoded` rendering, without a leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Parse an encoded query string back into pairs.
    pub fn parse(encoded: &str) -> Self {
        let pairs = form_urlencoded::parse(encoded.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }
}

/// A record that can be sent as GET query parameters.
pub trait ToQuery {
    fn write_query(&self, query: &mut Query);

    fn to_query(&self) -> Query {
        let mut query = Query::new();
        self.write_query(&mut query);
        query
    }
}

impl ToQuery for Query {
    fn write_query(&self, query: &mut Query) {
        query.pairs.extend(self.pairs.iter().cloned());
    }
}
