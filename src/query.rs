//! Query parameter sets and their bracket-array string form.
//!
//! Sequences render as repeated `name[]=value` pairs, and parsing accepts
//! `name[]=`, indexed `name[0]=` and plain repeated keys as sequences.

use indexmap::IndexMap;
use url::form_urlencoded;

/// A single query parameter value: a scalar or an ordered sequence of scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Rendered as `name=value`.
    Scalar(String),
    /// Rendered as repeated `name[]=value` pairs, in order.
    List(Vec<String>),
}

impl QueryValue {
    /// Returns the scalar value, if this is not a sequence.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(value) => Some(value),
            QueryValue::List(_) => None,
        }
    }

    /// Returns the sequence values, if this is a sequence.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            QueryValue::List(values) => Some(values),
            QueryValue::Scalar(_) => None,
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from!(&str, String, &String, bool, i32, i64, u32, u64, usize);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// An insertion-ordered mapping from parameter name to [`QueryValue`].
///
/// Rendering is deterministic: keys appear in insertion order, and replacing
/// the value of an existing key keeps its position.
///
/// # Examples
///
/// ```
/// use restling::query::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.insert("sort", "name");
/// params.insert("ids", vec![1, 2]);
///
/// assert_eq!(params.to_query_string(), "sort=name&ids%5B%5D=1&ids%5B%5D=2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(IndexMap<String, QueryValue>);

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// Removes `key`, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Merges `other` into `self` key-wise; values from `other` win on collision.
    pub fn merge(&mut self, other: &QueryParams) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Parses a query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match sequence_name(&key) {
                Some(name) => params.push(name, value.into_owned()),
                None if params.0.contains_key(&*key) => {
                    params.push(&key, value.into_owned())
                }
                None => {
                    params
                        .0
                        .insert(key.into_owned(), QueryValue::Scalar(value.into_owned()));
                }
            }
        }

        params
    }

    /// Renders the set as an `application/x-www-form-urlencoded` query string.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        for (key, value) in &self.0 {
            match value {
                QueryValue::Scalar(value) => {
                    serializer.append_pair(key, value);
                }
                QueryValue::List(values) => {
                    let key = format!("{key}[]");
                    for value in values {
                        serializer.append_pair(&key, value);
                    }
                }
            }
        }

        serializer.finish()
    }

    fn push(&mut self, name: &str, value: String) {
        let entry = self
            .0
            .entry(name.to_string())
            .or_insert_with(|| QueryValue::List(Vec::new()));

        if let QueryValue::Scalar(first) = entry {
            let first = std::mem::take(first);
            *entry = QueryValue::List(vec![first]);
        }
        if let QueryValue::List(values) = entry {
            values.push(value);
        }
    }
}

/// Returns the base name of `name[]` and `name[<index>]` keys.
fn sequence_name(key: &str) -> Option<&str> {
    let inner = key.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (name, index) = (&inner[..open], &inner[open + 1..]);

    if name.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(name)
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K, V> Extend<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
