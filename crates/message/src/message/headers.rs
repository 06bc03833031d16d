use std::collections::HashMap;

/// A header value as handed to the header setters.
///
/// A single string is split on `;` into tokens, a list is taken token by token. Both
/// shapes converge to the same normalized list: tokens trimmed, empty tokens dropped,
/// duplicates removed while keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    Single(String),
    List(Vec<String>),
}

impl HeaderValues {
    /// Returns the normalized token list.
    pub fn normalize(self) -> Vec<String> {
        match self {
            HeaderValues::Single(value) => dedupe(value.split(';')),
            HeaderValues::List(values) => dedupe(values.iter().map(String::as_str)),
        }
    }
}

fn dedupe<'a, I: Iterator<Item = &'a str>>(tokens: I) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for token in tokens.map(str::trim).filter(|token| !token.is_empty()) {
        if !values.iter().any(|value| value == token) {
            values.push(token.to_owned());
        }
    }
    values
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues::Single(value.to_owned())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues::Single(value)
    }
}

impl From<&String> for HeaderValues {
    fn from(value: &String) -> Self {
        HeaderValues::Single(value.clone())
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        HeaderValues::List(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        HeaderValues::List(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValues {
    fn from(values: [&str; N]) -> Self {
        HeaderValues::List(values.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[String]> for HeaderValues {
    fn from(values: &[String]) -> Self {
        HeaderValues::List(values.to_vec())
    }
}

/// Ordered header collection with case-insensitive lookup.
///
/// Names keep the casing they were first stored with. A header whose normalized value
/// list is empty is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    /// lowercased name -> stored name
    index: HashMap<String, String>,
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let stored = self.index.get(&name.to_ascii_lowercase())?;
        self.entries.iter().position(|(entry, _)| entry == stored)
    }

    /// Returns true if a header matching `name` case-insensitively exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the values of `name`, empty if the header does not exist.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(position) => &self.entries[position].1,
            None => &[],
        }
    }

    /// Returns the values of `name` joined with `", "`.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Replaces any header matching `name` with the normalized `value`.
    ///
    /// The header is removed if `value` normalizes to an empty list.
    pub fn set<V: Into<HeaderValues>>(&mut self, name: &str, value: V) {
        let values = value.into().normalize();
        if values.is_empty() {
            self.remove(name);
            return;
        }

        let key = name.to_ascii_lowercase();
        match self.position(name) {
            Some(position) => self.entries[position] = (name.to_owned(), values),
            None => self.entries.push((name.to_owned(), values)),
        }
        self.index.insert(key, name.to_owned());
    }

    /// Merges the normalized `value` into the header matching `name`.
    ///
    /// An existing header keeps its stored name, otherwise `name` is used.
    pub fn append<V: Into<HeaderValues>>(&mut self, name: &str, value: V) {
        let added = value.into().normalize();
        match self.position(name) {
            Some(position) => {
                let values = &mut self.entries[position].1;
                let merged = dedupe(values.iter().chain(added.iter()).map(String::as_str));
                *values = merged;
            }
            None if !added.is_empty() => {
                self.index.insert(name.to_ascii_lowercase(), name.to_owned());
                self.entries.push((name.to_owned(), added));
            }
            None => {}
        }
    }

    /// Removes the header matching `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let position = self.position(name)?;
        self.index.remove(&name.to_ascii_lowercase());
        Some(self.entries.remove(position).1)
    }

    /// Iterates over the stored names and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: AsRef<str>,
    V: Into<HeaderValues>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_single_value() {
        assert_eq!(HeaderValues::from("a;b;a").normalize(), vec!["a", "b"]);
        assert_eq!(HeaderValues::from(" a ; ;b ").normalize(), vec!["a", "b"]);
        assert_eq!(HeaderValues::from(" ; ").normalize(), Vec::<String>::new());
        assert_eq!(HeaderValues::from("0").normalize(), vec!["0"]);
    }

    #[test]
    fn normalize_list() {
        assert_eq!(HeaderValues::from(["b", " a", "b ", ""]).normalize(), vec!["b", "a"]);
        // list entries are not split
        assert_eq!(HeaderValues::from(vec!["a;b"]).normalize(), vec!["a;b"]);
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut headers = Headers::new();
        headers.set("X-Test", "a;b;a");

        assert_eq!(headers.get("x-test"), ["a", "b"]);
        assert_eq!(headers.get("X-TEST"), ["a", "b"]);
        assert_eq!(headers.line("x-Test"), "a, b");
        assert!(headers.contains("x-test"));
        assert!(headers.get("missing").is_empty());
        assert_eq!(headers.line("missing"), "");
    }

    #[test]
    fn set_replaces_in_place() {
        let mut headers = Headers::new();
        headers.set("Accept", "text/html");
        headers.set("Host", "example.com");
        headers.set("accept", "text/plain");

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["accept", "Host"]);
        assert_eq!(headers.get("ACCEPT"), ["text/plain"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn set_empty_removes() {
        let mut headers = Headers::new();
        headers.set("X-Test", "a");
        headers.set("x-test", ";");

        assert!(!headers.contains("X-Test"));
        assert!(headers.is_empty());
    }

    #[test]
    fn append_keeps_stored_casing() {
        let mut headers = Headers::new();
        headers.set("X-Test", "a");
        headers.append("x-test", "b;a");

        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries, [("X-Test", ["a".to_owned(), "b".to_owned()].as_slice())]);
    }

    #[test]
    fn append_new_and_empty() {
        let mut headers = Headers::new();
        headers.append("x-new", " ");
        assert!(headers.is_empty());

        headers.append("x-new", "v");
        assert_eq!(headers.get("X-New"), ["v"]);
    }

    #[test]
    fn remove() {
        let mut headers: Headers = [("A", "1"), ("B", "2")].into_iter().collect();

        assert_eq!(headers.remove("a"), Some(vec!["1".to_owned()]));
        assert_eq!(headers.remove("a"), None);
        assert!(!headers.contains("A"));
        assert_eq!(headers.get("b"), ["2"]);
    }
}
