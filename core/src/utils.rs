//! Small helpers for multi-value query parameters.

/// Value for a `fields` query parameter: either the server-side `all`
/// shorthand or an explicit list of field names joined by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    All,
    List(Vec<String>),
}

impl Fields {
    /// Render to the comma-joined wire form.
    pub fn to_param(&self) -> String {
        match self {
            Fields::All => "all".to_string(),
            Fields::List(items) => items.join(","),
        }
    }
}

impl From<&str> for Fields {
    fn from(value: &str) -> Self {
        if value == "all" {
            Fields::All
        } else {
            Fields::List(vec![value.to_string()])
        }
    }
}

impl From<Vec<String>> for Fields {
    fn from(items: Vec<String>) -> Self {
        Fields::List(items)
    }
}

impl From<&[&str]> for Fields {
    fn from(items: &[&str]) -> Self {
        Fields::List(items.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Join values into a single comma-separated query parameter value.
pub fn comma_join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}
