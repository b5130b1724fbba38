use std::fmt;

/// Kind of a generated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Library,
    Binary,
    Test,
}

impl RuleKind {
    pub const ALL: [RuleKind; 3] = [RuleKind::Library, RuleKind::Binary, RuleKind::Test];

    /// The rule function name used in build files.
    pub fn function_name(self) -> &'static str {
        match self {
            RuleKind::Library => "go_library",
            RuleKind::Binary => "go_binary",
            RuleKind::Test => "go_test",
        }
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.function_name() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// Value of a rule attribute.
///
/// Closed set: anything the generator emits must be one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    StringList(Vec<String>),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::StringList(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

/// One buildable-target declaration.
///
/// `name` is always rendered first; the remaining attributes keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub name: String,
    attrs: Vec<(String, AttrValue)>,
}

impl Rule {
    pub fn new(kind: RuleKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Append an attribute. A later value for an existing key replaces it in place.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Attributes other than `name`, in rendering order.
    pub fn attrs(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    pub fn attr_keys(&self) -> Vec<&str> {
        std::iter::once("name")
            .chain(self.attrs.iter().map(|(k, _)| k.as_str()))
            .collect()
    }
}
