//! Single-method capability traits and the value holder they build.
//!
//! [`PersonFactory`] and [`Transformer`] are implemented for any closure of
//! the matching shape, so callers instantiate them ad hoc:
//!
//! ```rust
//! use klotho::functional::{Person, PersonFactory, Transformer};
//!
//! let factory = |first: &str, last: &str| Person::new(first, last);
//! assert_eq!(factory.create("Peter", "Parker").full_name(), "Peter Parker");
//!
//! let shout = |s: String| s.to_uppercase();
//! assert_eq!(shout.call_me("hey".to_string()), "HEY");
//! ```

use crate::console::Console;
use std::fmt;

/// Suffix appended by the demo transformer.
pub const TESTING_SUFFIX: &str = " - testing stuff";

/// An immutable first/last name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Person {
    first_name: String,
    last_name: String,
}

impl Person {
    /// Create a person from its two names.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The first name as given.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// The last name as given.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// First and last name separated by a single space.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Builds a value from a first and last name.
pub trait PersonFactory<P> {
    /// Create the value.
    fn create(&self, first_name: &str, last_name: &str) -> P;
}

impl<P, F> PersonFactory<P> for F
where
    F: Fn(&str, &str) -> P,
{
    fn create(&self, first_name: &str, last_name: &str) -> P {
        self(first_name, last_name)
    }
}

/// Derives a new value from one input.
pub trait Transformer<T> {
    /// Apply the transformation.
    fn call_me(&self, input: T) -> T;
}

impl<T, F> Transformer<T> for F
where
    F: Fn(T) -> T,
{
    fn call_me(&self, input: T) -> T {
        self(input)
    }
}

/// The transformer used by the demo: appends [`TESTING_SUFFIX`].
pub fn testing_transformer() -> impl Transformer<String> {
    |input: String| input + TESTING_SUFFIX
}

/// Build a person through a factory closure and call an ad hoc transformer,
/// printing both results.
pub fn run_functional_interfaces(console: &Console) -> (Person, String) {
    let factory = |first: &str, last: &str| Person::new(first, last);
    let person = factory.create("Peter", "Parker");
    console.println(&person);

    let called = testing_transformer().call_me("i have been called not implemented!!!".into());
    console.println(&called);

    (person, called)
}
