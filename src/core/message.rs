//! Deferred message bodies
//!
//! A [`LazyMessage`] is only evaluated when a pipeline actually renders the
//! entry, and then at most once (see [`AtomicLazy`](super::lazy::AtomicLazy)).

use super::error::{BoxError, LoggerError, Result};
use std::fmt::{self, Display};

/// A message body computed on demand
pub trait LazyMessage: Send + Sync {
    fn evaluate(&self) -> std::result::Result<String, BoxError>;
}

impl<F, D, E> LazyMessage for F
where
    F: Fn() -> std::result::Result<D, E> + Send + Sync,
    D: Display,
    E: Into<BoxError>,
{
    fn evaluate(&self) -> std::result::Result<String, BoxError> {
        self().map(|message| message.to_string()).map_err(Into::into)
    }
}

/// One substitution for a placeholder of a [`ParameterizedMessage`]
pub enum Argument {
    /// Already rendered value
    Value(String),
    /// Value evaluated together with the message
    Lazy(Box<dyn LazyMessage>),
    /// Not set yet; filled later through [`ParameterizedMessage::with`]
    Placeholder,
}

impl Argument {
    pub fn value(value: impl Display) -> Self {
        Argument::Value(value.to_string())
    }

    pub fn lazy(message: impl LazyMessage + 'static) -> Self {
        Argument::Lazy(Box::new(message))
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Argument::Lazy(_) => f.write_str("Lazy(..)"),
            Argument::Placeholder => f.write_str("Placeholder"),
        }
    }
}

/// A template such as `"Hello {}!"` whose markers are replaced, in order, by
/// the arguments when the message is evaluated.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::core::{LazyMessage, ParameterizedMessage};
///
/// let message = ParameterizedMessage::new("Hello {}!").arg("world");
/// assert_eq!(message.evaluate().unwrap(), "Hello world!");
/// ```
#[derive(Debug)]
pub struct ParameterizedMessage {
    marker: String,
    template: String,
    arguments: Vec<Argument>,
}

impl ParameterizedMessage {
    pub const DEFAULT_MARKER: &'static str = "{}";

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            marker: Self::DEFAULT_MARKER.to_string(),
            template: template.into(),
            arguments: Vec::new(),
        }
    }

    /// Replace the `{}` marker with another token
    #[must_use]
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    #[must_use]
    pub fn arg(mut self, value: impl Display) -> Self {
        self.arguments.push(Argument::value(value));
        self
    }

    #[must_use]
    pub fn args<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.arguments.extend(values.into_iter().map(Argument::value));
        self
    }

    #[must_use]
    pub fn lazy_arg(mut self, message: impl LazyMessage + 'static) -> Self {
        self.arguments.push(Argument::lazy(message));
        self
    }

    /// Reserve an argument slot to be filled by [`with`](Self::with)
    #[must_use]
    pub fn placeholder(mut self) -> Self {
        self.arguments.push(Argument::Placeholder);
        self
    }

    /// Fill every unset placeholder, in order, with a lazy argument.
    ///
    /// The number of arguments must match the number of placeholders exactly.
    pub fn with(mut self, arguments: Vec<Box<dyn LazyMessage>>) -> Result<Self> {
        let mut supplied = arguments.into_iter();
        for slot in self.arguments.iter_mut() {
            if matches!(slot, Argument::Placeholder) {
                let argument = supplied.next().ok_or(LoggerError::TooFewArguments)?;
                *slot = Argument::Lazy(argument);
            }
        }
        if supplied.next().is_some() {
            return Err(LoggerError::TooManyArguments);
        }
        Ok(self)
    }

    fn production_error(cause: &'static str) -> BoxError {
        Box::new(LoggerError::MessageProduction(cause))
    }
}

impl LazyMessage for ParameterizedMessage {
    fn evaluate(&self) -> std::result::Result<String, BoxError> {
        if self.marker.is_empty() {
            return Err(Self::production_error("empty marker"));
        }

        let mut out = String::with_capacity(self.template.len());
        let mut arguments = self.arguments.iter();
        let mut rest = self.template.as_str();

        while let Some(index) = rest.find(&self.marker) {
            out.push_str(&rest[..index]);
            match arguments.next() {
                None => return Err(Self::production_error("too few arguments")),
                Some(Argument::Placeholder) => {
                    return Err(Self::production_error("placeholder argument not set"))
                }
                Some(Argument::Value(value)) => out.push_str(value),
                Some(Argument::Lazy(message)) => out.push_str(&message.evaluate()?),
            }
            rest = &rest[index + self.marker.len()..];
        }
        out.push_str(rest);

        if arguments.next().is_some() {
            return Err(Self::production_error("too many arguments"));
        }
        Ok(out)
    }
}
