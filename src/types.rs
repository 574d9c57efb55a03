// dogstatsd - A DogStatsD client for Rust
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;

/// One or more metric names to apply a single value to.
///
/// Every metric method accepts anything that converts into a `StatRef`: a
/// single name (`&str`, `&String`) or a sequence of names (slices, arrays,
/// or a `Vec` of them). One datagram is emitted per distinct name.
///
/// # Example
///
/// ```
/// use dogstatsd::StatRef;
///
/// let single: StatRef<'_> = "requests".into();
/// let many: StatRef<'_> = ["requests", "requests.api"].into();
///
/// assert_eq!(vec!["requests"], single.names());
/// assert_eq!(vec!["requests", "requests.api"], many.names());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatRef<'a> {
    Single(&'a str),
    Many(Vec<&'a str>),
}

impl<'a> StatRef<'a> {
    /// Names in the order given with repeated names removed.
    ///
    /// Pending payloads are keyed by metric name so repeating a name within
    /// one call still only produces a single datagram for it.
    pub fn names(&self) -> Vec<&'a str> {
        match self {
            StatRef::Single(name) => vec![*name],
            StatRef::Many(names) => {
                let mut out: Vec<&'a str> = Vec::with_capacity(names.len());
                for &name in names {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
                out
            }
        }
    }
}

impl<'a> From<&'a str> for StatRef<'a> {
    fn from(name: &'a str) -> Self {
        StatRef::Single(name)
    }
}

impl<'a> From<&'a String> for StatRef<'a> {
    fn from(name: &'a String) -> Self {
        StatRef::Single(name.as_str())
    }
}

impl<'a> From<&'a [&'a str]> for StatRef<'a> {
    fn from(names: &'a [&'a str]) -> Self {
        StatRef::Many(names.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for StatRef<'a> {
    fn from(names: [&'a str; N]) -> Self {
        StatRef::Many(names.to_vec())
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for StatRef<'a> {
    fn from(names: &'a [&'a str; N]) -> Self {
        StatRef::Many(names.to_vec())
    }
}

impl<'a> From<Vec<&'a str>> for StatRef<'a> {
    fn from(names: Vec<&'a str>) -> Self {
        StatRef::Many(names)
    }
}

impl<'a> From<&'a [String]> for StatRef<'a> {
    fn from(names: &'a [String]) -> Self {
        StatRef::Many(names.iter().map(String::as_str).collect())
    }
}

impl<'a> From<&'a Vec<String>> for StatRef<'a> {
    fn from(names: &'a Vec<String>) -> Self {
        StatRef::from(names.as_slice())
    }
}

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    InvalidInput,
    IoError,
}

/// Error generated by this library, potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    IoError(io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(_) => ErrorKind::IoError,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ref err) => err.fmt(f),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
