// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for proximate operations

use std::fmt;

/// ErrorKind is all kinds of Error of proximate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Out-of-range access on a bit or counter array.
    InvalidIndex,
    /// A counter cannot absorb an increment without exceeding its width.
    CounterOverflow,
    /// A counter cannot absorb a decrement without going below zero.
    CounterUnderflow,
    /// A bounded insertion procedure exhausted the structure's capacity.
    FilterFull,
    /// The argument provided is invalid.
    InvalidParameters,
    /// A digest compression parameter is outside its accepted range.
    InvalidCompression,
    /// A q-digest universe is zero or not a power of two.
    InvalidUniverseSize,
    /// A HyperLogLog precision is outside [4, 16].
    InvalidPrecision,
    /// Merging HyperLogLog sketches of different precision.
    IncompatiblePrecision,
    /// Merging sketches whose dimensions do not match.
    IncompatibleDimensions,
    /// A quantile query on a digest that has seen no data.
    EmptyDigest,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidIndex => "InvalidIndex",
            ErrorKind::CounterOverflow => "CounterOverflow",
            ErrorKind::CounterUnderflow => "CounterUnderflow",
            ErrorKind::FilterFull => "FilterFull",
            ErrorKind::InvalidParameters => "InvalidParameters",
            ErrorKind::InvalidCompression => "InvalidCompression",
            ErrorKind::InvalidUniverseSize => "InvalidUniverseSize",
            ErrorKind::InvalidPrecision => "InvalidPrecision",
            ErrorKind::IncompatiblePrecision => "IncompatiblePrecision",
            ErrorKind::IncompatibleDimensions => "IncompatibleDimensions",
            ErrorKind::EmptyDigest => "EmptyDigest",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all proximate functions.
///
/// # Examples
///
/// ```
/// # use proximate::error::Error;
/// # use proximate::error::ErrorKind;
/// let err = Error::new(ErrorKind::InvalidParameters, "bad input");
/// assert_eq!(err.kind(), ErrorKind::InvalidParameters);
/// assert_eq!(err.message(), "bad input");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

// Convenience constructors for the recurring kinds
impl Error {
    pub(crate) fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameters, msg)
    }

    pub(crate) fn invalid_index(index: u64, len: u64) -> Self {
        Self::new(ErrorKind::InvalidIndex, "index out of range")
            .with_context("index", index)
            .with_context("len", len)
    }

    pub(crate) fn counter_overflow(index: u64) -> Self {
        Self::new(ErrorKind::CounterOverflow, "counter at maximum").with_context("index", index)
    }

    pub(crate) fn counter_underflow(index: u64) -> Self {
        Self::new(ErrorKind::CounterUnderflow, "counter at zero").with_context("index", index)
    }

    pub(crate) fn filter_full(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::FilterFull, msg)
    }

    pub(crate) fn empty_digest() -> Self {
        Self::new(ErrorKind::EmptyDigest, "digest has seen no data")
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
