// Copyright 2026 The A-VO-S Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingPaper,
    NonNumericScope,
    UnknownTopic,
    UnknownCategory,
    ValueOutOfDomain,
    InvalidViewport,
    BadConfig,
    Json,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            MissingPaper => "missing_paper",
            NonNumericScope => "non_numeric_scope",
            UnknownTopic => "unknown_topic",
            UnknownCategory => "unknown_category",
            ValueOutOfDomain => "value_out_of_domain",
            InvalidViewport => "invalid_viewport",
            BadConfig => "bad_config",
            Json => "json",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Import,
    Layout,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Import => "import",
            ErrorKind::Layout => "layout",
            ErrorKind::Config => "config",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}:{code}{}", details_suffix(.details))]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

fn details_suffix(details: &Option<String>) -> String {
    match details {
        Some(details) => format!(" -- {details}"),
        None => String::new(),
    }
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Import, ErrorCode::Json, Some(err.to_string()))
    }
}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! import_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Import, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! layout_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Layout, ErrorCode::$code, Some($str)))
    }};
}

#[macro_export]
macro_rules! config_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Config, ErrorCode::$code, Some($str)))
    }};
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Import,
        ErrorCode::MissingPaper,
        Some("no paper with code 'P7'".to_owned()),
    );
    assert_eq!("import:missing_paper -- no paper with code 'P7'", err.to_string());

    let err = Error::new(ErrorKind::Layout, ErrorCode::InvalidViewport, None);
    assert_eq!("layout:invalid_viewport", err.to_string());
}

#[test]
fn test_error_macros() {
    let r: Result<()> = layout_err!(UnknownTopic, "Governments".to_owned());
    let err = r.unwrap_err();
    assert_eq!(ErrorKind::Layout, err.kind);
    assert_eq!(ErrorCode::UnknownTopic, err.code);

    let r: Result<()> = config_err!(BadConfig, "alpha_min must be in (0, 1)".to_owned());
    assert_eq!(ErrorKind::Config, r.unwrap_err().kind);
}
