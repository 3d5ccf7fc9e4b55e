#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod routing;
pub mod service;
pub(crate) mod utility;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
