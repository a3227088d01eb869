#![doc = include_str!("../README.md")]

mod document;
mod error;

pub use document::{Document, Entry, Section};
pub use error::{IniError, Result};
