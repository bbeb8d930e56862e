//! Key/value configuration bag and the `.properties` file format.
//!
//! `Properties` is both the configuration object handed to providers and the
//! in-memory form of the platform `el.properties` file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Read};

/// Ordered string-to-string map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
	entries: BTreeMap<String, String>,
}

impl Properties {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	/// Stores `value` under `key`, returning the previous value.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.entries.insert(key.into(), value.into())
	}

	/// Removes `key`, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.entries.remove(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates entries in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Reads a `.properties` document from `reader`.
	///
	/// Input is decoded as ISO-8859-1, so any byte sequence is accepted;
	/// non-Latin characters are written as `\uXXXX` escapes. Later entries
	/// override earlier ones. Fails on I/O errors and malformed `\u` escapes.
	pub fn load(mut reader: impl Read) -> io::Result<Self> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		let text: String = bytes.iter().map(|&b| b as char).collect();
		Self::parse(&text)
	}

	/// Parses already decoded `.properties` text.
	pub fn parse(text: &str) -> io::Result<Self> {
		let mut properties = Properties::new();
		let mut logical = String::new();
		let mut continuing = false;

		for raw in natural_lines(text) {
			let line = raw.trim_start_matches(is_blank);
			if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
				continue;
			}

			let trailing_backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
			if trailing_backslashes % 2 == 1 {
				logical.push_str(&line[..line.len() - 1]);
				continuing = true;
				continue;
			}

			logical.push_str(line);
			continuing = false;
			let (key, value) = parse_entry(&logical)?;
			properties.set(key, value);
			logical.clear();
		}

		// Continuation cut short by end of input
		if continuing {
			let (key, value) = parse_entry(&logical)?;
			properties.set(key, value);
		}

		Ok(properties)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

fn is_blank(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\x0c')
}

/// Splits on `\n`, `\r` and `\r\n`.
fn natural_lines(text: &str) -> impl Iterator<Item = &str> {
	let mut rest = text;
	std::iter::from_fn(move || {
		if rest.is_empty() {
			return None;
		}
		match rest.find(['\n', '\r']) {
			Some(idx) => {
				let line = &rest[..idx];
				let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
				rest = &rest[idx + skip..];
				Some(line)
			},
			None => {
				let line = rest;
				rest = "";
				Some(line)
			},
		}
	})
}

/// Splits a logical line into its unescaped key and value.
fn parse_entry(line: &str) -> io::Result<(String, String)> {
	let chars: Vec<char> = line.chars().collect();
	let mut key_end = chars.len();
	let mut value_start = chars.len();
	let mut has_separator = false;
	let mut escaped = false;

	for (idx, &c) in chars.iter().enumerate() {
		if !escaped && (c == '=' || c == ':') {
			key_end = idx;
			value_start = idx + 1;
			has_separator = true;
			break;
		}
		if !escaped && is_blank(c) {
			key_end = idx;
			value_start = idx + 1;
			break;
		}
		escaped = c == '\\' && !escaped;
	}

	while value_start < chars.len() {
		let c = chars[value_start];
		if is_blank(c) {
			value_start += 1;
		} else if !has_separator && (c == '=' || c == ':') {
			has_separator = true;
			value_start += 1;
		} else {
			break;
		}
	}

	Ok((
		unescape(&chars[..key_end])?,
		unescape(&chars[value_start..])?,
	))
}

fn unescape(chars: &[char]) -> io::Result<String> {
	let mut out = String::with_capacity(chars.len());
	let mut units: Vec<u16> = Vec::new();
	let mut iter = chars.iter().copied();

	while let Some(c) = iter.next() {
		if c != '\\' {
			flush_utf16(&mut units, &mut out);
			out.push(c);
			continue;
		}
		let Some(next) = iter.next() else {
			break;
		};
		if next == 'u' {
			let hex: String = iter.by_ref().take(4).collect();
			let well_formed = hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit());
			let unit = well_formed
				.then(|| u16::from_str_radix(&hex, 16).ok())
				.flatten()
				.ok_or_else(|| {
					io::Error::new(
						io::ErrorKind::InvalidData,
						format!("Malformed \\uxxxx encoding: \\u{}", hex),
					)
				})?;
			units.push(unit);
			continue;
		}
		flush_utf16(&mut units, &mut out);
		out.push(match next {
			't' => '\t',
			'n' => '\n',
			'r' => '\r',
			'f' => '\x0c',
			other => other,
		});
	}
	flush_utf16(&mut units, &mut out);

	Ok(out)
}

fn flush_utf16(units: &mut Vec<u16>, out: &mut String) {
	if units.is_empty() {
		return;
	}
	out.extend(
		char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
	);
}
