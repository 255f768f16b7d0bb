//! Agent option parsing.
//!
//! The option string handed to `Agent_OnLoad` is a flat list of `[-]name=value`
//! tokens separated by whitespace or `~`:
//!
//! ```text
//! -verbose -trace=all waittime=30 pathToNewByteCode=/tmp/classes
//! ```
//!
//! A few names are understood by the harness itself (`verbose`, `trace`,
//! `waittime`). Any other undashed name is kept as an opaque pair so test
//! agents can define their own options; an unknown dashed name is an error.
//!
//! ```rust
//! use jvmti_harness::options::OptionTable;
//!
//! let options = OptionTable::parse("waittime=5~mode=fast").unwrap();
//! assert_eq!(options.wait_time(), 5);
//! assert_eq!(options.find_value("mode").unwrap(), Some("fast"));
//! assert_eq!(options.count(), 2);
//! ```

use crate::error::{LookupError, ParseError};
use crate::logging::TraceMode;

/// Maximum number of options a table holds unless configured otherwise.
pub const DEFAULT_MAX_OPTIONS: usize = 10;

/// Wait time (in minutes, as interpreted by the test harness) when no
/// `waittime` option is given.
pub const DEFAULT_WAIT_TIME: i32 = 2;

const OPTION_START: char = '-';
const VALUE_SEPARATOR: u8 = b'=';

fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r' | b'~')
}

fn is_boolean_flag(name: &str) -> bool {
    name == "verbose"
}

/// What to do with a token that has no `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingSeparator {
    /// Fail the parse with [`ParseError::MissingValueSeparator`].
    #[default]
    Error,
    /// Stop scanning and keep the options parsed so far.
    StopParsing,
}

/// Parser limits and policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    max_options: Option<usize>,
    default_wait_time: i32,
    missing_separator: MissingSeparator,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_options: Some(DEFAULT_MAX_OPTIONS),
            default_wait_time: DEFAULT_WAIT_TIME,
            missing_separator: MissingSeparator::Error,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on the number of options. `None` removes the bound.
    pub fn max_options(mut self, limit: Option<usize>) -> Self {
        self.max_options = limit;
        self
    }

    pub fn default_wait_time(mut self, wait_time: i32) -> Self {
        self.default_wait_time = wait_time;
        self
    }

    pub fn missing_separator(mut self, policy: MissingSeparator) -> Self {
        self.missing_separator = policy;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.max_options
    }
}

/// One parsed `name=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    name: String,
    value: String,
    dashed: bool,
}

impl OptionEntry {
    /// Name without the leading `-`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the option was written as `-name=...`.
    pub fn is_dashed(&self) -> bool {
        self.dashed
    }
}

/// Ordered options parsed from one agent option string.
///
/// Names are not unique; lookups by name return the earliest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTable {
    entries: Vec<OptionEntry>,
    raw: String,
    wait_time: i32,
    verbose: bool,
    trace: TraceMode,
}

impl Default for OptionTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl OptionTable {
    /// Table of a load without options.
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            raw: String::new(),
            wait_time: DEFAULT_WAIT_TIME,
            verbose: false,
            trace: TraceMode::None,
        }
    }

    /// Parses with the default [`ParserConfig`].
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        OptionParser::default().parse(raw)
    }

    /// Value of the first option called `name`, or `None`.
    pub fn find_value(&self, name: &str) -> Result<Option<&str>, LookupError> {
        if name.is_empty() {
            return Err(LookupError::EmptyName);
        }
        Ok(self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str()))
    }

    /// Value of `name`, or `default` if the option is absent.
    ///
    /// An option given with an empty value is a misconfiguration and is
    /// reported as [`LookupError::ValueEmpty`].
    pub fn find_string_value<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, LookupError> {
        match self.find_value(name)? {
            None => Ok(default),
            Some("") => Err(LookupError::ValueEmpty { name: name.to_string() }),
            Some(value) => Ok(value),
        }
    }

    /// Integer value of `name`, or `default` if the option is absent.
    pub fn find_int_value(&self, name: &str, default: i32) -> Result<i32, LookupError> {
        match self.find_value(name)? {
            None => Ok(default),
            Some("") => Err(LookupError::ValueEmpty { name: name.to_string() }),
            Some(value) => value.parse::<i32>().map_err(|_| LookupError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_at(&self, index: usize) -> Result<&str, LookupError> {
        self.entry_at(index).map(OptionEntry::name)
    }

    pub fn value_at(&self, index: usize) -> Result<&str, LookupError> {
        self.entry_at(index).map(OptionEntry::value)
    }

    pub fn entry_at(&self, index: usize) -> Result<&OptionEntry, LookupError> {
        self.entries.get(index).ok_or(LookupError::IndexOutOfBounds {
            index,
            count: self.entries.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter()
    }

    /// The option string exactly as the agent received it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn wait_time(&self) -> i32 {
        self.wait_time
    }

    pub fn set_wait_time(&mut self, wait_time: i32) {
        self.wait_time = wait_time;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn trace_mode(&self) -> TraceMode {
        self.trace
    }
}

/// Parses a possibly absent option string (a null `options` pointer in
/// `Agent_OnLoad`) with the default configuration.
pub fn parse_options(raw: Option<&str>) -> Result<OptionTable, ParseError> {
    OptionParser::default().parse_opt(raw)
}

/// Single-pass tokenizer and validator for agent option strings.
#[derive(Debug, Clone, Default)]
pub struct OptionParser {
    config: ParserConfig,
}

impl OptionParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_opt(&self, raw: Option<&str>) -> Result<OptionTable, ParseError> {
        self.parse(raw.unwrap_or(""))
    }

    pub fn parse(&self, raw: &str) -> Result<OptionTable, ParseError> {
        let mut table = OptionTable {
            raw: raw.to_string(),
            wait_time: self.config.default_wait_time,
            ..OptionTable::empty()
        };

        // Separators and '=' are ASCII, so every index below is a char boundary.
        let bytes = raw.as_bytes();
        let len = bytes.len();
        let mut pos = 0;

        loop {
            while pos < len && is_separator(bytes[pos]) {
                pos += 1;
            }
            if pos == len {
                break;
            }

            let start = pos;
            while pos < len && !is_separator(bytes[pos]) && bytes[pos] != VALUE_SEPARATOR {
                pos += 1;
            }

            let (name, value) = if pos < len && bytes[pos] == VALUE_SEPARATOR {
                let name = &raw[start..pos];
                pos += 1;
                let value_start = pos;
                while pos < len && !is_separator(bytes[pos]) {
                    pos += 1;
                }
                (name, &raw[value_start..pos])
            } else {
                let token = &raw[start..pos];
                if is_boolean_flag(token.strip_prefix(OPTION_START).unwrap_or(token)) {
                    (token, "")
                } else {
                    match self.config.missing_separator {
                        MissingSeparator::Error => {
                            return Err(ParseError::MissingValueSeparator { token: token.to_string() });
                        }
                        MissingSeparator::StopParsing => {
                            log::debug!("option without '=' ({}), ignoring the rest of the options", token);
                            break;
                        }
                    }
                }
            };

            self.add_option(&mut table, name, value)?;
        }

        Ok(table)
    }

    fn add_option(&self, table: &mut OptionTable, opt: &str, value: &str) -> Result<(), ParseError> {
        let (name, dashed) = match opt.strip_prefix(OPTION_START) {
            Some(stripped) => (stripped, true),
            None => (opt, false),
        };
        if name.is_empty() {
            return Err(ParseError::EmptyName);
        }

        check_option(table, dashed, name, value)?;

        if let Some(limit) = self.config.max_options {
            if table.entries.len() >= limit {
                return Err(ParseError::TooManyOptions { limit });
            }
        }

        table.entries.push(OptionEntry {
            name: name.to_string(),
            value: value.to_string(),
            dashed,
        });
        Ok(())
    }
}

fn check_option(table: &mut OptionTable, dashed: bool, name: &str, value: &str) -> Result<(), ParseError> {
    match name {
        "verbose" => {
            if !value.is_empty() {
                return Err(ParseError::UnexpectedValue { name: name.to_string(), value: value.to_string() });
            }
            table.verbose = true;
        }
        "trace" => {
            if value.is_empty() {
                return Err(ParseError::MissingValue { name: name.to_string() });
            }
            table.trace = TraceMode::from_option(value).ok_or_else(|| ParseError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
            table.verbose = true;
        }
        "waittime" => {
            if value.is_empty() {
                return Err(ParseError::MissingValue { name: name.to_string() });
            }
            let n = value.parse::<i32>().map_err(|_| ParseError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
            if n < 0 {
                return Err(ParseError::NegativeValue { name: name.to_string(), value: value.to_string() });
            }
            table.wait_time = n;
        }
        _ if dashed => {
            return Err(ParseError::UnknownOption { name: name.to_string() });
        }
        _ => {}
    }
    Ok(())
}
