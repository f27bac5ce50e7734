use crate::common::error::{InvalidSetParameter, ReadingFile, Result, YamlParseFromFile};
use serde_yaml::{Mapping, Value};
use snafu::ResultExt;
use std::{fs, path::Path, str};

/// The values an installation or upgrade is rendered with.
pub type Parameters = Mapping;

/// Builds install parameters from a base set of values and `--set` style overrides.
#[derive(Clone, Debug, Default)]
pub struct ParameterParser {
    base: Parameters,
    overrides: Vec<String>,
}

impl ParameterParser {
    /// A parser which applies `overrides` (each `key=value`, or several of them separated by
    /// commas) on top of `base`.
    pub fn new(base: Parameters, overrides: Vec<String>) -> Self {
        Self { base, overrides }
    }

    /// A parser whose base values are read from a YAML parameters file.
    pub fn from_file<P>(path: P, overrides: Vec<String>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let buf = fs::read(path).context(ReadingFile {
            filepath: path.to_path_buf(),
        })?;
        // An empty file holds no values.
        if str::from_utf8(buf.as_slice()).map_or(false, |s| s.trim().is_empty()) {
            return Ok(Self::new(Parameters::new(), overrides));
        }
        let base: Parameters =
            serde_yaml::from_slice(buf.as_slice()).context(YamlParseFromFile {
                filepath: path.to_path_buf(),
            })?;

        Ok(Self::new(base, overrides))
    }

    /// Merges the overrides into the base values. Later overrides win.
    pub fn parse(&self) -> Result<Parameters> {
        let mut parameters = self.base.clone();
        for entry in self.overrides.iter().flat_map(|o| o.split(',')) {
            if entry.trim().is_empty() {
                continue;
            }
            let (key, value) = entry.split_once('=').ok_or(
                InvalidSetParameter {
                    parameter: entry.to_string(),
                }
                .build(),
            )?;
            let path: Vec<&str> = key.trim().split('.').collect();
            if path.iter().any(|segment| segment.is_empty()) {
                return InvalidSetParameter {
                    parameter: entry.to_string(),
                }
                .fail();
            }
            set_path(&mut parameters, path.as_slice(), scalar(value));
        }
        Ok(parameters)
    }
}

/// Sets `value` at the dotted `path`, replacing anything which is in the way with a mapping.
fn set_path(parameters: &mut Mapping, path: &[&str], value: Value) {
    let (last, parents) = match path.split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = parameters;
    for segment in parents {
        let key = Value::String(segment.to_string());
        let entry = current
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        current = match entry {
            Value::Mapping(mapping) => mapping,
            _ => return,
        };
    }
    current.insert(Value::String(last.to_string()), value);
}

/// Interprets a raw override value the way YAML would read a scalar: booleans, numbers and
/// null keep their type, everything else is a string.
fn scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}
