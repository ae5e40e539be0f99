use crate::district::record::FireRecord;
use crate::prelude::{FireError, FireResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// District name -> record lookup, kept in data-file order.
#[derive(Debug, Clone)]
pub struct DistrictTable {
    entries: Vec<(String, FireRecord)>,
}

impl DistrictTable {
    /// Reads the JSON object at `path`. Missing, malformed or empty files are errors.
    pub fn load<P: AsRef<Path>>(path: P) -> FireResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| FireError::DataFile {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path_ref)
    }

    pub fn from_json_str(contents: &str) -> FireResult<Self> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, origin: &Path) -> FireResult<Self> {
        let malformed = |source| FireError::MalformedData {
            path: origin.to_path_buf(),
            source,
        };
        let object: Map<String, Value> = serde_json::from_str(contents).map_err(malformed)?;

        let mut entries = Vec::with_capacity(object.len());
        for (district, value) in object {
            let record: FireRecord = serde_json::from_value(value).map_err(malformed)?;
            entries.push((district, record));
        }

        if entries.is_empty() {
            return Err(FireError::EmptyTable(PathBuf::from(origin)));
        }
        log::debug!(
            "loaded {} districts from {}",
            entries.len(),
            origin.display()
        );
        Ok(Self { entries })
    }

    pub fn get(&self, district: &str) -> Option<&FireRecord> {
        self.entries
            .iter()
            .find(|(name, _)| name == district)
            .map(|(_, record)| record)
    }

    pub fn contains(&self, district: &str) -> bool {
        self.get(district).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// First district in file order; a loaded table is never empty.
    pub fn first(&self) -> &str {
        &self.entries[0].0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FireRecord)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
