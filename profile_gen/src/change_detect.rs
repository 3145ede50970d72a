//! # Change detection
//!
//! Generation is skipped when the hashes of both input files match the cache
//! record left by the last successful run and the output directory still
//! holds generated files.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input hashes of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub properties_hash: i32,
    pub paths_hash: i32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What the output directory currently looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDirState {
    Missing,
    Empty,
    Populated,
}

/// Outcome of the regeneration decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regenerate {
    Skip,
    Required(RegenReason),
}

/// Why a regeneration is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenReason {
    Forced,
    NoRecord,
    PropertiesChanged,
    PathsChanged,
    OutputMissing,
    OutputEmpty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CacheRecord {
    /// Hash the contents of both input files.
    pub fn from_contents(properties: &[u8], paths: &[u8]) -> Self {
        Self {
            properties_hash: file_hash(properties),
            paths_hash: file_hash(paths),
        }
    }

    /// Read a record, returning `None` if it is absent or malformed.
    pub fn read<P: AsRef<Path>>(path: P) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;

        Self::parse(&contents)
    }

    /// Parse a record from its two-line text form.
    pub fn parse(contents: &str) -> Option<Self> {
        let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

        let properties_hash = lines.next()?.parse().ok()?;
        let paths_hash = lines.next()?.parse().ok()?;

        if lines.next().is_some() {
            return None;
        }

        Some(Self {
            properties_hash,
            paths_hash,
        })
    }

    /// Overwrite the record at `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, format!("{}\n{}\n", self.properties_hash, self.paths_hash))
    }
}

impl fmt::Display for RegenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegenReason::Forced => "regeneration was forced",
            RegenReason::NoRecord => "no previous hash record was found",
            RegenReason::PropertiesChanged => "the properties file changed",
            RegenReason::PathsChanged => "the path definitions changed",
            RegenReason::OutputMissing => "the output directory is missing",
            RegenReason::OutputEmpty => "the output directory is empty",
        };

        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Hash a byte buffer.
///
/// Signed bytes are folded into a 31-multiplier polynomial seeded with 1,
/// with wrapping 32-bit arithmetic.
pub fn file_hash(bytes: &[u8]) -> i32 {
    bytes.iter().fold(1i32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(*b as i8 as i32)
    })
}

/// Classify the output directory.
///
/// It is populated if it holds at least one `.csv` file.
pub fn inspect_output_dir<P: AsRef<Path>>(dir: P) -> OutputDirState {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return OutputDirState::Missing,
    };

    let has_csv = entries.filter_map(Result::ok).any(|e| {
        e.path().is_file()
            && e.path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
    });

    if has_csv {
        OutputDirState::Populated
    } else {
        OutputDirState::Empty
    }
}

/// Decide whether the outputs need regenerating.
///
/// Checks run in order: missing record, properties hash, paths hash, then the
/// state of the output directory.
pub fn should_regenerate(
    old: Option<&CacheRecord>,
    new: &CacheRecord,
    out: OutputDirState,
) -> Regenerate {
    let old = match old {
        Some(o) => o,
        None => return Regenerate::Required(RegenReason::NoRecord),
    };

    if old.properties_hash != new.properties_hash {
        return Regenerate::Required(RegenReason::PropertiesChanged);
    }

    if old.paths_hash != new.paths_hash {
        return Regenerate::Required(RegenReason::PathsChanged);
    }

    match out {
        OutputDirState::Missing => Regenerate::Required(RegenReason::OutputMissing),
        OutputDirState::Empty => Regenerate::Required(RegenReason::OutputEmpty),
        OutputDirState::Populated => Regenerate::Skip,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_hash() {
        assert_eq!(file_hash(b""), 1);
        assert_eq!(file_hash(b"a"), 31 + 97);
        assert_eq!(file_hash(b"ab"), (31 + 97) * 31 + 98);

        // Bytes above 0x7f are signed
        assert_eq!(file_hash(&[0xff]), 31 - 1);

        let source = b"maxVel=4\nmaxAccel=3\n";
        assert_eq!(file_hash(source), file_hash(source));
        assert_ne!(file_hash(source), file_hash(b"maxVel=5\nmaxAccel=3\n"));

        // Wraps instead of overflowing
        let long = vec![b'z'; 10_000];
        let _ = file_hash(&long);
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashes.txt");

        assert_eq!(CacheRecord::read(&path), None);

        let record = CacheRecord {
            properties_hash: -123456,
            paths_hash: 987654,
        };
        record.write(&path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "-123456\n987654\n"
        );
        assert_eq!(CacheRecord::read(&path), Some(record));
    }

    #[test]
    fn test_record_line_order() {
        let props = b"maxVel=4\n";
        let paths = b"{}";
        let record = CacheRecord::from_contents(props, paths);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashes.txt");
        record.write(&path).unwrap();

        // Properties hash first, paths hash second
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![file_hash(props).to_string(), file_hash(paths).to_string()]);

        // A record with the hashes the other way round is a change
        let swapped = CacheRecord {
            properties_hash: record.paths_hash,
            paths_hash: record.properties_hash,
        };
        assert_eq!(
            should_regenerate(Some(&swapped), &record, OutputDirState::Populated),
            Regenerate::Required(RegenReason::PropertiesChanged)
        );
    }

    #[test]
    fn test_malformed_records() {
        assert_eq!(CacheRecord::parse(""), None);
        assert_eq!(CacheRecord::parse("12\n"), None);
        assert_eq!(CacheRecord::parse("12\nabc\n"), None);
        assert_eq!(CacheRecord::parse("12\n13\n14\n"), None);
        assert_eq!(CacheRecord::parse("99999999999\n13\n"), None);
        assert_eq!(
            CacheRecord::parse("12\r\n13\r\n"),
            Some(CacheRecord {
                properties_hash: 12,
                paths_hash: 13
            })
        );
    }

    #[test]
    fn test_inspect_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");

        assert_eq!(inspect_output_dir(&out), OutputDirState::Missing);

        std::fs::create_dir(&out).unwrap();
        assert_eq!(inspect_output_dir(&out), OutputDirState::Empty);

        std::fs::write(out.join("notes.txt"), "x").unwrap();
        assert_eq!(inspect_output_dir(&out), OutputDirState::Empty);

        std::fs::write(out.join("a_left.csv"), "dt\n").unwrap();
        assert_eq!(inspect_output_dir(&out), OutputDirState::Populated);
    }

    #[test]
    fn test_should_regenerate() {
        let rec = CacheRecord {
            properties_hash: 1,
            paths_hash: 2,
        };
        let props_changed = CacheRecord {
            properties_hash: 3,
            ..rec
        };
        let paths_changed = CacheRecord {
            paths_hash: 4,
            ..rec
        };

        use OutputDirState::*;
        use RegenReason::*;

        let cases = vec![
            (None, Populated, Regenerate::Required(NoRecord)),
            (None, Missing, Regenerate::Required(NoRecord)),
            (Some(&rec), Populated, Regenerate::Skip),
            (Some(&rec), Empty, Regenerate::Required(OutputEmpty)),
            (Some(&rec), Missing, Regenerate::Required(OutputMissing)),
            (
                Some(&props_changed),
                Populated,
                Regenerate::Required(PropertiesChanged),
            ),
            (
                Some(&paths_changed),
                Populated,
                Regenerate::Required(PathsChanged),
            ),
        ];

        for (old, out, expected) in cases {
            assert_eq!(should_regenerate(old, &rec, out), expected);
        }
    }
}
