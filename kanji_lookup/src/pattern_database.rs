use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

use super::config::LookupConfig;
use super::entities::*;
use super::error::*;
use super::pattern_parser::parse_set;

/// Supplies the reference text for one stroke count.
pub trait PatternSource {
    /// `Ok(None)` when there is no reference data for this stroke count.
    fn read(&self, stroke_count: usize) -> io::Result<Option<String>>;
}

/// Reads `<dir>/<prefix><stroke count>.<extension>` files.
pub struct DirSource {
    dir: PathBuf,
    file_prefix: String,
    file_extension: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, config: &LookupConfig) -> DirSource {
        DirSource {
            dir: dir.into(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
        }
    }

    pub fn file_path(&self, stroke_count: usize) -> PathBuf {
        let file_name = format!("{}{}.{}", self.file_prefix, stroke_count, self.file_extension);
        self.dir.join(file_name)
    }

    /// Stroke counts that have a reference file, ascending.
    pub fn stroke_counts(&self) -> io::Result<Vec<usize>> {
        let mut res: Vec<usize> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            let count = name
                .strip_prefix(self.file_prefix.as_str())
                .and_then(|rest| rest.strip_suffix(self.file_extension.as_str()))
                .and_then(|rest| rest.strip_suffix('.'))
                .and_then(|digits| digits.parse::<usize>().ok());
            if let Some(count) = count {
                res.push(count);
            }
        }
        res.sort_unstable();
        Ok(res)
    }
}

impl PatternSource for DirSource {
    fn read(&self, stroke_count: usize) -> io::Result<Option<String>> {
        match fs::read_to_string(self.file_path(stroke_count)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    sets: Vec<PatternSet>,
}

// Filled once per stroke count; the mutex is the one-time load guard
type Slot = Arc<Mutex<Option<Arc<PatternSet>>>>;

/// Reference patterns keyed by stroke count.
///
/// Each stroke count's set is parsed at most once, on first use, and shared
/// read-only afterwards; the database can be used from several threads.
pub struct PatternDatabase {
    source: Option<Box<dyn PatternSource + Send + Sync>>,
    sets: RwLock<HashMap<usize, Slot>>,
}

impl PatternDatabase {
    /// Database with no backing source; sets come from `insert_text` or a snapshot.
    pub fn new() -> PatternDatabase {
        PatternDatabase {
            source: None,
            sets: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_source(source: impl PatternSource + Send + Sync + 'static) -> PatternDatabase {
        PatternDatabase {
            source: Some(Box::new(source)),
            sets: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>, config: &LookupConfig) -> PatternDatabase {
        PatternDatabase::with_source(DirSource::new(dir, config))
    }

    /// Parses and stores the reference text for one stroke count, replacing any earlier set.
    pub fn insert_text(&self, stroke_count: usize, text: &str) -> LookupResult<()> {
        let set = parse_set(stroke_count, text)?;
        self.insert_set(set)
    }

    /// Stores a prebuilt set, replacing any earlier one for its stroke count.
    /// Sets that lookups could not score safely are rejected.
    pub fn insert_set(&self, set: PatternSet) -> LookupResult<()> {
        validate_set(&set)?;
        let slot = self.slot(set.stroke_count);
        let mut filled = slot.lock().unwrap_or_else(|e| e.into_inner());
        *filled = Some(Arc::new(set));
        Ok(())
    }

    fn slot(&self, stroke_count: usize) -> Slot {
        {
            let sets = self.sets.read().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = sets.get(&stroke_count) {
                return slot.clone();
            }
        }
        let mut sets = self.sets.write().unwrap_or_else(|e| e.into_inner());
        sets.entry(stroke_count).or_default().clone()
    }

    fn filled_sets(&self) -> Vec<Arc<PatternSet>> {
        let sets = self.sets.read().unwrap_or_else(|e| e.into_inner());
        let mut res: Vec<Arc<PatternSet>> = sets
            .values()
            .filter_map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
            .collect();
        res.sort_by_key(|s| s.stroke_count);
        res
    }

    /// Candidate set for the stroke count; empty when no reference data exists.
    pub fn get(&self, stroke_count: usize) -> LookupResult<Arc<PatternSet>> {
        let slot = self.slot(stroke_count);
        // Concurrent first calls for the same stroke count wait here for one load
        let mut filled = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(set) = filled.as_ref() {
            return Ok(set.clone());
        }
        let set = Arc::new(self.load(stroke_count)?);
        *filled = Some(set.clone());
        Ok(set)
    }

    fn load(&self, stroke_count: usize) -> LookupResult<PatternSet> {
        let text = match &self.source {
            Some(source) => source.read(stroke_count)?,
            None => None,
        };
        match text {
            Some(text) => {
                let set = parse_set(stroke_count, &text)?;
                debug!(stroke_count, candidates = set.candidates.len(), "loaded reference patterns");
                Ok(set)
            }
            None => {
                debug!(stroke_count, "no reference patterns for stroke count");
                Ok(PatternSet {
                    stroke_count: stroke_count,
                    candidates: Vec::new(),
                })
            }
        }
    }

    /// Loads every listed stroke count up front, failing on the first malformed set.
    pub fn preload(&self, stroke_counts: &[usize]) -> LookupResult<usize> {
        let mut total = 0;
        for &stroke_count in stroke_counts {
            total += self.get(stroke_count)?.candidates.len();
        }
        Ok(total)
    }

    /// Stroke counts currently held in memory, ascending.
    pub fn loaded_stroke_counts(&self) -> Vec<usize> {
        self.filled_sets().iter().map(|s| s.stroke_count).collect()
    }

    /// Serializes every loaded set and flushes the writer; the snapshot is self-contained.
    pub fn write_snapshot<W: Write>(&self, mut writer: W) -> LookupResult<()> {
        let sets: Vec<PatternSet> = self.filled_sets().iter().map(|s| PatternSet::clone(s)).collect();
        let snapshot = Snapshot { sets: sets };
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(())
    }

    /// Database holding exactly the sets of a snapshot; other stroke counts have no candidates.
    pub fn from_snapshot<R: Read>(reader: R) -> LookupResult<PatternDatabase> {
        let snapshot: Snapshot = bincode::deserialize_from(io::BufReader::new(reader))?;
        let db = PatternDatabase::new();
        let mut total = 0;
        for set in snapshot.sets {
            total += set.candidates.len();
            db.insert_set(set)?;
        }
        info!(candidates = total, "loaded pattern snapshot");
        Ok(db)
    }
}

fn invalid(set: &PatternSet, candidate: usize, reason: String) -> LookupError {
    LookupError::InvalidPatternSet {
        stroke_count: set.stroke_count,
        candidate: candidate,
        reason: reason,
    }
}

// The guarantees parse_set gives for text, checked on sets built elsewhere
fn validate_set(set: &PatternSet) -> LookupResult<()> {
    for (ix, candidate) in set.candidates.iter().enumerate() {
        if candidate.stroke_count() != set.stroke_count {
            let reason = format!("has {} strokes", candidate.stroke_count());
            return Err(invalid(set, ix, reason));
        }
        if let Some(stroke) = candidate.strokes.iter().position(|p| p.is_empty()) {
            let reason = format!("stroke {} has an empty direction pattern", stroke + 1);
            return Err(invalid(set, ix, reason));
        }
        for constraint in &candidate.constraints {
            let stroke = usize::max(constraint.first.stroke, constraint.second.stroke);
            if stroke >= set.stroke_count {
                let reason = format!("constraint refers to stroke {}", stroke + 1);
                return Err(invalid(set, ix, reason));
            }
        }
    }
    Ok(())
}

impl Default for PatternDatabase {
    fn default() -> Self {
        PatternDatabase::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        reads: Arc<AtomicUsize>,
    }

    impl PatternSource for CountingSource {
        fn read(&self, stroke_count: usize) -> io::Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if stroke_count == 1 {
                Ok(Some("4E00|6\n4E28|2\n".to_string()))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn test_sets_load_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let db = PatternDatabase::with_source(CountingSource { reads: reads.clone() });
        assert_eq!(db.get(1).unwrap().candidates.len(), 2);
        assert_eq!(db.get(1).unwrap().candidates.len(), 2);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        // Missing data is an empty set, also cached
        assert!(db.get(7).unwrap().candidates.is_empty());
        assert!(db.get(7).unwrap().candidates.is_empty());
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(db.loaded_stroke_counts(), [1, 7]);
    }

    struct SlowSource {
        reads: Arc<AtomicUsize>,
    }

    impl PatternSource for SlowSource {
        fn read(&self, _stroke_count: usize) -> io::Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
            Ok(Some("4E00|6\n".to_string()))
        }
    }

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let db = PatternDatabase::with_source(SlowSource { reads: reads.clone() });
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(db.get(1).unwrap().candidates.len(), 1);
                });
            }
        });
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_insert_set_rejects_unscorable_sets() {
        let db = PatternDatabase::new();
        let good = parse_set(1, "4E00|6|l1-l1").unwrap();

        let mut bad_ref = good.clone();
        bad_ref.candidates[0].constraints[0].second.stroke = 3;
        assert!(matches!(
            db.insert_set(bad_ref),
            Err(LookupError::InvalidPatternSet { stroke_count: 1, candidate: 0, .. })
        ));

        let mut empty_pattern = good.clone();
        empty_pattern.candidates[0].strokes[0].clear();
        assert!(matches!(db.insert_set(empty_pattern), Err(LookupError::InvalidPatternSet { .. })));

        let mut wrong_count = good.clone();
        wrong_count.stroke_count = 2;
        assert!(matches!(db.insert_set(wrong_count), Err(LookupError::InvalidPatternSet { stroke_count: 2, .. })));

        // Nothing rejected got stored
        assert!(db.loaded_stroke_counts().is_empty());
        assert!(db.insert_set(good).is_ok());
        assert_eq!(db.loaded_stroke_counts(), [1]);
    }

    #[test]
    fn test_snapshot_with_bad_set_fails_to_load() {
        let mut set = parse_set(2, "5341|6 2|y1-y2!").unwrap();
        set.candidates[0].constraints[0].first.stroke = 5;
        let snapshot = Snapshot { sets: vec![set] };
        let bytes = bincode::serialize(&snapshot).unwrap();
        assert!(matches!(
            PatternDatabase::from_snapshot(&bytes[..]),
            Err(LookupError::InvalidPatternSet { .. })
        ));
    }

    // Accepts every write, but cannot flush
    struct UnflushableWriter {
        bytes: Vec<u8>,
    }

    impl Write for UnflushableWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_snapshot_reports_flush_failure() {
        let db = PatternDatabase::new();
        db.insert_text(1, "4E00|6\n").unwrap();
        let mut writer = UnflushableWriter { bytes: Vec::new() };
        assert!(matches!(db.write_snapshot(&mut writer), Err(LookupError::Io(_))));
        assert!(!writer.bytes.is_empty());
    }

    #[test]
    fn test_dir_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = LookupConfig::default();
        fs::write(dir.path().join("strokes-1.txt"), "4E00|6\n").unwrap();
        fs::write(dir.path().join("strokes-2.txt"), "5341|6 2\n").unwrap();
        fs::write(dir.path().join("strokes-3.txt"), "5DDD|2 z 2\n").unwrap();
        fs::write(dir.path().join("readme.md"), "not a pattern file").unwrap();

        let source = DirSource::new(dir.path(), &config);
        assert_eq!(source.stroke_counts().unwrap(), [1, 2, 3]);

        let db = PatternDatabase::from_dir(dir.path(), &config);
        assert_eq!(db.get(2).unwrap().candidates[0].code, CharCode::Glyph('十'));
        assert!(db.get(4).unwrap().candidates.is_empty());
        assert!(matches!(db.get(3), Err(LookupError::InvalidDirectionToken { line: 1, token: 'z', .. })));
        assert!(db.preload(&[1, 2]).is_ok());
    }

    #[test]
    fn test_snapshot_keeps_sets() {
        let db = PatternDatabase::new();
        db.insert_text(1, "4E00|6\n").unwrap();
        db.insert_text(2, "5341|6 2|y2-y1!\n").unwrap();
        let mut bytes: Vec<u8> = Vec::new();
        db.write_snapshot(&mut bytes).unwrap();

        let restored = PatternDatabase::from_snapshot(&bytes[..]).unwrap();
        assert_eq!(restored.loaded_stroke_counts(), [1, 2]);
        assert_eq!(*restored.get(2).unwrap(), *db.get(2).unwrap());
        assert!(restored.get(3).unwrap().candidates.is_empty());
    }
}
