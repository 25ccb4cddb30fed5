//! The single writer of the vault index.
//!
//! [`IndexManager`] buffers upserts and deletes and publishes them in atomic commits.
//! Readers obtained through [`IndexManager::reader`] see only committed generations.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use tantivy::{
    DateTime, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, TantivyError, Term,
    directory::MmapDirectory,
};
use tracing::{debug, info, warn};
use vault_config::Config;
use vault_document::{ContentExtractor, Document};

use crate::{
    FileStore, IndexError, IndexStats,
    analyzer::{VAULT_TOKENIZER, build_analyzer_from_name, parse_language},
    fingerprint::{IndexFingerprint, read_fingerprint, write_fingerprint},
    journal::BatchJournal,
    rebuild,
    schema::IndexSchema,
    snapshot::{IndexReaderHandle, IndexSnapshot},
};

/// Smallest writer heap Tantivy accepts.
const MIN_WRITER_HEAP: usize = 15_000_000;

/// Settings needed to open an index.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Directory holding the index files.
    pub root: PathBuf,
    /// Stemmer language.
    pub stemmer: String,
    /// Memory budget for the writer.
    pub writer_heap_bytes: usize,
}

impl IndexOptions {
    /// Options with default analyzer and heap settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stemmer: "english".to_string(),
            writer_heap_bytes: 50_000_000,
        }
    }

    /// Extracts index settings from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.index.root.clone(),
            stemmer: config.index.stemmer.clone(),
            writer_heap_bytes: config.index.writer_heap_bytes,
        }
    }
}

/// Why an index was discarded on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetReason {
    /// The caller asked for a fresh index.
    Requested,
    /// The index was built with a different schema or analyzer.
    FingerprintChanged,
    /// The index files could not be read.
    Corrupt(String),
}

/// What happened while opening the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReport {
    /// Set when the existing index was wiped.
    pub reset: Option<ResetReason>,
    /// Paths of an incomplete batch that need reconciling.
    pub recovered_paths: Vec<String>,
}

impl OpenReport {
    /// Returns true when the index starts empty and needs a full rebuild.
    pub fn needs_full_rebuild(&self) -> bool {
        self.reset.is_some()
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No document existed under the path.
    Added,
    /// An older version was replaced.
    Replaced,
    /// The stored version has the same content hash.
    Unchanged,
}

/// Result of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    /// Generation visible after the commit.
    pub generation: u64,
    /// Number of paths the batch touched. Zero when nothing was pending.
    pub changes: usize,
}

/// A buffered operation on one path.
#[derive(Debug, Clone)]
enum PendingOp {
    /// A new version with this content hash.
    Upsert {
        /// Content hash of the buffered version.
        hash: String,
    },
    /// The document is removed.
    Delete,
}

/// Owns the Tantivy writer and the commit protocol.
pub struct IndexManager {
    /// Index root directory.
    root: PathBuf,
    /// The Tantivy writer.
    writer: IndexWriter,
    /// Reader handle shared with query callers.
    handle: IndexReaderHandle,
    /// Schema with field handles.
    schema: IndexSchema,
    /// Last committed generation.
    generation: u64,
    /// Operations buffered since the last commit.
    pending: HashMap<String, PendingOp>,
    /// Outcome of opening the index.
    open_report: OpenReport,
}

impl IndexManager {
    /// Opens the index, recovering from crashes and incompatible layouts.
    pub fn open(options: &IndexOptions) -> Result<Self, IndexError> {
        Self::open_inner(options, false)
    }

    /// Wipes any existing index and opens an empty one.
    pub fn open_fresh(options: &IndexOptions) -> Result<Self, IndexError> {
        Self::open_inner(options, true)
    }

    /// Shared open path.
    fn open_inner(options: &IndexOptions, fresh: bool) -> Result<Self, IndexError> {
        let root = options.root.clone();
        let schema = IndexSchema::new();
        let fingerprint = IndexFingerprint::new(&options.stemmer);
        parse_language(&options.stemmer)?;

        fs::create_dir_all(&root)?;

        let mut reset = None;
        if fresh {
            wipe_index(&root)?;
            reset = Some(ResetReason::Requested);
        } else if has_index(&root)
            && read_fingerprint(&root)?.as_deref() != Some(fingerprint.hash_string().as_str())
        {
            info!(path = %root.display(), "index fingerprint changed, rebuilding");
            wipe_index(&root)?;
            reset = Some(ResetReason::FingerprintChanged);
        }

        let (index, reader) = match open_tantivy(&root, &schema, &options.stemmer) {
            Ok(opened) => opened,
            Err(IndexError::Corrupt { message, .. }) => {
                warn!(path = %root.display(), error = %message, "index unreadable, rebuilding");
                wipe_index(&root)?;
                reset = Some(ResetReason::Corrupt(message));
                open_tantivy(&root, &schema, &options.stemmer)?
            }
            Err(e) => return Err(e),
        };

        let writer = index
            .writer(options.writer_heap_bytes.max(MIN_WRITER_HEAP))
            .map_err(|e| match e {
                TantivyError::LockFailure(..) => IndexError::Locked { path: root.clone() },
                other => IndexError::open_index(root.clone(), &other),
            })?;

        write_fingerprint(&root, &fingerprint)?;
        let generation = committed_generation(&index)?;

        let recovered_paths = match BatchJournal::read(&root)? {
            Some(journal) if reset.is_none() && journal.generation > generation => {
                info!(
                    generation = journal.generation,
                    paths = journal.paths.len(),
                    "discarding incomplete batch"
                );
                journal.paths
            }
            _ => Vec::new(),
        };
        BatchJournal::remove(&root)?;

        debug!(path = %root.display(), generation, "index opened");

        Ok(Self {
            root,
            writer,
            handle: IndexReaderHandle::new(reader, schema.clone(), generation),
            schema,
            generation,
            pending: HashMap::new(),
            open_report: OpenReport {
                reset,
                recovered_paths,
            },
        })
    }

    /// Returns what happened while opening.
    pub fn open_report(&self) -> &OpenReport {
        &self.open_report
    }

    /// Returns the index root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns a cloneable reader handle for query callers.
    pub fn reader(&self) -> IndexReaderHandle {
        self.handle.clone()
    }

    /// Takes a snapshot of the last committed state.
    pub fn snapshot(&self) -> IndexSnapshot {
        self.handle.snapshot()
    }

    /// Returns the last committed generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of buffered operations.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of committed documents.
    pub fn len(&self) -> u64 {
        self.snapshot().num_docs()
    }

    /// Returns true when no documents are committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content hash of the current version of a path, including buffered changes.
    pub fn indexed_hash(&self, path: &str) -> Result<Option<String>, IndexError> {
        match self.pending.get(path) {
            Some(PendingOp::Upsert { hash }) => Ok(Some(hash.clone())),
            Some(PendingOp::Delete) => Ok(None),
            None => Ok(self.snapshot().get(path)?.map(|doc| doc.content_hash)),
        }
    }

    /// Every indexed path with its content hash, including buffered changes.
    pub fn indexed_hashes(&self) -> Result<BTreeMap<String, String>, IndexError> {
        let mut hashes: BTreeMap<String, String> = self
            .snapshot()
            .documents()?
            .into_iter()
            .map(|doc| (doc.path, doc.content_hash))
            .collect();

        for (path, op) in &self.pending {
            match op {
                PendingOp::Upsert { hash } => {
                    hashes.insert(path.clone(), hash.clone());
                }
                PendingOp::Delete => {
                    hashes.remove(path);
                }
            }
        }
        Ok(hashes)
    }

    /// Indexed paths strictly below a directory.
    pub fn paths_under(&self, dir: &str) -> Result<Vec<String>, IndexError> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        Ok(self
            .indexed_hashes()?
            .into_keys()
            .filter(|path| path.starts_with(&prefix))
            .collect())
    }

    /// Buffers a new version of a document.
    ///
    /// The old version is deleted and the new one added in the same batch, so
    /// readers see either the old or the new document, never both or neither.
    pub fn upsert(&mut self, doc: &Document) -> Result<UpsertOutcome, IndexError> {
        let existing = self.indexed_hash(&doc.path)?;
        if existing.as_deref() == Some(doc.content_hash.as_str()) {
            return Ok(UpsertOutcome::Unchanged);
        }

        let tantivy_doc = self.to_tantivy(doc)?;
        self.writer
            .delete_term(Term::from_field_text(self.schema.path, &doc.path));
        self.writer
            .add_document(tantivy_doc)
            .map_err(|e| IndexError::write(&e))?;

        self.pending.insert(
            doc.path.clone(),
            PendingOp::Upsert {
                hash: doc.content_hash.clone(),
            },
        );
        debug!(path = %doc.path, "buffered upsert");

        Ok(if existing.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Added
        })
    }

    /// Buffers removal of a document. Returns false if the path is not indexed.
    pub fn delete(&mut self, path: &str) -> Result<bool, IndexError> {
        if self.indexed_hash(path)?.is_none() {
            return Ok(false);
        }
        self.writer.delete_term(Term::from_field_text(self.schema.path, path));
        self.pending.insert(path.to_string(), PendingOp::Delete);
        debug!(path = %path, "buffered delete");
        Ok(true)
    }

    /// Publishes all buffered operations as one batch.
    ///
    /// The batch journal is synced before the Tantivy commit and removed after it.
    /// Snapshots taken before the commit keep their view.
    pub fn commit(&mut self) -> Result<CommitStats, IndexError> {
        if self.pending.is_empty() {
            return Ok(CommitStats {
                generation: self.generation,
                changes: 0,
            });
        }

        let generation = self.generation + 1;
        let mut paths: Vec<String> = self.pending.keys().cloned().collect();
        paths.sort();
        let changes = paths.len();

        BatchJournal { generation, paths }.write(&self.root)?;

        let mut prepared = self
            .writer
            .prepare_commit()
            .map_err(|e| IndexError::commit(&e))?;
        prepared.set_payload(&generation.to_string());
        prepared.commit().map_err(|e| IndexError::commit(&e))?;

        self.generation = generation;
        self.pending.clear();
        self.handle.publish(generation)?;
        BatchJournal::remove(&self.root)?;

        debug!(generation, changes, "committed batch");
        Ok(CommitStats {
            generation,
            changes,
        })
    }

    /// Brings the index in line with every supported file in `store`.
    ///
    /// Commits every `batch_size` changes and once at the end. Running it twice in a
    /// row changes nothing the second time.
    pub fn rebuild_from(
        &mut self,
        store: &dyn FileStore,
        extractor: &ContentExtractor,
        batch_size: usize,
    ) -> Result<IndexStats, IndexError> {
        rebuild::rebuild_from(self, store, extractor, batch_size)
    }

    /// Re-reads one path from `store` and buffers the changes it needs.
    pub fn sync_path(
        &mut self,
        store: &dyn FileStore,
        extractor: &ContentExtractor,
        path: &str,
    ) -> Result<IndexStats, IndexError> {
        rebuild::sync_path(self, store, extractor, path)
    }

    /// Converts a document into its Tantivy representation.
    fn to_tantivy(&self, doc: &Document) -> Result<TantivyDocument, IndexError> {
        let schema = &self.schema;
        let mut tantivy_doc = TantivyDocument::new();

        tantivy_doc.add_text(schema.path, &doc.path);
        tantivy_doc.add_text(schema.path_text, &doc.path);
        tantivy_doc.add_text(schema.body, &doc.body_text);
        for tag in doc.structured_fields.tags() {
            tantivy_doc.add_text(schema.tags, &tag);
        }

        let fields_json = serde_json::to_string(&doc.structured_fields)
            .map_err(|e| IndexError::Write(e.to_string()))?;
        tantivy_doc.add_text(schema.fields_json, &fields_json);

        let secs = doc
            .modified_at
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        tantivy_doc.add_date(schema.modified, DateTime::from_timestamp_secs(secs));

        tantivy_doc.add_text(schema.content_hash, &doc.content_hash);
        tantivy_doc.add_text(schema.doc_kind, doc.doc_kind.as_str());
        tantivy_doc.add_bool(schema.extraction_failed, doc.extraction_failed);

        Ok(tantivy_doc)
    }
}

/// Opens an existing index for reading only.
///
/// Used by one-shot callers that must not take the writer lock.
pub fn open_reader(options: &IndexOptions) -> Result<IndexReaderHandle, IndexError> {
    if !has_index(&options.root) {
        return Err(IndexError::OpenIndex {
            path: options.root.clone(),
            message: "no index found".to_string(),
        });
    }
    let schema = IndexSchema::new();
    let (index, reader) = open_tantivy(&options.root, &schema, &options.stemmer)?;
    let generation = committed_generation(&index)?;
    Ok(IndexReaderHandle::new(reader, schema, generation))
}

/// Returns true if the index root holds Tantivy metadata.
pub fn has_index(root: &Path) -> bool {
    root.join("meta.json").exists()
}

/// Opens or creates the Tantivy index and a manually reloaded reader.
fn open_tantivy(
    root: &Path,
    schema: &IndexSchema,
    stemmer: &str,
) -> Result<(Index, IndexReader), IndexError> {
    let dir = MmapDirectory::open(root).map_err(|e| {
        let err: TantivyError = e.into();
        IndexError::open_index(root.to_path_buf(), &err)
    })?;

    let index =
        Index::open_or_create(dir, schema.schema().clone()).map_err(|e| classify(root, &e))?;
    index
        .tokenizers()
        .register(VAULT_TOKENIZER, build_analyzer_from_name(stemmer)?);

    let reader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()
        .map_err(|e| classify(root, &e))?;

    Ok((index, reader))
}

/// Maps Tantivy open failures, separating unreadable data from other errors.
fn classify(root: &Path, err: &TantivyError) -> IndexError {
    match err {
        TantivyError::DataCorruption(_)
        | TantivyError::SchemaError(_)
        | TantivyError::OpenReadError(_)
        | TantivyError::IncompatibleIndex(_) => IndexError::Corrupt {
            path: root.to_path_buf(),
            message: err.to_string(),
        },
        TantivyError::LockFailure(..) => IndexError::Locked {
            path: root.to_path_buf(),
        },
        other => IndexError::open_index(root.to_path_buf(), other),
    }
}

/// Reads the generation stored in the last commit payload.
fn committed_generation(index: &Index) -> Result<u64, IndexError> {
    let metas = index.load_metas().map_err(|e| IndexError::read(&e))?;
    Ok(metas
        .payload
        .as_deref()
        .and_then(|payload| payload.trim().parse().ok())
        .unwrap_or(0))
}

/// Removes every file and directory in the index root.
fn wipe_index(root: &Path) -> Result<(), IndexError> {
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;
    use vault_document::{DocKind, StructuredFields, content_hash};

    use super::*;

    fn doc(path: &str, body: &str) -> Document {
        Document {
            path: path.to_string(),
            body_text: body.to_string(),
            structured_fields: StructuredFields::new(),
            modified_at: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            content_hash: content_hash(body.as_bytes()),
            doc_kind: DocKind::Text,
            extraction_failed: false,
        }
    }

    fn open(temp: &TempDir) -> IndexManager {
        IndexManager::open(&IndexOptions::new(temp.path().join("index"))).unwrap()
    }

    #[test]
    fn opens_empty_index() {
        let temp = TempDir::new().unwrap();
        let manager = open(&temp);

        assert_eq!(manager.generation(), 0);
        assert!(manager.is_empty());
        assert_eq!(manager.open_report(), &OpenReport::default());
        assert!(temp.path().join("index/fingerprint").exists());
    }

    #[test]
    fn upsert_outcomes() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);

        assert_eq!(manager.upsert(&doc("a.md", "one")).unwrap(), UpsertOutcome::Added);
        assert_eq!(
            manager.upsert(&doc("a.md", "one")).unwrap(),
            UpsertOutcome::Unchanged
        );
        manager.commit().unwrap();

        assert_eq!(
            manager.upsert(&doc("a.md", "one")).unwrap(),
            UpsertOutcome::Unchanged
        );
        assert_eq!(
            manager.upsert(&doc("a.md", "two")).unwrap(),
            UpsertOutcome::Replaced
        );
        manager.commit().unwrap();

        assert_eq!(manager.len(), 1);
        let stored = manager.snapshot().get("a.md").unwrap().unwrap();
        assert_eq!(stored.body_text, "two");
    }

    #[test]
    fn delete_unknown_path_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);

        assert!(!manager.delete("never.md").unwrap());
        assert_eq!(manager.commit().unwrap().changes, 0);
        assert_eq!(manager.generation(), 0);
    }

    #[test]
    fn delete_removes_committed_document() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);
        manager.upsert(&doc("a.md", "one")).unwrap();
        manager.commit().unwrap();

        assert!(manager.delete("a.md").unwrap());
        assert!(!manager.delete("a.md").unwrap());
        manager.commit().unwrap();

        assert!(manager.is_empty());
        assert_eq!(manager.indexed_hash("a.md").unwrap(), None);
    }

    #[test]
    fn commit_increments_generation_and_persists_it() {
        let temp = TempDir::new().unwrap();
        {
            let mut manager = open(&temp);
            manager.upsert(&doc("a.md", "one")).unwrap();
            assert_eq!(manager.commit().unwrap().generation, 1);
            manager.upsert(&doc("b.md", "two")).unwrap();
            let stats = manager.commit().unwrap();
            assert_eq!(stats.generation, 2);
            assert_eq!(stats.changes, 1);
        }

        let manager = open(&temp);
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.snapshot().generation(), 2);
        assert_eq!(manager.len(), 2);
        assert!(!BatchJournal::exists(&temp.path().join("index")));
    }

    #[test]
    fn buffered_changes_are_invisible_until_commit() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);
        manager.upsert(&doc("a.md", "one")).unwrap();

        assert!(manager.snapshot().get("a.md").unwrap().is_none());
        assert_eq!(
            manager.indexed_hash("a.md").unwrap(),
            Some(content_hash(b"one"))
        );

        manager.commit().unwrap();
        assert!(manager.snapshot().get("a.md").unwrap().is_some());
    }

    #[test]
    fn stores_document_fields() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);
        let mut document = doc("papers/x.pdf", "");
        document.doc_kind = DocKind::Binary;
        document.extraction_failed = true;
        document.modified_at = SystemTime::UNIX_EPOCH + Duration::from_millis(5_500);
        manager.upsert(&document).unwrap();
        manager.commit().unwrap();

        let stored = manager.snapshot().get("papers/x.pdf").unwrap().unwrap();
        assert_eq!(stored.doc_kind, DocKind::Binary);
        assert!(stored.extraction_failed);
        assert_eq!(stored.modified.timestamp(), 5);
        assert_eq!(stored.structured_fields, serde_json::json!({}));
    }

    #[test]
    fn paths_under_directory() {
        let temp = TempDir::new().unwrap();
        let mut manager = open(&temp);
        for path in ["dir/a.md", "dir/sub/b.md", "dirx/c.md", "d.md"] {
            manager.upsert(&doc(path, path)).unwrap();
        }
        manager.commit().unwrap();

        assert_eq!(
            manager.paths_under("dir").unwrap(),
            vec!["dir/a.md", "dir/sub/b.md"]
        );
    }

    #[test]
    fn fingerprint_change_wipes_index() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("index");
        {
            let mut manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
            manager.upsert(&doc("a.md", "one")).unwrap();
            manager.commit().unwrap();
        }

        let mut options = IndexOptions::new(&root);
        options.stemmer = "french".to_string();
        let manager = IndexManager::open(&options).unwrap();

        assert_eq!(
            manager.open_report().reset,
            Some(ResetReason::FingerprintChanged)
        );
        assert!(manager.is_empty());
        assert_eq!(manager.generation(), 0);
    }

    #[test]
    fn corrupt_index_is_recreated() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("index");
        drop(IndexManager::open(&IndexOptions::new(&root)).unwrap());
        fs::write(root.join("meta.json"), b"{not json").unwrap();

        let manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
        assert!(matches!(
            manager.open_report().reset,
            Some(ResetReason::Corrupt(_))
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn open_fresh_discards_documents() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("index");
        {
            let mut manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
            manager.upsert(&doc("a.md", "one")).unwrap();
            manager.commit().unwrap();
        }

        let manager = IndexManager::open_fresh(&IndexOptions::new(&root)).unwrap();
        assert_eq!(manager.open_report().reset, Some(ResetReason::Requested));
        assert!(manager.is_empty());
    }

    #[test]
    fn second_writer_is_locked() {
        let temp = TempDir::new().unwrap();
        let _manager = open(&temp);

        let err = IndexManager::open(&IndexOptions::new(temp.path().join("index")))
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::Locked { .. }));
    }

    #[test]
    fn leftover_journal_reports_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("index");
        {
            let mut manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
            manager.upsert(&doc("kept.md", "kept")).unwrap();
            manager.commit().unwrap();
            manager.upsert(&doc("lost.md", "lost")).unwrap();
            BatchJournal {
                generation: 2,
                paths: vec!["lost.md".to_string()],
            }
            .write(&root)
            .unwrap();
        }

        let manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
        assert_eq!(manager.open_report().recovered_paths, vec!["lost.md"]);
        assert_eq!(manager.open_report().reset, None);
        assert!(manager.snapshot().get("lost.md").unwrap().is_none());
        assert!(manager.snapshot().get("kept.md").unwrap().is_some());
        assert!(!BatchJournal::exists(&root));
    }

    #[test]
    fn stale_journal_is_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("index");
        {
            let mut manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
            manager.upsert(&doc("a.md", "one")).unwrap();
            manager.commit().unwrap();
        }
        BatchJournal {
            generation: 1,
            paths: vec!["a.md".to_string()],
        }
        .write(&root)
        .unwrap();

        let manager = IndexManager::open(&IndexOptions::new(&root)).unwrap();
        assert!(manager.open_report().recovered_paths.is_empty());
        assert!(!BatchJournal::exists(&root));
    }

    #[test]
    fn read_only_handle_sees_committed_state() {
        let temp = TempDir::new().unwrap();
        let options = IndexOptions::new(temp.path().join("index"));
        {
            let mut manager = IndexManager::open(&options).unwrap();
            manager.upsert(&doc("a.md", "one")).unwrap();
            manager.commit().unwrap();
        }

        let handle = open_reader(&options).unwrap();
        assert_eq!(handle.generation(), 1);
        assert_eq!(handle.snapshot().num_docs(), 1);
    }

    #[test]
    fn read_only_open_requires_index() {
        let temp = TempDir::new().unwrap();
        let options = IndexOptions::new(temp.path().join("missing"));
        assert!(matches!(
            open_reader(&options),
            Err(IndexError::OpenIndex { .. })
        ));
    }
}
