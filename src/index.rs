//! Search index submission.
//!
//! [`SearchIndex`] is the seam between the batch driver and the index.
//! [`SolrIndex`] talks to a Solr-compatible HTTP endpoint; tests substitute
//! an in-memory implementation.
//!
//! [`IndexBatcher`] buffers documents and submits them in fixed-size batches,
//! committing after each one. A batch that fails to submit or commit stays
//! buffered and is sent again with the next flush, so documents may be
//! delivered twice but committed batches are never lost.

use crate::document::NormalizedDocument;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of documents per submitted batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const DEFAULT_HTTP_TIMEOUT: u64 = 60;

/// A search index that accepts flat documents.
pub trait SearchIndex {
    /// Names of the fields the index schema declares multi-valued.
    fn multi_valued_fields(&self) -> Result<HashSet<String>>;

    /// Add documents. They become visible after [`commit`](Self::commit).
    fn add(&mut self, documents: &[Value]) -> Result<()>;

    /// Commit everything added so far.
    fn commit(&mut self) -> Result<()>;

    /// Collections already stored for a document ID; empty when the ID is
    /// not in the index.
    fn existing_collections(&self, id: &str) -> Result<Vec<String>>;
}

/// Solr-compatible HTTP index.
#[derive(Debug, Clone)]
pub struct SolrIndex {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SchemaFields {
    fields: Vec<SchemaField>,
}

#[derive(Deserialize)]
struct SchemaField {
    name: String,
    #[serde(default, rename = "multiValued")]
    multi_valued: bool,
}

#[derive(Deserialize)]
struct SelectResponse {
    response: SelectDocs,
}

#[derive(Deserialize)]
struct SelectDocs {
    docs: Vec<SelectDoc>,
}

#[derive(Deserialize)]
struct SelectDoc {
    #[serde(default)]
    collection: Vec<String>,
}

impl SolrIndex {
    /// Client for the core at `base_url`, e.g. `http://localhost:8983/solr/catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT))
            .build()?;
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(SolrIndex { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn check(res: reqwest::blocking::Response, action: &str) -> Result<reqwest::blocking::Response> {
        let status = res.status();
        if status.is_success() {
            debug!(action, %status, "index request succeeded");
            Ok(res)
        } else {
            let body = res.text().unwrap_or_default();
            Err(Error::Index(format!("{action} failed with status {status}: {body}")))
        }
    }
}

impl SearchIndex for SolrIndex {
    fn multi_valued_fields(&self) -> Result<HashSet<String>> {
        let res = self
            .client
            .get(self.url("schema/fields"))
            .query(&[("wt", "json")])
            .send()?;
        let schema: SchemaFields = Self::check(res, "schema lookup")?.json()?;
        Ok(schema
            .fields
            .into_iter()
            .filter(|f| f.multi_valued)
            .map(|f| f.name)
            .collect())
    }

    fn add(&mut self, documents: &[Value]) -> Result<()> {
        let res = self
            .client
            .post(self.url("update"))
            .query(&[("wt", "json")])
            .json(documents)
            .send()?;
        Self::check(res, "update")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let res = self
            .client
            .post(self.url("update"))
            .query(&[("wt", "json")])
            .json(&json!({ "commit": {} }))
            .send()?;
        Self::check(res, "commit")?;
        Ok(())
    }

    fn existing_collections(&self, id: &str) -> Result<Vec<String>> {
        let filter = format!("id:\"{}\"", id.replace('"', "\\\""));
        let res = self
            .client
            .get(self.url("select"))
            .query(&[("q", "*:*"), ("fq", filter.as_str()), ("fl", "collection"), ("wt", "json")])
            .send()?;
        let found: SelectResponse = Self::check(res, "select")?.json()?;
        Ok(found
            .response
            .docs
            .into_iter()
            .next()
            .map(|doc| doc.collection)
            .unwrap_or_default())
    }
}

/// Buffers documents and submits them to a [`SearchIndex`] in batches.
#[derive(Debug)]
pub struct IndexBatcher<I: SearchIndex> {
    index: I,
    batch_size: usize,
    multi_valued: HashSet<String>,
    pending: Vec<Value>,
    /// Queue length that triggers the next flush from `push`.
    flush_at: usize,
    committed: usize,
    batches: usize,
}

impl<I: SearchIndex> IndexBatcher<I> {
    /// Wrap an index. The schema's multi-valued fields are looked up once,
    /// here.
    ///
    /// # Errors
    ///
    /// Returns the index's error if the schema lookup fails.
    pub fn new(index: I, batch_size: usize) -> Result<Self> {
        let multi_valued = index.multi_valued_fields()?;
        debug!(fields = multi_valued.len(), "multi-valued index fields");
        let batch_size = batch_size.max(1);
        Ok(IndexBatcher {
            index,
            batch_size,
            multi_valued,
            pending: Vec::new(),
            flush_at: batch_size,
            committed: 0,
            batches: 0,
        })
    }

    /// Queue a document, flushing when the batch is full.
    ///
    /// After a failed flush the queue is only resubmitted once another
    /// `batch_size` documents have arrived, so an unreachable index sees one
    /// request per batch rather than one per document.
    ///
    /// # Errors
    ///
    /// Returns the flush error; the document stays queued.
    pub fn push(&mut self, document: &NormalizedDocument) -> Result<()> {
        self.pending
            .push(document.to_index_json(&self.multi_valued));
        if self.pending.len() >= self.flush_at {
            self.flush()?;
        }
        Ok(())
    }

    /// Submit and commit everything queued.
    ///
    /// # Errors
    ///
    /// Returns the add or commit error. Queued documents are kept and sent
    /// again on the next flush.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let result = self
            .index
            .add(&self.pending)
            .and_then(|()| self.index.commit());
        match result {
            Ok(()) => {
                self.batches += 1;
                self.committed += self.pending.len();
                info!(
                    batch = self.batches,
                    documents = self.pending.len(),
                    committed = self.committed,
                    "committed batch"
                );
                self.pending.clear();
                self.flush_at = self.batch_size;
                Ok(())
            },
            Err(e) => {
                self.flush_at = self.pending.len() + self.batch_size;
                warn!(error = %e, pending = self.pending.len(), "batch submission failed, keeping documents queued");
                Err(e)
            },
        }
    }

    /// Flush what is left and return the number of committed documents.
    ///
    /// # Errors
    ///
    /// Returns the final flush error.
    pub fn finish(&mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.committed)
    }

    /// Documents committed so far.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Documents queued but not yet committed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Multi-valued fields reported by the index.
    #[must_use]
    pub fn multi_valued_fields(&self) -> &HashSet<String> {
        &self.multi_valued
    }

    /// The wrapped index.
    pub fn index(&self) -> &I {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OutputField;

    #[derive(Debug, Default)]
    struct MemoryIndex {
        added: Vec<Value>,
        committed: Vec<Value>,
        fail_adds: usize,
        add_calls: usize,
    }

    impl SearchIndex for MemoryIndex {
        fn multi_valued_fields(&self) -> Result<HashSet<String>> {
            Ok(["topic".to_string()].into_iter().collect())
        }

        fn add(&mut self, documents: &[Value]) -> Result<()> {
            self.add_calls += 1;
            if self.fail_adds > 0 {
                self.fail_adds -= 1;
                return Err(Error::Index("unavailable".to_string()));
            }
            self.added.extend_from_slice(documents);
            Ok(())
        }

        fn commit(&mut self) -> Result<()> {
            self.committed.append(&mut self.added);
            Ok(())
        }

        fn existing_collections(&self, _id: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn doc(id: &str) -> NormalizedDocument {
        let mut doc = NormalizedDocument::new();
        doc.set_text(OutputField::Id, id);
        doc.extend(OutputField::Topic, ["Whales"]);
        doc
    }

    #[test]
    fn test_flushes_full_batches() {
        let mut batcher = IndexBatcher::new(MemoryIndex::default(), 2).unwrap();
        for id in ["b1", "b2", "b3"] {
            batcher.push(&doc(id)).unwrap();
        }
        assert_eq!(batcher.committed(), 2);
        assert_eq!(batcher.pending(), 1);

        assert_eq!(batcher.finish().unwrap(), 3);
        let committed = &batcher.index().committed;
        assert_eq!(committed.len(), 3);
        assert_eq!(committed[2]["id"], "b3");
        assert_eq!(committed[0]["topic"], json!(["Whales"]));
    }

    #[test]
    fn test_failed_batch_is_retried() {
        let index = MemoryIndex {
            fail_adds: 1,
            ..MemoryIndex::default()
        };
        let mut batcher = IndexBatcher::new(index, 2).unwrap();
        batcher.push(&doc("b1")).unwrap();
        assert!(batcher.push(&doc("b2")).is_err());
        assert_eq!(batcher.pending(), 2);
        assert_eq!(batcher.committed(), 0);

        batcher.push(&doc("b3")).unwrap();
        assert_eq!(batcher.pending(), 3);
        assert_eq!(batcher.index().add_calls, 1);

        batcher.push(&doc("b4")).unwrap();
        assert_eq!(batcher.pending(), 0);
        assert_eq!(batcher.committed(), 4);
        assert_eq!(batcher.index().add_calls, 2);
    }

    #[test]
    fn test_unreachable_index_sees_one_request_per_batch() {
        let index = MemoryIndex {
            fail_adds: 3,
            ..MemoryIndex::default()
        };
        let mut batcher = IndexBatcher::new(index, 2).unwrap();
        let mut failures = 0;
        for n in 1..=7 {
            if batcher.push(&doc(&format!("b{n}"))).is_err() {
                failures += 1;
            }
        }
        assert_eq!(failures, 3);
        assert_eq!(batcher.index().add_calls, 3);
        assert_eq!(batcher.pending(), 7);

        assert_eq!(batcher.finish().unwrap(), 7);
        assert_eq!(batcher.index().add_calls, 4);
        assert_eq!(batcher.index().committed.len(), 7);

        // back to normal batches once the index recovers
        for n in 8..=10 {
            batcher.push(&doc(&format!("b{n}"))).unwrap();
        }
        assert_eq!(batcher.committed(), 9);
        assert_eq!(batcher.pending(), 1);
        assert_eq!(batcher.index().add_calls, 5);
    }

    #[test]
    fn test_finish_with_nothing_queued() {
        let mut batcher = IndexBatcher::new(MemoryIndex::default(), 10).unwrap();
        assert_eq!(batcher.finish().unwrap(), 0);
        assert!(batcher.index().committed.is_empty());
    }

    #[test]
    fn test_solr_base_url_normalized() {
        let index = SolrIndex::new("http://localhost:8983/solr/catalog").unwrap();
        assert_eq!(index.url("update"), "http://localhost:8983/solr/catalog/update");
        let index = SolrIndex::new("http://localhost:8983/solr/catalog/").unwrap();
        assert_eq!(index.url("select"), "http://localhost:8983/solr/catalog/select");
    }
}
