use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, TantivyDocument};

use tutor_core::types::{Passage, RetrievalHit, SourceKind};

use crate::analyzer::{build_schema, register_tokenizer};

/// In-memory BM25 index over passage text.
pub struct LexicalIndex {
    index: Index,
    id_field: tantivy::schema::Field,
    text_field: tantivy::schema::Field,
}

impl LexicalIndex {
    /// Builds the index from the given passages. The caller decides whether
    /// building makes sense at all; an empty slice produces an index that
    /// returns no hits.
    pub fn build(passages: &[Passage]) -> Result<Self> {
        let schema = build_schema();
        let index = Index::create_in_ram(schema.clone());
        register_tokenizer(&index);
        let id_field = schema.get_field("id")?;
        let text_field = schema.get_field("text")?;

        let mut writer = index.writer(50_000_000)?;
        for p in passages {
            writer.add_document(doc!(
                id_field => p.id.clone(),
                text_field => p.text.clone(),
            ))?;
        }
        writer.commit()?;

        Ok(Self {
            index,
            id_field,
            text_field,
        })
    }

    /// Top-k passages by BM25 relevance, descending. Raw scores are on
    /// tantivy's own scale and are only meaningful relative to each other
    /// within this result list.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalHit>> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
        let q = qp.parse_query(query)?;
        let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
        let mut hits = Vec::new();
        for (rank, (score, addr)) in top_docs.into_iter().enumerate() {
            let doc: TantivyDocument = searcher.doc(addr)?;
            let id = doc
                .get_first(self.id_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            hits.push(RetrievalHit {
                id,
                rank: rank + 1,
                raw_score: score,
                source: SourceKind::Lexical,
            });
        }
        Ok(hits)
    }
}
