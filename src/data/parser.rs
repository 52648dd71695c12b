use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;

use crate::data::document::{Document, Field};

/// Parser for JSON and gzipped JSON documents
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Validate document structure before annotation
    /// Checks for valid edge indices and consistent token counts
    pub fn validate_document(&self, doc: &Document) -> Result<()> {
        for (sentence_idx, sentence) in doc.sentences.iter().enumerate() {
            let token_count = sentence.num_tokens as usize;

            for field in &sentence.fields {
                match field {
                    Field::TokensField { name, tokens } => {
                        if tokens.len() != token_count {
                            log::warn!(
                                "Document '{}' sentence {}: field '{}' has {} tokens but numTokens is {}",
                                doc.id, sentence_idx, name, tokens.len(), token_count
                            );
                        }
                    }
                    Field::GraphField { edges, roots, .. } => {
                        for (from, to, rel) in edges {
                            for (role, idx) in [("from", *from), ("to", *to)] {
                                if idx as usize >= token_count {
                                    return Err(anyhow!(
                                        "Document '{}' sentence {}: edge {}->{}:{} has invalid '{}' index {} (token count: {})",
                                        doc.id, sentence_idx, from, to, rel, role, idx, token_count
                                    ));
                                }
                            }
                        }
                        if let Some(root) = roots.iter().find(|r| **r as usize >= token_count) {
                            return Err(anyhow!(
                                "Document '{}' sentence {}: root {} out of bounds (token count: {})",
                                doc.id, sentence_idx, root, token_count
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse a JSON file (regular or gzipped)
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<Document>> {
        let path = file_path.as_ref();
        let file = File::open(path)
            .map_err(|e| anyhow!("Could not open {}: {}", path.display(), e))?;

        // Check if file is gzipped by looking at magic bytes
        let mut reader = BufReader::new(file);
        let mut magic = [0u8; 2];
        let is_gzip = reader.read_exact(&mut magic).is_ok() && magic == [0x1f, 0x8b];

        let file = File::open(path)?;
        let documents = if is_gzip {
            self.parse_reader(BufReader::new(GzDecoder::new(file)))?
        } else {
            self.parse_reader(BufReader::new(file))?
        };

        for doc in &documents {
            self.validate_document(doc)?;
        }
        Ok(documents)
    }

    /// Parse from a reader (handles single document, array of documents, and JSONL)
    pub fn parse_reader<R: Read>(&self, mut reader: BufReader<R>) -> Result<Vec<Document>> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        if let Ok(docs) = self.parse_json(&content) {
            return Ok(docs);
        }

        let mut documents = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if !line.trim().is_empty() {
                let doc: Document = serde_json::from_str(line)
                    .map_err(|e| anyhow!("Line {}: {}", line_no + 1, e))?;
                documents.push(doc);
            }
        }

        Ok(documents)
    }

    /// Parse a JSON string
    pub fn parse_json(&self, json_str: &str) -> Result<Vec<Document>> {
        if let Ok(doc) = serde_json::from_str::<Document>(json_str) {
            return Ok(vec![doc]);
        }

        if let Ok(docs) = serde_json::from_str::<Vec<Document>>(json_str) {
            return Ok(docs);
        }

        Err(anyhow!("Failed to parse JSON as single document or array of documents"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn doc_json(id: &str) -> String {
        format!(
            r#"{{"id": "{}", "metadata": [], "sentences": [{{"numTokens": 2, "fields": [
                {{"$type": "ai.lum.odinson.TokensField", "name": "word", "tokens": ["Great", "class"]}},
                {{"$type": "ai.lum.odinson.GraphField", "name": "dependencies", "edges": [[1, 0, "amod"]], "roots": [1]}}
            ]}}]}}"#,
            id
        )
    }

    #[test]
    fn test_parse_single_and_array() {
        let parser = DocumentParser::new();
        assert_eq!(parser.parse_json(&doc_json("a")).unwrap().len(), 1);

        let array = format!("[{}, {}]", doc_json("a"), doc_json("b"));
        let docs = parser.parse_json(&array).unwrap();
        assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_jsonl_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.jsonl");
        let jsonl = format!("{}\n\n{}\n", doc_json("a").replace('\n', " "), doc_json("b").replace('\n', " "));
        fs::write(&path, jsonl).unwrap();

        let docs = DocumentParser::new().parse_file(&path).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_parse_gzipped_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(doc_json("zipped").as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let docs = DocumentParser::new().parse_file(&path).unwrap();
        assert_eq!(docs[0].id, "zipped");
    }

    #[test]
    fn test_validate_rejects_bad_edge() {
        let json = doc_json("bad").replace("[[1, 0, \"amod\"]]", "[[1, 4, \"amod\"]]");
        let parser = DocumentParser::new();
        let docs = parser.parse_json(&json).unwrap();
        let err = parser.validate_document(&docs[0]).unwrap_err();
        assert!(err.to_string().contains("invalid 'to' index 4"));
    }
}
