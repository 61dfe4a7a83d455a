// ============================================================
// Layer 4 — Index Document
// ============================================================
// The JSON side of the preprocessed dataset:
//
//   ind2word              "17"   → "cat"
//   word2ind              "cat"  → 17
//   img_metadata_training "3"    → { filename, coco_url }
//   categories_training   "1"    → "person"
//   imgID2id              "9448" → 0        (row in the image feature store)
//
// JSON object keys are always strings, so the raw document
// is parsed first and every stringified integer key is then
// converted once. After loading, lookups take typed integers
// and a missing key is a checked error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use crate::data::error::{DataError, DataResult};

// ─── Raw JSON Shape ───────────────────────────────────────────────────────────
#[derive(Debug, Deserialize)]
struct RawIndex {
    ind2word:              HashMap<String, String>,
    word2ind:              HashMap<String, i64>,
    img_metadata_training: HashMap<String, ImageMetadata>,
    categories_training:   HashMap<String, String>,
    #[serde(rename = "imgID2id")]
    img_id_to_row:         HashMap<String, Value>,
}

/// Where an image lives on disk and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub filename: String,
    #[serde(rename = "coco_url", alias = "url")]
    pub url:      String,
}

// ─── Vocabulary ───────────────────────────────────────────────────────────────
/// Token ↔ id mappings in both directions.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    word_to_id: HashMap<String, i64>,
    id_to_word: HashMap<i64, String>,
}

impl Vocabulary {
    pub fn new(word_to_id: HashMap<String, i64>, id_to_word: HashMap<i64, String>) -> Self {
        Self { word_to_id, id_to_word }
    }

    pub fn word_to_id(&self) -> &HashMap<String, i64> {
        &self.word_to_id
    }

    pub fn id_to_word(&self) -> &HashMap<i64, String> {
        &self.id_to_word
    }

    pub fn word(&self, id: i64) -> DataResult<&str> {
        self.id_to_word
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| DataError::MissingKey { mapping: "ind2word", key: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }
}

// ─── Categories ───────────────────────────────────────────────────────────────
/// Object category names keyed by their dense integer id.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    id_to_name: BTreeMap<i64, String>,
    name_to_id: HashMap<String, i64>,
}

impl Categories {
    pub fn new(id_to_name: BTreeMap<i64, String>) -> Self {
        let name_to_id = id_to_name.iter().map(|(&id, name)| (name.clone(), id)).collect();
        Self { id_to_name, name_to_id }
    }

    /// One past the largest category id; ids are packed from 0.
    pub fn count(&self) -> usize {
        self.id_to_name
            .keys()
            .next_back()
            .map_or(0, |&max| (max + 1).max(0) as usize)
    }

    pub fn name_to_id(&self) -> &HashMap<String, i64> {
        &self.name_to_id
    }

    pub fn id_to_name(&self) -> &BTreeMap<i64, String> {
        &self.id_to_name
    }

    pub fn name(&self, id: i64) -> DataResult<&str> {
        self.id_to_name.get(&id).map(String::as_str).ok_or_else(|| DataError::MissingKey {
            mapping: "categories_training",
            key:     id.to_string(),
        })
    }
}

// ─── IndexDocument ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct IndexDocument {
    vocabulary:    Vocabulary,
    categories:    Categories,
    images:        HashMap<i64, ImageMetadata>,
    image_id_rows: HashMap<i64, usize>,
}

impl IndexDocument {
    pub fn open(path: &Path) -> DataResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_json(&json)?;
        tracing::info!(
            "Opened index '{}': {} words, {} categories, {} images",
            path.display(),
            index.vocabulary.len(),
            index.categories.id_to_name.len(),
            index.images.len()
        );
        Ok(index)
    }

    pub fn from_json(json: &str) -> DataResult<Self> {
        let raw: RawIndex = serde_json::from_str(json)?;

        let id_to_word = raw
            .ind2word
            .into_iter()
            .map(|(k, w)| Ok((parse_key("ind2word", &k)?, w)))
            .collect::<DataResult<HashMap<_, _>>>()?;

        let id_to_name = raw
            .categories_training
            .into_iter()
            .map(|(k, name)| Ok((parse_key("categories_training", &k)?, name)))
            .collect::<DataResult<BTreeMap<_, _>>>()?;

        let images = raw
            .img_metadata_training
            .into_iter()
            .map(|(k, meta)| Ok((parse_key("img_metadata_training", &k)?, meta)))
            .collect::<DataResult<HashMap<_, _>>>()?;

        let image_id_rows = raw
            .img_id_to_row
            .into_iter()
            .map(|(k, row)| Ok((parse_key("imgID2id", &k)?, parse_row(&k, &row)?)))
            .collect::<DataResult<HashMap<_, _>>>()?;

        Ok(Self {
            vocabulary: Vocabulary::new(raw.word2ind, id_to_word),
            categories: Categories::new(id_to_name),
            images,
            image_id_rows,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    /// Metadata for the image behind a game's data id.
    pub fn image(&self, data_id: i64) -> DataResult<&ImageMetadata> {
        self.images.get(&data_id).ok_or_else(|| DataError::MissingKey {
            mapping: "img_metadata_training",
            key:     data_id.to_string(),
        })
    }

    /// Row of an external image id in the whole-image feature store.
    pub fn feature_row(&self, image_id: i64) -> DataResult<usize> {
        self.image_id_rows.get(&image_id).copied().ok_or_else(|| DataError::MissingKey {
            mapping: "imgID2id",
            key:     image_id.to_string(),
        })
    }
}

/// Feature rows are written either as numbers or as numeric strings.
fn parse_row(image: &str, row: &Value) -> DataResult<usize> {
    let parsed = match row {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| DataError::MalformedIndex {
        section: "imgID2id",
        reason:  format!("row {row} for image '{image}' is not a non-negative integer"),
    })
}

fn parse_key(section: &'static str, key: &str) -> DataResult<i64> {
    key.trim().parse::<i64>().map_err(|_| DataError::MalformedIndex {
        section,
        reason: format!("key '{key}' is not an integer"),
    })
}
