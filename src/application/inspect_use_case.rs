// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Gathers everything known about one record:
//
//   image   → id, file on disk (if an image dir was given), URL, size
//   dialogue→ question / answer pairs
//   objects → id, category name, bounding box, target marker
//   outcome → success flag

use anyhow::{Context, Result};
use std::{fmt, path::PathBuf};

use crate::data::error::DataError;
use crate::data::reader::{GameReader, ReaderConfig};
use crate::domain::record::GameRecord;

/// One record plus the lookups that need the index document.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub game:           GameRecord,
    pub image_path:     Option<PathBuf>,
    pub image_url:      String,
    pub category_names: Vec<String>,
}

pub struct InspectUseCase {
    reader: GameReader,
}

impl InspectUseCase {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let reader = GameReader::open(config).context("Cannot open the dataset")?;
        Ok(Self { reader })
    }

    pub fn record_count(&self) -> Result<usize> {
        Ok(self.reader.record_count()?)
    }

    pub fn report(&self, record_id: usize) -> Result<GameReport> {
        let game = self
            .reader
            .game(record_id)
            .with_context(|| format!("Cannot read record {record_id}"))?;

        // The image directory is optional for inspection
        let image_path = match self.reader.image_path(record_id) {
            Ok(path) => Some(path),
            Err(DataError::MissingResource("image directory")) => None,
            Err(e) => return Err(e.into()),
        };
        let image_url = self.reader.image_url(record_id)?;

        let category_names = game
            .category_ids
            .iter()
            .map(|&id| self.reader.category_name(id).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GameReport { game, image_path, image_url, category_names })
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.game;
        writeln!(f, "Record {}", g.record_id)?;
        writeln!(f, "  image id   : {}", g.image_id)?;
        if let Some(path) = &self.image_path {
            writeln!(f, "  image file : {}", path.display())?;
        }
        writeln!(f, "  image url  : {}", self.image_url)?;
        writeln!(f, "  image size : {} x {}", g.width, g.height)?;

        writeln!(f, "  dialogue   :")?;
        for (q, a) in g.dialogue() {
            writeln!(f, "    Q: {q}  A: {a}")?;
        }
        // Questions without a recorded answer
        for q in g.questions.iter().skip(g.answers.len()) {
            writeln!(f, "    Q: {q}  A: -")?;
        }

        writeln!(f, "  objects    :")?;
        for (i, ((id, bbox), name)) in g
            .object_ids
            .iter()
            .zip(&g.bboxes)
            .zip(&self.category_names)
            .enumerate()
        {
            let marker = if Some(i) == g.target_index() { '*' } else { ' ' };
            writeln!(
                f,
                "   {marker}{id:>8} {name:<16} [{}, {}, {}, {}]",
                bbox.x, bbox.y, bbox.width, bbox.height
            )?;
        }
        writeln!(f, "  target     : {}", g.target_object)?;
        write!(f, "  success    : {}", g.success)
    }
}
