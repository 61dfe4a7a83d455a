// Synthetic three-record dataset written to a temp directory.
//
//   record 0: image 42 (100x100), objects 11, 12 (+1 padded), target 12, success
//   record 1: image 43 (640x480), object 21 (+2 padded),     target 21, failure
//   record 2: image 42 (200x100), objects 31, 32, 33,         target 99 (not a candidate)
//
// Categories {0: background, 2: bicycle, 5: airplane}, so category_count() == 6.
// Element types are mixed on purpose (u8, i32, f32) to go through the widening readers.

use ndarray::{array, Array1, Array2, Array3};
use ndarray_npy::NpzWriter;
use std::fs::{self, File};
use tempfile::TempDir;

use crate::data::features::{FEATURES, IMAGE_IDS};
use crate::data::reader::{GameReader, ReaderConfig};
use crate::data::store::*;

pub struct FixtureArrays {
    pub answers:         Array2<i64>,
    pub game_index:      Array1<i64>,
    pub image_index:     Array1<i64>,
    pub image_wh:        Array2<i32>,
    pub bboxes:          Array3<f32>,
    pub object_index:    Array2<i64>,
    pub categories:      Array2<i64>,
    pub question_length: Array2<i64>,
    pub questions:       Array3<i64>,
    pub success:         Array1<u8>,
    pub correct_object:  Array1<i64>,
}

impl Default for FixtureArrays {
    fn default() -> Self {
        Self {
            answers:     array![[6, 5, 0, 0], [5, 0, 0, 0], [6, 6, 6, 0]],
            game_index:  array![7, 8, 7],
            image_index: array![42, 43, 42],
            image_wh:    array![[100, 100], [640, 480], [200, 100]],
            bboxes:      array![
                [[25.0, 25.0, 50.0, 50.0], [0.0, 0.0, 10.0, 20.0], [0.0, 0.0, 0.0, 0.0]],
                [[10.0, 20.0, 30.0, 40.0], [0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]],
                [[0.0, 0.0, 100.0, 50.0], [100.0, 0.0, 100.0, 50.0], [50.0, 50.0, 100.0, 50.0]],
            ],
            object_index: array![[11, 12, 0], [21, 0, 0], [31, 32, 33]],
            categories:   array![[2, 5, 0], [2, 0, 0], [5, 2, 5]],
            question_length: array![[4, 3, 0], [0, 2, 0], [1, 0, 0]],
            questions: array![
                [[1, 2, 3, 4], [1, 2, 8, 0], [0, 0, 0, 0]],
                [[0, 0, 0, 0], [3, 7, 0, 0], [0, 0, 0, 0]],
                [[4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ],
            success:        array![1, 0, 1],
            correct_object: array![12, 21, 99],
        }
    }
}

pub const INDEX_JSON: &str = r#"{
    "ind2word": {"1": "is", "2": "it", "3": "a", "4": "cat", "5": "yes",
                 "6": "no", "7": "dog", "8": "red"},
    "word2ind": {"is": 1, "it": 2, "a": 3, "cat": 4, "yes": 5,
                 "no": 6, "dog": 7, "red": 8},
    "img_metadata_training": {
        "7": {"filename": "COCO_val2014_000000000042.jpg",
              "coco_url": "http://images.cocodataset.org/val2014/COCO_val2014_000000000042.jpg"},
        "8": {"filename": "COCO_val2014_000000000043.jpg",
              "coco_url": "http://images.cocodataset.org/val2014/COCO_val2014_000000000043.jpg"}
    },
    "categories_training": {"0": "background", "2": "bicycle", "5": "airplane"},
    "imgID2id": {"42": 1, "43": 0}
}"#;

pub fn write_dataset() -> (TempDir, ReaderConfig) {
    write_dataset_with(|_| {})
}

/// Write the fixture after letting `edit` tweak the record arrays.
pub fn write_dataset_with(edit: impl FnOnce(&mut FixtureArrays)) -> (TempDir, ReaderConfig) {
    let mut arrays = FixtureArrays::default();
    edit(&mut arrays);

    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("records.npz");
    let mut npz = NpzWriter::new(File::create(&data_path).unwrap());
    npz.add_array(ANSWERS, &arrays.answers).unwrap();
    npz.add_array(GAME_INDEX, &arrays.game_index).unwrap();
    npz.add_array(IMAGE_INDEX, &arrays.image_index).unwrap();
    npz.add_array(IMAGE_WH, &arrays.image_wh).unwrap();
    npz.add_array(OBJECTS_BBOX, &arrays.bboxes).unwrap();
    npz.add_array(OBJECT_INDEX, &arrays.object_index).unwrap();
    npz.add_array(OBJECTS, &arrays.categories).unwrap();
    npz.add_array(QUESTION_LENGTH, &arrays.question_length).unwrap();
    npz.add_array(QUESTIONS, &arrays.questions).unwrap();
    npz.add_array(SUCCESS, &arrays.success).unwrap();
    npz.add_array(CORRECT_OBJECT, &arrays.correct_object).unwrap();
    npz.finish().unwrap();

    let index_path = dir.path().join("indices.json");
    fs::write(&index_path, INDEX_JSON).unwrap();

    // Whole-image features: row 0 is image 43, row 1 is image 42
    let image_features_path = dir.path().join("image_features.npz");
    let mut npz = NpzWriter::new(File::create(&image_features_path).unwrap());
    npz.add_array(IMAGE_IDS, &array![43i64, 42]).unwrap();
    npz.add_array(FEATURES, &array![[0.0f32, 0.0, 0.0], [1.0, 1.0, 1.0]]).unwrap();
    npz.finish().unwrap();

    // Crop features: row r belongs to record r
    let crop_features_path = dir.path().join("crop_features.npz");
    let mut npz = NpzWriter::new(File::create(&crop_features_path).unwrap());
    npz.add_array(IMAGE_IDS, &array![42i64, 43, 42]).unwrap();
    npz.add_array(FEATURES, &array![[0.0f32, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap();
    npz.finish().unwrap();

    let config = ReaderConfig {
        data_path:           Some(data_path),
        index_path:          Some(index_path),
        images_dir:          Some(dir.path().join("images")),
        image_features_path: Some(image_features_path),
        crop_features_path:  Some(crop_features_path),
    };
    (dir, config)
}

pub fn open_reader() -> (TempDir, GameReader) {
    let (dir, config) = write_dataset();
    let reader = GameReader::open(&config).unwrap();
    (dir, reader)
}
