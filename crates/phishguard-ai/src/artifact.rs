//! Paired model artifacts stored as Arrow IPC files.
//!
//! `vectorizer.arrow` holds one row per vocabulary term (`term`, `idf`);
//! `classifier.arrow` holds one row per feature (`ham_log_prob`,
//! `spam_log_prob`). Both schemas carry the training run id and the feature
//! count as metadata, and a pair is only loaded when those agree.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use phishguard_core::config::{CLASSIFIER_FILE, VECTORIZER_FILE};
use tempfile::NamedTempFile;
use tracing::info;

use crate::naive_bayes::MultinomialNb;
use crate::trainer::TrainedModel;
use crate::vectorizer::TfidfVectorizer;
use crate::ArtifactError;

const RUN_ID: &str = "phishguard.run_id";
const N_FEATURES: &str = "phishguard.n_features";
const STOP_WORDS: &str = "phishguard.stop_words";
const HAM_PRIOR: &str = "phishguard.class_log_prior.ham";
const SPAM_PRIOR: &str = "phishguard.class_log_prior.spam";

/// A vectorizer and classifier known to come from the same training run.
pub struct ModelPair {
    pub run_id: String,
    pub vectorizer: TfidfVectorizer,
    pub classifier: MultinomialNb,
}

/// Location of the two artifact files.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(VECTORIZER_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_FILE)
    }

    /// Write both halves, replacing any previous pair.
    ///
    /// Both files are fully written to temporaries in the model directory
    /// before either is renamed into place, so a failed run leaves the
    /// previous artifacts untouched.
    pub fn publish(&self, model: &TrainedModel) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let vectorizer = vectorizer_batch(&model.run_id, &model.vectorizer)
            .map_err(arrow_err(&self.vectorizer_path()))?;
        let classifier = classifier_batch(&model.run_id, &model.classifier)
            .map_err(arrow_err(&self.classifier_path()))?;

        let vectorizer_tmp = self.write_temp(&vectorizer, &self.vectorizer_path())?;
        let classifier_tmp = self.write_temp(&classifier, &self.classifier_path())?;

        persist(vectorizer_tmp, &self.vectorizer_path())?;
        persist(classifier_tmp, &self.classifier_path())?;

        info!(
            run_id = %model.run_id,
            dir = %self.dir.display(),
            features = model.vectorizer.n_features(),
            "published model artifacts"
        );
        Ok(())
    }

    /// Load the pair. `Ok(None)` when either file is absent.
    pub fn load(&self) -> Result<Option<ModelPair>, ArtifactError> {
        let v_path = self.vectorizer_path();
        let c_path = self.classifier_path();
        if !v_path.exists() || !c_path.exists() {
            return Ok(None);
        }

        let (v_schema, v_batches) = read_ipc(&v_path)?;
        let (c_schema, c_batches) = read_ipc(&c_path)?;

        let v_run = meta(&v_schema, RUN_ID, &v_path)?.to_string();
        let c_run = meta(&c_schema, RUN_ID, &c_path)?.to_string();
        let v_width: usize = parse_meta(&v_schema, N_FEATURES, &v_path)?;
        let c_width: usize = parse_meta(&c_schema, N_FEATURES, &c_path)?;

        if v_run != c_run || v_width != c_width {
            return Err(ArtifactError::Mismatch {
                vectorizer_run: v_run,
                vectorizer_width: v_width,
                classifier_run: c_run,
                classifier_width: c_width,
            });
        }

        let vectorizer = read_vectorizer(&v_schema, &v_batches, &v_path)?;
        let classifier = read_classifier(&c_schema, &c_batches, &c_path)?;

        if vectorizer.n_features() != v_width || classifier.n_features() != c_width {
            return Err(malformed(&v_path, "row count disagrees with n_features metadata"));
        }

        Ok(Some(ModelPair {
            run_id: v_run,
            vectorizer,
            classifier,
        }))
    }

    fn write_temp(&self, batch: &RecordBatch, target: &Path) -> Result<NamedTempFile, ArtifactError> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err(&self.dir))?;
        {
            let schema = batch.schema();
            let mut writer =
                FileWriter::try_new(tmp.as_file_mut(), &schema).map_err(arrow_err(target))?;
            writer.write(batch).map_err(arrow_err(target))?;
            writer.finish().map_err(arrow_err(target))?;
        }
        tmp.as_file().sync_all().map_err(io_err(target))?;
        Ok(tmp)
    }
}

// ── Encoding ──

fn vectorizer_batch(
    run_id: &str,
    v: &TfidfVectorizer,
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let metadata = HashMap::from([
        (RUN_ID.to_string(), run_id.to_string()),
        (N_FEATURES.to_string(), v.n_features().to_string()),
        (STOP_WORDS.to_string(), v.stop_words().to_string()),
    ]);
    let schema = Schema::new_with_metadata(
        vec![
            Field::new("term", DataType::Utf8, false),
            Field::new("idf", DataType::Float64, false),
        ],
        metadata,
    );
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from_iter_values(v.terms())) as ArrayRef,
            Arc::new(Float64Array::from(v.idf().to_vec())) as ArrayRef,
        ],
    )
}

fn classifier_batch(
    run_id: &str,
    nb: &MultinomialNb,
) -> Result<RecordBatch, arrow::error::ArrowError> {
    let [ham_prior, spam_prior] = *nb.class_log_prior();
    let metadata = HashMap::from([
        (RUN_ID.to_string(), run_id.to_string()),
        (N_FEATURES.to_string(), nb.n_features().to_string()),
        (HAM_PRIOR.to_string(), ham_prior.to_string()),
        (SPAM_PRIOR.to_string(), spam_prior.to_string()),
    ]);
    let schema = Schema::new_with_metadata(
        vec![
            Field::new("ham_log_prob", DataType::Float64, false),
            Field::new("spam_log_prob", DataType::Float64, false),
        ],
        metadata,
    );
    let [ham, spam] = nb.feature_log_prob();
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Float64Array::from(ham.clone())) as ArrayRef,
            Arc::new(Float64Array::from(spam.clone())) as ArrayRef,
        ],
    )
}

// ── Decoding ──

fn read_ipc(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>), ArtifactError> {
    let file = File::open(path).map_err(io_err(path))?;
    let reader = FileReader::try_new(file, None).map_err(arrow_err(path))?;
    let schema = reader.schema();
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(arrow_err(path))?;
    Ok((schema, batches))
}

fn read_vectorizer(
    schema: &Schema,
    batches: &[RecordBatch],
    path: &Path,
) -> Result<TfidfVectorizer, ArtifactError> {
    let stop_words: bool = parse_meta(schema, STOP_WORDS, path)?;
    let mut terms = Vec::new();
    let mut idf = Vec::new();
    for batch in batches {
        let term_col = column::<StringArray>(batch, "term", path)?;
        let idf_col = column::<Float64Array>(batch, "idf", path)?;
        for row in 0..batch.num_rows() {
            terms.push(term_col.value(row).to_string());
            idf.push(idf_col.value(row));
        }
    }
    if !terms.windows(2).all(|w| w[0] < w[1]) {
        return Err(malformed(path, "vocabulary is not sorted"));
    }
    Ok(TfidfVectorizer::from_parts(terms, idf, stop_words))
}

fn read_classifier(
    schema: &Schema,
    batches: &[RecordBatch],
    path: &Path,
) -> Result<MultinomialNb, ArtifactError> {
    let ham_prior: f64 = parse_meta(schema, HAM_PRIOR, path)?;
    let spam_prior: f64 = parse_meta(schema, SPAM_PRIOR, path)?;
    let mut ham = Vec::new();
    let mut spam = Vec::new();
    for batch in batches {
        ham.extend(column::<Float64Array>(batch, "ham_log_prob", path)?.values().iter());
        spam.extend(column::<Float64Array>(batch, "spam_log_prob", path)?.values().iter());
    }
    Ok(MultinomialNb::from_parts([ham_prior, spam_prior], [ham, spam]))
}

fn column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
    path: &Path,
) -> Result<&'a T, ArtifactError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| malformed(path, &format!("missing or mistyped column {name:?}")))
}

fn meta<'a>(schema: &'a Schema, key: &str, path: &Path) -> Result<&'a str, ArtifactError> {
    schema
        .metadata()
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| malformed(path, &format!("missing metadata {key:?}")))
}

fn parse_meta<T: std::str::FromStr>(
    schema: &Schema,
    key: &str,
    path: &Path,
) -> Result<T, ArtifactError> {
    meta(schema, key, path)?
        .parse()
        .map_err(|_| malformed(path, &format!("unparseable metadata {key:?}")))
}

// ── Helpers ──

fn persist(tmp: NamedTempFile, target: &Path) -> Result<(), ArtifactError> {
    tmp.persist(target).map_err(|e| ArtifactError::Io {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + use<> {
    let path = path.to_path_buf();
    move |source| ArtifactError::Io { path, source }
}

fn arrow_err(path: &Path) -> impl FnOnce(arrow::error::ArrowError) -> ArtifactError + use<> {
    let path = path.to_path_buf();
    move |source| ArtifactError::Arrow { path, source }
}

fn malformed(path: &Path, reason: &str) -> ArtifactError {
    ArtifactError::Malformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
