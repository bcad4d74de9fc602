//! # Model Persistence
//!
//! A saved [`crate::BasicGlyphSubstitutionModel`] is one opaque blob:
//!
//! ```text
//! SCRIPTORIUM-GSM\n          magic
//! u32 (little endian)        schema version
//! gzip(bincode(record))      indexers, options, prior, distributions
//! ```

mod model_io;

pub use model_io::{
    MAX_MODEL_BODY_BYTES,
    MODEL_MAGIC,
    MODEL_VERSION,
    load_model,
    load_model_path,
    save_model,
    save_model_path,
};
