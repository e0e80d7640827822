use crate::domain::example::Example;
use crate::domain::subword::{EOS_ID, NUM_RESERVED_IDS, PAD_ID, SubwordEncoder};
use crate::error::AppResult;

const INPUT_FEATURE: &str = "inputs";

/// Metadata needed to turn text into prediction instances and back.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub problem_name: String,
    pub input_feature: String,
    encoder: SubwordEncoder,
}

impl ModelSchema {
    pub fn new(problem_name: impl Into<String>, encoder: SubwordEncoder) -> Self {
        Self {
            problem_name: problem_name.into(),
            input_feature: INPUT_FEATURE.to_string(),
            encoder,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.encoder.vocab_size()
    }

    pub fn serialize_input(&self, text: &str) -> AppResult<Vec<u8>> {
        let mut ids = self.encoder.encode(text)?;
        ids.push(EOS_ID);
        Ok(Example::with_int64_feature(&self.input_feature, &ids).to_bytes())
    }

    /// Drops trailing padding/EOS before decoding.
    pub fn decode_output(&self, ids: &[i64]) -> String {
        let end = ids
            .iter()
            .rposition(|id| !(PAD_ID..NUM_RESERVED_IDS).contains(id))
            .map_or(0, |last| last + 1);
        self.encoder.decode(&ids[..end])
    }
}
