#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub summary: String,
    pub score: f64,
}
