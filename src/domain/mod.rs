pub mod example;
pub mod issue;
pub mod prediction;
pub mod schema;
pub mod subword;
