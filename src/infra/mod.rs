pub mod github;
pub mod samples;
pub mod serving;
pub mod t2t;
