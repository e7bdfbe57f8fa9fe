pub mod answer;
pub mod document;
pub mod placeholder;
pub mod schema;
