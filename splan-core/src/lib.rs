#![doc = "splan-core: study material generation and file ingestion for splan."]

//! Turns pasted or uploaded study text into summaries, flashcards and quizzes.
//!
//! The pipeline runs leaf-first: [`segment`] splits text into sentences,
//! [`topic`] labels them, [`generate`] builds a [`document::StudyDocument`],
//! and [`export`] writes it as markdown or PDF. [`ingest`] feeds files into the
//! same pipeline through the collaborators declared in [`contract`].
//! [`session`] ties it together around the [`store`].

pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod export;
pub mod generate;
pub mod ingest;
pub mod keyword;
pub mod markdown_to_pdf;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod segment;
pub mod session;
pub mod settings;
pub mod store;
pub mod topic;
