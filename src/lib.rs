//! Plastic-bale recycling reports: free text in, LLM extraction, human
//! correction, printable PDF out.

pub mod assembler;
pub mod config;
pub mod correction;
pub mod error;
pub mod llm_extract;
pub mod normalizer;
pub mod output;
pub mod page;
pub mod pdf_render;
pub mod prompt;
pub mod report;
pub mod response_parser;
pub mod web;
