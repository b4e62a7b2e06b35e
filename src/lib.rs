//! KML Style Editor Library
//!
//! This library provides the core of the KML style editor: parsing `Style`
//! and `StyleMap` elements into an editable model, resolving feature style
//! references for rendering, and writing the edited styles back into the
//! original document.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod models;
pub mod parser;
pub mod services;
