//! Core library for the firm-panel-qc command line application.
//!
//! The library turns loosely formatted firm × fiscal-year panel tables into
//! typed records and runs a catalogue of accounting checks over them. Cell
//! parsing lives in [`panel::qc::cell`] and [`panel::qc::dummy`], record
//! construction in [`panel::qc::model`], the left join of auxiliary tables in
//! [`panel::qc::merge`], the checks in [`panel::qc::rules`] driven by
//! [`panel::qc::engine`], and the file adapters under [`panel::qc::io`].

pub mod panel;

pub use panel::qc::{
    QcError, Result, cell, config, dummy, engine, error, io, merge, model, pipeline, report,
    rules, table,
};
