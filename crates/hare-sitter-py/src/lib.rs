//! Python bindings for `hare-sitter`.
//!
//! Exposes the Hare parser as the `_hare_sitter` extension module. Trees are
//! returned in S-expression form; syntax errors in the input show up as
//! `ERROR` and `MISSING` nodes, not as exceptions.

use hare_sitter::{language, Parser, Tree};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn parse(source: &str) -> PyResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(language())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    parser
        .parse(source)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The name of the grammar, `"hare"`.
#[pyfunction]
fn language_name() -> &'static str {
    language().name()
}

/// Parses `source` and returns the tree as an S-expression.
#[pyfunction]
fn parse_sexp(source: &str) -> PyResult<String> {
    Ok(parse(source)?.root_node().to_sexp())
}

/// Whether parsing `source` produced `ERROR` or `MISSING` nodes.
#[pyfunction]
fn has_error(source: &str) -> PyResult<bool> {
    Ok(parse(source)?.root_node().has_error())
}

/// The grammar in `grammar.json` form.
#[pyfunction]
fn grammar_json() -> PyResult<String> {
    language()
        .grammar_json()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The `node-types.json` description of the grammar.
#[pyfunction]
fn node_types_json() -> String {
    language().node_types_json()
}

#[pymodule]
fn _hare_sitter(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(language_name, m)?)?;
    m.add_function(wrap_pyfunction!(parse_sexp, m)?)?;
    m.add_function(wrap_pyfunction!(has_error, m)?)?;
    m.add_function(wrap_pyfunction!(grammar_json, m)?)?;
    m.add_function(wrap_pyfunction!(node_types_json, m)?)?;
    Ok(())
}
