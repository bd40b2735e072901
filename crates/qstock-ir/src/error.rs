//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit")]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
    },

    /// The same qubit appears twice in one instruction.
    #[error("Qubit {qubit} used more than once in '{gate_name}'")]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Gate it was repeated in.
        gate_name: String,
    },

    /// Wrong number of operands for a gate.
    #[error("Gate '{gate_name}' expects {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Gate name.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Number of qubits supplied.
        got: usize,
    },
}

fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate '{name}')"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
