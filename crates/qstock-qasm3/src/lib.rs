//! OpenQASM 3.0 output for qstock circuits.
//!
//! IBM Quantum's runtime accepts circuits as `OpenQASM` 3 source. The emitter
//! always includes `stdgates.inc`, since every gate the circuit model knows
//! is declared there.
//!
//! ```rust
//! use qstock_ir::Circuit;
//!
//! let qasm = qstock_qasm3::emit(&Circuit::bell().unwrap());
//! assert!(qasm.starts_with("OPENQASM 3.0;"));
//! assert!(qasm.contains("cx q[0], q[1];"));
//! ```

mod emitter;

pub use emitter::emit;
