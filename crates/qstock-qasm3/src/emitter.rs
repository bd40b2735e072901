//! QASM3 emitter for serializing circuits.

use qstock_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId};

/// Emit a circuit as QASM3 source code.
pub fn emit(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new();
    emitter.emit_circuit(circuit);
    emitter.output
}

/// QASM3 emitter.
struct Emitter {
    output: String,
}

#[allow(clippy::unused_self)]
impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");
        self.writeln("");

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qubit[{num_qubits}] q;"));
        }

        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("bit[{num_clbits}] c;"));
        }

        if num_qubits > 0 || num_clbits > 0 {
            self.writeln("");
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction);
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits = self.emit_qubits(&instruction.qubits);
                self.writeln(&format!("{} {qubits};", gate.name()));
            }

            InstructionKind::Measure => {
                // One assignment per pair; broadcast measurements are unrolled.
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let line = format!("{} = measure {};", self.emit_clbit(*c), self.emit_qubit(*q));
                    self.writeln(&line);
                }
            }

            InstructionKind::Barrier => {
                let qubits = self.emit_qubits(&instruction.qubits);
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }
    }

    fn emit_qubit(&self, qubit: QubitId) -> String {
        format!("q[{}]", qubit.0)
    }

    fn emit_clbit(&self, clbit: ClbitId) -> String {
        format!("c[{}]", clbit.0)
    }

    fn emit_qubits(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.emit_qubit(*q))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}
