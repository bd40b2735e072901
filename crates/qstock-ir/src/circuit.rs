//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// Qubits and classical bits are addressed by index (`0..num_qubits`,
/// `0..num_clbits`). Every operand is checked when an instruction is
/// appended, and deserialization replays the same checks, so a circuit is
/// always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCircuit")]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        id
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Z, [qubit])
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [control, target])
    }

    /// Apply any standard gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: qubits.len(),
            });
        }
        for (i, &qubit) in qubits.iter().enumerate() {
            self.check_qubit(qubit, Some(gate.name()))?;
            if qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate.name().to_string(),
                });
            }
        }
        self.instructions.push(Instruction::gate(gate, qubits));
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, None)?;
        self.check_clbit(clbit)?;
        self.instructions.push(Instruction::measure(qubit, clbit));
        Ok(self)
    }

    /// Measure all qubits to corresponding classical bits.
    ///
    /// Classical bits are added if the circuit has fewer than qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.num_clbits < self.num_qubits {
            self.add_clbit();
        }

        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        let clbits: Vec<_> = (0..self.num_qubits).map(ClbitId).collect();

        self.instructions
            .push(Instruction::measure_all(qubits, clbits));
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.instructions.push(Instruction::barrier(qubits));
        Ok(self)
    }

    /// Append a measurement, qubit `i` into clbit `i` of the operand lists.
    fn push_measure(&mut self, qubits: Vec<QubitId>, clbits: Vec<ClbitId>) -> IrResult<()> {
        if qubits.len() != clbits.len() {
            return Err(IrError::QubitCountMismatch {
                gate_name: "measure".to_string(),
                expected: clbits.len(),
                got: qubits.len(),
            });
        }
        for (&qubit, &clbit) in qubits.iter().zip(&clbits) {
            self.check_qubit(qubit, None)?;
            self.check_clbit(clbit)?;
        }
        self.instructions.push(Instruction::measure_all(qubits, clbits));
        Ok(())
    }

    fn check_qubit(&self, qubit: QubitId, gate_name: Option<&str>) -> IrResult<()> {
        if qubit.0 < self.num_qubits {
            Ok(())
        } else {
            Err(IrError::QubitNotFound {
                qubit,
                gate_name: gate_name.map(str::to_string),
            })
        }
    }

    fn check_clbit(&self, clbit: ClbitId) -> IrResult<()> {
        if clbit.0 < self.num_clbits {
            Ok(())
        } else {
            Err(IrError::ClbitNotFound { clbit })
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of time steps, with operations on disjoint wires sharing a step.
    ///
    /// Barriers align their wires but do not add a step.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.num_qubits()];
        let mut clbit_level = vec![0usize; self.num_clbits()];
        let mut depth = 0;

        for inst in &self.instructions {
            let current = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.0 as usize])
                .chain(inst.clbits.iter().map(|c| clbit_level[c.0 as usize]))
                .max()
                .unwrap_or(0);

            let next = match inst.kind {
                InstructionKind::Barrier => current,
                InstructionKind::Gate(_) | InstructionKind::Measure => current + 1,
            };

            for q in &inst.qubits {
                qubit_level[q.0 as usize] = next;
            }
            for c in &inst.clbits {
                clbit_level[c.0 as usize] = next;
            }
            depth = depth.max(next);
        }

        depth
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create the Bell state circuit submitted by the prediction endpoint.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let q0 = QubitId(0);
        let q1 = QubitId(1);

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(circuit)
    }
}

/// Wire form of [`Circuit`], validated on the way in.
#[derive(Deserialize)]
struct RawCircuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

impl TryFrom<RawCircuit> for Circuit {
    type Error = IrError;

    fn try_from(raw: RawCircuit) -> IrResult<Self> {
        let mut circuit = Self::with_size(raw.name, raw.num_qubits, raw.num_clbits);
        for inst in raw.instructions {
            match inst.kind {
                InstructionKind::Gate(gate) => {
                    circuit.gate(gate, inst.qubits)?;
                }
                InstructionKind::Measure => circuit.push_measure(inst.qubits, inst.clbits)?,
                InstructionKind::Barrier => {
                    for &qubit in &inst.qubits {
                        circuit.check_qubit(qubit, None)?;
                    }
                    circuit.instructions.push(Instruction::barrier(inst.qubits));
                }
            }
        }
        Ok(circuit)
    }
}
