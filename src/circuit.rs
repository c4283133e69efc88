//! Synchronous boolean circuits.
//!
//! A circuit has input ports, registers and output ports. In every clock
//! tick the registers are updated from the current inputs and registers,
//! and the outputs are a pure function of the same pair.

use std::collections::{BTreeMap, BTreeSet};

use crate::gate::{Gate, PortValues};

pub trait Circuit {
    fn input_port_names(&self) -> BTreeSet<String>;
    fn register_names(&self) -> BTreeSet<String>;
    fn output_port_names(&self) -> BTreeSet<String>;

    /// Register values after one clock tick.
    fn update_registers(&self, inputs: &PortValues, registers: &PortValues) -> PortValues;

    /// Output values for the given inputs and registers.
    fn compute_outputs(&self, inputs: &PortValues, registers: &PortValues) -> PortValues;
}

/// A circuit described by one gate per register (its next value) and one
/// gate per output port.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct GateCircuit {
    inputs: BTreeSet<String>,
    registers: BTreeMap<String, Gate>,
    outputs: BTreeMap<String, Gate>,
}

impl GateCircuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.insert(name.into());
        self
    }

    pub fn with_register(mut self, name: impl Into<String>, next: Gate) -> Self {
        self.registers.insert(name.into(), next);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, gate: Gate) -> Self {
        self.outputs.insert(name.into(), gate);
        self
    }
}

impl Circuit for GateCircuit {
    fn input_port_names(&self) -> BTreeSet<String> {
        self.inputs.clone()
    }

    fn register_names(&self) -> BTreeSet<String> {
        self.registers.keys().cloned().collect()
    }

    fn output_port_names(&self) -> BTreeSet<String> {
        self.outputs.keys().cloned().collect()
    }

    fn update_registers(&self, inputs: &PortValues, registers: &PortValues) -> PortValues {
        self.registers
            .iter()
            .map(|(name, next)| (name.clone(), next.eval(inputs, registers)))
            .collect()
    }

    fn compute_outputs(&self, inputs: &PortValues, registers: &PortValues) -> PortValues {
        self.outputs
            .iter()
            .map(|(name, gate)| (name.clone(), gate.eval(inputs, registers)))
            .collect()
    }
}

/// All `2^n` assignments to the given ports.
pub fn all_assignments(names: &BTreeSet<String>) -> Vec<PortValues> {
    let mut result = vec![PortValues::new()];
    for name in names {
        result = result
            .into_iter()
            .flat_map(|partial| {
                [false, true].into_iter().map(move |value| {
                    let mut next = partial.clone();
                    next.insert(name.clone(), value);
                    next
                })
            })
            .collect();
    }
    result
}

/// The assignment setting every given port low.
pub fn all_low(names: &BTreeSet<String>) -> PortValues {
    names.iter().map(|name| (name.clone(), false)).collect()
}

/// Names of the high ports.
pub fn high_ports(values: &PortValues) -> impl Iterator<Item = &String> {
    values.iter().filter(|(_, v)| **v).map(|(name, _)| name)
}
