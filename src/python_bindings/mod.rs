//! Python bindings that expose the reverse-run solver via PyO3.
use pyo3::{
    exceptions::{PyRuntimeError, PyValueError},
    prelude::*,
    types::PyModule,
};

use crate::machine::{bundled, MachineSpec, RandomMachineConfig, START_STATE};
use crate::replay::replay;
use crate::search::{Outcome, Solver};
use crate::SolverConfig;

/// Python-facing handle on one decoded machine.
#[pyclass]
#[derive(Debug)]
pub struct PyMachine {
    machine: MachineSpec,
}

#[pymethods]
impl PyMachine {
    #[new]
    /// Decode a machine from its text description.
    pub fn new(description: &str) -> PyResult<Self> {
        let machine = description
            .parse()
            .map_err(|err: crate::MachineError| PyValueError::new_err(err.to_string()))?;
        Ok(Self { machine })
    }

    /// Load one of the bundled machines (1 to 6).
    #[staticmethod]
    pub fn bundled(index: usize) -> PyResult<Self> {
        let machine =
            bundled::load(index).map_err(|err| PyRuntimeError::new_err(err.to_string()))?;
        Ok(Self { machine })
    }

    /// Generate a random machine with default parameters.
    #[staticmethod]
    pub fn random(seed: u64) -> PyResult<Self> {
        let machine = RandomMachineConfig::default()
            .generate_seeded(seed)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(Self { machine })
    }

    /// Hex blake3 fingerprint of the text form.
    pub fn fingerprint(&self) -> String {
        self.machine.fingerprint().to_hex().to_string()
    }

    /// Run the reverse search.
    ///
    /// Args:
    ///     max_depth: Maximum number of reverse steps.
    ///
    /// Returns:
    ///     `None` when no run was found, otherwise a
    ///     `(history, input, rendered_tape, consistent)` tuple where
    ///     `history` lists rule indices in forward firing order.
    pub fn solve(&self, max_depth: usize) -> PyResult<Option<(Vec<usize>, String, String, bool)>> {
        let solver = Solver::new(&self.machine, SolverConfig::for_depth(max_depth))
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        let report = solver
            .run()
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))?;

        let Outcome::Success(solution) = report.outcome else {
            return Ok(None);
        };
        let consistent = replay(&self.machine, &solution)
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))?
            .is_consistent();
        let forward: Vec<usize> = solution.history.iter().rev().copied().collect();
        let rendered = solution
            .tape
            .view(solution.head, Some(START_STATE))
            .to_string();
        Ok(Some((forward, solution.input(), rendered, consistent)))
    }

    fn __str__(&self) -> String {
        self.machine.to_string()
    }
}

/// Create Python module.
#[pymodule]
pub fn revtape_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMachine>()?;
    Ok(())
}
