//! Variable graph: stocks as leaves, computed variables as a checked DAG.
//!
//! A model is defined through a [`GraphBuilder`] and frozen into an
//! immutable [`VariableGraph`] by [`GraphBuilder::build`]. The frozen graph
//! holds a fixed evaluation order and is shared read-only (`Arc`) between
//! concurrent runs.
//!
//! Names live in a single namespace covering parameters, stocks, and
//! computed variables. Dependencies are validated when a computed variable
//! is registered, so an unknown input or a cycle is reported at definition
//! time rather than during a run. Mutually-referencing definitions are
//! expressed with [`GraphBuilder::declare_computed`], which reserves a name
//! before its formula is known.
//!
//! Computed variables that feed a stock's net rate (see
//! [`GraphBuilder::connect`]) are classified as flows; every other computed
//! variable is an auxiliary.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use stockflow_types::{Column, VariableKind};
use tracing::debug;

use crate::error::ModelError;

/// Name of the implicit time column. It cannot be used as a variable name.
pub const TIME_COLUMN: &str = "time";

/// Floor applied by [`GraphBuilder::add_stock`].
pub const DEFAULT_FLOOR: f64 = 0.0;

/// A computed variable's formula.
///
/// Must be pure: the engine evaluates it once per step and relies on the
/// result depending only on the values exposed through [`Inputs`].
pub type ComputeFn = Arc<dyn Fn(&Inputs<'_>) -> f64 + Send + Sync>;

/// What a declared name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    /// Index into the declared parameter list.
    Parameter(usize),
    /// Index into the stock list.
    Stock(usize),
    /// Index into the computed-variable list (registration order).
    Computed(usize),
}

// ---------------------------------------------------------------------------
// Inputs view
// ---------------------------------------------------------------------------

/// The values a computed variable may read during one evaluation.
///
/// Values are looked up by the names passed to
/// [`GraphBuilder::register_computed`]. Reading a name that was not declared
/// as an input yields `NaN`, which then surfaces in the result table instead
/// of silently reading unrelated state.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    names: &'a [String],
    values: &'a [f64],
}

impl<'a> Inputs<'a> {
    pub(crate) const fn new(names: &'a [String], values: &'a [f64]) -> Self {
        Self { names, values }
    }

    /// Value of the named input, or `NaN` if it was not declared.
    pub fn get(&self, name: &str) -> f64 {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .and_then(|index| self.values.get(index).copied())
            .unwrap_or(f64::NAN)
    }

    /// Number of declared inputs.
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the variable declared no inputs.
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Static definition of a stock.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDef {
    name: String,
    initial: f64,
    floor: f64,
}

impl StockDef {
    /// Stock name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared initial value.
    pub const fn initial(&self) -> f64 {
        self.initial
    }

    /// Lower bound the integrator clamps to after every step.
    pub const fn floor(&self) -> f64 {
        self.floor
    }
}

/// Net rate of a stock: `sum(inflows) - sum(outflows)`, as computed-variable
/// indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NetRate {
    pub(crate) inflows: Vec<usize>,
    pub(crate) outflows: Vec<usize>,
}

/// Formula and resolved inputs of a computed variable.
#[derive(Clone)]
pub(crate) struct ComputedDef {
    pub(crate) inputs: Vec<String>,
    pub(crate) sources: Vec<Symbol>,
    pub(crate) compute: ComputeFn,
}

impl ComputedDef {
    /// Indices of the computed variables this definition reads.
    fn computed_dependencies(&self) -> impl Iterator<Item = usize> + '_ {
        self.sources.iter().filter_map(|source| match source {
            Symbol::Computed(index) => Some(*index),
            Symbol::Parameter(_) | Symbol::Stock(_) => None,
        })
    }
}

impl core::fmt::Debug for ComputedDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComputedDef")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// A computed variable slot during construction; `None` until defined.
#[derive(Debug, Clone)]
struct ComputedSlot {
    name: String,
    definition: Option<ComputedDef>,
}

/// A computed variable in a frozen graph.
#[derive(Debug, Clone)]
pub(crate) struct ComputedVariable {
    pub(crate) name: String,
    pub(crate) kind: VariableKind,
    pub(crate) definition: ComputedDef,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable model definition. See the module documentation.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    names: BTreeMap<String, Symbol>,
    parameters: Vec<String>,
    stocks: Vec<StockDef>,
    rates: Vec<Option<NetRate>>,
    computed: Vec<ComputedSlot>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter that computed variables may read.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateName`] if the name is already used, or
    /// [`ModelError::ReservedName`] for an empty name or `time`.
    pub fn declare_parameter(&mut self, name: &str) -> Result<&mut Self, ModelError> {
        self.check_new_name(name)?;
        let index = self.parameters.len();
        self.parameters.push(name.to_owned());
        self.names.insert(name.to_owned(), Symbol::Parameter(index));
        Ok(self)
    }

    /// Declare several parameters at once.
    ///
    /// # Errors
    ///
    /// Fails on the first name [`declare_parameter`](Self::declare_parameter)
    /// rejects.
    pub fn declare_parameters(&mut self, names: &[&str]) -> Result<&mut Self, ModelError> {
        for name in names {
            self.declare_parameter(name)?;
        }
        Ok(self)
    }

    /// Register a stock with its initial value and floor.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateName`] or [`ModelError::ReservedName`]
    /// for a bad name, [`ModelError::NonFinite`] if either value is NaN or
    /// infinite, and [`ModelError::InitialBelowFloor`] if `initial < floor`.
    pub fn register_stock(
        &mut self,
        name: &str,
        initial: f64,
        floor: f64,
    ) -> Result<&mut Self, ModelError> {
        self.check_new_name(name)?;
        for value in [initial, floor] {
            if !value.is_finite() {
                return Err(ModelError::NonFinite {
                    name: name.to_owned(),
                    value,
                });
            }
        }
        if initial < floor {
            return Err(ModelError::InitialBelowFloor {
                stock: name.to_owned(),
                initial,
                floor,
            });
        }

        let index = self.stocks.len();
        self.stocks.push(StockDef {
            name: name.to_owned(),
            initial,
            floor,
        });
        self.rates.push(None);
        self.names.insert(name.to_owned(), Symbol::Stock(index));
        Ok(self)
    }

    /// Register a stock with the default floor of zero.
    ///
    /// # Errors
    ///
    /// Same as [`register_stock`](Self::register_stock).
    pub fn add_stock(&mut self, name: &str, initial: f64) -> Result<&mut Self, ModelError> {
        self.register_stock(name, initial, DEFAULT_FLOOR)
    }

    /// Reserve a computed-variable name before its formula is registered.
    ///
    /// The name counts as declared for dependency checks. It must be
    /// defined with [`register_computed`](Self::register_computed) before
    /// [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateName`] or [`ModelError::ReservedName`].
    pub fn declare_computed(&mut self, name: &str) -> Result<&mut Self, ModelError> {
        self.check_new_name(name)?;
        let index = self.computed.len();
        self.computed.push(ComputedSlot {
            name: name.to_owned(),
            definition: None,
        });
        self.names.insert(name.to_owned(), Symbol::Computed(index));
        Ok(self)
    }

    /// Define a computed variable reading `inputs`.
    ///
    /// `name` may be new or previously reserved with
    /// [`declare_computed`](Self::declare_computed).
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateName`] if the name is a parameter, a stock,
    ///   or an already-defined computed variable.
    /// - [`ModelError::CyclicDependency`] if the variable reads itself,
    ///   directly or through other computed variables.
    /// - [`ModelError::UnknownDependency`] if any input is undeclared.
    pub fn register_computed<F>(
        &mut self,
        name: &str,
        inputs: &[&str],
        compute: F,
    ) -> Result<&mut Self, ModelError>
    where
        F: Fn(&Inputs<'_>) -> f64 + Send + Sync + 'static,
    {
        let reserved = match self.names.get(name) {
            Some(Symbol::Computed(index))
                if self
                    .computed
                    .get(*index)
                    .is_some_and(|slot| slot.definition.is_none()) =>
            {
                Some(*index)
            }
            Some(_) => {
                return Err(ModelError::DuplicateName {
                    name: name.to_owned(),
                });
            }
            None => {
                check_name_shape(name)?;
                None
            }
        };

        if inputs.contains(&name) {
            return Err(ModelError::CyclicDependency {
                path: vec![name.to_owned(), name.to_owned()],
            });
        }

        let sources = inputs
            .iter()
            .map(|input| {
                self.names
                    .get(*input)
                    .copied()
                    .ok_or_else(|| ModelError::UnknownDependency {
                        variable: name.to_owned(),
                        dependency: (*input).to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let definition = ComputedDef {
            inputs: inputs.iter().map(|input| (*input).to_owned()).collect(),
            sources,
            compute: Arc::new(compute),
        };

        if let Some(index) = reserved {
            // Only a reserved name can already have dependents.
            if let Some(path) = definition
                .computed_dependencies()
                .find_map(|dep| self.dependency_path(dep, index))
            {
                let mut cycle = vec![name.to_owned()];
                cycle.extend(path.into_iter().map(|step| self.computed_name(step)));
                return Err(ModelError::CyclicDependency { path: cycle });
            }
            if let Some(slot) = self.computed.get_mut(index) {
                slot.definition = Some(definition);
            }
        } else {
            let index = self.computed.len();
            self.computed.push(ComputedSlot {
                name: name.to_owned(),
                definition: Some(definition),
            });
            self.names.insert(name.to_owned(), Symbol::Computed(index));
        }
        Ok(self)
    }

    /// Declare a stock's net rate as `sum(inflows) - sum(outflows)`.
    ///
    /// Every entry must be a computed variable (defined or reserved). Those
    /// variables become flows in the result table.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnknownStock`] if `stock` is not a stock.
    /// - [`ModelError::RateAlreadyDefined`] if the stock is already connected.
    /// - [`ModelError::UnknownDependency`] for an undeclared entry.
    /// - [`ModelError::NotComputed`] for an entry naming a stock or parameter.
    pub fn connect(
        &mut self,
        stock: &str,
        inflows: &[&str],
        outflows: &[&str],
    ) -> Result<&mut Self, ModelError> {
        let Some(Symbol::Stock(stock_index)) = self.names.get(stock).copied() else {
            return Err(ModelError::UnknownStock {
                name: stock.to_owned(),
            });
        };
        if self
            .rates
            .get(stock_index)
            .is_some_and(Option::is_some)
        {
            return Err(ModelError::RateAlreadyDefined {
                stock: stock.to_owned(),
            });
        }

        let rate = NetRate {
            inflows: self.resolve_flows(stock, inflows)?,
            outflows: self.resolve_flows(stock, outflows)?,
        };
        if let Some(slot) = self.rates.get_mut(stock_index) {
            *slot = Some(rate);
        }
        Ok(self)
    }

    /// Declare a stock's net rate as a single computed variable.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub fn set_net_rate(&mut self, stock: &str, rate: &str) -> Result<&mut Self, ModelError> {
        self.connect(stock, &[rate], &[])
    }

    /// Freeze the definition and fix the evaluation order.
    ///
    /// Ties between independent variables are broken by registration order,
    /// so the order is reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UndefinedVariable`] for a reserved name that was
    /// never defined.
    pub fn build(self) -> Result<VariableGraph, ModelError> {
        let flow_indices: BTreeSet<usize> = self
            .rates
            .iter()
            .flatten()
            .flat_map(|rate| rate.inflows.iter().chain(rate.outflows.iter()).copied())
            .collect();

        let mut computed = Vec::with_capacity(self.computed.len());
        for (index, slot) in self.computed.into_iter().enumerate() {
            let Some(definition) = slot.definition else {
                return Err(ModelError::UndefinedVariable { name: slot.name });
            };
            let kind = if flow_indices.contains(&index) {
                VariableKind::Flow
            } else {
                VariableKind::Auxiliary
            };
            computed.push(ComputedVariable {
                name: slot.name,
                kind,
                definition,
            });
        }

        let order = evaluation_order(&computed)?;

        let mut referenced = vec![false; self.parameters.len()];
        for variable in &computed {
            for source in &variable.definition.sources {
                if let Symbol::Parameter(index) = source
                    && let Some(flag) = referenced.get_mut(*index)
                {
                    *flag = true;
                }
            }
        }

        let mut columns = Vec::new();
        let mut column_sources = Vec::new();
        for (index, stock) in self.stocks.iter().enumerate() {
            columns.push(Column {
                name: stock.name.clone(),
                kind: VariableKind::Stock,
            });
            column_sources.push(Symbol::Stock(index));
        }
        for kind in [VariableKind::Flow, VariableKind::Auxiliary] {
            for (index, variable) in computed.iter().enumerate() {
                if variable.kind == kind {
                    columns.push(Column {
                        name: variable.name.clone(),
                        kind,
                    });
                    column_sources.push(Symbol::Computed(index));
                }
            }
        }

        let graph = VariableGraph {
            names: self.names,
            parameters: self.parameters,
            referenced,
            stocks: self.stocks,
            rates: self.rates,
            computed,
            order,
            columns,
            column_sources,
        };
        debug!(
            stocks = graph.stock_count(),
            flows = graph.flow_count(),
            auxiliaries = graph.auxiliary_count(),
            parameters = graph.parameters.len(),
            "variable graph built"
        );
        Ok(graph)
    }

    // -------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------

    fn check_new_name(&self, name: &str) -> Result<(), ModelError> {
        check_name_shape(name)?;
        if self.names.contains_key(name) {
            return Err(ModelError::DuplicateName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn resolve_flows(&self, stock: &str, names: &[&str]) -> Result<Vec<usize>, ModelError> {
        names
            .iter()
            .map(|flow| match self.names.get(*flow) {
                Some(Symbol::Computed(index)) => Ok(*index),
                Some(Symbol::Stock(_) | Symbol::Parameter(_)) => Err(ModelError::NotComputed {
                    stock: stock.to_owned(),
                    name: (*flow).to_owned(),
                }),
                None => Err(ModelError::UnknownDependency {
                    variable: stock.to_owned(),
                    dependency: (*flow).to_owned(),
                }),
            })
            .collect()
    }

    fn computed_name(&self, index: usize) -> String {
        self.computed
            .get(index)
            .map(|slot| slot.name.clone())
            .unwrap_or_default()
    }

    fn computed_dependencies(&self, index: usize) -> Vec<usize> {
        self.computed
            .get(index)
            .and_then(|slot| slot.definition.as_ref())
            .map(|definition| definition.computed_dependencies().collect())
            .unwrap_or_default()
    }

    /// Depth-first search through defined computed variables. Returns the
    /// path `from -> ... -> target` if `from` reads `target` transitively.
    fn dependency_path(&self, from: usize, target: usize) -> Option<Vec<usize>> {
        let mut parents: BTreeMap<usize, usize> = BTreeMap::new();
        let mut visited = BTreeSet::from([from]);
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == target {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&parent) = parents.get(&cursor) {
                    path.push(parent);
                    cursor = parent;
                }
                path.reverse();
                return Some(path);
            }
            for dep in self.computed_dependencies(current) {
                if visited.insert(dep) {
                    parents.insert(dep, current);
                    stack.push(dep);
                }
            }
        }
        None
    }
}

fn check_name_shape(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() || name == TIME_COLUMN {
        return Err(ModelError::ReservedName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Kahn's algorithm over computed-variable dependencies, lowest
/// registration index first among ready variables.
fn evaluation_order(computed: &[ComputedVariable]) -> Result<Vec<usize>, ModelError> {
    let count = computed.len();
    let mut remaining = vec![0_usize; count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

    for (index, variable) in computed.iter().enumerate() {
        let deps: BTreeSet<usize> = variable.definition.computed_dependencies().collect();
        if let Some(slot) = remaining.get_mut(index) {
            *slot = deps.len();
        }
        for dep in deps {
            if let Some(list) = dependents.get_mut(dep) {
                list.push(index);
            }
        }
    }

    let mut ready: BTreeSet<usize> = remaining
        .iter()
        .enumerate()
        .filter(|(_, pending)| **pending == 0)
        .map(|(index, _)| index)
        .collect();
    let mut order = Vec::with_capacity(count);

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in dependents.get(next).map_or(&[][..], Vec::as_slice) {
            if let Some(pending) = remaining.get_mut(dependent) {
                *pending = pending.saturating_sub(1);
                if *pending == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if order.len() == count {
        Ok(order)
    } else {
        // Registration-time checks make this unreachable for builder-made
        // graphs; report the unresolved variables rather than looping.
        let path = computed
            .iter()
            .zip(&remaining)
            .filter(|(_, pending)| **pending > 0)
            .map(|(variable, _)| variable.name.clone())
            .collect();
        Err(ModelError::CyclicDependency { path })
    }
}

// ---------------------------------------------------------------------------
// Frozen graph
// ---------------------------------------------------------------------------

/// An immutable model definition with a fixed evaluation order.
#[derive(Debug, Clone)]
pub struct VariableGraph {
    names: BTreeMap<String, Symbol>,
    pub(crate) parameters: Vec<String>,
    pub(crate) referenced: Vec<bool>,
    pub(crate) stocks: Vec<StockDef>,
    pub(crate) rates: Vec<Option<NetRate>>,
    pub(crate) computed: Vec<ComputedVariable>,
    pub(crate) order: Vec<usize>,
    pub(crate) columns: Vec<Column>,
    pub(crate) column_sources: Vec<Symbol>,
}

impl VariableGraph {
    /// Computed-variable names in evaluation order.
    pub fn evaluation_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|index| self.computed.get(*index))
            .map(|variable| variable.name.as_str())
            .collect()
    }

    /// All stocks in registration order.
    pub fn stocks(&self) -> &[StockDef] {
        &self.stocks
    }

    /// Declared parameter names in declaration order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Parameters read by at least one computed variable. These must be
    /// supplied for every run.
    pub fn referenced_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .zip(&self.referenced)
            .filter(|(_, used)| **used)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Result-table columns: stocks, then flows, then auxiliaries, each
    /// group in registration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Kind of a stock or computed variable; `None` for parameters and
    /// unknown names.
    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        match self.names.get(name)? {
            Symbol::Stock(_) => Some(VariableKind::Stock),
            Symbol::Computed(index) => self.computed.get(*index).map(|variable| variable.kind),
            Symbol::Parameter(_) => None,
        }
    }

    /// Declared inputs of a computed variable.
    pub fn inputs_of(&self, name: &str) -> Option<&[String]> {
        match self.names.get(name)? {
            Symbol::Computed(index) => self
                .computed
                .get(*index)
                .map(|variable| variable.definition.inputs.as_slice()),
            Symbol::Stock(_) | Symbol::Parameter(_) => None,
        }
    }

    /// Inflow and outflow names of a stock's net rate, if it has one.
    pub fn stock_flows(&self, stock: &str) -> Option<(Vec<&str>, Vec<&str>)> {
        let Some(Symbol::Stock(index)) = self.names.get(stock) else {
            return None;
        };
        let rate = self.rates.get(*index)?.as_ref()?;
        let names = |indices: &[usize]| -> Vec<&str> {
            indices
                .iter()
                .filter_map(|i| self.computed.get(*i))
                .map(|variable| variable.name.as_str())
                .collect()
        };
        Some((names(&rate.inflows), names(&rate.outflows)))
    }

    /// Number of stocks.
    pub fn stock_count(&self) -> usize {
        self.stocks.len()
    }

    /// Number of computed variables classified as flows.
    pub fn flow_count(&self) -> usize {
        self.count_kind(VariableKind::Flow)
    }

    /// Number of computed variables classified as auxiliaries.
    pub fn auxiliary_count(&self) -> usize {
        self.count_kind(VariableKind::Auxiliary)
    }

    fn count_kind(&self, kind: VariableKind) -> usize {
        self.computed
            .iter()
            .filter(|variable| variable.kind == kind)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn constant(value: f64) -> impl Fn(&Inputs<'_>) -> f64 + Send + Sync + 'static {
        move |_| value
    }

    #[test]
    fn duplicate_names_rejected_across_kinds() {
        let mut builder = GraphBuilder::new();
        builder.declare_parameter("rate").unwrap();
        builder.add_stock("x", 1.0).unwrap();
        builder.register_computed("flow", &[], constant(1.0)).unwrap();

        for name in ["rate", "x", "flow"] {
            assert_eq!(
                builder.add_stock(name, 0.0).err(),
                Some(ModelError::DuplicateName {
                    name: name.to_owned()
                })
            );
            assert!(matches!(
                builder.register_computed(name, &[], constant(0.0)),
                Err(ModelError::DuplicateName { .. })
            ));
            assert!(matches!(
                builder.declare_parameter(name),
                Err(ModelError::DuplicateName { .. })
            ));
        }
    }

    #[test]
    fn time_and_empty_names_are_reserved() {
        let mut builder = GraphBuilder::new();
        assert!(matches!(
            builder.add_stock(TIME_COLUMN, 0.0),
            Err(ModelError::ReservedName { .. })
        ));
        assert!(matches!(
            builder.register_computed("", &[], constant(0.0)),
            Err(ModelError::ReservedName { .. })
        ));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let mut builder = GraphBuilder::new();
        let result = builder.register_computed("b", &["a"], constant(0.0));
        assert_eq!(
            result.err(),
            Some(ModelError::UnknownDependency {
                variable: "b".to_owned(),
                dependency: "a".to_owned(),
            })
        );
    }

    #[test]
    fn stock_validation() {
        let mut builder = GraphBuilder::new();
        assert!(matches!(
            builder.register_stock("y", -1.0, 0.0),
            Err(ModelError::InitialBelowFloor { .. })
        ));
        assert!(matches!(
            builder.register_stock("y", f64::NAN, 0.0),
            Err(ModelError::NonFinite { .. })
        ));
        assert!(builder.register_stock("y", 15.0, 1.0).is_ok());
    }

    #[test]
    fn mutual_dependency_is_a_cycle_at_registration() {
        let mut builder = GraphBuilder::new();
        builder.declare_computed("b").unwrap();
        builder
            .register_computed("a", &["b"], |inputs| inputs.get("b"))
            .unwrap();
        let result = builder.register_computed("b", &["a"], |inputs| inputs.get("a"));
        assert_eq!(
            result.err(),
            Some(ModelError::CyclicDependency {
                path: vec!["b".to_owned(), "a".to_owned(), "b".to_owned()],
            })
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut builder = GraphBuilder::new();
        let result = builder.register_computed("a", &["a"], |inputs| inputs.get("a"));
        assert!(matches!(result, Err(ModelError::CyclicDependency { .. })));
    }

    #[test]
    fn longer_cycle_reports_full_path() {
        let mut builder = GraphBuilder::new();
        builder.declare_computed("c").unwrap();
        builder.register_computed("a", &["c"], constant(0.0)).unwrap();
        builder.register_computed("b", &["a"], constant(0.0)).unwrap();
        let err = builder
            .register_computed("c", &["b"], constant(0.0))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "cyclic dependency: c -> b -> a -> c");
    }

    #[test]
    fn forward_declaration_without_definition_fails_build() {
        let mut builder = GraphBuilder::new();
        builder.declare_computed("later").unwrap();
        assert_eq!(
            builder.build().err(),
            Some(ModelError::UndefinedVariable {
                name: "later".to_owned()
            })
        );
    }

    #[test]
    fn evaluation_order_respects_dependencies_and_registration_order() {
        let mut builder = GraphBuilder::new();
        builder.declare_parameter("param").unwrap();
        builder.declare_computed("a").unwrap();
        builder
            .register_computed("b", &["a"], |inputs| inputs.get("a") + 1.0)
            .unwrap();
        builder
            .register_computed("independent", &[], constant(3.0))
            .unwrap();
        builder
            .register_computed("a", &["param"], |inputs| inputs.get("param") * 2.0)
            .unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.evaluation_order(), vec!["a", "b", "independent"]);
    }

    #[test]
    fn connected_variables_become_flows() {
        let mut builder = GraphBuilder::new();
        builder.add_stock("pipeline", 400.0).unwrap();
        builder.register_computed("inflow", &[], constant(1.0)).unwrap();
        builder
            .register_computed("outflow", &["pipeline"], |inputs| inputs.get("pipeline") / 4.0)
            .unwrap();
        builder
            .register_computed("ratio", &["inflow", "outflow"], |inputs| {
                inputs.get("inflow") / inputs.get("outflow")
            })
            .unwrap();
        builder.connect("pipeline", &["inflow"], &["outflow"]).unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.kind_of("pipeline"), Some(VariableKind::Stock));
        assert_eq!(graph.kind_of("inflow"), Some(VariableKind::Flow));
        assert_eq!(graph.kind_of("ratio"), Some(VariableKind::Auxiliary));
        assert_eq!(graph.flow_count(), 2);
        assert_eq!(graph.auxiliary_count(), 1);
        let names: Vec<&str> = graph.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["pipeline", "inflow", "outflow", "ratio"]);
        assert_eq!(
            graph.stock_flows("pipeline"),
            Some((vec!["inflow"], vec!["outflow"]))
        );
    }

    #[test]
    fn connect_validation() {
        let mut builder = GraphBuilder::new();
        builder.declare_parameter("p").unwrap();
        builder.add_stock("s", 0.0).unwrap();
        builder.register_computed("f", &[], constant(1.0)).unwrap();

        assert!(matches!(
            builder.connect("f", &["f"], &[]),
            Err(ModelError::UnknownStock { .. })
        ));
        assert!(matches!(
            builder.connect("s", &["p"], &[]),
            Err(ModelError::NotComputed { .. })
        ));
        assert!(matches!(
            builder.connect("s", &["missing"], &[]),
            Err(ModelError::UnknownDependency { .. })
        ));
        builder.set_net_rate("s", "f").unwrap();
        assert!(matches!(
            builder.connect("s", &["f"], &[]),
            Err(ModelError::RateAlreadyDefined { .. })
        ));
    }

    #[test]
    fn referenced_parameters_excludes_unused() {
        let mut builder = GraphBuilder::new();
        builder.declare_parameters(&["used", "unused"]).unwrap();
        builder
            .register_computed("v", &["used"], |inputs| inputs.get("used"))
            .unwrap();
        let graph = builder.build().unwrap();
        assert_eq!(graph.referenced_parameters(), vec!["used"]);
        assert_eq!(graph.parameters().len(), 2);
    }

    #[test]
    fn inputs_view_returns_nan_for_undeclared_reads() {
        let names = vec!["a".to_owned(), "b".to_owned()];
        let values = [1.5, 2.5];
        let inputs = Inputs::new(&names, &values);
        assert!((inputs.get("b") - 2.5).abs() < f64::EPSILON);
        assert!(inputs.get("c").is_nan());
        assert_eq!(inputs.len(), 2);
        let collected: Vec<(&str, f64)> = inputs.iter().collect();
        assert_eq!(collected.len(), 2);
    }
}
