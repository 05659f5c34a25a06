//! Routing formulation façade.

use super::config::{FormulationConfig, FormulationKind, FormulationStrategy};
use super::constraints::{build_constraints, ConstraintSummary, FixedStringPredicate};
use super::objective::build_objective;
use super::variables::{create_variables, RoutingVariables};
use crate::data::{Dimensions, ProblemData};
use crate::error::RoutingError;
use crate::milp::MilpBackend;

/// Progress of a formulation through its build steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Nothing built yet.
    Empty,
    /// Variables created.
    Variables,
    /// Objective registered.
    Objective,
    /// Constraints emitted; the model is ready to solve.
    Complete,
    /// A step failed. The model must be discarded.
    Abandoned,
}

impl BuildStage {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStage::Empty => "empty",
            BuildStage::Variables => "waiting for objective",
            BuildStage::Objective => "waiting for constraints",
            BuildStage::Complete => "complete",
            BuildStage::Abandoned => "abandoned",
        }
    }
}

/// Builds a nominal or robust string-routing model on a [`MilpBackend`].
///
/// The three entry points must be called in order, each exactly once per
/// model: [`build_variables`](Self::build_variables),
/// [`build_objective`](Self::build_objective),
/// [`build_constraints`](Self::build_constraints). [`build`](Self::build)
/// runs all three. Calling a step out of order or a second time fails with
/// [`RoutingError::BuildOrder`] and leaves the model untouched. Any other
/// failure abandons the formulation: no rollback is attempted and every
/// later call fails.
///
/// # Examples
///
/// ```
/// use u_aircraft_routing::data::{Matrix, ProblemData, ProblemSize};
/// use u_aircraft_routing::formulation::{FormulationConfig, RoutingFormulation};
/// use u_aircraft_routing::milp::LpModel;
///
/// let size = ProblemSize { strings: 3, ground_arcs: 1, flight_legs: 2, maint_locations: 1, available_aircraft: 2 };
/// let data = ProblemData::new(size)
///     .with_cover(Matrix::from_rows(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]).unwrap())
///     .with_count(Matrix::row_vector(vec![1.0, 1.0, 1.0]), Matrix::row_vector(vec![1.0]))
///     .with_prop_delay(Matrix::row_vector(vec![3.0, 1.0, 2.0]));
///
/// let mut model = LpModel::new("routing");
/// let mut formulation = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();
/// let summary = formulation.build(&mut model, &data).unwrap();
///
/// assert_eq!(summary.cover, 2);
/// assert_eq!(formulation.string_variables().len(), 3);
/// ```
pub struct RoutingFormulation<B: MilpBackend> {
    config: FormulationConfig,
    strategy: FormulationStrategy,
    stage: BuildStage,
    dims: Option<Dimensions>,
    variables: Option<RoutingVariables<B::Var>>,
    fixed: Option<Box<FixedStringPredicate>>,
}

impl<B: MilpBackend> RoutingFormulation<B> {
    /// Creates a formulation for `config`.
    pub fn new(config: FormulationConfig) -> Result<Self, RoutingError> {
        config.validate()?;
        let strategy = config.strategy();
        Ok(Self {
            config,
            strategy,
            stage: BuildStage::Empty,
            dims: None,
            variables: None,
            fixed: None,
        })
    }

    /// Creates a formulation from a kind name (`nominal`, `robust`, `ev`)
    /// with default settings otherwise.
    pub fn from_kind_name(name: &str) -> Result<Self, RoutingError> {
        let kind: FormulationKind = name.parse()?;
        Self::new(FormulationConfig::default().with_kind(kind))
    }

    /// Pins every string `j` with `predicate(j) == true` to zero.
    ///
    /// The rows (`fix_string_{j}`) are added at the end of
    /// [`build_constraints`](Self::build_constraints).
    pub fn with_fixed_strings<F>(mut self, predicate: F) -> Self
    where
        F: Fn(usize) -> bool + 'static,
    {
        self.fixed = Some(Box::new(predicate));
        self
    }

    pub fn config(&self) -> &FormulationConfig {
        &self.config
    }

    pub fn strategy(&self) -> &FormulationStrategy {
        &self.strategy
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// All variable handles, once created.
    pub fn variables(&self) -> Option<&RoutingVariables<B::Var>> {
        self.variables.as_ref()
    }

    /// String-selection handles `x_j`, in string order.
    ///
    /// Empty until [`build_variables`](Self::build_variables) has run.
    pub fn string_variables(&self) -> &[B::Var] {
        self.variables
            .as_ref()
            .map_or(&[][..], |v| v.strings.as_slice())
    }

    /// Indices of the strings selected by a solution.
    ///
    /// `value_of` looks up the solved value of a variable; a string counts
    /// as selected when its value rounds to 1.
    pub fn selected_strings<F>(&self, mut value_of: F) -> Vec<usize>
    where
        F: FnMut(B::Var) -> f64,
    {
        self.string_variables()
            .iter()
            .enumerate()
            .filter(|&(_, &x)| value_of(x) > 0.5)
            .map(|(j, _)| j)
            .collect()
    }

    /// Validates `data` and creates the variable families.
    pub fn build_variables(&mut self, model: &mut B, data: &ProblemData) -> Result<(), RoutingError> {
        self.expect_stage(BuildStage::Empty, "build variables")?;
        let result = data.validate(self.strategy.kind).and_then(|dims| {
            let vars = create_variables(model, &dims, &self.strategy)?;
            Ok((dims, vars))
        });
        let (dims, vars) = self.settle(result, BuildStage::Variables)?;
        self.dims = Some(dims);
        self.variables = Some(vars);
        Ok(())
    }

    /// Registers the objective.
    pub fn build_objective(&mut self, model: &mut B, data: &ProblemData) -> Result<(), RoutingError> {
        self.expect_stage(BuildStage::Variables, "build objective")?;
        let result = self.checked_inputs(data).and_then(|(_, vars)| {
            build_objective(model, data, vars, &self.strategy)
        });
        self.settle(result, BuildStage::Objective)
    }

    /// Emits every constraint family.
    ///
    /// Fails with [`RoutingError::BuildOrder`] when called a second time.
    pub fn build_constraints(
        &mut self,
        model: &mut B,
        data: &ProblemData,
    ) -> Result<ConstraintSummary, RoutingError> {
        self.expect_stage(BuildStage::Objective, "build constraints")?;
        let result = self.checked_inputs(data).and_then(|(dims, vars)| {
            build_constraints(
                model,
                data,
                &dims,
                vars,
                &self.strategy,
                self.fixed.as_deref(),
            )
        });
        self.settle(result, BuildStage::Complete)
    }

    /// Runs all three build steps.
    pub fn build(&mut self, model: &mut B, data: &ProblemData) -> Result<ConstraintSummary, RoutingError> {
        self.build_variables(model, data)?;
        self.build_objective(model, data)?;
        self.build_constraints(model, data)
    }

    fn expect_stage(&self, expected: BuildStage, operation: &'static str) -> Result<(), RoutingError> {
        if self.stage != expected {
            return Err(RoutingError::BuildOrder {
                operation,
                stage: self.stage.as_str(),
            });
        }
        Ok(())
    }

    // Re-validates `data` and checks it matches the dimensions the variables
    // were created for.
    fn checked_inputs(
        &self,
        data: &ProblemData,
    ) -> Result<(Dimensions, &RoutingVariables<B::Var>), RoutingError> {
        let dims = data.validate(self.strategy.kind)?;
        match (self.dims, self.variables.as_ref()) {
            (Some(built), Some(vars)) if built == dims => Ok((dims, vars)),
            (Some(built), Some(_)) => Err(RoutingError::dimension(
                "problem data",
                format!("variables were built for {built:?}, got {dims:?}"),
            )),
            _ => Err(RoutingError::BuildOrder {
                operation: "read variables",
                stage: self.stage.as_str(),
            }),
        }
    }

    fn settle<T>(&mut self, result: Result<T, RoutingError>, next: BuildStage) -> Result<T, RoutingError> {
        match result {
            Ok(value) => {
                self.stage = next;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    component = "formulation",
                    operation = "settle",
                    error = %err,
                    "Model construction abandoned"
                );
                self.stage = BuildStage::Abandoned;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Matrix, ProblemSize};
    use crate::error::BuildStep;
    use crate::milp::{LpModel, ModelError};

    fn data() -> ProblemData {
        let size = ProblemSize {
            strings: 3,
            ground_arcs: 1,
            flight_legs: 2,
            maint_locations: 1,
            available_aircraft: 2,
        };
        ProblemData::new(size)
            .with_cover(Matrix::from_rows(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]).unwrap())
            .with_count(
                Matrix::row_vector(vec![1.0, 1.0, 1.0]),
                Matrix::row_vector(vec![1.0]),
            )
            .with_prop_delay(Matrix::row_vector(vec![1.0, 1.0, 1.0]))
            .with_robust_cover(Matrix::zeros(2, 3))
    }

    #[test]
    fn test_stages_advance() {
        let data = data();
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();
        assert_eq!(f.stage(), BuildStage::Empty);
        assert!(f.string_variables().is_empty());

        f.build_variables(&mut model, &data).unwrap();
        assert_eq!(f.stage(), BuildStage::Variables);
        assert_eq!(f.string_variables().len(), 3);

        f.build_objective(&mut model, &data).unwrap();
        assert_eq!(f.stage(), BuildStage::Objective);

        f.build_constraints(&mut model, &data).unwrap();
        assert_eq!(f.stage(), BuildStage::Complete);
    }

    #[test]
    fn test_out_of_order_call() {
        let data = data();
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();

        let err = f.build_constraints(&mut model, &data).unwrap_err();
        assert!(matches!(err, RoutingError::BuildOrder { .. }));
        assert_eq!(model.variable_count(), 0);
        assert_eq!(f.stage(), BuildStage::Empty);
    }

    #[test]
    fn test_second_build_constraints_fails() {
        let data = data();
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();
        f.build(&mut model, &data).unwrap();
        let before = model.constraint_count();

        let err = f.build_constraints(&mut model, &data).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::BuildOrder {
                operation: "build constraints",
                stage: "complete"
            }
        ));
        assert_eq!(model.constraint_count(), before);
        assert_eq!(f.stage(), BuildStage::Complete);
    }

    #[test]
    fn test_invalid_data_abandons_before_solver_calls() {
        let data = data().with_cover(Matrix::zeros(2, 2));
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();

        let err = f.build_variables(&mut model, &data).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDimension { name: "cover", .. }));
        assert_eq!(model.variable_count(), 0);
        assert_eq!(f.stage(), BuildStage::Abandoned);
        assert!(f.build_variables(&mut model, &self::data()).is_err());
    }

    #[test]
    fn test_changed_data_between_steps() {
        let data = data();
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();
        f.build_variables(&mut model, &data).unwrap();

        let mut other = data.clone();
        other.size.available_aircraft = 5;
        let err = f.build_objective(&mut model, &other).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidDimension { .. }));
        assert_eq!(f.stage(), BuildStage::Abandoned);
    }

    #[test]
    fn test_solver_failure_is_wrapped() {
        let data = data().with_cover(
            Matrix::from_rows(vec![vec![1.0, f64::NAN, 1.0], vec![0.0, 1.0, 1.0]]).unwrap(),
        );
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();

        let err = f.build(&mut model, &data).unwrap_err();
        match err {
            RoutingError::SolverPrimitiveFailure { step, source } => {
                assert_eq!(step, BuildStep::Cover);
                let inner = source.downcast_ref::<ModelError>().unwrap();
                assert!(matches!(inner, ModelError::NonFiniteCoefficient { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(f.stage(), BuildStage::Abandoned);
        assert_eq!(model.constraint_count(), 0);
    }

    fn failed_step(config: FormulationConfig, data: &ProblemData) -> BuildStep {
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(config).unwrap();
        let err = f.build(&mut model, data).unwrap_err();
        assert_eq!(f.stage(), BuildStage::Abandoned);
        match err {
            RoutingError::SolverPrimitiveFailure { step, source } => {
                assert!(source.downcast_ref::<ModelError>().is_some());
                step
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_solver_failure_names_robust_family() {
        let data = data().with_robust_cover(
            Matrix::from_rows(vec![vec![f64::NAN, 0.0, 0.0], vec![0.0; 3]]).unwrap(),
        );
        assert_eq!(
            failed_step(FormulationConfig::robust(), &data),
            BuildStep::RobustShortfall
        );
        // The nominal model never reads the robust cover.
        let mut model = LpModel::new("test");
        RoutingFormulation::new(FormulationConfig::nominal())
            .unwrap()
            .build(&mut model, &data)
            .unwrap();
    }

    #[test]
    fn test_solver_failure_names_flow_families() {
        let bad = Matrix::row_vector(vec![0.0, f64::INFINITY, 0.0]);
        let data_in = data().with_maint_in(bad.clone(), Matrix::row_vector(vec![0.0]));
        let data_out = data().with_maint_out(bad.clone(), Matrix::row_vector(vec![0.0]));
        let data_count = data().with_count(bad, Matrix::row_vector(vec![1.0]));

        let config = FormulationConfig::nominal();
        assert_eq!(failed_step(config.clone(), &data_in), BuildStep::MaintenanceIn);
        assert_eq!(failed_step(config.clone(), &data_out), BuildStep::MaintenanceOut);
        assert_eq!(failed_step(config, &data_count), BuildStep::FleetCount);
    }

    #[test]
    fn test_unknown_kind_name() {
        let err = RoutingFormulation::<LpModel>::from_kind_name("stochastic").err().unwrap();
        assert!(matches!(err, RoutingError::UnsupportedFormulation(_)));

        let f = RoutingFormulation::<LpModel>::from_kind_name("ev").unwrap();
        assert_eq!(f.config().kind, FormulationKind::Robust);
        assert_eq!(f.config().gamma, 3.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FormulationConfig::robust().with_gamma(-2.0);
        assert!(matches!(
            RoutingFormulation::<LpModel>::new(config),
            Err(RoutingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_selected_strings() {
        let data = data();
        let mut model = LpModel::new("test");
        let mut f = RoutingFormulation::new(FormulationConfig::nominal()).unwrap();
        f.build(&mut model, &data).unwrap();

        let values = [1.0, 0.0, 0.9999, 0.0];
        let selected = f.selected_strings(|x| values[x.index()]);
        assert_eq!(selected, vec![0, 2]);
    }
}
