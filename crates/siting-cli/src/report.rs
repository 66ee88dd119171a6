use clap::ValueEnum;
use serde_json::{json, Value};
use siting_model::CompiledModel;
use siting_solver::{MilpProblem, Solution, SolutionStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Everything `solve` prints.
///
/// `Ok` holds the stdout text. `Err` holds the stderr text for a result with no
/// solution; nothing goes to stdout in that case and the process exits with 1.
pub fn solve_report(
    compiled: &CompiledModel,
    solution: &Solution,
    format: Format,
    check: Option<f64>,
) -> Result<String, String> {
    if solution.solution_count() == 0 {
        return Err(failure_text(solution));
    }
    let out = match format {
        Format::Text => {
            let mut out = solution_text(solution);
            if let Some(tolerance) = check {
                out.push('\n');
                out.push_str(&check_text(&compiled.problem, solution, tolerance));
            }
            out
        }
        Format::Json => match serde_json::to_string_pretty(&solution_json(compiled, solution)) {
            Ok(json) => json,
            Err(e) => return Err(format!("Error serializing output: {}", e)),
        },
    };
    Ok(out)
}

fn failure_text(solution: &Solution) -> String {
    let detail = match solution.status {
        SolutionStatus::Infeasible => {
            String::from("No solution exists that satisfies all constraints.")
        }
        SolutionStatus::Unbounded => String::from("The problem has no finite optimal solution."),
        _ => match solution.message {
            Some(ref message) => format!("Solver encountered an error: {}", message),
            None => String::from("Solver encountered an error."),
        },
    };
    format!("Status: {}\n{}", solution.status.label(), detail)
}

/// The two result lines printed on success
pub fn solution_text(solution: &Solution) -> String {
    format!(
        "Optimal objective = {:?}\nSolution: {:?}",
        solution.objective_value, solution.values
    )
}

pub fn solution_json(compiled: &CompiledModel, solution: &Solution) -> Value {
    let variables: Vec<Value> = compiled
        .problem
        .variables
        .iter()
        .zip(&solution.values)
        .map(|(spec, value)| json!({ "name": spec.name, "kind": spec.kind, "value": value }))
        .collect();

    json!({
        "status": solution.status.label(),
        "objective": solution.objective_value,
        "open_facilities": compiled.open_facilities(&solution.values),
        "variables": variables,
        "violations": solution.violations,
    })
}

pub fn check_text(problem: &MilpProblem, solution: &Solution, tolerance: f64) -> String {
    if solution.is_verified() {
        return format!(
            "Check: {} constraints and {} variable domains satisfied within {:e}",
            problem.num_constraints(),
            problem.num_variables(),
            tolerance
        );
    }
    let mut out = format!("Check: {} violation(s)", solution.violations.len());
    for v in &solution.violations {
        out.push_str(&format!("\n  - {}", v.description));
    }
    out
}

/// Human-readable formulation, one row per line
pub fn formulation_text(problem: &MilpProblem) -> String {
    let mut out = String::new();
    out.push_str(if problem.objective.minimize { "minimize\n" } else { "maximize\n" });
    out.push_str(&format!("  {}\n", linear_text(problem, &problem.objective.coefficients)));

    out.push_str("subject to\n");
    for c in &problem.constraints {
        out.push_str(&format!(
            "  {:16} {} {} {}\n",
            c.name,
            linear_text(problem, &c.coefficients),
            c.op.symbol(),
            c.rhs
        ));
    }

    out.push_str("variables\n");
    for v in &problem.variables {
        out.push_str(&format!(
            "  {:12} {:?} in [{}, {}] cost {}\n",
            v.name,
            v.kind,
            v.kind.lower_bound(),
            v.kind.upper_bound(),
            v.cost
        ));
    }
    out
}

fn linear_text(problem: &MilpProblem, coefficients: &[f64]) -> String {
    let terms: Vec<String> = coefficients
        .iter()
        .zip(&problem.variables)
        .filter(|&(coef, _)| *coef != 0.0)
        .map(|(coef, v)| {
            if *coef == 1.0 {
                v.name.clone()
            } else {
                format!("{} {}", coef, v.name)
            }
        })
        .collect();
    if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    }
}
