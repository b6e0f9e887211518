//! Synthetic expression graphs and the stages timed on them.

use clap::ValueEnum;
use umo_core::{ExprId, Model, ModelError};

use crate::measure::{Sample, StageLog};

/// Graph shape to benchmark.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Scenario {
    /// One long dependency chain.
    Chain,
    /// Two rails feeding each other, every node shared by two users.
    Ladder,
    /// Many variables reduced by a balanced sum tree.
    Wide,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Chain => "chain",
            Scenario::Ladder => "ladder",
            Scenario::Wide => "wide",
        }
    }
}

/// Outcome of one repetition of one case.
#[derive(Debug, Clone)]
pub struct CaseRun {
    pub nodes: usize,
    pub variables: usize,
    pub samples: Vec<Sample>,
    /// Final root value, reported so the work cannot be skipped.
    pub root_value: f64,
}

struct Graph {
    root: ExprId,
    driver: ExprId,
}

fn build_chain(model: &mut Model, size: usize) -> Result<Graph, ModelError> {
    let driver = model.float_var(-1.0, 1.0)?;
    let step = model.constant(1e-3)?;
    let decay = model.constant(0.999)?;
    let mut current = driver;
    for idx in 0..size {
        current = if idx % 2 == 0 {
            model.add(current, step)?
        } else {
            model.mul(current, decay)?
        };
    }
    Ok(Graph {
        root: current,
        driver,
    })
}

fn build_ladder(model: &mut Model, size: usize) -> Result<Graph, ModelError> {
    let driver = model.float_var(0.0, 1.0)?;
    let other = model.float_var(0.0, 1.0)?;
    let half = model.constant(0.5)?;
    let (mut left, mut right) = (driver, other);
    for _ in 0..size / 3 {
        let sum = model.add(left, right)?;
        let mean = model.mul(sum, half)?;
        let upper = model.max(left, right)?;
        left = mean;
        right = upper;
    }
    Ok(Graph {
        root: model.add(left, right)?,
        driver,
    })
}

fn build_wide(model: &mut Model, size: usize) -> Result<Graph, ModelError> {
    let count = (size / 2).max(1);
    let mut layer = (0..count)
        .map(|_| model.float_var(0.0, 1.0))
        .collect::<Result<Vec<_>, _>>()?;
    let driver = layer[0];
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            next.push(match *pair {
                [lhs, rhs] => model.add(lhs, rhs)?,
                _ => pair[0],
            });
        }
        layer = next;
    }
    Ok(Graph {
        root: layer[0],
        driver,
    })
}

fn build(model: &mut Model, scenario: Scenario, size: usize) -> Result<Graph, ModelError> {
    let graph = match scenario {
        Scenario::Chain => build_chain(model, size)?,
        Scenario::Ladder => build_ladder(model, size)?,
        Scenario::Wide => build_wide(model, size)?,
    };
    let limit = model.constant(f64::INFINITY)?;
    let bounded = model.le(graph.root, limit)?;
    model.register_constraint(bounded)?;
    Ok(graph)
}

/// Build one graph of roughly `size` nodes and time each stage on it.
pub fn run_case(scenario: Scenario, size: usize) -> Result<CaseRun, ModelError> {
    let mut model = Model::new();
    let mut log = StageLog::open();

    let graph = log.time("build", || build(&mut model, scenario, size))?;
    log.time("evaluate", || model.evaluate(graph.root))?;
    log.time("reevaluate", || model.evaluate(graph.root))?;
    let root_value = log.time("assign", || {
        model
            .assign(graph.driver, 0.5)
            .and_then(|()| model.evaluate(graph.root))
    })?;
    log.time("status", || model.status())?;
    log.time("check", || model.check())?;
    let samples = log.close();

    tracing::debug!(
        component = "bench",
        operation = "run_case",
        status = "success",
        scenario = scenario.as_str(),
        nodes = model.num_nodes(),
        computed = model.eval_stats().computed,
        "Finished benchmark case"
    );

    Ok(CaseRun {
        nodes: model.num_nodes(),
        variables: model.num_variables(),
        samples,
        root_value: root_value.as_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_runs_all_stages() {
        for scenario in [Scenario::Chain, Scenario::Ladder, Scenario::Wide] {
            let run = run_case(scenario, 300).unwrap();
            let stages: Vec<_> = run.samples.iter().map(|sample| sample.stage).collect();
            assert_eq!(
                stages,
                vec![
                    "build",
                    "evaluate",
                    "reevaluate",
                    "assign",
                    "status",
                    "check",
                    "total"
                ]
            );
            assert!(run.nodes > 100, "{}", scenario.as_str());
            assert!(run.root_value.is_finite());
        }
    }

    #[test]
    fn wide_graph_sums_its_variables() {
        let run = run_case(Scenario::Wide, 10).unwrap();
        assert_eq!(run.variables, 5);
        assert!((run.root_value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ladder_stays_bounded() {
        let run = run_case(Scenario::Ladder, 3_000).unwrap();
        assert!(run.root_value <= 2.0);
    }
}
